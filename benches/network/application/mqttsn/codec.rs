use criterion::{Criterion, Throughput};
use libmqttsn::network::application::mqttsn::{
    Flags, Message, Publish, QoS, Subscribe, Topic, decode,
};
use std::hint::black_box;

fn sample_publish(payload_len: usize) -> Message {
    let payload = vec![0xA5u8; payload_len];
    let flags = Flags::new().with_qos(QoS::AtLeastOnce);
    Message::Publish(Publish::new(flags, 0x0007, 0x0042, &payload).unwrap())
}

pub fn bench_encode_publish(c: &mut Criterion) {
    let mut group = c.benchmark_group("mqttsn_encode_publish");
    for payload_len in [2usize, 64, 240] {
        let message = sample_publish(payload_len);
        let mut buf = [0u8; 512];
        group.throughput(Throughput::Bytes(payload_len as u64));
        group.bench_function(format!("{payload_len}_bytes"), |b| {
            b.iter(|| black_box(&message).encode(black_box(&mut buf)).unwrap())
        });
    }
    group.finish();
}

pub fn bench_decode_publish(c: &mut Criterion) {
    let mut group = c.benchmark_group("mqttsn_decode_publish");
    for payload_len in [2usize, 64, 240] {
        let mut buf = [0u8; 512];
        let len = sample_publish(payload_len).encode(&mut buf).unwrap();
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_function(format!("{payload_len}_bytes"), |b| {
            b.iter(|| decode(black_box(&buf[..len])).unwrap())
        });
    }
    group.finish();
}

pub fn bench_decode_subscribe(c: &mut Criterion) {
    let subscribe = Message::Subscribe(Subscribe::new(
        Flags::new().with_qos(QoS::AtLeastOnce),
        1,
        Topic::name("sensors/+/temperature").unwrap(),
    ));
    let mut buf = [0u8; 64];
    let len = subscribe.encode(&mut buf).unwrap();

    c.bench_function("mqttsn_decode_subscribe", |b| {
        b.iter(|| decode(black_box(&buf[..len])).unwrap())
    });
}

pub fn bench_long_frame_round_trip(c: &mut Criterion) {
    let message = sample_publish(400);
    let mut buf = [0u8; 512];

    let mut group = c.benchmark_group("mqttsn_long_frame");
    group.throughput(Throughput::Bytes(400));
    group.bench_function("round_trip", |b| {
        b.iter(|| {
            let len = black_box(&message).encode(&mut buf).unwrap();
            decode(black_box(&buf[..len])).unwrap()
        })
    });
    group.finish();
}
