use criterion::{criterion_group, criterion_main};

mod network;

criterion_group!(
    benches,
    network::application::mqttsn::codec::bench_encode_publish,
    network::application::mqttsn::codec::bench_decode_publish,
    network::application::mqttsn::codec::bench_decode_subscribe,
    network::application::mqttsn::codec::bench_long_frame_round_trip
);
criterion_main!(benches);
