//! Benchmarks for tick packing and change detection

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use oracle_relay::codec::{decode_be, encode_be, to_hex, Width};
use oracle_relay::dedup::ChangeDetector;
use oracle_relay::feed::{normalize, PriceObservation};
use oracle_relay::message::MessageBuilder;
use rust_decimal_macros::dec;

fn benchmark_encode_decode(c: &mut Criterion) {
    c.bench_function("encode_be_u64", |b| {
        b.iter(|| encode_be(black_box(1_700_000_000), Width::U64))
    });

    let bytes = encode_be(1_700_000_000, Width::U64).unwrap_or_default();
    c.bench_function("decode_be_u64", |b| b.iter(|| decode_be(black_box(&bytes))));
}

fn benchmark_tick_to_payload(c: &mut Criterion) {
    let builder = MessageBuilder::new("Binance", 9);
    let observation = PriceObservation {
        symbol: "BTCUSDT".to_string(),
        price: dec!(27000.5),
        event_time_millis: 1_700_000_000_123,
        received_at: Utc::now(),
    };

    c.bench_function("tick_to_payload", |b| {
        b.iter(|| {
            let packed = normalize(black_box(&observation))
                .and_then(|tick| tick.pack())
                .ok()?;
            builder.price_update(&packed).encode().ok()
        })
    });

    let payload = builder
        .price_update(
            &normalize(&observation)
                .and_then(|tick| tick.pack())
                .expect("packable"),
        )
        .encode()
        .expect("encodable");
    c.bench_function("payload_to_hex", |b| b.iter(|| to_hex(black_box(&payload))));
}

fn benchmark_change_detector(c: &mut Criterion) {
    let mut detector = ChangeDetector::new();
    let mut ts = 1_700_000_000_000i64;

    c.bench_function("change_detector_observe", |b| {
        b.iter(|| {
            ts += 1000;
            let observation = PriceObservation {
                symbol: "BTCUSDT".to_string(),
                price: dec!(27000) + rust_decimal::Decimal::from(ts % 7),
                event_time_millis: ts,
                received_at: Utc::now(),
            };
            if let Ok(packed) = normalize(&observation).and_then(|tick| tick.pack()) {
                black_box(detector.observe(&packed));
            }
        })
    });
}

criterion_group!(
    benches,
    benchmark_encode_decode,
    benchmark_tick_to_payload,
    benchmark_change_detector
);
criterion_main!(benches);
