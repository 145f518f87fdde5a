// Performance benchmarks for token and payload cryptography

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sentinel_web::core::crypto;
use sentinel_web::core::token::TokenCodec;
use serde_json::json;

const SERVER_KEY: &[u8] = b"1234567890123456";
const SECRET: &[u8] = b"0123456789abcdef";

fn bench_token_mint(c: &mut Criterion) {
    let codec = TokenCodec::new(SERVER_KEY.to_vec()).unwrap();

    c.bench_function("token_mint", |b| {
        b.iter(|| {
            codec
                .mint(black_box(42), black_box("alice"), black_box("0123456789abcdef"))
                .unwrap();
        });
    });
}

fn bench_token_decode(c: &mut Criterion) {
    let codec = TokenCodec::new(SERVER_KEY.to_vec()).unwrap();
    let token = codec.mint(42, "alice", "0123456789abcdef").unwrap();

    c.bench_function("token_decode", |b| {
        b.iter(|| {
            codec.decode(black_box(&token)).unwrap();
        });
    });
}

fn bench_payload_seal(c: &mut Criterion) {
    let payload = json!({
        "code": 0,
        "msg": "ok",
        "data": {"rows": (0..20).map(|i| json!({"id": i, "item": "pen"})).collect::<Vec<_>>()}
    })
    .to_string();

    c.bench_function("payload_seal", |b| {
        b.iter(|| {
            crypto::seal(black_box(payload.as_bytes()), SECRET).unwrap();
        });
    });
}

fn bench_query_sign(c: &mut Criterion) {
    let query = "status=open&page=2&rows=20&sort=created";

    c.bench_function("query_sign", |b| {
        b.iter(|| {
            crypto::sign(black_box(query.as_bytes()), SECRET).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_token_mint,
    bench_token_decode,
    bench_payload_seal,
    bench_query_sign
);
criterion_main!(benches);
