use bytes::BytesMut;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use passdb_codec::core::primitives::{Codec, HexPassword, NulString, Pointer, Uint32};
use passdb_codec::Value;

#[allow(clippy::unwrap_used)]
fn bench_prefixed_fields(c: &mut Criterion) {
    let mut group = c.benchmark_group("prefixed_fields");

    for &size in &[16usize, 1024, 65536] {
        let text = Value::Text(vec![b'a'; size]);
        let blob = Value::Blob(vec![0x5a; size]);
        let text_wire = NulString.encode_to_vec(&text).unwrap();
        let blob_wire = Pointer.encode_to_vec(&blob).unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("string_encode_{size}b"), |b| {
            let mut buf = BytesMut::with_capacity(size + 8);
            b.iter(|| {
                NulString.encode(black_box(&text), &mut buf).unwrap();
                buf.clear();
            })
        });
        group.bench_function(format!("string_decode_{size}b"), |b| {
            b.iter(|| NulString.decode(black_box(&text_wire)).unwrap())
        });
        group.bench_function(format!("pointer_decode_{size}b"), |b| {
            b.iter(|| Pointer.decode(black_box(&blob_wire)).unwrap())
        });
    }

    group.finish();
}

#[allow(clippy::unwrap_used)]
fn bench_fixed_and_hex(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixed_and_hex");

    let word = 0xDEAD_BEEFu32.to_le_bytes();
    group.bench_function("uint32_decode", |b| {
        b.iter(|| Uint32.decode(black_box(&word)).unwrap())
    });

    let hash = Value::hex("8846F7EAEE8FB117AD06BDD830B7586C");
    let hash_wire = HexPassword.encode_to_vec(&hash).unwrap();
    group.bench_function("password_encode", |b| {
        b.iter(|| HexPassword.encode_to_vec(black_box(&hash)).unwrap())
    });
    group.bench_function("password_decode", |b| {
        b.iter(|| HexPassword.decode(black_box(&hash_wire)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_prefixed_fields, bench_fixed_and_hex);
criterion_main!(benches);
