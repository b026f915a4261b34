//! Benchmarks for the link-layer codec hot path: byte stuffing, the two
//! checksum kinds, and full frame encode/decode at the maximum frame size.

use std::hint::black_box;

use ab_df1::{bcc, crc16, destuff, stuff, ChecksumKind, Frame, LinkMessage, ReceiveBuffer};
use criterion::{criterion_group, criterion_main, Criterion};

/// A maximum-size write command body (254 bytes) whose data words produce
/// plenty of 0x10 bytes, so stuffing actually has work to do.
fn max_write_body() -> Vec<u8> {
    let mut body = vec![0x0F, 0x00, 0x42, 0x00, 0xAA, 0xF4, 0x07, 0x89, 0x00, 0x00];
    for i in 0..122u16 {
        body.extend_from_slice(&i.wrapping_mul(0x0810).to_le_bytes());
    }
    body
}

fn bench_stuffing(c: &mut Criterion) {
    let body = max_write_body();
    let stuffed = stuff(&body);

    c.bench_function("stuff_max_body", |b| b.iter(|| stuff(black_box(&body))));
    c.bench_function("destuff_max_body", |b| {
        b.iter(|| destuff(black_box(&stuffed)))
    });
}

fn bench_checksums(c: &mut Criterion) {
    let body = max_write_body();

    c.bench_function("crc16_max_body", |b| b.iter(|| crc16(black_box(&body))));
    c.bench_function("bcc_max_body", |b| b.iter(|| bcc(black_box(&body))));
}

fn bench_frame_codec(c: &mut Criterion) {
    let frame = Frame::new(0x01, 0x00, max_write_body()).unwrap();
    let wire = frame.encode(ChecksumKind::Crc);

    c.bench_function("encode_max_frame_crc", |b| {
        b.iter(|| black_box(&frame).encode(ChecksumKind::Crc))
    });
    c.bench_function("decode_max_frame_crc", |b| {
        b.iter(|| Frame::decode(black_box(&wire), ChecksumKind::Crc))
    });
}

fn bench_receive_buffer(c: &mut Criterion) {
    let frame = Frame::new(0x01, 0x00, max_write_body()).unwrap();
    let wire = frame.encode(ChecksumKind::Crc);

    c.bench_function("buffer_segment_max_frame", |b| {
        b.iter(|| {
            let mut buffer = ReceiveBuffer::new(ChecksumKind::Crc);
            buffer.extend(black_box(&wire)).unwrap();
            match buffer.pop_message().unwrap() {
                Some(LinkMessage::Frame(frame)) => frame,
                other => panic!("expected a frame, got {other:?}"),
            }
        })
    });
}

criterion_group!(
    benches,
    bench_stuffing,
    bench_checksums,
    bench_frame_codec,
    bench_receive_buffer
);
criterion_main!(benches);
