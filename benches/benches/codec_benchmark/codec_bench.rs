use std::{hint::black_box, io::Cursor};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use guppi_core::{
    transcode_4bit_to_8bit, widen_4bit_to_8bit, Complex32, GuppiReader, GuppiWriter, SampleCodec,
    SampleTensor,
};
use guppi_types::{BitDepth, GuppiHeader};
use ndarray::Array4;

/// 4 антенны × 64 канала × 1024 отсчёта × 2 pol
const DIMS: (usize, usize, usize, usize) = (4, 64, 1024, 2);

fn tensor() -> SampleTensor {
    let data = Array4::from_shape_fn(DIMS, |(a, f, t, p)| {
        let v = (a * 31 + f * 17 + t * 7 + p) % 15;
        Complex32::new(v as f32 - 7.0, 7.0 - v as f32)
    });
    SampleTensor::Grouped(data)
}

fn encoded_file(depth: BitDepth) -> Vec<u8> {
    let mut header = GuppiHeader::new();
    header.insert("TELESCOP", "ATA");
    header.insert("DIRECTIO", 1);

    let t = tensor();
    let mut writer = GuppiWriter::new(Vec::new(), depth);
    for _ in 0..4 {
        writer.write_block(&header, &t).unwrap();
    }
    writer.finish().unwrap()
}

fn bench_decode(c: &mut Criterion) {
    let t = tensor();
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(t.len() as u64));

    for depth in [BitDepth::Four, BitDepth::Eight, BitDepth::Sixteen] {
        let mut raw = Vec::new();
        depth.encode(t.view().iter(), &mut raw);

        group.bench_with_input(BenchmarkId::from_parameter(depth), &raw, |b, raw| {
            b.iter(|| black_box(depth.decode(black_box(raw)).unwrap()))
        });
    }
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let t = tensor();
    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Elements(t.len() as u64));

    for depth in [BitDepth::Four, BitDepth::Eight, BitDepth::Sixteen] {
        let mut out = Vec::with_capacity(depth.packed_len(t.len()));
        group.bench_function(BenchmarkId::from_parameter(depth), |b| {
            b.iter(|| {
                out.clear();
                depth.encode(black_box(t.view().iter()), &mut out);
                black_box(out.len())
            })
        });
    }
    group.finish();
}

fn bench_read_blocks(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_blocks");

    for depth in [BitDepth::Four, BitDepth::Eight, BitDepth::Sixteen] {
        let file = encoded_file(depth);
        group.throughput(Throughput::Bytes(file.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &file, |b, file| {
            b.iter(|| {
                let reader = GuppiReader::new(Cursor::new(file.as_slice()));
                black_box(reader.map(|b| b.unwrap().data.len()).sum::<usize>())
            })
        });
    }
    group.finish();
}

fn bench_transcode(c: &mut Criterion) {
    let file = encoded_file(BitDepth::Four);
    let mut widened = Vec::with_capacity(file.len() * 2);

    c.bench_function("widen_4bit_to_8bit", |b| {
        b.iter(|| {
            widened.clear();
            widen_4bit_to_8bit(black_box(&file), &mut widened);
            black_box(widened.len())
        })
    });

    c.bench_function("transcode_4bit_to_8bit_4_blocks", |b| {
        b.iter(|| {
            let (out, _) = transcode_4bit_to_8bit(Cursor::new(file.as_slice()), Vec::new()).unwrap();
            black_box(out)
        })
    });
}

criterion_group!(
    benches,
    bench_decode,
    bench_encode,
    bench_read_blocks,
    bench_transcode
);
criterion_main!(benches);
