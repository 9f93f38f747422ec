//! Criterion benchmarks for pixwire-graphics hot paths.
//!
//! Run with: `cargo bench -p pixwire-graphics`
//! Quick compile check: `cargo bench -p pixwire-graphics -- --test`

use std::io::{self, Write};

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use pixwire_graphics::protocol::inspect::reassemble;
use pixwire_graphics::{FrameKind, KittyEncoder, PixelFormat};

/// Sink that only counts bytes, so the benchmark measures encoding alone.
struct CountingSink(usize);

impl Write for CountingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0 += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("kitty_encode");

    // 256x256 image = 256 KiB raw, 86 frames.
    let (width, height) = (256u32, 256u32);
    let pixels = vec![0xA5u8; (width * height * 4) as usize];
    group.throughput(Throughput::Bytes(pixels.len() as u64));

    for format in [PixelFormat::Rgba, PixelFormat::Argb, PixelFormat::Abgr] {
        let mut encoder = KittyEncoder::new();
        group.bench_function(format.to_string(), |b| {
            b.iter(|| {
                let mut sink = CountingSink(0);
                encoder
                    .encode(
                        &mut sink,
                        black_box(&pixels),
                        width,
                        height,
                        format,
                        FrameKind::Quiet,
                    )
                    .unwrap();
                sink.0
            });
        });
    }

    group.finish();
}

fn bench_reassemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("kitty_reassemble");

    let pixels = vec![0x3Cu8; 128 * 128 * 4];
    let stream = KittyEncoder::new()
        .encode_to_vec(&pixels, 128, 128, PixelFormat::Rgba, FrameKind::Plain)
        .unwrap();
    group.throughput(Throughput::Bytes(stream.len() as u64));
    group.bench_function("128x128", |b| {
        b.iter(|| reassemble(black_box(&stream)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_reassemble);
criterion_main!(benches);
