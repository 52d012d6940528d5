use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use engravekit_raster::{
    BlackWhiteImage, GreyImage, GreyscaleImage, LinearPowerMapper, ScanAxis, ScanPolicy,
    ToolpathScanner,
};

/// Checkerboard of 8x8 cells with a blank band every 64 rows
fn checkerboard(size: u32) -> BlackWhiteImage {
    let mut image = BlackWhiteImage::new(size, size).unwrap();
    image.fill_with(|x, y| {
        if y % 64 < 8 || ((x / 8) + (y / 8)) % 2 == 0 {
            255
        } else {
            0
        }
    });
    image
}

fn gradient(size: u32) -> GreyImage {
    let mut image = GreyImage::new(size, size).unwrap();
    image.fill_with(|x, _| (x * 255 / size) as u8);
    image
}

fn bench_scan(c: &mut Criterion) {
    let mapper = LinearPowerMapper::with_max_power(80.0).unwrap();
    let mut group = c.benchmark_group("scan");

    for size in [256u32, 1024] {
        let image = checkerboard(size);
        for axis in [ScanAxis::Horizontal, ScanAxis::Vertical] {
            let policy = ScanPolicy::default().with_axis(axis).with_overscan(16);
            group.bench_with_input(
                BenchmarkId::new(format!("checkerboard_{:?}", axis), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        ToolpathScanner::new(black_box(image.buffer()), policy, &mapper)
                            .unwrap()
                            .count()
                    })
                },
            );
        }

        let image = gradient(size);
        group.bench_with_input(BenchmarkId::new("gradient", size), &size, |b, _| {
            b.iter(|| {
                ToolpathScanner::new(black_box(image.buffer()), ScanPolicy::default(), &mapper)
                    .unwrap()
                    .count()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
