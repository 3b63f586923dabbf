use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use limen_image::{Image, ImageSize};
use limen_imgproc::border::BorderMode;
use limen_imgproc::threshold::{threshold_local, threshold_otsu, LocalThresholdMethod};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn create_test_image(width: usize, height: usize) -> Image<u8, 1> {
    let mut rng = StdRng::seed_from_u64(42);
    let data: Vec<u8> = (0..(width * height)).map(|_| rng.random()).collect();
    let size = ImageSize { width, height };
    Image::new(size, data).unwrap()
}

fn bench_threshold_otsu(c: &mut Criterion) {
    let mut group = c.benchmark_group("ThresholdOtsu");

    for (w, h) in [(256, 224), (512, 448), (1920, 1080)].iter() {
        let src = create_test_image(*w, *h);
        let src_f32 = src.cast::<f32>().unwrap();

        group.bench_with_input(
            BenchmarkId::new("otsu_u8", format!("{}x{}", w, h)),
            &src,
            |b, src| b.iter(|| std::hint::black_box(threshold_otsu(src, 256).unwrap())),
        );

        group.bench_with_input(
            BenchmarkId::new("otsu_f32", format!("{}x{}", w, h)),
            &src_f32,
            |b, src| b.iter(|| std::hint::black_box(threshold_otsu(src, 256).unwrap())),
        );
    }

    group.finish();
}

fn bench_threshold_local(c: &mut Criterion) {
    let mut group = c.benchmark_group("ThresholdLocal");

    // a smaller image keeps the median runs short
    let (w, h) = (512, 448);
    let src = create_test_image(w, h);

    for block_size in [3, 11, 35].iter() {
        let methods = [
            ("mean", LocalThresholdMethod::Mean),
            ("gaussian", LocalThresholdMethod::Gaussian { sigma: None }),
            ("median", LocalThresholdMethod::Median),
        ];
        for (name, method) in methods.iter() {
            group.bench_with_input(
                BenchmarkId::new(*name, format!("{}x{}_{}", w, h, block_size)),
                &src,
                |b, src| {
                    b.iter(|| {
                        std::hint::black_box(
                            threshold_local(
                                src,
                                *block_size,
                                method,
                                0.0,
                                BorderMode::Reflect,
                                0.0,
                            )
                            .unwrap(),
                        )
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_threshold_otsu, bench_threshold_local);
criterion_main!(benches);
