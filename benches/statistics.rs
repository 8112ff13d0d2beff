use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use rawprobe::raw_analysis::{
    DprawAction, DprawConfig, DprawMode, FilterCode, RawImage, analyze, build_histogram, dpraw_process,
    set_black_levels,
};

fn generate_mock_frame(width: usize, height: usize, offset: u16) -> RawImage {
    let samples = (0..height)
        .flat_map(|y| (0..width).map(move |x| offset + ((x * 7 + y * 13) % 4096) as u16))
        .collect();
    RawImage::new(width, height, samples).expect("valid mock frame")
}

fn benchmark_sequential_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_sum");
    let image = generate_mock_frame(1000, 1000, 0);

    for code in [FilterCode::All, FilterCode::R, FilterCode::G1, FilterCode::G] {
        let selection = image.channel(code).select_all().expect("full channel");
        group.bench_with_input(BenchmarkId::from_parameter(code), &selection, |b, selection| {
            b.iter(|| black_box(selection.pixels().map(u64::from).sum::<u64>()));
        });
    }

    group.finish();
}

fn benchmark_statistics_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_by_size");

    let sizes = vec![
        (100, 100, "100x100"),
        (500, 500, "500x500"),
        (1000, 1000, "1000x1000"),
    ];

    for (width, height, label) in sizes {
        let image = generate_mock_frame(width, height, 0);
        group.bench_with_input(BenchmarkId::from_parameter(label), &image, |b, image| {
            let selection = image.channel(FilterCode::G2).select_all().expect("full channel");
            b.iter(|| analyze(black_box(&selection)));
        });
    }

    group.finish();
}

fn benchmark_histogram(c: &mut Criterion) {
    let image = generate_mock_frame(1000, 1000, 0);
    let selection = image.channel(FilterCode::B).select_all().expect("full channel");

    c.bench_function("histogram_1000x1000_blue", |b| {
        b.iter(|| build_histogram(black_box(&selection)));
    });
}

fn benchmark_dpraw(c: &mut Criterion) {
    let mut group = c.benchmark_group("dpraw_merge");
    let mut combined = generate_mock_frame(1000, 1000, 1000);
    let mut secondary = generate_mock_frame(1000, 1000, 500);
    set_black_levels(&mut combined, &[256.0]).expect("one black point");
    set_black_levels(&mut secondary, &[256.0]).expect("one black point");

    for (mode, label) in [(DprawMode::Plain, "plain"), (DprawMode::Bayer, "bayer")] {
        let config = DprawConfig::builder()
            .white_level(4000)
            .action(DprawAction::GetA)
            .mode(mode)
            .build();
        group.bench_function(label, |b| {
            b.iter(|| dpraw_process(black_box(&combined), black_box(&secondary), &config));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_sequential_access,
    benchmark_statistics_by_size,
    benchmark_histogram,
    benchmark_dpraw
);
criterion_main!(benches);
