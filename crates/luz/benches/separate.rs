use criterion::{criterion_group, criterion_main, Criterion};
use luz::Luz;

const CONFIG: &str = "coat1=rgb 0 1 1\ncoat2=rgb 1 0 1\ncoat3=rgb 1 1 0\niterations=100\n";

pub fn run_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("separate");
    group.sample_size(10);

    group.bench_function("cold-cache", |b| {
        b.iter(|| {
            let luz = Luz::new(CONFIG);
            luz.rgb_to_coats(&[0.5, 0.3, 0.6])
        })
    });

    let warm = Luz::new(CONFIG);
    warm.rgb_to_coats(&[0.5, 0.3, 0.6]);
    group.bench_function("warm-cache", |b| {
        b.iter(|| warm.rgb_to_coats(&[0.5, 0.3, 0.6]))
    });

    group.bench_function("forward", |b| {
        b.iter(|| warm.coats_to_rgb(&[0.4, 0.2, 0.1]))
    });

    group.finish();
}

criterion_group!(benches, run_benchmarks);
criterion_main!(benches);
