use criterion::{black_box, criterion_group, criterion_main, Criterion};

use vector_canvas::{Canvas, Capper, Joiner, Path, PointD, RasterOptions, Resolution, Rgba8};

fn star(spikes: usize) -> Path {
    let n = spikes * 2;
    let points: Vec<PointD> = (0..n)
        .map(|i| {
            let r = if i % 2 == 0 { 40.0 } else { 15.0 };
            let a = std::f64::consts::TAU * i as f64 / n as f64;
            PointD::new(50.0 + r * a.sin(), 50.0 + r * a.cos())
        })
        .collect();
    Path::polyline(&points, true)
}

fn bench_stroke(c: &mut Criterion) {
    let path = star(24);
    c.bench_function("stroke_miter", |b| {
        b.iter(|| black_box(&path).stroke(1.5, Capper::Butt, &Joiner::miter_clip(4.0)))
    });
    c.bench_function("stroke_round", |b| {
        b.iter(|| black_box(&path).stroke(1.5, Capper::Round, &Joiner::Round))
    });
}

fn bench_dash(c: &mut Criterion) {
    let path = star(24);
    c.bench_function("dash", |b| {
        b.iter(|| black_box(&path).dash(0.5, &[3.0, 1.0, 0.5, 1.0]))
    });
}

fn bench_raster(c: &mut Criterion) {
    let mut canvas = Canvas::new(100.0, 100.0);
    canvas.set_fill_color(Rgba8::new(0, 96, 192, 160));
    canvas.set_stroke_color(Rgba8::BLACK);
    canvas.set_stroke_width(0.8);
    canvas.set_dashes(0.0, &[2.0, 1.0]);
    canvas.draw_path(0.0, 0.0, &star(24));
    let opts = RasterOptions::new(Resolution::from_dpi(150.0));
    c.bench_function("raster_star", |b| b.iter(|| canvas.write_image(black_box(&opts))));
}

criterion_group!(benches, bench_stroke, bench_dash, bench_raster);
criterion_main!(benches);
