//! Benchmarks for the renderer crate - grid rasterisation, contours and PNG encoding.
//!
//! Run with: cargo bench --package renderer --bench render_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use renderer::contour::generate_all_contours;
use renderer::{colormap, png, Colormap, Normalize};

/// Brightness-temperature-like field with noise (180K to 300K).
fn generate_temperature_grid(width: usize, height: usize) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    let mut data = vec![0.0f64; width * height];
    for y in 0..height {
        for x in 0..width {
            let lat_factor = (y as f64 / height as f64 - 0.5) * 60.0;
            let lon_factor = ((x as f64 / width as f64) * std::f64::consts::PI * 4.0).sin() * 5.0;
            data[y * width + x] = 250.0 + lat_factor + lon_factor + rng.gen_range(-3.0..3.0);
        }
    }
    data
}

fn bench_render_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_grid");
    let cmap = Colormap::named("viridis").unwrap();
    for &size in &[256usize, 512, 1024] {
        let data = generate_temperature_grid(size, size);
        let norm = Normalize::autoscale(&data, None, None);
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| colormap::render_grid(black_box(data), size, size, &norm, &cmap))
        });
    }
    group.finish();
}

fn bench_contours(c: &mut Criterion) {
    let mut group = c.benchmark_group("contours");
    let levels: Vec<f64> = (0..12).map(|i| 200.0 + i as f64 * 8.0).collect();
    for &size in &[128usize, 256] {
        let data = generate_temperature_grid(size, size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| generate_all_contours(black_box(data), size, size, &levels, 1))
        });
    }
    group.finish();
}

fn bench_png(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_encode");
    let cmap = Colormap::named("jet").unwrap();
    let size = 512usize;
    let data = generate_temperature_grid(size, size);
    let norm = Normalize::autoscale(&data, None, None);
    let rgba = colormap::render_grid(&data, size, size, &norm, &cmap).into_raw();

    // Quantised to a few bands so the indexed path is taken
    let banded: Vec<u8> = rgba.iter().map(|v| v & 0xc0).collect();

    group.bench_function("rgba_512", |b| {
        b.iter(|| png::create_png_auto(black_box(&rgba), size, size, Some(100.0)))
    });
    group.bench_function("indexed_512", |b| {
        b.iter(|| png::create_png_auto(black_box(&banded), size, size, Some(100.0)))
    });
    group.finish();
}

criterion_group!(benches, bench_render_grid, bench_contours, bench_png);
criterion_main!(benches);
