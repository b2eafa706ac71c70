//! Integration tests for the raster backend.
//!
//! Covers colormap rasterisation, canvas drawing, contour extraction and
//! PNG output as they are combined when a figure is saved.

use renderer::contour::{generate_all_contours, render_contours, ContourStyle, Point};
use renderer::png::{create_png, create_png_auto};
use renderer::{colormap, Canvas, Color, Colormap, FontBook, Normalize, PixelRect, StrokeStyle};

// ============================================================================
// Helper functions
// ============================================================================

/// Radial field peaking at the grid centre.
fn radial_grid(size: usize) -> Vec<f64> {
    let c = (size - 1) as f64 / 2.0;
    let mut data = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            let r = ((x as f64 - c).powi(2) + (y as f64 - c).powi(2)).sqrt();
            data.push(10.0 - r);
        }
    }
    data
}

fn png_color_type(png: &[u8]) -> u8 {
    // IHDR data starts after signature (8) + length (4) + type (4)
    png[16 + 9]
}

// ============================================================================
// Colormap rasterisation
// ============================================================================

#[test]
fn test_render_grid_maps_extremes() {
    let data = vec![0.0, 1.0, f64::NAN, 0.5];
    let cmap = Colormap::named("gray").unwrap();
    let img = colormap::render_grid(&data, 2, 2, &Normalize::new(0.0, 1.0), &cmap);
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
    assert_eq!(img.get_pixel(1, 0).0, [255, 255, 255, 255]);
    assert_eq!(img.get_pixel(0, 1).0[3], 0);
}

#[test]
fn test_discrete_colors_span_map() {
    let cmap = Colormap::named("binary").unwrap();
    let colors = cmap.discrete(3);
    assert_eq!(colors[0], Color::WHITE);
    assert_eq!(colors[2], Color::BLACK);
}

#[test]
fn test_under_over_colors() {
    let mut cmap = Colormap::named("viridis").unwrap();
    cmap.under = Some(Color::rgb(1, 2, 3));
    cmap.over = Some(Color::rgb(4, 5, 6));
    assert_eq!(cmap.sample(-0.1), Color::rgb(1, 2, 3));
    assert_eq!(cmap.sample(1.1), Color::rgb(4, 5, 6));
}

// ============================================================================
// Canvas
// ============================================================================

#[test]
fn test_polyline_breaks_on_nan() {
    let mut canvas = Canvas::new(30, 10, Color::WHITE).unwrap();
    let style = StrokeStyle::solid(Color::BLACK, 3.0);
    canvas.stroke_polyline(&[(0.0, 5.0), (8.0, 5.0), (f32::NAN, 5.0), (22.0, 5.0), (30.0, 5.0)], &style);
    let img = canvas.to_image();
    assert_eq!(img.get_pixel(4, 5).0, [0, 0, 0, 255]);
    assert_eq!(img.get_pixel(15, 5).0, [255, 255, 255, 255]);
    assert_eq!(img.get_pixel(26, 5).0, [0, 0, 0, 255]);
}

#[test]
fn test_draw_image_scales_into_rect() {
    let mut canvas = Canvas::new(20, 20, Color::WHITE).unwrap();
    let cmap = Colormap::named("gray").unwrap();
    let img = colormap::render_grid(&[0.0, 0.0, 0.0, 0.0], 2, 2, &Normalize::new(0.0, 1.0), &cmap);
    canvas.draw_image(&img, PixelRect::new(5.0, 5.0, 10.0, 10.0), false);
    let out = canvas.to_image();
    assert_eq!(out.get_pixel(10, 10).0, [0, 0, 0, 255]);
    assert_eq!(out.get_pixel(2, 2).0, [255, 255, 255, 255]);
}

// ============================================================================
// Contours
// ============================================================================

#[test]
fn test_radial_contours_are_closed_rings() {
    let data = radial_grid(21);
    let contours = generate_all_contours(&data, 21, 21, &[5.5], 0);
    assert_eq!(contours.len(), 1);
    let ring = &contours[0];
    assert!(ring.closed);
    for p in &ring.points {
        let r = ((p.x - 10.0).powi(2) + (p.y - 10.0).powi(2)).sqrt();
        assert!((r - 4.5).abs() < 0.5, "point {:?} off the ring", p);
    }
}

#[test]
fn test_render_contours_draws_lines() {
    let data = radial_grid(21);
    let contours = generate_all_contours(&data, 21, 21, &[5.5], 1);
    let mut canvas = Canvas::new(84, 84, Color::WHITE).unwrap();
    let style = ContourStyle {
        colors: vec![Color::rgb(255, 0, 0)],
        ..ContourStyle::default()
    };
    render_contours(&mut canvas, &contours, &[5.5], &style, &FontBook::empty(), |p: Point| {
        Some((p.x as f32 * 4.0 + 2.0, p.y as f32 * 4.0 + 2.0))
    });
    let red = canvas
        .to_rgba()
        .chunks_exact(4)
        .filter(|px| px[0] > 200 && px[1] < 80 && px[2] < 80)
        .count();
    assert!(red > 50);
}

// ============================================================================
// PNG output
// ============================================================================

#[test]
fn test_auto_png_picks_indexed_for_flat_figures() {
    let canvas = Canvas::new(64, 64, Color::WHITE).unwrap();
    let png = canvas.encode_png(Some(100.0)).unwrap();
    assert_eq!(&png[1..4], b"PNG");
    assert_eq!(png_color_type(&png), 3);
}

#[test]
fn test_auto_png_falls_back_to_rgba() {
    let pixels: Vec<u8> = (0..64 * 64u32)
        .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, (i % 7) as u8, 255])
        .collect();
    let png = create_png_auto(&pixels, 64, 64, None).unwrap();
    assert_eq!(png_color_type(&png), 6);
}

#[test]
fn test_png_rejects_bad_length() {
    assert!(create_png(&[0, 0, 0], 1, 1, None).is_err());
}

#[test]
fn test_png_decodes_with_image_crate() {
    let mut canvas = Canvas::new(16, 8, Color::WHITE).unwrap();
    canvas.fill_rect(PixelRect::new(0.0, 0.0, 8.0, 8.0), Color::rgb(0, 0, 255));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("figure.png");
    canvas.save_png(&path, Some(72.0)).unwrap();

    let decoded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (16, 8));
    assert_eq!(decoded.get_pixel(2, 2).0, [0, 0, 255, 255]);
    assert_eq!(decoded.get_pixel(12, 2).0, [255, 255, 255, 255]);
}
