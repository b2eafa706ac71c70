//! End-to-end rendering tests for the plots crate.
//!
//! Every test renders with an empty font book so results do not depend on
//! the fonts installed on the machine.

use emc_common::EmcError;
use plots::{
    ColorbarPreset, ColorbarSpec, CreateFigure, CreateMap, CreatePlot, Density, Field2D, FontBook, FontWeight,
    Grid, Histogram, HorizontalLine, HorizontalSpan, Legend, LinePlot, MapContour, MapFilledContour, MapGridded,
    MapScatter, PlotLayer, PlotsConfig, Scatter, SkewT, StatsText, TextAnnotation, TickLabels, Transform,
    VariableSpecs,
};
use test_utils::{
    gaussian_values, global_axes, jet_wind, obs_background_pairs, standard_sounding, temperature_field, with_nans,
    ISLAND_GEOJSON,
};

fn figure(nrows: usize, ncols: usize, figsize: (f32, f32)) -> CreateFigure {
    CreateFigure::new(nrows, ncols, figsize).with_fonts(FontBook::empty())
}

/// Number of pixels that are not pure white.
fn inked_pixels(fig: &CreateFigure) -> usize {
    let img = fig.return_figure().expect("figure was rendered");
    img.pixels().filter(|p| p.0 != [255, 255, 255, 255]).count()
}

fn inked_in(fig: &CreateFigure, x0: u32, y0: u32, x1: u32, y1: u32) -> usize {
    let img = fig.return_figure().expect("figure was rendered");
    let mut n = 0;
    for y in y0..y1 {
        for x in x0..x1 {
            if img.get_pixel(x, y).0 != [255, 255, 255, 255] {
                n += 1;
            }
        }
    }
    n
}

// ============================================================================
// Cartesian plots
// ============================================================================

#[test]
fn test_scatter_with_regression_and_stats() {
    let pairs = obs_background_pairs(300, 0.8, 1.0, 3);
    let mut scatter = Scatter::new(pairs.observation.clone(), pairs.background.clone()).unwrap();
    scatter.add_linear_regression();
    assert_eq!(scatter.label.as_deref(), Some("n=300"));

    let mut plot = CreatePlot::new();
    plot.draw_data([scatter]).unwrap();
    plot.add_title("Observation vs background");
    plot.add_xlabel("Observation (K)");
    plot.add_ylabel("Background (K)");
    plot.add_grid(Grid::default());
    plot.add_legend(Legend::default());
    plot.add_stats_dict(StatsText::new([("nobs", 300.to_string()), ("bias", format!("{:.3}", -0.8))]));

    let mut fig = figure(1, 1, (6.0, 5.0));
    fig.plot_list.push(plot);
    fig.create_figure().unwrap();
    assert_eq!(fig.return_figure().map(|i| i.dimensions()), Some((600, 500)));
    assert!(inked_pixels(&fig) > 1000);
}

#[test]
fn test_density_scatter_with_colorbar() {
    let x = gaussian_values(2000, 0.0, 1.0, 11);
    let y: Vec<f64> = x
        .iter()
        .zip(gaussian_values(2000, 0.0, 0.3, 12))
        .map(|(a, e)| 2.0 * a + e)
        .collect();
    let mut scatter = Scatter::new(x, y).unwrap();
    scatter.density_scatter();

    let mut plot = CreatePlot::new();
    plot.draw_data([scatter]).unwrap();
    plot.add_colorbar(ColorbarSpec::with_label("Density")).unwrap();

    let mut fig = figure(1, 1, (5.0, 4.0));
    fig.plot_list.push(plot);
    fig.create_figure().unwrap();
    assert!(inked_pixels(&fig) > 1000);
}

#[test]
fn test_histogram_density_and_lines() {
    let data = with_nans(&gaussian_values(500, 10.0, 2.0, 5), &[0, 10, 20]);
    let hist = Histogram::new(data.clone());
    assert_eq!(hist.label.as_deref(), Some("n=497"));
    let kde = Density::new(data);

    let mut plot = CreatePlot::new();
    plot.draw_data(vec![
        PlotLayer::from(hist),
        PlotLayer::from(kde),
        PlotLayer::from(HorizontalLine::new(0.0)),
        PlotLayer::from(HorizontalSpan::new(0.01, 0.02)),
    ])
    .unwrap();
    plot.add_legend(Legend::default());

    let mut fig = figure(1, 1, (4.0, 3.0));
    fig.plot_list.push(plot);
    fig.create_figure().unwrap();
    assert!(inked_pixels(&fig) > 500);
}

#[test]
fn test_skewt_sounding() {
    let sounding = standard_sounding(20);
    let mut plot = CreatePlot::new();
    let mut dewpoint = SkewT::new(sounding.dewpoint, sounding.pressure.clone()).unwrap();
    dewpoint.color = "tab:green".to_string();
    plot.draw_data([SkewT::new(sounding.temperature, sounding.pressure).unwrap(), dewpoint])
        .unwrap();
    plot.set_xlim(Some(-40.0), Some(40.0));

    let mut fig = figure(1, 1, (5.0, 5.0));
    fig.plot_list.push(plot);
    fig.create_figure().unwrap();
    assert!(inked_pixels(&fig) > 500);
}

#[test]
fn test_log_scale_and_inverted_axis() {
    let x: Vec<f64> = (1..=50).map(f64::from).collect();
    let y: Vec<f64> = x.iter().map(|v| v * v).collect();
    let mut plot = CreatePlot::new();
    plot.draw_data([LinePlot::new(x, y).unwrap()]).unwrap();
    plot.set_yscale("log").unwrap();
    plot.invert_xaxis();
    assert!(matches!(plot.set_xscale("cubic"), Err(EmcError::InvalidChoice { .. })));

    let mut fig = figure(1, 1, (4.0, 3.0));
    fig.plot_list.push(plot);
    fig.create_figure().unwrap();
}

#[test]
fn test_tick_labels_against_auto_ticks_fail_at_render() {
    let mut plot = CreatePlot::new();
    plot.draw_data([LinePlot::new(vec![0.0, 10.0], vec![0.0, 1.0]).unwrap()])
        .unwrap();
    // no explicit ticks, so the count is only known once limits are computed
    plot.set_xticklabels(TickLabels::new(["a", "b"])).unwrap();

    let mut fig = figure(1, 1, (4.0, 3.0));
    fig.plot_list.push(plot);
    assert!(matches!(fig.create_figure(), Err(EmcError::TickLabelMismatch { .. })));
}

#[test]
fn test_explicit_ticks_with_rotated_labels() {
    let hours: Vec<f64> = (0..24).map(f64::from).collect();
    let counts: Vec<f64> = hours.iter().map(|h| 100.0 + 10.0 * (h / 4.0).sin()).collect();
    let mut plot = CreatePlot::new();
    plot.draw_data([LinePlot::new(hours.clone(), counts).unwrap()]).unwrap();
    plot.set_xticks(hours);
    plot.set_xticklabels(TickLabels::new((0..24).map(|h| format!("{:02}00", h))).rotation(90.0))
        .unwrap();
    plot.add_text(TextAnnotation {
        transform: Transform::Data,
        ..TextAnnotation::new(12.0, 105.0, "noon")
    });

    let mut fig = figure(1, 1, (6.0, 3.0));
    fig.plot_list.push(plot);
    fig.create_figure().unwrap();
}

// ============================================================================
// Maps
// ============================================================================

fn global_temperature() -> (Field2D, Field2D, Field2D) {
    let (lats, lons) = global_axes(18, 36);
    let (lat, lon) = Field2D::meshgrid(&lats, &lons);
    let data = Field2D::new(18, 36, temperature_field(&lats, &lons)).unwrap();
    (lat, lon, data)
}

#[test]
fn test_global_gridded_map() {
    let (lat, lon, data) = global_temperature();
    let specs = VariableSpecs::new("temperature", "magnitude").unwrap();
    let mut gridded = MapGridded::new(lat, lon, data).unwrap();
    gridded.cmap = specs.cmap.clone();
    gridded.vmin = Some(specs.vmin);
    gridded.vmax = Some(specs.vmax);

    let mut map = CreateMap::new((8.0, 5.0), "global", "plcarr").unwrap();
    map.draw_data([gridded]).unwrap();
    map.add_colorbar(ColorbarSpec::with_label("Temperature (K)")).unwrap();
    map.add_title("2m temperature");

    let mut fig = map.to_figure().with_fonts(FontBook::empty());
    fig.create_figure().unwrap();
    let (w, h) = fig.pixel_size();
    // the middle of the map is painted by the field
    assert!(inked_in(&fig, w / 2 - 20, h / 2 - 20, w / 2 + 20, h / 2 + 20) > 400);
}

#[test]
fn test_contours_over_filled_contours() {
    let (lats, lons) = global_axes(30, 60);
    let (u, _) = jet_wind(&lats, &lons);
    let (lat, lon) = Field2D::meshgrid(&lats, &lons);
    let speed = Field2D::new(30, 60, u).unwrap();

    let filled = MapFilledContour::new(lat.clone(), lon.clone(), speed.clone()).unwrap();
    let mut lines = MapContour::new(lat, lon, speed).unwrap();
    lines.levels = Some(vec![10.0, 20.0, 30.0]);
    lines.clabel = true;

    let mut map = CreateMap::new((6.0, 4.0), "north america", "lambert").unwrap();
    map.draw_data(vec![PlotLayer::from(filled), PlotLayer::from(lines)]).unwrap();
    map.add_colorbar(ColorbarSpec::default()).unwrap();

    let mut fig = map.to_figure().with_fonts(FontBook::empty());
    fig.create_figure().unwrap();
    assert!(inked_pixels(&fig) > 2000);
}

#[test]
fn test_polar_scatter_with_features() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("coastline.json"), ISLAND_GEOJSON).unwrap();
    std::fs::write(dir.path().join("land.json"), ISLAND_GEOJSON).unwrap();

    let pairs = obs_background_pairs(200, 0.0, 1.0, 9);
    let lat: Vec<f64> = pairs.latitude.iter().map(|l| l.abs()).collect();
    let scatter = MapScatter::new(lat, pairs.longitude.clone(), Some(pairs.omb())).unwrap();
    assert!(scatter.colorbar);

    let mut map = CreateMap::new((5.0, 5.0), "global", "npstere").unwrap();
    map.draw_data([scatter]).unwrap();
    // states.json is absent and gets skipped with a warning
    map.add_map_features(&["coastline", "land", "states", "ocean"]).unwrap();
    map.add_colorbar(ColorbarSpec::default()).unwrap();

    let mut fig = map.to_figure().with_fonts(FontBook::empty()).features_dir(dir.path());
    fig.create_figure().unwrap();
}

#[test]
fn test_unknown_map_feature() {
    let mut map = CreateMap::new((5.0, 5.0), "conus", "plcarr").unwrap();
    let err = map.add_map_features(&["coastline", "glaciers"]).unwrap_err();
    assert!(err.to_string().contains("glaciers"));
}

#[test]
fn test_map_layer_on_cartesian_axes() {
    let scatter = MapScatter::new(vec![10.0], vec![20.0], None).unwrap();
    let mut plot = CreatePlot::new();
    assert!(matches!(plot.draw_data([scatter]), Err(EmcError::InvalidChoice { .. })));
}

// ============================================================================
// Figures
// ============================================================================

#[test]
fn test_two_panel_figure_with_suptitle() {
    let pairs = obs_background_pairs(100, 0.5, 1.0, 21);
    let mut top = CreatePlot::new();
    top.draw_data([Histogram::new(pairs.omb())]).unwrap();
    let mut bottom = CreatePlot::new();
    bottom
        .draw_data([Scatter::new(pairs.observation, pairs.background).unwrap()])
        .unwrap();

    let mut fig = figure(2, 1, (6.0, 8.0));
    fig.plot_list = vec![top, bottom];
    fig.add_suptitle("O-B", 16.0, FontWeight::Bold);
    fig.tight_layout();
    let bytes = fig.to_png_bytes().unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

    // both halves carry a subplot
    assert!(inked_in(&fig, 0, 0, 600, 400) > 500);
    assert!(inked_in(&fig, 0, 400, 600, 800) > 500);
}

#[test]
fn test_figure_uses_config_dpi() {
    let config = PlotsConfig::from_yaml("dpi: 50\n").unwrap();
    let fig = CreateFigure::new(1, 1, (4.0, 2.0)).with_config(&config);
    assert_eq!(fig.pixel_size(), (200, 100));
}

#[test]
fn test_colorbar_preset_drives_gridded_map() {
    let preset = ColorbarPreset::new("ugrd", "magnitude").unwrap();
    let (lats, lons) = global_axes(10, 20);
    let (u, _) = jet_wind(&lats, &lons);
    let (lat, lon) = Field2D::meshgrid(&lats, &lons);
    let mut gridded = MapGridded::new(lat, lon, Field2D::new(10, 20, u).unwrap()).unwrap();
    gridded.vmin = Some(preset.vmin);
    gridded.vmax = Some(preset.vmax);
    gridded.cmap = preset.cmap.clone();

    let plot = {
        let mut map = CreateMap::new((4.0, 3.0), "europe", "mill").unwrap();
        map.draw_data([gridded]).unwrap();
        map.into_plot()
    };
    let mut fig = figure(1, 1, (4.0, 3.0));
    fig.plot_list.push(plot);
    fig.create_figure().unwrap();
}
