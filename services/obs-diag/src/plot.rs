//! Hour-of-day figures for [`ObsSpaceStats`].

use std::path::{Path, PathBuf};

use emc_common::{EmcError, EmcResult};
use plots::{
    AxisLabel, CreateFigure, CreatePlot, FontWeight, Grid, HorizontalLine, Legend, LegendLoc, LinePlot, LineStyle, Marker,
    PlotLayer, PlotsConfig, TextLoc, TickLabels, Title,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::obspace::{DiagRequest, ObsSpaceStats, Statistic, HOURS};
use crate::source::ObType;

/// What to draw and how large.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    pub statistics: Vec<Statistic>,
    pub zero_line: bool,
    pub one_line: bool,
    pub suptitle_fontsize: f32,
    pub title_fontsize: f32,
    pub xy_label_fontsize: f32,
    pub tick_label_fontsize: f32,
    pub linewidth: f32,
    pub markersize: f32,
    /// One per experiment, cycled
    pub linestyles: Vec<String>,
    /// Multiplies the 8x6 inch base size
    pub scale_fig_size: f32,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            statistics: Statistic::DEFAULT_PLOTTED.to_vec(),
            zero_line: true,
            one_line: true,
            suptitle_fontsize: 15.0,
            title_fontsize: 9.0,
            xy_label_fontsize: 13.0,
            tick_label_fontsize: 10.0,
            linewidth: 1.5,
            markersize: 4.0,
            linestyles: ["-", "--", ":", "-."].iter().map(|s| s.to_string()).collect(),
            scale_fig_size: 1.2,
        }
    }
}

impl PlotSettings {
    fn linestyle(&self, expt: usize) -> EmcResult<LineStyle> {
        match self.linestyles.get(expt % self.linestyles.len().max(1)) {
            Some(ls) => Ok(ls.parse::<LineStyle>()?),
            None => Ok(LineStyle::Solid),
        }
    }

    fn line(&self, y: &[f64], color: &str, linestyle: LineStyle, label: String) -> EmcResult<LinePlot> {
        let mut lp = LinePlot::new(hour_axis(), y.to_vec())?;
        lp.color = color.to_string();
        lp.linestyle = linestyle;
        lp.linewidth = self.linewidth;
        lp.marker = Some(Marker::Circle);
        lp.markersize = self.markersize;
        lp.label = Some(label);
        Ok(lp)
    }

    fn tick_labels(&self) -> TickLabels {
        let mut labels = TickLabels::new(hour_labels()).rotation(90.0);
        labels.fontsize = self.tick_label_fontsize;
        labels
    }
}

const X_MIN: f64 = -100.0;
const X_MAX: f64 = 2400.0;

/// 0, 100, ..., 2300
fn hour_axis() -> Vec<f64> {
    (0..HOURS).map(|h| (h * 100) as f64).collect()
}

/// "0000", "0100", ..., "2300"
fn hour_labels() -> Vec<String> {
    (0..HOURS).map(|h| format!("{:04}", h * 100)).collect()
}

/// Red subplot title listing the observation filter.
pub fn filter_title(request: &DiagRequest, ob_type: ObType) -> String {
    let b = request.effective_bounds();
    format!(
        "Filtered by:\n{}{:?},  {:.1}-{:.1} hPa,  {:.1}-{:.1} degN,  {:.1}-{:.1} degE,  {:.6}-{:.1} err",
        ob_type,
        request.codes(ob_type),
        b.p_max,
        b.p_min,
        b.lat_min,
        b.lat_max,
        b.lon_min,
        b.lon_max,
        b.error_min,
        b.error_max
    )
}

fn legend(n_expt: usize) -> Legend {
    Legend {
        loc: LegendLoc::UpperLeft,
        ncol: n_expt.max(1),
        ..Legend::default()
    }
}

/// Statistics on top, observation counts below.
pub fn build_figure(
    stats: &ObsSpaceStats,
    request: &DiagRequest,
    ob_type: ObType,
    settings: &PlotSettings,
) -> EmcResult<CreateFigure> {
    let i_o = stats.ob_index(ob_type).ok_or_else(|| {
        let names: Vec<&str> = stats.ob_types.iter().map(ObType::name).collect();
        EmcError::invalid_choice("observation type", ob_type.name(), &names)
    })?;
    let n_expt = stats.experiments.len();

    let mut layers: Vec<PlotLayer> = Vec::new();
    let mut counts: Vec<PlotLayer> = Vec::new();
    for (i_e, expt) in stats.experiments.iter().enumerate() {
        let ls = settings.linestyle(i_e)?;
        for stat in &settings.statistics {
            let y = stats.statistic(*stat).series(i_o, i_e);
            let label = format!("{} ({})", stat.label(), expt);
            layers.push(settings.line(y, stat.color(), ls, label)?.into());
        }
        for (show, y) in [(settings.zero_line, 0.0), (settings.one_line, 1.0)] {
            if show {
                let mut line = HorizontalLine::new(y);
                line.linewidth = 1.0;
                layers.push(line.into());
            }
        }

        let total = stats.num_obs_total.series(i_o, i_e);
        let assim = stats.num_obs_assim.series(i_o, i_e);
        counts.push(settings.line(total, "black", ls, format!("total ({})", expt))?.into());
        counts.push(settings.line(assim, "gray", ls, format!("assim ({})", expt))?.into());
    }

    let mut top = CreatePlot::new();
    top.draw_data(layers)?;
    top.add_title(Title {
        loc: TextLoc::Left,
        fontsize: settings.title_fontsize,
        color: "red".to_string(),
        italic: true,
        ..Title::new(filter_title(request, ob_type))
    });
    top.add_ylabel(AxisLabel {
        fontsize: settings.xy_label_fontsize,
        ..AxisLabel::new("stats")
    });
    top.add_grid(Grid::default());
    top.set_xlim(Some(X_MIN), Some(X_MAX));
    top.set_xticks(hour_axis());
    top.set_xticklabels(settings.tick_labels())?;
    top.add_legend(legend(n_expt));

    let mut bottom = CreatePlot::new();
    bottom.draw_data(counts)?;
    bottom.add_xlabel(AxisLabel {
        fontsize: settings.xy_label_fontsize,
        ..AxisLabel::new("Time (UTC)")
    });
    bottom.add_ylabel(AxisLabel {
        fontsize: settings.xy_label_fontsize,
        ..AxisLabel::new("Number of Observations")
    });
    bottom.add_grid(Grid::default());
    bottom.set_xlim(Some(X_MIN), Some(X_MAX));
    bottom.set_xticks(hour_axis());
    bottom.set_xticklabels(settings.tick_labels())?;
    bottom.add_legend(legend(n_expt));

    let scale = settings.scale_fig_size;
    let mut fig = CreateFigure::new(2, 1, (8.0 * scale, 6.0 * scale));
    fig.plot_list = vec![top, bottom];
    let first = stats.dates.first().map(String::as_str).unwrap_or_default();
    let last = stats.dates.last().map(String::as_str).unwrap_or_default();
    fig.add_suptitle(
        format!("Obs Space Diagnostics ({}-{})", first, last),
        settings.suptitle_fontsize,
        FontWeight::Normal,
    );
    fig.tight_layout();
    Ok(fig)
}

/// Write `obs_diag_{ob}.png` for every observation type into `out_dir`.
pub fn save_figures(
    stats: &ObsSpaceStats,
    request: &DiagRequest,
    settings: &PlotSettings,
    plots_config: &PlotsConfig,
    out_dir: &Path,
) -> EmcResult<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;
    let mut written = Vec::with_capacity(stats.ob_types.len());
    for ob_type in &stats.ob_types {
        let mut fig = build_figure(stats, request, *ob_type, settings)?.with_config(plots_config);
        let path = out_dir.join(format!("obs_diag_{}.png", ob_type));
        fig.save_figure(&path)?;
        written.push(path);
    }
    info!(figures = written.len(), out_dir = %out_dir.display(), "Wrote diagnostics figures");
    Ok(written)
}
