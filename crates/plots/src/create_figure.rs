//! Figure holding a grid of subplots and its PNG output.

use std::path::{Path, PathBuf};

use renderer::{Canvas, Color, FontBook, FontWeight, HAlign, PixelRect, TextStyle, VAlign};
use tracing::{debug, info};

use emc_common::{EmcError, EmcResult, Timer};

use crate::config::PlotsConfig;
use crate::context::RenderContext;
use crate::create_plot::CreatePlot;

/// Title above every subplot.
#[derive(Debug, Clone, PartialEq)]
pub struct Suptitle {
    pub text: String,
    pub fontsize: f32,
    pub fontweight: FontWeight,
}

impl Suptitle {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fontsize: 16.0,
            fontweight: FontWeight::Normal,
        }
    }
}

/// `nrows` x `ncols` subplots rendered onto one canvas.
pub struct CreateFigure {
    pub nrows: usize,
    pub ncols: usize,
    /// Inches
    pub figsize: (f32, f32),
    pub dpi: f32,
    /// Subplots in row-major order
    pub plot_list: Vec<CreatePlot>,
    pub suptitle: Option<Suptitle>,
    tight: bool,
    font_paths: Vec<PathBuf>,
    fonts: Option<FontBook>,
    features_dir: Option<PathBuf>,
    canvas: Option<Canvas>,
}

impl Default for CreateFigure {
    fn default() -> Self {
        Self::new(1, 1, (8.0, 6.0))
    }
}

impl CreateFigure {
    pub fn new(nrows: usize, ncols: usize, figsize: (f32, f32)) -> Self {
        Self {
            nrows,
            ncols,
            figsize,
            dpi: 100.0,
            plot_list: Vec::new(),
            suptitle: None,
            tight: false,
            font_paths: Vec::new(),
            fonts: None,
            features_dir: None,
            canvas: None,
        }
    }

    /// Take resolution, fonts and the features directory from a config.
    pub fn with_config(mut self, config: &PlotsConfig) -> Self {
        self.dpi = config.dpi;
        self.font_paths = config.fonts.clone();
        self.features_dir = config.features_dir.clone();
        self.fonts = None;
        self
    }

    /// Use these fonts instead of discovering them.
    pub fn with_fonts(mut self, fonts: FontBook) -> Self {
        self.fonts = Some(fonts);
        self
    }

    pub fn features_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.features_dir = Some(dir.into());
        self
    }

    pub fn add_suptitle(&mut self, suptitle: impl Into<String>, fontsize: f32, fontweight: FontWeight) {
        self.suptitle = Some(Suptitle {
            text: suptitle.into(),
            fontsize,
            fontweight,
        });
    }

    /// Shrink subplot margins to what their labels need.
    pub fn tight_layout(&mut self) {
        self.tight = true;
    }

    /// Canvas size in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.figsize.0 * self.dpi).round().max(1.0) as u32,
            (self.figsize.1 * self.dpi).round().max(1.0) as u32,
        )
    }

    /// Cell of the subplot at `index` below a band of `top` pixels.
    fn cell(&self, index: usize, top: f32) -> PixelRect {
        let (w, h) = self.pixel_size();
        let cw = w as f32 / self.ncols as f32;
        let ch = (h as f32 - top) / self.nrows as f32;
        let (row, col) = (index / self.ncols, index % self.ncols);
        PixelRect::new(col as f32 * cw, top + row as f32 * ch, cw, ch)
    }

    /// Render every subplot into its grid cell.
    pub fn create_figure(&mut self) -> EmcResult<()> {
        if self.nrows == 0 || self.ncols == 0 {
            return Err(EmcError::InvalidArgument(format!(
                "figure grid must have at least one row and column, got {}x{}",
                self.nrows, self.ncols
            )));
        }
        if self.plot_list.len() > self.nrows * self.ncols {
            return Err(EmcError::InvalidArgument(format!(
                "{} plots do not fit a {}x{} figure",
                self.plot_list.len(),
                self.nrows,
                self.ncols
            )));
        }
        if self.dpi.is_nan() || self.dpi <= 0.0 {
            return Err(EmcError::InvalidArgument(format!("dpi must be positive, got {}", self.dpi)));
        }

        let timer = Timer::tic();
        let (width, height) = self.pixel_size();
        let mut canvas = Canvas::new(width, height, Color::WHITE)?;
        if self.fonts.is_none() {
            self.fonts = Some(FontBook::discover(&self.font_paths));
        }
        let fonts = self.fonts.clone().unwrap_or_default();
        let ctx = RenderContext {
            dpi: self.dpi,
            fonts: &fonts,
            features_dir: self.features_dir.as_deref(),
            tight: self.tight,
        };

        let mut top = 0.0;
        if let Some(suptitle) = self.suptitle.as_ref().filter(|s| !s.text.is_empty()) {
            let size = ctx.pt(suptitle.fontsize);
            let pad = ctx.pt(6.0);
            let style = TextStyle::new(size, Color::BLACK)
                .weight(suptitle.fontweight)
                .align(HAlign::Center, VAlign::Top);
            fonts.draw(&mut canvas, &suptitle.text, width as f32 / 2.0, pad, &style);
            top = fonts.measure(&suptitle.text, size, suptitle.fontweight).1 + 2.0 * pad;
        }

        for (i, plot) in self.plot_list.iter().enumerate() {
            let cell = self.cell(i, top);
            debug!(index = i, ?cell, map = plot.is_map(), "Rendering subplot");
            plot.render(&mut canvas, cell, &ctx)?;
        }

        info!(
            plots = self.plot_list.len(),
            width,
            height,
            elapsed_ms = timer.elapsed().as_millis() as u64,
            "Rendered figure"
        );
        self.canvas = Some(canvas);
        Ok(())
    }

    fn rendered(&mut self) -> EmcResult<&Canvas> {
        if self.canvas.is_none() {
            self.create_figure()?;
        }
        self.canvas
            .as_ref()
            .ok_or_else(|| EmcError::Render("figure was not rendered".to_string()))
    }

    /// Write the figure as PNG, rendering it first if needed.
    pub fn save_figure(&mut self, path: impl AsRef<Path>) -> EmcResult<()> {
        let path = path.as_ref();
        let dpi = self.dpi;
        self.rendered()?.save_png(path, Some(dpi))?;
        info!(path = %path.display(), "Saved figure");
        Ok(())
    }

    pub fn to_png_bytes(&mut self) -> EmcResult<Vec<u8>> {
        let dpi = self.dpi;
        Ok(self.rendered()?.encode_png(Some(dpi))?)
    }

    /// Rendered raster, if [`create_figure`](Self::create_figure) ran.
    pub fn return_figure(&self) -> Option<image::RgbaImage> {
        self.canvas.as_ref().map(Canvas::to_image)
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }
}
