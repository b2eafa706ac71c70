//! Single map plot with its own figure size.

use std::ops::{Deref, DerefMut};
use std::path::Path;

use emc_common::EmcResult;

use crate::create_figure::CreateFigure;
use crate::create_plot::{CreatePlot, DomainSpec};

/// A [`CreatePlot`] bound to a domain and projection at construction.
///
/// Only map layers can be drawn on it.
#[derive(Debug, Clone)]
pub struct CreateMap {
    /// Inches
    pub figsize: (f32, f32),
    plot: CreatePlot,
}

impl CreateMap {
    pub fn new(figsize: (f32, f32), domain: impl Into<DomainSpec>, projection: &str) -> EmcResult<Self> {
        Ok(Self {
            figsize,
            plot: CreatePlot::map(domain, projection)?,
        })
    }

    pub fn into_plot(self) -> CreatePlot {
        self.plot
    }

    /// One-subplot figure holding a copy of this map.
    pub fn to_figure(&self) -> CreateFigure {
        let mut figure = CreateFigure::new(1, 1, self.figsize);
        figure.plot_list.push(self.plot.clone());
        figure
    }

    pub fn save_figure(&self, path: impl AsRef<Path>) -> EmcResult<()> {
        self.to_figure().save_figure(path)
    }
}

impl Deref for CreateMap {
    type Target = CreatePlot;

    fn deref(&self) -> &Self::Target {
        &self.plot
    }
}

impl DerefMut for CreateMap {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.plot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::LinePlot;
    use crate::map_layers::MapScatter;
    use emc_common::EmcError;

    #[test]
    fn test_map_accepts_only_map_layers() {
        let mut map = CreateMap::new((8.0, 6.0), "conus", "plcarr").unwrap();
        let scatter = MapScatter::new(vec![35.0, 40.0], vec![-100.0, -90.0], Some(vec![1.0, 2.0])).unwrap();
        assert!(map.draw_data([scatter]).is_ok());
        let line = LinePlot::new(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap();
        let err = map.draw_data([line]).unwrap_err();
        assert!(matches!(err, EmcError::InvalidChoice { ref kind, .. } if kind == "plot type"));
        assert_eq!(map.plot_layers.len(), 1);
    }

    #[test]
    fn test_invalid_projection() {
        let err = CreateMap::new((8.0, 6.0), "global", "robinson").unwrap_err().to_string();
        assert!(err.contains("plcarr | mill | npstere | spstere | lambert"));
    }

    #[test]
    fn test_to_figure_keeps_size() {
        let map = CreateMap::new((10.0, 5.0), "europe", "lambert").unwrap();
        let figure = map.to_figure();
        assert_eq!(figure.figsize, (10.0, 5.0));
        assert_eq!(figure.plot_list.len(), 1);
        assert!(figure.plot_list[0].is_map());
    }
}
