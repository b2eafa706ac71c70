//! Plot-data layers drawn on map axes.

use renderer::{LineStyle, Marker};

use emc_common::{EmcError, EmcResult};

/// Row-major 2-D mesh: `values[row * ncols + col]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field2D {
    pub nrows: usize,
    pub ncols: usize,
    pub values: Vec<f64>,
}

impl Field2D {
    pub fn new(nrows: usize, ncols: usize, values: Vec<f64>) -> EmcResult<Self> {
        if values.len() != nrows * ncols {
            return Err(EmcError::ShapeMismatch {
                what: "field values".to_string(),
                left: vec![values.len()],
                right: vec![nrows, ncols],
            });
        }
        Ok(Self {
            nrows,
            ncols,
            values,
        })
    }

    pub fn shape(&self) -> [usize; 2] {
        [self.nrows, self.ncols]
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.ncols + col]
    }

    /// Latitude and longitude meshes from 1-D coordinate vectors.
    ///
    /// Rows follow `lats`, columns follow `lons`.
    pub fn meshgrid(lats: &[f64], lons: &[f64]) -> (Field2D, Field2D) {
        let (nrows, ncols) = (lats.len(), lons.len());
        let lat = lats
            .iter()
            .flat_map(|&la| std::iter::repeat(la).take(ncols))
            .collect();
        let lon = (0..nrows).flat_map(|_| lons.iter().copied()).collect();
        (
            Field2D {
                nrows,
                ncols,
                values: lat,
            },
            Field2D {
                nrows,
                ncols,
                values: lon,
            },
        )
    }

    /// Finite minimum and maximum, if any value is finite.
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        let (lo, hi) = self
            .values
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        lo.is_finite().then_some((lo, hi))
    }
}

fn check_mesh(latitude: &Field2D, longitude: &Field2D, data: &Field2D) -> EmcResult<()> {
    for (what, other) in [("longitude", longitude), ("data", data)] {
        if other.shape() != latitude.shape() {
            return Err(EmcError::ShapeMismatch {
                what: format!("latitude vs {}", what),
                left: latitude.shape().to_vec(),
                right: other.shape().to_vec(),
            });
        }
    }
    Ok(())
}

/// Points at latitude/longitude, optionally colored by data.
#[derive(Debug, Clone, PartialEq)]
pub struct MapScatter {
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
    pub data: Option<Vec<f64>>,
    pub marker: Marker,
    /// Marker area in points squared
    pub markersize: f32,
    pub linewidths: f32,
    pub edgecolors: Option<String>,
    pub alpha: Option<f32>,
    pub label: Option<String>,
    /// Single color used when there is no data
    pub color: String,
    pub cmap: String,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub colorbar: bool,
}

impl MapScatter {
    pub fn new(latitude: Vec<f64>, longitude: Vec<f64>, data: Option<Vec<f64>>) -> EmcResult<Self> {
        if latitude.len() != longitude.len() {
            return Err(EmcError::length_mismatch(
                "map scatter latitude and longitude",
                latitude.len(),
                longitude.len(),
            ));
        }
        if let Some(d) = &data {
            if d.len() != latitude.len() {
                return Err(EmcError::length_mismatch("map scatter data", d.len(), latitude.len()));
            }
        }
        let colorbar = data.is_some();
        Ok(Self {
            latitude,
            longitude,
            data,
            marker: Marker::Circle,
            markersize: 5.0,
            linewidths: 1.5,
            edgecolors: None,
            alpha: None,
            label: None,
            color: "tab:blue".to_string(),
            cmap: "viridis".to_string(),
            vmin: None,
            vmax: None,
            colorbar,
        })
    }
}

/// Colored mesh cells.
#[derive(Debug, Clone, PartialEq)]
pub struct MapGridded {
    pub latitude: Field2D,
    pub longitude: Field2D,
    pub data: Field2D,
    pub cmap: String,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub alpha: Option<f32>,
    pub colorbar: bool,
}

impl MapGridded {
    pub fn new(latitude: Field2D, longitude: Field2D, data: Field2D) -> EmcResult<Self> {
        check_mesh(&latitude, &longitude, &data)?;
        Ok(Self {
            latitude,
            longitude,
            data,
            cmap: "viridis".to_string(),
            vmin: None,
            vmax: None,
            alpha: None,
            colorbar: true,
        })
    }
}

/// Contour lines of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MapContour {
    pub latitude: Field2D,
    pub longitude: Field2D,
    pub data: Field2D,
    /// Explicit levels; chosen from the data range when `None`
    pub levels: Option<Vec<f64>>,
    /// Label each line with its level
    pub clabel: bool,
    pub colors: String,
    pub linewidths: f32,
    pub linestyles: LineStyle,
    pub alpha: Option<f32>,
    pub colorbar: bool,
}

impl MapContour {
    pub fn new(latitude: Field2D, longitude: Field2D, data: Field2D) -> EmcResult<Self> {
        check_mesh(&latitude, &longitude, &data)?;
        Ok(Self {
            latitude,
            longitude,
            data,
            levels: None,
            clabel: false,
            colors: "black".to_string(),
            linewidths: 1.5,
            linestyles: LineStyle::Solid,
            alpha: None,
            colorbar: false,
        })
    }
}

/// Filled bands between contour levels.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFilledContour {
    pub latitude: Field2D,
    pub longitude: Field2D,
    pub data: Field2D,
    pub levels: Option<Vec<f64>>,
    pub cmap: String,
    pub alpha: Option<f32>,
    pub colorbar: bool,
}

impl MapFilledContour {
    pub fn new(latitude: Field2D, longitude: Field2D, data: Field2D) -> EmcResult<Self> {
        check_mesh(&latitude, &longitude, &data)?;
        Ok(Self {
            latitude,
            longitude,
            data,
            levels: None,
            cmap: "viridis".to_string(),
            alpha: None,
            colorbar: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlotLayer;

    #[test]
    fn test_meshgrid_layout() {
        let (lat, lon) = Field2D::meshgrid(&[10.0, 20.0], &[1.0, 2.0, 3.0]);
        assert_eq!(lat.shape(), [2, 3]);
        assert_eq!(lat.get(1, 0), 20.0);
        assert_eq!(lon.get(1, 2), 3.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let (lat, lon) = Field2D::meshgrid(&[0.0, 1.0], &[0.0, 1.0]);
        let data = Field2D::new(1, 4, vec![0.0; 4]).unwrap();
        assert!(matches!(
            MapGridded::new(lat, lon, data),
            Err(EmcError::ShapeMismatch { .. })
        ));
        assert!(Field2D::new(2, 2, vec![0.0; 3]).is_err());
    }

    #[test]
    fn test_map_scatter_colorbar_follows_data() {
        let plain = MapScatter::new(vec![0.0], vec![0.0], None).unwrap();
        assert!(!plain.colorbar);
        assert_eq!(plain.color, "tab:blue");
        let colored = MapScatter::new(vec![0.0], vec![0.0], Some(vec![1.0])).unwrap();
        assert!(colored.colorbar);
        assert_eq!(colored.cmap, "viridis");
        assert!(MapScatter::new(vec![0.0], vec![0.0], Some(vec![])).is_err());
    }

    #[test]
    fn test_contour_defaults() {
        let (lat, lon) = Field2D::meshgrid(&[0.0, 1.0], &[0.0, 1.0]);
        let data = Field2D::new(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let c = MapContour::new(lat, lon, data).unwrap();
        assert_eq!(c.colors, "black");
        assert!(!c.clabel && !c.colorbar);
        let layer: PlotLayer = c.into();
        assert_eq!(layer.plottype(), "map_contour");
        assert!(layer.is_map_layer());
    }
}
