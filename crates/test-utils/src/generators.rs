//! Synthetic data shaped like what the plotting and diagnostics code sees:
//! lat/lon meshes, smooth global fields, observation/background pairs and
//! a sounding.
//!
//! Random draws come from a seeded generator so every run produces the
//! same values.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::Normal;

/// Evenly spaced cell centres across `[lo, hi]`.
///
/// ```
/// use test_utils::cell_centres;
///
/// assert_eq!(cell_centres(-90.0, 90.0, 2), vec![-45.0, 45.0]);
/// ```
pub fn cell_centres(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let step = (hi - lo) / n.max(1) as f64;
    (0..n).map(|i| lo + (i as f64 + 0.5) * step).collect()
}

/// Latitude and longitude centres of a regular `nlat` x `nlon` global grid.
pub fn global_axes(nlat: usize, nlon: usize) -> (Vec<f64>, Vec<f64>) {
    (cell_centres(-90.0, 90.0, nlat), cell_centres(-180.0, 180.0, nlon))
}

/// Row-major temperature in Kelvin: warm tropics, cold poles and a
/// wavenumber-2 ripple along longitude.
pub fn temperature_field(lats: &[f64], lons: &[f64]) -> Vec<f64> {
    let mut data = Vec::with_capacity(lats.len() * lons.len());
    for &lat in lats {
        for &lon in lons {
            let s = lat.to_radians().sin();
            data.push(300.0 - 50.0 * s * s + 5.0 * (2.0 * lon.to_radians()).cos());
        }
    }
    data
}

/// Zonal and meridional wind of a mid-latitude jet, row-major.
pub fn jet_wind(lats: &[f64], lons: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut u = Vec::with_capacity(lats.len() * lons.len());
    let mut v = Vec::with_capacity(lats.len() * lons.len());
    for &lat in lats {
        for &lon in lons {
            let jet = (-((lat.abs() - 40.0) / 12.0).powi(2)).exp();
            u.push(40.0 * jet);
            v.push(8.0 * jet * (3.0 * lon.to_radians()).sin());
        }
    }
    (u, v)
}

/// `n` draws from a normal distribution.
pub fn gaussian_values(n: usize, mean: f64, std_dev: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    match Normal::new(mean, std_dev) {
        Ok(dist) => (0..n).map(|_| rng.sample(dist)).collect(),
        Err(_) => vec![mean; n],
    }
}

/// Observations at random locations with a background that differs by a
/// known bias plus noise.
#[derive(Debug, Clone, PartialEq)]
pub struct ObsPair {
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
    pub observation: Vec<f64>,
    pub background: Vec<f64>,
}

impl ObsPair {
    /// Observation minus background.
    pub fn omb(&self) -> Vec<f64> {
        self.observation
            .iter()
            .zip(&self.background)
            .map(|(o, b)| o - b)
            .collect()
    }
}

/// Temperature observations whose background runs `bias` too warm.
pub fn obs_background_pairs(n: usize, bias: f64, noise: f64, seed: u64) -> ObsPair {
    let mut rng = StdRng::seed_from_u64(seed);
    let latitude: Vec<f64> = (0..n).map(|_| rng.gen_range(-80.0..80.0)).collect();
    let longitude: Vec<f64> = (0..n).map(|_| rng.gen_range(-180.0..180.0)).collect();
    let truth = temperature_at(&latitude, &longitude);
    let obs_noise = gaussian_values(n, 0.0, noise, seed.wrapping_add(1));
    let bkg_noise = gaussian_values(n, 0.0, noise, seed.wrapping_add(2));
    ObsPair {
        observation: truth.iter().zip(&obs_noise).map(|(t, e)| t + e).collect(),
        background: truth.iter().zip(&bkg_noise).map(|(t, e)| t + bias + e).collect(),
        latitude,
        longitude,
    }
}

fn temperature_at(lats: &[f64], lons: &[f64]) -> Vec<f64> {
    lats.iter()
        .zip(lons)
        .map(|(&lat, &lon)| temperature_field(&[lat], &[lon])[0])
        .collect()
}

/// Vertical profile for skew-T plots.
#[derive(Debug, Clone, PartialEq)]
pub struct Sounding {
    /// hPa, surface first
    pub pressure: Vec<f64>,
    /// Celsius
    pub temperature: Vec<f64>,
    /// Celsius
    pub dewpoint: Vec<f64>,
}

/// Standard-atmosphere-like sounding from 1000 to 100 hPa.
pub fn standard_sounding(levels: usize) -> Sounding {
    let levels = levels.max(2);
    let pressure: Vec<f64> = (0..levels)
        .map(|i| 1000.0 - 900.0 * i as f64 / (levels - 1) as f64)
        .collect();
    let temperature: Vec<f64> = pressure
        .iter()
        .map(|&p| {
            // dry adiabat capped by an isothermal stratosphere
            let t = 288.15 * (p / 1013.25f64).powf(0.19) - 273.15;
            t.max(-56.5)
        })
        .collect();
    let dewpoint = temperature
        .iter()
        .zip(&pressure)
        .map(|(&t, &p)| t - 2.0 - 20.0 * (1000.0 - p) / 900.0)
        .collect();
    Sounding {
        pressure,
        temperature,
        dewpoint,
    }
}

/// Copy of `values` with NaN at the given indices.
pub fn with_nans(values: &[f64], indices: &[usize]) -> Vec<f64> {
    let mut out = values.to_vec();
    for &i in indices {
        if let Some(v) = out.get_mut(i) {
            *v = f64::NAN;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_axes() {
        let (lats, lons) = global_axes(18, 36);
        assert_eq!((lats.len(), lons.len()), (18, 36));
        assert_eq!(lats[0], -85.0);
        assert_eq!(lons[35], 175.0);
    }

    #[test]
    fn test_temperature_field_shape_and_range() {
        let (lats, lons) = global_axes(10, 20);
        let t = temperature_field(&lats, &lons);
        assert_eq!(t.len(), 200);
        assert!(t.iter().all(|&v| (240.0..=306.0).contains(&v)));
    }

    #[test]
    fn test_gaussian_values_deterministic() {
        let a = gaussian_values(100, 5.0, 2.0, 7);
        assert_eq!(a, gaussian_values(100, 5.0, 2.0, 7));
        assert_ne!(a, gaussian_values(100, 5.0, 2.0, 8));
        let mean = a.iter().sum::<f64>() / a.len() as f64;
        assert!((mean - 5.0).abs() < 1.0);
    }

    #[test]
    fn test_obs_pairs_carry_bias() {
        let pairs = obs_background_pairs(2000, 1.5, 0.5, 42);
        let omb = pairs.omb();
        let mean = omb.iter().sum::<f64>() / omb.len() as f64;
        assert!((mean + 1.5).abs() < 0.1, "mean O-B {}", mean);
    }

    #[test]
    fn test_standard_sounding() {
        let s = standard_sounding(10);
        assert_eq!(s.pressure.first(), Some(&1000.0));
        assert_eq!(s.pressure.last(), Some(&100.0));
        assert!(s.temperature[0] > s.temperature[9]);
        assert!(s.dewpoint.iter().zip(&s.temperature).all(|(d, t)| d < t));
    }

    #[test]
    fn test_with_nans() {
        let v = with_nans(&[1.0, 2.0, 3.0], &[1, 9]);
        assert!(v[1].is_nan());
        assert_eq!(v[2], 3.0);
    }
}
