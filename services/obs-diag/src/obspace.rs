//! Observation-space ensemble statistics by hour of day.
//!
//! For every analysis time in a date range, every observation type and every
//! experiment, the ensemble's observation-minus-forecast values are combined
//! into an ensemble mean and variance per observation. Innovations against
//! the ensemble mean are summed into a bucket for that (observation type,
//! experiment, hour of day), and the statistics are derived from the sums
//! once all dates are read.
//!
//! Member 1 decides which observations are used: its quality-control
//! columns are filtered once and the same mask is applied to every member.
//!
//! `rmse` is the RMS error of the ensemble mean forecast, which is the same
//! quantity as `rms`. It has its own cube for callers that read it by name
//! but is left out of [`Statistic::DEFAULT_PLOTTED`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use emc_common::time::{daterange, splitdate};
use emc_common::{filter_obs, EmcError, FilterBounds, Hemisphere, Timer};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DiagError, DiagResult};
use crate::source::{DiagSource, ObType};

/// Buckets per day.
pub const HOURS: usize = 24;

pub const DEFAULT_CODES_UV: [i32; 11] = [280, 281, 282, 220, 221, 230, 231, 232, 233, 234, 235];
pub const DEFAULT_CODES_TQ: [i32; 10] = [180, 181, 182, 120, 130, 131, 132, 133, 134, 135];

/// Hours without an ensemble analysis.
pub fn default_skip_hours() -> Vec<u32> {
    (0..=18).collect()
}

// ============================================================================
// Request
// ============================================================================

/// Everything one aggregation run reads.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagRequest {
    pub datapath: PathBuf,
    /// `yyyymmddhh`
    pub date1: String,
    /// `yyyymmddhh`, inclusive
    pub date2: String,
    pub experiments: Vec<String>,
    pub n_mem: usize,
    pub ob_types: Vec<ObType>,
    pub codes_uv: Vec<i32>,
    pub codes_tq: Vec<i32>,
    pub bounds: FilterBounds,
    /// Overrides the lat/lon part of `bounds`
    pub hemisphere: Option<Hemisphere>,
    pub skip_hours: Vec<u32>,
}

impl DiagRequest {
    pub fn new(
        datapath: impl Into<PathBuf>,
        date1: impl Into<String>,
        date2: impl Into<String>,
        experiments: Vec<String>,
        n_mem: usize,
    ) -> Self {
        Self {
            datapath: datapath.into(),
            date1: date1.into(),
            date2: date2.into(),
            experiments,
            n_mem,
            ob_types: vec![ObType::U],
            codes_uv: DEFAULT_CODES_UV.to_vec(),
            codes_tq: DEFAULT_CODES_TQ.to_vec(),
            bounds: FilterBounds::default(),
            hemisphere: None,
            skip_hours: default_skip_hours(),
        }
    }

    /// Bufr report types kept for `ob_type`.
    pub fn codes(&self, ob_type: ObType) -> &[i32] {
        if ob_type.is_wind() {
            &self.codes_uv
        } else {
            &self.codes_tq
        }
    }

    /// `{datapath}/{expt}/{date}/mem{NNNN}/diag_conv_{kind}_ges.{date}.nc4`
    pub fn diag_path(&self, experiment: &str, date: &str, member: usize, ob_type: ObType) -> PathBuf {
        self.datapath
            .join(experiment)
            .join(date)
            .join(format!("mem{:04}", member))
            .join(format!("diag_conv_{}_ges.{}.nc4", ob_type.file_kind(), date))
    }

    /// Bounds with the hemisphere preset applied.
    pub fn effective_bounds(&self) -> FilterBounds {
        match self.hemisphere {
            Some(h) => self.bounds.with_hemisphere(h),
            None => self.bounds,
        }
    }

    fn validate(&self) -> DiagResult<()> {
        if self.n_mem == 0 {
            return Err(EmcError::InvalidArgument("at least one ensemble member is required".to_string()).into());
        }
        if self.experiments.is_empty() {
            return Err(EmcError::InvalidArgument("at least one experiment is required".to_string()).into());
        }
        if let Some(h) = self.skip_hours.iter().find(|h| **h as usize >= HOURS) {
            return Err(EmcError::InvalidArgument(format!("skip hour {} is not an hour of day", h)).into());
        }
        Ok(())
    }
}

// ============================================================================
// Results
// ============================================================================

/// Statistics derived per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    /// Mean of forecast minus observation
    Bias,
    /// RMS of forecast minus observation
    Rms,
    StdDev,
    /// RMS error of the ensemble mean forecast
    Rmse,
    /// Ensemble standard deviation
    Spread,
    /// Observation error standard deviation
    ObError,
    /// Ensemble and observation error combined
    TotalSpread,
    /// Consistency ratio, (total spread / rms)²
    Cr,
    /// Spread error ratio, spread / rms
    Ser,
}

impl Statistic {
    pub const ALL: [Statistic; 9] = [
        Statistic::Bias,
        Statistic::Rms,
        Statistic::StdDev,
        Statistic::Rmse,
        Statistic::Spread,
        Statistic::ObError,
        Statistic::TotalSpread,
        Statistic::Cr,
        Statistic::Ser,
    ];

    /// Everything but `rmse`, whose line would sit on top of `rms`.
    pub const DEFAULT_PLOTTED: [Statistic; 8] = [
        Statistic::Bias,
        Statistic::Rms,
        Statistic::StdDev,
        Statistic::Spread,
        Statistic::ObError,
        Statistic::TotalSpread,
        Statistic::Cr,
        Statistic::Ser,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Statistic::Bias => "bias",
            Statistic::Rms => "rms",
            Statistic::StdDev => "std_dev",
            Statistic::Rmse => "rmse",
            Statistic::Spread => "spread",
            Statistic::ObError => "ob_error",
            Statistic::TotalSpread => "total_spread",
            Statistic::Cr => "cr",
            Statistic::Ser => "ser",
        }
    }

    /// Legend text, before the experiment name.
    pub fn label(&self) -> &'static str {
        match self {
            Statistic::Bias => "bias of F-O",
            Statistic::Rms => "rms of F-O",
            Statistic::StdDev => "std_dev of F-O",
            Statistic::Rmse => "rmse of ensemble mean",
            Statistic::Spread => "spread (std_dev)",
            Statistic::ObError => "ob_error (std_dev)",
            Statistic::TotalSpread => "total spread (std_dev)",
            Statistic::Cr => "consistency ratio",
            Statistic::Ser => "spread error ratio",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Statistic::Bias => "green",
            Statistic::Rms => "red",
            Statistic::StdDev => "magenta",
            Statistic::Rmse => "blue",
            Statistic::Spread => "cyan",
            Statistic::ObError => "orange",
            Statistic::TotalSpread => "navy",
            Statistic::Cr => "gray",
            Statistic::Ser => "black",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Statistic {
    type Err = EmcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Statistic::ALL
            .into_iter()
            .find(|stat| stat.name() == s.trim())
            .ok_or_else(|| {
                let names: Vec<&str> = Statistic::ALL.iter().map(Statistic::name).collect();
                EmcError::invalid_choice("statistic", s, &names)
            })
    }
}

/// Values indexed by (observation type, experiment, hour).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCube {
    pub n_ob: usize,
    pub n_expt: usize,
    pub values: Vec<f64>,
}

impl StatCube {
    pub fn new(n_ob: usize, n_expt: usize, fill: f64) -> Self {
        Self {
            n_ob,
            n_expt,
            values: vec![fill; n_ob * n_expt * HOURS],
        }
    }

    fn offset(&self, ob: usize, expt: usize) -> usize {
        (ob * self.n_expt + expt) * HOURS
    }

    pub fn get(&self, ob: usize, expt: usize, hour: usize) -> f64 {
        self.values[self.offset(ob, expt) + hour]
    }

    pub fn set(&mut self, ob: usize, expt: usize, hour: usize, value: f64) {
        let i = self.offset(ob, expt) + hour;
        self.values[i] = value;
    }

    /// The 24 hourly values of one observation type and experiment.
    pub fn series(&self, ob: usize, expt: usize) -> &[f64] {
        let start = self.offset(ob, expt);
        &self.values[start..start + HOURS]
    }
}

/// Result of [`obspace_stats`]. Buckets without enough observations for a
/// statistic hold NaN; counts are zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObsSpaceStats {
    /// Every date in the range, skipped hours included
    pub dates: Vec<String>,
    pub ob_types: Vec<ObType>,
    pub experiments: Vec<String>,
    pub bias: StatCube,
    pub rms: StatCube,
    pub std_dev: StatCube,
    pub rmse: StatCube,
    pub spread: StatCube,
    pub ob_error: StatCube,
    pub total_spread: StatCube,
    pub cr: StatCube,
    pub ser: StatCube,
    pub num_obs_total: StatCube,
    pub num_obs_assim: StatCube,
}

impl ObsSpaceStats {
    fn empty(dates: Vec<String>, ob_types: Vec<ObType>, experiments: Vec<String>) -> Self {
        let cube = |fill| StatCube::new(ob_types.len(), experiments.len(), fill);
        Self {
            bias: cube(f64::NAN),
            rms: cube(f64::NAN),
            std_dev: cube(f64::NAN),
            rmse: cube(f64::NAN),
            spread: cube(f64::NAN),
            ob_error: cube(f64::NAN),
            total_spread: cube(f64::NAN),
            cr: cube(f64::NAN),
            ser: cube(f64::NAN),
            num_obs_total: cube(0.0),
            num_obs_assim: cube(0.0),
            dates,
            ob_types,
            experiments,
        }
    }

    pub fn statistic(&self, stat: Statistic) -> &StatCube {
        match stat {
            Statistic::Bias => &self.bias,
            Statistic::Rms => &self.rms,
            Statistic::StdDev => &self.std_dev,
            Statistic::Rmse => &self.rmse,
            Statistic::Spread => &self.spread,
            Statistic::ObError => &self.ob_error,
            Statistic::TotalSpread => &self.total_spread,
            Statistic::Cr => &self.cr,
            Statistic::Ser => &self.ser,
        }
    }

    pub fn ob_index(&self, ob_type: ObType) -> Option<usize> {
        self.ob_types.iter().position(|o| *o == ob_type)
    }

    fn finish(&mut self, ob: usize, expt: usize, hour: usize, sums: &BucketSums) {
        self.num_obs_total.set(ob, expt, hour, sums.total as f64);
        self.num_obs_assim.set(ob, expt, hour, sums.assim as f64);

        let n = sums.assim as f64;
        if sums.assim == 0 {
            return;
        }
        let mean_innov = sums.innov / n;
        let rms = (sums.innovsq / n).sqrt();
        let mean_ob_err_var = sums.ob_err_var / n;
        self.bias.set(ob, expt, hour, -mean_innov);
        self.rms.set(ob, expt, hour, rms);
        self.rmse.set(ob, expt, hour, rms);
        self.ob_error.set(ob, expt, hour, mean_ob_err_var.sqrt());

        if sums.assim < 2 {
            return;
        }
        let innov_var = (sums.innovsq - n * mean_innov * mean_innov) / (n - 1.0);
        let mean_fcst_var = sums.fcst_var / n;
        let spread = mean_fcst_var.sqrt();
        let total_spread = (mean_ob_err_var + mean_fcst_var).sqrt();
        self.std_dev.set(ob, expt, hour, innov_var.max(0.0).sqrt());
        self.spread.set(ob, expt, hour, spread);
        self.total_spread.set(ob, expt, hour, total_spread);
        self.cr.set(ob, expt, hour, (total_spread / rms).powi(2));
        self.ser.set(ob, expt, hour, spread / rms);
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Running sums for one (observation type, experiment, hour) bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct BucketSums {
    total: usize,
    assim: usize,
    innov: f64,
    innovsq: f64,
    fcst_var: f64,
    ob_err_var: f64,
}

/// Ensemble innovations for one (date, observation type, experiment).
#[derive(Debug, Clone, PartialEq)]
struct CycleInnovations {
    total: usize,
    /// Observation minus ensemble mean forecast
    innov: Vec<f64>,
    fcst_var: Vec<f64>,
    ob_err_var: Vec<f64>,
}

impl BucketSums {
    fn add(&mut self, cycle: &CycleInnovations) {
        self.total += cycle.total;
        self.assim += cycle.innov.len();
        self.innov += cycle.innov.iter().sum::<f64>();
        self.innovsq += cycle.innov.iter().map(|d| d * d).sum::<f64>();
        self.fcst_var += cycle.fcst_var.iter().sum::<f64>();
        self.ob_err_var += cycle.ob_err_var.iter().sum::<f64>();
    }
}

fn hour_of(date: &str) -> DiagResult<usize> {
    let (_, _, _, hour) = splitdate(date)?;
    Ok(hour as usize)
}

/// Read every member for one cycle and form innovations against the
/// ensemble mean.
fn read_cycle<S: DiagSource + ?Sized>(
    request: &DiagRequest,
    source: &S,
    experiment: &str,
    date: &str,
    ob_type: ObType,
) -> DiagResult<CycleInnovations> {
    let scale = ob_type.scale();
    let first = request.diag_path(experiment, date, 1, ob_type);
    let mut columns = source.columns(&first, ob_type)?;
    // errinv is per kg/kg; filtering and error variance work in g/kg
    for e in &mut columns.errinv {
        *e /= scale;
    }
    let used = filter_obs(
        &columns.as_obs_columns(),
        request.codes(ob_type),
        &request.bounds,
        request.hemisphere,
    )?;

    let total = columns.len();
    let ob: Vec<f64> = select(&columns.observation, &used).map(|v| v * scale).collect();
    let ob_err_var: Vec<f64> = select(&columns.errinv, &used).map(|e| (1.0 / e).powi(2)).collect();

    let mut sum = vec![0.0; ob.len()];
    let mut sumsq = vec![0.0; ob.len()];
    for member in 1..=request.n_mem {
        let path = if member == 1 {
            first.clone()
        } else {
            request.diag_path(experiment, date, member, ob_type)
        };
        let omf = source.obs_minus_forecast(&path, ob_type)?;
        if omf.len() != total {
            return Err(DiagError::MemberMismatch {
                path,
                expected: total,
                got: omf.len(),
            });
        }
        for (i, d) in select(&omf, &used).enumerate() {
            let fcst = ob[i] - d * scale;
            sum[i] += fcst;
            sumsq[i] += fcst * fcst;
        }
        debug!(path = %path.display(), "Read member innovations");
    }

    let n = request.n_mem as f64;
    let mut innov = Vec::with_capacity(ob.len());
    let mut fcst_var = Vec::with_capacity(ob.len());
    for i in 0..ob.len() {
        let mean = sum[i] / n;
        innov.push(ob[i] - mean);
        fcst_var.push(if request.n_mem > 1 {
            (sumsq[i] - n * mean * mean) / (n - 1.0)
        } else {
            0.0
        });
    }

    Ok(CycleInnovations {
        total,
        innov,
        fcst_var,
        ob_err_var,
    })
}

fn select<'a>(values: &'a [f64], used: &'a [bool]) -> impl Iterator<Item = f64> + 'a {
    values.iter().zip(used).filter(|(_, keep)| **keep).map(|(v, _)| *v)
}

/// Aggregate ensemble statistics over `request`'s date range.
pub fn obspace_stats<S: DiagSource + ?Sized>(request: &DiagRequest, source: &S) -> DiagResult<ObsSpaceStats> {
    request.validate()?;
    let timer = Timer::tic();
    let dates = daterange(&request.date1, &request.date2, 1)?;
    let n_expt = request.experiments.len();
    let mut sums = vec![BucketSums::default(); request.ob_types.len() * n_expt * HOURS];

    let mut cycles = 0usize;
    for date in &dates {
        let hour = hour_of(date)?;
        if request.skip_hours.contains(&(hour as u32)) {
            continue;
        }
        for (i_o, ob_type) in request.ob_types.iter().enumerate() {
            for (i_e, experiment) in request.experiments.iter().enumerate() {
                info!(date = %date, experiment = %experiment, ob_type = %ob_type, "Reading cycle");
                let cycle = read_cycle(request, source, experiment, date, *ob_type)?;
                sums[(i_o * n_expt + i_e) * HOURS + hour].add(&cycle);
                cycles += 1;
            }
        }
    }

    let mut stats = ObsSpaceStats::empty(dates, request.ob_types.clone(), request.experiments.clone());
    for i_o in 0..request.ob_types.len() {
        for i_e in 0..n_expt {
            for hour in 0..HOURS {
                stats.finish(i_o, i_e, hour, &sums[(i_o * n_expt + i_e) * HOURS + hour]);
            }
        }
    }

    info!(
        cycles,
        members = request.n_mem,
        elapsed_ms = timer.elapsed().as_millis() as u64,
        "Computed observation space statistics"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> DiagRequest {
        DiagRequest::new("/data", "2024011518", "2024011520", vec!["ctl".to_string()], 3)
    }

    #[test]
    fn test_diag_path() {
        let r = request();
        assert_eq!(
            r.diag_path("ctl", "2024011519", 2, ObType::V),
            PathBuf::from("/data/ctl/2024011519/mem0002/diag_conv_uv_ges.2024011519.nc4")
        );
        assert_eq!(
            r.diag_path("ctl", "2024011519", 12, ObType::Q),
            PathBuf::from("/data/ctl/2024011519/mem0012/diag_conv_q_ges.2024011519.nc4")
        );
    }

    #[test]
    fn test_codes_by_type() {
        let r = request();
        assert_eq!(r.codes(ObType::U), &DEFAULT_CODES_UV);
        assert_eq!(r.codes(ObType::Q), &DEFAULT_CODES_TQ);
    }

    #[test]
    fn test_validate() {
        let mut r = request();
        r.n_mem = 0;
        assert!(r.validate().is_err());
        let mut r = request();
        r.skip_hours = vec![24];
        assert!(r.validate().is_err());
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_cube_layout() {
        let mut cube = StatCube::new(2, 3, 0.0);
        cube.set(1, 2, 23, 5.0);
        assert_eq!(cube.get(1, 2, 23), 5.0);
        assert_eq!(cube.series(1, 2)[23], 5.0);
        assert_eq!(*cube.values.last().unwrap(), 5.0);
    }

    #[test]
    fn test_finish_single_observation() {
        let mut stats = ObsSpaceStats::empty(vec![], vec![ObType::T], vec!["a".to_string()]);
        let mut sums = BucketSums::default();
        sums.add(&CycleInnovations {
            total: 4,
            innov: vec![2.0],
            fcst_var: vec![1.0],
            ob_err_var: vec![0.25],
        });
        stats.finish(0, 0, 19, &sums);
        assert_eq!(stats.num_obs_total.get(0, 0, 19), 4.0);
        assert_eq!(stats.bias.get(0, 0, 19), -2.0);
        assert_eq!(stats.rms.get(0, 0, 19), 2.0);
        assert_eq!(stats.ob_error.get(0, 0, 19), 0.5);
        // spread needs two observations
        assert!(stats.spread.get(0, 0, 19).is_nan());
        assert!(stats.bias.get(0, 0, 18).is_nan());
    }

    #[test]
    fn test_statistic_names() {
        assert_eq!("total_spread".parse::<Statistic>().unwrap(), Statistic::TotalSpread);
        assert!("spread_ratio".parse::<Statistic>().is_err());
        assert_eq!(Statistic::Cr.color(), "gray");
    }
}
