//! Statistics helpers for verification and diagnostics.
//!
//! - Descriptive statistics ([`mstats`])
//! - Regression significance ([`lregress`]) and least squares fits
//!   ([`get_linear_regression`])
//! - Student's t-test error bars ([`ttest`])
//! - Latitude weights and weighted means
//! - Bootstrap confidence intervals

pub mod bootstrap;
pub mod descriptive;
pub mod inference;
pub mod regression;
pub mod weights;

pub use bootstrap::bootstrap;
pub use descriptive::{mstats, MStats};
pub use inference::{lregress, ttest, ttest_columns, Regression, TTest, TTestOptions};
pub use regression::{get_linear_regression, LinearRegression};
pub use weights::{get_weighted_mean, get_weights, weighted_mean_axis};
