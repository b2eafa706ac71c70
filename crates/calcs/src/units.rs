//! Temperature, speed and length conversions.
//!
//! Every conversion is generic over `num_traits::Float`, so both `f32` grids
//! and `f64` series can be converted in place with [`convert_slice`].

use num_traits::Float;

const MPS_PER_MPH: f64 = 2.2369;
const KNOTS_PER_MPS: f64 = 1.943844;
const MM_PER_INCH: f64 = 25.4;
const KELVIN_OFFSET: f64 = 273.15;

#[inline]
fn c<T: Float>(v: f64) -> T {
    T::from(v).unwrap_or_else(T::nan)
}

/// Kelvin to Celsius.
pub fn k_to_c<T: Float>(k: T) -> T {
    k - c(KELVIN_OFFSET)
}

/// Kelvin to Fahrenheit.
pub fn k_to_f<T: Float>(k: T) -> T {
    c_to_f(k_to_c(k))
}

/// Celsius to Kelvin.
pub fn c_to_k<T: Float>(celsius: T) -> T {
    celsius + c(KELVIN_OFFSET)
}

/// Celsius to Fahrenheit.
pub fn c_to_f<T: Float>(celsius: T) -> T {
    celsius * c(9.0) / c(5.0) + c(32.0)
}

/// Fahrenheit to Celsius.
pub fn f_to_c<T: Float>(f: T) -> T {
    (f - c(32.0)) * c(5.0) / c(9.0)
}

/// Fahrenheit to Kelvin.
pub fn f_to_k<T: Float>(f: T) -> T {
    c_to_k(f_to_c(f))
}

/// Meters per second to miles per hour.
pub fn mps_to_mph<T: Float>(mps: T) -> T {
    mps * c(MPS_PER_MPH)
}

/// Miles per hour to meters per second.
pub fn mph_to_mps<T: Float>(mph: T) -> T {
    mph / c(MPS_PER_MPH)
}

/// Meters per second to knots.
pub fn mps_to_knots<T: Float>(mps: T) -> T {
    mps * c(KNOTS_PER_MPS)
}

/// Knots to meters per second.
pub fn knots_to_mps<T: Float>(knots: T) -> T {
    knots / c(KNOTS_PER_MPS)
}

/// Millimeters to inches.
pub fn mm_to_inches<T: Float>(mm: T) -> T {
    mm / c(MM_PER_INCH)
}

/// Inches to millimeters.
pub fn inches_to_mm<T: Float>(inches: T) -> T {
    inches * c(MM_PER_INCH)
}

/// Apply a conversion to every element of a slice in place.
///
/// ```
/// use calcs::units::{convert_slice, k_to_c};
///
/// let mut temps = vec![273.15_f32, 283.15];
/// convert_slice(&mut temps, k_to_c);
/// assert!((temps[1] - 10.0).abs() < 1e-4);
/// ```
pub fn convert_slice<T: Float, F: Fn(T) -> T>(values: &mut [T], f: F) {
    for v in values.iter_mut() {
        *v = f(*v);
    }
}
