//! Small numeric and housekeeping helpers.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::EmcResult;

/// Decimal exponent used by [`round_number`].
///
/// Returns 0 for 0. For |v| >= 1 this is `ceil(log10|v|) - 1`, otherwise
/// `floor(log10|v|)`; so 1.0 gives -1 and 10.1 gives 1.
pub fn float10_power(value: f64) -> f64 {
    if value == 0.0 {
        return 0.0;
    }
    let d = value.abs().log10();
    if d >= 0.0 {
        d.ceil() - 1.0
    } else {
        d.floor()
    }
}

/// Round to one significant decimal digit, e.g. 59 -> 60, 0.0164 -> 0.02.
///
/// Halfway cases round to even.
pub fn round_number(value: f64) -> f64 {
    let d = float10_power(value);
    let scale = 10f64.powf(d);
    (value.abs() / scale).round_ties_even() * scale * value.signum()
}

/// Stopwatch that logs elapsed time.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a timer (tic).
    pub fn tic() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time since [`Timer::tic`].
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Log the elapsed time under `label` and return it (toc).
    pub fn toc(&self, label: &str) -> Duration {
        let elapsed = self.elapsed();
        tracing::info!(label, elapsed_ms = elapsed.as_millis() as u64, "elapsed");
        elapsed
    }
}

/// Wrap text in ANSI colour escape codes.
///
/// Unknown colour names return the text unchanged.
pub fn colourize(text: &str, colour: &str) -> String {
    let code = match colour.to_ascii_lowercase().as_str() {
        "black" => "30",
        "red" => "31",
        "green" => "32",
        "yellow" => "33",
        "blue" => "34",
        "magenta" => "35",
        "cyan" => "36",
        "white" => "37",
        "bold" => "1",
        _ => return text.to_string(),
    };
    format!("\x1b[{}m{}\x1b[0m", code, text)
}

/// Serialize `data` to a JSON file.
pub fn save_json<T: Serialize, P: AsRef<Path>>(path: P, data: &T) -> EmcResult<()> {
    tracing::debug!(path = %path.as_ref().display(), "writing json");
    let text = serde_json::to_string_pretty(data)?;
    fs::write(path, text)?;
    Ok(())
}

/// Deserialize a JSON file written by [`save_json`].
pub fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> EmcResult<T> {
    tracing::debug!(path = %path.as_ref().display(), "reading json");
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float10_power() {
        assert_eq!(float10_power(0.0), 0.0);
        assert_eq!(float10_power(1.0), -1.0);
        assert_eq!(float10_power(10.1), 1.0);
        assert_eq!(float10_power(100.2), 2.0);
        assert_eq!(float10_power(1000.3), 3.0);
        assert_eq!(float10_power(10000.4), 4.0);
        assert_eq!(float10_power(0.0164), -2.0);
    }

    #[test]
    fn test_colourize() {
        assert_eq!(colourize("x", "red"), "\x1b[31mx\x1b[0m");
        assert_eq!(colourize("x", "mauve"), "x");
    }

    #[test]
    fn test_timer_monotonic() {
        let t = Timer::tic();
        assert!(t.toc("test") <= t.elapsed());
    }
}
