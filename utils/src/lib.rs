#[macro_use]
extern crate anyhow;

use std::{fmt, str::FromStr};

use clap::ArgMatches;

/// LogLevel
///
/// Represents minimum level of messages that will be logged
///
#[derive(Debug, Clone, Copy)]
pub struct LogLevel {
    pub level: usize,
}

impl FromStr for LogLevel {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel { level: 0 }),
            "warn" => Ok(LogLevel { level: 1 }),
            "info" => Ok(LogLevel { level: 2 }),
            "debug" => Ok(LogLevel { level: 3 }),
            "trace" => Ok(LogLevel { level: 4 }),
            "none" => Ok(LogLevel { level: 5 }),
            _ => Err("no match"),
        }
    }
}

impl LogLevel {
    pub fn is_none(&self) -> bool {
        self.level > 4
    }
    pub fn get_level(&self) -> usize {
        if self.level > 4 {
            0
        } else {
            self.level
        }
    }
    /// Raise the level by `n` steps, saturating at trace
    pub fn raise(&self, n: usize) -> Self {
        if self.is_none() || n == 0 {
            *self
        } else {
            LogLevel {
                level: (self.level + n).min(4),
            }
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let level_str = ["error", "warn", "info", "debug", "trace", "none"];
        if self.level < 6 {
            write!(f, "{}", level_str[self.level])
        } else {
            write!(f, "unknown")
        }
    }
}

/// Initialize logging from command line arguments
///
/// Looks for the `loglevel`, `quiet` and `timestamp` arguments, and an
/// optional `verbose` counter that raises the log level one step per use
pub fn init_log(m: &ArgMatches) -> anyhow::Result<()> {
    let verbose = m
        .get_one::<LogLevel>("loglevel")
        .copied()
        .unwrap_or(LogLevel { level: 2 });
    let extra = m
        .try_get_one::<u8>("verbose")
        .ok()
        .flatten()
        .map(|x| *x as usize)
        .unwrap_or(0);
    let verbose = verbose.raise(extra);
    let quiet = verbose.is_none() || m.get_flag("quiet");
    let ts = m
        .get_one::<stderrlog::Timestamp>("timestamp")
        .copied()
        .unwrap_or(stderrlog::Timestamp::Off);

    stderrlog::new()
        .quiet(quiet)
        .verbosity(verbose.get_level())
        .timestamp(ts)
        .init()
        .map_err(|e| anyhow!("Could not initialize logging: {}", e))
}

/// Parse a nucleotide count or position from the command line
///
/// Accepts plain integers, integers with comma separators (1,000,000) and
/// floating point forms such as 1e6 or 2.5e6.  Fractional parts are
/// truncated.
pub fn parse_nt_value(s: &str) -> anyhow::Result<usize> {
    let t = s.trim().replace(',', "");
    if let Ok(x) = t.parse::<usize>() {
        return Ok(x);
    }
    let z = t
        .parse::<f64>()
        .map_err(|_| anyhow!("Could not parse {} as a position", s))?;
    if !z.is_finite() || z < 0.0 {
        Err(anyhow!("Illegal position {}", s))
    } else if z >= usize::MAX as f64 {
        Err(anyhow!("Position {} too large", s))
    } else {
        Ok(z.trunc() as usize)
    }
}

fn sorted(v: &[f64]) -> Vec<f64> {
    let mut s = v.to_vec();
    s.sort_unstable_by(|a, b| a.total_cmp(b));
    s
}

/// Value at rank floor(w * n) of the sorted data.
///
/// w = 1 returns the maximum.  Returns None for empty input or w outside [0, 1]
pub fn quantile(v: &[f64], w: f64) -> Option<f64> {
    if v.is_empty() || !(0.0..=1.0).contains(&w) {
        None
    } else {
        let s = sorted(v);
        let ix = ((s.len() as f64 * w) as usize).min(s.len() - 1);
        Some(s[ix])
    }
}

/// Median, averaging the two central values for even length input
pub fn median(v: &[f64]) -> Option<f64> {
    let n = v.len();
    if n == 0 {
        None
    } else {
        let s = sorted(v);
        if n & 1 == 1 {
            Some(s[n >> 1])
        } else {
            Some(0.5 * (s[(n >> 1) - 1] + s[n >> 1]))
        }
    }
}

pub fn mean(v: &[f64]) -> Option<f64> {
    if v.is_empty() {
        None
    } else {
        Some(v.iter().sum::<f64>() / (v.len() as f64))
    }
}

/// Minimum and maximum, ignoring NaNs
pub fn min_max(v: &[f64]) -> Option<(f64, f64)> {
    v.iter()
        .filter(|x| !x.is_nan())
        .fold(None, |acc, &x| match acc {
            None => Some((x, x)),
            Some((a, b)) => Some((a.min(x), b.max(x))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_parse_and_raise() {
        let l = LogLevel::from_str("Warn").unwrap();
        assert_eq!(l.level, 1);
        assert_eq!(l.raise(1).to_string(), "info");
        assert_eq!(l.raise(10).to_string(), "trace");
        let n = LogLevel::from_str("none").unwrap();
        assert!(n.raise(2).is_none());
        assert!(LogLevel::from_str("loud").is_err());
    }

    #[test]
    fn nt_values() {
        assert_eq!(parse_nt_value("1000").unwrap(), 1000);
        assert_eq!(parse_nt_value("1,500,000").unwrap(), 1_500_000);
        assert_eq!(parse_nt_value("1e6").unwrap(), 1_000_000);
        assert_eq!(parse_nt_value("2.5e3").unwrap(), 2500);
        assert_eq!(parse_nt_value(" 12.9 ").unwrap(), 12);
        assert!(parse_nt_value("-5").is_err());
        assert!(parse_nt_value("abc").is_err());
        assert!(parse_nt_value("inf").is_err());
    }

    #[test]
    fn quantile_is_floor_rank_of_sorted_data() {
        let v: Vec<f64> = (0..100).rev().map(|x| x as f64).collect();
        assert_eq!(quantile(&v, 0.98), Some(98.0));
        assert_eq!(quantile(&v, 0.0), Some(0.0));
        assert_eq!(quantile(&v, 0.5), Some(50.0));
        assert_eq!(quantile(&v, 1.0), Some(99.0));
        let w = [5.0, 1.0, 3.0];
        // floor(0.5 * 3) = 1
        assert_eq!(quantile(&w, 0.5), Some(3.0));
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&w, 1.5), None);
    }

    #[test]
    fn descriptive_stats() {
        let v = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(median(&v), Some(2.5));
        assert_eq!(median(&v[..3]), Some(3.0));
        assert_eq!(mean(&v), Some(2.5));
        assert_eq!(min_max(&v), Some((1.0, 4.0)));
        assert_eq!(min_max(&[f64::NAN, 2.0]), Some((2.0, 2.0)));
        assert_eq!(median(&[]), None);
        assert_eq!(mean(&[]), None);
        assert_eq!(min_max(&[]), None);
    }
}
