use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum InvalidCadenceError {
    #[error("cron expression: `{0}` is not a valid 5-field cron string")]
    Cron(String),
    #[error("interval: `{0}` is not a valid interval string, expected e.g. `30m` or `2h`")]
    Interval(String),
}

/// A validated 5-field POSIX cron expression (minute, hour, day of month,
/// month, day of week).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CronExpression(String);

impl CronExpression {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CronExpression {
    type Err = InvalidCadenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expr = s.trim();
        if expr.split_whitespace().count() != 5 {
            return Err(InvalidCadenceError::Cron(s.to_string()));
        }
        // The cron crate expects a seconds column which POSIX cron does not have
        let with_seconds = format!("0 {}", expr);
        cron::Schedule::from_str(&with_seconds)
            .map(|_| Self(expr.to_string()))
            .map_err(|_| InvalidCadenceError::Cron(s.to_string()))
    }
}

impl Display for CronExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fixed repeat interval like `"30m"` or `"2h"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Interval(String);

impl Interval {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_secs(&self) -> u64 {
        // Construction through FromStr guarantees the format
        let (value, unit) = self.0.split_at(self.0.len() - 1);
        let value: u64 = value.parse().unwrap_or(0);
        match unit {
            "s" => value,
            "m" => value * 60,
            "h" => value * 60 * 60,
            "d" => value * 60 * 60 * 24,
            _ => 0,
        }
    }
}

impl FromStr for Interval {
    type Err = InvalidCadenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.len() < 2 {
            return Err(InvalidCadenceError::Interval(s.to_string()));
        }
        let (value, unit) = raw.split_at(raw.len() - 1);
        let valid_unit = matches!(unit, "s" | "m" | "h" | "d");
        let valid_value = value.parse::<u64>().map(|v| v > 0).unwrap_or(false);
        if !valid_unit || !valid_value {
            return Err(InvalidCadenceError::Interval(s.to_string()));
        }
        Ok(Self(raw.to_string()))
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How often a `ScheduledJob` fires: either at cron times or on a fixed
/// interval. The external scheduler understands both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cadence {
    Cron(CronExpression),
    Interval(Interval),
}

impl Cadence {
    pub fn cron(expr: &str) -> Result<Self, InvalidCadenceError> {
        expr.parse().map(Cadence::Cron)
    }

    pub fn interval(raw: &str) -> Result<Self, InvalidCadenceError> {
        raw.parse().map(Cadence::Interval)
    }

    pub fn as_cron(&self) -> Option<&str> {
        match self {
            Cadence::Cron(c) => Some(c.as_str()),
            Cadence::Interval(_) => None,
        }
    }

    pub fn as_interval(&self) -> Option<&str> {
        match self {
            Cadence::Cron(_) => None,
            Cadence::Interval(i) => Some(i.as_str()),
        }
    }
}

impl Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cadence::Cron(c) => write!(f, "cron {}", c),
            Cadence::Interval(i) => write!(f, "every {}", i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_cron_expressions() {
        for expr in ["0 9 * * *", "*/15 * * * *", "0 0 1 * *", "30 8 * * 1-5"].iter() {
            assert!(expr.parse::<CronExpression>().is_ok(), "{}", expr);
        }
    }

    #[test]
    fn rejects_invalid_cron_expressions() {
        for expr in [
            "",
            "* * * *",
            "0 9 * * * *",
            "61 9 * * *",
            "0 25 * * *",
            "every day",
        ]
        .iter()
        {
            assert!(expr.parse::<CronExpression>().is_err(), "{}", expr);
        }
    }

    #[test]
    fn accepts_valid_intervals() {
        let two_hours: Interval = "2h".parse().unwrap();
        assert_eq!(two_hours.as_secs(), 7200);
        let half_hour: Interval = "30m".parse().unwrap();
        assert_eq!(half_hour.as_secs(), 1800);
        let day: Interval = "1d".parse().unwrap();
        assert_eq!(day.as_secs(), 86400);
    }

    #[test]
    fn rejects_invalid_intervals() {
        for raw in ["", "h", "2", "0h", "-5m", "2 h", "2w"].iter() {
            assert!(raw.parse::<Interval>().is_err(), "{}", raw);
        }
    }

    #[test]
    fn cadence_exposes_wire_fields() {
        let c = Cadence::cron("0 9 * * *").unwrap();
        assert_eq!(c.as_cron(), Some("0 9 * * *"));
        assert_eq!(c.as_interval(), None);

        let i = Cadence::interval("2h").unwrap();
        assert_eq!(i.as_cron(), None);
        assert_eq!(i.as_interval(), Some("2h"));
    }
}
