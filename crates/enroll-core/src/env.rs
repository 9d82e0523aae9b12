//! Environment variable helpers shared by the backend configs.
//!
//! Empty values are treated exactly like unset ones.

use crate::error::{EnrollError, EnrollResult};
use std::time::Duration;

/// Value of `name`, `None` when unset or blank
pub fn var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn required(name: &str) -> EnrollResult<String> {
    var(name).ok_or_else(|| EnrollError::Configuration(format!("{} not set", name)))
}

/// Names from `names` that are unset or blank
pub fn missing<'a>(names: &[&'a str]) -> Vec<&'a str> {
    names.iter().copied().filter(|n| var(n).is_none()).collect()
}

/// Whole seconds from `name`, or `default` when unset
pub fn timeout_secs(name: &str, default: Duration) -> EnrollResult<Duration> {
    match var(name) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                EnrollError::Configuration(format!(
                    "{} must be a positive number of seconds, got {:?}",
                    name, raw
                ))
            }),
    }
}
