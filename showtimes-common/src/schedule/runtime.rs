//! Runtime parsing
//!
//! Listing runtimes arrive either as a number of minutes or as free text such
//! as `"1 hr 45 min"`. Upstream data is uncontrolled, so parsing never fails:
//! anything unrecognized is treated as an unknown (zero) runtime.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::IgnoredAny;
use serde::Deserialize;

static RUNTIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?P<hr>\d+) hr)? ?(?:(?P<min>\d+) min)?").expect("valid runtime pattern")
});

/// Runtime as delivered by a listing source
///
/// Variants are tried in order; any JSON value deserializes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawRuntime {
    Minutes(u32),
    /// Fractional or negative numbers
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl RawRuntime {
    /// Total runtime in minutes (0 when unknown)
    pub fn minutes(&self) -> u32 {
        match self {
            RawRuntime::Minutes(minutes) => *minutes,
            RawRuntime::Number(number) if number.is_finite() && *number >= 0.0 => {
                number.trunc().min(f64::from(u32::MAX)) as u32
            }
            RawRuntime::Number(_) => 0,
            RawRuntime::Text(text) => parse_runtime(text),
            RawRuntime::Other(_) => 0,
        }
    }
}

impl Default for RawRuntime {
    fn default() -> Self {
        RawRuntime::Minutes(0)
    }
}

impl From<u32> for RawRuntime {
    fn from(minutes: u32) -> Self {
        RawRuntime::Minutes(minutes)
    }
}

impl From<&str> for RawRuntime {
    fn from(text: &str) -> Self {
        RawRuntime::Text(text.to_string())
    }
}

/// Parse a textual runtime into minutes
///
/// Accepts `"<N> hr"` and/or `"<N> min"` (in that order); text without
/// either unit is read as a bare minute count.
pub fn parse_runtime(text: &str) -> u32 {
    let text = text.trim();

    if !text.contains("hr") && !text.contains("min") {
        return text.parse().unwrap_or(0);
    }

    let Some(caps) = RUNTIME_RE.captures(text) else {
        return 0;
    };

    let component = |name: &str| -> u32 {
        caps.name(name)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(0)
    };

    component("hr")
        .saturating_mul(60)
        .saturating_add(component("min"))
}
