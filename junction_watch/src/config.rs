// THEORY:
// All tunables live in `DashboardConfig`. Defaults reproduce the dashboard's
// fixed timings (5 s refresh, 2 s optimization, 1 s chat reply). Overrides
// come from `JW_*` environment variables read once at startup; anything that
// fails to parse is a hard `InvalidConfig` error rather than a silent default.
//
// `from_lookup` takes the variable source as a closure so the parsing rules can
// be exercised without touching the process environment.

use crate::core_modules::chat::ReplyStrategy;
use crate::core_modules::predictor::RefreshStrategy;
use crate::core_modules::violation::DEFAULT_CAPACITY;
use crate::error::{JunctionWatchError, Result};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Period of the junction refresh ticker.
    pub refresh_interval: Duration,
    /// Artificial delay before "optimize signals" takes effect.
    pub optimize_delay: Duration,
    /// Delay between an operator chat message and the generated reply.
    pub reply_delay: Duration,
    /// Period of the camera feed animation loop.
    pub frame_interval: Duration,
    /// Chance that a refresh tick records a violation.
    pub violation_probability: f64,
    /// Number of violations kept on screen.
    pub violation_capacity: usize,
    pub strategy: RefreshStrategy,
    pub replies: ReplyStrategy,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(5),
            optimize_delay: Duration::from_millis(2000),
            reply_delay: Duration::from_millis(1000),
            frame_interval: Duration::from_millis(33),
            violation_probability: 0.6,
            violation_capacity: DEFAULT_CAPACITY,
            strategy: RefreshStrategy::Uniform,
            replies: ReplyStrategy::Canned,
            seed: None,
        }
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> JunctionWatchError {
    JunctionWatchError::InvalidConfig { key: key.to_string(), reason: reason.into() }
}

fn parse<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| invalid(key, format!("`{raw}`: {e}")))
}

impl DashboardConfig {
    /// Defaults overridden by `JW_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("JW_REFRESH_SECS") {
            cfg.refresh_interval = Duration::from_secs(parse("JW_REFRESH_SECS", &v)?);
        }
        if let Some(v) = get("JW_OPTIMIZE_DELAY_MS") {
            cfg.optimize_delay = Duration::from_millis(parse("JW_OPTIMIZE_DELAY_MS", &v)?);
        }
        if let Some(v) = get("JW_REPLY_DELAY_MS") {
            cfg.reply_delay = Duration::from_millis(parse("JW_REPLY_DELAY_MS", &v)?);
        }
        if let Some(v) = get("JW_FRAME_INTERVAL_MS") {
            cfg.frame_interval = Duration::from_millis(parse("JW_FRAME_INTERVAL_MS", &v)?);
        }
        if let Some(v) = get("JW_VIOLATION_PROBABILITY") {
            cfg.violation_probability = parse("JW_VIOLATION_PROBABILITY", &v)?;
        }
        if let Some(v) = get("JW_STRATEGY") {
            cfg.strategy = parse("JW_STRATEGY", &v)?;
        }
        if let Some(v) = get("JW_REPLIES") {
            cfg.replies = parse("JW_REPLIES", &v)?;
        }
        if let Some(v) = get("JW_SEED") {
            cfg.seed = Some(parse("JW_SEED", &v)?);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects values the timers or the RNG cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval.is_zero() {
            return Err(invalid("JW_REFRESH_SECS", "must be at least 1"));
        }
        if self.frame_interval.is_zero() {
            return Err(invalid("JW_FRAME_INTERVAL_MS", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.violation_probability) {
            return Err(invalid("JW_VIOLATION_PROBABILITY", "must be between 0 and 1"));
        }
        Ok(())
    }

    /// Replaces every field `validate` would reject with its default.
    pub fn repaired(mut self) -> Self {
        let defaults = Self::default();
        if self.refresh_interval.is_zero() {
            self.refresh_interval = defaults.refresh_interval;
        }
        if self.frame_interval.is_zero() {
            self.frame_interval = defaults.frame_interval;
        }
        if !(0.0..=1.0).contains(&self.violation_probability) {
            self.violation_probability = defaults.violation_probability;
        }
        self
    }
}
