use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::log::DEFAULT_LOG_CAPACITY;

pub const DEFAULT_BASE_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 100;

/// Tick cadence for whoever drives the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Pacing {
    /// Interval at speed 1.0.
    pub base_interval_ms: u64,
    /// Floor that caps the event rate however high the speed goes.
    pub min_interval_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            base_interval_ms: DEFAULT_BASE_INTERVAL_MS,
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
        }
    }
}

impl Pacing {
    /// `max(min_interval, base_interval / speed)`. A speed that is not a
    /// positive finite number is treated as 1.0; an interval too long for
    /// `Duration` saturates at `Duration::MAX`.
    pub fn interval(&self, speed: f64) -> Duration {
        let speed = if speed.is_finite() && speed > 0.0 { speed } else { 1.0 };
        let scaled = Duration::try_from_secs_f64(self.base_interval_ms as f64 / 1000.0 / speed)
            .unwrap_or(Duration::MAX);
        scaled.max(Duration::from_millis(self.min_interval_ms))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct BattleConfig {
    /// Fixed seed for reproducible battles; `None` draws from OS entropy.
    pub seed: Option<u64>,
    pub speed: f64,
    #[serde(flatten)]
    pub pacing: Pacing,
    pub log_capacity: usize,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            seed: None,
            speed: 1.0,
            pacing: Pacing::default(),
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl BattleConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_scales_with_speed() {
        let pacing = Pacing::default();
        assert_eq!(pacing.interval(1.0), Duration::from_millis(1000));
        assert_eq!(pacing.interval(2.0), Duration::from_millis(500));
        assert_eq!(pacing.interval(4.0), Duration::from_millis(250));
    }

    #[test]
    fn interval_is_floored() {
        let pacing = Pacing::default();
        let six = pacing.interval(6.0);
        assert!(six > Duration::from_millis(166) && six < Duration::from_millis(167));
        assert_eq!(pacing.interval(10.0), Duration::from_millis(100));
        assert_eq!(pacing.interval(50.0), Duration::from_millis(100));
    }

    #[test]
    fn bad_speed_falls_back_to_base() {
        let pacing = Pacing::default();
        assert_eq!(pacing.interval(0.0), Duration::from_millis(1000));
        assert_eq!(pacing.interval(-3.0), Duration::from_millis(1000));
        assert_eq!(pacing.interval(f64::NAN), Duration::from_millis(1000));
        assert_eq!(pacing.interval(f64::INFINITY), Duration::from_millis(1000));
    }

    #[test]
    fn tiny_speed_saturates() {
        let pacing = Pacing::default();
        assert_eq!(pacing.interval(f64::MIN_POSITIVE), Duration::MAX);
        assert_eq!(pacing.interval(1e-300), Duration::MAX);
        assert_eq!(pacing.interval(0.25), Duration::from_secs(4));
    }

    #[test]
    fn config_defaults() {
        let cfg = BattleConfig::default();
        assert_eq!(cfg.seed, None);
        assert!((cfg.speed - 1.0).abs() < f64::EPSILON);
        assert_eq!(cfg.log_capacity, 50);
        assert_eq!(cfg.pacing, Pacing::default());
    }

    #[test]
    fn config_from_partial_json() {
        let cfg: BattleConfig =
            serde_json::from_str(r#"{"seed": 7, "speed": 4, "min_interval_ms": 50}"#).unwrap();
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.pacing.min_interval_ms, 50);
        assert_eq!(cfg.pacing.base_interval_ms, 1000);
        assert_eq!(cfg.pacing.interval(cfg.speed), Duration::from_millis(250));
    }

    #[test]
    fn builder_chain() {
        let cfg = BattleConfig::default()
            .with_seed(1)
            .with_speed(2.0)
            .with_log_capacity(10);
        assert_eq!(cfg.seed, Some(1));
        assert_eq!(cfg.log_capacity, 10);
    }
}
