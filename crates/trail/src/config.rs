use anyhow::{ensure, Result};

use crate::field::DEFAULT_RESOLUTION;
use crate::sample_buffer::DEFAULT_CAPACITY;
use crate::window::DEFAULT_MAX_AGE;

/// Most trail samples the sprite shader can read. Its uniform array is sized
/// for exactly this many positions.
pub const MAX_TRAIL_CAPACITY: usize = 20;

/// Largest grid edge accepted; the field holds `resolution²` points.
pub const MAX_RESOLUTION: u32 = 1024;

#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct TrailConfig {
    /// Hard ceiling on stored samples.
    pub capacity: usize,
    /// Seconds a sample stays in the trail.
    pub max_age: f64,
    /// Points per grid edge.
    pub resolution: u32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_age: DEFAULT_MAX_AGE,
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

impl TrailConfig {
    pub fn validated(self) -> Result<Self> {
        ensure!(
            (1..=MAX_TRAIL_CAPACITY).contains(&self.capacity),
            "trail capacity {} outside 1..={MAX_TRAIL_CAPACITY}",
            self.capacity
        );
        ensure!(
            self.max_age.is_finite() && self.max_age > 0.0,
            "trail max age must be a positive number of seconds, got {}",
            self.max_age
        );
        ensure!(
            self.resolution <= MAX_RESOLUTION,
            "grid resolution {} exceeds {MAX_RESOLUTION}",
            self.resolution
        );
        Ok(self)
    }

    /// Falls back to the defaults when `self` doesn't validate.
    pub fn or_default(self) -> Self {
        self.validated().unwrap_or_else(|err| {
            log::warn!("ignoring trail config: {err:#}");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = TrailConfig::default();
        assert_eq!(config.capacity, 20);
        assert_eq!(config.max_age, 0.1);
        assert_eq!(config.resolution, 200);
        assert!(config.validated().is_ok());
    }

    #[test]
    fn capacity_is_bounded_by_shader() {
        let config = TrailConfig {
            capacity: MAX_TRAIL_CAPACITY + 1,
            ..Default::default()
        };
        let err = config.validated().unwrap_err();
        assert!(err.to_string().contains("trail capacity"));
        assert_eq!(config.or_default(), TrailConfig::default());
    }

    #[test]
    fn rejects_bad_max_age() {
        for max_age in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = TrailConfig {
                max_age,
                ..Default::default()
            };
            assert!(config.validated().is_err());
        }
    }

    #[test]
    fn zero_resolution_is_allowed() {
        let config = TrailConfig {
            resolution: 0,
            ..Default::default()
        };
        assert!(config.validated().is_ok());
    }
}
