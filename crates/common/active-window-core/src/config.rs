use bon::bon;

use crate::{ActiveWindowError, ActiveWindowResult};
use std::time::Duration;

fn validate_liveness_tick(tick: Duration) -> ActiveWindowResult<Duration> {
    if tick.is_zero() {
        return Err(ActiveWindowError::InvalidConfig {
            reason: "liveness tick cannot be zero".into(),
        });
    }
    if tick > Duration::from_secs(10) {
        return Err(ActiveWindowError::InvalidConfig {
            reason: "liveness tick cannot be greater than 10 seconds".into(),
        });
    }
    Ok(tick)
}

/// Engine configuration.
///
/// The liveness tick is the period at which the watch loop wakes up
/// independently of focus notifications to check for a shutdown request; it
/// is also the worst-case shutdown latency. An icon cache capacity of zero
/// disables icon caching entirely.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub liveness_tick: Duration,
    pub icon_cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            liveness_tick: Duration::from_millis(500),
            icon_cache_capacity: 0,
        }
    }
}

#[bon]
impl EngineConfig {
    /// Creates a new engine configuration using the builder pattern.
    ///
    /// # Example
    ///
    /// ```
    /// use active_window_core::EngineConfig;
    /// use std::time::Duration;
    ///
    /// let config = EngineConfig::builder()
    ///     .liveness_tick(Duration::from_millis(250))
    ///     .unwrap()
    ///     .icon_cache_capacity(32)
    ///     .build();
    /// ```
    #[builder]
    pub fn new(
        #[builder(
            default = Duration::from_millis(500),
            with = |tick: Duration| -> Result<_, ActiveWindowError> {
                validate_liveness_tick(tick)
            },
        )]
        liveness_tick: Duration,
        #[builder(default = 0)] icon_cache_capacity: usize,
    ) -> Self {
        Self {
            liveness_tick,
            icon_cache_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.liveness_tick, Duration::from_millis(500));
        assert_eq!(config.icon_cache_capacity, 0);
    }

    #[test]
    fn builder_defaults() {
        let config = EngineConfig::builder().build();
        assert_eq!(config.liveness_tick, Duration::from_millis(500));
        assert_eq!(config.icon_cache_capacity, 0);
    }

    #[test]
    fn builder_liveness_tick() {
        let config = EngineConfig::builder()
            .liveness_tick(Duration::from_millis(100))
            .unwrap()
            .build();
        assert_eq!(config.liveness_tick, Duration::from_millis(100));
    }

    #[test]
    fn builder_max_tick() {
        let config = EngineConfig::builder()
            .liveness_tick(Duration::from_secs(10))
            .unwrap()
            .build();
        assert_eq!(config.liveness_tick, Duration::from_secs(10));
    }

    #[test]
    fn builder_zero_tick_errors() {
        assert!(EngineConfig::builder().liveness_tick(Duration::ZERO).is_err());
    }

    #[test]
    fn builder_large_tick_errors() {
        assert!(
            EngineConfig::builder()
                .liveness_tick(Duration::from_secs(11))
                .is_err()
        );
    }

    #[test]
    fn builder_cache_capacity() {
        let config = EngineConfig::builder().icon_cache_capacity(64).build();
        assert_eq!(config.icon_cache_capacity, 64);
    }

    #[test]
    fn builder_full() {
        let config = EngineConfig::builder()
            .liveness_tick(Duration::from_millis(50))
            .unwrap()
            .icon_cache_capacity(16)
            .build();

        assert_eq!(config.liveness_tick, Duration::from_millis(50));
        assert_eq!(config.icon_cache_capacity, 16);
    }
}
