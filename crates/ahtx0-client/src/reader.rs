//! Throttled native reads.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

use crate::config::SensorConfig;
use crate::loader::EntryPoints;

/// Last values seen by a reader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedSample {
    /// Temperature in degrees Celsius, or the invalid value.
    pub temperature: f64,
    /// Relative humidity in percent, or the invalid value.
    pub humidity: f64,
    /// When the native read was last attempted. `None` until the first one.
    pub last_read: Option<Instant>,
}

/// Caches native reads so they happen at most once per throttle window.
pub struct ThrottledReader {
    entry_points: Option<EntryPoints>,
    window: Duration,
    invalid_value: f64,
    cache: Mutex<CachedSample>,
}

impl ThrottledReader {
    /// Creates a reader. With no entry points every read is a no-op.
    pub fn new(entry_points: Option<EntryPoints>, config: &SensorConfig) -> Self {
        Self {
            entry_points,
            window: config.throttle_window(),
            invalid_value: config.invalid_value,
            cache: Mutex::new(CachedSample {
                temperature: config.invalid_value,
                humidity: config.invalid_value,
                last_read: None,
            }),
        }
    }

    /// Returns the cache, refreshing it first if the window has elapsed.
    pub fn read(&self) -> CachedSample {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(entry_points) = &self.entry_points else {
            return *cache;
        };

        let now = Instant::now();
        if let Some(last) = cache.last_read {
            if now.duration_since(last) < self.window {
                trace!("Within throttle window, using cached sample");
                return *cache;
            }
        }

        let reading = entry_points.read_sensor();
        if reading.is_ok() {
            debug!(
                "Native read: {:.2} °C, {:.2} %RH",
                reading.temperature, reading.humidity
            );
            cache.temperature = reading.temperature;
            cache.humidity = reading.humidity;
        } else {
            warn!("Native read failed with status {}", reading.status_code);
            cache.temperature = self.invalid_value;
            cache.humidity = self.invalid_value;
        }
        cache.last_read = Some(now);

        *cache
    }

    /// Returns the cache without triggering a read.
    pub fn cached(&self) -> CachedSample {
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns true if a native read entry point is available.
    pub fn is_available(&self) -> bool {
        self.entry_points.is_some()
    }

    /// Returns the value used for invalid readings.
    pub fn invalid_value(&self) -> f64 {
        self.invalid_value
    }
}
