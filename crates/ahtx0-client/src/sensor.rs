//! Caller-facing sensor object.

use crate::config::SensorConfig;
use crate::loader::{self, EntryPoints, LoadedLibrary};
use crate::reader::{CachedSample, ThrottledReader};
use crate::version::UNKNOWN_VERSION;

/// AHTx0 temperature/humidity sensor backed by the native library.
///
/// Each accessor refreshes a shared throttled cache, so calling
/// [`Ahtx0::current_temperature`] and [`Ahtx0::current_humidity`] back to
/// back costs at most one native read. Failed reads are reported as the
/// configured invalid value (1000.0 by default); check with
/// [`Ahtx0::is_invalid`].
pub struct Ahtx0 {
    reader: ThrottledReader,
}

impl Ahtx0 {
    /// Creates a sensor with the default configuration.
    ///
    /// Loads the native library on first use in the process.
    pub fn new() -> Self {
        Self::with_config(&SensorConfig::default())
    }

    /// Creates a sensor with the given configuration.
    pub fn with_config(config: &SensorConfig) -> Self {
        Self::from_entry_points(loader::ensure_loaded().ok(), config)
    }

    /// Creates a sensor on top of explicit entry points.
    ///
    /// `None` behaves like a failed library load: reads never reach native code.
    pub fn from_entry_points(entry_points: Option<EntryPoints>, config: &SensorConfig) -> Self {
        Self {
            reader: ThrottledReader::new(entry_points, config),
        }
    }

    /// Returns the current temperature in degrees Celsius.
    pub fn current_temperature(&self) -> f64 {
        self.reader.read().temperature
    }

    /// Returns the current relative humidity in percent.
    pub fn current_humidity(&self) -> f64 {
        self.reader.read().humidity
    }

    /// Returns temperature and humidity from a single refresh.
    pub fn current_sample(&self) -> CachedSample {
        self.reader.read()
    }

    /// Returns true if `value` is the invalid marker.
    pub fn is_invalid(&self, value: f64) -> bool {
        value == self.reader.invalid_value()
    }

    /// Returns true if reads can reach the native library.
    pub fn is_available(&self) -> bool {
        self.reader.is_available()
    }

    /// Returns the native library version, or `"unknown"` if it did not load.
    pub fn version() -> &'static str {
        loader::library()
            .map(LoadedLibrary::version)
            .unwrap_or(UNKNOWN_VERSION)
    }
}

impl Default for Ahtx0 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::ffi::SensorReading;
    use crate::loader::LibraryCell;
    use std::ffi::c_char;
    use std::sync::atomic::{AtomicUsize, Ordering};

    extern "C" fn no_version() -> *mut c_char {
        std::ptr::null_mut()
    }

    unsafe extern "C" fn free_nothing(_: *mut c_char) {}

    #[test]
    fn test_accessors_share_one_read() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        extern "C" fn read() -> SensorReading {
            CALLS.fetch_add(1, Ordering::SeqCst);
            SensorReading {
                temperature: 23.5,
                humidity: 45.2,
                status_code: 0,
            }
        }

        let entry_points = unsafe { EntryPoints::new(read, no_version, free_nothing) };
        let sensor = Ahtx0::from_entry_points(Some(entry_points), &SensorConfig::default());

        assert_eq!(sensor.current_temperature(), 23.5);
        assert_eq!(sensor.current_humidity(), 45.2);
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
        assert!(sensor.is_available());
    }

    #[test]
    fn test_error_status_reads_invalid() {
        extern "C" fn read() -> SensorReading {
            SensorReading {
                temperature: 23.5,
                humidity: 45.2,
                status_code: 1,
            }
        }

        let entry_points = unsafe { EntryPoints::new(read, no_version, free_nothing) };
        let sensor = Ahtx0::from_entry_points(Some(entry_points), &SensorConfig::default());

        let temperature = sensor.current_temperature();
        let humidity = sensor.current_humidity();
        assert_eq!(temperature, 1000.0);
        assert_eq!(humidity, 1000.0);
        assert!(sensor.is_invalid(temperature));
        assert!(sensor.is_invalid(humidity));
    }

    #[test]
    fn test_failed_load_never_reads() {
        let cell = LibraryCell::new();
        let entry_points = cell
            .get_or_load_with(|| {
                Err(LoadError::MissingSymbol {
                    symbol: "read_ahtx0_sensor",
                    reason: "undefined symbol".to_string(),
                })
            })
            .ok()
            .map(LoadedLibrary::entry_points);
        let sensor = Ahtx0::from_entry_points(entry_points, &SensorConfig::default());

        for _ in 0..20 {
            assert_eq!(sensor.current_temperature(), 1000.0);
            assert_eq!(sensor.current_humidity(), 1000.0);
        }
        assert!(!sensor.is_available());
        // No attempt was made, so the throttle clock never started.
        assert_eq!(sensor.current_sample().last_read, None);
    }

    #[test]
    fn test_sample_after_load() {
        extern "C" fn read() -> SensorReading {
            SensorReading {
                temperature: 18.25,
                humidity: 61.0,
                status_code: 0,
            }
        }

        let cell = LibraryCell::new();
        let library = cell
            .get_or_load_with(|| {
                let entry_points = unsafe { EntryPoints::new(read, no_version, free_nothing) };
                Ok(LoadedLibrary::from_entry_points(entry_points, "test"))
            })
            .unwrap();
        let sensor =
            Ahtx0::from_entry_points(Some(library.entry_points()), &SensorConfig::default());

        let sample = sensor.current_sample();
        assert_eq!(sample.temperature, 18.25);
        assert_eq!(sample.humidity, 61.0);
        assert!(!sensor.is_invalid(sample.temperature));
    }
}
