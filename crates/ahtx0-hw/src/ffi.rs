//! C ABI exported by the shared library.
//!
//! Exports:
//! - `read_ahtx0_sensor() -> SensorReading`
//! - `get_library_version() -> *mut c_char` (caller must hand it back to `free_string`)
//! - `free_string(*mut c_char)`

use std::ffi::{c_char, CString};
use std::panic;
use std::ptr;
use tracing::warn;

use crate::driver::Measurement;

/// Value written to both fields when a read fails.
const INVALID_VALUE: f64 = 1000.0;

/// Status code for a panic caught at the boundary.
const STATUS_PANIC: i32 = -5;

/// Reading record returned by value across the C ABI.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub temperature: f64,
    pub humidity: f64,
    /// 0 on success, negative on error.
    pub status_code: i32,
}

impl SensorReading {
    fn ok(measurement: Measurement) -> Self {
        Self {
            temperature: measurement.temperature,
            humidity: measurement.humidity,
            status_code: 0,
        }
    }

    fn failed(status_code: i32) -> Self {
        Self {
            temperature: INVALID_VALUE,
            humidity: INVALID_VALUE,
            status_code,
        }
    }
}

/// Reads the sensor on the default bus and address.
#[no_mangle]
pub extern "C" fn read_ahtx0_sensor() -> SensorReading {
    match panic::catch_unwind(read_default_sensor) {
        Ok(reading) => reading,
        Err(_) => {
            warn!("Panic while reading AHTx0 sensor");
            SensorReading::failed(STATUS_PANIC)
        }
    }
}

/// Returns the library version as a newly allocated C string.
///
/// Ownership passes to the caller, who must release it with [`free_string`].
#[no_mangle]
pub extern "C" fn get_library_version() -> *mut c_char {
    CString::new(env!("CARGO_PKG_VERSION"))
        .map(CString::into_raw)
        .unwrap_or(ptr::null_mut())
}

/// Releases a string returned by [`get_library_version`].
///
/// # Safety
///
/// `s` must be null or a pointer obtained from [`get_library_version`] that
/// has not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(target_os = "linux")]
fn read_default_sensor() -> SensorReading {
    use crate::{Ahtx0, Error, DEVICE_ADDRESS, I2C_BUS_PATH};
    use linux_embedded_hal::{Delay, I2CError, I2cdev};

    let result = I2cdev::new(I2C_BUS_PATH)
        .map_err(|e| Error::I2c(I2CError::from(e)))
        .and_then(|i2c| Ahtx0::new(i2c, Delay, DEVICE_ADDRESS))
        .and_then(|mut sensor| sensor.measure());

    match result {
        Ok(measurement) => SensorReading::ok(measurement),
        Err(e) => {
            warn!("AHTx0 read on {} failed: {}", I2C_BUS_PATH, e);
            SensorReading::failed(e.status_code())
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn read_default_sensor() -> SensorReading {
    SensorReading::failed(crate::Error::<()>::Unsupported.status_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;
    use std::mem::{align_of, offset_of, size_of};

    #[test]
    fn test_reading_layout() {
        assert_eq!(size_of::<SensorReading>(), 24);
        assert_eq!(align_of::<SensorReading>(), 8);
        assert_eq!(offset_of!(SensorReading, temperature), 0);
        assert_eq!(offset_of!(SensorReading, humidity), 8);
        assert_eq!(offset_of!(SensorReading, status_code), 16);
    }

    #[test]
    fn test_version_round_trip() {
        let ptr = get_library_version();
        assert!(!ptr.is_null());
        let version = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_owned();
        unsafe { free_string(ptr) };
        assert_eq!(version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_free_null_is_noop() {
        unsafe { free_string(ptr::null_mut()) };
    }

    #[test]
    fn test_failed_reading() {
        let reading = SensorReading::failed(-3);
        assert_eq!(reading.temperature, 1000.0);
        assert_eq!(reading.humidity, 1000.0);
        assert_eq!(reading.status_code, -3);
    }
}
