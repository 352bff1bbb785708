//! Native boundary contract.
//!
//! Mirrors the record and function signatures exported by the native
//! library. Field order, sizes and alignment must match exactly.

use std::ffi::c_char;

/// Sensor read entry point.
pub const READ_SYMBOL: &str = "read_ahtx0_sensor";

/// Version getter entry point.
pub const VERSION_SYMBOL: &str = "get_library_version";

/// String release entry point.
pub const FREE_SYMBOL: &str = "free_string";

/// Reading record returned by value from the native read.
///
/// When `status_code` is non-zero the other two fields carry no meaning.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub temperature: f64,
    pub humidity: f64,
    pub status_code: i32,
}

impl SensorReading {
    /// Returns true if the native read reported success.
    pub fn is_ok(&self) -> bool {
        self.status_code == 0
    }
}

/// `SensorReading read_ahtx0_sensor(void)`
pub type ReadSensorFn = unsafe extern "C" fn() -> SensorReading;

/// `char *get_library_version(void)`
pub type GetVersionFn = unsafe extern "C" fn() -> *mut c_char;

/// `void free_string(char *)`
pub type FreeStringFn = unsafe extern "C" fn(*mut c_char);
