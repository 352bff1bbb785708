//! AHTx0 Sensor Library
//!
//! Driver for the AHT10/AHT20 family of I2C temperature and humidity sensors,
//! plus a C ABI (`read_ahtx0_sensor`, `get_library_version`, `free_string`)
//! so the driver can be loaded as a shared library by a host process.

pub mod driver;
pub mod error;
pub mod ffi;

pub use driver::{Ahtx0, Measurement};
pub use error::{Error, Result};
pub use ffi::{free_string, get_library_version, read_ahtx0_sensor, SensorReading};

/// Default I2C bus device.
pub const I2C_BUS_PATH: &str = "/dev/i2c-1";

/// Default 7-bit I2C address of the sensor.
pub const DEVICE_ADDRESS: u8 = 0x38;
