//! Error types for the AHTx0 driver.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T, E> = std::result::Result<T, Error<E>>;

/// Errors that can occur when talking to the sensor.
///
/// `E` is the error type of the underlying I2C implementation.
#[derive(Error, Debug)]
pub enum Error<E> {
    /// I2C bus communication error.
    #[error("I2C communication error: {0:?}")]
    I2c(E),

    /// Calibration bit never came up after reset.
    #[error("Sensor could not be calibrated")]
    CalibrationFailed,

    /// Busy bit never cleared after triggering a measurement.
    #[error("Sensor is still busy")]
    SensorStillBusy,

    /// No I2C backend is available on this platform.
    #[error("I2C access is not supported on this platform")]
    Unsupported,
}

impl<E> Error<E> {
    /// Status code reported across the C ABI. Zero is reserved for success.
    pub fn status_code(&self) -> i32 {
        match self {
            Error::I2c(_) => -1,
            Error::CalibrationFailed => -2,
            Error::SensorStillBusy => -3,
            Error::Unsupported => -4,
        }
    }
}
