//! AHTx0 sensor driver over embedded-hal I2C.

use crate::{Error, Result};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use tracing::debug;

/// Soft reset command.
const CMD_SOFT_RESET: u8 = 0xBA;

/// Trigger measurement command with its two parameter bytes.
const CMD_TRIGGER: [u8; 3] = [0xAC, 0x33, 0x00];

/// Status bit set once the sensor has loaded its calibration.
const STATUS_CALIBRATED: u8 = 0x08;

/// Status bit set while a measurement is in progress.
const STATUS_BUSY: u8 = 0x80;

/// Number of status polls before giving up.
const POLL_ATTEMPTS: usize = 10;

/// Delay between status polls in milliseconds.
const POLL_DELAY_MS: u32 = 10;

/// Delay after a soft reset in milliseconds.
const RESET_DELAY_MS: u32 = 20;

/// Delay after triggering a measurement in milliseconds.
const MEASURE_DELAY_MS: u32 = 80;

/// One decoded temperature/humidity measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
}

impl Measurement {
    /// Decodes the 6-byte measurement frame.
    ///
    /// Byte 0 is status. Humidity is the 20 bits starting at byte 1,
    /// temperature the 20 bits ending at byte 5.
    pub fn from_raw_bytes(data: [u8; 6]) -> Self {
        let raw_humidity =
            ((data[1] as u32) << 12) | ((data[2] as u32) << 4) | ((data[3] as u32) >> 4);
        let raw_temperature =
            (((data[3] as u32) & 0x0F) << 16) | ((data[4] as u32) << 8) | (data[5] as u32);

        let scale = f64::from(1u32 << 20);
        Self {
            temperature: (f64::from(raw_temperature) / scale) * 200.0 - 50.0,
            humidity: (f64::from(raw_humidity) / scale) * 100.0,
        }
    }
}

/// AHTx0 sensor on an I2C bus.
pub struct Ahtx0<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C, D> Ahtx0<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Resets the sensor and waits for it to report calibration.
    pub fn new(i2c: I2C, delay: D, address: u8) -> Result<Self, I2C::Error> {
        let mut sensor = Self {
            i2c,
            delay,
            address,
        };
        sensor.soft_reset()?;
        sensor.wait_for_calibration()?;
        debug!("AHTx0 at 0x{:02X} calibrated", address);
        Ok(sensor)
    }

    /// Sends a soft reset.
    pub fn soft_reset(&mut self) -> Result<(), I2C::Error> {
        self.i2c
            .write(self.address, &[CMD_SOFT_RESET])
            .map_err(Error::I2c)?;
        self.delay.delay_ms(RESET_DELAY_MS);
        Ok(())
    }

    /// Reads the status byte.
    pub fn status(&mut self) -> Result<u8, I2C::Error> {
        let mut buffer = [0u8; 1];
        self.i2c
            .read(self.address, &mut buffer)
            .map_err(Error::I2c)?;
        Ok(buffer[0])
    }

    fn wait_for_calibration(&mut self) -> Result<(), I2C::Error> {
        for _ in 0..POLL_ATTEMPTS {
            if self.status()? & STATUS_CALIBRATED == STATUS_CALIBRATED {
                return Ok(());
            }
            self.delay.delay_ms(POLL_DELAY_MS);
        }
        Err(Error::CalibrationFailed)
    }

    /// Triggers a measurement and reads it back once the sensor is idle.
    pub fn measure(&mut self) -> Result<Measurement, I2C::Error> {
        self.i2c
            .write(self.address, &CMD_TRIGGER)
            .map_err(Error::I2c)?;
        self.delay.delay_ms(MEASURE_DELAY_MS);

        for _ in 0..POLL_ATTEMPTS {
            if self.status()? & STATUS_BUSY == 0 {
                let mut buffer = [0u8; 6];
                self.i2c
                    .read(self.address, &mut buffer)
                    .map_err(Error::I2c)?;
                let measurement = Measurement::from_raw_bytes(buffer);
                debug!(
                    "AHTx0 measurement: {:.2} °C, {:.2} %RH",
                    measurement.temperature, measurement.humidity
                );
                return Ok(measurement);
            }
            self.delay.delay_ms(POLL_DELAY_MS);
        }
        Err(Error::SensorStillBusy)
    }

    /// Releases the bus and delay.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}
