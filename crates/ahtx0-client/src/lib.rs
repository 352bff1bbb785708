//! Host-side binding for the AHTx0 native sensor library.
//!
//! The native library is loaded once per process, its version string is
//! copied out and handed back for release, and every [`Ahtx0`] keeps a
//! throttled cache in front of the native read so repeated queries do not
//! hit the I2C bus.
//!
//! ```no_run
//! use ahtx0_client::Ahtx0;
//!
//! let sensor = Ahtx0::new();
//! println!("library v{}", Ahtx0::version());
//! println!("{:.1} °C", sensor.current_temperature());
//! println!("{:.1} %RH", sensor.current_humidity());
//! ```

pub mod config;
pub mod error;
pub mod ffi;
pub mod loader;
pub mod reader;
pub mod sensor;
pub mod version;

pub use config::SensorConfig;
pub use error::{Error, LoadError, Result};
pub use ffi::SensorReading;
pub use loader::{ensure_loaded, EntryPoints, LibraryCell, LoadedLibrary};
pub use reader::{CachedSample, ThrottledReader};
pub use sensor::Ahtx0;
pub use version::{resolve_version, UNKNOWN_VERSION};

/// Base name of the native library (`libread_ahtx0_rs.so` on Linux).
pub const LIBRARY_NAME: &str = "read_ahtx0_rs";
