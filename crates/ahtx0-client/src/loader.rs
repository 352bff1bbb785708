//! Native library loading.
//!
//! The library is opened at most once per process. The outcome, loaded or
//! failed, is remembered for the lifetime of the process and never retried.

use libloading::{Library, Symbol};
use std::ffi::{c_char, OsString};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{error, info};

use crate::error::LoadError;
use crate::ffi::{
    FreeStringFn, GetVersionFn, ReadSensorFn, SensorReading, FREE_SYMBOL, READ_SYMBOL,
    VERSION_SYMBOL,
};
use crate::version::resolve_version;
use crate::LIBRARY_NAME;

/// Resolved native entry points.
#[derive(Debug, Clone, Copy)]
pub struct EntryPoints {
    read: ReadSensorFn,
    get_version: GetVersionFn,
    free_string: FreeStringFn,
}

impl EntryPoints {
    /// Bundles the three native entry points.
    ///
    /// # Safety
    ///
    /// The functions must honour the native boundary contract and stay valid
    /// for as long as this value, or any copy of it, is in use.
    pub unsafe fn new(
        read: ReadSensorFn,
        get_version: GetVersionFn,
        free_string: FreeStringFn,
    ) -> Self {
        Self {
            read,
            get_version,
            free_string,
        }
    }

    /// Calls the native sensor read.
    pub fn read_sensor(&self) -> SensorReading {
        // SAFETY: guaranteed by the contract accepted in `new`.
        unsafe { (self.read)() }
    }

    /// Calls the native version getter. The result must go to `free_string`.
    pub(crate) fn get_version(&self) -> *mut c_char {
        // SAFETY: guaranteed by the contract accepted in `new`.
        unsafe { (self.get_version)() }
    }

    /// Releases a pointer returned by [`EntryPoints::get_version`].
    ///
    /// # Safety
    ///
    /// `ptr` must come from this value's version getter and not have been
    /// released already.
    pub(crate) unsafe fn free_string(&self, ptr: *mut c_char) {
        (self.free_string)(ptr)
    }
}

/// A successfully loaded native library.
///
/// A library opened from disk is never closed, even when this value is
/// dropped, so copied [`EntryPoints`] stay callable for the rest of the process.
pub struct LoadedLibrary {
    entry_points: EntryPoints,
    version: String,
    origin: String,
}

impl LoadedLibrary {
    /// Opens the shared library at `path` and resolves all entry points.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        // SAFETY: running the library's initialisers is the price of loading
        // it. The library is expected to be the AHTx0 native module.
        let library = unsafe { Library::new(path) }.map_err(|e| LoadError::Open {
            path: display.clone(),
            reason: e.to_string(),
        })?;

        // The handle is leaked: the library stays mapped until process exit.
        let library: &'static Library = Box::leak(Box::new(library));

        // SAFETY: symbol types match the native boundary contract, and the
        // library they point into is never unloaded.
        let entry_points = unsafe {
            let read = *symbol::<ReadSensorFn>(library, READ_SYMBOL)?;
            let get_version = *symbol::<GetVersionFn>(library, VERSION_SYMBOL)?;
            let free_string = *symbol::<FreeStringFn>(library, FREE_SYMBOL)?;
            EntryPoints::new(read, get_version, free_string)
        };

        Ok(Self::from_entry_points(entry_points, display))
    }

    /// Wraps entry points that are already available in-process.
    pub fn from_entry_points(entry_points: EntryPoints, origin: impl Into<String>) -> Self {
        let version = resolve_version(&entry_points);
        Self {
            entry_points,
            version,
            origin: origin.into(),
        }
    }

    /// Returns the resolved entry points.
    pub fn entry_points(&self) -> EntryPoints {
        self.entry_points
    }

    /// Returns the version reported by the library.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns where the library was loaded from.
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

unsafe fn symbol<'lib, T>(
    library: &'lib Library,
    name: &'static str,
) -> Result<Symbol<'lib, T>, LoadError> {
    library
        .get(name.as_bytes())
        .map_err(|e| LoadError::MissingSymbol {
            symbol: name,
            reason: e.to_string(),
        })
}

/// Initialize-once holder for a load outcome.
pub struct LibraryCell {
    state: OnceLock<Result<LoadedLibrary, LoadError>>,
}

impl LibraryCell {
    /// Creates an empty cell.
    pub const fn new() -> Self {
        Self {
            state: OnceLock::new(),
        }
    }

    /// Returns the stored outcome, running `load` first if nothing is stored.
    ///
    /// Concurrent first callers block until the single `load` call finishes.
    pub fn get_or_load_with<F>(&self, load: F) -> Result<&LoadedLibrary, &LoadError>
    where
        F: FnOnce() -> Result<LoadedLibrary, LoadError>,
    {
        self.state
            .get_or_init(|| {
                let outcome = load();
                match &outcome {
                    Ok(library) => info!(
                        "Loaded AHTx0 library v{} from: {}",
                        library.version(),
                        library.origin()
                    ),
                    Err(e) => {
                        error!("Library load failed: {}", e);
                        error!("Future sensor readings will fail");
                    }
                }
                outcome
            })
            .as_ref()
    }

    /// Returns the stored outcome without loading.
    pub fn get(&self) -> Option<Result<&LoadedLibrary, &LoadError>> {
        self.state.get().map(Result::as_ref)
    }
}

impl Default for LibraryCell {
    fn default() -> Self {
        Self::new()
    }
}

static LIBRARY: LibraryCell = LibraryCell::new();

/// Returns the process-wide native library, loading it on first use.
pub fn library() -> Result<&'static LoadedLibrary, &'static LoadError> {
    LIBRARY.get_or_load_with(load_native)
}

/// Returns the native entry points, loading the library on first use.
///
/// A failed load is remembered; later calls return the same error
/// without touching the filesystem again.
pub fn ensure_loaded() -> Result<EntryPoints, LoadError> {
    library()
        .map(LoadedLibrary::entry_points)
        .map_err(Clone::clone)
}

/// Like [`library`], with the stored failure as a crate [`Error`](crate::Error).
pub fn require_library() -> crate::Result<&'static LoadedLibrary> {
    library().map_err(|e| crate::Error::Load(e.clone()))
}

fn load_native() -> Result<LoadedLibrary, LoadError> {
    let module_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let target = library_candidate(module_dir.as_deref());

    info!(
        "Attempting to load library for the first time: '{}'",
        Path::new(&target).display()
    );
    LoadedLibrary::open(target)
}

/// Picks the library to open.
///
/// A copy next to the running executable wins; otherwise the bare file name
/// is handed to the platform loader, which searches its default paths.
pub fn library_candidate(module_dir: Option<&Path>) -> OsString {
    let file_name = libloading::library_filename(LIBRARY_NAME);

    module_dir
        .map(|dir| dir.join(&file_name))
        .filter(|local: &PathBuf| local.exists())
        .map(PathBuf::into_os_string)
        .unwrap_or(file_name)
}
