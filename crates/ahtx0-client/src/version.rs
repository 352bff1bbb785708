//! Library version handshake.
//!
//! The native getter allocates the string; only the native `free_string`
//! may release it. The buffer is copied into an owned `String` and then
//! handed straight back.

use std::ffi::{c_char, CStr};
use tracing::{debug, warn};

use crate::loader::EntryPoints;

/// Version reported when the native library gives none or an unreadable one.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Borrowed native string, released through the owning library on drop.
struct NativeString<'a> {
    ptr: *mut c_char,
    entry_points: &'a EntryPoints,
}

impl NativeString<'_> {
    fn to_owned_string(&self) -> Option<String> {
        // SAFETY: `ptr` is non-null and points to a NUL-terminated buffer
        // owned by the native library until `free_string` is called.
        let raw = unsafe { CStr::from_ptr(self.ptr) };
        match raw.to_str() {
            Ok(s) => Some(s.to_owned()),
            Err(e) => {
                warn!("Native library version is not valid UTF-8: {}", e);
                None
            }
        }
    }
}

impl Drop for NativeString<'_> {
    fn drop(&mut self) {
        // SAFETY: `ptr` came from this library's version getter and this is
        // the only place it is released.
        unsafe { self.entry_points.free_string(self.ptr) };
    }
}

/// Fetches the version string from the native library.
///
/// Returns [`UNKNOWN_VERSION`] if the getter returns null or the buffer is
/// not valid UTF-8. A non-null buffer is released exactly once either way.
pub fn resolve_version(entry_points: &EntryPoints) -> String {
    let ptr = entry_points.get_version();
    if ptr.is_null() {
        debug!("Native library returned no version");
        return UNKNOWN_VERSION.to_string();
    }

    let native = NativeString { ptr, entry_points };
    native
        .to_owned_string()
        .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::SensorReading;
    use std::ffi::CString;
    use std::ptr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    extern "C" fn read_unused() -> SensorReading {
        unreachable!("version tests never read")
    }

    mod valid {
        use super::*;

        pub static FREES: AtomicUsize = AtomicUsize::new(0);

        pub extern "C" fn get_version() -> *mut c_char {
            CString::new("1.2.3").unwrap().into_raw()
        }

        pub unsafe extern "C" fn free_string(s: *mut c_char) {
            FREES.fetch_add(1, Ordering::SeqCst);
            drop(CString::from_raw(s));
        }
    }

    mod null {
        use super::*;

        pub static FREES: AtomicUsize = AtomicUsize::new(0);

        pub extern "C" fn get_version() -> *mut c_char {
            ptr::null_mut()
        }

        pub unsafe extern "C" fn free_string(_: *mut c_char) {
            FREES.fetch_add(1, Ordering::SeqCst);
        }
    }

    mod invalid_utf8 {
        use super::*;

        pub static FREES: AtomicUsize = AtomicUsize::new(0);

        pub extern "C" fn get_version() -> *mut c_char {
            CString::new(vec![0xFF, 0xFE, b'1']).unwrap().into_raw()
        }

        pub unsafe extern "C" fn free_string(s: *mut c_char) {
            FREES.fetch_add(1, Ordering::SeqCst);
            drop(CString::from_raw(s));
        }
    }

    #[test]
    fn test_resolve_version_frees_once() {
        let entry_points =
            unsafe { EntryPoints::new(read_unused, valid::get_version, valid::free_string) };

        assert_eq!(resolve_version(&entry_points), "1.2.3");
        assert_eq!(valid::FREES.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_null_version_is_not_freed() {
        let entry_points =
            unsafe { EntryPoints::new(read_unused, null::get_version, null::free_string) };

        assert_eq!(resolve_version(&entry_points), UNKNOWN_VERSION);
        assert_eq!(null::FREES.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalid_utf8_still_freed() {
        let entry_points = unsafe {
            EntryPoints::new(
                read_unused,
                invalid_utf8::get_version,
                invalid_utf8::free_string,
            )
        };

        assert_eq!(resolve_version(&entry_points), UNKNOWN_VERSION);
        assert_eq!(invalid_utf8::FREES.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_native_library_version() {
        let entry_points = unsafe {
            EntryPoints::new(
                read_unused,
                read_ahtx0_rs::get_library_version,
                read_ahtx0_rs::free_string,
            )
        };

        assert_eq!(resolve_version(&entry_points), env!("CARGO_PKG_VERSION"));
    }
}
