//! Embeds a versioned SONAME into the shared library on Linux.

use std::env;

fn main() {
    let version = env::var("CARGO_PKG_VERSION").unwrap_or_default();
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();

    if target_os == "linux" {
        println!("cargo:rustc-cdylib-link-arg=-Wl,-soname,libread_ahtx0_rs.so.{version}");
    }

    println!("cargo:rerun-if-changed=build.rs");
}
