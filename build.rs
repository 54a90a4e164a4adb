//! Pokemon manager build script.

use rustc_version::version_meta;
use rustc_version::Channel::Nightly;

#[doc(hidden)]
fn main() {
    // Migrations are embedded in the `run_migrations` binary, so rebuild when they change.
    println!("cargo:rerun-if-changed=migrations");

    // Capturing a `Backtrace` in our error types requires the `error_generic_member_access`
    // APIs, which are only available on Nightly (or dev) toolchains.
    if version_meta().unwrap().channel <= Nightly {
        println!("cargo:rustc-cfg=backtrace_support");
    }
}
