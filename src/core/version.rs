//! Build metadata stamped in by the build script

pub const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const BUILD_TIME: &str = env!("PLUGCALC_BUILD_TIME");
pub const GIT_HASH: &str = env!("PLUGCALC_GIT_HASH");

/// `--version` long output: package version, build time and commit
pub fn long_version() -> String {
    format!("{} (built {}, commit {})", PACKAGE_VERSION, BUILD_TIME, GIT_HASH)
}
