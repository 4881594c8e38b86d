//! Build-time information
//!
//! Build metadata captured at compile time: timestamps, cargo configuration,
//! compiler version and, when the crate was built from a git checkout, the
//! commit it was built from.

/// Build timestamp (when the binary was compiled)
pub const BUILD_TIMESTAMP: &str = env!("VERGEN_BUILD_TIMESTAMP");

/// Cargo optimization level (0, 1, 2, 3, s, z)
pub const CARGO_OPT_LEVEL: &str = env!("VERGEN_CARGO_OPT_LEVEL");

/// Target triple (e.g., x86_64-unknown-linux-gnu, x86_64-apple-darwin)
pub const CARGO_TARGET_TRIPLE: &str = env!("VERGEN_CARGO_TARGET_TRIPLE");

/// Rust compiler version (e.g., 1.75.0)
pub const RUSTC_SEMVER: &str = env!("VERGEN_RUSTC_SEMVER");

/// Rust channel (stable, beta, or nightly)
pub const RUSTC_CHANNEL: &str = env!("VERGEN_RUSTC_CHANNEL");

// Git metadata is absent when building from a source tarball
const GIT_SHA: Option<&str> = option_env!("VERGEN_GIT_SHA");
const GIT_BRANCH: Option<&str> = option_env!("VERGEN_GIT_BRANCH");
const GIT_DIRTY: Option<&str> = option_env!("VERGEN_GIT_DIRTY");

/// Crate version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn git_sha() -> &'static str {
    GIT_SHA.unwrap_or("unknown")
}

/// First 7 characters of the commit SHA
pub fn git_sha_short() -> &'static str {
    let sha = git_sha();
    sha.get(..7).unwrap_or(sha)
}

pub fn git_branch() -> &'static str {
    GIT_BRANCH.unwrap_or("unknown")
}

pub fn is_git_dirty() -> bool {
    GIT_DIRTY == Some("true")
}

/// Returns a formatted build version string
///
/// Format: `{version}+{sha}-{target_triple}-opt{opt_level}`
/// Example: `0.1.0+1a2b3c4-x86_64-unknown-linux-gnu-opt3`
pub fn version_string() -> String {
    format!(
        "{}+{}-{}-opt{}",
        PKG_VERSION,
        git_sha_short(),
        CARGO_TARGET_TRIPLE,
        CARGO_OPT_LEVEL
    )
}

/// Returns a detailed build info string
pub fn detailed_info() -> String {
    format!(
        "Version: {}\nGit: {}@{}{}\nBuilt: {}\nTarget: {}\nOptimization: {}\nRustc: {} ({})",
        PKG_VERSION,
        git_branch(),
        git_sha_short(),
        if is_git_dirty() { " (dirty)" } else { "" },
        BUILD_TIMESTAMP,
        CARGO_TARGET_TRIPLE,
        CARGO_OPT_LEVEL,
        RUSTC_SEMVER,
        RUSTC_CHANNEL
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_sha_is_bounded() {
        assert!(git_sha_short().len() <= 7);
    }

    #[test]
    fn test_version_string_starts_with_package_version() {
        assert!(version_string().starts_with(PKG_VERSION));
        assert!(detailed_info().contains(CARGO_TARGET_TRIPLE));
    }
}
