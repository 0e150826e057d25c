//! Config resolution module
//!
//! Resolves the injection policy of one application from the module
//! directory. Runs on every application launch inside the host, so nothing
//! here may panic: every failure is logged and degrades to `None`.
//!
//! Precedence:
//! - The structured document (`config.json`) is tried first.
//! - The legacy files (`target_packages` + `injected_libraries`) are only
//!   consulted when the structured step yields nothing, whether because the
//!   document is missing, malformed or has no entry for the application.

pub mod error;
pub mod legacy;
pub mod reader;
pub mod structured;

use std::os::fd::BorrowedFd;
use std::path::Path;

pub use error::ConfigError;
pub use reader::read_file_content;

use crate::constants::STRUCTURED_CONFIG_FILE;
use crate::models::TargetConfig;

/// Resolve the config for `app_name`, re-reading the module directory each call
pub fn load_config(
    module_dir: &Path,
    dir_fd: Option<BorrowedFd<'_>>,
    app_name: &str,
) -> Option<TargetConfig> {
    if let Some(cfg) = load_structured_config(module_dir, dir_fd, app_name) {
        return Some(cfg);
    }

    legacy::load(module_dir, dir_fd, app_name)
}

/// Structured step of [`load_config`] on its own
pub fn load_structured_config(
    module_dir: &Path,
    dir_fd: Option<BorrowedFd<'_>>,
    app_name: &str,
) -> Option<TargetConfig> {
    let content = read_file_content(module_dir, dir_fd, STRUCTURED_CONFIG_FILE, false)?;

    let resolved = structured::parse_targets(&content)
        .and_then(|targets| structured::resolve(targets, app_name));

    match resolved {
        Ok(cfg) => {
            log::info!("Config match found for app: {}", app_name);
            Some(cfg)
        }
        Err(err) => {
            err.log();
            None
        }
    }
}
