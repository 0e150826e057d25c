//! Legacy two-file config dialect
//!
//! `target_packages` holds one `app_name[,start_up_delay_ms]` per line.
//! `injected_libraries` holds one library path per line; when it is missing
//! the module's bundled gadget is injected.

use std::os::fd::BorrowedFd;
use std::path::Path;

use super::reader::read_file_content;
use crate::constants::{DEFAULT_GADGET_FILE, LEGACY_LIBRARIES_FILE, LEGACY_TARGETS_FILE};
use crate::models::TargetConfig;

/// Resolve `app_name` against the legacy files of a module directory
pub fn load(
    module_dir: &Path,
    dir_fd: Option<BorrowedFd<'_>>,
    app_name: &str,
) -> Option<TargetConfig> {
    // Absence is the common case for this dialect, so probing is quiet
    let registry = read_file_content(module_dir, dir_fd, LEGACY_TARGETS_FILE, true)?;

    parse(&registry, app_name, || {
        let libraries = read_file_content(module_dir, dir_fd, LEGACY_LIBRARIES_FILE, true);
        injected_libraries(module_dir, libraries.as_deref())
    })
}

/// Match `app_name` in a registry; `libraries` is only consulted on a match
pub fn parse<F>(registry: &[u8], app_name: &str, libraries: F) -> Option<TargetConfig>
where
    F: FnOnce() -> Vec<String>,
{
    for line in lines(registry, LEGACY_TARGETS_FILE) {
        let mut fields = line.split(',');
        let name = fields.next().unwrap_or_default();
        if name != app_name {
            log::debug!("Simple config mismatch: '{}' != '{}'", name, app_name);
            continue;
        }

        return Some(TargetConfig {
            app_name: name.to_string(),
            enabled: true,
            start_up_delay_ms: fields.next().map(parse_delay).unwrap_or(0),
            injected_libraries: libraries(),
            child_gating: None,
        });
    }

    None
}

/// Library list from file content, or the bundled gadget when there is none
pub fn injected_libraries(module_dir: &Path, content: Option<&[u8]>) -> Vec<String> {
    match content {
        Some(content) => lines(content, LEGACY_LIBRARIES_FILE)
            .map(str::to_string)
            .collect(),
        None => vec![module_dir.join(DEFAULT_GADGET_FILE).to_string_lossy().into_owned()],
    }
}

/// Non-empty lines with a trailing carriage return removed. Lines that are
/// not valid UTF-8 are skipped rather than rewritten.
fn lines<'a>(content: &'a [u8], file_name: &'a str) -> impl Iterator<Item = &'a str> {
    content
        .split(|byte| *byte == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .filter(|line| !line.is_empty())
        .filter_map(move |line| match std::str::from_utf8(line) {
            Ok(line) => Some(line),
            Err(e) => {
                log::debug!("Skipping non UTF-8 line in {}: {}", file_name, e);
                None
            }
        })
}

/// `strtoul`-style delay: optional `+`, leading digits only, 0 when there
/// are none. Unlike `strtoul`, a `-` sign yields 0 instead of wrapping.
fn parse_delay(field: &str) -> u64 {
    let digits: &str = {
        let trimmed = field.trim_start();
        let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        &trimmed[..end]
    };

    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u64::MAX)
}
