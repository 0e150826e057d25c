//! Whole-file reads from the module directory
//!
//! Reads go through the directory descriptor when the host granted one and
//! fall back to `module_dir/file_name` otherwise. Handles are owned by the
//! read and closed on drop, whatever the outcome.

use std::fs::File;
use std::io::Read;
use std::os::fd::BorrowedFd;
use std::path::Path;

use nix::fcntl::{openat, OFlag};
use nix::sys::stat::Mode;

use super::error::ConfigError;

/// Read a config file, logging access failures at debug unless `quiet`
pub fn read_file_content(
    module_dir: &Path,
    dir_fd: Option<BorrowedFd<'_>>,
    file_name: &str,
    quiet: bool,
) -> Option<Vec<u8>> {
    match try_read_file_content(module_dir, dir_fd, file_name) {
        Ok(content) => Some(content),
        Err(err) => {
            if !quiet {
                err.log();
            }
            None
        }
    }
}

/// Read a config file, reporting why it could not be read
pub fn try_read_file_content(
    module_dir: &Path,
    dir_fd: Option<BorrowedFd<'_>>,
    file_name: &str,
) -> Result<Vec<u8>, ConfigError> {
    let path = module_dir.join(file_name);
    let access = |source: std::io::Error| ConfigError::Access {
        path: path.clone(),
        source,
    };

    let mut file = match dir_fd {
        Some(dir_fd) => {
            let flags = OFlag::O_RDONLY | OFlag::O_CLOEXEC;
            let fd = openat(dir_fd, file_name, flags, Mode::empty())
                .map_err(|errno| access(errno.into()))?;
            File::from(fd)
        }
        None => File::open(&path).map_err(access)?,
    };

    let mut content = Vec::new();
    file.read_to_end(&mut content).map_err(access)?;
    Ok(content)
}
