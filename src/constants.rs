//! Global constants for injectcfg
//!
//! Centralized location for file names, default locations and ports

/// Subsystem tag used for every log line emitted by the module
pub const APP_SUBSYSTEM: &str = "ZygiskFrida";

/// Default installation directory of the module on device
pub const DEFAULT_MODULE_DIR: &str = "/data/local/tmp/re.zyg.fri";

/// Structured config document, relative to the module directory
pub const STRUCTURED_CONFIG_FILE: &str = "config.json";

/// Legacy app registry, one `app_name[,start_up_delay_ms]` per line
pub const LEGACY_TARGETS_FILE: &str = "target_packages";

/// Legacy library list, one library path per line
pub const LEGACY_LIBRARIES_FILE: &str = "injected_libraries";

/// Library injected when the legacy registry matches but no library list exists
pub const DEFAULT_GADGET_FILE: &str = "libgadget.so";

/// Default port for the config editor
pub const WEB_DEFAULT_PORT: u16 = 8888;

/// Default bind address for the config editor
pub const WEB_DEFAULT_BIND: &str = "0.0.0.0";

/// Size of the first read from a config editor connection
pub const WEB_READ_BUFFER: usize = 4096;

/// How long the config editor waits for the rest of a declared request body
pub const WEB_BODY_TIMEOUT_MS: u64 = 5000;
