//! Host specialization hooks
//!
//! The host calls [`ModuleSession::pre_app_specialize`] while the app
//! process is still privileged (config files are readable) and
//! [`ModuleSession::post_app_specialize`] once it runs as the app. Injection
//! itself belongs to an [`Injector`] implementation.

use std::os::fd::OwnedFd;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::load_config;
use crate::models::TargetConfig;

/// Downstream collaborator that maps a library into the current process
pub trait Injector: Send + Sync {
    /// Load one library; `context` names the app for log lines
    fn inject_library(&self, library_path: &str, context: &str);
}

/// What the host should do once the app process is specialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecializeOutcome {
    /// Inject with this config
    Inject(TargetConfig),
    /// Nothing to do, the module library can be unloaded
    Unload,
}

/// Per-launch state carried between the two specialization hooks
#[derive(Debug)]
pub struct ModuleSession {
    module_dir: PathBuf,
    module_dir_fd: Option<OwnedFd>,
    config: Option<TargetConfig>,
}

impl ModuleSession {
    pub fn new(module_dir: impl Into<PathBuf>) -> Self {
        Self {
            module_dir: module_dir.into(),
            module_dir_fd: None,
            config: None,
        }
    }

    /// Resolve through a directory handle granted by the host
    pub fn with_dir_fd(mut self, dir_fd: OwnedFd) -> Self {
        self.module_dir_fd = Some(dir_fd);
        self
    }

    pub fn pre_app_specialize(&mut self, app_name: &str) {
        use std::os::fd::AsFd;

        let dir_fd = self.module_dir_fd.as_ref().map(|fd| fd.as_fd());
        self.config = load_config(&self.module_dir, dir_fd, app_name);

        if self.config.is_some() {
            log::info!("Pre-app specialize: loaded config for {}", app_name);
        }
    }

    pub fn post_app_specialize(&mut self) -> SpecializeOutcome {
        match self.config.take() {
            Some(cfg) if cfg.should_inject() => {
                log::info!("App specialize: injection started for {}", cfg.app_name);
                SpecializeOutcome::Inject(cfg)
            }
            _ => SpecializeOutcome::Unload,
        }
    }

    /// Config resolved by the last `pre_app_specialize`, if still held
    pub fn config(&self) -> Option<&TargetConfig> {
        self.config.as_ref()
    }
}

/// Wait `start_up_delay_ms`, then inject every library in order on a new thread
pub fn spawn_injection(injector: Arc<dyn Injector>, cfg: TargetConfig) -> JoinHandle<()> {
    std::thread::spawn(move || {
        if cfg.start_up_delay_ms > 0 {
            log::info!(
                "Waiting {}ms before injecting {}",
                cfg.start_up_delay_ms,
                cfg.app_name
            );
            std::thread::sleep(Duration::from_millis(cfg.start_up_delay_ms));
        }

        for library in &cfg.injected_libraries {
            log::info!("Injecting {} into {}", library, cfg.app_name);
            injector.inject_library(library, &cfg.app_name);
        }
    })
}
