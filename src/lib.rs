//! injectcfg - per-application injection config for a Zygisk module
//!
//! This library resolves, for a launching application, whether and which
//! shared libraries should be injected, from either the structured
//! `config.json` document or the legacy `target_packages` registry.

pub mod config;
pub mod constants;
pub mod logging;
pub mod models;
pub mod specialize;
pub mod web;

pub use config::{load_config, ConfigError};
pub use models::{ChildGatingConfig, TargetConfig};
