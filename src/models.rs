//! Data models module
//!
//! Defines the resolved injection policy handed to the injection collaborator:
//! - TargetConfig: per-application injection policy
//! - ChildGatingConfig: policy for processes forked by an injected application

use serde::{Deserialize, Serialize};

/// Resolved injection policy for one application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Application identity (process nice name) this record applies to
    pub app_name: String,
    /// Whether injection should proceed at all
    pub enabled: bool,
    /// Milliseconds to wait before injecting
    pub start_up_delay_ms: u64,
    /// Library paths to inject, in load order
    pub injected_libraries: Vec<String>,
    /// Policy for child processes forked by the application
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_gating: Option<ChildGatingConfig>,
}

/// Child-process gating policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildGatingConfig {
    pub enabled: bool,
    /// Opaque policy tag, passed through uninterpreted
    pub mode: String,
    /// Libraries for gated children; empty means the consumer decides
    #[serde(default)]
    pub injected_libraries: Vec<String>,
}

impl TargetConfig {
    /// Whether a host should go on to inject this application
    pub fn should_inject(&self) -> bool {
        self.enabled && !self.injected_libraries.is_empty()
    }
}

#[cfg(test)]
mod tests;
