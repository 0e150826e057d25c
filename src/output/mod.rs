//! Output formatting module
//!
//! Human-readable and JSON rendering of resolved configs

use anyhow::Result;
use std::fmt::Write;

use injectcfg::models::TargetConfig;

/// Render one resolved config for a terminal
pub fn format_human(cfg: &TargetConfig) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(out, "{}:", cfg.app_name);
    let _ = writeln!(out, "  enabled: {}", cfg.enabled);
    let _ = writeln!(out, "  start_up_delay_ms: {}", cfg.start_up_delay_ms);
    let _ = writeln!(out, "  injected_libraries:");
    for library in &cfg.injected_libraries {
        let _ = writeln!(out, "    - {}", library);
    }

    if let Some(gating) = &cfg.child_gating {
        let _ = writeln!(out, "  child_gating:");
        let _ = writeln!(out, "    enabled: {}", gating.enabled);
        let _ = writeln!(out, "    mode: {}", gating.mode);
        if !gating.injected_libraries.is_empty() {
            let _ = writeln!(out, "    injected_libraries:");
            for library in &gating.injected_libraries {
                let _ = writeln!(out, "      - {}", library);
            }
        }
    }
    out
}

/// Summary of a structured document's targets
pub fn format_targets_human(targets: &[TargetConfig]) -> String {
    if targets.is_empty() {
        return "Config is valid but has no targets.\n".to_string();
    }

    let mut out = format!("Config is valid with {} target(s):\n\n", targets.len());
    for target in targets {
        out.push_str(&format_human(target));
        out.push('\n');
    }
    out
}

pub fn format_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use injectcfg::models::ChildGatingConfig;

    #[test]
    fn test_format_human_lists_libraries_in_order() {
        let cfg = TargetConfig {
            app_name: "com.a".to_string(),
            enabled: true,
            start_up_delay_ms: 500,
            injected_libraries: vec!["/b.so".to_string(), "/a.so".to_string()],
            child_gating: Some(ChildGatingConfig {
                enabled: false,
                mode: "blacklist".to_string(),
                injected_libraries: vec![],
            }),
        };

        let text = format_human(&cfg);
        assert!(text.starts_with("com.a:\n"));
        assert!(text.find("/b.so").unwrap() < text.find("/a.so").unwrap());
        assert!(text.contains("mode: blacklist"));
    }

    #[test]
    fn test_format_targets_empty() {
        assert!(format_targets_human(&[]).contains("no targets"));
    }
}
