//! Unit tests for data models
//!
//! Validates serialization shape and the injection predicate.

use super::*;

fn target(enabled: bool, libs: &[&str]) -> TargetConfig {
    TargetConfig {
        app_name: "com.example.app".to_string(),
        enabled,
        start_up_delay_ms: 0,
        injected_libraries: libs.iter().map(|s| s.to_string()).collect(),
        child_gating: None,
    }
}

#[test]
fn test_should_inject_requires_enabled_and_libraries() {
    assert!(target(true, &["/x.so"]).should_inject());
    assert!(!target(false, &["/x.so"]).should_inject());
    assert!(!target(true, &[]).should_inject());
}

#[test]
fn test_child_gating_omitted_when_none() {
    let json = serde_json::to_string(&target(true, &["/x.so"])).expect("Should serialize");
    assert!(!json.contains("child_gating"), "child_gating should be omitted when None");
}

#[test]
fn test_child_gating_serialized_when_present() {
    let mut cfg = target(true, &["/x.so"]);
    cfg.child_gating = Some(ChildGatingConfig {
        enabled: true,
        mode: "whitelist".to_string(),
        injected_libraries: vec![],
    });

    let value = serde_json::to_value(&cfg).expect("Should serialize");
    assert_eq!(value["child_gating"]["mode"], "whitelist");
    assert_eq!(value["child_gating"]["enabled"], true);
    assert_eq!(value["injected_libraries"][0], "/x.so");
}
