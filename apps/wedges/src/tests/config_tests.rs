use super::{apply_env_overrides, apply_file_settings, load_settings, Settings};

use std::{
    collections::HashMap,
    env, fs,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_match_walk_policy_defaults() {
    let policy = Settings::default().walk_policy().expect("policy");
    assert_eq!(policy.tick_interval(), Duration::from_millis(500));
    assert_eq!(policy.max_wedges(), 50);
    assert_eq!(policy.add_probability(), 0.5);
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file_settings(&mut settings, "tick_interval_ms = 200\nseed = 99\n").expect("parse");

    assert_eq!(settings.tick_interval_ms, 200);
    assert_eq!(settings.seed, Some(99));
    assert_eq!(settings.max_wedges, 50);
}

#[test]
fn malformed_file_is_an_error() {
    let mut settings = Settings::default();
    assert!(apply_file_settings(&mut settings, "max_wedges = \"lots\"").is_err());
}

#[test]
fn app_prefixed_env_wins_over_legacy_name() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env_from(&[
            ("WEDGES_TICK_INTERVAL_MS", "300"),
            ("APP__TICK_INTERVAL_MS", "250"),
            ("APP__MAX_WEDGES", "12"),
            ("APP__ADD_PROBABILITY", "0.25"),
        ]),
    );

    assert_eq!(settings.tick_interval_ms, 250);
    assert_eq!(settings.max_wedges, 12);
    assert_eq!(settings.add_probability, 0.25);
}

#[test]
fn unparsable_env_values_are_ignored() {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings, env_from(&[("APP__SEED", "not-a-number")]));
    assert_eq!(settings.seed, None);
}

#[test]
fn invalid_probability_fails_policy_conversion() {
    let settings = Settings {
        add_probability: 2.0,
        ..Settings::default()
    };
    assert!(settings.walk_policy().is_err());
}

#[test]
fn loads_file_from_disk_and_skips_missing_file() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("wedges_config_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp dir");

    let missing = load_settings(&temp_root.join("absent.toml")).expect("missing file is fine");
    assert_eq!(missing.max_wedges, Settings::default().max_wedges);

    let path = temp_root.join("wedges.toml");
    fs::write(&path, "max_wedges = 7\nadd_probability = 0.75\n").expect("write config");
    let loaded = load_settings(&path).expect("load");
    assert_eq!(loaded.max_wedges, 7);
    assert_eq!(loaded.add_probability, 0.75);

    fs::remove_dir_all(temp_root).expect("cleanup");
}
