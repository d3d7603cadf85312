//! Tests for types

use super::*;
use proptest::prelude::*;

#[test]
fn test_queue_config_default() {
    let config = QueueConfig::default();
    assert_eq!(config.capacity, 4);
    assert_eq!(config.default_lifetime_ms, 4000);
    assert_eq!(config.position, Position::TopRight);
}

#[test]
fn test_parse_full_queue_section() {
    let toml = r#"
[queue]
capacity = 3
default_lifetime_ms = 1500
position = "bottom-left"
"#;
    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.queue.capacity, 3);
    assert_eq!(config.queue.default_lifetime_ms, 1500);
    assert_eq!(config.queue.position, Position::BottomLeft);
}

#[test]
fn test_empty_queue_section_uses_defaults() {
    let config: Config = toml::from_str("[queue]\n").unwrap();
    assert_eq!(config.queue, QueueConfig::default());
}

#[test]
fn test_missing_queue_section_uses_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.queue, QueueConfig::default());
}

#[test]
fn test_invalid_position_falls_back_to_top_right() {
    let toml = r#"
[queue]
position = "middle"
"#;
    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.queue.position, Position::TopRight);
}

#[test]
fn test_position_parse_is_case_insensitive() {
    assert_eq!(Position::parse_lenient("Bottom-Right"), Position::BottomRight);
    assert_eq!(Position::parse_lenient(" top-left "), Position::TopLeft);
}

#[test]
fn test_zero_capacity_rejected() {
    let config = QueueConfig {
        capacity: 0,
        ..QueueConfig::default()
    };
    assert!(matches!(config.settings(), Err(ToastError::InvalidCapacity)));
}

#[test]
fn test_zero_lifetime_rejected() {
    let config = QueueConfig {
        default_lifetime_ms: 0,
        ..QueueConfig::default()
    };
    assert!(matches!(config.settings(), Err(ToastError::InvalidLifetime)));
}

#[test]
fn test_settings_carry_position() {
    let config = QueueConfig {
        position: Position::BottomRight,
        ..QueueConfig::default()
    };
    let settings = config.settings().unwrap();
    assert_eq!(settings.position, Position::BottomRight);
    assert_eq!(settings.capacity.get(), 4);
    assert_eq!(settings.default_lifetime, Duration::from_millis(4000));
}

#[test]
fn test_default_settings_match_default_config() {
    assert_eq!(
        QueueSettings::default(),
        QueueConfig::default().settings().unwrap()
    );
}

// Any string that is not one of the four corner names resolves to the default
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_unknown_position_falls_back(raw in "[a-z-]{0,14}".prop_filter(
        "not a valid position",
        |s| !["top-left", "top-right", "bottom-left", "bottom-right"].contains(&s.as_str())
    )) {
        prop_assert_eq!(Position::parse_lenient(&raw), Position::TopRight);
    }

    #[test]
    fn prop_positive_values_always_validate(capacity in 1usize..1000, lifetime in 1u64..100_000) {
        let settings = QueueSettings::new(capacity, Duration::from_millis(lifetime));
        prop_assert!(settings.is_ok());
    }
}
