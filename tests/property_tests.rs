//! Property-based tests for rust_logging_facility using proptest

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_logging_facility::core::Hierarchy;
use rust_logging_facility::prelude::*;
use rust_logging_facility::{RotationSchedule, RotationWhen};

fn any_severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Debug),
        Just(Severity::Info),
        Just(Severity::Warning),
        Just(Severity::Error),
        Just(Severity::Critical),
    ]
}

fn any_when() -> impl Strategy<Value = RotationWhen> {
    prop_oneof![
        Just(RotationWhen::Seconds),
        Just(RotationWhen::Minutes),
        Just(RotationWhen::Hours),
        Just(RotationWhen::Days),
        Just(RotationWhen::Midnight),
        (0u8..7).prop_map(RotationWhen::Weekday),
    ]
}

/// Dot-separated names such as `Sound.Speaker`
fn logger_name() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Z][a-z]{0,6}", 1..4).prop_map(|segments| segments.join("."))
}

proptest! {
    /// Severity ordering follows the numeric discriminants
    #[test]
    fn test_severity_order_matches_discriminant(a in any_severity(), b in any_severity()) {
        prop_assert_eq!(a <= b, (a as u8) <= (b as u8));
        prop_assert_eq!(a.cmp(&b), (a as u8).cmp(&(b as u8)));
    }

    #[test]
    fn test_severity_names_parse_back(level in any_severity()) {
        let parsed: Severity = level.to_str().parse().unwrap();
        prop_assert_eq!(parsed, level);
        let lower: Severity = level.to_str().to_lowercase().parse().unwrap();
        prop_assert_eq!(lower, level);
    }

    /// A handler passes exactly the records at or above its minimum
    #[test]
    fn test_handler_filtering(min in any_severity(), level in any_severity()) {
        let formatter = std::sync::Arc::new(Formatter::new("plain", "{message}").unwrap());
        let handler = Handler::new("h", min, formatter, Box::new(ConsoleSink::stderr()));
        prop_assert_eq!(handler.accepts(level), level >= min);
    }

    /// Without explicit levels every logger resolves to the root's level
    #[test]
    fn test_notset_chain_resolves_to_root(
        root in any_severity(),
        names in prop::collection::vec(logger_name(), 1..6),
    ) {
        let mut hierarchy = Hierarchy::new();
        hierarchy.set_level("", LevelSetting::Level(root)).unwrap();
        for name in &names {
            hierarchy.ensure(name).unwrap();
        }
        for name in &names {
            prop_assert_eq!(hierarchy.effective_level(name), root);
            let child = format!("{}.Child", name);
            prop_assert_eq!(hierarchy.effective_level(&child), root);
        }
    }

    /// The nearest explicit ancestor wins, regardless of registration order
    #[test]
    fn test_nearest_ancestor_wins(
        parent in logger_name(),
        level in any_severity(),
        register_child_first in any::<bool>(),
    ) {
        let child = format!("{}.Leaf", parent);
        let mut hierarchy = Hierarchy::new();
        if register_child_first {
            hierarchy.ensure(&child).unwrap();
        }
        hierarchy.set_level(&parent, LevelSetting::Level(level)).unwrap();
        if !register_child_first {
            hierarchy.ensure(&child).unwrap();
        }
        prop_assert_eq!(hierarchy.effective_level(&child), level);
        prop_assert_eq!(hierarchy.parent_of(&child), Some(parent.as_str()));
    }

    /// The next boundary is strictly later, and recomputing from any
    /// instant inside the period yields the same boundary
    #[test]
    fn test_rotation_boundary_idempotent(
        when in any_when(),
        interval in 1u32..4,
        offset_secs in 0i64..(400 * 24 * 3600),
        fraction in 0.0f64..1.0,
    ) {
        let schedule = RotationSchedule::new(when, interval).unwrap().with_utc(true);
        let from = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(offset_secs);

        let boundary = schedule.next_boundary(from);
        prop_assert!(boundary > from);

        let start = schedule.period_start(boundary);
        prop_assert!(start < boundary);

        // Starting over from the period start lands on the same boundary
        prop_assert_eq!(schedule.next_boundary(start), boundary);

        // For fixed-length units every instant in the period is at most one
        // span away from it
        if matches!(when, RotationWhen::Seconds | RotationWhen::Minutes | RotationWhen::Hours | RotationWhen::Days) {
            let span = (boundary - from).num_seconds();
            let inside = from + Duration::seconds(((span - 1) as f64 * fraction) as i64);
            prop_assert!(schedule.next_boundary(inside) >= boundary);
        }

        let suffix = schedule.archive_suffix(boundary);
        prop_assert!(schedule.matches_suffix(&suffix), "bad suffix {}", suffix);
    }
}
