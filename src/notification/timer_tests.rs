//! Tests for timer

use super::*;
use proptest::prelude::*;

fn id(raw: u64) -> NotificationId {
    NotificationId::from_raw(raw)
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[test]
fn test_manual_clock_starts_at_zero() {
    let clock = ManualClock::new();
    assert_eq!(clock.now(), Duration::ZERO);
}

#[test]
fn test_manual_clock_clones_share_time() {
    let clock = ManualClock::new();
    let other = clock.clone();
    clock.advance(ms(250));
    assert_eq!(other.now(), ms(250));
    other.set(ms(1000));
    assert_eq!(clock.now(), ms(1000));
}

#[test]
fn test_manual_clock_keeps_sub_millisecond_advances() {
    let clock = ManualClock::new();
    clock.advance(Duration::from_micros(600));
    clock.advance(Duration::from_micros(600));
    assert_eq!(clock.now(), Duration::from_micros(1200));
}

#[test]
fn test_manual_clock_saturates_instead_of_wrapping() {
    let clock = ManualClock::new();
    clock.set(Duration::MAX);
    assert_eq!(clock.now(), Duration::from_nanos(u64::MAX));

    clock.advance(ms(1));
    assert_eq!(clock.now(), Duration::from_nanos(u64::MAX));

    let other = ManualClock::new();
    other.set(Duration::from_nanos(u64::MAX - 5));
    other.advance(Duration::from_secs(1));
    assert_eq!(other.now(), Duration::from_nanos(u64::MAX));
}

#[test]
fn test_system_clock_is_monotonic() {
    let clock = SystemClock::new();
    let first = clock.now();
    let second = clock.now();
    assert!(second >= first);
}

#[test]
fn test_nothing_due_before_deadline() {
    let mut timers = TimerTable::new();
    timers.schedule(id(1), ms(1000));
    assert_eq!(timers.pop_due(ms(999)), None);
    assert!(timers.contains(id(1)));
}

#[test]
fn test_due_at_exact_deadline() {
    let mut timers = TimerTable::new();
    timers.schedule(id(1), ms(1000));
    assert_eq!(timers.pop_due(ms(1000)), Some(id(1)));
    assert!(timers.is_empty());
    assert_eq!(timers.pop_due(ms(5000)), None);
}

#[test]
fn test_fires_in_deadline_order() {
    let mut timers = TimerTable::new();
    timers.schedule(id(1), ms(300));
    timers.schedule(id(2), ms(100));
    timers.schedule(id(3), ms(200));

    let fired: Vec<_> = std::iter::from_fn(|| timers.pop_due(ms(1000))).collect();
    assert_eq!(fired, vec![id(2), id(3), id(1)]);
}

#[test]
fn test_equal_deadlines_fire_in_schedule_order() {
    let mut timers = TimerTable::new();
    timers.schedule(id(5), ms(100));
    timers.schedule(id(3), ms(100));
    timers.schedule(id(4), ms(100));

    let fired: Vec<_> = std::iter::from_fn(|| timers.pop_due(ms(100))).collect();
    assert_eq!(fired, vec![id(5), id(3), id(4)]);
}

#[test]
fn test_cancelled_timer_never_fires() {
    let mut timers = TimerTable::new();
    timers.schedule(id(1), ms(100));
    timers.schedule(id(2), ms(200));

    assert!(timers.cancel(id(1)).is_some());
    assert_eq!(timers.pop_due(ms(1000)), Some(id(2)));
    assert_eq!(timers.pop_due(ms(1000)), None);
}

#[test]
fn test_cancel_unknown_is_none() {
    let mut timers = TimerTable::new();
    assert!(timers.cancel(id(9)).is_none());
}

#[test]
fn test_reschedule_replaces_existing_timer() {
    let mut timers = TimerTable::new();
    timers.schedule(id(1), ms(100));
    timers.schedule(id(1), ms(500));

    assert_eq!(timers.len(), 1);
    assert_eq!(timers.next_deadline(), Some(ms(500)));
    assert_eq!(timers.pop_due(ms(100)), None);
}

#[test]
fn test_clear_cancels_everything() {
    let mut timers = TimerTable::new();
    timers.schedule(id(1), ms(100));
    timers.schedule(id(2), ms(200));

    assert_eq!(timers.clear(), 2);
    assert!(timers.is_empty());
    assert_eq!(timers.next_deadline(), None);
    assert_eq!(timers.pop_due(ms(10_000)), None);
}

// Whatever gets cancelled, the remaining timers fire exactly once each, in deadline order
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_pop_due_order_and_cancellation(
        deadlines in prop::collection::vec(0u64..10_000, 1..40),
        cancel_mask in prop::collection::vec(any::<bool>(), 40)
    ) {
        let mut timers = TimerTable::new();
        for (i, deadline) in deadlines.iter().enumerate() {
            timers.schedule(id(i as u64), ms(*deadline));
        }

        let mut expected: Vec<(u64, u64)> = Vec::new();
        for (i, deadline) in deadlines.iter().enumerate() {
            if cancel_mask[i] {
                prop_assert!(timers.cancel(id(i as u64)).is_some());
            } else {
                expected.push((*deadline, i as u64));
            }
        }
        expected.sort();

        let fired: Vec<_> = std::iter::from_fn(|| timers.pop_due(ms(10_000))).collect();
        let expected_ids: Vec<_> = expected.into_iter().map(|(_, i)| id(i)).collect();
        prop_assert_eq!(fired, expected_ids);
        prop_assert!(timers.is_empty());
    }
}
