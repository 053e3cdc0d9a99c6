use std::num::NonZero;

use jiff::civil::date;

use streakline::{StreakResult, batch, compute_streak};

use crate::{NOW, default_range, done_on, range};

#[test]
fn identical_inputs_yield_identical_output() {
    let r = default_range();
    let completions =
        vec![done_on(2025, 8, 5), done_on(2025, 8, 6), done_on(2025, 8, 7)];
    let first = compute_streak("every day", &completions, &r, *NOW);
    let second = compute_streak("every day", &completions, &r, *NOW);
    assert_eq!(first, second);
}

#[test]
fn daily_five_consecutive_days() {
    let r = default_range();
    let completions: Vec<_> =
        (3..=7).map(|day| done_on(2025, 8, day)).collect();
    let result = compute_streak("every day", &completions, &r, *NOW);
    assert_eq!(result.current, 5);
    assert_eq!(result.longest, 5);
    assert_eq!(
        result.next_due,
        Some(date(2025, 8, 7).at(23, 59, 59, 999_999_999)),
    );
    assert!(!result.overdue);
}

#[test]
fn daily_gap_leaves_a_two_day_streak() {
    let r = default_range();
    let completions = vec![
        done_on(2025, 8, 3),
        done_on(2025, 8, 4),
        done_on(2025, 8, 6),
        done_on(2025, 8, 7),
    ];
    let result = compute_streak("every day", &completions, &r, *NOW);
    assert_eq!(result.current, 2);
    assert_eq!(result.longest, 2);
}

/// "every 31st" across January through April: February's target clamps to
/// the 28th instead of being skipped, so completing on the 28th keeps the
/// streak alive.
#[test]
fn monthly_day_clamps_instead_of_skipping() {
    let r = range(date(2025, 1, 1), date(2025, 4, 30));
    let now = date(2025, 4, 30).at(12, 0, 0, 0);
    let completions = vec![
        done_on(2025, 1, 31),
        done_on(2025, 2, 28),
        done_on(2025, 3, 31),
        done_on(2025, 4, 30),
    ];
    let result = compute_streak("every 31st", &completions, &r, now);
    assert_eq!(result.current, 4);
    assert_eq!(result.longest, 4);
}

#[test]
fn quota_buckets_need_enough_completions() {
    let r = range(date(2025, 8, 1), date(2025, 8, 7));
    let now = date(2025, 8, 7).at(21, 0, 0, 0);
    // Two completions in each whole bucket.
    let completions = vec![
        done_on(2025, 8, 2),
        done_on(2025, 8, 3),
        done_on(2025, 8, 6),
        done_on(2025, 8, 7),
    ];
    let result =
        compute_streak("2 times every 3 days", &completions, &r, now);
    assert_eq!(result.current, 2);

    // One completion per bucket falls short.
    let completions = vec![done_on(2025, 8, 3), done_on(2025, 8, 6)];
    let result =
        compute_streak("2 times every 3 days", &completions, &r, now);
    // The newest bucket is still open, so it carries rather than breaks;
    // the older bucket is simply unsatisfied.
    assert_eq!(result.current, 0);
    assert_eq!(result.longest, 0);
}

#[test]
fn christmas_lands_on_december_25_regardless_of_weekday() {
    // Dec 25 2024 was a Wednesday, Dec 25 2025 a Thursday.
    let r = range(date(2024, 12, 25), date(2025, 12, 25));
    let now = date(2025, 12, 25).at(12, 0, 0, 0);
    let completions = vec![done_on(2024, 12, 25)];
    let result =
        compute_streak("every christmas day", &completions, &r, now);
    // This year's target is still open today, so last year's completion
    // carries the streak.
    assert_eq!(result.current, 1);
    assert_eq!(
        result.next_due,
        Some(date(2025, 12, 25).at(23, 59, 59, 999_999_999)),
    );
    assert!(!result.overdue);
}

/// "after 3 days" anchors to the last real completion: a completion that
/// precedes the target window (and is not after the anchor) satisfies
/// nothing.
#[test]
fn relative_targets_are_anchored_to_completions() {
    let r = range(date(2025, 1, 1), date(2025, 6, 30));
    let completions = vec![done_on(2025, 1, 1), done_on(2025, 1, 2)];
    let result = compute_streak("after 3 days", &completions, &r, *NOW);
    assert_eq!(result.current, 0);
    assert_eq!(result.longest, 0);

    // Completing inside the anchored window does count.
    let completions = vec![done_on(2025, 1, 1), done_on(2025, 1, 4)];
    let result = compute_streak("after 3 days", &completions, &r, *NOW);
    assert_eq!(result.longest, 1);
}

#[test]
fn gibberish_yields_a_zero_result_not_a_crash() {
    let r = default_range();
    let completions = vec![done_on(2025, 8, 7)];
    let result = compute_streak(
        "every time the neighbor's dog barks",
        &completions,
        &r,
        *NOW,
    );
    assert_eq!(
        result,
        StreakResult {
            current: 0,
            longest: 0,
            next_due: None,
            overdue: false,
        },
    );
}

#[test]
fn batch_matches_sequential_and_preserves_order() {
    let r = default_range();
    let jobs = vec![
        batch::Job::new(
            "every day",
            vec![done_on(2025, 8, 6), done_on(2025, 8, 7)],
        ),
        batch::Job::new("nonsense", vec![done_on(2025, 8, 7)]),
        batch::Job::new("every monday", vec![done_on(2025, 8, 4)]),
        batch::Job::new("2 times every 3 days", vec![]),
    ];
    let sequential = batch::compute_all(
        jobs.clone(),
        &r,
        *NOW,
        NonZero::new(1).unwrap(),
    );
    let parallel =
        batch::compute_all(jobs, &r, *NOW, NonZero::new(4).unwrap());
    assert_eq!(sequential, parallel);
    assert_eq!(parallel[0].current, 2);
    assert_eq!(parallel[1].next_due, None);
    assert_eq!(parallel[2].current, 1);
}

#[test]
fn results_serialize_for_the_dashboard() {
    let r = default_range();
    let completions = vec![done_on(2025, 8, 7)];
    let result = compute_streak("every day", &completions, &r, *NOW);
    let json = serde_json::to_string(&result).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["current_streak"], 1);
    assert_eq!(value["overdue"], false);
}
