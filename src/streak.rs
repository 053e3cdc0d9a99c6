use jiff::civil::DateTime;

use crate::{
    calendar::DateRange,
    pattern::RecurrencePattern,
    target::{self, TargetKind},
    timeofday::TimeWindow,
};

/// The outcome of comparing a task's expected occurrences against its
/// actual completions.
///
/// This is pure output with no identity: it is recomputed from
/// `(pattern, completions, range)` on every call and never persisted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StreakResult {
    /// Consecutive satisfied targets ending at the newest one (or carried
    /// through a newest target whose window is still open).
    pub current: u32,
    /// The longest run of consecutive satisfied targets anywhere in the
    /// window.
    pub longest: u32,
    /// The newest target's due instant, or `None` when the pattern
    /// produced no targets.
    pub next_due: Option<DateTime>,
    /// Whether `now` is past the newest target's due instant. Purely
    /// temporal; combine with `current` to decide how loudly to nag.
    pub overdue: bool,
}

impl StreakResult {
    fn zero() -> StreakResult {
        StreakResult {
            current: 0,
            longest: 0,
            next_due: None,
            overdue: false,
        }
    }
}

// A hand-rolled impl keeps `serde_derive` out of the library's dependency
// tree; this is the only type the dashboard layer serializes.
impl serde::Serialize for StreakResult {
    fn serialize<S: serde::Serializer>(
        &self,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = s.serialize_struct("StreakResult", 4)?;
        state.serialize_field("current_streak", &self.current)?;
        state.serialize_field("longest_streak", &self.longest)?;
        state.serialize_field("next_due", &self.next_due)?;
        state.serialize_field("overdue", &self.overdue)?;
        state.end()
    }
}

/// Compute the streak for one task.
///
/// Targets are generated newest-first and walked in that order. A target is
/// satisfied when a completion falls inside its allowed window (for
/// completion-anchored targets, a completion *after the anchor* inside the
/// window; for quota buckets, enough completions inside the bucket). The
/// first unsatisfied target older than the newest breaks the streak;
/// earlier runs still count toward `longest`. The newest target gets grace
/// while its window is still open, so a task isn't "broken" at breakfast
/// for something due tonight.
///
/// An `Unsupported` pattern, or one that generates no targets in `range`,
/// yields a zero result rather than an error.
pub fn compute(
    pattern: &RecurrencePattern,
    completions: &[DateTime],
    range: &DateRange,
    now: DateTime,
) -> StreakResult {
    if matches!(*pattern, RecurrencePattern::Unsupported(_)) {
        return StreakResult::zero();
    }
    let mut sorted = completions.to_vec();
    sorted.sort();
    let targets = target::generate(pattern, completions, range, now);
    if targets.is_empty() {
        return StreakResult::zero();
    }

    let mut temp = 0;
    let mut longest = 0;
    let mut current = 0;
    let mut active = true;
    for (i, t) in targets.iter().enumerate() {
        let satisfied = match t.kind {
            TargetKind::Scheduled => any_in_window(&sorted, &t.window),
            TargetKind::Anchored { anchor } => {
                any_in_window_after(&sorted, &t.window, anchor)
            }
            TargetKind::Quota { required, completed } => {
                completed >= required
            }
        };
        if satisfied {
            temp += 1;
            longest = longest.max(temp);
            if active {
                current = temp;
            }
        } else if i == 0 && now <= t.window.end {
            // The newest target's window hasn't fully elapsed: not done
            // *yet* isn't a miss. Carry the streak forward and keep
            // scanning.
            current = temp;
        } else {
            active = false;
            temp = 0;
        }
    }

    let next_due = targets[0].date;
    StreakResult {
        current,
        longest,
        next_due: Some(next_due),
        overdue: now > next_due,
    }
}

/// Whether any completion falls inside `window`. `sorted` must be
/// ascending; this is a pair of binary searches, not a scan.
fn any_in_window(sorted: &[DateTime], window: &TimeWindow) -> bool {
    let i = sorted.partition_point(|&c| c < window.start);
    i < sorted.len() && sorted[i] <= window.end
}

/// Whether any completion strictly after `anchor` falls inside `window`.
fn any_in_window_after(
    sorted: &[DateTime],
    window: &TimeWindow,
    anchor: DateTime,
) -> bool {
    // Both clauses are prefix-monotonic over an ascending slice, so their
    // disjunction is a valid partition predicate.
    let i = sorted.partition_point(|&c| c <= anchor || c < window.start);
    i < sorted.len() && sorted[i] <= window.end
}

#[cfg(test)]
mod tests {
    use jiff::civil::{Date, date};

    use super::*;

    fn range(start: Date, end: Date) -> DateRange {
        DateRange::new(start, end).unwrap()
    }

    fn run(
        text: &str,
        completions: &[DateTime],
        r: &DateRange,
        now: DateTime,
    ) -> StreakResult {
        compute(&RecurrencePattern::parse(text), completions, r, now)
    }

    #[test]
    fn daily_five_consecutive_days() {
        let r = range(date(2025, 8, 1), date(2025, 8, 7));
        let now = date(2025, 8, 7).at(12, 0, 0, 0);
        let completions: Vec<DateTime> = (3..=7)
            .map(|day| date(2025, 8, day).at(10, 0, 0, 0))
            .collect();
        let result = run("every day", &completions, &r, now);
        assert_eq!(result.current, 5);
        assert_eq!(result.longest, 5);
        assert_eq!(
            result.next_due,
            Some(date(2025, 8, 7).at(23, 59, 59, 999_999_999)),
        );
        assert!(!result.overdue);
    }

    #[test]
    fn daily_gap_resets_current() {
        // Completions on D-4, D-3, D-1 and D, with D-2 missing.
        let r = range(date(2025, 8, 1), date(2025, 8, 7));
        let now = date(2025, 8, 7).at(12, 0, 0, 0);
        let completions = vec![
            date(2025, 8, 3).at(10, 0, 0, 0),
            date(2025, 8, 4).at(10, 0, 0, 0),
            date(2025, 8, 6).at(10, 0, 0, 0),
            date(2025, 8, 7).at(10, 0, 0, 0),
        ];
        let result = run("every day", &completions, &r, now);
        assert_eq!(result.current, 2);
        assert_eq!(result.longest, 2);
    }

    #[test]
    fn longest_survives_a_newer_break() {
        // A three-day run, then two misses, then one completion.
        let r = range(date(2025, 8, 1), date(2025, 8, 7));
        let now = date(2025, 8, 7).at(12, 0, 0, 0);
        let completions = vec![
            date(2025, 8, 2).at(10, 0, 0, 0),
            date(2025, 8, 3).at(10, 0, 0, 0),
            date(2025, 8, 4).at(10, 0, 0, 0),
            date(2025, 8, 7).at(10, 0, 0, 0),
        ];
        let result = run("every day", &completions, &r, now);
        assert_eq!(result.current, 1);
        assert_eq!(result.longest, 3);
    }

    #[test]
    fn open_day_carries_the_streak_forward() {
        // Three completed days, and today's target still has an open
        // window at 9am.
        let r = range(date(2025, 8, 1), date(2025, 8, 7));
        let now = date(2025, 8, 7).at(9, 0, 0, 0);
        let completions = vec![
            date(2025, 8, 4).at(10, 0, 0, 0),
            date(2025, 8, 5).at(10, 0, 0, 0),
            date(2025, 8, 6).at(10, 0, 0, 0),
        ];
        let result = run("every day", &completions, &r, now);
        assert_eq!(result.current, 3);
        assert_eq!(result.longest, 3);
        assert!(!result.overdue);
    }

    #[test]
    fn elapsed_fixed_time_window_breaks_and_flags_overdue() {
        let r = range(date(2025, 8, 1), date(2025, 8, 7));
        let now = date(2025, 8, 7).at(10, 0, 0, 0);
        let completions = vec![
            date(2025, 8, 5).at(9, 0, 0, 0),
            date(2025, 8, 6).at(9, 10, 0, 0),
        ];
        let result = run("every day at 9am", &completions, &r, now);
        // Today's 9:00 window closed at 9:30 with no completion.
        assert_eq!(result.current, 0);
        assert_eq!(result.longest, 2);
        assert_eq!(result.next_due, Some(date(2025, 8, 7).at(9, 0, 0, 0)));
        assert!(result.overdue);
    }

    #[test]
    fn quota_open_bucket_is_not_a_break() {
        let r = range(date(2025, 8, 1), date(2025, 8, 7));
        let now = date(2025, 8, 7).at(12, 0, 0, 0);
        let completions = vec![
            date(2025, 8, 2).at(10, 0, 0, 0),
            date(2025, 8, 3).at(10, 0, 0, 0),
            date(2025, 8, 6).at(10, 0, 0, 0),
        ];
        // The current bucket (Aug 5..7) has one of two required
        // completions, but its window is still open.
        let result = run("2 times every 3 days", &completions, &r, now);
        assert_eq!(result.current, 1);
        assert_eq!(result.longest, 1);
    }

    #[test]
    fn relative_requires_completion_after_the_anchor() {
        let r = range(date(2025, 1, 1), date(2025, 6, 30));
        let now = date(2025, 1, 10).at(12, 0, 0, 0);
        // The Jan 2 completion is neither after its own target's anchor
        // nor inside the Jan 4 window, so nothing is satisfied.
        let completions = vec![
            date(2025, 1, 1).at(10, 0, 0, 0),
            date(2025, 1, 2).at(10, 0, 0, 0),
        ];
        let result = run("after 3 days", &completions, &r, now);
        assert_eq!(result.current, 0);
        assert_eq!(result.longest, 0);

        // Completing inside the window does satisfy the anchored target.
        let completions = vec![
            date(2025, 1, 1).at(10, 0, 0, 0),
            date(2025, 1, 4).at(10, 0, 0, 0),
        ];
        let result = run("after 3 days", &completions, &r, now);
        assert_eq!(result.longest, 1);
    }

    #[test]
    fn unsupported_short_circuits_to_zero() {
        let r = range(date(2025, 8, 1), date(2025, 8, 7));
        let now = date(2025, 8, 7).at(12, 0, 0, 0);
        let result = run("gibberish beyond parsing", &[], &r, now);
        assert_eq!(result, StreakResult::zero());
    }

    #[test]
    fn empty_completions_are_a_valid_zero() {
        let r = range(date(2025, 8, 1), date(2025, 8, 7));
        let now = date(2025, 8, 7).at(12, 0, 0, 0);
        let result = run("every day", &[], &r, now);
        assert_eq!(result.current, 0);
        assert_eq!(result.longest, 0);
        // Targets exist, so next-due is real even with no completions.
        assert_eq!(
            result.next_due,
            Some(date(2025, 8, 7).at(23, 59, 59, 999_999_999)),
        );
        assert!(!result.overdue);
    }

    #[test]
    fn compute_is_pure() {
        let r = range(date(2025, 8, 1), date(2025, 8, 7));
        let now = date(2025, 8, 7).at(12, 0, 0, 0);
        let completions = vec![
            date(2025, 8, 6).at(10, 0, 0, 0),
            date(2025, 8, 7).at(10, 0, 0, 0),
        ];
        let pattern = RecurrencePattern::parse("every day");
        let first = compute(&pattern, &completions, &r, now);
        let second = compute(&pattern, &completions, &r, now);
        assert_eq!(first, second);
    }

    #[test]
    fn serializes_for_the_dashboard() {
        let r = range(date(2025, 8, 1), date(2025, 8, 7));
        let now = date(2025, 8, 7).at(12, 0, 0, 0);
        let completions = vec![date(2025, 8, 7).at(10, 0, 0, 0)];
        let result = run("every day", &completions, &r, now);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["current_streak"], 1);
        assert_eq!(json["longest_streak"], 1);
        assert_eq!(json["overdue"], false);
        assert!(json["next_due"].is_string());
    }
}
