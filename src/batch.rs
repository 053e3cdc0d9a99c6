use std::{num::NonZero, thread};

use jiff::civil::DateTime;

use crate::{
    calendar::DateRange,
    pattern::RecurrencePattern,
    streak::{self, StreakResult},
};

/// One task's worth of streak input: its parsed pattern and its completion
/// timestamps.
#[derive(Clone, Debug)]
pub struct Job {
    pub pattern: RecurrencePattern,
    pub completions: Vec<DateTime>,
}

impl Job {
    /// Build a job straight from a task's recurrence text.
    pub fn new(text: &str, completions: Vec<DateTime>) -> Job {
        Job { pattern: RecurrencePattern::parse(text), completions }
    }
}

/// Compute streaks for many independent tasks on a fixed pool of workers.
///
/// Each job is a pure function of its own inputs, so there is no locking
/// and no cross-task state; the only coordination is handing jobs out and
/// collecting results. Results come back in the same order as the input
/// jobs, regardless of which worker finished first.
///
/// When `threads == 1` (or there's at most one job), everything runs
/// inline on the calling thread with no channels and no synchronization
/// overhead.
pub fn compute_all(
    jobs: Vec<Job>,
    range: &DateRange,
    now: DateTime,
    threads: NonZero<usize>,
) -> Vec<StreakResult> {
    if threads.get() == 1 || jobs.len() <= 1 {
        return jobs
            .into_iter()
            .map(|job| {
                streak::compute(&job.pattern, &job.completions, range, now)
            })
            .collect();
    }

    let len = jobs.len();
    // Unlike a streaming pipeline, the full job list is already in memory,
    // so the input channel can simply be preloaded and closed; workers
    // drain it until empty.
    let (input_tx, input_rx) = flume::unbounded::<(usize, Job)>();
    for pair in jobs.into_iter().enumerate() {
        // OK because the receiver is alive until the scope below ends.
        input_tx.send(pair).unwrap();
    }
    drop(input_tx);

    let (output_tx, output_rx) = flume::unbounded::<(usize, StreakResult)>();
    thread::scope(|scope| {
        for _ in 0..threads.get().min(len) {
            let input_rx = input_rx.clone();
            let output_tx = output_tx.clone();
            scope.spawn(move || {
                for (index, job) in input_rx {
                    let result = streak::compute(
                        &job.pattern,
                        &job.completions,
                        range,
                        now,
                    );
                    if output_tx.send((index, result)).is_err() {
                        return;
                    }
                }
            });
        }
        drop(output_tx);

        // Indices put results back in input order; no reordering heap is
        // needed since everything is collected before returning.
        let mut results: Vec<Option<StreakResult>> = vec![None; len];
        for (index, result) in output_rx {
            results[index] = Some(result);
        }
        // OK because every index is sent exactly once and the workers
        // drained the whole input channel. (A worker panic propagates out
        // of the scope before we get here.)
        results.into_iter().map(|result| result.unwrap()).collect()
    })
}
