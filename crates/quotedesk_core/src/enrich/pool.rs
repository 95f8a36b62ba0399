//! Bounded worker pool for best-effort batch jobs.

use log::info;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Pool could not be started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolError(String);

impl Display for PoolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to start worker pool: {}", self.0)
    }
}

impl Error for PoolError {}

/// One failed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// Position of the item in the input slice.
    pub index: usize,
    pub message: String,
}

/// Success/failure accounting for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed.len()
    }
}

/// Per-item outcomes in input order.
#[derive(Debug)]
pub struct BatchRun<R> {
    pub outcomes: Vec<Result<R, String>>,
}

impl<R> BatchRun<R> {
    pub fn report(&self) -> BatchReport {
        let mut report = BatchReport::default();
        for (index, outcome) in self.outcomes.iter().enumerate() {
            match outcome {
                Ok(_) => report.succeeded += 1,
                Err(message) => report.failed.push(BatchFailure {
                    index,
                    message: message.clone(),
                }),
            }
        }
        report
    }
}

/// Runs `job` once per item on at most `workers` threads.
///
/// No retries and no cancellation: every item ends with exactly one outcome,
/// and outcomes keep input order. `workers` below 1 is treated as 1.
pub fn run_bounded<T, R, E, F>(items: &[T], workers: usize, job: F) -> Result<BatchRun<R>, PoolError>
where
    T: Sync,
    R: Send,
    E: Display,
    F: Fn(&T) -> Result<R, E> + Sync,
{
    let workers = workers.max(1);
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|index| format!("quotedesk-worker-{index}"))
        .build()
        .map_err(|err| PoolError(err.to_string()))?;

    let outcomes: Vec<Result<R, String>> = pool.install(|| {
        items
            .par_iter()
            .map(|item| job(item).map_err(|err| err.to_string()))
            .collect()
    });

    let run = BatchRun { outcomes };
    let report = run.report();
    info!(
        "event=batch_run module=enrich status=ok workers={} total={} succeeded={} failed={}",
        workers,
        report.total(),
        report.succeeded,
        report.failed.len()
    );
    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::run_bounded;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[test]
    fn outcomes_keep_input_order_and_count_failures() {
        let items: Vec<u32> = (0..20).collect();
        let run = run_bounded(&items, 4, |value| {
            if value % 5 == 0 {
                Err(format!("item {value} rejected"))
            } else {
                Ok(value * 2)
            }
        })
        .expect("pool should start");

        assert_eq!(run.outcomes.len(), 20);
        assert_eq!(run.outcomes[1], Ok(2));
        assert_eq!(run.outcomes[19], Ok(38));

        let report = run.report();
        assert_eq!(report.succeeded, 16);
        let failed: Vec<usize> = report.failed.iter().map(|f| f.index).collect();
        assert_eq!(failed, vec![0, 5, 10, 15]);
        assert_eq!(report.failed[1].message, "item 5 rejected");
    }

    #[test]
    fn never_uses_more_threads_than_workers() {
        let items: Vec<u32> = (0..64).collect();
        let threads = Mutex::new(HashSet::new());
        run_bounded(&items, 3, |_| {
            let name = std::thread::current().name().map(str::to_string);
            threads.lock().expect("lock").insert(name);
            Ok::<_, String>(())
        })
        .expect("pool should start");
        assert!(threads.lock().expect("lock").len() <= 3);
    }

    #[test]
    fn zero_workers_still_runs() {
        let run = run_bounded(&[1, 2, 3], 0, |value| Ok::<_, String>(*value))
            .expect("pool should start");
        assert_eq!(run.report().succeeded, 3);
    }
}
