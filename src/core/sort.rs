//! Purpose: Sort a batch of independent integer arrays, sequentially or one thread per array.
//! Exports: `SortMode`, `SortOutcome`, `sort_single`, `sort_concurrent`, `sort_batch`.
//! Role: The whole compute surface behind both HTTP endpoints and `compare`.
//! Invariants: Inputs are borrowed and never mutated; every output row is a sorted copy.
//! Invariants: Output row `i` always corresponds to input row `i`.
//! Invariants: Elapsed time covers the sort phase only.

use std::thread;
use std::time::{Duration, Instant};

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortMode {
    Single,
    Concurrent,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Single => "single",
            SortMode::Concurrent => "concurrent",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SortOutcome {
    pub sorted: Vec<Vec<i64>>,
    pub elapsed: Duration,
}

impl SortOutcome {
    /// Elapsed time in whole nanoseconds, saturating at `u64::MAX`.
    pub fn time_ns(&self) -> u64 {
        u64::try_from(self.elapsed.as_nanos()).unwrap_or(u64::MAX)
    }
}

pub fn sort_batch(mode: SortMode, batch: &[Vec<i64>]) -> Result<SortOutcome, Error> {
    match mode {
        SortMode::Single => Ok(sort_single(batch)),
        SortMode::Concurrent => sort_concurrent(batch),
    }
}

pub fn sort_single(batch: &[Vec<i64>]) -> SortOutcome {
    let start = Instant::now();
    let sorted = batch.iter().map(|row| sorted_copy(row)).collect();
    SortOutcome {
        sorted,
        elapsed: start.elapsed(),
    }
}

/// Sorts every row on its own scoped thread.
///
/// Each thread owns exactly one pre-sized output slot, so no locking is
/// needed; the call returns once every thread has been joined. A refused
/// spawn or a panicking worker fails the whole batch with `Internal`.
pub fn sort_concurrent(batch: &[Vec<i64>]) -> Result<SortOutcome, Error> {
    let start = Instant::now();
    let mut sorted = vec![Vec::new(); batch.len()];
    let slots = sorted.iter_mut().zip(batch);

    thread::scope(|scope| -> Result<(), Error> {
        let mut workers = Vec::with_capacity(batch.len());
        for (slot, row) in slots {
            let worker = thread::Builder::new()
                .spawn_scoped(scope, move || *slot = sorted_copy(row))
                .map_err(|err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to spawn sort worker")
                        .with_source(err)
                })?;
            workers.push(worker);
        }
        for worker in workers {
            worker.join().map_err(|_| {
                Error::new(ErrorKind::Internal).with_message("sort worker panicked")
            })?;
        }
        Ok(())
    })?;

    Ok(SortOutcome {
        sorted,
        elapsed: start.elapsed(),
    })
}

fn sorted_copy(row: &[i64]) -> Vec<i64> {
    let mut out = row.to_vec();
    out.sort_unstable();
    out
}
