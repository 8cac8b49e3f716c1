//! Ordering benchmark: runs bulk insert, contains and remove against a fresh table for the
//! sorted, shuffled and reversed arrangements of the same input.

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::time::{Duration, Instant};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::TableError;
use crate::{ChainTable, TableConfig};

/// Seed used for the shuffled arrangement unless one is given.
pub const DEFAULT_SEED: u64 = 42;

/// Arrangement of the input handed to the table, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOrder {
    Sorted,
    Shuffled,
    Reversed,
}

impl InputOrder {
    pub const ALL: [InputOrder; 3] = [
        InputOrder::Sorted,
        InputOrder::Shuffled,
        InputOrder::Reversed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InputOrder::Sorted => "Sorted",
            InputOrder::Shuffled => "Shuffled",
            InputOrder::Reversed => "Reversed",
        }
    }
}

impl fmt::Display for InputOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for one benchmark run.
#[derive(Debug, Clone, Copy)]
pub struct BenchConfig {
    /// Table settings; `initial_capacity` is the capacity hint for every fresh table.
    pub table: TableConfig,
    pub seed: u64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            table: TableConfig::default(),
            seed: DEFAULT_SEED,
        }
    }
}

impl BenchConfig {
    pub fn with_capacity_hint(mut self, hint: usize) -> Self {
        self.table.initial_capacity = hint;
        self
    }
}

/// Timings and counters from one insert/contains/remove pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseTimings {
    /// Building the fresh table plus inserting every item.
    pub insert: Duration,
    pub contains: Duration,
    pub remove: Duration,
    /// Table size after the insert phase.
    pub stored: usize,
    pub contains_hits: usize,
    pub removed: usize,
    /// Bucket count after the insert phase.
    pub capacity: usize,
    pub resizes: usize,
}

impl PhaseTimings {
    /// Wall time of the whole pass, table construction included.
    pub fn total(&self) -> Duration {
        self.insert + self.contains + self.remove
    }
}

/// Result for one arrangement of the input.
#[derive(Debug, Clone, Copy)]
pub struct OrderingRun {
    pub order: InputOrder,
    pub timings: PhaseTimings,
}

/// Insert every item into a fresh table, look every item up, then remove every item.
pub fn run_phases<T>(items: &[T], table: TableConfig) -> Result<PhaseTimings, TableError>
where
    T: Hash + Eq + Clone,
{
    let mut timings = PhaseTimings::default();

    let start = Instant::now();
    let mut chain: ChainTable<T> = ChainTable::with_config(table)?;
    for item in items {
        chain.try_insert(item.clone())?;
    }
    timings.insert = start.elapsed();

    let stats = chain.stats();
    timings.stored = stats.len;
    timings.capacity = stats.capacity;
    timings.resizes = stats.resizes;

    let start = Instant::now();
    for item in items {
        if chain.contains(item) {
            timings.contains_hits += 1;
        }
    }
    timings.contains = start.elapsed();

    let start = Instant::now();
    for item in items {
        if chain.remove(item) {
            timings.removed += 1;
        }
    }
    timings.remove = start.elapsed();

    if timings.stored < items.len() {
        debug!(
            "{} of {} items suppressed as duplicates",
            items.len() - timings.stored,
            items.len()
        );
    }
    Ok(timings)
}

/// Arrange `items` as sorted, shuffled and reversed (by `cmp`) and time each arrangement.
///
/// `items` is reordered in place; it ends in reversed order.
pub fn run_benchmark<T, F>(
    items: &mut [T],
    mut cmp: F,
    config: &BenchConfig,
) -> Result<Vec<OrderingRun>, TableError>
where
    T: Hash + Eq + Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    config.table.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut runs = Vec::with_capacity(InputOrder::ALL.len());

    for order in InputOrder::ALL {
        arrange(items, order, &mut cmp, &mut rng);
        let timings = run_phases(items, config.table)?;
        info!(
            "{} Runtime: {} seconds ({} stored, {} buckets, {} resizes)",
            order,
            timings.total().as_secs_f64(),
            timings.stored,
            timings.capacity,
            timings.resizes
        );
        runs.push(OrderingRun { order, timings });
    }
    Ok(runs)
}

/// Put `items` into the requested arrangement.
pub fn arrange<T, F>(items: &mut [T], order: InputOrder, cmp: &mut F, rng: &mut StdRng)
where
    F: FnMut(&T, &T) -> Ordering,
{
    match order {
        InputOrder::Sorted => items.sort_by(|a, b| cmp(a, b)),
        InputOrder::Shuffled => items.shuffle(rng),
        InputOrder::Reversed => items.sort_by(|a, b| cmp(b, a)),
    }
}
