//! ChainTable: a separate-chaining hash table with load-factor driven growth and full rehashing.
//! Set semantics: an element equal to one already stored is never stored twice.
//!
//! The crate also carries the pieces of the ordering benchmark that drives the table:
//! record ingestion ([`record`]), the timed harness ([`harness`]) and its CSV sink ([`report`]).

use std::alloc::Layout;
use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::iter::FusedIterator;

use ahash::RandomState;
use log::{debug, trace};

pub mod error;
pub mod harness;
pub mod logger;
pub mod record;
pub mod report;

pub use error::TableError;

// ================================================================================================
// CONSTANTS
// ================================================================================================

/// Bucket count used when no capacity hint is given
pub const DEFAULT_CAPACITY: usize = 101;

/// Load factor threshold above which the bucket array grows
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Smallest bucket array the table will ever hold
const MIN_CAPACITY: usize = 2;

// ================================================================================================
// CONFIGURATION
// ================================================================================================

/// How the bucket count is chosen and grown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrowthPolicy {
    /// Prime bucket counts; grows to the first prime at or above double the current count.
    /// Bucket index is `hash % capacity`.
    #[default]
    Prime,
    /// Power-of-two bucket counts; grows by doubling. Bucket index is `hash & (capacity - 1)`.
    PowerOfTwo,
}

impl GrowthPolicy {
    /// Bucket count for a freshly built table given a capacity hint.
    pub fn initial_capacity(self, hint: usize) -> usize {
        let hint = hint.max(MIN_CAPACITY);
        match self {
            GrowthPolicy::Prime => next_prime(hint),
            GrowthPolicy::PowerOfTwo => hint.checked_next_power_of_two().unwrap_or(hint),
        }
    }

    /// The bucket count that follows `current`. Returns `current` only when no larger
    /// count is representable.
    pub fn next_capacity(self, current: usize) -> usize {
        let doubled = current.saturating_mul(2);
        match self {
            GrowthPolicy::Prime => next_prime(doubled),
            GrowthPolicy::PowerOfTwo => doubled,
        }
    }

    #[inline(always)]
    fn index(self, hash: u64, capacity: usize) -> usize {
        match self {
            GrowthPolicy::Prime => (hash % capacity as u64) as usize,
            GrowthPolicy::PowerOfTwo => (hash as usize) & (capacity - 1),
        }
    }
}

/// Construction-time settings for a [`ChainTable`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    /// Expected element count; the initial bucket count is derived from it.
    pub initial_capacity: usize,
    /// Grow once `len / capacity` exceeds this ratio.
    pub load_factor: f64,
    pub growth: GrowthPolicy,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
            growth: GrowthPolicy::Prime,
        }
    }
}

impl TableConfig {
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn with_growth(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }

    /// Reject settings the table cannot operate with.
    pub fn validate(&self) -> Result<(), TableError> {
        if !self.load_factor.is_finite() || self.load_factor <= 0.0 {
            return Err(TableError::InvalidLoadFactor(self.load_factor));
        }
        Ok(())
    }
}

/// Diagnostic snapshot of a table's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableStats {
    pub len: usize,
    pub capacity: usize,
    /// Number of times the bucket array has been rebuilt.
    pub resizes: usize,
    pub longest_chain: usize,
    pub empty_buckets: usize,
}

// ================================================================================================
// MAIN TABLE STRUCTURE
// ================================================================================================

/// Separate-chaining hash table storing distinct elements of `T`.
///
/// `T: Hash + Eq` is the only capability the table relies on; equal elements must hash
/// identically. Element `x` always lives in the bucket `index(hash(x), capacity)` of the
/// current bucket array.
pub struct ChainTable<T, S = RandomState> {
    buckets: Vec<Vec<T>>,
    len: usize,
    config: TableConfig,
    resizes: usize,
    hasher: S,
}

/// Allocation failure while preparing a bucket array; nothing has been moved yet.
#[derive(Debug, Clone, Copy)]
struct AllocFailed {
    capacity: usize,
}

impl From<AllocFailed> for TableError {
    fn from(err: AllocFailed) -> Self {
        TableError::AllocationFailed {
            capacity: err.capacity,
        }
    }
}

// ================================================================================================
// CONSTRUCTORS
// ================================================================================================

impl<T: Hash + Eq> ChainTable<T, RandomState> {
    /// Create a table with [`DEFAULT_CAPACITY`] buckets.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a table sized for the expected number of elements.
    ///
    /// The hint becomes the initial bucket count (rounded up to the growth policy's base).
    /// The table grows beyond it as elements are inserted.
    pub fn with_capacity(size_hint: usize) -> Self {
        Self::with_capacity_and_hasher(size_hint, RandomState::new())
    }

    /// Create a table from a validated configuration.
    pub fn with_config(config: TableConfig) -> Result<Self, TableError> {
        Self::with_config_and_hasher(config, RandomState::new())
    }
}

impl<T: Hash + Eq, S: BuildHasher> ChainTable<T, S> {
    /// Create a table using the provided hasher.
    ///
    /// Changing the hasher of an existing table is not supported because it would invalidate
    /// bucket placement.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }

    /// Create a table with the given capacity hint and hasher.
    pub fn with_capacity_and_hasher(size_hint: usize, hasher: S) -> Self {
        let config = TableConfig::default().with_initial_capacity(size_hint);
        match Self::build(config, hasher) {
            Ok(table) => table,
            Err(err) => allocation_failure::<T>(err.capacity),
        }
    }

    /// Create a table from a configuration and hasher.
    ///
    /// Rejects an invalid load factor, and returns [`TableError::AllocationFailed`] when the
    /// initial bucket array cannot be allocated.
    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Result<Self, TableError> {
        config.validate()?;
        Ok(Self::build(config, hasher)?)
    }

    fn build(config: TableConfig, hasher: S) -> Result<Self, AllocFailed> {
        let capacity = config.growth.initial_capacity(config.initial_capacity);
        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(capacity)
            .map_err(|_| AllocFailed { capacity })?;
        buckets.resize_with(capacity, Vec::new);
        Ok(Self {
            buckets,
            len: 0,
            config,
            resizes: 0,
            hasher,
        })
    }

    // ============================================================================================
    // PUBLIC API METHODS
    // ============================================================================================

    /// Inserts `value` unless an equal element is already stored.
    ///
    /// Returns `true` if the value was stored and `false` if it was a duplicate. May grow and
    /// rehash the whole table. Running out of memory while growing is fatal; use
    /// [`ChainTable::try_insert`] to observe it instead.
    pub fn insert(&mut self, value: T) -> bool {
        match self.insert_inner(value) {
            Ok(inserted) => inserted,
            Err(err) => allocation_failure::<T>(err.capacity),
        }
    }

    /// Fallible form of [`ChainTable::insert`].
    ///
    /// On `Err` the table is exactly as it was before the call: the value is dropped, the old
    /// bucket array and every stored element are untouched.
    pub fn try_insert(&mut self, value: T) -> Result<bool, TableError> {
        self.insert_inner(value).map_err(TableError::from)
    }

    /// Returns `true` if an element equal to `value` is stored.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(value).is_some()
    }

    /// Returns a reference to the stored element equal to `value`, if any.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.bucket_index(self.hasher.hash_one(value));
        self.buckets[idx]
            .iter()
            .find(|stored| <T as Borrow<Q>>::borrow(stored) == value)
    }

    /// Removes the element equal to `value`. Returns `false` if there was none.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.take(value).is_some()
    }

    /// Removes and returns the element equal to `value`.
    ///
    /// The capacity is never reduced. Chain order after a removal is unspecified.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.bucket_index(self.hasher.hash_one(value));
        let chain = &mut self.buckets[idx];
        let pos = chain
            .iter()
            .position(|stored| <T as Borrow<Q>>::borrow(stored) == value)?;
        let removed = chain.swap_remove(pos);
        self.len -= 1;
        Some(removed)
    }

    /// Returns the number of stored elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the table stores no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the current number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// The configured growth threshold.
    pub fn load_factor(&self) -> f64 {
        self.config.load_factor
    }

    /// Current `len / capacity` ratio.
    pub fn current_load(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Removes every element. The bucket array keeps its size.
    pub fn clear(&mut self) {
        for chain in &mut self.buckets {
            chain.clear();
        }
        self.len = 0;
    }

    /// Iterates over all elements, bucket by bucket.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.buckets.iter().flatten(),
            remaining: self.len,
        }
    }

    /// Returns a snapshot of the table's shape.
    pub fn stats(&self) -> TableStats {
        let mut longest_chain = 0;
        let mut empty_buckets = 0;
        for chain in &self.buckets {
            longest_chain = longest_chain.max(chain.len());
            if chain.is_empty() {
                empty_buckets += 1;
            }
        }
        TableStats {
            len: self.len,
            capacity: self.buckets.len(),
            resizes: self.resizes,
            longest_chain,
            empty_buckets,
        }
    }

    // ============================================================================================
    // PRIVATE HELPER METHODS
    // ============================================================================================

    #[inline(always)]
    fn bucket_index(&self, hash: u64) -> usize {
        self.config.growth.index(hash, self.buckets.len())
    }

    fn insert_inner(&mut self, value: T) -> Result<bool, AllocFailed> {
        let hash = self.hasher.hash_one(&value);
        let idx = self.bucket_index(hash);
        if self.buckets[idx].iter().any(|stored| *stored == value) {
            return Ok(false);
        }

        let target = self.capacity_for(self.len + 1);
        if target > self.buckets.len() {
            // The new chains are sized to hold `value` too, so the push below cannot allocate.
            self.rehash(target, hash)?;
        } else {
            let capacity = self.buckets.len();
            self.buckets[idx]
                .try_reserve(1)
                .map_err(|_| AllocFailed { capacity })?;
        }

        let idx = self.bucket_index(hash);
        self.buckets[idx].push(value);
        self.len += 1;
        Ok(true)
    }

    /// Smallest capacity reachable by the growth policy that keeps `len` within the threshold.
    fn capacity_for(&self, len: usize) -> usize {
        let mut capacity = self.buckets.len();
        while len as f64 / capacity as f64 > self.config.load_factor {
            let next = self.config.growth.next_capacity(capacity);
            if next <= capacity {
                break;
            }
            capacity = next;
        }
        capacity
    }

    /// Rebuild the bucket array at `new_capacity`, reserving one extra slot for `pending_hash`.
    ///
    /// Every allocation happens before the first element moves; an error leaves `self`
    /// untouched.
    fn rehash(&mut self, new_capacity: usize, pending_hash: u64) -> Result<(), AllocFailed> {
        let failed = AllocFailed {
            capacity: new_capacity,
        };
        let growth = self.config.growth;

        let mut counts: Vec<usize> = Vec::new();
        counts.try_reserve_exact(new_capacity).map_err(|_| failed)?;
        counts.resize(new_capacity, 0);

        let mut slots: Vec<usize> = Vec::new();
        slots.try_reserve_exact(self.len).map_err(|_| failed)?;
        for value in self.buckets.iter().flatten() {
            let idx = growth.index(self.hasher.hash_one(value), new_capacity);
            counts[idx] += 1;
            slots.push(idx);
        }
        counts[growth.index(pending_hash, new_capacity)] += 1;

        let mut buckets: Vec<Vec<T>> = Vec::new();
        buckets.try_reserve_exact(new_capacity).map_err(|_| failed)?;
        for &count in &counts {
            let mut chain = Vec::new();
            chain.try_reserve_exact(count).map_err(|_| failed)?;
            buckets.push(chain);
        }

        let old_capacity = self.buckets.len();
        let old = std::mem::replace(&mut self.buckets, buckets);
        for (value, idx) in old.into_iter().flatten().zip(slots) {
            self.buckets[idx].push(value);
        }
        self.resizes += 1;

        debug!(
            "rehashed {} elements: {} -> {} buckets",
            self.len, old_capacity, new_capacity
        );
        Ok(())
    }
}

// ================================================================================================
// ITERATOR
// ================================================================================================

/// Borrowing iterator over the elements of a [`ChainTable`].
pub struct Iter<'a, T> {
    inner: std::iter::Flatten<std::slice::Iter<'a, Vec<T>>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

// ================================================================================================
// STANDARD TRAIT IMPLEMENTATIONS
// ================================================================================================

impl<T: Hash + Eq, S: BuildHasher + Default> Default for ChainTable<T, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<'a, T: Hash + Eq, S: BuildHasher> IntoIterator for &'a ChainTable<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Hash + Eq, S: BuildHasher + Default> FromIterator<T> for ChainTable<T, S> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let hint = iter.size_hint().0.max(DEFAULT_CAPACITY);
        let mut table = ChainTable::with_capacity_and_hasher(hint, S::default());
        table.extend(iter);
        table
    }
}

impl<T: Hash + Eq, S: BuildHasher> Extend<T> for ChainTable<T, S> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: fmt::Debug, S> fmt::Debug for ChainTable<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.buckets.iter().flatten()).finish()
    }
}

// ================================================================================================
// UTILITY FUNCTIONS
// ================================================================================================

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3usize;
    while d <= n / d {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// Smallest prime >= n, or `n` itself if the search would overflow.
fn next_prime(n: usize) -> usize {
    let mut candidate = n.max(2);
    while !is_prime(candidate) {
        match candidate.checked_add(1) {
            Some(next) => candidate = next,
            None => return n,
        }
    }
    candidate
}

#[cold]
fn allocation_failure<T>(capacity: usize) -> ! {
    trace!("bucket array allocation failed at {} buckets", capacity);
    match Layout::array::<Vec<T>>(capacity) {
        Ok(layout) => std::alloc::handle_alloc_error(layout),
        Err(_) => panic!("bucket array capacity overflow: {} buckets", capacity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primes_are_found() {
        assert_eq!(next_prime(0), 2);
        assert_eq!(next_prime(2), 2);
        assert_eq!(next_prime(16), 17);
        assert_eq!(next_prime(24), 29);
        assert_eq!(next_prime(101), 101);
        assert_eq!(next_prime(202), 211);
        assert!(!is_prime(1));
        assert!(!is_prime(49));
        assert!(is_prime(7919));
    }

    #[test]
    fn growth_policies_pick_their_base() {
        assert_eq!(GrowthPolicy::Prime.initial_capacity(0), 2);
        assert_eq!(GrowthPolicy::Prime.initial_capacity(16), 17);
        assert_eq!(GrowthPolicy::Prime.next_capacity(17), 37);
        assert_eq!(GrowthPolicy::PowerOfTwo.initial_capacity(0), 2);
        assert_eq!(GrowthPolicy::PowerOfTwo.initial_capacity(100), 128);
        assert_eq!(GrowthPolicy::PowerOfTwo.next_capacity(128), 256);
    }

    #[test]
    fn power_of_two_index_masks_hash() {
        assert_eq!(GrowthPolicy::PowerOfTwo.index(0xFFFF_FFFF, 16), 15);
        assert_eq!(GrowthPolicy::Prime.index(40, 17), 6);
    }

    #[test]
    fn capacity_for_steps_until_within_threshold() {
        let config = TableConfig::default()
            .with_initial_capacity(2)
            .with_load_factor(0.01);
        let table: ChainTable<u32> = ChainTable::with_config(config).unwrap();
        assert_eq!(table.capacity(), 2);
        // 1 / 2 = 0.5 > 0.01, must climb until 1 / cap <= 0.01
        assert!(table.capacity_for(1) >= 100);
    }

    #[test]
    fn rehash_reserves_room_for_pending_value() {
        let mut table: ChainTable<u32> = ChainTable::with_capacity(2);
        for i in 0..10 {
            table.insert(i);
        }
        for chain in &table.buckets {
            assert!(chain.capacity() >= chain.len());
        }
        assert!(table.stats().resizes >= 1);
    }
}
