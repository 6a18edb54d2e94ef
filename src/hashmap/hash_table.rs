use std::{collections::BTreeMap, fmt, io};

use log::{debug, trace};

use super::{Result, TableError};
use crate::{
    entry,
    linked_list::{self, Arena, Chain, Entry, Handle},
};

pub const DEFAULT_BUCKET_SIZE: usize = 50;

/// The hash is 16 bits wide, buckets past this count are unreachable
pub const MAX_BUCKET_COUNT: usize = u16::MAX as usize + 1;

/// Polynomial rolling hash over the bytes of `key`,
/// seeded with 7 and wrapping at 16 bits
pub fn hash(key: &str) -> u16 {
    key.bytes()
        .fold(7u16, |acc, b| acc.wrapping_mul(31).wrapping_add(u16::from(b)))
}

/// Position of the table's embedded iterator.
///
/// `current` is the entry returned last, `None` means the pass has not
/// started yet or was just exhausted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
    current: Option<Handle>,
}

impl Cursor {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_reset(&self) -> bool {
        *self == Self::default()
    }
}

/// Fixed size, separately chained hash table with `str` keys.
///
/// Every chain is kept sorted by key, so lookups and inserts stop as soon
/// as they walk past the place the key would be in. Entries of all chains
/// live in one arena and link to each other through handles.
pub struct HashTable<V> {
    buckets: Vec<Chain>,
    arena: Arena<V>,
    cursor: Cursor,
}

/// Copies `key` into storage owned by the table, failing instead of
/// aborting when the allocation cannot be made
fn own_key(key: &str) -> Result<String> {
    let mut owned = String::new();
    owned.try_reserve_exact(key.len())?;
    owned.push_str(key);
    Ok(owned)
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::from_buckets(vec![Chain::new(); DEFAULT_BUCKET_SIZE])
    }
}

impl<V> HashTable<V> {
    /// Creates a new `HashTable` with `bucket_count` many buckets
    ///
    /// # Errors
    ///
    /// [`TableError::InvalidArgument`] if `bucket_count` is zero or larger than
    /// [`MAX_BUCKET_COUNT`], [`TableError::AllocationFailure`] if the bucket
    /// array could not be reserved.
    pub fn create(bucket_count: usize) -> Result<Self> {
        if bucket_count == 0 {
            return Err(TableError::InvalidArgument(
                "bucket count must be at least 1".into(),
            ));
        }
        if bucket_count > MAX_BUCKET_COUNT {
            return Err(TableError::InvalidArgument(format!(
                "bucket count {bucket_count} exceeds the hash range of {MAX_BUCKET_COUNT}"
            )));
        }

        let mut buckets = Vec::new();
        buckets.try_reserve_exact(bucket_count)?;
        buckets.resize(bucket_count, Chain::new());

        debug!(target: "create", "created table with {bucket_count} buckets");
        Ok(Self::from_buckets(buckets))
    }

    fn from_buckets(buckets: Vec<Chain>) -> Self {
        Self {
            buckets,
            arena: Arena::new(),
            cursor: Cursor::default(),
        }
    }

    /// Returns the number of entries in the table
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Shorthand for `self.len() == 0`
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of buckets, or "slots" of the main array.
    /// This never changes after creation.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f32 {
        (self.len() as f32) / self.bucket_count() as f32
    }

    /// The chain stored in bucket `index`, if there is such a bucket
    pub fn bucket(&self, index: usize) -> Option<&Chain> {
        self.buckets.get(index)
    }

    /// Iterates the chain of bucket `index` in key order
    pub fn bucket_iter(&self, index: usize) -> Option<linked_list::Iter<'_, V>> {
        Some(self.buckets.get(index)?.iter(&self.arena))
    }

    /// Index of the bucket `key` belongs to
    pub fn bucket_index(&self, key: &str) -> usize {
        hash(key) as usize % self.bucket_count()
    }

    /// Inserts `key` with `value` into its bucket's chain, before the first
    /// key that sorts after it.
    ///
    /// # Errors
    ///
    /// Fails with [`TableError::KeyAlreadyExists`] if `key` is already stored,
    /// in which case the table is left untouched and `value` is dropped.
    pub fn insert(&mut self, key: &str, value: V) -> Result<()> {
        let i = self.bucket_index(key);
        let owned = own_key(key)?;

        if let Err(rejected) = self.buckets[i].insert_sorted(&mut self.arena, entry!(owned, value)) {
            trace!(target: "insert", "key {key:?} already exists in bucket {i}");
            let (key, _) = rejected.into_parts();
            return Err(TableError::KeyAlreadyExists { key });
        }

        trace!(target: "insert", "inserted {key:?} into bucket {i}");
        Ok(())
    }

    /// Returns the value stored under `key`
    pub fn get_value(&self, key: &str) -> Option<&V> {
        self.get_entry(key).map(Entry::value)
    }

    pub fn get_value_mut(&mut self, key: &str) -> Option<&mut V> {
        let handle = self.buckets[self.bucket_index(key)].find(&self.arena, key)?;
        self.arena.get_mut(handle).map(Entry::value_mut)
    }

    pub fn get_entry(&self, key: &str) -> Option<&Entry<V>> {
        let handle = self.buckets[self.bucket_index(key)].find(&self.arena, key)?;
        self.arena.get(handle)
    }

    pub fn key_exists(&self, key: &str) -> bool {
        self.get_entry(key).is_some()
    }

    /// Removes `key` from the table, handing its value back
    ///
    /// # Errors
    ///
    /// Fails with [`TableError::KeyNotFound`] if `key` is not stored.
    pub fn delete(&mut self, key: &str) -> Result<V> {
        let i = self.bucket_index(key);
        match self.buckets[i].remove(&mut self.arena, key) {
            Some(entry) => {
                trace!(target: "delete", "deleted {key:?} from bucket {i}");
                let (_, value) = entry.into_parts();
                Ok(value)
            }
            None => {
                trace!(target: "delete", "key {key:?} not found in bucket {i}");
                Err(TableError::KeyNotFound { key: key.into() })
            }
        }
    }

    /// Advances the embedded cursor and returns the entry it lands on.
    ///
    /// Entries come in ascending bucket order, and in key order within a
    /// bucket. Once every entry was returned this yields `None` and resets
    /// the cursor, so the following call starts a new pass.
    ///
    /// Inserting or deleting while a pass is in progress can make the rest of
    /// that pass skip entries. If the entry returned last was deleted, the
    /// pass continues with the next bucket. Call [`HashTable::reset_cursor`]
    /// after mutating, or use [`HashTable::iter`] which borrows the table
    /// instead.
    pub fn next_entry(&mut self) -> Option<&Entry<V>> {
        let Cursor { mut index, current } = self.cursor;

        if let Some(last) = current {
            if let Some(next) = self.arena.get(last).and_then(Entry::next) {
                self.cursor.current = Some(next);
                return self.arena.get(next);
            }
            index += 1;
        }

        while let Some(chain) = self.buckets.get(index) {
            if let Some(head) = chain.head() {
                trace!(target: "iterate", "moved to bucket {index}");
                self.cursor = Cursor {
                    index,
                    current: Some(head),
                };
                return self.arena.get(head);
            }
            index += 1;
        }

        trace!(target: "iterate", "exhausted, resetting cursor");
        self.cursor = Cursor::default();
        None
    }

    /// Puts the embedded cursor back to the start of a pass
    pub fn reset_cursor(&mut self) {
        self.cursor = Cursor::default();
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Writes one `[main index {bucket}] {key}` line per entry,
    /// in the same order [`HashTable::next_entry`] visits them
    pub fn dump<W: io::Write>(&self, sink: &mut W) -> io::Result<()> {
        for (i, chain) in self.buckets.iter().enumerate() {
            for entry in chain.iter(&self.arena) {
                writeln!(sink, "[main index {i}] {}", entry.key)?;
            }
        }
        Ok(())
    }

    /// Releases every entry and the bucket array
    pub fn clear(self) {
        let Self { buckets, arena, .. } = self;
        let (items, bucket_count) = (arena.len(), buckets.len());
        drop(arena);
        drop(buckets);
        debug!(target: "clear", "released {items} entries and {bucket_count} buckets");
    }

    // [adapters]

    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            ht: self,
            chain: self.buckets[0].iter(&self.arena),
            bucket_idx: 0,
            remaining: self.len(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for HashTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chains: BTreeMap<usize, Vec<&Entry<V>>> = self
            .buckets
            .iter()
            .enumerate()
            .filter(|(_, chain)| !chain.is_empty())
            .map(|(i, chain)| (i, chain.iter(&self.arena).collect()))
            .collect();

        f.debug_struct("HashTable")
            .field("bucket_count", &self.bucket_count())
            .field("items", &self.len())
            .field("chains", &chains)
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type Item = &'a Entry<V>;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over a [`HashTable`], independent of its cursor
pub struct Iter<'a, V> {
    ht: &'a HashTable<V>,
    chain: linked_list::Iter<'a, V>,
    bucket_idx: usize,
    remaining: usize,
}

impl<V> Iter<'_, V> {
    /// Bucket of the entry returned last
    pub fn bucket_index(&self) -> usize {
        self.bucket_idx
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a Entry<V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.chain.next() {
                self.remaining -= 1;
                return Some(entry);
            }
            if self.remaining == 0 {
                return None;
            }
            self.bucket_idx += 1;
            self.chain = self.ht.bucket_iter(self.bucket_idx)?;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
