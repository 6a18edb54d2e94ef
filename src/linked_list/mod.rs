use std::ops::{Index, IndexMut};

use slotmap::{DefaultKey, SlotMap};

/// Stable, generational reference to an entry stored in an [`Arena`].
///
/// A handle to a removed entry never resolves again, even if its slot is
/// reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

/// Owns the entries of every chain of a table
#[derive(Debug)]
pub struct Arena<V> {
    slots: SlotMap<DefaultKey, Entry<V>>,
}

impl<V> Default for Arena<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Arena<V> {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, handle: Handle) -> Option<&Entry<V>> {
        self.slots.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Entry<V>> {
        self.slots.get_mut(handle.0)
    }

    fn alloc(&mut self, entry: Entry<V>) -> Handle {
        Handle(self.slots.insert(entry))
    }

    fn free(&mut self, handle: Handle) -> Option<Entry<V>> {
        self.slots.remove(handle.0)
    }
}

/// Panics on a stale handle, chains only ever hold live ones
impl<V> Index<Handle> for Arena<V> {
    type Output = Entry<V>;

    fn index(&self, handle: Handle) -> &Self::Output {
        &self.slots[handle.0]
    }
}

impl<V> IndexMut<Handle> for Arena<V> {
    fn index_mut(&mut self, handle: Handle) -> &mut Self::Output {
        &mut self.slots[handle.0]
    }
}

/// Singly linked chain of entries living in an [`Arena`], kept sorted by
/// ascending key.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Chain {
    head: Option<Handle>,
    len: usize,
}

impl Chain {
    pub const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn head(&self) -> Option<Handle> {
        self.head
    }

    /// Links `entry` in front of the first entry whose key is not smaller
    /// than its own, keeping the chain sorted.
    ///
    /// Hands the entry back untouched if its key is already present.
    pub(crate) fn insert_sorted<V>(
        &mut self,
        arena: &mut Arena<V>,
        mut entry: Entry<V>,
    ) -> Result<Handle, Entry<V>> {
        let (prev, next) = self.seek(arena, &entry.key);
        if next.is_some_and(|h| arena[h].key == entry.key) {
            return Err(entry);
        }

        entry.next = next;
        let handle = arena.alloc(entry);
        match prev {
            Some(p) => arena[p].next = Some(handle),
            None => self.head = Some(handle),
        }
        self.len += 1;
        Ok(handle)
    }

    /// Returns the last entry with a key smaller than `key` and the one after
    /// it, which is the first entry with a key greater or equal to `key`
    fn seek<V>(&self, arena: &Arena<V>, key: &str) -> (Option<Handle>, Option<Handle>) {
        let mut prev = None;
        let mut curr = self.head;
        while let Some(h) = curr {
            let entry = &arena[h];
            if entry.key.as_str() >= key {
                break;
            }
            prev = curr;
            curr = entry.next;
        }
        (prev, curr)
    }

    /// Sorted lookup, stops at the first key that is not smaller than `key`
    pub fn find<V>(&self, arena: &Arena<V>, key: &str) -> Option<Handle> {
        let (_, found) = self.seek(arena, key);
        found.filter(|&h| arena[h].key == key)
    }

    /// Unlinks the entry with exactly `key` and frees it from the arena.
    ///
    /// Walks the whole chain rather than relying on the ordering, the
    /// predecessor (or the head) is relinked to the removed entry's
    /// successor.
    pub fn remove<V>(&mut self, arena: &mut Arena<V>, key: &str) -> Option<Entry<V>> {
        let mut prev = None;
        let mut curr = self.head;
        while let Some(h) = curr {
            if arena[h].key == key {
                let mut removed = arena.free(h)?;
                let next = removed.next.take();
                match prev {
                    Some(p) => arena[p].next = next,
                    None => self.head = next,
                }
                self.len -= 1;
                return Some(removed);
            }
            prev = curr;
            curr = arena[h].next;
        }
        None
    }

    // [adapters]

    pub fn iter<'a, V>(&self, arena: &'a Arena<V>) -> Iter<'a, V> {
        Iter {
            arena,
            current: self.head,
            len: self.len,
        }
    }
}

/// A stored key/value pair plus its chain link.
pub struct Entry<V> {
    pub(crate) key: String,
    pub(crate) value: V,
    pub(crate) next: Option<Handle>,
}

impl<V> Entry<V> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// The entry after this one in its chain
    pub fn next(&self) -> Option<Handle> {
        self.next
    }

    pub fn into_parts(self) -> (String, V) {
        (self.key, self.value)
    }
}

impl<V: PartialEq> PartialEq for Entry<V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}
impl<V: Eq> Eq for Entry<V> {}

impl<V: std::fmt::Debug> std::fmt::Debug for Entry<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}, {:?}>", self.key, self.value)
    }
}

// [iterators]

pub struct Iter<'a, V> {
    arena: &'a Arena<V>,
    current: Option<Handle>,
    len: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a Entry<V>;
    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.arena.get(self.current?)?;
        self.current = entry.next;
        self.len -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
