//! A fixed size hash table from `str` keys to owned values.
//!
//! Collisions are resolved by separate chaining, each bucket holds a singly
//! linked chain sorted by key. The bucket count is chosen at creation and
//! never changes. The table is meant for a single owner, wrap it in a
//! `Mutex` to share it between threads.
//!
//! ```
//! use chaintable::{HashTable, TableError, Value};
//!
//! let mut table = HashTable::create(50)?;
//! table.insert("test", Value(123))?;
//! assert_eq!(table.get_value("test"), Some(&Value(123)));
//! assert!(matches!(
//!     table.insert("test", Value(789)),
//!     Err(TableError::KeyAlreadyExists { .. })
//! ));
//!
//! while let Some(entry) = table.next_entry() {
//!     println!("{}: {}", entry.key(), entry.value());
//! }
//! table.clear();
//! # Ok::<(), TableError>(())
//! ```

mod macros;

pub mod hashmap;
pub mod linked_list;

pub use hashmap::{Cursor, HashTable, Result, TableError, Value};
pub use linked_list::{Arena, Chain, Entry, Handle};
