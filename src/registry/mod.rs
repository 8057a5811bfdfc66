//! The table registry: hash tables of `u64` sequences, one per identifier.
use std::{collections::hash_map::Entry, fmt};

use rustc_hash::FxHashMap;

use crate::event::{Args, Event, LogObserver, Observer, Op, Outcome};


/// Identifier of a table. Handed out in increasing order and never reused,
/// even after the table is deleted.
pub type TableId = u64;

/// The caller's hash function a table is bound to.
pub type HashFunction = Box<dyn Fn(&[u64]) -> u64 + Send>;

/// A sequence argument as it arrives at the API boundary. Only the C ABI can
/// produce a null `data`; `len` is whatever length the caller claimed.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Input<'a> {
    data: Option<&'a [u64]>,
    len: usize,
}

impl<'a> Input<'a> {
    pub(crate) fn null(len: usize) -> Self {
        Input { data: None, len }
    }

    fn args(self, id: TableId) -> Args<'a> {
        Args::Sequence {
            id,
            seq: self.data,
            len: self.len,
        }
    }
}

impl<'a> From<&'a [u64]> for Input<'a> {
    fn from(seq: &'a [u64]) -> Self {
        Input {
            data: Some(seq),
            len: seq.len(),
        }
    }
}

/// One table: separate chaining keyed by the caller's hash.
struct Table {
    hash: HashFunction,
    // Buckets are never empty; `remove` prunes them.
    buckets: FxHashMap<u64, Vec<Box<[u64]>>>,
    len: usize,
}

impl Table {
    fn new(hash: HashFunction) -> Table {
        Table {
            hash,
            buckets: Default::default(),
            len: 0,
        }
    }

    fn contains(&self, seq: &[u64]) -> bool {
        let hash = (self.hash)(seq);
        self.buckets
            .get(&hash)
            .map_or(false, |bucket| bucket.iter().any(|x| **x == *seq))
    }

    fn insert(&mut self, seq: &[u64]) -> bool {
        let hash = (self.hash)(seq);
        let bucket = self.buckets.entry(hash).or_default();
        if bucket.iter().any(|x| **x == *seq) {
            return false;
        }
        bucket.push(seq.into());
        self.len += 1;
        self.check_len();
        true
    }

    fn remove(&mut self, seq: &[u64]) -> bool {
        let hash = (self.hash)(seq);
        let Entry::Occupied(mut bucket) = self.buckets.entry(hash) else {
            return false;
        };
        let Some(index) = bucket.get().iter().position(|x| **x == *seq) else {
            return false;
        };
        bucket.get_mut().swap_remove(index);
        if bucket.get().is_empty() {
            bucket.remove();
        }
        self.len -= 1;
        self.check_len();
        true
    }

    fn clear(&mut self) {
        // Drop the allocation too, not just the contents.
        self.buckets = Default::default();
        self.len = 0;
    }

    fn check_len(&self) {
        debug_assert_eq!(
            self.buckets.values().map(Vec::len).sum::<usize>(),
            self.len
        );
        debug_assert!(self.buckets.values().all(|bucket| !bucket.is_empty()));
    }
}

/// Sends events to the observer when diagnostics are compiled in.
struct Trace {
    #[cfg_attr(not(feature = "diagnostics"), allow(dead_code))]
    observer: Box<dyn Observer>,
}

impl Trace {
    #[inline]
    fn emit(&self, event: Event<'_>) {
        #[cfg(feature = "diagnostics")]
        self.observer.observe(&event);
        #[cfg(not(feature = "diagnostics"))]
        let _ = event;
    }

    #[inline]
    fn outcome(&self, op: Op, outcome: Outcome<'_>) {
        self.emit(Event::outcome(op, outcome))
    }
}

/// A set of independent hash tables, each storing distinct `u64` sequences
/// under its own hash function.
///
/// Registries do not share anything: identifiers handed out by one registry
/// mean nothing to another. A registry is not synchronized; wrap it in a lock
/// to share it between threads.
pub struct Registry {
    next_id: TableId,
    tables: FxHashMap<TableId, Table>,
    trace: Trace,
}

impl Default for Registry {
    fn default() -> Self {
        Registry::with_observer(LogObserver)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("next_id", &self.next_id)
            .field("tables", &self.tables.len())
            .finish()
    }
}

impl Registry {
    /// An empty registry reporting to the `log` facade.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty registry reporting to `observer`.
    pub fn with_observer(observer: impl Observer + 'static) -> Self {
        Registry {
            next_id: 0,
            tables: Default::default(),
            trace: Trace {
                observer: Box::new(observer),
            },
        }
    }

    /// Create an empty table bound to `hash` and return its identifier.
    pub fn create(&mut self, hash: impl Fn(&[u64]) -> u64 + Send + 'static) -> TableId {
        self.create_boxed(Box::new(hash))
    }

    pub fn create_boxed(&mut self, hash: HashFunction) -> TableId {
        self.trace.emit(Event::Call {
            op: Op::Create,
            args: Args::HashFunction,
        });
        let id = self.next_id;
        self.next_id += 1;
        self.tables.insert(id, Table::new(hash));
        self.trace.outcome(Op::Create, Outcome::Created(id));
        id
    }

    /// Delete the table `id` along with everything in it. Unknown identifiers
    /// are ignored.
    pub fn delete(&mut self, id: TableId) {
        self.trace.emit(Event::Call {
            op: Op::Delete,
            args: Args::Table(id),
        });
        if self.tables.remove(&id).is_some() {
            self.trace.outcome(Op::Delete, Outcome::Deleted(id));
        } else {
            self.trace.outcome(Op::Delete, Outcome::TableMissing(id));
        }
    }

    /// The number of sequences in table `id`, or 0 if there is no such table.
    pub fn size(&self, id: TableId) -> usize {
        self.trace.emit(Event::Call {
            op: Op::Size,
            args: Args::Table(id),
        });
        let Some(table) = self.tables.get(&id) else {
            self.trace.outcome(Op::Size, Outcome::TableMissing(id));
            return 0;
        };
        self.trace
            .outcome(Op::Size, Outcome::Size { id, len: table.len });
        table.len
    }

    /// Insert `seq` into table `id`. Returns whether it was inserted: `false`
    /// if `seq` is empty, the table does not exist or `seq` is already there.
    pub fn insert(&mut self, id: TableId, seq: &[u64]) -> bool {
        self.insert_input(id, seq.into())
    }

    /// Remove `seq` from table `id`. Returns whether it was there to remove.
    pub fn remove(&mut self, id: TableId, seq: &[u64]) -> bool {
        self.remove_input(id, seq.into())
    }

    /// Whether table `id` contains `seq`. Invalid arguments read as absent.
    pub fn test(&self, id: TableId, seq: &[u64]) -> bool {
        self.test_input(id, seq.into())
    }

    /// Remove every sequence from table `id`. Unknown identifiers are
    /// ignored.
    pub fn clear(&mut self, id: TableId) {
        self.trace.emit(Event::Call {
            op: Op::Clear,
            args: Args::Table(id),
        });
        let Some(table) = self.tables.get_mut(&id) else {
            self.trace.outcome(Op::Clear, Outcome::TableMissing(id));
            return;
        };
        if table.len == 0 {
            self.trace.outcome(Op::Clear, Outcome::WasEmpty(id));
            return;
        }
        table.clear();
        self.trace.outcome(Op::Clear, Outcome::Cleared(id));
    }

    /// Whether `id` names a live table. Unlike [`Registry::size`], this tells
    /// an empty table apart from a missing one.
    pub fn contains_table(&self, id: TableId) -> bool {
        self.tables.contains_key(&id)
    }

    /// The number of live tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub(crate) fn insert_input(&mut self, id: TableId, input: Input<'_>) -> bool {
        self.trace.emit(Event::Call {
            op: Op::Insert,
            args: input.args(id),
        });
        let Some(seq) = self.validate(Op::Insert, input) else {
            return false;
        };
        let Some(table) = self.tables.get_mut(&id) else {
            self.trace.outcome(Op::Insert, Outcome::TableMissing(id));
            return false;
        };
        if table.insert(seq) {
            self.trace.outcome(Op::Insert, Outcome::Inserted { id, seq });
            true
        } else {
            self.trace
                .outcome(Op::Insert, Outcome::AlreadyPresent { id, seq });
            false
        }
    }

    pub(crate) fn remove_input(&mut self, id: TableId, input: Input<'_>) -> bool {
        self.trace.emit(Event::Call {
            op: Op::Remove,
            args: input.args(id),
        });
        let Some(seq) = self.validate(Op::Remove, input) else {
            return false;
        };
        let Some(table) = self.tables.get_mut(&id) else {
            self.trace.outcome(Op::Remove, Outcome::TableMissing(id));
            return false;
        };
        if table.remove(seq) {
            self.trace.outcome(Op::Remove, Outcome::Removed { id, seq });
            true
        } else {
            self.trace.outcome(Op::Remove, Outcome::NotPresent { id, seq });
            false
        }
    }

    pub(crate) fn test_input(&self, id: TableId, input: Input<'_>) -> bool {
        self.trace.emit(Event::Call {
            op: Op::Test,
            args: input.args(id),
        });
        let Some(seq) = self.validate(Op::Test, input) else {
            return false;
        };
        let Some(table) = self.tables.get(&id) else {
            self.trace.outcome(Op::Test, Outcome::TableMissing(id));
            return false;
        };
        let found = table.contains(seq);
        if found {
            self.trace.outcome(Op::Test, Outcome::Present { id, seq });
        } else {
            self.trace.outcome(Op::Test, Outcome::Absent { id, seq });
        }
        found
    }

    /// Reject null and empty sequences, reporting each problem found.
    fn validate<'a>(&self, op: Op, input: Input<'a>) -> Option<&'a [u64]> {
        if input.data.is_none() {
            self.trace.outcome(op, Outcome::InvalidPointer);
        }
        if input.len == 0 {
            self.trace.outcome(op, Outcome::InvalidSize);
            return None;
        }
        input.data
    }

    #[cfg(test)]
    pub(crate) fn bucket_count(&self, id: TableId) -> usize {
        self.tables.get(&id).map_or(0, |table| table.buckets.len())
    }
}
