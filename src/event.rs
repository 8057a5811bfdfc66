//! Diagnostic events reported by a [`Registry`](crate::Registry).
//!
//! Every operation reports an [`Event::Call`] when it starts and one or more
//! [`Event::Outcome`]s before it returns. Observers only ever see events; they
//! cannot influence what the registry does.
use std::fmt;

use crate::registry::TableId;

/// The operation an event belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    Create,
    Delete,
    Size,
    Insert,
    Remove,
    Clear,
    Test,
}

impl Op {
    pub fn name(self) -> &'static str {
        match self {
            Op::Create => "hash_create",
            Op::Delete => "hash_delete",
            Op::Size => "hash_size",
            Op::Insert => "hash_insert",
            Op::Remove => "hash_remove",
            Op::Clear => "hash_clear",
            Op::Test => "hash_test",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The arguments an operation was called with.
#[derive(Copy, Clone, Debug)]
pub enum Args<'a> {
    /// `create` has no argument worth rendering besides the function itself.
    HashFunction,
    Table(TableId),
    /// A sequence argument as it crossed the API boundary. `seq` is `None`
    /// for a null pointer; `len` is the length the caller claimed.
    Sequence {
        id: TableId,
        seq: Option<&'a [u64]>,
        len: usize,
    },
}

/// What an operation did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome<'a> {
    Created(TableId),
    Deleted(TableId),
    TableMissing(TableId),
    Size { id: TableId, len: usize },
    Cleared(TableId),
    WasEmpty(TableId),
    InvalidPointer,
    InvalidSize,
    Inserted { id: TableId, seq: &'a [u64] },
    AlreadyPresent { id: TableId, seq: &'a [u64] },
    Removed { id: TableId, seq: &'a [u64] },
    NotPresent { id: TableId, seq: &'a [u64] },
    Present { id: TableId, seq: &'a [u64] },
    Absent { id: TableId, seq: &'a [u64] },
}

#[derive(Copy, Clone, Debug)]
pub enum Event<'a> {
    Call { op: Op, args: Args<'a> },
    Outcome { op: Op, outcome: Outcome<'a> },
}

impl<'a> Event<'a> {
    pub fn op(&self) -> Op {
        match self {
            Event::Call { op, .. } | Event::Outcome { op, .. } => *op,
        }
    }

    pub(crate) fn outcome(op: Op, outcome: Outcome<'a>) -> Self {
        Event::Outcome { op, outcome }
    }
}

/// Renders a sequence the way the trace output quotes it: `"1 2 3"`, or
/// `NULL` for a null pointer.
struct Quoted<'a>(Option<&'a [u64]>);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(seq) = self.0 else {
            return f.write_str("NULL");
        };
        f.write_str("\"")?;
        for (i, x) in seq.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{x}")?;
        }
        f.write_str("\"")
    }
}

impl fmt::Display for Args<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Args::HashFunction => Ok(()),
            Args::Table(id) => write!(f, "{id}"),
            Args::Sequence { id, seq, len } => write!(f, "{id}, {}, {len}", Quoted(*seq)),
        }
    }
}

impl fmt::Display for Outcome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn element(f: &mut fmt::Formatter<'_>, id: &TableId, seq: &[u64], what: &str) -> fmt::Result {
            write!(f, "hash table #{id}, sequence {} {what}", Quoted(Some(seq)))
        }

        match self {
            Outcome::Created(id) => write!(f, "hash table #{id} created"),
            Outcome::Deleted(id) => write!(f, "hash table #{id} deleted"),
            Outcome::TableMissing(id) => write!(f, "hash table #{id} does not exist"),
            Outcome::Size { id, len } => write!(f, "hash table #{id} contains {len} element(s)"),
            Outcome::Cleared(id) => write!(f, "hash table #{id} cleared"),
            Outcome::WasEmpty(id) => write!(f, "hash table #{id} was empty"),
            Outcome::InvalidPointer => f.write_str("invalid pointer (NULL)"),
            Outcome::InvalidSize => f.write_str("invalid size (0)"),
            Outcome::Inserted { id, seq } => element(f, id, seq, "inserted"),
            Outcome::AlreadyPresent { id, seq } => element(f, id, seq, "was present"),
            Outcome::Removed { id, seq } => element(f, id, seq, "removed"),
            Outcome::NotPresent { id, seq } => element(f, id, seq, "was not present"),
            Outcome::Present { id, seq } => element(f, id, seq, "is present"),
            Outcome::Absent { id, seq } => element(f, id, seq, "is not present"),
        }
    }
}

impl fmt::Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Call { op, args } => write!(f, "{op}({args})"),
            Event::Outcome { op, outcome } => write!(f, "{op}: {outcome}"),
        }
    }
}

/// Receives the events of a registry.
///
/// Observers take `&self` so that read-only operations such as
/// [`Registry::test`](crate::Registry::test) can report without a mutable
/// borrow; observers that accumulate state need interior mutability.
pub trait Observer: Send {
    fn observe(&self, event: &Event<'_>);
}

/// Forwards events to the `log` facade under the `seq_hash` target. Calls
/// are logged at `trace`, outcomes at `debug`.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn observe(&self, event: &Event<'_>) {
        match event {
            Event::Call { .. } => log::trace!(target: "seq_hash", "{event}"),
            Event::Outcome { .. } => log::debug!(target: "seq_hash", "{event}"),
        }
    }
}
