//! A registry of independent hash tables holding sequences of `u64`.
//!
//! Each table is bound to a hash function supplied by the caller when the
//! table is created. Sequences are stored by value: the caller's hash only
//! picks a bucket, and membership inside a bucket is decided by element-wise
//! comparison. A poor hash function (even a constant one) therefore costs
//! performance but never correctness.
//!
//! # Errors
//! Every fallible operation reports a plain `bool`. Passing an empty
//! sequence, naming a table that does not exist, inserting a sequence that is
//! already present and removing one that is absent all look the same to the
//! caller: `false`, and nothing changes.
//!
//! # Diagnostics
//! With the `diagnostics` feature (on by default) every operation reports an
//! [`Event`] on entry and on completion to the registry's [`Observer`]. The
//! default observer forwards them to the `log` facade. Events never change
//! what an operation does or returns.
//!
//! # C ABI
//! The [`ffi`] module exposes the same operations as `extern "C"` functions
//! over a single process-wide registry. See `include/seq_hash.h`.

pub mod event;
pub mod ffi;
pub(crate) mod registry;
#[cfg(test)]
pub(crate) mod test_workloads;

pub use event::{Args, Event, LogObserver, Observer, Op, Outcome};
pub use registry::{HashFunction, Registry, TableId};
