//! C ABI over a single process-wide [`Registry`].
//!
//! These are the functions declared in `include/seq_hash.h`. The registry
//! behind them is created on first use and lives until the process exits.
//! Calls are serialized by a lock, which is held while the caller's hash
//! function runs: a hash function must not call back into this interface.
use std::{os::raw::c_ulong, slice};

use parking_lot::{const_mutex, Mutex};

use crate::registry::{HashFunction, Input, Registry, TableId};

/// The hash function type accepted by [`hash_create`].
pub type CHashFunction = extern "C" fn(*const u64, usize) -> u64;

static REGISTRY: Mutex<Option<Registry>> = const_mutex(None);

fn with_registry<R>(f: impl FnOnce(&mut Registry) -> R) -> R {
    let mut registry = REGISTRY.lock();
    f(registry.get_or_insert_with(Registry::new))
}

/// Wrap a C hash function. A null function is a caller bug, not an
/// expected failure.
fn bind(hash_function: Option<CHashFunction>) -> HashFunction {
    let Some(hash) = hash_function else {
        panic!("hash_create: hash function must not be NULL");
    };
    Box::new(move |seq: &[u64]| hash(seq.as_ptr(), seq.len()))
}

/// # Safety
/// A non-null `seq` must point to `size` readable, initialized `u64`s that
/// stay valid for `'a`.
unsafe fn input<'a>(seq: *const u64, size: usize) -> Input<'a> {
    if seq.is_null() {
        Input::null(size)
    } else {
        // SAFETY: upheld by the caller; `seq` is non-null.
        unsafe { slice::from_raw_parts(seq, size) }.into()
    }
}

fn table_id(id: c_ulong) -> TableId {
    TableId::from(id)
}

/// Create a table bound to `hash_function` and return its identifier.
///
/// Aborts the process if `hash_function` is null.
#[no_mangle]
pub extern "C" fn hash_create(hash_function: Option<CHashFunction>) -> c_ulong {
    let hash = bind(hash_function);
    // `unsigned long` is 64 bits on every target this library is built for.
    with_registry(|registry| registry.create_boxed(hash)) as c_ulong
}

#[no_mangle]
pub extern "C" fn hash_delete(id: c_ulong) {
    with_registry(|registry| registry.delete(table_id(id)))
}

#[no_mangle]
pub extern "C" fn hash_size(id: c_ulong) -> usize {
    with_registry(|registry| registry.size(table_id(id)))
}

/// # Safety
/// `seq` must be null or point to `size` readable `u64`s.
#[no_mangle]
pub unsafe extern "C" fn hash_insert(id: c_ulong, seq: *const u64, size: usize) -> bool {
    // SAFETY: forwarded from the caller.
    let seq = unsafe { input(seq, size) };
    with_registry(|registry| registry.insert_input(table_id(id), seq))
}

/// # Safety
/// `seq` must be null or point to `size` readable `u64`s.
#[no_mangle]
pub unsafe extern "C" fn hash_remove(id: c_ulong, seq: *const u64, size: usize) -> bool {
    // SAFETY: forwarded from the caller.
    let seq = unsafe { input(seq, size) };
    with_registry(|registry| registry.remove_input(table_id(id), seq))
}

#[no_mangle]
pub extern "C" fn hash_clear(id: c_ulong) {
    with_registry(|registry| registry.clear(table_id(id)))
}

/// # Safety
/// `seq` must be null or point to `size` readable `u64`s.
#[no_mangle]
pub unsafe extern "C" fn hash_test(id: c_ulong, seq: *const u64, size: usize) -> bool {
    // SAFETY: forwarded from the caller.
    let seq = unsafe { input(seq, size) };
    with_registry(|registry| registry.test_input(table_id(id), seq))
}
