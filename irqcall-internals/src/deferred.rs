//! Type-erased deferred invocation.
//!
//! This module encapsulates the fields of [`RawDeferred`], ensuring they are
//! only visible within this module. This visibility restriction guarantees
//! the safety invariant: **the forwarding trampoline was instantiated with the
//! argument type of the slot pointer and the type of the packed record**.
//!
//! # Safety Invariant
//!
//! [`RawDeferred::new`] is the only way to create a binding with a non-empty
//! record. It takes a `NonNull<RawSlot<A, R>>` and an `A` and pairs them with
//! `forward::<A, R, N>`. [`RawDeferred::nullary`] does the same for `A = ()`.

use core::ptr::NonNull;

use crate::{error::BufferTooSmall, record::RawRecord, slot::RawSlot, util::Erased};

/// A pointer to a [`RawSlot<A, R>`] plus a packed `A`, callable without
/// arguments.
///
/// This is what lets a one-argument callback be stored where only nullary
/// callbacks fit: the argument is fixed when the binding is created and
/// replayed on every call. The argument is stored inline in a
/// [`RawRecord<N>`], so creating the binding fails with [`BufferTooSmall`]
/// instead of allocating when `A` does not fit.
///
/// The binding does not own the slot it points to.
pub struct RawDeferred<R, const N: usize> {
    /// Pointer to the target slot.
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer was created from a `NonNull<RawSlot<A, R>>` for the `A`
    ///    that `forward` was instantiated with.
    slot: NonNull<Erased>,

    /// The packed argument.
    ///
    /// # Safety
    ///
    /// 1. The record was packed from an `A` for the `A` that `forward` was
    ///    instantiated with.
    record: RawRecord<N>,

    /// Trampoline restoring the slot and argument types.
    forward: unsafe fn(NonNull<Erased>, &RawRecord<N>) -> R,
}

impl<R, const N: usize> RawDeferred<R, N> {
    /// Creates a binding that calls `slot` with `value`.
    ///
    /// Fails with [`BufferTooSmall`] if `A` is larger than `N` bytes.
    #[inline]
    pub fn new<A>(slot: NonNull<RawSlot<A, R>>, value: A) -> Result<Self, BufferTooSmall>
    where
        A: Copy + Send + Sync,
    {
        let record = RawRecord::pack(value)?;
        Ok(Self {
            slot: slot.cast::<Erased>(),
            record,
            forward: forward::<A, R, N>,
        })
    }

    /// Creates a binding that calls the nullary `slot`. Occupies no record
    /// bytes and so cannot fail.
    #[inline]
    pub fn nullary(slot: NonNull<RawSlot<(), R>>) -> Self {
        Self {
            slot: slot.cast::<Erased>(),
            record: RawRecord::empty(),
            forward: forward::<(), R, N>,
        }
    }

    /// Number of record bytes in use.
    #[inline]
    pub fn record_len(&self) -> usize {
        self.record.len()
    }

    /// Returns the address of the slot this binding forwards to.
    #[inline]
    pub fn slot_addr(&self) -> usize {
        self.slot.as_ptr().addr()
    }

    /// Calls the target slot with the packed argument.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The slot this binding was created from is still live.
    /// 2. The safety requirements of [`RawSlot::invoke`] hold for that slot.
    #[inline]
    pub unsafe fn call(&self) -> R {
        // SAFETY:
        // 1. The slot pointer and the record match `forward`, guaranteed by the
        //    invariants of this type
        // 2. Guaranteed by the caller
        // 3. Guaranteed by the caller
        unsafe { (self.forward)(self.slot, &self.record) }
    }
}

impl<R, const N: usize> Clone for RawDeferred<R, N> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, const N: usize> Copy for RawDeferred<R, N> {}

impl<R, const N: usize> core::fmt::Debug for RawDeferred<R, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawDeferred")
            .field("slot", &self.slot)
            .field("record", &self.record)
            .finish()
    }
}

// SAFETY: The slot pointer targets a `RawSlot`, which is `Sync`, and the packed
// argument was `Send + Sync` when it was recorded (enforced by `new`).
unsafe impl<R, const N: usize> Send for RawDeferred<R, N> {}

// SAFETY: See the `Send` impl above. `call` only reads the record.
unsafe impl<R, const N: usize> Sync for RawDeferred<R, N> {}

/// Calls the slot behind `slot` with the argument packed in `record`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `slot` was created from a live `NonNull<RawSlot<A, R>>`.
/// 2. `record` was packed from an `A`.
/// 3. The safety requirements of [`RawSlot::invoke`] hold for the slot.
unsafe fn forward<A: Copy, R, const N: usize>(slot: NonNull<Erased>, record: &RawRecord<N>) -> R {
    // SAFETY:
    // 1. Guaranteed by the caller
    let slot: &RawSlot<A, R> = unsafe { slot.cast::<RawSlot<A, R>>().as_ref() };

    // SAFETY:
    // 2. Guaranteed by the caller
    let value: A = unsafe { record.read::<A>() };

    // SAFETY:
    // 3. Guaranteed by the caller
    unsafe { slot.invoke(value) }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn inc(x: i32) -> i32 {
        x + 1
    }

    fn ready() -> bool {
        true
    }

    struct Accumulator {
        total: AtomicU32,
    }

    fn add(acc: &Accumulator, x: u32) -> u32 {
        acc.total.fetch_add(x, Ordering::Relaxed) + x
    }

    #[test]
    fn test_raw_deferred_static() {
        let slot = RawSlot::<i32, i32>::from_function(inc as fn(i32) -> i32);
        let deferred = RawDeferred::<i32, 8>::new(NonNull::from(&slot), 41).unwrap();
        assert_eq!(deferred.record_len(), 4);
        // SAFETY: `slot` outlives the call and has a static binding
        assert_eq!(unsafe { deferred.call() }, 42);
        // SAFETY: Same as above
        assert_eq!(unsafe { deferred.call() }, 42);
    }

    #[test]
    fn test_raw_deferred_member_replays() {
        let acc = Accumulator {
            total: AtomicU32::new(0),
        };
        let slot = RawSlot::<u32, u32>::from_method(
            NonNull::from(&acc),
            add as fn(&Accumulator, u32) -> u32,
        );
        let deferred = RawDeferred::<u32, 4>::new(NonNull::from(&slot), 5).unwrap();

        // SAFETY: `acc` and `slot` outlive every call
        assert_eq!(unsafe { deferred.call() }, 5);
        // SAFETY: Same as above
        assert_eq!(unsafe { deferred.call() }, 10);
    }

    #[test]
    fn test_raw_deferred_nullary() {
        let slot = RawSlot::<(), bool>::from_function(ready as fn() -> bool);
        let deferred = RawDeferred::<bool, 0>::nullary(NonNull::from(&slot));
        assert_eq!(deferred.record_len(), 0);
        // SAFETY: `slot` outlives the call
        assert!(unsafe { deferred.call() });
    }

    #[test]
    fn test_raw_deferred_too_large() {
        let slot = RawSlot::<u64, u64>::from_function((|x| x) as fn(u64) -> u64);
        let error = RawDeferred::<u64, 4>::new(NonNull::from(&slot), 1).unwrap_err();
        assert_eq!(error, BufferTooSmall::new(8, 4));
    }

    #[test]
    fn test_raw_deferred_sees_reattached_slot() {
        let mut slot = RawSlot::<i32, i32>::from_function(inc as fn(i32) -> i32);
        let ptr = NonNull::from(&mut slot);
        let deferred = RawDeferred::<i32, 4>::new(ptr, 1).unwrap();

        // SAFETY: `ptr` is the only access path to `slot` from here on
        unsafe { (*ptr.as_ptr()).attach_function((|x: i32| x * 100) as fn(i32) -> i32) };
        // SAFETY: `slot` is live and static
        assert_eq!(unsafe { deferred.call() }, 100);
    }

    #[test]
    fn test_send_sync() {
        static_assertions::assert_impl_all!(RawDeferred<u32, 16>: Send, Sync, Copy);
    }
}
