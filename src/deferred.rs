//! Callbacks with their argument fixed ahead of time.

use core::{marker::PhantomData, ptr::NonNull};

use irqcall_internals::{BufferTooSmall, RawDeferred};

use crate::{
    DEFAULT_RECORD_CAPACITY,
    callback::{Callback0, Callback1},
    log::debug,
};

/// A callback pre-loaded with its argument, callable without arguments.
///
/// A `DeferredCall` refers to a [`Callback1`] (or a [`Callback0`]) and keeps
/// a copy of the argument it will be called with in an inline buffer of `N`
/// bytes. This is how a one-argument callback is handed to code that only
/// knows how to fire nullary ones, such as an interrupt vector.
///
/// The callback is borrowed for `'a`, not copied, so it cannot be re-attached
/// while a `DeferredCall` refers to it. The argument is a snapshot taken when
/// the binding is made; every [`call`](Self::call) replays the same value.
///
/// # Examples
///
/// ```
/// use irqcall::{Callback1, DeferredCall};
///
/// fn inc(x: i32) -> i32 {
///     x + 1
/// }
///
/// fn double(x: i32) -> i32 {
///     x * 2
/// }
///
/// let first = Callback1::new(inc);
/// let second = Callback1::new(double);
///
/// let mut deferred: DeferredCall<'_, i32> = DeferredCall::new(&first, 41).unwrap();
/// assert_eq!(deferred.call(), 42);
///
/// second.bind(&mut deferred, 21).unwrap();
/// assert_eq!(deferred.call(), 42);
/// ```
pub struct DeferredCall<'a, R, const N: usize = DEFAULT_RECORD_CAPACITY> {
    raw: RawDeferred<R, N>,
    _callback: PhantomData<&'a ()>,
}

impl<'a, R, const N: usize> DeferredCall<'a, R, N> {
    /// Creates a binding that calls `callback` with `value`.
    ///
    /// Fails with [`BufferTooSmall`] if the argument record of `A` does not fit
    /// in `N` bytes.
    #[inline]
    pub fn new<A>(callback: &'a Callback1<'_, A, R>, value: A) -> Result<Self, BufferTooSmall>
    where
        A: Copy + Send + Sync,
    {
        let raw = RawDeferred::new(NonNull::from(callback.as_raw()), value)?;
        Ok(Self {
            raw,
            _callback: PhantomData,
        })
    }

    /// Creates a binding that calls the nullary `callback`.
    #[inline]
    #[must_use]
    pub fn nullary(callback: &'a Callback0<'_, R>) -> Self {
        Self {
            raw: RawDeferred::nullary(NonNull::from(callback.as_raw())),
            _callback: PhantomData,
        }
    }

    /// Re-binds to `callback` called with `value`.
    ///
    /// On failure the previous binding is kept, as if `accept` had not been
    /// called.
    pub fn accept<A>(
        &mut self,
        callback: &'a Callback1<'_, A, R>,
        value: A,
    ) -> Result<(), BufferTooSmall>
    where
        A: Copy + Send + Sync,
    {
        *self = Self::new(callback, value)
            .inspect_err(|error| debug!("deferred binding rejected: {error}"))?;
        Ok(())
    }

    /// Re-binds to the nullary `callback`.
    pub fn accept_nullary(&mut self, callback: &'a Callback0<'_, R>) {
        *self = Self::nullary(callback);
    }

    /// Calls the bound callback with the stored argument.
    #[inline]
    pub fn call(&self) -> R {
        // SAFETY:
        // 1. The slot belongs to a callback borrowed for `'a`, which is live
        //    while `self` is
        // 2. That callback's receiver, if any, outlives the callback itself and
        //    is only ever shared-borrowed
        unsafe { self.raw.call() }
    }

    /// Number of argument bytes stored.
    #[inline]
    pub fn record_len(&self) -> usize {
        self.raw.record_len()
    }

    /// Number of argument bytes that can be stored.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<R, const N: usize> Clone for DeferredCall<'_, R, N> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, const N: usize> Copy for DeferredCall<'_, R, N> {}

impl<R, const N: usize> core::fmt::Debug for DeferredCall<'_, R, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeferredCall")
            .field("slot", &format_args!("{:#x}", self.raw.slot_addr()))
            .field("record_len", &self.record_len())
            .field("capacity", &N)
            .finish()
    }
}
