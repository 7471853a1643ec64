use core::{marker::PhantomData, mem::MaybeUninit, ptr::NonNull};

use irqcall_internals::{ArgRecord, BufferTooSmall, RawSlot, SlotKind};

use crate::deferred::DeferredCall;

/// A callback taking one argument of type `A` and returning `R`.
///
/// Bound either to a free function `fn(A) -> R` or to a method
/// `fn(&T, A) -> R` on a receiver borrowed for `'a`.
///
/// [`call`](Self::call) passes the argument straight through. To invoke the
/// callback later from code that can only call nullary callbacks, fix the
/// argument ahead of time with [`bind`](Self::bind) or
/// [`deferred`](Self::deferred).
///
/// # Examples
///
/// ```
/// use irqcall::Callback1;
///
/// fn inc(x: i32) -> i32 {
///     x + 1
/// }
///
/// let callback = Callback1::new(inc);
/// assert_eq!(callback.call(41), 42);
///
/// let deferred = callback.deferred::<16>(41).unwrap();
/// assert_eq!(deferred.call(), 42);
/// ```
#[repr(transparent)]
pub struct Callback1<'a, A, R> {
    raw: RawSlot<A, R>,
    _receiver: PhantomData<&'a ()>,
}

impl<'a, A, R> Callback1<'a, A, R> {
    /// Size in bytes of the argument record packed by
    /// [`pack_args`](Self::pack_args) and [`bind`](Self::bind).
    pub const RECORD_SIZE: usize = core::mem::size_of::<A>();

    /// Creates a callback bound to the free function `function`.
    #[inline]
    #[must_use]
    pub const fn new(function: fn(A) -> R) -> Self {
        Self {
            raw: RawSlot::from_unary(function),
            _receiver: PhantomData,
        }
    }

    /// Creates a callback bound to `method`, called on `receiver`.
    ///
    /// ```
    /// use core::sync::atomic::{AtomicU32, Ordering};
    ///
    /// use irqcall::Callback1;
    ///
    /// struct Tally {
    ///     total: AtomicU32,
    /// }
    ///
    /// fn add(tally: &Tally, x: u32) -> u32 {
    ///     tally.total.fetch_add(x, Ordering::Relaxed) + x
    /// }
    ///
    /// let tally = Tally {
    ///     total: AtomicU32::new(0),
    /// };
    /// let callback = Callback1::from_method(&tally, add);
    /// assert_eq!(callback.call(3), 3);
    /// assert_eq!(callback.call(4), 7);
    /// ```
    #[inline]
    #[must_use]
    pub const fn from_method<T>(receiver: &'a T, method: fn(&T, A) -> R) -> Self
    where
        T: Sync,
    {
        // SAFETY: A reference is never null.
        let receiver = unsafe { NonNull::new_unchecked(core::ptr::from_ref(receiver).cast_mut()) };
        Self {
            raw: RawSlot::from_unary_method(receiver, method),
            _receiver: PhantomData,
        }
    }

    /// Re-binds the callback to the free function `function`.
    #[inline]
    pub fn attach(&mut self, function: fn(A) -> R) {
        self.raw.attach_function(function);
    }

    /// Re-binds the callback to `method` on `receiver`.
    #[inline]
    pub fn attach_method<T>(&mut self, receiver: &'a T, method: fn(&T, A) -> R)
    where
        T: Sync,
    {
        self.raw.attach_method(NonNull::from(receiver), method);
    }

    /// Calls the bound function or method with `value`.
    #[inline]
    pub fn call(&self, value: A) -> R {
        // SAFETY:
        // 1. A member binding was created from a `&'a T`, which is still live
        //    because `self` is, and which cannot be mutably borrowed while that
        //    shared borrow exists
        unsafe { self.raw.invoke(value) }
    }

    /// Returns the bound free function, or `None` if the callback is bound to
    /// a method.
    #[inline]
    pub fn get_function(&self) -> Option<fn(A) -> R> {
        // SAFETY:
        // 1. Every static binding of a `Callback1` is made from a `fn(A) -> R`
        unsafe { self.raw.function::<fn(A) -> R>() }
    }

    /// Returns which kind of callee the callback is bound to.
    #[inline]
    pub fn kind(&self) -> SlotKind {
        self.raw.kind()
    }

    /// Returns `true` if the callback is bound to a free function.
    #[inline]
    pub fn is_static(&self) -> bool {
        self.kind() == SlotKind::Static
    }

    /// Returns `true` if the callback is bound to a method.
    #[inline]
    pub fn is_member(&self) -> bool {
        self.kind() == SlotKind::Member
    }

    #[inline]
    pub(crate) fn as_raw(&self) -> &RawSlot<A, R> {
        &self.raw
    }
}

impl<A: Copy, R> Callback1<'_, A, R> {
    /// Writes the argument record for `value` to the start of `buffer`.
    ///
    /// Fails with [`BufferTooSmall`] if `buffer` is shorter than
    /// [`RECORD_SIZE`](Self::RECORD_SIZE). The buffer is left untouched in
    /// that case.
    ///
    /// ```
    /// use core::mem::MaybeUninit;
    ///
    /// use irqcall::{BufferTooSmall, Callback1};
    ///
    /// fn echo(byte: u32) -> u32 {
    ///     byte
    /// }
    ///
    /// let callback = Callback1::new(echo);
    /// let mut small = [MaybeUninit::<u8>::uninit(); 2];
    /// assert_eq!(
    ///     callback.pack_args(&mut small, 7),
    ///     Err(BufferTooSmall::new(4, 2))
    /// );
    ///
    /// let mut large = [MaybeUninit::<u8>::uninit(); 8];
    /// assert_eq!(callback.pack_args(&mut large, 7), Ok(()));
    /// ```
    #[inline]
    pub fn pack_args(
        &self,
        buffer: &mut [MaybeUninit<u8>],
        value: A,
    ) -> Result<(), BufferTooSmall> {
        ArgRecord(value).pack_into(buffer)
    }
}

impl<A, R> Callback1<'_, A, R>
where
    A: Copy + Send + Sync,
{
    /// Stores this callback together with `value` in `out`, replacing
    /// whatever `out` was bound to.
    ///
    /// Fails with [`BufferTooSmall`] if the argument record does not fit in
    /// the `N` bytes of `out`. `out` is left unchanged in that case.
    #[inline]
    pub fn bind<'b, const N: usize>(
        &'b self,
        out: &mut DeferredCall<'b, R, N>,
        value: A,
    ) -> Result<(), BufferTooSmall> {
        out.accept(self, value)
    }

    /// Creates a [`DeferredCall`] that calls this callback with `value`.
    ///
    /// Fails with [`BufferTooSmall`] if the argument record does not fit in
    /// `N` bytes.
    #[inline]
    pub fn deferred<const N: usize>(
        &self,
        value: A,
    ) -> Result<DeferredCall<'_, R, N>, BufferTooSmall> {
        DeferredCall::new(self, value)
    }
}

impl<A, R> Clone for Callback1<'_, A, R> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<A, R> Copy for Callback1<'_, A, R> {}

impl<A, R> From<fn(A) -> R> for Callback1<'_, A, R> {
    #[inline]
    fn from(function: fn(A) -> R) -> Self {
        Self::new(function)
    }
}

impl<A, R> core::fmt::Debug for Callback1<'_, A, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Callback1")
            .field("kind", &self.kind())
            .field("code", &format_args!("{:#x}", self.raw.code_addr()))
            .field("record_size", &Self::RECORD_SIZE)
            .finish()
    }
}
