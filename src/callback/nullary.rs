use core::{marker::PhantomData, ptr::NonNull};

use irqcall_internals::{BufferTooSmall, RawSlot, SlotKind};

use crate::deferred::DeferredCall;

/// A callback taking no arguments and returning `R`.
///
/// Bound either to a free function `fn() -> R` or to a method `fn(&T) -> R`
/// on a receiver borrowed for `'a`. See the [module documentation] for an
/// overview.
///
/// There is no unattached state: every constructor binds something, and
/// [`attach`](Self::attach) / [`attach_method`](Self::attach_method) replace
/// the current binding with a single overwrite.
///
/// [module documentation]: crate::callback
///
/// # Examples
///
/// ```
/// use irqcall::Callback0;
///
/// fn ready() -> bool {
///     true
/// }
///
/// fn idle() -> bool {
///     false
/// }
///
/// let mut callback = Callback0::new(ready);
/// assert!(callback.call());
///
/// callback.attach(idle);
/// assert!(!callback.call());
/// ```
#[repr(transparent)]
pub struct Callback0<'a, R> {
    raw: RawSlot<(), R>,
    _receiver: PhantomData<&'a ()>,
}

impl<'a, R> Callback0<'a, R> {
    /// Creates a callback bound to the free function `function`.
    ///
    /// This is a `const fn`, so callbacks can be placed in statics:
    ///
    /// ```
    /// use irqcall::Callback0;
    ///
    /// fn tick() -> u32 {
    ///     1
    /// }
    ///
    /// static TICK: Callback0<'static, u32> = Callback0::new(tick);
    /// assert_eq!(TICK.call(), 1);
    /// ```
    #[inline]
    #[must_use]
    pub const fn new(function: fn() -> R) -> Self {
        Self {
            raw: RawSlot::from_nullary(function),
            _receiver: PhantomData,
        }
    }

    /// Creates a callback bound to `method`, called on `receiver`.
    ///
    /// The receiver is borrowed, not owned, for as long as the callback
    /// exists. Since only a shared reference is kept, state the method
    /// changes must use interior mutability.
    ///
    /// ```
    /// use core::sync::atomic::{AtomicU8, Ordering};
    ///
    /// use irqcall::Callback0;
    ///
    /// struct Led {
    ///     toggles: AtomicU8,
    /// }
    ///
    /// fn toggle(led: &Led) {
    ///     led.toggles.fetch_add(1, Ordering::Relaxed);
    /// }
    ///
    /// let led = Led {
    ///     toggles: AtomicU8::new(0),
    /// };
    /// let callback = Callback0::from_method(&led, toggle);
    /// callback.call();
    /// callback.call();
    /// assert_eq!(led.toggles.load(Ordering::Relaxed), 2);
    /// ```
    #[inline]
    #[must_use]
    pub const fn from_method<T>(receiver: &'a T, method: fn(&T) -> R) -> Self
    where
        T: Sync,
    {
        // SAFETY: A reference is never null.
        let receiver = unsafe { NonNull::new_unchecked(core::ptr::from_ref(receiver).cast_mut()) };
        Self {
            raw: RawSlot::from_nullary_method(receiver, method),
            _receiver: PhantomData,
        }
    }

    /// Re-binds the callback to the free function `function`.
    #[inline]
    pub fn attach(&mut self, function: fn() -> R) {
        self.raw.attach_function(function);
    }

    /// Re-binds the callback to `method` on `receiver`.
    #[inline]
    pub fn attach_method<T>(&mut self, receiver: &'a T, method: fn(&T) -> R)
    where
        T: Sync,
    {
        self.raw.attach_method(NonNull::from(receiver), method);
    }

    /// Calls the bound function or method.
    #[inline]
    pub fn call(&self) -> R {
        // SAFETY:
        // 1. A member binding was created from a `&'a T`, which is still live
        //    because `self` is, and which cannot be mutably borrowed while that
        //    shared borrow exists
        unsafe { self.raw.invoke(()) }
    }

    /// Stores this callback in `out`, replacing whatever `out` was bound to.
    ///
    /// A nullary callback packs no argument bytes, so this never fails. It
    /// returns a `Result` to match [`Callback1::bind`](crate::Callback1::bind).
    #[inline]
    pub fn bind<'b, const N: usize>(
        &'b self,
        out: &mut DeferredCall<'b, R, N>,
    ) -> Result<(), BufferTooSmall> {
        out.accept_nullary(self);
        Ok(())
    }

    /// Creates a [`DeferredCall`] forwarding to this callback.
    #[inline]
    #[must_use]
    pub fn deferred<const N: usize>(&self) -> DeferredCall<'_, R, N> {
        DeferredCall::nullary(self)
    }

    /// Returns the bound free function, or `None` if the callback is bound to
    /// a method.
    ///
    /// ```
    /// use irqcall::Callback0;
    ///
    /// fn seven() -> u8 {
    ///     7
    /// }
    ///
    /// let callback = Callback0::new(seven);
    /// assert_eq!(callback.get_function().map(|f| f()), Some(7));
    /// ```
    #[inline]
    pub fn get_function(&self) -> Option<fn() -> R> {
        // SAFETY:
        // 1. Every static binding of a `Callback0` is made from a `fn() -> R`
        unsafe { self.raw.function::<fn() -> R>() }
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
    pub(crate) fn as_raw(&self) -> &RawSlot<(), R> {
        &self.raw
    }
}

impl<R> Clone for Callback0<'_, R> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Callback0<'_, R> {}

impl<R> From<fn() -> R> for Callback0<'_, R> {
    #[inline]
    fn from(function: fn() -> R) -> Self {
        Self::new(function)
    }
}

impl<R> core::fmt::Debug for Callback0<'_, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Callback0")
            .field("kind", &self.kind())
            .field("code", &format_args!("{:#x}", self.raw.code_addr()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicI32, Ordering};

    use super::*;

    fn one() -> i32 {
        1
    }

    fn two() -> i32 {
        2
    }

    struct Counter {
        count: AtomicI32,
    }

    fn get(counter: &Counter) -> i32 {
        counter.count.load(Ordering::Relaxed)
    }

    #[test]
    fn test_static_call() {
        let callback = Callback0::new(one);
        assert!(callback.is_static());
        assert_eq!(callback.call(), 1);
    }

    #[test]
    fn test_member_call_is_not_cached() {
        let counter = Counter {
            count: AtomicI32::new(5),
        };
        let callback = Callback0::from_method(&counter, get);
        assert!(callback.is_member());
        assert_eq!(callback.call(), 5);

        counter.count.store(9, Ordering::Relaxed);
        assert_eq!(callback.call(), 9);
    }

    #[test]
    fn test_reattach() {
        let counter = Counter {
            count: AtomicI32::new(-4),
        };
        let mut callback = Callback0::new(one);

        callback.attach(two);
        assert_eq!(callback.call(), 2);

        callback.attach_method(&counter, get);
        assert_eq!(callback.call(), -4);
        assert_eq!(callback.kind(), SlotKind::Member);

        callback.attach(one);
        assert_eq!(callback.call(), 1);
        assert_eq!(callback.kind(), SlotKind::Static);
    }

    #[test]
    fn test_get_function() {
        let counter = Counter {
            count: AtomicI32::new(0),
        };
        let mut callback = Callback0::new(two);
        assert_eq!(callback.get_function().map(|f| f()), Some(2));

        callback.attach_method(&counter, get);
        assert!(callback.get_function().is_none());
    }

    #[test]
    fn test_bind_nullary() {
        let callback = Callback0::new(two);
        let other = Callback0::new(one);
        let mut deferred = other.deferred::<4>();
        assert_eq!(deferred.call(), 1);

        callback.bind(&mut deferred).unwrap();
        assert_eq!(deferred.record_len(), 0);
        assert_eq!(deferred.call(), 2);
    }

    #[test]
    fn test_from_fn_pointer() {
        let callback: Callback0<'_, i32> = Callback0::from(two as fn() -> i32);
        assert_eq!(callback.call(), 2);
    }
}
