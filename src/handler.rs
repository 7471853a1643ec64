//! What an interrupt vector stores.

use crate::{DEFAULT_RECORD_CAPACITY, callback::Callback0, deferred::DeferredCall};

/// A nullary callable that a driver stores for one event class.
///
/// The interrupt that fires a handler has nothing to pass to it, so a
/// handler is either a [`Callback0`] called directly, or a [`DeferredCall`]
/// replaying an argument fixed when it was bound.
///
/// # Examples
///
/// ```
/// use irqcall::{Callback0, Callback1, Handler};
///
/// fn ping() -> u8 {
///     1
/// }
///
/// fn echo(byte: u8) -> u8 {
///     byte
/// }
///
/// let direct: Handler<'_, u8> = Callback0::new(ping).into();
/// assert_eq!(direct.call(), 1);
///
/// let callback = Callback1::new(echo);
/// let deferred: Handler<'_, u8> = Handler::Deferred(callback.deferred(b'x').unwrap());
/// assert_eq!(deferred.call(), b'x');
/// ```
pub enum Handler<'a, R, const N: usize = DEFAULT_RECORD_CAPACITY> {
    /// A nullary callback called as is.
    Direct(Callback0<'a, R>),
    /// A one-argument callback called with a stored argument.
    Deferred(DeferredCall<'a, R, N>),
}

impl<R, const N: usize> Handler<'_, R, N> {
    /// Calls the handler.
    #[inline]
    pub fn call(&self) -> R {
        match self {
            Self::Direct(callback) => callback.call(),
            Self::Deferred(deferred) => deferred.call(),
        }
    }

    /// Returns `true` if the handler replays a stored argument.
    #[inline]
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

impl<R, const N: usize> Clone for Handler<'_, R, N> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, const N: usize> Copy for Handler<'_, R, N> {}

impl<'a, R, const N: usize> From<Callback0<'a, R>> for Handler<'a, R, N> {
    #[inline]
    fn from(callback: Callback0<'a, R>) -> Self {
        Self::Direct(callback)
    }
}

impl<'a, R, const N: usize> From<DeferredCall<'a, R, N>> for Handler<'a, R, N> {
    #[inline]
    fn from(deferred: DeferredCall<'a, R, N>) -> Self {
        Self::Deferred(deferred)
    }
}

impl<R, const N: usize> From<fn() -> R> for Handler<'_, R, N> {
    #[inline]
    fn from(function: fn() -> R) -> Self {
        Self::Direct(Callback0::new(function))
    }
}

impl<R, const N: usize> core::fmt::Debug for Handler<'_, R, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Direct(callback) => f.debug_tuple("Direct").field(callback).finish(),
            Self::Deferred(deferred) => f.debug_tuple("Deferred").field(deferred).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicU8, Ordering};

    use super::*;
    use crate::Callback1;

    static LAST: AtomicU8 = AtomicU8::new(0);

    fn store(byte: u8) {
        LAST.store(byte, Ordering::Relaxed);
    }

    fn clear() {
        LAST.store(0, Ordering::Relaxed);
    }

    #[test]
    fn test_handler_call() {
        let callback = Callback1::new(store);
        let deferred: Handler<'_, ()> = Handler::Deferred(callback.deferred(b'a').unwrap());
        assert!(deferred.is_deferred());
        deferred.call();
        assert_eq!(LAST.load(Ordering::Relaxed), b'a');

        let direct: Handler<'_, ()> = Handler::from(clear as fn());
        assert!(!direct.is_deferred());
        direct.call();
        assert_eq!(LAST.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_handler_debug() {
        use std::format;

        let direct: Handler<'_, ()> = Handler::from(clear as fn());
        assert!(format!("{direct:?}").starts_with("Direct(Callback0 { kind: Static"));
    }
}
