//! Interrupt vectors: where a driver keeps the handler it fires from its
//! interrupt service routine.
//!
//! A [`Vector`] is shared between two contexts:
//!
//! - the foreground, which [attaches](Vector::attach) and
//!   [detaches](Vector::detach) handlers, and
//! - the interrupt, which [fires](Vector::fire) whatever is attached.
//!
//! The handler is guarded by a reader-writer lock. The foreground takes it
//! for writing, which is short and bounded. The interrupt side only ever
//! *tries* to take it for reading: if the foreground is in the middle of
//! replacing the handler, the interrupt is reported as [`Dispatch::Busy`] and
//! dropped instead of spinning on a lock that cannot be released until the
//! interrupt returns. An interrupt therefore observes either the old handler,
//! the new one, or neither, but never a partially written one.
//!
//! Callers that cannot afford to drop an event keep the usual discipline of
//! masking the interrupt source around re-attachment.
//!
//! [`attach`](Vector::attach), [`detach`](Vector::detach),
//! [`update`](Vector::update), [`is_attached`](Vector::is_attached) and
//! [`handler`](Vector::handler) wait for the lock and belong to the
//! foreground. A handler that re-attaches from interrupt context uses
//! [`try_attach`](Vector::try_attach), [`try_detach`](Vector::try_detach) or
//! [`try_update`](Vector::try_update) instead, which fail with
//! [`VectorBusy`] rather than spin on a lock the interrupted foreground holds.
//!
//! [`VectorTable`] groups one vector per event class of a peripheral, keyed
//! by an [`IrqSource`] such as [`SerialIrq`].

mod lock;
mod table;

pub use self::table::{IrqSource, SerialIrq, SerialVectors, VectorTable};
use self::lock::VectorLock;
use crate::{
    DEFAULT_RECORD_CAPACITY,
    handler::Handler,
    log::{debug, trace, warning},
};

/// The error returned when a vector could not be changed without waiting.
///
/// Another context holds the vector's lock. From interrupt context this is
/// the foreground that was interrupted, and it cannot release the lock until
/// the interrupt returns.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VectorBusy;

impl core::fmt::Display for VectorBusy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("vector is locked by another context")
    }
}

impl core::error::Error for VectorBusy {}

/// The outcome of firing a [`Vector`].
#[must_use]
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch<R> {
    /// A handler was attached and returned this value.
    Handled(R),
    /// No handler was attached.
    Unattached,
    /// The handler was being replaced; the event was dropped.
    Busy,
}

impl<R> Dispatch<R> {
    /// Returns the handler's result, if a handler ran.
    #[inline]
    pub fn handled(self) -> Option<R> {
        match self {
            Self::Handled(value) => Some(value),
            Self::Unattached | Self::Busy => None,
        }
    }

    /// Returns `true` if a handler ran.
    #[inline]
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }
}

/// One interrupt vector, holding at most one [`Handler`].
///
/// `Vector::new` is a `const fn`, so vectors live in statics next to the
/// interrupt service routines that fire them. Handlers stored in a vector
/// must be `'static`, since the vector can be fired at any time.
///
/// # Examples
///
/// ```
/// use core::sync::atomic::{AtomicU32, Ordering};
///
/// use irqcall::{Callback0, Dispatch, Vector};
///
/// static TICKS: AtomicU32 = AtomicU32::new(0);
/// static TIMER: Vector = Vector::new();
///
/// fn on_tick() {
///     TICKS.fetch_add(1, Ordering::Relaxed);
/// }
///
/// // In the interrupt service routine:
/// fn timer_isr() -> Dispatch<()> {
///     TIMER.fire()
/// }
///
/// assert_eq!(timer_isr(), Dispatch::Unattached);
///
/// TIMER.attach(Callback0::new(on_tick));
/// assert_eq!(timer_isr(), Dispatch::Handled(()));
/// assert_eq!(TICKS.load(Ordering::Relaxed), 1);
/// ```
pub struct Vector<R = (), const N: usize = DEFAULT_RECORD_CAPACITY> {
    handler: VectorLock<Handler<'static, R, N>>,
}

impl<R, const N: usize> Vector<R, N> {
    /// Creates a vector with nothing attached.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            handler: VectorLock::new(),
        }
    }

    /// Attaches `handler`, returning the handler it replaces.
    ///
    /// Waits for the lock, so this must not be called from a handler. See
    /// [`try_attach`](Self::try_attach).
    pub fn attach(
        &self,
        handler: impl Into<Handler<'static, R, N>>,
    ) -> Option<Handler<'static, R, N>> {
        let handler = handler.into();
        let deferred = handler.is_deferred();
        let previous = self.update(|_| Some(handler));
        debug!(
            "vector handler attached (deferred: {deferred}, replaced: {})",
            previous.is_some()
        );
        previous
    }

    /// Detaches the current handler and returns it.
    ///
    /// Waits for the lock, so this must not be called from a handler. See
    /// [`try_detach`](Self::try_detach).
    pub fn detach(&self) -> Option<Handler<'static, R, N>> {
        let previous = self.update(|_| None);
        debug!("vector handler detached (was attached: {})", previous.is_some());
        previous
    }

    /// Replaces the handler with the result of `f`, returning the previous
    /// handler.
    ///
    /// `f` receives the current handler and runs while the vector is locked
    /// for writing, so an interrupt fired from inside `f` is reported as
    /// [`Dispatch::Busy`]. Waits for the lock, so this must not be called
    /// from a handler. See [`try_update`](Self::try_update).
    pub fn update<F>(&self, f: F) -> Option<Handler<'static, R, N>>
    where
        F: FnOnce(Option<Handler<'static, R, N>>) -> Option<Handler<'static, R, N>>,
    {
        let mut guard = self.handler.write();
        let slot = guard.get();
        let previous = *slot;
        *slot = f(previous);
        previous
    }

    /// Attaches `handler` without waiting, returning the handler it replaces.
    ///
    /// # Errors
    ///
    /// Returns [`VectorBusy`] and leaves the vector unchanged if another
    /// context holds the lock.
    pub fn try_attach(
        &self,
        handler: impl Into<Handler<'static, R, N>>,
    ) -> Result<Option<Handler<'static, R, N>>, VectorBusy> {
        let handler = handler.into();
        self.try_update(|_| Some(handler))
    }

    /// Detaches the current handler without waiting and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`VectorBusy`] and leaves the vector unchanged if another
    /// context holds the lock.
    pub fn try_detach(&self) -> Result<Option<Handler<'static, R, N>>, VectorBusy> {
        self.try_update(|_| None)
    }

    /// Like [`update`](Self::update), but fails instead of waiting for the
    /// lock. `f` is not called on failure.
    ///
    /// # Errors
    ///
    /// Returns [`VectorBusy`] if another context holds the lock.
    pub fn try_update<F>(&self, f: F) -> Result<Option<Handler<'static, R, N>>, VectorBusy>
    where
        F: FnOnce(Option<Handler<'static, R, N>>) -> Option<Handler<'static, R, N>>,
    {
        let Some(mut guard) = self.handler.try_write() else {
            warning!("vector update skipped: lock held by another context");
            return Err(VectorBusy);
        };
        let slot = guard.get();
        let previous = *slot;
        *slot = f(previous);
        Ok(previous)
    }

    /// Returns `true` if a handler is attached.
    pub fn is_attached(&self) -> bool {
        self.handler.read().get().is_some()
    }

    /// Returns a copy of the attached handler.
    pub fn handler(&self) -> Option<Handler<'static, R, N>> {
        self.handler.read().get().copied()
    }

    /// Calls the attached handler.
    ///
    /// This is what an interrupt service routine calls. It never blocks: if
    /// the handler is being replaced the event is dropped and
    /// [`Dispatch::Busy`] is returned.
    ///
    /// The handler runs after the lock has been released. It may change this
    /// vector with [`try_attach`](Self::try_attach),
    /// [`try_detach`](Self::try_detach) or [`try_update`](Self::try_update),
    /// which fail with [`VectorBusy`] if the interrupted foreground holds the
    /// lock.
    #[inline]
    pub fn fire(&self) -> Dispatch<R> {
        let Some(guard) = self.handler.try_read() else {
            warning!("interrupt dropped: vector handler is being replaced");
            return Dispatch::Busy;
        };
        let handler = guard.get().copied();
        drop(guard);

        match handler {
            Some(handler) => Dispatch::Handled(handler.call()),
            None => {
                trace!("interrupt fired with no handler attached");
                Dispatch::Unattached
            }
        }
    }
}

impl<R, const N: usize> Default for Vector<R, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, const N: usize> core::fmt::Debug for Vector<R, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut debug = f.debug_struct("Vector");
        match self.handler.try_read() {
            Some(guard) => debug.field("handler", &guard.get()),
            None => debug.field("handler", &format_args!("<locked>")),
        };
        debug.finish()
    }
}
