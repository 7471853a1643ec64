use core::marker::PhantomData;

use super::{Dispatch, Vector, VectorBusy};
use crate::{handler::Handler, log::warning};

/// An enum of the event classes of one peripheral.
///
/// Each event class owns one [`Vector`] in a [`VectorTable`].
///
/// # Examples
///
/// ```
/// use irqcall::{IrqSource, VectorTable};
///
/// #[derive(Copy, Clone, Debug)]
/// enum TimerIrq {
///     Overflow,
///     Compare,
///     Capture,
/// }
///
/// impl IrqSource for TimerIrq {
///     const COUNT: usize = 3;
///
///     fn index(self) -> usize {
///         self as usize
///     }
/// }
///
/// static TIMER: VectorTable<TimerIrq, 3> = VectorTable::new();
///
/// fn compare() {}
///
/// TIMER.attach(TimerIrq::Compare, compare as fn());
/// assert!(TIMER.is_attached(TimerIrq::Compare));
/// assert!(!TIMER.is_attached(TimerIrq::Overflow));
/// ```
pub trait IrqSource: Copy {
    /// Number of event classes.
    const COUNT: usize;

    /// Position of this event class, in `0..COUNT`.
    ///
    /// A table ignores events whose index is out of range.
    fn index(self) -> usize;
}

/// The interrupt event classes of a serial port.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialIrq {
    /// A byte was received.
    Rx,
    /// The transmit register is empty.
    Tx,
}

impl IrqSource for SerialIrq {
    const COUNT: usize = 2;

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// The vectors of a serial port, one per [`SerialIrq`].
pub type SerialVectors = VectorTable<SerialIrq, 2>;

/// One [`Vector`] per event class of `E`.
///
/// `K` must equal [`E::COUNT`](IrqSource::COUNT); this is checked when the
/// table is created.
pub struct VectorTable<E, const K: usize> {
    vectors: [Vector; K],
    _source: PhantomData<fn(E)>,
}

impl<E: IrqSource, const K: usize> VectorTable<E, K> {
    /// Creates a table with nothing attached.
    #[must_use]
    pub const fn new() -> Self {
        const { assert!(E::COUNT == K, "vector table size must match the event count") };
        Self {
            vectors: [const { Vector::new() }; K],
            _source: PhantomData,
        }
    }

    /// Returns the vector of `event`, or `None` if `event.index()` is not
    /// below `K`.
    #[inline]
    pub fn vector(&self, event: E) -> Option<&Vector> {
        let index = event.index();
        let vector = self.vectors.get(index);
        if vector.is_none() {
            warning!("event index {index} outside a table of {} vectors", K);
        }
        vector
    }

    /// Attaches `handler` to `event`, returning the handler it replaces.
    ///
    /// The handler is dropped if `event` has no vector.
    pub fn attach(
        &self,
        event: E,
        handler: impl Into<Handler<'static, ()>>,
    ) -> Option<Handler<'static, ()>> {
        self.vector(event)?.attach(handler)
    }

    /// Detaches the handler of `event` and returns it.
    pub fn detach(&self, event: E) -> Option<Handler<'static, ()>> {
        self.vector(event)?.detach()
    }

    /// Attaches `handler` to `event` without waiting. See
    /// [`Vector::try_attach`].
    ///
    /// # Errors
    ///
    /// Returns [`VectorBusy`] if another context holds the vector's lock.
    pub fn try_attach(
        &self,
        event: E,
        handler: impl Into<Handler<'static, ()>>,
    ) -> Result<Option<Handler<'static, ()>>, VectorBusy> {
        match self.vector(event) {
            Some(vector) => vector.try_attach(handler),
            None => Ok(None),
        }
    }

    /// Detaches the handler of `event` without waiting. See
    /// [`Vector::try_detach`].
    ///
    /// # Errors
    ///
    /// Returns [`VectorBusy`] if another context holds the vector's lock.
    pub fn try_detach(&self, event: E) -> Result<Option<Handler<'static, ()>>, VectorBusy> {
        match self.vector(event) {
            Some(vector) => vector.try_detach(),
            None => Ok(None),
        }
    }

    /// Returns `true` if a handler is attached to `event`.
    pub fn is_attached(&self, event: E) -> bool {
        self.vector(event).is_some_and(|vector| vector.is_attached())
    }

    /// Fires the handler of `event`. See [`Vector::fire`].
    ///
    /// An event without a vector is reported as [`Dispatch::Unattached`].
    #[inline]
    pub fn fire(&self, event: E) -> Dispatch<()> {
        match self.vector(event) {
            Some(vector) => vector.fire(),
            None => Dispatch::Unattached,
        }
    }
}

impl<E: IrqSource, const K: usize> Default for VectorTable<E, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, const K: usize> core::fmt::Debug for VectorTable<E, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VectorTable")
            .field("vectors", &self.vectors)
            .finish()
    }
}
