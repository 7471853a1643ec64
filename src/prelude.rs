//! Commonly used items for convenient importing.
//!
//! ```rust
//! use irqcall::prelude::*;
//!
//! static RX: Vector = Vector::new();
//!
//! fn on_rx() {}
//!
//! RX.attach(Callback0::new(on_rx));
//! assert!(RX.fire().is_handled());
//! ```

pub use crate::{
    BufferTooSmall, Callback0, Callback1, DeferredCall, Dispatch, Handler, IrqSource, SerialIrq,
    SerialVectors, Vector, VectorBusy, VectorTable,
};
