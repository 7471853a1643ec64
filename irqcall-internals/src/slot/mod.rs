//! Module containing the type-erased callable slot

mod raw;
mod trampoline;

pub use raw::{RawSlot, SlotKind};
