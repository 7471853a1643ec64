#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`irqcall`].
//!
//! # Overview
//!
//! This crate contains the low-level, type-erased storage and the unsafe
//! operations that power the [`irqcall`] callback library. It provides the
//! foundation for allocation-free type erasure through trampoline dispatch:
//! a callback is stored as a handful of machine words and invoked with a
//! single indirect call, which is what an interrupt handler can afford.
//!
//! **This crate is an implementation detail.** No semantic versioning
//! guarantees are provided. Users should depend on the [`irqcall`] crate, not
//! this one.
//!
//! # Architecture
//!
//! - **[`slot`]**: Type-erased callable storage
//!   - [`RawSlot`]: A static function or a receiver/method pair, plus the
//!     trampoline that knows how to call it
//!   - [`SlotKind`]: Which of the two bindings is active
//!
//! - **[`record`]**: Argument transport across the erasure boundary
//!   - [`ArgRecord`]: Byte-exact wrapper around a single argument
//!   - [`RawRecord`]: Inline, fixed-capacity buffer holding one packed record
//!
//! - **[`deferred`]**: [`RawDeferred`], a slot pointer paired with a packed
//!   argument so it can be invoked without arguments later
//!
//! - **[`signature`]**: Sealed traits naming the function pointer shapes a
//!   slot can erase ([`Function`], [`Method`])
//!
//! # Safety Strategy
//!
//! When a `fn(&T, A) -> R` is stored as an erased code pointer next to an
//! erased receiver pointer, the trampoline stored alongside them must have
//! been instantiated with exactly that `T` and that method type. This crate
//! maintains that through:
//!
//! - **Module-based encapsulation**: the binding and the invoker of a
//!   [`RawSlot`] are module-private and only ever written together, making the
//!   pairing locally verifiable within a single file
//! - **Sealed signatures**: only the four function pointer shapes implemented
//!   in [`signature`] can be erased, so restoring an erased pointer always
//!   produces the type it came from
//! - **Documented trampoline contracts**: every trampoline states exactly when
//!   it can be called
//!
//! [`irqcall`]: https://docs.rs/irqcall/latest/irqcall/
//! [`slot`]: crate::slot
//! [`Function`]: signature::Function
//! [`Method`]: signature::Method

#[cfg(test)]
extern crate alloc;

mod deferred;
mod error;
mod record;
pub mod signature;
mod slot;
mod util;

pub use deferred::RawDeferred;
pub use error::BufferTooSmall;
pub use record::{ArgRecord, RawRecord};
pub use slot::{RawSlot, SlotKind};
