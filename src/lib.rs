#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::as_ptr_cast_mut,
    clippy::ptr_as_ptr,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Extra checks on nightly
#![cfg_attr(nightly_extra_checks, feature(rustdoc_missing_doc_code_examples))]
#![cfg_attr(nightly_extra_checks, forbid(rustdoc::missing_doc_code_examples))]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Allocation-free, type-erased callbacks for interrupt vectors.
//!
//! ## Overview
//!
//! A peripheral driver wants to let its user decide what happens when an
//! interrupt fires: toggle a LED, echo a received byte, bump a counter on
//! some object. The driver cannot know the concrete type of that handler,
//! but it has to store it in a fixed amount of memory and call it from an
//! interrupt service routine, where allocating or going through a `dyn`
//! vtable is not an option.
//!
//! This crate provides callbacks that erase the concrete callee while
//! keeping its exact call semantics. A callback is bound either to a free
//! function or to a method together with the object it is called on, and
//! takes zero or one argument:
//!
//! | Type | Calls |
//! |------|-------|
//! | [`Callback0<'a, R>`] | `fn() -> R` or `fn(&T) -> R` |
//! | [`Callback1<'a, A, R>`] | `fn(A) -> R` or `fn(&T, A) -> R` |
//!
//! All callbacks with the same signature have the same type and the same
//! size, whatever they are bound to. Calling one is a single indirect call.
//!
//! ## Quick Example
//!
//! ```
//! use core::sync::atomic::{AtomicI32, Ordering};
//!
//! use irqcall::{Callback0, Callback1};
//!
//! fn inc(x: i32) -> i32 {
//!     x + 1
//! }
//!
//! struct Counter {
//!     count: AtomicI32,
//! }
//!
//! fn get(counter: &Counter) -> i32 {
//!     counter.count.load(Ordering::Relaxed)
//! }
//!
//! // A free function taking one argument.
//! let unary = Callback1::new(inc);
//! assert_eq!(unary.call(41), 42);
//!
//! // The same callback with its argument fixed ahead of time.
//! let deferred = unary.deferred::<16>(41).unwrap();
//! assert_eq!(deferred.call(), 42);
//!
//! // A method bound to an object. The object is borrowed, not copied.
//! let counter = Counter {
//!     count: AtomicI32::new(5),
//! };
//! let nullary = Callback0::from_method(&counter, get);
//! assert_eq!(nullary.call(), 5);
//! counter.count.store(9, Ordering::Relaxed);
//! assert_eq!(nullary.call(), 9);
//! ```
//!
//! ## Core Concepts
//!
//! - **Callbacks** ([`Callback0`], [`Callback1`]) hold the erased callee.
//!   Methods are called on a `&T`, so receivers change their state through
//!   interior mutability, and the callback borrows the receiver for its
//!   whole lifetime.
//! - **Deferred calls** ([`DeferredCall`]) pair a one-argument callback with
//!   a copy of its argument, so it can be called where only nullary
//!   callbacks fit. The argument is stored inline in `N` bytes; binding an
//!   argument that does not fit fails with [`BufferTooSmall`] and changes
//!   nothing.
//! - **Handlers** ([`Handler`]) are what a driver stores: either a nullary
//!   callback or a deferred call.
//! - **Vectors** ([`Vector`], [`VectorTable`]) are where a driver keeps the
//!   handlers it fires from interrupt context. Firing a vector never blocks;
//!   see the [`vector`] module for the contract between the foreground and
//!   the interrupt.
//!
//! For implementation details, see the [`irqcall-internals`] crate.
//!
//! [`irqcall-internals`]: irqcall_internals
//!
//! ## Features
//!
//! - `std`: guard vectors with `std::sync::RwLock` instead of `spin`.
//! - `tracing`: log attach and detach operations and dropped interrupts
//!   through the `tracing` crate. Calls themselves are never logged.
//! - `defmt`: implement `defmt::Format` for the plain data types.

#[cfg(any(test, feature = "std"))]
extern crate std;

mod log;

pub mod callback;
pub mod prelude;
pub mod vector;

mod deferred;
mod handler;

pub use irqcall_internals::{BufferTooSmall, SlotKind};

pub use self::{
    callback::{Callback0, Callback1},
    deferred::DeferredCall,
    handler::Handler,
    vector::{Dispatch, IrqSource, SerialIrq, SerialVectors, Vector, VectorBusy, VectorTable},
};

/// Default number of bytes a [`DeferredCall`] reserves for its argument.
///
/// Large enough for any primitive, a pointer, or a pair of `u64`s.
pub const DEFAULT_RECORD_CAPACITY: usize = 16;
