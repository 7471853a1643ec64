//! Typed callbacks.
//!
//! A callback stores either a free function or a method together with the
//! receiver it is called on, and can be invoked later without the caller
//! knowing which of the two it holds. The concrete callee is erased, so every
//! callback with the same signature has the same type and the same size:
//!
//! - [`Callback0<'a, R>`] calls `fn() -> R` or `fn(&T) -> R`
//! - [`Callback1<'a, A, R>`] calls `fn(A) -> R` or `fn(&T, A) -> R`
//!
//! The lifetime `'a` is the borrow of the receiver. A callback bound to a
//! free function can be `'static`; a callback bound to a method cannot
//! outlive the object it was bound to.
//!
//! Calling a callback is a single indirect call through a trampoline chosen
//! when it was attached. Nothing allocates and nothing is dispatched through
//! a `dyn` vtable, so callbacks can be invoked from interrupt context.
//!
//! # Examples
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
//! let unary = Callback1::new(inc);
//! assert_eq!(unary.call(41), 42);
//!
//! let counter = Counter {
//!     count: AtomicI32::new(5),
//! };
//! let nullary = Callback0::from_method(&counter, get);
//! assert_eq!(nullary.call(), 5);
//! counter.count.store(9, Ordering::Relaxed);
//! assert_eq!(nullary.call(), 9);
//! ```

mod nullary;
mod unary;

pub use self::{nullary::Callback0, unary::Callback1};
