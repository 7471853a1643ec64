//! Type-erased callable slot.
//!
//! This module encapsulates the `binding` and `invoker` fields of
//! [`RawSlot`], ensuring they are only visible within this module. This
//! visibility restriction guarantees the safety invariant: **the invoker is
//! always the trampoline instantiated for the types stored in the binding**.
//!
//! # Safety Invariant
//!
//! Both fields are only ever written together, by the constructors and the
//! `attach_*` methods below. Each of those pairs a binding built from a
//! concrete `F` (or `T` and `M`) with the trampoline instantiated for that
//! same `F` (or `T` and `M`).
//!
//! # Type Erasure
//!
//! The function or method pointer is erased to an `ErasedFn` and the receiver
//! to a `NonNull<Erased>`. The slot itself only stays generic over the
//! argument type `A` and result type `R`, so every slot with the same
//! signature has the same type and size regardless of what it calls.

use core::ptr::NonNull;

use crate::{
    signature::{Function, Method, sealed::ErasedFn},
    slot::trampoline::{invoke_member, invoke_static},
    util::Erased,
};

/// The callee of a [`RawSlot`]: either a free function, or a method together
/// with the receiver it is called on.
#[derive(Clone, Copy)]
pub(super) enum Binding {
    /// A free function.
    Static {
        /// The erased function pointer.
        function: ErasedFn,
    },
    /// A method bound to a receiver.
    Member {
        /// Pointer to the receiver. Not owned.
        receiver: NonNull<Erased>,
        /// The erased method pointer.
        method: ErasedFn,
    },
}

/// Which kind of callee a [`RawSlot`] is currently bound to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotKind {
    /// A free function.
    Static,
    /// A method called on a receiver.
    Member,
}

/// A callable taking `A` and returning `R`, with the concrete callee erased.
///
/// A slot is either bound to a free function (`fn() -> R` or `fn(A) -> R`)
/// or to a method (`fn(&T) -> R` or `fn(&T, A) -> R`) together with a pointer
/// to its receiver. It has no unattached state: every constructor attaches
/// something, and re-attaching overwrites the previous binding in place.
///
/// The slot does not own its receiver. Keeping the receiver alive for as long
/// as the slot may be invoked is the caller's responsibility, which is why
/// [`invoke`](Self::invoke) is `unsafe`.
///
/// Invoking a slot is a single indirect call through a stored trampoline. No
/// allocation and no `dyn` dispatch is involved, so the slot can be invoked
/// from interrupt context.
pub struct RawSlot<A, R> {
    /// The erased callee.
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. For [`Binding::Static`], `function` was erased from the `F` that
    ///    `invoker` was instantiated with.
    /// 2. For [`Binding::Member`], `method` was erased from the `M` and
    ///    `receiver` from the `NonNull<T>` that `invoker` was instantiated
    ///    with, and `T: Sync`.
    binding: Binding,

    /// The trampoline that restores the erased types and calls the callee.
    invoker: unsafe fn(&Binding, A) -> R,
}

impl<A, R> RawSlot<A, R> {
    /// Creates a slot bound to the free function `function`.
    #[inline]
    pub fn from_function<F>(function: F) -> Self
    where
        F: Function<A, R>,
    {
        Self {
            binding: Binding::Static {
                function: function.erase(),
            },
            invoker: invoke_static::<F, A, R>,
        }
    }

    /// Creates a slot bound to `method`, called on the receiver behind
    /// `receiver`.
    ///
    /// Creating the slot does not dereference `receiver`. See
    /// [`invoke`](Self::invoke) for the requirements that apply when the slot
    /// is called.
    #[inline]
    pub fn from_method<T, M>(receiver: NonNull<T>, method: M) -> Self
    where
        T: Sync,
        M: Method<T, A, R>,
    {
        Self {
            binding: Binding::Member {
                receiver: receiver.cast::<Erased>(),
                method: method.erase(),
            },
            invoker: invoke_member::<T, M, A, R>,
        }
    }

    /// Re-binds the slot to the free function `function`, discarding the
    /// previous binding.
    #[inline]
    pub fn attach_function<F>(&mut self, function: F)
    where
        F: Function<A, R>,
    {
        *self = Self::from_function(function);
    }

    /// Re-binds the slot to `method` on `receiver`, discarding the previous
    /// binding.
    #[inline]
    pub fn attach_method<T, M>(&mut self, receiver: NonNull<T>, method: M)
    where
        T: Sync,
        M: Method<T, A, R>,
    {
        *self = Self::from_method(receiver, method);
    }

    /// Returns which kind of callee the slot is bound to.
    #[inline]
    pub fn kind(&self) -> SlotKind {
        match self.binding {
            Binding::Static { .. } => SlotKind::Static,
            Binding::Member { .. } => SlotKind::Member,
        }
    }

    /// Returns the address of the bound function or method.
    #[inline]
    pub fn code_addr(&self) -> usize {
        match self.binding {
            Binding::Static { function } => function.addr(),
            Binding::Member { method, .. } => method.addr(),
        }
    }

    /// Returns the receiver pointer if the slot is bound to a method.
    #[inline]
    pub fn receiver(&self) -> Option<NonNull<()>> {
        match self.binding {
            Binding::Static { .. } => None,
            Binding::Member { receiver, .. } => Some(receiver.cast::<()>()),
        }
    }

    /// Returns the bound free function, or `None` if the slot is bound to a
    /// method.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. If the slot is bound to a free function, it was attached with a
    ///    function of type `F`.
    #[inline]
    pub unsafe fn function<F>(&self) -> Option<F>
    where
        F: Function<A, R>,
    {
        match self.binding {
            Binding::Static { function } => {
                // SAFETY:
                // 1. Guaranteed by the caller
                Some(unsafe { F::restore(function) })
            }
            Binding::Member { .. } => None,
        }
    }

    /// Calls the bound function or method with `args`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. If the slot is bound to a method, the receiver it was attached with
    ///    is still live and is not mutably borrowed for the duration of the
    ///    call.
    #[inline]
    pub unsafe fn invoke(&self, args: A) -> R {
        // SAFETY:
        // 1. The invoker matches the binding, guaranteed by the invariants of this
        //    type
        // 2. The receiver (if any) is valid for shared access, guaranteed by the
        //    caller
        unsafe { (self.invoker)(&self.binding, args) }
    }
}

impl<R> RawSlot<(), R> {
    /// Creates a slot bound to the nullary function `function`.
    ///
    /// Equivalent to [`from_function`](Self::from_function), but usable in
    /// `const` and `static` initializers.
    #[inline]
    pub const fn from_nullary(function: fn() -> R) -> Self {
        Self {
            binding: Binding::Static {
                function: ErasedFn::from_ptr(function as *const ()),
            },
            invoker: invoke_static::<fn() -> R, (), R>,
        }
    }

    /// Creates a slot bound to the nullary method `method` on `receiver`.
    ///
    /// Equivalent to [`from_method`](Self::from_method), but usable in
    /// `const` and `static` initializers.
    #[inline]
    pub const fn from_nullary_method<T>(receiver: NonNull<T>, method: fn(&T) -> R) -> Self
    where
        T: Sync,
    {
        Self {
            binding: Binding::Member {
                receiver: receiver.cast::<Erased>(),
                method: ErasedFn::from_ptr(method as *const ()),
            },
            invoker: invoke_member::<T, fn(&T) -> R, (), R>,
        }
    }
}

impl<A, R> RawSlot<A, R> {
    /// Creates a slot bound to the unary function `function`.
    ///
    /// Equivalent to [`from_function`](Self::from_function), but usable in
    /// `const` and `static` initializers.
    #[inline]
    pub const fn from_unary(function: fn(A) -> R) -> Self {
        Self {
            binding: Binding::Static {
                function: ErasedFn::from_ptr(function as *const ()),
            },
            invoker: invoke_static::<fn(A) -> R, A, R>,
        }
    }

    /// Creates a slot bound to the unary method `method` on `receiver`.
    ///
    /// Equivalent to [`from_method`](Self::from_method), but usable in
    /// `const` and `static` initializers.
    #[inline]
    pub const fn from_unary_method<T>(receiver: NonNull<T>, method: fn(&T, A) -> R) -> Self
    where
        T: Sync,
    {
        Self {
            binding: Binding::Member {
                receiver: receiver.cast::<Erased>(),
                method: ErasedFn::from_ptr(method as *const ()),
            },
            invoker: invoke_member::<T, fn(&T, A) -> R, A, R>,
        }
    }
}

impl<A, R> Clone for RawSlot<A, R> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<A, R> Copy for RawSlot<A, R> {}

impl<A, R> core::fmt::Debug for RawSlot<A, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawSlot")
            .field("kind", &self.kind())
            .field("code", &format_args!("{:#x}", self.code_addr()))
            .finish_non_exhaustive()
    }
}

// SAFETY: The binding only holds code pointers and, for methods, a shared
// pointer to a receiver that is `Sync` (enforced by `from_method`), which is
// exactly what a `&T` with `T: Sync` would require to be `Send`.
unsafe impl<A, R> Send for RawSlot<A, R> {}

// SAFETY: Shared access to a slot only ever produces shared access to a `Sync`
// receiver, see the `Send` impl above.
unsafe impl<A, R> Sync for RawSlot<A, R> {}

#[cfg(test)]
mod tests {
    use core::{
        cell::Cell,
        sync::atomic::{AtomicU32, Ordering},
    };

    use super::*;

    fn zero() -> u32 {
        0
    }

    fn double(x: u32) -> u32 {
        x * 2
    }

    fn square(x: u32) -> u32 {
        x * x
    }

    struct Counter {
        hits: AtomicU32,
    }

    fn hits(counter: &Counter) -> u32 {
        counter.hits.load(Ordering::Relaxed)
    }

    fn bump(counter: &Counter, by: u32) -> u32 {
        counter.hits.fetch_add(by, Ordering::Relaxed) + by
    }

    #[test]
    fn test_raw_slot_size() {
        // Binding (tag + two words) and one trampoline pointer, independent of
        // the callee.
        let expected = core::mem::size_of::<usize>() * 4;
        assert!(core::mem::size_of::<RawSlot<(), u32>>() <= expected);
        assert_eq!(
            core::mem::size_of::<RawSlot<(), u32>>(),
            core::mem::size_of::<RawSlot<[u64; 8], [u8; 3]>>()
        );
    }

    #[test]
    fn test_raw_slot_static() {
        let slot = RawSlot::<u32, u32>::from_function(double as fn(u32) -> u32);
        assert_eq!(slot.kind(), SlotKind::Static);
        assert!(slot.receiver().is_none());
        // SAFETY: Static binding, no receiver involved
        assert_eq!(unsafe { slot.invoke(21) }, 42);
    }

    #[test]
    fn test_raw_slot_nullary_static() {
        let slot = RawSlot::<(), u32>::from_function(zero as fn() -> u32);
        // SAFETY: Static binding, no receiver involved
        assert_eq!(unsafe { slot.invoke(()) }, 0);
    }

    #[test]
    fn test_raw_slot_member() {
        let counter = Counter {
            hits: AtomicU32::new(5),
        };
        let slot =
            RawSlot::<(), u32>::from_method(NonNull::from(&counter), hits as fn(&Counter) -> u32);
        assert_eq!(slot.kind(), SlotKind::Member);
        assert_eq!(
            slot.receiver(),
            Some(NonNull::from(&counter).cast::<()>())
        );

        // SAFETY: `counter` outlives every call below
        assert_eq!(unsafe { slot.invoke(()) }, 5);
        counter.hits.store(9, Ordering::Relaxed);
        // SAFETY: `counter` is still live
        assert_eq!(unsafe { slot.invoke(()) }, 9);
    }

    #[test]
    fn test_raw_slot_member_with_argument() {
        let counter = Counter {
            hits: AtomicU32::new(1),
        };
        let slot = RawSlot::<u32, u32>::from_method(
            NonNull::from(&counter),
            bump as fn(&Counter, u32) -> u32,
        );
        // SAFETY: `counter` outlives the calls
        assert_eq!(unsafe { slot.invoke(2) }, 3);
        // SAFETY: `counter` is still live
        assert_eq!(unsafe { slot.invoke(4) }, 7);
        assert_eq!(counter.hits.load(Ordering::Relaxed), 7);
    }

    #[test]
    fn test_raw_slot_reattach() {
        let counter = Counter {
            hits: AtomicU32::new(0),
        };
        let mut slot = RawSlot::<u32, u32>::from_function(double as fn(u32) -> u32);

        slot.attach_function(square as fn(u32) -> u32);
        // SAFETY: Static binding
        assert_eq!(unsafe { slot.invoke(5) }, 25);

        slot.attach_method(NonNull::from(&counter), bump as fn(&Counter, u32) -> u32);
        assert_eq!(slot.kind(), SlotKind::Member);
        // SAFETY: `counter` outlives the call
        assert_eq!(unsafe { slot.invoke(5) }, 5);

        slot.attach_function(double as fn(u32) -> u32);
        assert_eq!(slot.kind(), SlotKind::Static);
        // SAFETY: Static binding
        assert_eq!(unsafe { slot.invoke(5) }, 10);
    }

    #[test]
    fn test_raw_slot_function_accessor() {
        let counter = Counter {
            hits: AtomicU32::new(0),
        };
        let mut slot = RawSlot::<u32, u32>::from_function(double as fn(u32) -> u32);

        // SAFETY: The slot was attached with a `fn(u32) -> u32`
        let function = unsafe { slot.function::<fn(u32) -> u32>() };
        assert_eq!(function.map(|f| f(4)), Some(8));

        slot.attach_method(NonNull::from(&counter), bump as fn(&Counter, u32) -> u32);
        // SAFETY: Member bindings never restore a function
        let function = unsafe { slot.function::<fn(u32) -> u32>() };
        assert!(function.is_none());
    }

    static GLOBAL_HITS: Counter = Counter {
        hits: AtomicU32::new(11),
    };

    static CONST_NULLARY: RawSlot<(), u32> = RawSlot::from_nullary(zero);
    static CONST_UNARY: RawSlot<u32, u32> = RawSlot::from_unary(square);

    #[test]
    fn test_raw_slot_const_constructors() {
        // SAFETY: Static bindings
        assert_eq!(unsafe { CONST_NULLARY.invoke(()) }, 0);
        // SAFETY: Same as above
        assert_eq!(unsafe { CONST_UNARY.invoke(6) }, 36);

        let receiver = NonNull::from(&GLOBAL_HITS);
        let nullary = RawSlot::from_nullary_method(receiver, hits);
        let unary = RawSlot::from_unary_method(receiver, bump);
        // SAFETY: `GLOBAL_HITS` is a static
        assert_eq!(unsafe { nullary.invoke(()) }, 11);
        // SAFETY: Same as above
        assert_eq!(unsafe { unary.invoke(1) }, 12);
        assert_eq!(nullary.kind(), SlotKind::Member);
    }

    #[test]
    fn test_raw_slot_const_matches_generic() {
        let generic = RawSlot::<u32, u32>::from_function(square as fn(u32) -> u32);
        let constant = RawSlot::<u32, u32>::from_unary(square);
        assert_eq!(generic.code_addr(), constant.code_addr());

        // The two constructors must agree on the pointer type so that
        // `function` restores either.
        // SAFETY: Attached with a `fn(u32) -> u32`
        let restored = unsafe { constant.function::<fn(u32) -> u32>() };
        assert_eq!(restored.map(|f| f(3)), Some(9));
    }

    #[test]
    fn test_raw_slot_code_addr() {
        let slot = RawSlot::<u32, u32>::from_function(square as fn(u32) -> u32);
        assert_eq!(slot.code_addr(), (square as fn(u32) -> u32) as usize);
    }

    #[test]
    fn test_raw_slot_copy_shares_receiver() {
        let seen = AtomicU32::new(0);
        fn observe(seen: &AtomicU32, x: u32) -> u32 {
            seen.swap(x, Ordering::Relaxed)
        }

        let slot = RawSlot::<u32, u32>::from_method(
            NonNull::from(&seen),
            observe as fn(&AtomicU32, u32) -> u32,
        );
        let copy = slot;

        // SAFETY: `seen` outlives both calls
        assert_eq!(unsafe { slot.invoke(3) }, 0);
        // SAFETY: `seen` is still live
        assert_eq!(unsafe { copy.invoke(4) }, 3);
    }

    #[test]
    fn test_raw_slot_debug() {
        use alloc::format;

        let slot = RawSlot::<u32, u32>::from_function(double as fn(u32) -> u32);
        let debug = format!("{slot:?}");
        assert!(debug.starts_with("RawSlot { kind: Static, code: 0x"));
    }

    #[test]
    fn test_send_sync() {
        static_assertions::assert_impl_all!(RawSlot<u32, u32>: Send, Sync, Copy);
        static_assertions::assert_impl_all!(RawSlot<(), Cell<u8>>: Send, Sync, Copy);
    }
}
