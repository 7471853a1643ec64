//! Trampolines for type-erased slot invocation.
//!
//! A [`RawSlot`] stores its callee with the function pointer type and the
//! receiver type erased. The functions in this module are instantiated with
//! those types when the slot is attached, and a pointer to the right
//! instantiation is stored in the slot next to the binding. Calling through
//! that pointer restores the exact types and performs the real call.
//!
//! # Safety Invariant
//!
//! Each trampoline may only be called with a [`Binding`] whose variant and
//! erased types match the trampoline's type parameters. [`RawSlot`] keeps its
//! binding and invoker fields module-private and writes them together, which
//! guarantees this.
//!
//! [`RawSlot`]: super::RawSlot

use crate::{
    signature::sealed::{FunctionPtr, MethodPtr},
    slot::raw::Binding,
};

/// Calls the free function stored in a static binding.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `binding` is a [`Binding::Static`] whose function was erased from an `F`.
pub(super) unsafe fn invoke_static<F, A, R>(binding: &Binding, args: A) -> R
where
    F: FunctionPtr<A, R>,
{
    let Binding::Static { function } = *binding else {
        if cfg!(debug_assertions) {
            unreachable!("static trampoline paired with a member binding");
        }
        // SAFETY: The caller guarantees the binding is static.
        unsafe { core::hint::unreachable_unchecked() }
    };

    // SAFETY:
    // 1. Guaranteed by the caller
    let function = unsafe { F::restore(function) };
    function.invoke(args)
}

/// Calls the method stored in a member binding on its receiver.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `binding` is a [`Binding::Member`] whose method was erased from an `M`
///    and whose receiver was erased from a `NonNull<T>`.
/// 2. The receiver is valid for shared access for the duration of the call.
pub(super) unsafe fn invoke_member<T, M, A, R>(binding: &Binding, args: A) -> R
where
    M: MethodPtr<T, A, R>,
{
    let Binding::Member { receiver, method } = *binding else {
        if cfg!(debug_assertions) {
            unreachable!("member trampoline paired with a static binding");
        }
        // SAFETY: The caller guarantees the binding is a member binding.
        unsafe { core::hint::unreachable_unchecked() }
    };

    // SAFETY:
    // 1. Guaranteed by the caller
    let method = unsafe { M::restore(method) };

    // SAFETY: The receiver was erased from a `NonNull<T>` and is valid for shared
    // access, both guaranteed by the caller.
    let receiver: &T = unsafe { receiver.cast::<T>().as_ref() };

    method.invoke(receiver, args)
}
