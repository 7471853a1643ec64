//! Function pointer shapes that can be stored in a [`RawSlot`].
//!
//! A slot erases two kinds of callees:
//!
//! - **functions**: `fn() -> R` and `fn(A) -> R`, described by [`Function`]
//! - **methods**: `fn(&T) -> R` and `fn(&T, A) -> R` called on a receiver,
//!   described by [`Method`]
//!
//! The nullary shapes use `()` as their argument type, so a slot is always
//! generic over exactly one argument type `A` and one result type `R`.
//!
//! Both traits are sealed. Erasing a pointer and restoring it later is only
//! sound if the restored type is the one that was erased, and sealing keeps
//! the set of types that can take part in that round trip closed.
//!
//! [`RawSlot`]: crate::RawSlot
//!
//! # Examples
//!
//! ```
//! use irqcall_internals::signature::{Function, Method};
//!
//! struct Uart {
//!     rx: u8,
//! }
//!
//! fn echo(byte: u8) -> u8 {
//!     byte
//! }
//!
//! fn read(uart: &Uart) -> u8 {
//!     uart.rx
//! }
//!
//! fn assert_function<F: Function<u8, u8>>(_: F) {}
//! fn assert_method<M: Method<Uart, (), u8>>(_: M) {}
//!
//! assert_function(echo as fn(u8) -> u8);
//! assert_method(read as fn(&Uart) -> u8);
//! ```

/// A free function that can be stored in a slot taking `A` and returning `R`.
///
/// Implemented for `fn() -> R` (with `A = ()`) and `fn(A) -> R`.
pub trait Function<A, R>: sealed::FunctionPtr<A, R> {}

impl<F, A, R> Function<A, R> for F where F: sealed::FunctionPtr<A, R> {}

/// A method that can be stored in a slot together with a receiver of type
/// `T`, taking `A` and returning `R`.
///
/// Implemented for `fn(&T) -> R` (with `A = ()`) and `fn(&T, A) -> R`.
pub trait Method<T, A, R>: sealed::MethodPtr<T, A, R> {}

impl<M, T, A, R> Method<T, A, R> for M where M: sealed::MethodPtr<T, A, R> {}

pub(crate) mod sealed {
    //! The erase/restore/call machinery behind [`Function`] and [`Method`].
    //!
    //! [`Function`]: super::Function
    //! [`Method`]: super::Method

    /// A code pointer with its signature erased.
    ///
    /// Every Rust function pointer has the same representation as a thin data
    /// pointer, so any of the shapes in this module round-trips through an
    /// [`ErasedFn`] unchanged.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    #[repr(transparent)]
    pub struct ErasedFn(*const ());

    impl ErasedFn {
        /// Wraps an already erased code pointer.
        ///
        /// Usable in `const` contexts, where the trait methods below are not.
        #[inline]
        pub(crate) const fn from_ptr(ptr: *const ()) -> Self {
            Self(ptr)
        }

        /// Returns the address of the erased code pointer.
        #[inline]
        pub(crate) fn addr(self) -> usize {
            self.0.addr()
        }
    }

    /// Erasable free function pointer.
    pub trait FunctionPtr<A, R>: Copy {
        /// Erases the signature of this function pointer.
        fn erase(self) -> ErasedFn;

        /// Restores a function pointer erased by [`FunctionPtr::erase`].
        ///
        /// # Safety
        ///
        /// The caller must ensure:
        ///
        /// 1. `erased` was produced by `Self::erase`.
        unsafe fn restore(erased: ErasedFn) -> Self;

        /// Calls the function.
        fn invoke(self, args: A) -> R;
    }

    /// Erasable method pointer called on a `&T`.
    pub trait MethodPtr<T, A, R>: Copy {
        /// Erases the signature of this method pointer.
        fn erase(self) -> ErasedFn;

        /// Restores a method pointer erased by [`MethodPtr::erase`].
        ///
        /// # Safety
        ///
        /// The caller must ensure:
        ///
        /// 1. `erased` was produced by `Self::erase`.
        unsafe fn restore(erased: ErasedFn) -> Self;

        /// Calls the method on `receiver`.
        fn invoke(self, receiver: &T, args: A) -> R;
    }

    impl<R> FunctionPtr<(), R> for fn() -> R {
        #[inline]
        fn erase(self) -> ErasedFn {
            ErasedFn(self as *const ())
        }

        #[inline]
        unsafe fn restore(erased: ErasedFn) -> Self {
            // SAFETY: The pointer was created from a `fn() -> R` by `erase`, as
            // guaranteed by the caller, and function pointers and `*const ()` have
            // the same size and representation.
            unsafe { core::mem::transmute::<*const (), Self>(erased.0) }
        }

        #[inline]
        fn invoke(self, (): ()) -> R {
            self()
        }
    }

    impl<A, R> FunctionPtr<A, R> for fn(A) -> R {
        #[inline]
        fn erase(self) -> ErasedFn {
            ErasedFn(self as *const ())
        }

        #[inline]
        unsafe fn restore(erased: ErasedFn) -> Self {
            // SAFETY: The pointer was created from a `fn(A) -> R` by `erase`, as
            // guaranteed by the caller.
            unsafe { core::mem::transmute::<*const (), Self>(erased.0) }
        }

        #[inline]
        fn invoke(self, args: A) -> R {
            self(args)
        }
    }

    impl<T, R> MethodPtr<T, (), R> for fn(&T) -> R {
        #[inline]
        fn erase(self) -> ErasedFn {
            ErasedFn(self as *const ())
        }

        #[inline]
        unsafe fn restore(erased: ErasedFn) -> Self {
            // SAFETY: The pointer was created from a `fn(&T) -> R` by `erase`, as
            // guaranteed by the caller.
            unsafe { core::mem::transmute::<*const (), Self>(erased.0) }
        }

        #[inline]
        fn invoke(self, receiver: &T, (): ()) -> R {
            self(receiver)
        }
    }

    impl<T, A, R> MethodPtr<T, A, R> for fn(&T, A) -> R {
        #[inline]
        fn erase(self) -> ErasedFn {
            ErasedFn(self as *const ())
        }

        #[inline]
        unsafe fn restore(erased: ErasedFn) -> Self {
            // SAFETY: The pointer was created from a `fn(&T, A) -> R` by `erase`,
            // as guaranteed by the caller.
            unsafe { core::mem::transmute::<*const (), Self>(erased.0) }
        }

        #[inline]
        fn invoke(self, receiver: &T, args: A) -> R {
            self(receiver, args)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::sealed::{FunctionPtr, MethodPtr};

    fn answer() -> i32 {
        42
    }

    fn negate(x: i32) -> i32 {
        -x
    }

    struct Scale(i32);

    fn scaled(s: &Scale) -> i32 {
        s.0 * 10
    }

    fn scale_by(s: &Scale, x: i32) -> i32 {
        s.0 * x
    }

    #[test]
    fn test_function_erase_restore() {
        let f = answer as fn() -> i32;
        let erased = FunctionPtr::erase(f);
        // SAFETY: `erased` came from a `fn() -> i32`
        let restored = unsafe { <fn() -> i32 as FunctionPtr<(), i32>>::restore(erased) };
        assert_eq!(restored.invoke(()), 42);

        let g = negate as fn(i32) -> i32;
        let erased = FunctionPtr::erase(g);
        // SAFETY: `erased` came from a `fn(i32) -> i32`
        let restored = unsafe { <fn(i32) -> i32 as FunctionPtr<i32, i32>>::restore(erased) };
        assert_eq!(restored.invoke(7), -7);
    }

    #[test]
    fn test_method_erase_restore() {
        let scale = Scale(3);

        let m = scaled as fn(&Scale) -> i32;
        let erased = MethodPtr::erase(m);
        // SAFETY: `erased` came from a `fn(&Scale) -> i32`
        let restored = unsafe { <fn(&Scale) -> i32 as MethodPtr<Scale, (), i32>>::restore(erased) };
        assert_eq!(restored.invoke(&scale, ()), 30);

        let m = scale_by as fn(&Scale, i32) -> i32;
        let erased = MethodPtr::erase(m);
        // SAFETY: `erased` came from a `fn(&Scale, i32) -> i32`
        let restored =
            unsafe { <fn(&Scale, i32) -> i32 as MethodPtr<Scale, i32, i32>>::restore(erased) };
        assert_eq!(restored.invoke(&scale, 5), 15);
    }

    #[test]
    fn test_erased_fn_preserves_address() {
        let f = negate as fn(i32) -> i32;
        assert_eq!(FunctionPtr::erase(f).addr(), f as usize);
    }
}
