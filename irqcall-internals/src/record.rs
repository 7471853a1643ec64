//! Argument records: the byte-exact transport used to carry an argument
//! across the erasure boundary.
//!
//! A one-argument callback that has to be fired by code that only knows how
//! to call things without arguments needs its argument stored somewhere
//! ahead of time. [`ArgRecord`] describes the layout of that stored argument
//! and [`RawRecord`] is the fixed-capacity inline buffer it is stored in.
//!
//! Records are written and read with unaligned accesses, so the buffers have
//! no alignment requirement. Only `Copy` arguments can be recorded: reading a
//! record copies the value out and leaves the bytes in place, so the same
//! record can be replayed any number of times.

use core::mem::MaybeUninit;

use crate::error::BufferTooSmall;

/// A single argument laid out exactly as it is transported.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[repr(transparent)]
pub struct ArgRecord<A>(pub A);

impl<A: Copy> ArgRecord<A> {
    /// Size in bytes of the record for `A`.
    pub const SIZE: usize = core::mem::size_of::<A>();

    /// Writes the record to the start of `buffer`.
    ///
    /// Fails with [`BufferTooSmall`] if `buffer` is shorter than
    /// [`SIZE`](Self::SIZE). Nothing is written in that case.
    #[inline]
    pub fn pack_into(self, buffer: &mut [MaybeUninit<u8>]) -> Result<(), BufferTooSmall> {
        if buffer.len() < Self::SIZE {
            return Err(BufferTooSmall::new(Self::SIZE, buffer.len()));
        }

        let dst = buffer.as_mut_ptr().cast::<Self>();
        // SAFETY: `dst` points to at least `SIZE` writable bytes, checked above, and
        // `write_unaligned` has no alignment requirement.
        unsafe { dst.write_unaligned(self) };
        Ok(())
    }

    /// Reads a record from the start of `buffer`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The first [`SIZE`](Self::SIZE) bytes of `buffer` were written by
    ///    [`ArgRecord::<A>::pack_into`](Self::pack_into).
    #[inline]
    pub unsafe fn unpack_from(buffer: &[MaybeUninit<u8>]) -> Self {
        debug_assert!(buffer.len() >= Self::SIZE);

        let src = buffer.as_ptr().cast::<Self>();
        // SAFETY: The caller guarantees `src` points to a record packed from an `A`,
        // so the bytes are in bounds and form a valid `A`. `read_unaligned` has no
        // alignment requirement, and `A: Copy` so the bytes stay valid after the read.
        unsafe { src.read_unaligned() }
    }
}

/// Inline buffer of `N` bytes holding at most one packed [`ArgRecord`].
///
/// The buffer does not remember which type it holds; whoever reads it back
/// must know. [`RawDeferred`](crate::RawDeferred) stores that knowledge in its
/// forwarding trampoline.
#[derive(Clone, Copy)]
pub struct RawRecord<const N: usize> {
    /// The packed bytes. Only the first `len` bytes are meaningful.
    bytes: [MaybeUninit<u8>; N],
    /// Number of bytes of `bytes` in use.
    len: usize,
}

impl<const N: usize> RawRecord<N> {
    /// A record holding nothing, which is also the record of `()`.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            bytes: [MaybeUninit::uninit(); N],
            len: 0,
        }
    }

    /// Packs `value` into a new record.
    ///
    /// Fails with [`BufferTooSmall`] if `A` is larger than `N` bytes.
    #[inline]
    pub fn pack<A: Copy>(value: A) -> Result<Self, BufferTooSmall> {
        let mut record = Self::empty();
        ArgRecord(value).pack_into(&mut record.bytes)?;
        record.len = ArgRecord::<A>::SIZE;
        Ok(record)
    }

    /// Number of bytes in use.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the record holds no bytes.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total capacity of the record in bytes.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Copies the recorded value out.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The record was created by [`RawRecord::pack::<A>`](Self::pack), or
    ///    `A` is a zero-sized type.
    #[inline]
    pub unsafe fn read<A: Copy>(&self) -> A {
        debug_assert_eq!(self.len, ArgRecord::<A>::SIZE);

        // SAFETY:
        // 1. Guaranteed by the caller
        let ArgRecord(value) = unsafe { ArgRecord::<A>::unpack_from(&self.bytes) };
        value
    }
}

impl<const N: usize> Default for RawRecord<N> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<const N: usize> core::fmt::Debug for RawRecord<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawRecord")
            .field("len", &self.len)
            .field("capacity", &N)
            .finish()
    }
}
