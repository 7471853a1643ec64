//! The single checked failure of the crate.

/// Error returned when a packed argument record does not fit the buffer it
/// is being written to.
///
/// This is the only failure the callback machinery reports. It is raised
/// before anything is written, so the destination is left unchanged.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BufferTooSmall {
    /// Size of the argument record in bytes.
    pub required: usize,
    /// Size of the destination buffer in bytes.
    pub capacity: usize,
}

impl BufferTooSmall {
    /// Creates a new [`BufferTooSmall`] for a record of `required` bytes and
    /// a buffer of `capacity` bytes.
    #[inline]
    pub const fn new(required: usize, capacity: usize) -> Self {
        Self { required, capacity }
    }
}

impl core::fmt::Display for BufferTooSmall {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "argument record of {} bytes does not fit in a buffer of {} bytes",
            self.required, self.capacity
        )
    }
}

impl core::error::Error for BufferTooSmall {}
