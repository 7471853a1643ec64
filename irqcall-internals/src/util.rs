//! Internal utility types.

/// Marker type used when type-erasing receivers and slots.
///
/// This zero-sized type serves as the pointee of pointers whose real target
/// type has been erased. For example, the receiver of a method binding is
/// stored as a `NonNull<Erased>` and only turned back into a `&T` inside the
/// trampoline that was instantiated with that `T`.
///
/// Using a distinct marker type (rather than `()`) makes the intent clearer
/// in type signatures and error messages.
pub(crate) struct Erased;
