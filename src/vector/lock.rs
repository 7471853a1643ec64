#[cfg(feature = "std")]
use std::sync as impl_;

#[cfg(not(feature = "std"))]
use spin as impl_;

/// The lock guarding the handler of a [`Vector`](super::Vector).
///
/// Backed by `spin::RwLock` by default and by `std::sync::RwLock` with the
/// `std` feature. A handler never panics while the lock is held for writing,
/// so poisoning is ignored.
#[repr(transparent)]
pub(crate) struct VectorLock<T>(impl_::RwLock<Option<T>>);

#[repr(transparent)]
pub(crate) struct VectorReadGuard<'a, T>(impl_::RwLockReadGuard<'a, Option<T>>);

#[repr(transparent)]
pub(crate) struct VectorWriteGuard<'a, T>(impl_::RwLockWriteGuard<'a, Option<T>>);

impl<T> VectorLock<T> {
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self(impl_::RwLock::new(None))
    }

    /// Acquires the lock for reading without waiting.
    ///
    /// Returns `None` if a writer holds the lock.
    #[inline]
    pub(crate) fn try_read(&self) -> Option<VectorReadGuard<'_, T>> {
        #[cfg(not(feature = "std"))]
        let guard = self.0.try_read()?;

        #[cfg(feature = "std")]
        let guard = match self.0.try_read() {
            Ok(guard) => guard,
            Err(impl_::TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(impl_::TryLockError::WouldBlock) => return None,
        };

        Some(VectorReadGuard(guard))
    }

    #[inline]
    pub(crate) fn read(&self) -> VectorReadGuard<'_, T> {
        #[cfg(not(feature = "std"))]
        let guard = self.0.read();

        #[cfg(feature = "std")]
        let guard = self.0.read().unwrap_or_else(impl_::PoisonError::into_inner);

        VectorReadGuard(guard)
    }

    /// Acquires the lock for writing without waiting.
    ///
    /// Returns `None` if any reader or writer holds the lock.
    #[inline]
    pub(crate) fn try_write(&self) -> Option<VectorWriteGuard<'_, T>> {
        #[cfg(not(feature = "std"))]
        let guard = self.0.try_write()?;

        #[cfg(feature = "std")]
        let guard = match self.0.try_write() {
            Ok(guard) => guard,
            Err(impl_::TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(impl_::TryLockError::WouldBlock) => return None,
        };

        Some(VectorWriteGuard(guard))
    }

    #[inline]
    pub(crate) fn write(&self) -> VectorWriteGuard<'_, T> {
        #[cfg(not(feature = "std"))]
        let guard = self.0.write();

        #[cfg(feature = "std")]
        let guard = self.0.write().unwrap_or_else(impl_::PoisonError::into_inner);

        VectorWriteGuard(guard)
    }
}

impl<T> VectorReadGuard<'_, T> {
    #[inline]
    pub(crate) fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }
}

impl<T> VectorWriteGuard<'_, T> {
    #[inline]
    pub(crate) fn get(&mut self) -> &mut Option<T> {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_write_fails_while_read() {
        let lock = VectorLock::<u8>::new();
        *lock.write().get() = Some(1);

        let reader = lock.read();
        assert!(lock.try_write().is_none());
        assert!(lock.try_read().is_some_and(|guard| guard.get() == Some(&1)));
        drop(reader);

        let mut writer = lock.try_write().unwrap();
        *writer.get() = None;
        assert!(lock.try_read().is_none());
        drop(writer);

        assert!(lock.read().get().is_none());
    }
}
