//! Interior mutability for the in-memory collaborators.

#[cfg(feature = "std")]
type Lock<T> = std::sync::Mutex<T>;

#[cfg(all(not(feature = "std"), feature = "alloc"))]
type Lock<T> = spin::Mutex<T>;

/// State shared behind `&self`, usable from both `std` and `no_std` builds.
#[derive(Debug, Default)]
pub struct Shared<T>(Lock<T>);

impl<T> Shared<T> {
    pub const fn new(value: T) -> Self {
        Self(Lock::new(value))
    }

    /// Runs `f` with exclusive access to the value, recovering a poisoned
    /// lock.
    #[cfg(feature = "std")]
    pub fn with<U>(&self, f: impl FnOnce(&mut T) -> U) -> U {
        let mut guard = self
            .0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut *guard)
    }

    /// Runs `f` with exclusive access to the value.
    #[cfg(all(not(feature = "std"), feature = "alloc"))]
    pub fn with<U>(&self, f: impl FnOnce(&mut T) -> U) -> U {
        f(&mut *self.0.lock())
    }
}
