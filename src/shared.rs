//! Ownership hand-off from `main` to an interrupt handler.

use core::cell::RefCell;
use critical_section::Mutex;

/// A slot that `main` fills once setup is done and the interrupt handler borrows.
///
/// Meant for a `static`: `main` builds and initializes the application, then
/// [`install`](Self::install)s it; the handler reaches it through
/// [`with`](Self::with). Every access runs inside a critical section.
pub struct IrqShared<T> {
    inner: Mutex<RefCell<Option<T>>>,
}

impl<T> IrqShared<T> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Stores the value, returning any previous one.
    pub fn install(&self, value: T) -> Option<T> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).replace(value))
    }

    /// Runs `f` on the stored value. Returns `None` if nothing is installed.
    pub fn with<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> Option<R> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).as_mut().map(f))
    }

    /// Removes and returns the stored value.
    pub fn take(&self) -> Option<T> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).take())
    }

    pub fn is_installed(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow_ref(cs).is_some())
    }
}

impl<T> Default for IrqShared<T> {
    fn default() -> Self {
        Self::new()
    }
}
