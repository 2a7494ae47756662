//! Scoped read-only protection of a memory block.
//!
//! [`MemoryProtector`] marks the whole pages inside a block read-only
//! and restores read-write access when dropped. It is best effort:
//!
//! - a block that covers less than one full page is left alone
//!   ([`ProtectionStatus::TooSmall`], not an error);
//! - if the backend refuses, the failure is logged once and the guard
//!   behaves as a no-op ([`ProtectionStatus::Unavailable`]);
//! - on drop, read-write access is restored on the computed page range
//!   whether or not protecting succeeded.
//!
//! Page permissions are process-wide. A write from any thread into a
//! protected page faults, so keep this to debug and test builds.

use std::fmt;
use std::marker::PhantomData;

use tracing::{trace, warn};

use crate::backend::{PageProtection, SystemProtection};
use crate::error::ProtectionError;
use crate::page::PageRange;

/// What a [`MemoryProtector`] actually did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProtectionStatus {
    /// The pages are read-only until the guard drops.
    Applied,
    /// The block covers less than one full page. Nothing was done.
    TooSmall,
    /// Protection was switched off by configuration.
    Disabled,
    /// The backend refused. Nothing is protected.
    Unavailable(ProtectionError),
}

impl fmt::Display for ProtectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied => write!(f, "applied"),
            Self::TooSmall => write!(f, "too small to protect"),
            Self::Disabled => write!(f, "disabled"),
            Self::Unavailable(e) => write!(f, "unavailable: {e}"),
        }
    }
}

/// Keeps the whole pages of a block read-only for its lifetime.
///
/// Holds the block's borrow for `'a`, so safe code cannot write to it
/// while the guard lives. The guard is neither `Send` nor `Sync`: the
/// thread that protected the pages is the one that restores them.
#[must_use = "protection is lifted as soon as the guard is dropped"]
pub struct MemoryProtector<'a, B: PageProtection = SystemProtection> {
    backend: B,
    region: Option<PageRange>,
    status: ProtectionStatus,
    _block: PhantomData<&'a [u8]>,
    _not_send: PhantomData<*const u8>,
}

impl<'a> MemoryProtector<'a> {
    /// Protect the whole pages of `block` with the system backend.
    pub fn protect(block: &'a [u8]) -> Self {
        Self::with_backend(SystemProtection::default(), block)
    }

    /// Protect the whole pages of a raw block with the system backend.
    ///
    /// # Safety
    ///
    /// `[ptr, ptr + size)` must be memory this process owns and keeps
    /// mapped for `'a`. No code may rely on writing to its whole pages
    /// until the guard drops; such writes fault. When the guard drops,
    /// those pages become read-write even if they were read-only before.
    #[allow(unsafe_code)]
    pub unsafe fn from_raw_parts(ptr: *const u8, size: usize) -> Self {
        Self::engage(SystemProtection::default(), ptr as usize, size)
    }

    /// A guard that protects nothing.
    pub fn disabled() -> Self {
        Self {
            backend: SystemProtection::default(),
            region: None,
            status: ProtectionStatus::Disabled,
            _block: PhantomData,
            _not_send: PhantomData,
        }
    }
}

impl<'a, B: PageProtection> MemoryProtector<'a, B> {
    /// Protect the whole pages of `block` with an explicit backend.
    pub fn with_backend(backend: B, block: &'a [u8]) -> Self {
        Self::engage(backend, block.as_ptr() as usize, block.len())
    }

    fn engage(backend: B, addr: usize, size: usize) -> Self {
        let page = backend.page_size();
        let Some(region) = PageRange::covering(addr, size, page) else {
            trace!(addr, size, page, "block smaller than a page, not protecting");
            return Self {
                backend,
                region: None,
                status: ProtectionStatus::TooSmall,
                _block: PhantomData,
                _not_send: PhantomData,
            };
        };

        let status = match backend.protect_read_only(region) {
            Ok(()) => {
                trace!(
                    start = region.start,
                    len = region.len,
                    "pages protected read-only"
                );
                ProtectionStatus::Applied
            }
            Err(e) => {
                warn!(
                    error = %e,
                    start = region.start,
                    len = region.len,
                    "page protection unavailable, continuing unprotected"
                );
                ProtectionStatus::Unavailable(e)
            }
        };

        Self {
            backend,
            region: Some(region),
            status,
            _block: PhantomData,
            _not_send: PhantomData,
        }
    }

    /// What the guard did.
    pub fn status(&self) -> &ProtectionStatus {
        &self.status
    }

    /// Whether the pages are currently read-only.
    pub fn is_active(&self) -> bool {
        self.status == ProtectionStatus::Applied
    }

    /// The page-rounded range the guard covers, if the block spans at
    /// least one whole page.
    pub fn region(&self) -> Option<PageRange> {
        self.region
    }
}

impl<B: PageProtection> Drop for MemoryProtector<'_, B> {
    fn drop(&mut self) {
        let Some(region) = self.region else {
            return;
        };
        match self.backend.restore_read_write(region) {
            Ok(()) => trace!(start = region.start, len = region.len, "pages writable again"),
            // A failed protect has already been reported.
            Err(e) if self.status == ProtectionStatus::Applied => warn!(
                error = %e,
                start = region.start,
                len = region.len,
                "failed to restore write access"
            ),
            Err(_) => {}
        }
    }
}

impl<B: PageProtection> fmt::Debug for MemoryProtector<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryProtector")
            .field("region", &self.region)
            .field("status", &self.status)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const PAGE: usize = 4096;

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        Protect(PageRange),
        Restore(PageRange),
    }

    /// Records calls; optionally fails every protect.
    #[derive(Clone, Default)]
    struct Recording {
        calls: Rc<RefCell<Vec<Call>>>,
        fail: bool,
    }

    impl PageProtection for Recording {
        fn page_size(&self) -> usize {
            PAGE
        }

        fn protect_read_only(&self, range: PageRange) -> Result<(), ProtectionError> {
            self.calls.borrow_mut().push(Call::Protect(range));
            if self.fail {
                Err(ProtectionError::Os {
                    op: "mprotect(PROT_READ)",
                    errno: 13,
                })
            } else {
                Ok(())
            }
        }

        fn restore_read_write(&self, range: PageRange) -> Result<(), ProtectionError> {
            self.calls.borrow_mut().push(Call::Restore(range));
            Ok(())
        }
    }

    /// Fake page-aligned address; the recording backend never touches it.
    fn block(base_pages: usize, offset: usize, size: usize) -> (usize, usize) {
        (base_pages * PAGE + offset, size)
    }

    #[test]
    fn applies_and_restores_on_drop() {
        let backend = Recording::default();
        let calls = Rc::clone(&backend.calls);
        let (addr, size) = block(4, 0, 3 * PAGE);
        let expected = PageRange {
            start: 4 * PAGE,
            len: 3 * PAGE,
        };
        {
            let guard = MemoryProtector::engage(backend, addr, size);
            assert!(guard.is_active());
            assert_eq!(guard.region(), Some(expected));
            assert_eq!(*calls.borrow(), vec![Call::Protect(expected)]);
        }
        assert_eq!(
            *calls.borrow(),
            vec![Call::Protect(expected), Call::Restore(expected)]
        );
    }

    #[test]
    fn rounds_inward() {
        let backend = Recording::default();
        let (addr, size) = block(4, 10, 3 * PAGE);
        let guard = MemoryProtector::engage(backend, addr, size);
        assert_eq!(
            guard.region(),
            Some(PageRange {
                start: 5 * PAGE,
                len: 2 * PAGE
            })
        );
    }

    #[test]
    fn too_small_is_a_silent_no_op() {
        let backend = Recording::default();
        let calls = Rc::clone(&backend.calls);
        let (addr, size) = block(4, 100, PAGE);
        {
            let guard = MemoryProtector::engage(backend, addr, size);
            assert_eq!(guard.status(), &ProtectionStatus::TooSmall);
            assert!(!guard.is_active());
            assert_eq!(guard.region(), None);
        }
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn backend_failure_degrades_but_still_restores() {
        let backend = Recording {
            fail: true,
            ..Recording::default()
        };
        let calls = Rc::clone(&backend.calls);
        let (addr, size) = block(2, 0, 2 * PAGE);
        {
            let guard = MemoryProtector::engage(backend, addr, size);
            assert!(!guard.is_active());
            assert!(matches!(
                guard.status(),
                ProtectionStatus::Unavailable(ProtectionError::Os { errno: 13, .. })
            ));
        }
        assert_eq!(calls.borrow().len(), 2);
        assert!(matches!(calls.borrow()[1], Call::Restore(_)));
    }

    #[test]
    fn restores_on_unwind() {
        let backend = Recording::default();
        let calls = Rc::clone(&backend.calls);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = MemoryProtector::engage(backend, 8 * PAGE, PAGE);
            panic!("stage failed");
        }));
        assert!(result.is_err());
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn disabled_guard_does_nothing() {
        let guard = MemoryProtector::disabled();
        assert_eq!(guard.status(), &ProtectionStatus::Disabled);
        assert_eq!(guard.region(), None);
    }

    #[test]
    fn no_protection_backend_reports_unsupported() {
        let buf = vec![0u8; 4 * PAGE];
        let guard = MemoryProtector::with_backend(crate::backend::NoProtection, &buf);
        // Large system pages may leave no whole page inside the Vec.
        if guard.region().is_some() {
            assert_eq!(
                guard.status(),
                &ProtectionStatus::Unavailable(ProtectionError::Unsupported)
            );
        } else {
            assert_eq!(guard.status(), &ProtectionStatus::TooSmall);
        }
    }

    #[test]
    fn status_display() {
        assert_eq!(ProtectionStatus::Applied.to_string(), "applied");
        assert_eq!(
            ProtectionStatus::Unavailable(ProtectionError::Unsupported).to_string(),
            "unavailable: page protection is not supported on this platform"
        );
    }
}
