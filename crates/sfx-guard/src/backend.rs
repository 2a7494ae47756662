//! Page-protection backends.
//!
//! The protector only talks to the [`PageProtection`] trait, so the
//! platform dependency lives here. [`SystemProtection`] picks the real
//! backend where one exists and [`NoProtection`] everywhere else.

use crate::error::ProtectionError;
use crate::page::{page_size, PageRange};

/// Changes the access rights of whole pages.
pub trait PageProtection {
    /// Page granularity of this backend. Must be a power of two.
    fn page_size(&self) -> usize;

    /// Make the pages read-only.
    fn protect_read_only(&self, range: PageRange) -> Result<(), ProtectionError>;

    /// Make the pages readable and writable again.
    fn restore_read_write(&self, range: PageRange) -> Result<(), ProtectionError>;
}

/// `mprotect(2)`-based protection.
#[cfg(unix)]
#[derive(Clone, Copy, Debug, Default)]
pub struct Mprotect;

#[cfg(unix)]
impl Mprotect {
    #[allow(unsafe_code)]
    fn apply(range: PageRange, prot: libc::c_int, op: &'static str) -> Result<(), ProtectionError> {
        // SAFETY: mprotect only changes page permissions. `range` is
        // page-aligned and lies inside memory the caller vouched for when
        // constructing the protector.
        let res = unsafe { libc::mprotect(range.start as *mut libc::c_void, range.len, prot) };
        if res != 0 {
            let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
            return Err(ProtectionError::Os { op, errno });
        }
        Ok(())
    }
}

#[cfg(unix)]
impl PageProtection for Mprotect {
    fn page_size(&self) -> usize {
        page_size()
    }

    fn protect_read_only(&self, range: PageRange) -> Result<(), ProtectionError> {
        Self::apply(range, libc::PROT_READ, "mprotect(PROT_READ)")
    }

    fn restore_read_write(&self, range: PageRange) -> Result<(), ProtectionError> {
        Self::apply(
            range,
            libc::PROT_READ | libc::PROT_WRITE,
            "mprotect(PROT_READ | PROT_WRITE)",
        )
    }
}

/// Fallback for platforms without page-level write protection.
///
/// Protecting always reports [`ProtectionError::Unsupported`]; restoring
/// is a successful no-op.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProtection;

impl PageProtection for NoProtection {
    fn page_size(&self) -> usize {
        page_size()
    }

    fn protect_read_only(&self, _range: PageRange) -> Result<(), ProtectionError> {
        Err(ProtectionError::Unsupported)
    }

    fn restore_read_write(&self, _range: PageRange) -> Result<(), ProtectionError> {
        Ok(())
    }
}

/// The backend used by [`MemoryProtector::protect`](crate::MemoryProtector::protect).
#[cfg(unix)]
pub type SystemProtection = Mprotect;

/// The backend used by [`MemoryProtector::protect`](crate::MemoryProtector::protect).
#[cfg(not(unix))]
pub type SystemProtection = NoProtection;
