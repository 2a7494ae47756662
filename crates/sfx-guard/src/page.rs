//! Page size and page-aligned ranges.

use std::sync::OnceLock;

/// Used when the platform cannot report its page size.
pub const FALLBACK_PAGE_SIZE: usize = 4096;

/// The system page size in bytes. Read once, then cached.
pub fn page_size() -> usize {
    static PAGE_SIZE: OnceLock<usize> = OnceLock::new();
    *PAGE_SIZE.get_or_init(query_page_size)
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn query_page_size() -> usize {
    // SAFETY: sysconf has no memory-safety preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as usize
    } else {
        FALLBACK_PAGE_SIZE
    }
}

#[cfg(not(unix))]
fn query_page_size() -> usize {
    FALLBACK_PAGE_SIZE
}

/// A run of whole pages: `start` is page-aligned and `len` is a
/// non-zero multiple of the page size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRange {
    /// Address of the first page.
    pub start: usize,
    /// Length in bytes.
    pub len: usize,
}

impl PageRange {
    /// The whole pages inside `[addr, addr + size)`.
    ///
    /// The start is rounded up and the end rounded down to `page`
    /// boundaries, so partially covered pages are left out. Returns
    /// `None` when no full page remains. `page` must be a power of two.
    pub fn covering(addr: usize, size: usize, page: usize) -> Option<Self> {
        debug_assert!(page.is_power_of_two());
        let mask = page - 1;
        let start = addr.checked_add(mask)? & !mask;
        let end = addr.checked_add(size)? & !mask;
        if end <= start {
            return None;
        }
        Some(Self {
            start,
            len: end - start,
        })
    }

    /// Number of pages covered.
    pub fn pages(&self, page: usize) -> usize {
        self.len / page
    }

    /// One past the last byte.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}
