//! Page-aligned, zero-initialised backing memory.

use std::alloc::{self, Layout};
use std::fmt;
use std::ptr::NonNull;

use crate::error::ArenaError;
use crate::page::page_size;

/// An owned block of zeroed memory whose start is page-aligned and whose
/// capacity is a whole number of pages.
///
/// Page alignment means a buffer at a page-aligned offset inside the
/// region starts on a page boundary, which is what lets a
/// [`MemoryProtector`](crate::MemoryProtector) cover it exactly.
pub struct AlignedRegion {
    ptr: NonNull<u8>,
    len: usize,
    layout: Layout,
}

impl AlignedRegion {
    /// Allocate `len` usable bytes, rounded up to at least one page.
    pub fn new(len: usize) -> Result<Self, ArenaError> {
        let page = page_size();
        let capacity = len
            .max(1)
            .checked_next_multiple_of(page)
            .ok_or(ArenaError::Allocation { bytes: len })?;
        let layout = Layout::from_size_align(capacity, page)
            .map_err(|_| ArenaError::Allocation { bytes: len })?;
        let ptr = Self::alloc(layout).ok_or(ArenaError::Allocation { bytes: capacity })?;
        Ok(Self { ptr, len, layout })
    }

    #[allow(unsafe_code)]
    fn alloc(layout: Layout) -> Option<NonNull<u8>> {
        // SAFETY: `layout` has a non-zero size (at least one page).
        NonNull::new(unsafe { alloc::alloc_zeroed(layout) })
    }

    /// The usable bytes.
    #[allow(unsafe_code)]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `ptr` is valid for `layout.size() >= len` initialised
        // (zeroed) bytes for as long as `self` lives.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// The usable bytes, mutably.
    #[allow(unsafe_code)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as in `as_slice`; `&mut self` guarantees exclusivity.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Start of the region. Page-aligned.
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Start of the region, for writing.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Usable bytes, as requested.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether zero bytes were requested.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated bytes: `len` rounded up to whole pages.
    pub fn capacity(&self) -> usize {
        self.layout.size()
    }
}

impl Drop for AlignedRegion {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        // SAFETY: `ptr` came from `alloc_zeroed` with exactly `layout`
        // and is freed only here.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

// SAFETY: the region uniquely owns its allocation, like a `Box<[u8]>`.
#[allow(unsafe_code)]
unsafe impl Send for AlignedRegion {}

// SAFETY: shared access only hands out `&[u8]`.
#[allow(unsafe_code)]
unsafe impl Sync for AlignedRegion {}

impl fmt::Debug for AlignedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedRegion")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}
