use core::alloc::Layout;

use thiserror::Error;

// -----------------------------------------------------------------------------
// Error

/// The global allocator could not provide memory for a new owned value.
///
/// Returned by the fallible constructors such as
/// [`ExclusiveRef::try_new`](crate::ExclusiveRef::try_new).
/// The infallible constructors treat the same condition as fatal.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error(
    "memory allocation of {} bytes (align {}) failed",
    .layout.size(),
    .layout.align()
)]
pub struct AllocError {
    layout: Layout,
}

impl AllocError {
    #[inline]
    pub(crate) const fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// The layout of the allocation that failed.
    #[inline]
    pub const fn layout(&self) -> Layout {
        self.layout
    }

    /// Escalate to the global allocation error handler.
    ///
    /// This never returns; by default the process aborts.
    #[cold]
    #[inline(never)]
    pub fn handle_error(&self) -> ! {
        alloc::alloc::handle_alloc_error(self.layout)
    }
}
