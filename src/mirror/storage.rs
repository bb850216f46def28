use core::cell::RefCell;

use bitmaps::{Bits, BitsImpl};
use critical_section::Mutex;

use crate::mirror::{card::CardMirror, types::Record, view::RecordView};

/// A mirror shared between an application task and the sync task.
///
/// Access goes through a critical section, so both sides may run from
/// different interrupt priorities or executor tasks. Keep the closures
/// short: tag I/O inside [`SharedMirror::with_mirror`] holds the section
/// for its whole duration.
pub struct SharedMirror<R: Record, const N: usize>
where
    BitsImpl<N>: Bits,
{
    inner: Mutex<RefCell<CardMirror<R, N>>>,
}

impl<R: Record, const N: usize> core::fmt::Debug for SharedMirror<R, N>
where
    BitsImpl<N>: Bits,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharedMirror").finish_non_exhaustive()
    }
}

impl<R: Record, const N: usize> SharedMirror<R, N>
where
    BitsImpl<N>: Bits,
{
    pub const fn new(mirror: CardMirror<R, N>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(mirror)),
        }
    }

    /// Application access: writes through the view mark records dirty.
    pub fn with_view<T>(&self, f: impl FnOnce(&mut RecordView<'_, R, N>) -> T) -> T {
        critical_section::with(|cs| {
            let mut mirror = self.inner.borrow_ref_mut(cs);
            let mut view = RecordView::new(&mut mirror);
            f(&mut view)
        })
    }

    /// Sync access to the whole mirror, including identifier and dirty state.
    pub fn with_mirror<T>(&self, f: impl FnOnce(&mut CardMirror<R, N>) -> T) -> T {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    pub fn into_inner(self) -> CardMirror<R, N> {
        self.inner.into_inner().into_inner()
    }
}
