use bitmaps::{Bits, BitsImpl};

use crate::mirror::{card::CardMirror, error::SyncError, types::Record};

/// Application-side view of a mirror.
///
/// Every write through this view marks the record dirty so the sync side
/// picks it up. Identifier and dirty state are read-only here.
pub struct RecordView<'a, R: Record, const N: usize>
where
    BitsImpl<N>: Bits,
{
    mirror: &'a mut CardMirror<R, N>,
}

impl<'a, R: Record, const N: usize> core::fmt::Debug for RecordView<'a, R, N>
where
    BitsImpl<N>: Bits,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecordView").finish_non_exhaustive()
    }
}

impl<'a, R: Record, const N: usize> RecordView<'a, R, N>
where
    BitsImpl<N>: Bits,
{
    pub(crate) fn new(mirror: &'a mut CardMirror<R, N>) -> Self {
        Self { mirror }
    }

    pub fn record_count(&self) -> usize {
        self.mirror.record_count()
    }

    /// Returns a copy of the record at `index`.
    pub fn get(&self, index: usize) -> Result<R, SyncError> {
        self.mirror.record(index).copied()
    }

    /// Replaces the record at `index`, marking it dirty.
    pub fn set(&mut self, index: usize, record: R) -> Result<(), SyncError> {
        self.mirror.set_record(index, record)
    }

    /// Mutates the record at `index` in place, marking it dirty.
    pub fn update<F, T>(&mut self, index: usize, f: F) -> Result<T, SyncError>
    where
        F: FnOnce(&mut R) -> T,
    {
        self.mirror.update_record(index, f)
    }

    /// Returns true if the record still waits to be written to the tag.
    pub fn is_pending(&self, index: usize) -> bool {
        self.mirror.is_dirty(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::{test_support::TestMirror, types::DataRecord};

    #[test]
    fn writes_through_view_mark_dirty() {
        let mut mirror = TestMirror::init(20).unwrap();
        {
            let mut view = RecordView::new(&mut mirror);
            assert_eq!(view.record_count(), 4);
            view.set(0, DataRecord::new(1, 0, 0, 0, 0)).unwrap();
            let before = view.update(2, |r| {
                let old = r.ee;
                r.ee = 0x7F;
                old
            });
            assert_eq!(before, Ok(0));
            assert!(view.is_pending(0));
            assert!(!view.is_pending(1));
            assert_eq!(view.get(2).unwrap().ee, 0x7F);
        }
        assert!(mirror.is_dirty(0));
        assert!(mirror.is_dirty(2));
    }

    #[test]
    fn reads_do_not_mark_dirty() {
        let mut mirror = TestMirror::init(20).unwrap();
        let view = RecordView::new(&mut mirror);
        view.get(1).unwrap();
        assert_eq!(
            view.get(4).unwrap_err(),
            SyncError::IndexOutOfRange { index: 4, count: 4 }
        );
        assert!(!mirror.any_dirty());
    }
}
