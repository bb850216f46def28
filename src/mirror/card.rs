use bitmaps::{Bitmap, Bits, BitsImpl};

use crate::mirror::{
    error::SyncError,
    types::{DataRecord, LayoutCheck, Record, Uid},
};

/// In-memory copy of every record on a tag plus the tag's identifier.
///
/// The record count is derived from the tag capacity at [`CardMirror::init`]
/// and bounded by the const generic `N`. Application writes mark records
/// dirty; records stored by a bulk load do not.
pub struct CardMirror<R: Record, const N: usize>
where
    BitsImpl<N>: Bits,
{
    capacity: usize,
    record_count: usize,
    records: Option<heapless::Vec<R, N>>,
    dirty: Bitmap<N>,
    uid: Uid,
}

/// Mirror of the stock five-byte record layout.
pub type DataCardMirror<const N: usize> = CardMirror<DataRecord, N>;

impl<R: Record, const N: usize> core::fmt::Debug for CardMirror<R, N>
where
    BitsImpl<N>: Bits,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CardMirror")
            .field("capacity", &self.capacity)
            .field("record_count", &self.record_count)
            .field("uid", &self.uid)
            .field("released", &self.records.is_none())
            .finish_non_exhaustive()
    }
}

impl<R: Record, const N: usize> CardMirror<R, N>
where
    BitsImpl<N>: Bits,
{
    /// Creates a mirror for a tag with `capacity` data bytes.
    ///
    /// Holds `capacity / R::SIZE` default-initialized records and an empty UID.
    pub fn init(capacity: usize) -> Result<Self, SyncError> {
        let () = LayoutCheck::<R>::VALID;
        let record_count = capacity / R::SIZE;
        if record_count > N {
            return Err(SyncError::CapacityExceeded {
                requested: record_count,
                max: N,
            });
        }

        let mut records = heapless::Vec::new();
        for _ in 0..record_count {
            records.push(R::default()).map_err(|_| SyncError::CapacityExceeded {
                requested: record_count,
                max: N,
            })?;
        }

        Ok(Self {
            capacity,
            record_count,
            records: Some(records),
            dirty: Bitmap::new(),
            uid: Uid::default(),
        })
    }

    /// Data bytes available on the tag.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of whole records that fit in the capacity.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    pub fn set_uid(&mut self, uid: Uid) {
        log::trace!("mirror uid set to {uid}");
        self.uid = uid;
    }

    /// Returns true once [`CardMirror::deallocate`] has released the records.
    pub fn is_released(&self) -> bool {
        self.records.is_none()
    }

    pub fn records(&self) -> Result<&[R], SyncError> {
        Ok(self.slots()?.as_slice())
    }

    pub fn record(&self, index: usize) -> Result<&R, SyncError> {
        let count = self.record_count;
        self.slots()?
            .get(index)
            .ok_or(SyncError::IndexOutOfRange { index, count })
    }

    /// Replaces a record and marks it dirty.
    pub fn set_record(&mut self, index: usize, record: R) -> Result<(), SyncError> {
        self.update_record(index, |slot| *slot = record)
    }

    /// Mutates a record in place and marks it dirty.
    pub fn update_record<F, T>(&mut self, index: usize, f: F) -> Result<T, SyncError>
    where
        F: FnOnce(&mut R) -> T,
    {
        let out = f(self.slot_mut(index)?);
        self.dirty.set(index, true);
        Ok(out)
    }

    /// Stores a record read from the tag without marking it dirty.
    pub(crate) fn store_loaded(&mut self, index: usize, record: R) -> Result<(), SyncError> {
        *self.slot_mut(index)? = record;
        self.dirty.set(index, false);
        Ok(())
    }

    /// Returns true if the record was changed since it was last synced.
    pub fn is_dirty(&self, index: usize) -> bool {
        index < self.record_count && self.dirty.get(index)
    }

    pub fn any_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Iterates over the indices of dirty records in ascending order.
    pub fn dirty_indices(&self) -> impl Iterator<Item = usize> + '_ {
        core::iter::successors(self.dirty.first_index(), |&i| self.dirty.next_index(i))
    }

    pub fn mark_clean(&mut self, index: usize) {
        if index < self.record_count {
            self.dirty.set(index, false);
        }
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = Bitmap::new();
    }

    /// Releases the record storage.
    ///
    /// A second call reports [`SyncError::AlreadyFreed`] and leaves the mirror untouched.
    pub fn deallocate(&mut self) -> Result<(), SyncError> {
        if self.records.take().is_none() {
            log::debug!("mirror records already released");
            return Err(SyncError::AlreadyFreed);
        }
        self.dirty = Bitmap::new();
        log::trace!("mirror records released");
        Ok(())
    }

    fn slots(&self) -> Result<&heapless::Vec<R, N>, SyncError> {
        self.records.as_ref().ok_or(SyncError::AlreadyFreed)
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut R, SyncError> {
        let count = self.record_count;
        self.records
            .as_mut()
            .ok_or(SyncError::AlreadyFreed)?
            .get_mut(index)
            .ok_or(SyncError::IndexOutOfRange { index, count })
    }
}

impl<R: Record + core::fmt::Display, const N: usize> CardMirror<R, N>
where
    BitsImpl<N>: Bits,
{
    /// Logs every record at info level.
    pub fn log_contents(&self) {
        match self.records() {
            Ok(records) => {
                log::info!("card {} ({} records)", self.uid, records.len());
                for (i, record) in records.iter().enumerate() {
                    log::info!("record {i}: {record}");
                }
            }
            Err(_) => log::info!("card {} released", self.uid),
        }
    }
}
