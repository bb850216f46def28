use bitmaps::{Bits, BitsImpl};

use crate::mirror::{
    card::CardMirror,
    config::SyncConfig,
    error::SyncError,
    helpers::try_record_pages,
    transport::PageTransport,
    types::{CheckOutcome, PAGE_SIZE, Page, Record, Uid, encode, scratch},
};

/// Moves records between a [`CardMirror`] and a tag.
///
/// Owns the transport handle for the session; every operation is
/// synchronous and blocks on target detection.
pub struct RecordSync<T: PageTransport> {
    transport: T,
    config: SyncConfig,
}

impl<T: PageTransport> core::fmt::Debug for RecordSync<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecordSync")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T: PageTransport> RecordSync<T> {
    pub fn new(transport: T, config: SyncConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Probes for a tag using the short presence timeout.
    pub fn is_target_present(&mut self) -> bool {
        let present = self
            .transport
            .detect_target(self.config.check_timeout_ms)
            .is_some();
        log::trace!("target present: {present}");
        present
    }

    /// Detects a tag and returns its identifier, whatever its kind.
    pub fn read_uid(&mut self) -> Result<Uid, SyncError> {
        let uid = self
            .transport
            .detect_target(self.config.detect_timeout_ms)
            .ok_or(SyncError::NoTarget)?;
        log::debug!("uid {uid} ({} bytes)", uid.len());
        Ok(uid)
    }

    /// Reads record `index` straight from the tag.
    ///
    /// The mirror is not touched. An index whose pages cannot be addressed
    /// fails with [`SyncError::AddressOverflow`] before the tag is contacted.
    pub fn read_record<R: Record>(&mut self, index: usize) -> Result<R, SyncError> {
        let pages = try_record_pages(index, R::SIZE, self.base_page())?;
        self.detect_page_target()?;

        let mut buf = scratch::<R>();
        let record = &mut buf[..R::SIZE];
        for slice in pages {
            let page = page_number(index, slice.page)?;
            let data = self
                .transport
                .read_page(page)
                .ok_or(SyncError::ReadFailed { page })?;
            log::trace!("read page {page}: {data:02x?}");
            slice.gather(&data, record);
        }

        Ok(R::from_bytes(record))
    }

    /// Fills the mirror with the tag's identifier and every record.
    ///
    /// A failing record is retried in place; after
    /// `max_error_reading` consecutive failures the load
    /// stops with [`SyncError::LoadFailed`] and later records stay as they were.
    pub fn load_all<R: Record, const N: usize>(
        &mut self,
        mirror: &mut CardMirror<R, N>,
    ) -> Result<(), SyncError>
    where
        BitsImpl<N>: Bits,
    {
        if mirror.is_released() {
            return Err(SyncError::AlreadyFreed);
        }

        let uid = self.read_uid()?;
        mirror.set_uid(uid);

        let count = mirror.record_count();
        log::debug!("loading {count} records");

        let mut errors = 0;
        let mut index = 0;
        while index < count {
            match self.read_record::<R>(index) {
                Ok(record) => {
                    mirror.store_loaded(index, record)?;
                    errors = 0;
                    index += 1;
                }
                Err(err) => {
                    errors += 1;
                    if errors >= self.config.max_error_reading {
                        log::error!("record {index}: giving up after {errors} failed reads ({err})");
                        return Err(SyncError::LoadFailed { index });
                    }
                    log::warn!("record {index}: read attempt {errors} failed ({err}), retrying");
                }
            }
        }

        log::debug!("loaded {count} records from {}", mirror.uid());
        Ok(())
    }

    /// Compares mirrored record `index` with the tag, byte for byte.
    pub fn check_same<R: Record, const N: usize>(
        &mut self,
        mirror: &CardMirror<R, N>,
        index: usize,
    ) -> Result<CheckOutcome, SyncError>
    where
        BitsImpl<N>: Bits,
    {
        self.admit(mirror, index)?;

        let tag = encode(&self.read_record::<R>(index)?);
        let held = encode(mirror.record(index)?);

        let outcome = CheckOutcome::compare(&held[..R::SIZE], &tag[..R::SIZE]);
        if let CheckOutcome::Differs {
            position,
            mirror,
            tag,
        } = outcome
        {
            log::debug!(
                "record {index} differs at byte {position}: mirror {mirror:02x}, tag {tag:02x}"
            );
        }
        Ok(outcome)
    }

    /// Writes mirrored record `index` to the tag.
    ///
    /// Pages the record only partly covers are read first so neighbouring
    /// records on the same page keep their bytes.
    pub fn write_record<R: Record, const N: usize>(
        &mut self,
        mirror: &CardMirror<R, N>,
        index: usize,
    ) -> Result<(), SyncError>
    where
        BitsImpl<N>: Bits,
    {
        self.admit(mirror, index)?;

        let buf = encode(mirror.record(index)?);
        let record = &buf[..R::SIZE];

        for slice in try_record_pages(index, R::SIZE, self.base_page())? {
            let page = page_number(index, slice.page)?;
            self.detect_page_target()?;

            let mut data: Page = if slice.covers_page() {
                [0; PAGE_SIZE]
            } else {
                self.transport
                    .read_page(page)
                    .ok_or(SyncError::ReadFailed { page })?
            };
            slice.scatter(record, &mut data);

            if !self.transport.write_page(page, &data) {
                log::warn!("record {index}: write of page {page} rejected");
                return Err(SyncError::WriteFailed { page });
            }
            log::trace!("wrote page {page}: {data:02x?}");
        }

        log::debug!("record {index} written");
        Ok(())
    }

    /// Writes record `index`, then reads it back and compares.
    ///
    /// [`CheckOutcome::Same`] means the tag was observed holding the new bytes.
    pub fn write_and_verify<R: Record, const N: usize>(
        &mut self,
        mirror: &CardMirror<R, N>,
        index: usize,
    ) -> Result<CheckOutcome, SyncError>
    where
        BitsImpl<N>: Bits,
    {
        self.write_record(mirror, index)?;
        let outcome = self.check_same(mirror, index)?;
        if outcome.is_same() {
            log::debug!("record {index} verified");
        } else {
            log::warn!("record {index} still differs after write");
        }
        Ok(outcome)
    }

    /// Brings record `index` on the tag in line with the mirror.
    ///
    /// Writes only when the tag differs. On success the record is marked clean.
    pub fn reconcile<R: Record, const N: usize>(
        &mut self,
        mirror: &mut CardMirror<R, N>,
        index: usize,
    ) -> Result<CheckOutcome, SyncError>
    where
        BitsImpl<N>: Bits,
    {
        let outcome = match self.check_same(mirror, index)? {
            CheckOutcome::Same => CheckOutcome::Same,
            CheckOutcome::Differs { .. } => {
                log::debug!("record {index} out of sync, rewriting");
                self.write_and_verify(mirror, index)?
            }
        };
        if outcome.is_same() {
            mirror.mark_clean(index);
        }
        Ok(outcome)
    }

    /// Writes and verifies every dirty record, returning how many were confirmed.
    ///
    /// Verified records are marked clean. A record that still differs after
    /// its write stays dirty for the next pass; transport errors abort the pass.
    pub fn sync_dirty<R: Record, const N: usize>(
        &mut self,
        mirror: &mut CardMirror<R, N>,
    ) -> Result<usize, SyncError>
    where
        BitsImpl<N>: Bits,
    {
        if mirror.is_released() {
            return Err(SyncError::AlreadyFreed);
        }

        let mut synced = 0;
        let mut cursor = 0;
        loop {
            let Some(index) = mirror.dirty_indices().find(|&i| i >= cursor) else {
                break;
            };
            cursor = index + 1;
            if self.write_and_verify(mirror, index)?.is_same() {
                mirror.mark_clean(index);
                synced += 1;
            }
        }
        Ok(synced)
    }

    fn base_page(&self) -> usize {
        usize::from(self.config.data_base_page)
    }

    fn admit<R: Record, const N: usize>(
        &self,
        mirror: &CardMirror<R, N>,
        index: usize,
    ) -> Result<(), SyncError>
    where
        BitsImpl<N>: Bits,
    {
        if mirror.is_released() {
            return Err(SyncError::AlreadyFreed);
        }
        let count = mirror.record_count();
        if !self.config.index_bound.admits(index, count) {
            return Err(SyncError::IndexOutOfRange { index, count });
        }
        Ok(())
    }

    fn detect_page_target(&mut self) -> Result<Uid, SyncError> {
        let uid = self
            .transport
            .detect_target(self.config.detect_timeout_ms)
            .ok_or(SyncError::NoTarget)?;
        if !uid.kind().is_page_addressable() {
            log::debug!("uid {uid}: {:?} tag is not page addressable", uid.kind());
            return Err(SyncError::UnsupportedCardType { uid_len: uid.len() });
        }
        Ok(uid)
    }
}

fn page_number(index: usize, page: usize) -> Result<u16, SyncError> {
    u16::try_from(page).map_err(|_| SyncError::AddressOverflow { index })
}
