//! Record-to-page address translation.
//!
//! Records are packed back to back starting at the first byte of the data
//! base page, so record `i` occupies physical bytes
//! `base_page * PAGE_SIZE + i * record_size ..` and may straddle pages.
//! These helpers are pure; callers bound-check the record index first or go
//! through [`try_record_pages`].

use crate::mirror::{
    error::SyncError,
    types::{PAGE_SIZE, Page},
};

/// Returns the physical page holding the first byte of record `index`.
///
/// # Example
/// ```
/// use tag_mirror::mirror::helpers::start_page;
///
/// // 5-byte records after 8 reserved pages
/// assert_eq!(start_page(0, 5, 8), 8);
/// assert_eq!(start_page(1, 5, 8), 9);
/// assert_eq!(start_page(4, 5, 8), 13);
/// ```
#[inline]
pub const fn start_page(index: usize, record_size: usize, base_page: usize) -> usize {
    base_page + (index * record_size) / PAGE_SIZE
}

/// Returns the byte offset of record `index` inside its first page.
#[inline]
pub const fn start_offset(index: usize, record_size: usize) -> usize {
    (index * record_size) % PAGE_SIZE
}

/// Returns how many pages record `index` touches.
#[inline]
pub const fn page_count(index: usize, record_size: usize) -> usize {
    (start_offset(index, record_size) + record_size).div_ceil(PAGE_SIZE)
}

/// The part of one page that belongs to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice {
    /// Physical page index.
    pub page: usize,
    /// First byte inside the page.
    pub page_offset: usize,
    /// First byte inside the record.
    pub record_offset: usize,
    /// Number of bytes shared by page and record.
    pub len: usize,
}

impl PageSlice {
    /// Returns true if the record owns every byte of this page.
    #[inline]
    pub fn covers_page(&self) -> bool {
        self.page_offset == 0 && self.len == PAGE_SIZE
    }

    /// Copies this slice's bytes from `page` into `record`.
    pub fn gather(&self, page: &Page, record: &mut [u8]) {
        record[self.record_offset..self.record_offset + self.len]
            .copy_from_slice(&page[self.page_offset..self.page_offset + self.len]);
    }

    /// Copies this slice's bytes from `record` into `page`, leaving the rest of the page alone.
    pub fn scatter(&self, record: &[u8], page: &mut Page) {
        page[self.page_offset..self.page_offset + self.len]
            .copy_from_slice(&record[self.record_offset..self.record_offset + self.len]);
    }
}

/// Iterator over the ordered page slices making up one record.
///
/// Concatenating the slices in order reconstructs the record.
#[derive(Debug, Clone)]
pub struct RecordPages {
    page: usize,
    page_offset: usize,
    record_offset: usize,
    record_size: usize,
}

impl Iterator for RecordPages {
    type Item = PageSlice;

    fn next(&mut self) -> Option<PageSlice> {
        if self.record_offset >= self.record_size {
            return None;
        }

        let len = (PAGE_SIZE - self.page_offset).min(self.record_size - self.record_offset);
        let slice = PageSlice {
            page: self.page,
            page_offset: self.page_offset,
            record_offset: self.record_offset,
            len,
        };

        self.page += 1;
        self.page_offset = 0;
        self.record_offset += len;
        Some(slice)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining =
            (self.page_offset + self.record_size - self.record_offset).div_ceil(PAGE_SIZE);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RecordPages {}

/// Enumerates the pages spanned by record `index`.
///
/// # Example
/// ```
/// use tag_mirror::mirror::helpers::record_pages;
///
/// // Record 1 of a 5-byte layout starts at page 9, offset 1
/// let slices: Vec<_> = record_pages(1, 5, 8).map(|s| (s.page, s.page_offset, s.len)).collect();
/// assert_eq!(slices, [(9, 1, 3), (10, 0, 2)]);
/// ```
pub fn record_pages(index: usize, record_size: usize, base_page: usize) -> RecordPages {
    RecordPages {
        page: start_page(index, record_size, base_page),
        page_offset: start_offset(index, record_size),
        record_offset: 0,
        record_size,
    }
}

/// Enumerates the pages spanned by record `index`, checking the arithmetic.
///
/// Returns [`SyncError::AddressOverflow`] if any page of the record lies
/// beyond `usize`. Use this for indices that come from outside the mirror.
///
/// # Example
/// ```
/// use tag_mirror::mirror::{SyncError, helpers::try_record_pages};
///
/// assert_eq!(try_record_pages(3, 5, 8).unwrap().len(), 2);
/// assert_eq!(
///     try_record_pages(usize::MAX / 2, 5, 8).unwrap_err(),
///     SyncError::AddressOverflow { index: usize::MAX / 2 }
/// );
/// ```
pub fn try_record_pages(
    index: usize,
    record_size: usize,
    base_page: usize,
) -> Result<RecordPages, SyncError> {
    let offset = index
        .checked_mul(record_size)
        .ok_or(SyncError::AddressOverflow { index })?;
    let end = offset
        .checked_add(record_size)
        .ok_or(SyncError::AddressOverflow { index })?;
    // one past the last page must be representable; the iterator steps onto it
    base_page
        .checked_add(end.div_ceil(PAGE_SIZE))
        .ok_or(SyncError::AddressOverflow { index })?;

    Ok(record_pages(index, record_size, base_page))
}
