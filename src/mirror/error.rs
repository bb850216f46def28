/// Errors that can occur while synchronizing a mirror with a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncError {
    /// Target detection timed out without finding a tag.
    NoTarget,
    /// The detected tag is not the page-addressable variant.
    UnsupportedCardType {
        /// Length of the identifier the tag reported.
        uid_len: usize,
    },
    /// The transport reported a failed page read.
    ReadFailed {
        /// Physical page that could not be read.
        page: u16,
    },
    /// The transport reported a failed page write.
    WriteFailed {
        /// Physical page that could not be written.
        page: u16,
    },
    /// Record index outside the mirror.
    IndexOutOfRange {
        /// Requested record index.
        index: usize,
        /// Number of records the mirror holds.
        count: usize,
    },
    /// Record index maps past the last page the transport can address.
    AddressOverflow {
        /// Record index that overflowed.
        index: usize,
    },
    /// Bulk load gave up after exhausting the retry budget.
    LoadFailed {
        /// Record index that kept failing.
        index: usize,
    },
    /// The mirror's record storage has already been released.
    AlreadyFreed,
    /// Requested capacity needs more record slots than the mirror provides.
    CapacityExceeded {
        /// Record count implied by the requested capacity.
        requested: usize,
        /// Record slots available in the mirror type.
        max: usize,
    },
}

impl core::fmt::Display for SyncError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SyncError::NoTarget => write!(f, "no target detected"),
            SyncError::UnsupportedCardType { uid_len } => {
                write!(f, "unsupported card type ({uid_len}-byte uid)")
            }
            SyncError::ReadFailed { page } => write!(f, "failed to read page {page}"),
            SyncError::WriteFailed { page } => write!(f, "failed to write page {page}"),
            SyncError::IndexOutOfRange { index, count } => {
                write!(f, "record index {index} out of range ({count} records)")
            }
            SyncError::AddressOverflow { index } => {
                write!(f, "record {index} lies beyond the addressable pages")
            }
            SyncError::LoadFailed { index } => {
                write!(f, "bulk load aborted at record {index}")
            }
            SyncError::AlreadyFreed => write!(f, "mirror storage already released"),
            SyncError::CapacityExceeded { requested, max } => {
                write!(f, "{requested} records requested, mirror holds at most {max}")
            }
        }
    }
}
