pub mod card;
pub mod config;
pub mod error;
pub mod helpers;
pub mod storage;
pub mod sync;
pub mod transport;
pub mod types;
pub mod view;

#[cfg(test)]
mod test_support;

pub use card::{CardMirror, DataCardMirror};
pub use config::{CHECK_TIMEOUT_MS, DATA_BASE_PAGE, IndexBound, MAX_ERROR_READING, SyncConfig};
pub use error::SyncError;
pub use helpers::{PageSlice, RecordPages};
pub use storage::SharedMirror;
pub use sync::RecordSync;
pub use transport::PageTransport;
pub use types::{
    CheckOutcome, DataRecord, MAX_RECORD_SIZE, MAX_UID_LEN, PAGE_SIZE, Page, Record, TargetKind,
    Uid,
};
pub use view::RecordView;

pub mod prelude {
    pub use super::{
        CardMirror, CheckOutcome, DataCardMirror, DataRecord, IndexBound, Page, PageTransport,
        Record, RecordSync, RecordView, SharedMirror, SyncConfig, SyncError, TargetKind, Uid,
    };
}
