//! A `no_std`, no-alloc record mirror for page-addressed NFC tags.
//!
//! This crate keeps an in-memory array of small fixed-size records in step
//! with the user memory of a tag that is read and written in 4-byte pages
//! (Mifare Ultralight / NTAG class).
//!
//! # Features
//!
//! - **Zero heap allocation** - record storage is a fixed-capacity array
//! - **Packed layout** - records straddle pages; partial pages are read-modify-written
//! - **Bounded retry** - bulk loads retry each record a configurable number of times
//! - **Verified writes** - write-then-read-back with byte-exact comparison
//! - **Dirty tracking** - application edits are queued for the next sync pass
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐         ┌──────────────────────────┐        ┌─────────┐
//! │   Application    │         │   RecordSync             │        │  Tag    │
//! │                  │         │                          │ pages  │         │
//! │  RecordView      │────────▶│  load_all / read_record  │◀──────▶│ 8 .. n  │
//! │  (marks dirty)   │  dirty  │  check_same              │        │         │
//! │                  │  bits   │  write_and_verify        │        └─────────┘
//! │                  │◀────────│  sync_dirty (clears)     │
//! └──────────────────┘         └──────────────────────────┘
//! ```
//!
//! The radio driver is supplied by the host through [`PageTransport`].
//!
//! # Example
//!
//! ```rust
//! use tag_mirror::prelude::*;
//!
//! // A tag that keeps its pages in RAM.
//! struct RamTag([Page; 32]);
//!
//! impl PageTransport for RamTag {
//!     fn detect_target(&mut self, _timeout_ms: u32) -> Option<Uid> {
//!         Uid::from_bytes(&[0x04, 1, 2, 3, 4, 5, 6])
//!     }
//!     fn read_page(&mut self, page: u16) -> Option<Page> {
//!         self.0.get(page as usize).copied()
//!     }
//!     fn write_page(&mut self, page: u16, data: &Page) -> bool {
//!         self.0.get_mut(page as usize).map(|p| *p = *data).is_some()
//!     }
//! }
//!
//! let mut sync = RecordSync::new(RamTag([[0; 4]; 32]), SyncConfig::default());
//! let mut mirror = DataCardMirror::<16>::init(20).unwrap();
//!
//! sync.load_all(&mut mirror).unwrap();
//! mirror.update_record(1, |r| r.aa = 0x10).unwrap();
//!
//! assert_eq!(sync.sync_dirty(&mut mirror), Ok(1));
//! assert_eq!(sync.check_same(&mirror, 1), Ok(CheckOutcome::Same));
//! ```
//!
//! [`PageTransport`]: mirror::PageTransport

#![deny(unsafe_code)]
#![no_std]

pub mod mirror;

pub mod prelude {
    pub use crate::mirror::prelude::*;
}
