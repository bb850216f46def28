//! Sync loop example: a periodic task keeping one record in step with a tag
//!
//! This example demonstrates:
//! - Creating a mirror sized from the tag's data capacity
//! - Loading every record (with bounded retry) from a page-addressed tag
//! - Application edits through a shared, dirty-tracking view
//! - The check / write-and-verify cycle the host loop runs each tick
//! - Releasing the mirror at the end of the session

#![no_std]

use tag_mirror::prelude::*;

/// Data bytes reserved for records on the tag.
const CAPACITY: usize = 20;

/// Record the loop keeps counting.
const COUNTER: usize = 1;

/// Pages of a small Ultralight-class tag.
const TAG_PAGES: usize = 16;

/// Stand-in for the radio driver: a tag held in RAM that drops one read
/// every few calls, the way a marginal antenna coupling does.
struct FlakyTag {
    pages: [Page; TAG_PAGES],
    reads: usize,
}

impl FlakyTag {
    fn new() -> Self {
        Self {
            pages: [[0; 4]; TAG_PAGES],
            reads: 0,
        }
    }
}

impl PageTransport for FlakyTag {
    fn detect_target(&mut self, _timeout_ms: u32) -> Option<Uid> {
        Uid::from_bytes(&[0x04, 0x52, 0x9C, 0x1A, 0x6B, 0x2E, 0x80])
    }

    fn read_page(&mut self, page: u16) -> Option<Page> {
        self.reads += 1;
        if self.reads % 7 == 0 {
            return None;
        }
        self.pages.get(usize::from(page)).copied()
    }

    fn write_page(&mut self, page: u16, data: &Page) -> bool {
        match self.pages.get_mut(usize::from(page)) {
            Some(slot) => {
                *slot = *data;
                true
            }
            None => false,
        }
    }
}

pub fn main() {
    let shared = SharedMirror::new(DataCardMirror::<8>::init(CAPACITY).unwrap());
    let mut sync = RecordSync::new(FlakyTag::new(), SyncConfig::default());

    // ========== Session start ==========
    shared.with_mirror(|mirror| sync.load_all(mirror)).unwrap();
    shared.with_mirror(|mirror| assert_eq!(mirror.uid().kind(), TargetKind::Ultralight));

    for _tick in 0..40 {
        // ========== Sync side ==========
        // Check the counter against the tag; rewrite when the tag lags behind.
        // A dropped read surfaces as ReadFailed and is retried next tick.
        let outcome = shared.with_mirror(|mirror| sync.check_same(mirror, COUNTER));
        match outcome {
            Ok(CheckOutcome::Same) => {
                // ========== Application side ==========
                shared.with_view(|view| {
                    view.update(COUNTER, |r| r.aa = if r.aa >= 0x10 { 0 } else { r.aa + 1 })
                        .unwrap();
                });
            }
            Ok(CheckOutcome::Differs { .. }) => {
                let _ = shared.with_mirror(|mirror| sync.reconcile(mirror, COUNTER));
            }
            Err(SyncError::ReadFailed { .. }) => {}
            Err(err) => panic!("sync failed: {err}"),
        }
    }

    // ========== Session end ==========
    let mut mirror = shared.into_inner();
    mirror.log_contents();
    assert_eq!(mirror.deallocate(), Ok(()));
    assert_eq!(mirror.deallocate(), Err(SyncError::AlreadyFreed));
}
