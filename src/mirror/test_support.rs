//! Test support utilities - only compiled in test builds.

use crate::mirror::{
    card::CardMirror,
    config::SyncConfig,
    helpers::record_pages,
    sync::RecordSync,
    transport::PageTransport,
    types::{DataRecord, MAX_RECORD_SIZE, PAGE_SIZE, Page, Record, Uid},
};

/// Standard test mirror: up to 8 five-byte records.
pub type TestMirror = CardMirror<DataRecord, 8>;

pub const ULTRALIGHT_UID: [u8; 7] = [0x04, 0x52, 0x9C, 0x1A, 0x6B, 0x2E, 0x80];
pub const CLASSIC_UID: [u8; 4] = [0xDE, 0xAD, 0xBE, 0xEF];

/// Pages on the fake tag.
pub const TEST_PAGES: usize = 64;

/// Page-aligned eight-byte record.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WideRecord(pub [u8; 8]);

impl Record for WideRecord {
    const SIZE: usize = 8;

    fn to_bytes(&self, out: &mut [u8]) {
        out.copy_from_slice(&self.0);
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Self(raw)
    }
}

/// In-memory tag. Page `p` byte `o` starts out as `p * 4 + o`.
pub struct FakeTransport {
    pub pages: [Page; TEST_PAGES],
    pub uid: Option<Uid>,
    /// Upcoming reads of any page that fail.
    pub fail_reads: usize,
    /// Per-page read failures still to inject.
    pub page_failures: heapless::Vec<PageFailure, 8>,
    pub fail_write_page: Option<u16>,
    /// Acknowledge writes without storing them.
    pub drop_writes: bool,
    pub reads: usize,
    pub detects: usize,
    pub last_timeout: Option<u32>,
    /// Detections that still find the tag; `None` keeps it in the field.
    pub detects_left: Option<usize>,
    pub written: heapless::Vec<u16, 64>,
}

/// Injected read failure for one page.
pub struct PageFailure {
    pub page: u16,
    /// Reads of the page that still succeed before failures start.
    pub skip: usize,
    pub remaining: usize,
}

impl FakeTransport {
    pub fn with_uid(uid: Option<&[u8]>) -> Self {
        let mut pages = [[0u8; PAGE_SIZE]; TEST_PAGES];
        for (p, page) in pages.iter_mut().enumerate() {
            for (o, byte) in page.iter_mut().enumerate() {
                *byte = (p * PAGE_SIZE + o) as u8;
            }
        }

        Self {
            pages,
            uid: uid.map(|bytes| Uid::from_bytes(bytes).unwrap()),
            fail_reads: 0,
            page_failures: heapless::Vec::new(),
            fail_write_page: None,
            drop_writes: false,
            reads: 0,
            detects: 0,
            last_timeout: None,
            detects_left: None,
            written: heapless::Vec::new(),
        }
    }

    pub fn ultralight() -> Self {
        Self::with_uid(Some(&ULTRALIGHT_UID[..]))
    }

    pub fn classic() -> Self {
        Self::with_uid(Some(&CLASSIC_UID[..]))
    }

    pub fn absent() -> Self {
        Self::with_uid(None)
    }

    /// Makes the next `times` reads of `page` fail.
    pub fn fail_page(&mut self, page: u16, times: usize) {
        self.fail_page_after(page, 0, times);
    }

    /// Lets `skip` reads of `page` through, then fails the next `times`.
    pub fn fail_page_after(&mut self, page: u16, skip: usize, times: usize) {
        let failure = PageFailure {
            page,
            skip,
            remaining: times,
        };
        if self.page_failures.push(failure).is_err() {
            panic!("too many injected page failures");
        }
    }

    /// Takes the tag out of the field after `count` more detections.
    pub fn vanish_after(&mut self, count: usize) {
        self.detects_left = Some(count);
    }

    /// Decodes record `index` from the tag's current pages.
    pub fn record<R: Record>(&self, index: usize, base_page: usize) -> R {
        let mut buf = [0u8; MAX_RECORD_SIZE];
        for slice in record_pages(index, R::SIZE, base_page) {
            slice.gather(&self.pages[slice.page], &mut buf[..R::SIZE]);
        }
        R::from_bytes(&buf[..R::SIZE])
    }

    fn should_fail_read(&mut self, page: u16) -> bool {
        if self.fail_reads > 0 {
            self.fail_reads -= 1;
            return true;
        }
        for failure in self.page_failures.iter_mut() {
            if failure.page != page || failure.remaining == 0 {
                continue;
            }
            if failure.skip > 0 {
                failure.skip -= 1;
                return false;
            }
            failure.remaining -= 1;
            return true;
        }
        false
    }
}

impl PageTransport for FakeTransport {
    fn detect_target(&mut self, timeout_ms: u32) -> Option<Uid> {
        self.detects += 1;
        self.last_timeout = Some(timeout_ms);
        match self.detects_left.as_mut() {
            Some(0) => return None,
            Some(left) => *left -= 1,
            None => {}
        }
        self.uid.clone()
    }

    fn read_page(&mut self, page: u16) -> Option<Page> {
        self.reads += 1;
        if self.should_fail_read(page) {
            return None;
        }
        self.pages.get(usize::from(page)).copied()
    }

    fn write_page(&mut self, page: u16, data: &Page) -> bool {
        if self.fail_write_page == Some(page) {
            return false;
        }
        let Some(slot) = self.pages.get_mut(usize::from(page)) else {
            return false;
        };
        self.written.push(page).unwrap();
        if !self.drop_writes {
            *slot = *data;
        }
        true
    }
}

/// Session with a 20-byte mirror already loaded; transport counters reset.
pub fn loaded_session(transport: FakeTransport) -> (RecordSync<FakeTransport>, TestMirror) {
    let mut sync = RecordSync::new(transport, SyncConfig::default());
    let mut mirror = TestMirror::init(20).unwrap();
    sync.load_all(&mut mirror).unwrap();
    sync.transport_mut().reads = 0;
    (sync, mirror)
}
