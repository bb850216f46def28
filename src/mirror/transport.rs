use crate::mirror::types::{Page, Uid};

/// Raw page access to a tag in the reader's field.
///
/// Implemented by the radio driver (PN532 and friends). The driver owns
/// any key handling and framing; this layer only sees fixed-size pages.
pub trait PageTransport {
    /// Waits up to `timeout_ms` for a target and returns its identifier.
    ///
    /// A timeout of 0 blocks until a target appears.
    fn detect_target(&mut self, timeout_ms: u32) -> Option<Uid>;

    /// Reads one page, or `None` if the tag did not answer.
    fn read_page(&mut self, page: u16) -> Option<Page>;

    /// Writes one page and returns true if the tag acknowledged it.
    fn write_page(&mut self, page: u16, data: &Page) -> bool;
}

impl<T: PageTransport + ?Sized> PageTransport for &mut T {
    fn detect_target(&mut self, timeout_ms: u32) -> Option<Uid> {
        (**self).detect_target(timeout_ms)
    }

    fn read_page(&mut self, page: u16) -> Option<Page> {
        (**self).read_page(page)
    }

    fn write_page(&mut self, page: u16, data: &Page) -> bool {
        (**self).write_page(page, data)
    }
}

#[cfg(test)]
mod tests {
    use crate::mirror::{
        config::SyncConfig,
        sync::RecordSync,
        test_support::{FakeTransport, TestMirror},
        error::SyncError,
        types::{CheckOutcome, DataRecord},
    };

    #[test]
    fn borrowed_transport_drives_a_session() {
        let mut tag = FakeTransport::ultralight();
        let mut mirror = TestMirror::init(20).unwrap();

        {
            let mut sync = RecordSync::new(&mut tag, SyncConfig::default());
            sync.load_all(&mut mirror).unwrap();
            mirror.update_record(2, |r| r.cc = 0xAB).unwrap();
            assert_eq!(sync.write_and_verify(&mirror, 2), Ok(CheckOutcome::Same));
        }

        // The driver is usable again once the session is dropped
        assert_eq!(tag.record::<DataRecord>(2, 8), *mirror.record(2).unwrap());
        assert_eq!(tag.written.as_slice(), &[10, 11]);
        assert_eq!(tag.last_timeout, Some(0));
        assert!(tag.reads > 0);
    }

    #[test]
    fn borrowed_transport_forwards_failures() {
        let mut tag = FakeTransport::ultralight();
        tag.fail_page(8, 1);

        let mut sync = RecordSync::new(&mut tag, SyncConfig::default());
        assert_eq!(
            sync.read_record::<DataRecord>(0),
            Err(SyncError::ReadFailed { page: 8 })
        );
        let record: DataRecord = sync.read_record(0).unwrap();
        assert_eq!(record, DataRecord::new(32, 33, 34, 35, 36));
        drop(sync);

        assert_eq!(tag.reads, 3);
        assert_eq!(tag.detects, 2);
    }
}
