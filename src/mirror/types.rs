use core::marker::PhantomData;

/// Size in bytes of one physical tag page, the atomic transport unit.
pub const PAGE_SIZE: usize = 4;

/// Largest record layout a mirror can carry.
pub const MAX_RECORD_SIZE: usize = 32;

/// Longest identifier an ISO 14443-A target can report.
pub const MAX_UID_LEN: usize = 10;

/// One physical page worth of bytes.
pub type Page = [u8; PAGE_SIZE];

/// Fixed-size value stored packed on the tag and mirrored in memory.
///
/// `SIZE` is the exact number of bytes the layout occupies on the tag;
/// records are laid out back to back with no padding.
pub trait Record: Copy + Default {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Encodes the record into `out`, which is exactly `SIZE` bytes long.
    fn to_bytes(&self, out: &mut [u8]);

    /// Decodes a record from `bytes`, which is exactly `SIZE` bytes long.
    fn from_bytes(bytes: &[u8]) -> Self;
}

/// Five single-byte fields, the stock record layout.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataRecord {
    pub aa: u8,
    pub bb: u8,
    pub cc: u8,
    pub dd: u8,
    pub ee: u8,
}

impl DataRecord {
    pub const fn new(aa: u8, bb: u8, cc: u8, dd: u8, ee: u8) -> Self {
        Self { aa, bb, cc, dd, ee }
    }
}

impl Record for DataRecord {
    const SIZE: usize = 5;

    fn to_bytes(&self, out: &mut [u8]) {
        out.copy_from_slice(&[self.aa, self.bb, self.cc, self.dd, self.ee]);
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3], bytes[4])
    }
}

impl core::fmt::Display for DataRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:02x} {:02x} {:02x} {:02x} {:02x}",
            self.aa, self.bb, self.cc, self.dd, self.ee
        )
    }
}

/// Compile-time bound on `R::SIZE`; evaluating `VALID` fails the build for
/// zero-sized or oversized records.
pub(crate) struct LayoutCheck<R>(PhantomData<R>);

impl<R: Record> LayoutCheck<R> {
    pub(crate) const VALID: () = assert!(
        R::SIZE > 0 && R::SIZE <= MAX_RECORD_SIZE,
        "record size must be between 1 and MAX_RECORD_SIZE bytes"
    );
}

/// Encodes `record` into a scratch buffer; the first `R::SIZE` bytes are valid.
pub(crate) fn encode<R: Record>(record: &R) -> [u8; MAX_RECORD_SIZE] {
    let () = LayoutCheck::<R>::VALID;
    let mut buf = [0u8; MAX_RECORD_SIZE];
    record.to_bytes(&mut buf[..R::SIZE]);
    buf
}

/// Returns a zeroed scratch buffer large enough for `R`.
pub(crate) fn scratch<R: Record>() -> [u8; MAX_RECORD_SIZE] {
    let () = LayoutCheck::<R>::VALID;
    [0u8; MAX_RECORD_SIZE]
}

/// Tag sub-type, derived from the length of its identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// 4-byte identifier: sector-organised storage, not page addressable.
    Classic,
    /// 7-byte identifier: page-addressable storage.
    Ultralight,
    /// Any other identifier length.
    Unknown(usize),
}

impl TargetKind {
    pub const fn from_uid_len(len: usize) -> Self {
        match len {
            4 => TargetKind::Classic,
            7 => TargetKind::Ultralight,
            other => TargetKind::Unknown(other),
        }
    }

    /// Returns true if records can be addressed by page on this kind of tag.
    pub const fn is_page_addressable(&self) -> bool {
        matches!(self, TargetKind::Ultralight)
    }
}

/// Tag identifier as reported by target detection.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Uid {
    bytes: heapless::Vec<u8, MAX_UID_LEN>,
}

impl Uid {
    /// Builds an identifier, or `None` if `bytes` is longer than [`MAX_UID_LEN`].
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let mut uid = Self::default();
        uid.bytes.extend_from_slice(bytes).ok()?;
        Some(uid)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn kind(&self) -> TargetKind {
        TargetKind::from_uid_len(self.len())
    }
}

impl core::fmt::Display for Uid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, b) in self.bytes.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Result of comparing a mirrored record against the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Tag and mirror hold identical bytes.
    Same,
    /// First mismatching byte within the record.
    Differs {
        /// Byte position inside the record.
        position: usize,
        /// Byte held by the mirror.
        mirror: u8,
        /// Byte read from the tag.
        tag: u8,
    },
}

impl CheckOutcome {
    #[inline]
    pub fn is_same(&self) -> bool {
        matches!(self, CheckOutcome::Same)
    }

    /// Compares two encoded records byte for byte.
    pub(crate) fn compare(mirror: &[u8], tag: &[u8]) -> Self {
        mirror
            .iter()
            .zip(tag)
            .position(|(m, t)| m != t)
            .map_or(CheckOutcome::Same, |position| CheckOutcome::Differs {
                position,
                mirror: mirror[position],
                tag: tag[position],
            })
    }
}
