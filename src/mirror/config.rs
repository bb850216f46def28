/// Default first page of the record area; earlier pages hold the tag's
/// serial number, lock bytes and capability container.
pub const DATA_BASE_PAGE: u16 = 8;

/// Consecutive read failures tolerated per record during a bulk load.
pub const MAX_ERROR_READING: usize = 5;

/// Presence probe timeout in milliseconds.
pub const CHECK_TIMEOUT_MS: u32 = 200;

/// How record indices are bound-checked against the mirror's record count.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum IndexBound {
    /// Accepts `index <= count`, letting the one-past-end index reach the
    /// tag. The mirror itself has no slot there and still rejects it.
    #[default]
    Inclusive,
    /// Accepts `index < count` only.
    Strict,
}

impl IndexBound {
    /// Returns true if `index` passes this bound for a mirror of `count` records.
    #[inline]
    pub const fn admits(&self, index: usize, count: usize) -> bool {
        match self {
            IndexBound::Inclusive => index <= count,
            IndexBound::Strict => index < count,
        }
    }
}

/// Tunables for [`RecordSync`](crate::mirror::RecordSync).
///
/// # Example
/// ```
/// use tag_mirror::mirror::{IndexBound, SyncConfig};
///
/// let config = SyncConfig::new()
///     .data_base_page(4)
///     .detect_timeout_ms(500)
///     .index_bound(IndexBound::Strict);
/// assert_eq!(config.max_error_reading, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// First physical page of the record area.
    pub data_base_page: u16,
    /// Consecutive failures per record before a bulk load gives up.
    pub max_error_reading: usize,
    /// Timeout for presence probes.
    pub check_timeout_ms: u32,
    /// Timeout for detection before reads and writes; 0 blocks until a tag appears.
    pub detect_timeout_ms: u32,
    /// Record index bound policy.
    pub index_bound: IndexBound,
}

impl SyncConfig {
    pub const fn new() -> Self {
        Self {
            data_base_page: DATA_BASE_PAGE,
            max_error_reading: MAX_ERROR_READING,
            check_timeout_ms: CHECK_TIMEOUT_MS,
            detect_timeout_ms: 0,
            index_bound: IndexBound::Inclusive,
        }
    }

    pub const fn data_base_page(mut self, page: u16) -> Self {
        self.data_base_page = page;
        self
    }

    /// # Panics
    /// Panics if `attempts` is 0; a load needs at least one attempt per record.
    pub const fn max_error_reading(mut self, attempts: usize) -> Self {
        assert!(attempts > 0, "max_error_reading must be at least 1");
        self.max_error_reading = attempts;
        self
    }

    pub const fn check_timeout_ms(mut self, timeout: u32) -> Self {
        self.check_timeout_ms = timeout;
        self
    }

    pub const fn detect_timeout_ms(mut self, timeout: u32) -> Self {
        self.detect_timeout_ms = timeout;
        self
    }

    pub const fn index_bound(mut self, bound: IndexBound) -> Self {
        self.index_bound = bound;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tag_layout() {
        let config = SyncConfig::default();
        assert_eq!(config.data_base_page, 8);
        assert_eq!(config.max_error_reading, 5);
        assert_eq!(config.check_timeout_ms, 200);
        assert_eq!(config.detect_timeout_ms, 0);
        assert_eq!(config.index_bound, IndexBound::Inclusive);
    }

    #[test]
    fn index_bound_edges() {
        assert!(IndexBound::Inclusive.admits(3, 4));
        assert!(IndexBound::Inclusive.admits(4, 4));
        assert!(!IndexBound::Inclusive.admits(5, 4));

        assert!(IndexBound::Strict.admits(3, 4));
        assert!(!IndexBound::Strict.admits(4, 4));
    }

    #[test]
    #[should_panic]
    fn zero_retry_budget_is_rejected() {
        let _ = SyncConfig::new().max_error_reading(0);
    }
}
