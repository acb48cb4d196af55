/// Snapshot of the translation counters.
///
/// All four counters only grow, and are reset only by building a new
/// translator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Completed translations
    pub total_accesses: u64,
    /// Pages loaded from the backing store
    pub page_faults: u64,
    /// Translation cache lookups that hit
    pub cache_hits: u64,
    /// Translation cache lookups
    pub cache_accesses: u64,
}

impl Counters {
    /// Page faults per hundred accesses; zero before the first access.
    pub fn page_fault_rate(&self) -> f64 {
        percentage(self.page_faults, self.total_accesses)
    }

    /// Cache hits per hundred cache lookups; zero before the first lookup.
    pub fn cache_hit_rate(&self) -> f64 {
        percentage(self.cache_hits, self.cache_accesses)
    }
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
