use super::error::{Result, VmError};

/// Default width of a virtual address in bits
pub const DEFAULT_ADDRESS_BITS: u32 = 16;

/// Default page size in bytes (4 KB)
pub const DEFAULT_PAGE_SIZE: u32 = 4096;

/// Default number of virtual pages (page table capacity)
pub const DEFAULT_NUM_PAGES: usize = 16;

/// Default number of physical frames
pub const DEFAULT_NUM_FRAMES: usize = 4;

/// Default translation cache capacity
pub const DEFAULT_CACHE_CAPACITY: usize = 4;

/// Bound on addresses parsed ahead of the translator
pub const ADDRESS_QUEUE_DEPTH: usize = 128;

/// Widest address space the simulator accepts
pub const MAX_ADDRESS_BITS: u32 = 48;

/// Geometry and capacities of one simulated address space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmConfig {
    /// Address-space width in bits
    pub address_bits: u32,
    /// Page size in bytes, a power of two
    pub page_size: u32,
    /// Total virtual pages, the page table capacity
    pub num_pages: usize,
    /// Physical frames in the frame pool
    pub num_frames: usize,
    /// Translation cache capacity
    pub cache_capacity: usize,
    /// Install the mapping into the cache after a page table hit
    pub promote_on_table_hit: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            address_bits: DEFAULT_ADDRESS_BITS,
            page_size: DEFAULT_PAGE_SIZE,
            num_pages: DEFAULT_NUM_PAGES,
            num_frames: DEFAULT_NUM_FRAMES,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            promote_on_table_hit: true,
        }
    }
}

impl VmConfig {
    /// Creates a configuration with the given geometry. The page table
    /// covers the whole address space and promotion is enabled.
    pub fn new(address_bits: u32, page_size: u32, num_frames: usize, cache_capacity: usize) -> Self {
        let num_pages = if page_size.is_power_of_two() && page_size.trailing_zeros() <= address_bits
        {
            1usize
                .checked_shl(address_bits - page_size.trailing_zeros())
                .unwrap_or(usize::MAX)
        } else {
            0
        };

        Self {
            address_bits,
            page_size,
            num_pages,
            num_frames,
            cache_capacity,
            promote_on_table_hit: true,
        }
    }

    pub fn with_num_pages(mut self, num_pages: usize) -> Self {
        self.num_pages = num_pages;
        self
    }

    pub fn with_num_frames(mut self, num_frames: usize) -> Self {
        self.num_frames = num_frames;
        self
    }

    pub fn with_cache_capacity(mut self, cache_capacity: usize) -> Self {
        self.cache_capacity = cache_capacity;
        self
    }

    pub fn with_promote_on_table_hit(mut self, promote: bool) -> Self {
        self.promote_on_table_hit = promote;
        self
    }

    /// Number of offset bits, `log2(page_size)`.
    pub fn offset_bits(&self) -> u32 {
        self.page_size.trailing_zeros()
    }

    /// Checks the geometry and capacities.
    pub fn validate(&self) -> Result<()> {
        if self.address_bits == 0 || self.address_bits > MAX_ADDRESS_BITS {
            return Err(VmError::InvalidConfig(format!(
                "address width must be between 1 and {} bits, got {}",
                MAX_ADDRESS_BITS, self.address_bits
            )));
        }

        if !self.page_size.is_power_of_two() {
            return Err(VmError::InvalidConfig(format!(
                "page size must be a power of two, got {}",
                self.page_size
            )));
        }

        let offset_bits = self.offset_bits();
        if offset_bits > self.address_bits {
            return Err(VmError::InvalidConfig(format!(
                "page size {} exceeds a {}-bit address space",
                self.page_size, self.address_bits
            )));
        }

        let max_pages = 1u64 << (self.address_bits - offset_bits);
        if self.num_pages == 0 || self.num_pages as u64 > max_pages {
            return Err(VmError::InvalidConfig(format!(
                "virtual page count must be between 1 and {}, got {}",
                max_pages, self.num_pages
            )));
        }

        if self.num_frames == 0 || self.num_frames > u32::MAX as usize {
            return Err(VmError::InvalidConfig(format!(
                "frame count must be between 1 and {}, got {}",
                u32::MAX,
                self.num_frames
            )));
        }

        if self.cache_capacity == 0 {
            return Err(VmError::InvalidConfig(
                "translation cache capacity must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = VmConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.offset_bits(), 12);
    }

    #[test]
    fn test_new_covers_address_space() {
        let config = VmConfig::new(16, 256, 4, 4);
        assert_eq!(config.num_pages, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_power_of_two_page_size() {
        let config = VmConfig::new(16, 300, 4, 4);
        assert!(matches!(config.validate(), Err(VmError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_page_larger_than_address_space() {
        let config = VmConfig::new(8, 512, 4, 4).with_num_pages(1);
        assert!(matches!(config.validate(), Err(VmError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_capacities() {
        let base = VmConfig::new(16, 256, 4, 4);
        assert!(base.clone().with_num_frames(0).validate().is_err());
        assert!(base.clone().with_cache_capacity(0).validate().is_err());
        assert!(base.clone().with_num_pages(0).validate().is_err());
        assert!(base.with_num_pages(257).validate().is_err());
    }

    #[test]
    fn test_rejects_address_width_out_of_bounds() {
        assert!(VmConfig::new(0, 1, 1, 1).validate().is_err());
        assert!(VmConfig::new(MAX_ADDRESS_BITS + 1, 4096, 1, 1)
            .with_num_pages(1)
            .validate()
            .is_err());
    }
}
