use crate::common::{Offset, PageNumber, Result, VirtualAddress, VmConfig, VmError};

/// AddressDecoder splits a fixed-width virtual address into its page number
/// and page offset.
///
/// For an `A`-bit address space and `2^p`-byte pages, the page number is
/// bits `[A-1 .. p]` and the offset is bits `[p-1 .. 0]`. The split never
/// overlaps: `page * page_size + offset == va` for every legal address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressDecoder {
    address_bits: u32,
    offset_bits: u32,
}

impl AddressDecoder {
    /// Creates a decoder for an `address_bits`-wide space with
    /// `page_size`-byte pages. The caller validates the geometry.
    pub fn new(address_bits: u32, page_size: u32) -> Self {
        debug_assert!(page_size.is_power_of_two());
        Self {
            address_bits,
            offset_bits: page_size.trailing_zeros(),
        }
    }

    pub fn from_config(config: &VmConfig) -> Self {
        Self::new(config.address_bits, config.page_size)
    }

    pub fn address_bits(&self) -> u32 {
        self.address_bits
    }

    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    pub fn page_size(&self) -> u32 {
        1 << self.offset_bits
    }

    /// Number of distinct page numbers, `2^(A-p)`.
    pub fn page_count(&self) -> u64 {
        1u64 << (self.address_bits - self.offset_bits)
    }

    /// Splits `va` into `(page, offset)`.
    /// Fails with `InvalidAddress` if `va` does not fit in the address width.
    pub fn decode(&self, va: VirtualAddress) -> Result<(PageNumber, Offset)> {
        if va.as_u64() >> self.address_bits != 0 {
            return Err(VmError::InvalidAddress {
                address: va,
                bits: self.address_bits,
            });
        }

        let offset_mask = (1u64 << self.offset_bits) - 1;
        let page = PageNumber::new(va.as_u64() >> self.offset_bits);
        let offset = Offset::new((va.as_u64() & offset_mask) as u32);
        Ok((page, offset))
    }

    /// Inverse of [`decode`](Self::decode).
    pub fn compose(&self, page: PageNumber, offset: Offset) -> VirtualAddress {
        VirtualAddress::new((page.as_u64() << self.offset_bits) | offset.as_u32() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_splits_page_and_offset() {
        let decoder = AddressDecoder::new(16, 256);
        let (page, offset) = decoder.decode(VirtualAddress::new(0x1234)).unwrap();
        assert_eq!(page, PageNumber::new(0x12));
        assert_eq!(offset, Offset::new(0x34));
    }

    #[test]
    fn test_decode_round_trip_whole_space() {
        let decoder = AddressDecoder::new(12, 64);
        for va in 0..(1u64 << 12) {
            let (page, offset) = decoder.decode(VirtualAddress::new(va)).unwrap();
            assert!(offset.as_u32() < decoder.page_size());
            assert_eq!(
                page.as_u64() * decoder.page_size() as u64 + offset.as_u32() as u64,
                va
            );
            assert_eq!(decoder.compose(page, offset), VirtualAddress::new(va));
        }
    }

    #[test]
    fn test_decode_rejects_out_of_width() {
        let decoder = AddressDecoder::new(16, 256);
        let err = decoder.decode(VirtualAddress::new(1 << 16)).unwrap_err();
        assert!(matches!(err, VmError::InvalidAddress { bits: 16, .. }));

        assert!(decoder.decode(VirtualAddress::new(0xFFFF)).is_ok());
    }

    #[test]
    fn test_single_page_space() {
        let decoder = AddressDecoder::new(8, 256);
        assert_eq!(decoder.page_count(), 1);
        let (page, offset) = decoder.decode(VirtualAddress::new(0xAB)).unwrap();
        assert_eq!(page, PageNumber::new(0));
        assert_eq!(offset, Offset::new(0xAB));
    }
}
