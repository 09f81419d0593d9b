pub type PageNumber = u32;
pub type FrameNumber = u32;
pub type Offset = u32;
pub type VirtualAddress = u32;
pub type PhysicalAddress = u64;
pub type EventTime = u64;

/// Splits virtual addresses into page number and in-page offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressDecoder {
    offset_bits: u32,
    offset_mask: u32,
}

impl AddressDecoder {
    pub fn new(offset_bits: u32) -> Self {
        let offset_mask = ((1u64 << offset_bits) - 1) as u32;
        AddressDecoder { offset_bits, offset_mask }
    }

    /// Decompose a raw VA into its components
    #[inline]
    pub fn decode(&self, va: VirtualAddress) -> DecodedAddress {
        DecodedAddress {
            va,
            page: ((va as u64) >> self.offset_bits) as PageNumber,
            offset: va & self.offset_mask,
        }
    }

    /// Reassemble a physical address from a frame and an offset
    #[inline]
    pub fn compose(&self, frame: FrameNumber, offset: Offset) -> PhysicalAddress {
        ((frame as u64) << self.offset_bits) | (offset & self.offset_mask) as u64
    }
}

/// Represents the decomposed components of a Virtual Address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedAddress {
    pub va: VirtualAddress,
    pub page: PageNumber,
    pub offset: Offset,
}

impl std::fmt::Display for DecodedAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VA({:#010x}) = (page={:#x}, offset={:#x})", self.va, self.page, self.offset)
    }
}
