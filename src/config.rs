use crate::constants::*;
use crate::error::{Result, SimError};

/// Which pages the reference-bit policy may pick as "unreferenced"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VictimScan {
    /// Only pages currently mapped to a frame
    #[default]
    PresentPages,
    /// Every page in the table; an absent pick has no frame and falls
    /// through to the first present page
    AllPages,
}

/// Geometry of the simulated address space, fixed for the whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    pub frame_count: usize,
    pub page_count: usize,
    pub offset_bits: u32,
    pub victim_scan: VictimScan,
}

impl SimConfig {
    pub fn new(frame_count: usize, page_count: usize, offset_bits: u32) -> Self {
        SimConfig {
            frame_count,
            page_count,
            offset_bits,
            victim_scan: VictimScan::default(),
        }
    }

    pub fn with_victim_scan(mut self, victim_scan: VictimScan) -> Self {
        self.victim_scan = victim_scan;
        self
    }

    /// Bytes per page (and per frame)
    #[inline]
    pub fn page_size(&self) -> u64 {
        1u64 << self.offset_bits
    }

    /// Number of distinct page numbers a virtual address can carry
    #[inline]
    pub fn addressable_pages(&self) -> u64 {
        1u64 << (ADDRESS_BITS - self.offset_bits)
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_count == 0 {
            return Err(SimError::InvalidConfig("RAM needs at least one frame".to_string()));
        }
        if self.page_count == 0 {
            return Err(SimError::InvalidConfig("page table needs at least one page".to_string()));
        }
        if self.frame_count > MAX_FRAMES {
            return Err(SimError::InvalidConfig(format!(
                "{} frames requested but the limit is {}",
                self.frame_count, MAX_FRAMES
            )));
        }
        if self.page_count > MAX_PAGES {
            return Err(SimError::InvalidConfig(format!(
                "{} pages requested but the limit is {}",
                self.page_count, MAX_PAGES
            )));
        }
        if self.offset_bits == 0 || self.offset_bits >= ADDRESS_BITS {
            return Err(SimError::InvalidConfig(format!(
                "offset width {} must be between 1 and {}",
                self.offset_bits,
                ADDRESS_BITS - 1
            )));
        }
        if self.page_count as u64 > self.addressable_pages() {
            return Err(SimError::InvalidConfig(format!(
                "{} pages requested but a {}-bit offset leaves room for {}",
                self.page_count,
                self.offset_bits,
                self.addressable_pages()
            )));
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig::new(FRAMES_IN_RAM, PAGES_IN_PROCESS, OFFSET_BITS)
    }
}

impl std::fmt::Display for SimConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} frames, {} pages, {}-byte pages ({} offset bits)",
            self.frame_count,
            self.page_count,
            self.page_size(),
            self.offset_bits
        )
    }
}
