use log::{debug, info, trace};

use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::memory::{EvictionPolicy, FrameStore};
use crate::page_table::PageTable;
use crate::translation::{
    AddressDecoder, EventTime, FrameNumber, Offset, PhysicalAddress, VirtualAddress,
};

/// Outcome of one translated access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessResult {
    pub frame: FrameNumber,
    pub offset: Offset,
    pub page_fault: bool,
    pub timestamp: EventTime,
    physical: PhysicalAddress,
}

impl AccessResult {
    #[inline]
    pub fn physical_address(&self) -> PhysicalAddress {
        self.physical
    }
}

/// Format: `fffff|ooo* t`, the star marks a page fault
impl std::fmt::Display for AccessResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:05x}|{:03x}{} {}",
            self.frame,
            self.offset,
            if self.page_fault { '*' } else { ' ' },
            self.timestamp
        )
    }
}

/// Counters over the whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub accesses: u64,
    pub faults: u64,
    pub evictions: u64,
}

impl Stats {
    pub fn fault_rate(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.faults as f64 / self.accesses as f64
        }
    }
}

/// Owns the page table and RAM of one simulated process and serves accesses
#[derive(Debug, Clone)]
pub struct MemoryManager {
    config: SimConfig,
    decoder: AddressDecoder,
    page_table: PageTable,
    frames: FrameStore,
    policy: EvictionPolicy,
    clock: EventTime,
    stats: Stats,
}

impl MemoryManager {
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        debug!("memory manager: {}", config);

        Ok(MemoryManager {
            config,
            decoder: AddressDecoder::new(config.offset_bits),
            page_table: PageTable::new(config.page_count),
            frames: FrameStore::new(config.frame_count).with_victim_scan(config.victim_scan),
            policy: EvictionPolicy::default(),
            clock: 0,
            stats: Stats::default(),
        })
    }

    pub fn with_policy(mut self, policy: EvictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Translate `address`, loading its page on a fault.
    ///
    /// An address whose page lies outside the page table is rejected
    /// before the event clock advances.
    pub fn access(&mut self, address: VirtualAddress) -> Result<AccessResult> {
        let va = self.decoder.decode(address);
        let mapped = self.page_table.lookup(va.page)?;

        self.clock += 1;
        self.stats.accesses += 1;

        let (frame, page_fault) = match mapped {
            Some(frame) => (frame, false),
            None => {
                let evicting = self.frames.find_free().is_none();
                let frame = self.frames.load(va.page, &mut self.page_table, self.policy)?;
                self.stats.faults += 1;
                if evicting {
                    self.stats.evictions += 1;
                }
                debug!("page fault at {}: loaded into frame {:#x}", va, frame);
                (frame, true)
            }
        };

        self.frames.stamp(frame, self.clock)?;
        self.page_table.set_referenced(va.page)?;
        trace!("{} -> frame {:#x} at t={}", va, frame, self.clock);

        debug_assert!(self.check_invariants().is_ok(), "{:?}", self.check_invariants());

        Ok(AccessResult {
            frame,
            offset: va.offset,
            page_fault,
            timestamp: self.clock,
            physical: self.decoder.compose(frame, va.offset),
        })
    }

    /// Switch eviction policy; only later faults are affected
    pub fn set_policy(&mut self, policy: EvictionPolicy) {
        if policy != self.policy {
            info!("eviction policy: {} -> {}", self.policy, policy);
        }
        self.policy = policy;
    }

    pub fn reset_reference_bits(&mut self) {
        info!("clearing reference bits at t={}", self.clock);
        self.page_table.clear_referenced();
    }

    #[inline]
    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    #[inline]
    pub fn clock(&self) -> EventTime {
        self.clock
    }

    #[inline]
    pub fn stats(&self) -> Stats {
        self.stats
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[inline]
    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    #[inline]
    pub fn frames(&self) -> &FrameStore {
        &self.frames
    }

    /// Check that present pages and occupied frames map one-to-one
    pub fn check_invariants(&self) -> Result<()> {
        for (page, pte) in self.page_table.iter() {
            let Some(frame) = pte.frame() else { continue };
            let held = self.frames.frame(frame)?;
            if held.page() != Some(page) {
                return Err(SimError::InvariantViolation(format!(
                    "page {:#x} maps to frame {:#x} which holds {:?}",
                    page,
                    frame,
                    held.page()
                )));
            }
        }

        for (frame, held) in self.frames.iter() {
            let Some(page) = held.page() else { continue };
            let owners = self
                .page_table
                .iter()
                .filter(|(_, pte)| pte.frame() == Some(frame))
                .count();
            if owners != 1 || self.page_table.lookup(page)? != Some(frame) {
                return Err(SimError::InvariantViolation(format!(
                    "frame {:#x} holds page {:#x} but {} present pages map to it",
                    frame, page, owners
                )));
            }
        }

        Ok(())
    }
}
