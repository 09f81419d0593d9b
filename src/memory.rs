use log::{debug, error};

use crate::config::VictimScan;
use crate::constants::NO_SUCH_INDEX;
use crate::error::{Result, SimError};
use crate::page_table::PageTable;
use crate::translation::{EventTime, FrameNumber, PageNumber};

/// How a victim frame is chosen when RAM is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Evict the frame with the oldest access timestamp
    #[default]
    Timestamp,
    /// Evict the lowest page whose reference bit is clear, falling back to
    /// the lowest present page
    ReferenceBit,
}

impl EvictionPolicy {
    pub fn uses_timestamp(&self) -> bool {
        matches!(self, EvictionPolicy::Timestamp)
    }
}

impl std::fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvictionPolicy::Timestamp => write!(f, "timestamp"),
            EvictionPolicy::ReferenceBit => write!(f, "reference-bit"),
        }
    }
}

/// One physical frame of RAM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    free: bool,
    page: Option<PageNumber>,
    timestamp: EventTime,
}

impl Frame {
    #[inline]
    pub fn is_free(&self) -> bool {
        self.free
    }

    /// Page held by the frame; a free frame holds nothing
    #[inline]
    pub fn page(&self) -> Option<PageNumber> {
        if self.free { None } else { self.page }
    }

    #[inline]
    pub fn timestamp(&self) -> EventTime {
        self.timestamp
    }
}

impl Default for Frame {
    fn default() -> Self {
        Frame {
            free: true,
            page: None,
            timestamp: 0,
        }
    }
}

/// Format: ` |       free|` or ` |ppppp|ttttt|`
impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.free {
            write!(f, " |       free|")
        } else {
            write!(
                f,
                " |{:05x}|{:>5}|",
                self.page.unwrap_or(NO_SUCH_INDEX),
                self.timestamp
            )
        }
    }
}

/// RAM: a fixed number of frames indexed by frame number
#[derive(Debug, Clone)]
pub struct FrameStore {
    frames: Vec<Frame>,
    victim_scan: VictimScan,
}

impl FrameStore {
    /// Create a RAM with `frame_count` free frames
    pub fn new(frame_count: usize) -> Self {
        FrameStore {
            frames: vec![Frame::default(); frame_count],
            victim_scan: VictimScan::default(),
        }
    }

    pub fn with_victim_scan(mut self, victim_scan: VictimScan) -> Self {
        self.victim_scan = victim_scan;
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, frame: FrameNumber) -> Result<&Frame> {
        self.frames.get(frame as usize).ok_or(SimError::FrameOutOfRange {
            frame,
            count: self.frames.len(),
        })
    }

    fn frame_mut(&mut self, frame: FrameNumber) -> Result<&mut Frame> {
        let count = self.frames.len();
        self.frames
            .get_mut(frame as usize)
            .ok_or(SimError::FrameOutOfRange { frame, count })
    }

    /// Frames in frame-number order
    pub fn iter(&self) -> impl Iterator<Item = (FrameNumber, &Frame)> {
        self.frames.iter().enumerate().map(|(i, frame)| (i as FrameNumber, frame))
    }

    /// Record the event time of the latest access to `frame`
    pub fn stamp(&mut self, frame: FrameNumber, time: EventTime) -> Result<()> {
        self.frame_mut(frame)?.timestamp = time;
        Ok(())
    }

    /// Lowest-numbered free frame
    pub fn find_free(&self) -> Option<FrameNumber> {
        self.iter().find(|(_, frame)| frame.free).map(|(i, _)| i)
    }

    /// Frame with the smallest timestamp; ties go to the lowest number
    pub fn find_oldest(&self) -> Option<FrameNumber> {
        // min_by_key keeps the first of equal minima
        self.iter()
            .min_by_key(|(_, frame)| frame.timestamp)
            .map(|(i, _)| i)
    }

    pub fn occupied_count(&self) -> usize {
        self.frames.iter().filter(|frame| !frame.free).count()
    }

    fn select_victim(&self, page_table: &PageTable, policy: EvictionPolicy) -> Result<Option<FrameNumber>> {
        if let Some(free) = self.find_free() {
            return Ok(Some(free));
        }

        match policy {
            EvictionPolicy::Timestamp => Ok(self.find_oldest()),
            EvictionPolicy::ReferenceBit => {
                let present_only = self.victim_scan == VictimScan::PresentPages;
                if let Some(page) = page_table.find_unreferenced(present_only) {
                    if let Some(frame) = page_table.lookup(page)? {
                        return Ok(Some(frame));
                    }
                    debug!("unreferenced page {:#x} is not present, using first present page", page);
                }
                match page_table.find_first_present() {
                    Some(page) => page_table.lookup(page),
                    None => Ok(None),
                }
            }
        }
    }

    /// Place `page` into a frame, evicting by `policy` when RAM is full.
    ///
    /// Any page still mapped to the chosen frame is unmapped first. The
    /// frame timestamp is left to the caller. `page` must not be present.
    ///
    /// # Panics
    /// When RAM is full and no victim can be chosen, which a validated
    /// configuration never allows.
    pub fn load(&mut self, page: PageNumber, page_table: &mut PageTable, policy: EvictionPolicy) -> Result<FrameNumber> {
        if let Some(frame) = page_table.lookup(page)? {
            return Err(SimError::InvariantViolation(format!(
                "page {:#x} is already present in frame {:#x}",
                page, frame
            )));
        }

        let victim = match self.select_victim(page_table, policy)? {
            Some(frame) => frame,
            None => {
                error!(
                    "no frame can hold page {:#x}: {} frames, {} present pages",
                    page,
                    self.frames.len(),
                    page_table.present_count()
                );
                panic!("frame store has no free frame and no evictable page");
            }
        };

        while let Some(stale) = page_table.find_by_frame(victim) {
            debug!("evicting page {:#x} from frame {:#x} ({})", stale, victim, policy);
            page_table.mark_unmapped(stale)?;
        }

        let frame = self.frame_mut(victim)?;
        frame.free = false;
        frame.page = Some(page);
        page_table.mark_mapped(page, victim)?;

        Ok(victim)
    }
}

impl std::fmt::Display for FrameStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, frame) in self.iter() {
            writeln!(f, "  {} {}", i, frame)?;
        }
        Ok(())
    }
}
