use crate::constants::NO_SUCH_INDEX;
use crate::error::{Result, SimError};
use crate::translation::{FrameNumber, PageNumber};

/// Page table entry: presence, reference bit and mapped frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pte {
    present: bool,
    referenced: bool,
    frame: Option<FrameNumber>,
}

impl Pte {
    #[inline]
    pub fn present(&self) -> bool {
        self.present
    }

    #[inline]
    pub fn referenced(&self) -> bool {
        self.referenced
    }

    /// The mapped frame, only while the page is present
    #[inline]
    pub fn frame(&self) -> Option<FrameNumber> {
        if self.present { self.frame } else { None }
    }
}

/// Format: ` |p|r|fffff|`, frame is `fffff` when nothing is mapped
impl std::fmt::Display for Pte {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            " |{}|{}|{:05x}|",
            self.present as u8,
            self.referenced as u8,
            self.frame().unwrap_or(NO_SUCH_INDEX)
        )
    }
}

/// One PTE per page number of the process, fixed length
#[derive(Debug, Clone)]
pub struct PageTable {
    entries: Vec<Pte>,
}

impl PageTable {
    pub fn new(page_count: usize) -> Self {
        PageTable {
            entries: vec![Pte::default(); page_count],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bounds-checked access to a single entry
    pub fn entry(&self, page: PageNumber) -> Result<&Pte> {
        self.entries.get(page as usize).ok_or(SimError::PageOutOfRange {
            page,
            count: self.entries.len(),
        })
    }

    fn entry_mut(&mut self, page: PageNumber) -> Result<&mut Pte> {
        let count = self.entries.len();
        self.entries
            .get_mut(page as usize)
            .ok_or(SimError::PageOutOfRange { page, count })
    }

    /// Entries in page-number order
    pub fn iter(&self) -> impl Iterator<Item = (PageNumber, &Pte)> {
        self.entries.iter().enumerate().map(|(i, pte)| (i as PageNumber, pte))
    }

    /// Frame holding `page`, if it is present
    pub fn lookup(&self, page: PageNumber) -> Result<Option<FrameNumber>> {
        Ok(self.entry(page)?.frame())
    }

    pub fn clear_referenced(&mut self) {
        for pte in &mut self.entries {
            pte.referenced = false;
        }
    }

    pub fn set_referenced(&mut self, page: PageNumber) -> Result<()> {
        self.entry_mut(page)?.referenced = true;
        Ok(())
    }

    /// Lowest page with a clear reference bit; with `present_only` absent
    /// pages are skipped.
    pub fn find_unreferenced(&self, present_only: bool) -> Option<PageNumber> {
        self.iter()
            .find(|(_, pte)| !pte.referenced && (pte.present || !present_only))
            .map(|(page, _)| page)
    }

    /// Lowest present page, used as the last-resort victim
    pub fn find_first_present(&self) -> Option<PageNumber> {
        self.iter().find(|(_, pte)| pte.present).map(|(page, _)| page)
    }

    /// Reverse lookup: the present page mapped to `frame`
    pub fn find_by_frame(&self, frame: FrameNumber) -> Option<PageNumber> {
        self.iter()
            .find(|(_, pte)| pte.frame() == Some(frame))
            .map(|(page, _)| page)
    }

    pub fn mark_mapped(&mut self, page: PageNumber, frame: FrameNumber) -> Result<()> {
        let pte = self.entry_mut(page)?;
        pte.present = true;
        pte.frame = Some(frame);
        Ok(())
    }

    pub fn mark_unmapped(&mut self, page: PageNumber) -> Result<()> {
        let pte = self.entry_mut(page)?;
        pte.present = false;
        pte.frame = None;
        Ok(())
    }

    pub fn present_count(&self) -> usize {
        self.entries.iter().filter(|pte| pte.present).count()
    }
}

impl std::fmt::Display for PageTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (page, pte) in self.iter() {
            writeln!(f, "{:>3x}{}", page, pte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_table_is_empty_of_mappings() {
        let pt = PageTable::new(16);
        assert_eq!(pt.len(), 16);
        assert_eq!(pt.present_count(), 0);
        for (_, pte) in pt.iter() {
            assert!(!pte.present());
            assert!(!pte.referenced());
            assert_eq!(pte.frame(), None);
        }
    }

    #[test]
    fn test_lookup_mapped_and_unmapped() {
        let mut pt = PageTable::new(4);
        pt.mark_mapped(2, 7).unwrap();

        assert_eq!(pt.lookup(2).unwrap(), Some(7));
        assert_eq!(pt.lookup(1).unwrap(), None);

        pt.mark_unmapped(2).unwrap();
        assert_eq!(pt.lookup(2).unwrap(), None);
    }

    #[test]
    fn test_lookup_out_of_range_fails() {
        let pt = PageTable::new(4);
        assert!(matches!(
            pt.lookup(4),
            Err(SimError::PageOutOfRange { page: 4, count: 4 })
        ));
    }

    #[test]
    fn test_mutations_out_of_range_fail() {
        let mut pt = PageTable::new(2);
        assert!(pt.mark_mapped(9, 0).is_err());
        assert!(pt.mark_unmapped(9).is_err());
        assert!(pt.set_referenced(2).is_err());
    }

    #[test]
    fn test_clear_referenced_keeps_mappings() {
        let mut pt = PageTable::new(3);
        pt.mark_mapped(0, 1).unwrap();
        pt.mark_mapped(2, 0).unwrap();
        pt.set_referenced(0).unwrap();
        pt.set_referenced(2).unwrap();

        pt.clear_referenced();

        assert!(pt.iter().all(|(_, pte)| !pte.referenced()));
        assert_eq!(pt.lookup(0).unwrap(), Some(1));
        assert_eq!(pt.lookup(2).unwrap(), Some(0));
    }

    #[test]
    fn test_find_unreferenced_present_only() {
        let mut pt = PageTable::new(4);
        pt.mark_mapped(1, 0).unwrap();
        pt.mark_mapped(3, 1).unwrap();
        pt.set_referenced(1).unwrap();

        // page 0 and 2 are absent, page 1 is referenced
        assert_eq!(pt.find_unreferenced(true), Some(3));
        assert_eq!(pt.find_unreferenced(false), Some(0));

        pt.set_referenced(3).unwrap();
        assert_eq!(pt.find_unreferenced(true), None);
    }

    #[test]
    fn test_find_first_present() {
        let mut pt = PageTable::new(4);
        assert_eq!(pt.find_first_present(), None);
        pt.mark_mapped(2, 0).unwrap();
        pt.mark_mapped(3, 1).unwrap();
        assert_eq!(pt.find_first_present(), Some(2));
    }

    #[test]
    fn test_find_by_frame_ignores_absent_pages() {
        let mut pt = PageTable::new(4);
        pt.mark_mapped(1, 5).unwrap();
        assert_eq!(pt.find_by_frame(5), Some(1));
        assert_eq!(pt.find_by_frame(6), None);

        pt.mark_unmapped(1).unwrap();
        assert_eq!(pt.find_by_frame(5), None);
    }

    #[test]
    fn test_pte_display() {
        let mut pt = PageTable::new(2);
        assert_eq!(format!("{}", pt.entry(0).unwrap()), " |0|0|fffff|");

        pt.mark_mapped(1, 3).unwrap();
        pt.set_referenced(1).unwrap();
        assert_eq!(format!("{}", pt.entry(1).unwrap()), " |1|1|00003|");
    }

    #[test]
    fn test_table_display() {
        let mut pt = PageTable::new(17);
        pt.mark_mapped(16, 2).unwrap();
        let dump = format!("{}", pt);
        let lines: Vec<&str> = dump.lines().collect();

        assert_eq!(lines.len(), 17);
        assert_eq!(lines[0], "  0 |0|0|fffff|");
        assert_eq!(lines[16], " 10 |1|0|00002|");
    }
}
