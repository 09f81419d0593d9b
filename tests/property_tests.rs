//! Property-based tests for the memory manager.
//!
//! Random access traces over random small geometries; the page table and
//! RAM must stay consistent after every step.

use proptest::prelude::*;
use vm_simulator::{EvictionPolicy, MemoryManager, SimConfig, VictimScan};

#[derive(Debug, Clone)]
enum Step {
    Access(u32, u32),
    Time,
    Ref,
    Clear,
}

fn step(pages: u32) -> impl Strategy<Value = Step> {
    prop_oneof![
        8 => (0..pages, 0u32..0x1000).prop_map(|(p, o)| Step::Access(p, o)),
        1 => Just(Step::Time),
        1 => Just(Step::Ref),
        1 => Just(Step::Clear),
    ]
}

/// Frames, pages, and a trace of steps over those pages
fn scenario() -> impl Strategy<Value = (usize, usize, bool, Vec<Step>)> {
    (1usize..6, 1usize..12, any::<bool>()).prop_flat_map(|(frames, pages, all)| {
        (
            Just(frames),
            Just(pages),
            Just(all),
            prop::collection::vec(step(pages as u32), 1..80),
        )
    })
}

fn manager(frames: usize, pages: usize, all: bool) -> MemoryManager {
    let scan = if all { VictimScan::AllPages } else { VictimScan::PresentPages };
    MemoryManager::new(SimConfig::new(frames, pages, 12).with_victim_scan(scan)).unwrap()
}

fn apply(mm: &mut MemoryManager, step: &Step) {
    match *step {
        Step::Access(page, offset) => {
            mm.access((page << 12) | offset).unwrap();
        }
        Step::Time => mm.set_policy(EvictionPolicy::Timestamp),
        Step::Ref => mm.set_policy(EvictionPolicy::ReferenceBit),
        Step::Clear => mm.reset_reference_bits(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_present_pages_and_frames_stay_bijective((frames, pages, all, steps) in scenario()) {
        let mut mm = manager(frames, pages, all);
        for s in &steps {
            apply(&mut mm, s);
            prop_assert!(mm.check_invariants().is_ok());
            prop_assert_eq!(mm.page_table().present_count(), mm.frames().occupied_count());
            prop_assert!(mm.frames().occupied_count() <= frames.min(pages));
        }
    }

    #[test]
    fn prop_repeat_access_hits_same_frame((frames, pages, all, steps) in scenario(), offset in 0u32..0x1000) {
        let mut mm = manager(frames, pages, all);
        for s in &steps {
            apply(&mut mm, s);
        }
        let address = ((pages as u32 - 1) << 12) | offset;
        let first = mm.access(address).unwrap();
        let second = mm.access(address).unwrap();

        prop_assert_eq!(first.frame, second.frame);
        prop_assert_eq!(first.offset, offset);
        prop_assert_eq!(second.offset, offset);
        prop_assert!(!second.page_fault);
        prop_assert_eq!(second.timestamp, first.timestamp + 1);
    }

    #[test]
    fn prop_fault_maps_page_to_returned_frame((frames, pages, all, steps) in scenario()) {
        let mut mm = manager(frames, pages, all);
        for s in &steps {
            if let Step::Access(page, offset) = *s {
                let result = mm.access((page << 12) | offset).unwrap();
                prop_assert_eq!(mm.page_table().lookup(page).unwrap(), Some(result.frame));
                prop_assert_eq!(mm.frames().frame(result.frame).unwrap().timestamp(), result.timestamp);
                prop_assert!(mm.page_table().entry(page).unwrap().referenced());
            } else {
                apply(&mut mm, s);
            }
        }
    }

    #[test]
    fn prop_reset_keeps_every_mapping((frames, pages, all, steps) in scenario()) {
        let mut mm = manager(frames, pages, all);
        for s in &steps {
            apply(&mut mm, s);
        }
        let before: Vec<_> = (0..pages as u32).map(|p| mm.page_table().lookup(p).unwrap()).collect();

        mm.reset_reference_bits();

        let after: Vec<_> = (0..pages as u32).map(|p| mm.page_table().lookup(p).unwrap()).collect();
        prop_assert_eq!(before, after);
        prop_assert!(mm.page_table().iter().all(|(_, pte)| !pte.referenced()));
    }

    #[test]
    fn prop_clock_counts_accesses((frames, pages, all, steps) in scenario()) {
        let mut mm = manager(frames, pages, all);
        for s in &steps {
            apply(&mut mm, s);
        }
        let accesses = steps.iter().filter(|s| matches!(s, Step::Access(..))).count() as u64;
        let stats = mm.stats();

        prop_assert_eq!(mm.clock(), accesses);
        prop_assert_eq!(stats.accesses, accesses);
        prop_assert!(stats.faults <= stats.accesses);
        prop_assert!(stats.evictions <= stats.faults);
    }

    #[test]
    fn prop_no_eviction_when_ram_covers_every_page(pages in 1usize..10, trace in prop::collection::vec(0u32..10, 1..60)) {
        let mut mm = manager(pages, pages, false);
        let mut seen = std::collections::HashSet::new();
        for page in trace.into_iter().filter(|&p| (p as usize) < pages) {
            let result = mm.access(page << 12).unwrap();
            prop_assert_eq!(result.page_fault, seen.insert(page));
        }
        prop_assert_eq!(mm.stats().evictions, 0);
    }
}
