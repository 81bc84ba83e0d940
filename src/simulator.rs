use std::collections::VecDeque;

use log::{debug, info, warn};

use crate::error::{ConfigError, ReferenceError, ReferenceErrorKind};
use crate::memory::{PageTable, PageTableEntry, PhysicalMemory};

/// State pushed to the reporting collaborator after every processed access.
#[derive(Debug, Clone)]
pub struct StepSnapshot {
    pub page_table: Vec<PageTableEntry>,
    pub frames: Vec<Option<usize>>,
    pub page_faults: u64,
    pub accessed_page: usize,
    /// Whether the access just processed faulted. One-shot: reflects only the
    /// most recent access, never the history.
    pub page_fault_occurred: bool,
}

/// Final report pushed once after the whole reference sequence.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub total_page_faults: u64,
    pub page_table: Vec<PageTableEntry>,
    pub frames: Vec<Option<usize>>,
}

/// Receiver for simulation output. The engine only ever pushes snapshots
/// through these two operations; presentation lives entirely behind them.
pub trait Reporter {
    fn step(&mut self, snapshot: &StepSnapshot);
    fn summary(&mut self, summary: &RunSummary);
}

/// Reporter that discards everything. Handy for tests and headless runs.
#[derive(Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn step(&mut self, _snapshot: &StepSnapshot) {}
    fn summary(&mut self, _summary: &RunSummary) {}
}

/// Drives page accesses through translation, hit/fault detection, and FIFO
/// eviction, keeping the page table, physical memory, and eviction queue
/// mutually consistent.
#[derive(Debug)]
pub struct Simulator {
    page_table: PageTable,
    physical_memory: PhysicalMemory,
    /// Resident pages in load order, oldest at the front. Hits never reorder
    /// or re-insert; only a fresh load appends.
    fifo_queue: VecDeque<usize>,
    num_frames: usize,
    num_pages: usize,
    page_faults: u64,
    last_access_was_fault: bool,
}

impl Simulator {
    /// Build a simulator for `num_pages` virtual pages backed by `num_frames`
    /// physical frames. Zero counts are a configuration error, not something
    /// a run can recover from.
    pub fn new(num_frames: usize, num_pages: usize) -> Result<Self, ConfigError> {
        if num_frames == 0 {
            return Err(ConfigError::ZeroFrames);
        }
        if num_pages == 0 {
            return Err(ConfigError::ZeroPages);
        }

        Ok(Simulator {
            page_table: PageTable::new(num_pages),
            physical_memory: PhysicalMemory::new(num_frames),
            fifo_queue: VecDeque::with_capacity(num_frames),
            num_frames,
            num_pages,
            page_faults: 0,
            last_access_was_fault: false,
        })
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    #[inline]
    pub fn num_pages(&self) -> usize {
        self.num_pages
    }

    /// Cumulative fault count for the run so far.
    #[inline]
    pub fn page_faults(&self) -> u64 {
        self.page_faults
    }

    /// Whether the most recent access faulted.
    #[inline]
    pub fn last_access_was_fault(&self) -> bool {
        self.last_access_was_fault
    }

    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    pub fn physical_memory(&self) -> &PhysicalMemory {
        &self.physical_memory
    }

    /// Resident pages in eviction order, oldest first.
    pub fn eviction_order(&self) -> Vec<usize> {
        self.fifo_queue.iter().copied().collect()
    }

    /// Turn a raw reference token into a page number.
    ///
    /// This simulator works at page granularity, so the token is the page
    /// number itself; there is no page/offset split to undo. Integer tokens
    /// outside `[0, num_pages)` (including negatives) are out of range;
    /// anything else is unparseable.
    pub fn translate_reference(&self, token: &str) -> Result<usize, ReferenceErrorKind> {
        let page: i64 = token
            .trim()
            .parse()
            .map_err(|_| ReferenceErrorKind::Unparseable)?;
        if page < 0 || page as u64 >= self.num_pages as u64 {
            return Err(ReferenceErrorKind::OutOfRange {
                page,
                num_pages: self.num_pages,
            });
        }
        Ok(page as usize)
    }

    /// Process one access: a hit if the page is resident, otherwise a fault
    /// followed by fault handling.
    ///
    /// An out-of-range page number is rejected before any state changes, so
    /// the structures can never hold a page the table cannot map.
    pub fn access_page(&mut self, page_number: usize) -> Result<(), ReferenceErrorKind> {
        if page_number >= self.num_pages {
            return Err(ReferenceErrorKind::OutOfRange {
                page: page_number as i64,
                num_pages: self.num_pages,
            });
        }
        self.last_access_was_fault = false;

        if self.page_table.is_present(page_number) {
            debug!("page {page_number}: hit");
            return Ok(());
        }

        self.page_faults += 1;
        self.last_access_was_fault = true;
        debug!("page {page_number}: fault #{}", self.page_faults);
        self.handle_page_fault(page_number);
        Ok(())
    }

    /// Find a frame for a faulting page: a free frame if one exists, else the
    /// frame of the oldest-loaded page after evicting it.
    fn handle_page_fault(&mut self, page_number: usize) {
        let frame = match self.physical_memory.find_free_frame() {
            Some(frame) => frame,
            None => self.evict_oldest(),
        };
        self.load_page(page_number, frame);
    }

    /// Evict the FIFO head and return the frame it occupied.
    fn evict_oldest(&mut self) -> usize {
        // Memory is full here, so at least one page is resident and queued;
        // num_frames >= 1 is guaranteed at construction.
        let victim = self
            .fifo_queue
            .pop_front()
            .expect("memory full but eviction queue empty");
        let frame = self
            .page_table
            .get_frame(victim)
            .expect("queued page has no resident mapping");

        debug!("evicting page {victim} from frame {frame}");
        self.physical_memory.free_frame(frame);
        self.page_table.remove_mapping(victim);
        frame
    }

    /// Single mutation point for bringing a page in: page table, physical
    /// memory, and eviction queue are all updated here, together.
    fn load_page(&mut self, page_number: usize, frame_number: usize) {
        self.page_table.set_mapping(page_number, frame_number);
        self.physical_memory.allocate_frame(frame_number, page_number);
        self.fifo_queue.push_back(page_number);
        debug!("loaded page {page_number} into frame {frame_number}");
    }

    /// Process a whole reference sequence, pushing a snapshot to `reporter`
    /// after each processed access and a summary at the end.
    ///
    /// Invalid references are skipped without touching any state; each one is
    /// logged and returned with its position in the sequence. The run never
    /// aborts because of them.
    pub fn run<S, R>(&mut self, references: &[S], reporter: &mut R) -> Vec<ReferenceError>
    where
        S: AsRef<str>,
        R: Reporter + ?Sized,
    {
        info!(
            "starting simulation: {} frames, {} pages, {} references",
            self.num_frames,
            self.num_pages,
            references.len()
        );

        let mut errors = Vec::new();
        for (index, token) in references.iter().enumerate() {
            let token = token.as_ref();
            let page = match self.translate_reference(token) {
                Ok(page) => page,
                Err(kind) => {
                    let err = ReferenceError {
                        index,
                        token: token.to_string(),
                        kind,
                    };
                    warn!("skipping invalid reference: {err}");
                    errors.push(err);
                    continue;
                }
            };

            if let Err(kind) = self.access_page(page) {
                // translate_reference already range-checked, so this arm is
                // only reachable if the two checks ever drift apart
                errors.push(ReferenceError {
                    index,
                    token: token.to_string(),
                    kind,
                });
                continue;
            }
            reporter.step(&self.snapshot(page));
        }

        info!("simulation finished: {} page faults", self.page_faults);
        reporter.summary(&self.final_summary());
        errors
    }

    fn snapshot(&self, accessed_page: usize) -> StepSnapshot {
        StepSnapshot {
            page_table: self.page_table.entries().to_vec(),
            frames: self.physical_memory.frames().to_vec(),
            page_faults: self.page_faults,
            accessed_page,
            page_fault_occurred: self.last_access_was_fault,
        }
    }

    fn final_summary(&self) -> RunSummary {
        RunSummary {
            total_page_faults: self.page_faults,
            page_table: self.page_table.entries().to_vec(),
            frames: self.physical_memory.frames().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reporter that records everything it receives.
    #[derive(Default)]
    struct RecordingReporter {
        steps: Vec<StepSnapshot>,
        summaries: Vec<RunSummary>,
    }

    impl Reporter for RecordingReporter {
        fn step(&mut self, snapshot: &StepSnapshot) {
            self.steps.push(snapshot.clone());
        }
        fn summary(&mut self, summary: &RunSummary) {
            self.summaries.push(summary.clone());
        }
    }

    /// Check the bidirectional frame/table invariant and that the eviction
    /// queue holds exactly the resident pages, without duplicates.
    fn assert_consistent(sim: &Simulator) {
        for (frame, slot) in sim.physical_memory().frames().iter().enumerate() {
            if let Some(page) = slot {
                assert_eq!(
                    sim.page_table().get_frame(*page),
                    Some(frame),
                    "frame {frame} holds page {page} but the table disagrees"
                );
                assert!(sim.page_table().is_present(*page));
            }
        }
        for entry in sim.page_table().entries() {
            if let Some(frame) = entry.frame_number {
                assert_eq!(
                    sim.physical_memory().get_page_in_frame(frame),
                    Some(entry.page_number),
                    "page {} maps to frame {frame} but the frame disagrees",
                    entry.page_number
                );
            }
        }

        let mut queued = sim.eviction_order();
        let mut resident: Vec<usize> = sim
            .page_table()
            .entries()
            .iter()
            .filter(|e| e.present())
            .map(|e| e.page_number)
            .collect();
        queued.sort_unstable();
        resident.sort_unstable();
        let unique = queued.windows(2).all(|w| w[0] != w[1]);
        assert!(unique, "duplicate page in eviction queue");
        assert_eq!(queued, resident, "queue and resident set differ");
    }

    fn run_tokens(sim: &mut Simulator, sequence: &str) -> Vec<ReferenceError> {
        let refs: Vec<&str> = sequence.split_whitespace().collect();
        sim.run(&refs, &mut NullReporter)
    }

    fn resident_pages(sim: &Simulator) -> Vec<usize> {
        let mut pages: Vec<usize> = sim
            .physical_memory()
            .frames()
            .iter()
            .filter_map(|slot| *slot)
            .collect();
        pages.sort_unstable();
        pages
    }

    #[test]
    fn test_rejects_zero_frames() {
        assert_eq!(Simulator::new(0, 8).unwrap_err(), ConfigError::ZeroFrames);
    }

    #[test]
    fn test_rejects_zero_pages() {
        assert_eq!(Simulator::new(4, 0).unwrap_err(), ConfigError::ZeroPages);
    }

    #[test]
    fn test_fifo_three_frames() {
        // Queue evolves [0,1,2] -> [1,2,3] -> [2,3,0] -> [3,0,1] -> [0,1,4]:
        // every access in this sequence faults.
        let mut sim = Simulator::new(3, 8).unwrap();
        let errors = run_tokens(&mut sim, "0 1 2 3 0 1 4");

        assert!(errors.is_empty());
        assert_eq!(sim.page_faults(), 7);
        assert_eq!(resident_pages(&sim), vec![0, 1, 4]);
        assert_consistent(&sim);
    }

    #[test]
    fn test_hits_do_not_fault() {
        let mut sim = Simulator::new(4, 8).unwrap();
        let errors = run_tokens(&mut sim, "1 2 3 1 2 3 4 4");

        assert!(errors.is_empty());
        // Only the first occurrences of 1, 2, 3, 4 fault
        assert_eq!(sim.page_faults(), 4);
        assert_consistent(&sim);
    }

    #[test]
    fn test_single_frame_single_page() {
        let mut sim = Simulator::new(1, 1).unwrap();
        run_tokens(&mut sim, "0 0 0");

        assert_eq!(sim.page_faults(), 1);
        assert!(!sim.last_access_was_fault());
        assert_eq!(resident_pages(&sim), vec![0]);
    }

    #[test]
    fn test_hit_preserves_queue_order_and_memory() {
        let mut sim = Simulator::new(3, 8).unwrap();
        run_tokens(&mut sim, "0 1 2");

        let order_before = sim.eviction_order();
        let frames_before = sim.physical_memory().frames().to_vec();
        let faults_before = sim.page_faults();

        // Re-access the oldest page twice: hit both times, nothing moves
        sim.access_page(0).unwrap();
        assert!(!sim.last_access_was_fault());
        sim.access_page(0).unwrap();
        assert!(!sim.last_access_was_fault());

        assert_eq!(sim.eviction_order(), order_before);
        assert_eq!(sim.physical_memory().frames(), frames_before.as_slice());
        assert_eq!(sim.page_faults(), faults_before);
    }

    #[test]
    fn test_fifo_not_lru() {
        // Page 0 is hit right before memory fills, but it was loaded first,
        // so it is still the first eviction victim.
        let mut sim = Simulator::new(3, 8).unwrap();
        run_tokens(&mut sim, "0 1 2 0 3");

        assert!(!sim.page_table().is_present(0));
        assert_eq!(resident_pages(&sim), vec![1, 2, 3]);
        assert_eq!(sim.eviction_order(), vec![1, 2, 3]);
        assert_consistent(&sim);
    }

    #[test]
    fn test_fault_flag_is_one_shot() {
        let mut sim = Simulator::new(2, 4).unwrap();

        sim.access_page(0).unwrap();
        assert!(sim.last_access_was_fault());

        sim.access_page(0).unwrap();
        assert!(!sim.last_access_was_fault(), "flag must reset on a hit");

        sim.access_page(1).unwrap();
        assert!(sim.last_access_was_fault());
    }

    #[test]
    fn test_translate_reference() {
        let sim = Simulator::new(2, 4).unwrap();

        assert_eq!(sim.translate_reference("3"), Ok(3));
        assert_eq!(sim.translate_reference(" 2 "), Ok(2));
        assert_eq!(
            sim.translate_reference("abc"),
            Err(ReferenceErrorKind::Unparseable)
        );
        assert_eq!(
            sim.translate_reference("4"),
            Err(ReferenceErrorKind::OutOfRange { page: 4, num_pages: 4 })
        );
    }

    #[test]
    fn test_negative_token_is_out_of_range() {
        // A negative reference is an integer outside [0, num_pages), not
        // unparseable garbage
        let sim = Simulator::new(2, 4).unwrap();
        assert_eq!(
            sim.translate_reference("-1"),
            Err(ReferenceErrorKind::OutOfRange { page: -1, num_pages: 4 })
        );
        assert_eq!(
            sim.translate_reference("-37"),
            Err(ReferenceErrorKind::OutOfRange { page: -37, num_pages: 4 })
        );
    }

    #[test]
    fn test_access_page_rejects_out_of_range() {
        let mut sim = Simulator::new(2, 2).unwrap();
        sim.access_page(0).unwrap();

        let err = sim.access_page(5).unwrap_err();
        assert_eq!(err, ReferenceErrorKind::OutOfRange { page: 5, num_pages: 2 });

        // Nothing changed: no fault counted, no frame written, no queue entry
        assert_eq!(sim.page_faults(), 1);
        assert_eq!(sim.eviction_order(), vec![0]);
        assert_eq!(sim.physical_memory().frames(), &[Some(0), None]);
        assert_consistent(&sim);
    }

    #[test]
    fn test_eviction_stays_sound_after_rejected_access() {
        // Fill memory, attempt a bogus access, then force evictions; the
        // rejected page must never surface as a victim
        let mut sim = Simulator::new(2, 3).unwrap();
        sim.access_page(0).unwrap();
        sim.access_page(1).unwrap();

        assert!(sim.access_page(9).is_err());

        sim.access_page(2).unwrap(); // evicts 0
        sim.access_page(0).unwrap(); // evicts 1
        assert_eq!(sim.eviction_order(), vec![2, 0]);
        assert_eq!(sim.page_faults(), 4);
        assert_consistent(&sim);
    }

    #[test]
    fn test_invalid_references_are_skipped() {
        let mut sim = Simulator::new(3, 8).unwrap();
        let errors = run_tokens(&mut sim, "0 1 2 zap 3 99 0 1 4");

        // The valid accesses are exactly scenario "0 1 2 3 0 1 4": 7 faults
        assert_eq!(sim.page_faults(), 7);
        assert_eq!(resident_pages(&sim), vec![0, 1, 4]);

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].index, 3);
        assert_eq!(errors[0].token, "zap");
        assert_eq!(errors[0].kind, ReferenceErrorKind::Unparseable);
        assert_eq!(errors[1].index, 5);
        assert_eq!(
            errors[1].kind,
            ReferenceErrorKind::OutOfRange { page: 99, num_pages: 8 }
        );
        assert_consistent(&sim);
    }

    #[test]
    fn test_snapshots_track_each_access() {
        let mut sim = Simulator::new(2, 4).unwrap();
        let mut reporter = RecordingReporter::default();

        let refs: Vec<&str> = "0 1 0 2".split_whitespace().collect();
        sim.run(&refs, &mut reporter);

        assert_eq!(reporter.steps.len(), 4);

        let faulted: Vec<bool> = reporter
            .steps
            .iter()
            .map(|s| s.page_fault_occurred)
            .collect();
        assert_eq!(faulted, vec![true, true, false, true]);

        let accessed: Vec<usize> = reporter.steps.iter().map(|s| s.accessed_page).collect();
        assert_eq!(accessed, vec![0, 1, 0, 2]);

        // Cumulative count is monotone even where the one-shot flag is false
        let counts: Vec<u64> = reporter.steps.iter().map(|s| s.page_faults).collect();
        assert_eq!(counts, vec![1, 2, 2, 3]);

        assert_eq!(reporter.summaries.len(), 1);
        let summary = &reporter.summaries[0];
        assert_eq!(summary.total_page_faults, 3);
        assert_eq!(summary.frames.len(), 2);
        assert_eq!(summary.page_table.len(), 4);
    }

    #[test]
    fn test_invalid_reference_emits_no_snapshot() {
        let mut sim = Simulator::new(2, 4).unwrap();
        let mut reporter = RecordingReporter::default();

        let refs: Vec<&str> = "0 oops 1".split_whitespace().collect();
        let errors = sim.run(&refs, &mut reporter);

        assert_eq!(errors.len(), 1);
        assert_eq!(reporter.steps.len(), 2);
        assert_eq!(reporter.summaries.len(), 1);
    }

    #[test]
    fn test_consistency_under_heavy_eviction() {
        // More distinct pages than frames, revisited in a churning pattern;
        // the invariant must hold after every single access.
        let mut sim = Simulator::new(3, 10).unwrap();
        let sequence = [0, 1, 2, 3, 4, 0, 5, 1, 6, 2, 7, 3, 8, 4, 9, 0, 1, 2];

        for &page in &sequence {
            sim.access_page(page).unwrap();
            assert_consistent(&sim);
            assert!(resident_pages(&sim).len() <= 3);
        }
    }

    #[test]
    fn test_empty_reference_sequence() {
        let mut sim = Simulator::new(2, 4).unwrap();
        let mut reporter = RecordingReporter::default();

        let errors = sim.run(&Vec::<String>::new(), &mut reporter);

        assert!(errors.is_empty());
        assert!(reporter.steps.is_empty());
        assert_eq!(reporter.summaries.len(), 1);
        assert_eq!(reporter.summaries[0].total_page_faults, 0);
    }
}
