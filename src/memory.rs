use std::fmt;

/// One virtual page's mapping state.
///
/// `frame_number` is `None` while the page is not resident; presence is
/// derived from it, so the two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTableEntry {
    pub page_number: usize,
    pub frame_number: Option<usize>,
}

impl PageTableEntry {
    #[inline]
    pub fn present(&self) -> bool {
        self.frame_number.is_some()
    }
}

impl fmt::Display for PageTableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frame_number {
            Some(frame) => write!(f, "Page {}: Frame {}", self.page_number, frame),
            None => write!(f, "Page {}: Not in memory", self.page_number),
        }
    }
}

/// Page table - maps virtual pages to physical frames.
///
/// Holds exactly one entry per page in `[0, num_pages)`, created up front and
/// never added to or removed from during a run.
#[derive(Debug)]
pub struct PageTable {
    entries: Vec<PageTableEntry>,
}

impl PageTable {
    pub fn new(num_pages: usize) -> Self {
        let entries = (0..num_pages)
            .map(|page_number| PageTableEntry {
                page_number,
                frame_number: None,
            })
            .collect();
        PageTable { entries }
    }

    #[inline]
    pub fn num_pages(&self) -> usize {
        self.entries.len()
    }

    /// The entry for a page, or `None` if the page number is out of range.
    pub fn get_entry(&self, page_number: usize) -> Option<&PageTableEntry> {
        self.entries.get(page_number)
    }

    /// Map `page_number` to `frame_number`. No-op for an out-of-range page;
    /// no other entry is touched.
    pub fn set_mapping(&mut self, page_number: usize, frame_number: usize) {
        if let Some(entry) = self.entries.get_mut(page_number) {
            entry.frame_number = Some(frame_number);
        }
    }

    /// Drop the mapping for `page_number`. No-op for an out-of-range page.
    pub fn remove_mapping(&mut self, page_number: usize) {
        if let Some(entry) = self.entries.get_mut(page_number) {
            entry.frame_number = None;
        }
    }

    /// Whether the page is resident. `false` for out-of-range pages.
    pub fn is_present(&self, page_number: usize) -> bool {
        self.get_entry(page_number).is_some_and(|e| e.present())
    }

    /// The frame holding the page, `None` for unmapped or out-of-range pages.
    pub fn get_frame(&self, page_number: usize) -> Option<usize> {
        self.get_entry(page_number).and_then(|e| e.frame_number)
    }

    /// All entries in page-number order (for snapshots).
    pub fn entries(&self) -> &[PageTableEntry] {
        &self.entries
    }
}

/// Render page-table entries as the text table shown to the user. Also used
/// for snapshot contents, which carry plain entry slices.
pub fn render_page_table(entries: &[PageTableEntry]) -> String {
    let mut out = String::from("Page Table:\n");
    out.push_str(&"-".repeat(40));
    out.push('\n');
    for entry in entries {
        out.push_str(&format!("  {}\n", entry));
    }
    out
}

/// Render frame slots as the text table shown to the user.
pub fn render_frames(frames: &[Option<usize>]) -> String {
    let mut out = String::from("Physical Memory:\n");
    out.push_str(&"-".repeat(40));
    out.push('\n');
    for (i, slot) in frames.iter().enumerate() {
        match slot {
            Some(page) => out.push_str(&format!("  Frame {}: Page {}\n", i, page)),
            None => out.push_str(&format!("  Frame {}: Empty\n", i)),
        }
    }
    out
}

impl fmt::Display for PageTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_page_table(&self.entries))
    }
}

/// Physical memory - a fixed array of frames, each holding the page number
/// currently loaded into it.
///
/// Purely passive storage; which page goes where is decided by the simulator.
#[derive(Debug)]
pub struct PhysicalMemory {
    frames: Vec<Option<usize>>,
}

impl PhysicalMemory {
    pub fn new(num_frames: usize) -> Self {
        PhysicalMemory {
            frames: vec![None; num_frames],
        }
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Place `page_number` into the given frame. Returns `false` for an
    /// out-of-range frame index.
    pub fn allocate_frame(&mut self, frame_number: usize, page_number: usize) -> bool {
        match self.frames.get_mut(frame_number) {
            Some(slot) => {
                *slot = Some(page_number);
                true
            }
            None => false,
        }
    }

    /// Mark a frame empty. No-op for an out-of-range frame index.
    pub fn free_frame(&mut self, frame_number: usize) {
        if let Some(slot) = self.frames.get_mut(frame_number) {
            *slot = None;
        }
    }

    /// The page occupying a frame, `None` for empty or out-of-range frames.
    pub fn get_page_in_frame(&self, frame_number: usize) -> Option<usize> {
        self.frames.get(frame_number).copied().flatten()
    }

    /// Index of the lowest-numbered empty frame, if any.
    pub fn find_free_frame(&self) -> Option<usize> {
        self.frames.iter().position(|slot| slot.is_none())
    }

    /// All frame slots in frame order (for snapshots).
    pub fn frames(&self) -> &[Option<usize>] {
        &self.frames
    }
}

impl fmt::Display for PhysicalMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_frames(&self.frames))
    }
}
