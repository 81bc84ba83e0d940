//! Console collaborator: collects the simulation configuration and renders
//! per-step and final reports. Nothing in here touches engine state.

use std::io::{self, BufRead, Write};

use crate::error::InputError;
use crate::memory::{render_frames, render_page_table};
use crate::simulator::{Reporter, RunSummary, StepSnapshot};

pub const DEFAULT_NUM_FRAMES: usize = 4;
pub const DEFAULT_NUM_PAGES: usize = 8;
pub const DEFAULT_REFERENCES: &str = "0 1 2 3 0 1 4 0 1 2 3 4";

/// Everything the engine needs, collected before it is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    pub num_frames: usize,
    pub num_pages: usize,
    pub references: Vec<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            num_frames: DEFAULT_NUM_FRAMES,
            num_pages: DEFAULT_NUM_PAGES,
            references: split_references(DEFAULT_REFERENCES),
        }
    }
}

fn split_references(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// Parse a prompted count. An empty line accepts the default.
fn parse_count(line: &str, what: &'static str, default: usize) -> Result<usize, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(default);
    }
    line.parse().map_err(|_| InputError::BadNumber {
        what,
        value: line.to_string(),
    })
}

/// Prompt for the three configuration values on the given reader/writer pair.
///
/// Empty answers fall back to the classroom defaults (4 frames, 8 pages, the
/// 12-reference demo sequence).
pub fn prompt_config<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<SimConfig, InputError> {
    let mut line = String::new();

    write!(output, "Number of physical frames [{}]: ", DEFAULT_NUM_FRAMES)?;
    output.flush()?;
    input.read_line(&mut line)?;
    let num_frames = parse_count(&line, "frame count", DEFAULT_NUM_FRAMES)?;

    line.clear();
    write!(output, "Number of virtual pages [{}]: ", DEFAULT_NUM_PAGES)?;
    output.flush()?;
    input.read_line(&mut line)?;
    let num_pages = parse_count(&line, "page count", DEFAULT_NUM_PAGES)?;

    line.clear();
    write!(output, "Access sequence [{}]: ", DEFAULT_REFERENCES)?;
    output.flush()?;
    input.read_line(&mut line)?;
    let references = if line.trim().is_empty() {
        split_references(DEFAULT_REFERENCES)
    } else {
        split_references(&line)
    };

    Ok(SimConfig {
        num_frames,
        num_pages,
        references,
    })
}

/// Prompt for configuration on stdin/stdout.
pub fn read_config() -> Result<SimConfig, InputError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    prompt_config(&mut input, &mut output)
}

/// Reporter that prints each step and the final report to stdout.
///
/// In step-by-step mode it waits for Enter between accesses; the pacing has no
/// effect on the engine, which has already committed the access.
pub struct ConsoleReporter {
    step_by_step: bool,
}

impl ConsoleReporter {
    pub fn new(step_by_step: bool) -> Self {
        ConsoleReporter { step_by_step }
    }

    fn pause(&self) {
        if !self.step_by_step {
            return;
        }
        print!("  Press Enter for the next access...");
        // Pacing only: a failed read just means we stop pausing
        if io::stdout().flush().is_ok() {
            let mut line = String::new();
            let _ = io::stdin().read_line(&mut line);
        }
    }
}

impl Reporter for ConsoleReporter {
    fn step(&mut self, snapshot: &StepSnapshot) {
        let outcome = if snapshot.page_fault_occurred {
            "PAGE FAULT"
        } else {
            "HIT"
        };
        println!();
        println!(
            "Access: page {} -> {} (faults so far: {})",
            snapshot.accessed_page, outcome, snapshot.page_faults
        );
        print!("{}", render_page_table(&snapshot.page_table));
        print!("{}", render_frames(&snapshot.frames));
        self.pause();
    }

    fn summary(&mut self, summary: &RunSummary) {
        println!();
        println!("{}", "=".repeat(50));
        println!("FINAL REPORT");
        println!("Total page faults: {}", summary.total_page_faults);
        println!("{}", "=".repeat(50));
        print!("{}", render_page_table(&summary.page_table));
        print!("{}", render_frames(&summary.frames));
    }
}
