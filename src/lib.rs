pub mod error;
pub mod io;
pub mod memory;
pub mod simulator;

// Re-export commonly used items for convenience
pub use error::{ConfigError, ReferenceError, ReferenceErrorKind};
pub use memory::{PageTable, PageTableEntry, PhysicalMemory};
pub use simulator::{NullReporter, Reporter, RunSummary, Simulator, StepSnapshot};
