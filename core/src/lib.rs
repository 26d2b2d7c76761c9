// Scout Core Library
// Scan orchestration: tool probe, output parsers and the scan executor.

mod scanner;

// Re-export the public surface
pub use scanner::executor::{select_strategy, ScanExecutor, SCAN_TOOLS};
pub use scanner::probe::is_available;
pub use scanner::{Finding, ParsedOutput, ScanOutcome, ScanRunner, Severity, ToolStrategy};

pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum ScanError {
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("timed out after {secs}s")]
        Timeout { secs: u64 },
    }

    pub type Result<T> = std::result::Result<T, ScanError>;
}
