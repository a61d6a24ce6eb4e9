pub mod filters;
pub mod scanner;

pub use filters::ExcludeSet;
pub use scanner::{ScanConfig, ScanError, ScanOutcome, Scanner};
