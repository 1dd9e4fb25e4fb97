pub mod delay;
pub mod report;
pub mod stats;

pub use report::DelayReport;
