//! Batch Processor: runs the pipeline per style and assembles the report

pub mod processor;
pub mod report;

pub use processor::{BatchProcessor, StyleOutcome, StyleRequest, search_key};
pub use report::{BatchReport, BatchSummary, FailureKind, FailureReport};
