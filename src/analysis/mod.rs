//! Answer analysis.
//!
//! Label resolution, entry extraction and the aggregation that turns a
//! schema plus a response corpus into the analytics payload.

pub mod aggregator;
pub mod extractor;
pub mod labels;

pub use aggregator::*;
