pub mod aggregator;
pub mod dedup;
pub mod matcher;
pub mod ranking;
pub mod recommendations;
pub mod sources;

pub use aggregator::{Aggregate, Aggregator, BranchOutcome};
