//! Classification, accumulation, statistics and ranking

pub mod classify;
pub mod ranking;
pub mod stats;
pub mod store;

pub use classify::{ClassificationKey, PathClassifier};
pub use ranking::{rank_all, RankingRecord, RankingTable};
pub use stats::{DistributionRecord, PairwiseTestRecord, SummaryRecord};
pub use store::{GroupAccumulator, IngestMode, RawObservation, ScoreStore};
