// src/core/ranking.rs
//
// Segment-level comparison of two groups: matched segments ordered by the
// absolute gap between their mean scores.

use log::debug;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::classify::ClassificationKey;
use super::stats::{mean, median};
use super::store::{GroupAccumulator, ScoreStore};
use crate::config::{ModelPair, SurveyConfig};

/// One matched segment, ranked
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRecord {
    /// 1-based, contiguous
    pub rank: usize,
    pub segment_id: String,
    pub mean_a: f64,
    pub mean_b: f64,
    pub difference: f64,
    pub ratings_a: usize,
    pub ratings_b: usize,
    /// Representative source files, used for artifact extraction
    pub source_a: String,
    pub source_b: String,
}

/// Full ranking of one model pair at one pitch factor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingTable {
    pub pitch_factor: String,
    pub pair: ModelPair,
    pub records: Vec<RankingRecord>,
    /// Medians over every score of each group, not per segment
    pub median_a: Option<f64>,
    pub median_b: Option<f64>,
    /// Distinct raters behind the matched segments, both sides
    pub total_raters: usize,
}

impl RankingTable {
    pub fn total_segments(&self) -> usize {
        self.records.len()
    }

    /// Leading `k` records (fewer when the ranking is shorter)
    pub fn top_k(&self, k: usize) -> &[RankingRecord] {
        &self.records[..k.min(self.records.len())]
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Rank the segments present in both groups by |mean_a - mean_b|,
/// largest first. Ties keep the first-seen order of group A's segments.
pub fn rank(group_a: &GroupAccumulator, group_b: &GroupAccumulator) -> Vec<RankingRecord> {
    let mut matched = Vec::new();
    for seg_a in group_a.segments() {
        let Some(seg_b) = group_b.segment(&seg_a.segment_id) else {
            continue;
        };
        let (Some(mean_a), Some(mean_b)) = (mean(&seg_a.scores), mean(&seg_b.scores)) else {
            continue;
        };
        matched.push(RankingRecord {
            rank: 0,
            segment_id: seg_a.segment_id.clone(),
            mean_a,
            mean_b,
            difference: (mean_a - mean_b).abs(),
            ratings_a: seg_a.scores.len(),
            ratings_b: seg_b.scores.len(),
            source_a: seg_a.source_path.clone(),
            source_b: seg_b.source_path.clone(),
        });
    }

    // Stable: equal differences stay in insertion order
    matched.sort_by(|x, y| {
        y.difference
            .partial_cmp(&x.difference)
            .unwrap_or(Ordering::Equal)
    });
    for (idx, record) in matched.iter_mut().enumerate() {
        record.rank = idx + 1;
    }
    matched
}

fn matched_raters(group_a: &GroupAccumulator, group_b: &GroupAccumulator, records: &[RankingRecord]) -> usize {
    let mut raters = BTreeSet::new();
    for record in records {
        for group in [group_a, group_b] {
            if let Some(segment) = group.segment(&record.segment_id) {
                raters.extend(segment.raters().iter().copied());
            }
        }
    }
    raters.len()
}

/// Rank one pair at one pitch factor; `None` when either group has no ratings
pub fn rank_pair(store: &ScoreStore<'_>, pair: &ModelPair, pitch_factor: &str) -> Option<RankingTable> {
    let group_a = store.group(&ClassificationKey::new(&pair.a, pitch_factor))?;
    let group_b = store.group(&ClassificationKey::new(&pair.b, pitch_factor))?;

    let records = rank(group_a, group_b);
    let total_raters = matched_raters(group_a, group_b, &records);
    debug!(
        "{} @ {}: {} matched segments",
        pair.label(),
        pitch_factor,
        records.len()
    );

    Some(RankingTable {
        pitch_factor: pitch_factor.to_string(),
        pair: pair.clone(),
        records,
        median_a: median(group_a.scores()),
        median_b: median(group_b.scores()),
        total_raters,
    })
}

/// Rankings for every configured pair at every pitch factor where both
/// models were rated.
pub fn rank_all(store: &ScoreStore<'_>, config: &SurveyConfig) -> Vec<RankingTable> {
    let pairs = config.ranking_pairs();
    let mut tables = Vec::new();
    for pitch in config.pitch_factors.report_order() {
        for pair in &pairs {
            match rank_pair(store, pair, pitch) {
                Some(table) => tables.push(table),
                None => debug!("skipping {} @ {}: a side has no ratings", pair.label(), pitch),
            }
        }
    }
    tables
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{IngestMode, RawObservation};

    fn group(rows: &[(&str, f64, usize)]) -> GroupAccumulator {
        let mut group = GroupAccumulator::new();
        for (segment, score, rater) in rows {
            group.push_segment(segment, &format!("w/{}.wav", segment), *score, *rater);
        }
        group
    }

    #[test]
    fn test_unmatched_segments_are_excluded() {
        let a = group(&[("seg1", 4.0, 0)]);
        let b = group(&[("seg1", 2.0, 0), ("seg2", 5.0, 0)]);
        let ranking = rank(&a, &b);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].segment_id, "seg1");
        assert_eq!(ranking[0].difference, 2.0);
    }

    #[test]
    fn test_no_common_segments_gives_empty_ranking() {
        let a = group(&[("x", 4.0, 0)]);
        let b = group(&[("y", 2.0, 0)]);
        assert!(rank(&a, &b).is_empty());
    }

    #[test]
    fn test_descending_order_and_contiguous_ranks() {
        let a = group(&[
            ("s1", 3.0, 0),
            ("s2", 5.0, 0),
            ("s3", 1.0, 0),
            ("s3", 3.0, 1),
            ("s4", 4.0, 0),
        ]);
        let b = group(&[("s1", 3.0, 0), ("s2", 1.0, 0), ("s3", 4.0, 0), ("s4", 3.0, 0)]);
        let ranking = rank(&a, &b);
        let ids: Vec<&str> = ranking.iter().map(|r| r.segment_id.as_str()).collect();
        // s2: 4, s3: |2 - 4| = 2, s4: 1, s1: 0
        assert_eq!(ids, vec!["s2", "s3", "s4", "s1"]);
        let ranks: Vec<usize> = ranking.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        assert!(ranking.windows(2).all(|w| w[0].difference >= w[1].difference));
        assert_eq!(ranking[1].mean_a, 2.0);
        assert_eq!(ranking[1].ratings_a, 2);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let a = group(&[("c", 4.0, 0), ("a", 4.0, 0), ("b", 2.0, 0)]);
        let b = group(&[("a", 3.0, 0), ("b", 1.0, 0), ("c", 3.0, 0)]);
        let ids: Vec<String> = rank(&a, &b).into_iter().map(|r| r.segment_id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_single_rating_segments_are_ranked() {
        let a = group(&[("s", 5.0, 0)]);
        let b = group(&[("s", 1.0, 3)]);
        let ranking = rank(&a, &b);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].rank, 1);
    }

    #[test]
    fn test_rank_pair_reports_context() {
        let config = SurveyConfig::default();
        let mut store = ScoreStore::new(&config);
        let rows = [
            RawObservation::new("w/s1/SiFiGAN/seg1_f2.00.wav", 5, 0),
            RawObservation::new("w/s1/SiFiGAN/seg2_f2.00.wav", 3, 0),
            RawObservation::new("w/s1/SiFiGAN/seg1_f2.00.wav", 4, 1),
            RawObservation::new("w/s1/VAE_SiFiGAN_v1/seg1_f2.00.wav", 2, 1),
            RawObservation::new("w/s1/VAE_SiFiGAN_v1/seg3_f2.00.wav", 1, 2),
        ];
        store.ingest_all(&rows, IngestMode::Segmented).unwrap();

        let pair = ModelPair::new("SiFiGAN", "VAE_SiFiGAN_v1");
        let table = rank_pair(&store, &pair, "f2.00").unwrap();
        assert_eq!(table.total_segments(), 1);
        assert_eq!(table.records[0].segment_id, "seg1");
        assert_eq!(table.records[0].difference, 2.5);
        assert_eq!(table.records[0].source_b, "w/s1/VAE_SiFiGAN_v1/seg1_f2.00.wav");
        // Group-wide medians: [5, 3, 4] and [2, 1]
        assert_eq!(table.median_a, Some(4.0));
        assert_eq!(table.median_b, Some(1.5));
        // seg1 was rated by raters 0 and 1
        assert_eq!(table.total_raters, 2);

        assert!(rank_pair(&store, &pair, "f0.50").is_none());
    }

    #[test]
    fn test_top_k_is_bounded() {
        let a = group(&[("a", 1.0, 0), ("b", 2.0, 0), ("c", 5.0, 0)]);
        let b = group(&[("a", 1.0, 0), ("b", 1.0, 0), ("c", 1.0, 0)]);
        let table = RankingTable {
            pitch_factor: "f1.00".into(),
            pair: ModelPair::new("x", "y"),
            records: rank(&a, &b),
            median_a: None,
            median_b: None,
            total_raters: 1,
        };
        assert_eq!(table.top_k(2).len(), 2);
        assert_eq!(table.top_k(2)[0].segment_id, "c");
        assert_eq!(table.top_k(10).len(), 3);
    }

    #[test]
    fn test_rank_all_uses_default_pairs() {
        let config = SurveyConfig::default();
        let mut store = ScoreStore::new(&config);
        let rows = [
            RawObservation::new("w/s/SiFiGAN/x_f0.50.wav", 4, 0),
            RawObservation::new("w/s/VAE_SiFiGAN_v1/x_f0.50.wav", 2, 0),
            RawObservation::new("w/s/VAE_SiFiGAN_v2/x_f0.50.wav", 3, 0),
            RawObservation::new("w/s/natural/x.wav", 5, 0),
        ];
        store.ingest_all(&rows, IngestMode::Segmented).unwrap();
        let tables = rank_all(&store, &config);
        assert_eq!(tables.len(), 3);
        assert!(tables.iter().all(|t| t.pitch_factor == "f0.50"));
        assert_eq!(tables[0].pair.label(), "SiFiGAN_vs_VAE_SiFiGAN_v1");
    }
}
