// src/report/tables.rs
//
// CSV rendering of the summary, pairwise, distribution and ranking tables.

use log::info;
use std::path::Path;

use super::{fmt3, fmt_p, write_atomic, UNDEFINED};
use crate::core::stats::DistributionRecord;
use crate::core::{PairwiseTestRecord, RankingTable, SummaryRecord};
use crate::error::{MosError, Result};

/// Render rows through a csv writer into a string
fn render<F>(fill: F) -> csv::Result<String>
where
    F: FnOnce(&mut csv::Writer<&mut Vec<u8>>) -> csv::Result<()>,
{
    let mut buf = Vec::new();
    {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(&mut buf);
        fill(&mut writer)?;
        writer.flush()?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn write_table(path: &Path, rendered: csv::Result<String>) -> Result<()> {
    let text = rendered.map_err(|source| MosError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, text.as_bytes())?;
    info!("wrote {}", path.display());
    Ok(())
}

pub fn summary_header(confidence_label: &str) -> Vec<String> {
    vec![
        "f0factor".into(),
        "model".into(),
        "count".into(),
        "mean".into(),
        format!("lower{}", confidence_label),
        format!("upper{}", confidence_label),
        "mean±margin".into(),
    ]
}

/// One summary row. Below two ratings every numeric field but the count
/// is undefined.
pub fn summary_row(record: &SummaryRecord) -> Vec<String> {
    let mut row = vec![
        record.key.pitch_factor.clone(),
        record.key.model.clone(),
        record.count.to_string(),
    ];
    match (record.ci.mean, record.ci.lower, record.ci.upper, record.ci.margin) {
        (Some(mean), Some(lower), Some(upper), Some(margin)) if record.has_interval() => {
            row.push(fmt3(Some(mean)));
            row.push(fmt3(Some(lower)));
            row.push(fmt3(Some(upper)));
            row.push(format!("{:.3}±{:.3}", mean, margin));
        }
        _ => row.extend(std::iter::repeat(UNDEFINED.to_string()).take(4)),
    }
    row
}

pub fn render_summary(records: &[SummaryRecord], confidence_label: &str) -> csv::Result<String> {
    render(|w| {
        w.write_record(summary_header(confidence_label))?;
        for record in records {
            w.write_record(summary_row(record))?;
        }
        Ok(())
    })
}

pub fn write_summary(path: &Path, records: &[SummaryRecord], confidence_label: &str) -> Result<()> {
    write_table(path, render_summary(records, confidence_label))
}

pub fn render_pairwise(records: &[PairwiseTestRecord]) -> csv::Result<String> {
    render(|w| {
        w.write_record([
            "f0factor",
            "model_a",
            "model_b",
            "n_a",
            "n_b",
            "t",
            "p",
            "cohens_d",
            "hedges_g",
            "verdict",
            "higher_mean",
        ])?;
        for r in records {
            w.write_record([
                r.pitch_factor.clone(),
                r.model_a.clone(),
                r.model_b.clone(),
                r.n_a.to_string(),
                r.n_b.to_string(),
                fmt3(r.welch.map(|t| t.t)),
                fmt_p(r.welch.map(|t| t.p)),
                fmt3(r.effect.map(|e| e.cohens_d)),
                fmt3(r.effect.map(|e| e.hedges_g)),
                r.verdict.significance.label().to_string(),
                r.verdict.higher_mean.label().to_string(),
            ])?;
        }
        Ok(())
    })
}

pub fn write_pairwise(path: &Path, records: &[PairwiseTestRecord]) -> Result<()> {
    write_table(path, render_pairwise(records))
}

pub fn render_distribution(records: &[DistributionRecord]) -> csv::Result<String> {
    render(|w| {
        w.write_record(["f0factor", "model", "count", "median", "shapiro_w", "shapiro_p"])?;
        for r in records {
            w.write_record([
                r.key.pitch_factor.clone(),
                r.key.model.clone(),
                r.count.to_string(),
                fmt3(r.median),
                fmt3(r.shapiro.map(|s| s.w)),
                fmt_p(r.shapiro.map(|s| s.p)),
            ])?;
        }
        Ok(())
    })
}

pub fn write_distribution(path: &Path, records: &[DistributionRecord]) -> Result<()> {
    write_table(path, render_distribution(records))
}

/// Full ranking followed by a blank line and the totals
pub fn render_ranking(table: &RankingTable) -> csv::Result<String> {
    let (a, b) = (&table.pair.a, &table.pair.b);
    let mut text = render(|w| {
        w.write_record([
            "Rank".to_string(),
            "SegmentName".to_string(),
            "MOS_Difference".to_string(),
            format!("{}_AvgMOS", a),
            format!("{}_AvgMOS", b),
            format!("{}_Median", a),
            format!("{}_Median", b),
        ])?;
        for r in &table.records {
            w.write_record([
                r.rank.to_string(),
                r.segment_id.clone(),
                fmt3(Some(r.difference)),
                fmt3(Some(r.mean_a)),
                fmt3(Some(r.mean_b)),
                fmt3(table.median_a),
                fmt3(table.median_b),
            ])?;
        }
        Ok(())
    })?;
    text.push('\n');
    text.push_str(&format!("Total segments: {}\n", table.total_segments()));
    text.push_str(&format!("Total raters: {}\n", table.total_raters));
    Ok(text)
}

pub fn write_ranking(path: &Path, table: &RankingTable) -> Result<()> {
    write_table(path, render_ranking(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelPair;
    use crate::core::stats::compare_groups;
    use crate::core::{ClassificationKey, RankingRecord};

    fn summary(model: &str, scores: &[f64]) -> SummaryRecord {
        SummaryRecord::from_scores(ClassificationKey::new(model, "f1.00"), scores, 0.95)
    }

    #[test]
    fn test_summary_rows() {
        let text = render_summary(
            &[summary("natural", &[5.0, 3.0]), summary("SiFiGAN", &[4.0])],
            "95",
        )
        .unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "f0factor,model,count,mean,lower95,upper95,mean±margin");
        // t(0.975, 1) * 1.414 / 1.414 = 12.706
        assert_eq!(lines[1], "f1.00,natural,2,4.000,-8.706,16.706,4.000±12.706");
        assert_eq!(lines[2], "f1.00,SiFiGAN,1,NaN,NaN,NaN,NaN");
    }

    #[test]
    fn test_summary_values_survive_reparse() {
        let record = summary("SiFiGAN", &[4.0, 3.0, 5.0, 4.0, 2.0, 4.0]);
        let text = render_summary(&[record.clone()], "95").unwrap();
        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let row = reader.records().next().unwrap().unwrap();
        let parsed: Vec<f64> = (3..6).map(|i| row[i].parse().unwrap()).collect();
        let expected = [record.ci.mean, record.ci.lower, record.ci.upper];
        for (value, want) in parsed.iter().zip(expected) {
            assert!((value - want.unwrap()).abs() <= 0.0005);
        }
    }

    #[test]
    fn test_pairwise_undefined_fields() {
        let record = compare_groups("f2.00", ("a", &[5.0]), ("b", &[1.0, 2.0]), 0.05);
        let text = render_pairwise(&[record]).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row, "f2.00,a,b,1,2,NaN,NaN,NaN,NaN,undefined,a");
    }

    #[test]
    fn test_ranking_layout() {
        let table = RankingTable {
            pitch_factor: "f0.50".into(),
            pair: ModelPair::new("SiFiGAN", "VAE_SiFiGAN_v2"),
            records: vec![RankingRecord {
                rank: 1,
                segment_id: "seg1".into(),
                mean_a: 4.5,
                mean_b: 2.0,
                difference: 2.5,
                ratings_a: 2,
                ratings_b: 1,
                source_a: "a.wav".into(),
                source_b: "b.wav".into(),
            }],
            median_a: Some(4.0),
            median_b: None,
            total_raters: 2,
        };
        let text = render_ranking(&table).unwrap();
        assert_eq!(
            text,
            "Rank,SegmentName,MOS_Difference,SiFiGAN_AvgMOS,VAE_SiFiGAN_v2_AvgMOS,SiFiGAN_Median,VAE_SiFiGAN_v2_Median\n\
             1,seg1,2.500,4.500,2.000,4.000,NaN\n\
             \n\
             Total segments: 1\n\
             Total raters: 2\n"
        );
    }
}
