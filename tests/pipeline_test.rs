// tests/pipeline_test.rs
//
// End-to-end runs of the library pipeline over temporary survey folders.

mod test_utils;

use mosstat::config::SurveyConfig;
use mosstat::pipeline::{self, RunOptions};
use mosstat::MosError;
use test_utils::{csv_rows, SurveyFixture};

const TABLES_ONLY: RunOptions = RunOptions {
    plots: false,
    ranking: false,
    copy_artifacts: false,
    json: false,
};

fn ranking_fixture() -> SurveyFixture {
    let fixture = SurveyFixture::new();
    fixture.write_rater(
        "rater0.csv",
        &[
            ("wav/set1/SiFiGAN/seg1_f2.00.wav", "5"),
            ("wav/set1/SiFiGAN/seg2_f2.00.wav", "4"),
            ("wav/set1/VAE_SiFiGAN_v1/seg1_f2.00.wav", "2"),
            ("wav/set1/VAE_SiFiGAN_v1/seg2_f2.00.wav", "4"),
            ("wav/set1/VAE_SiFiGAN_v2/seg1_f2.00.wav", "3"),
        ],
    );
    fixture.write_rater(
        "rater1.csv",
        &[
            ("wav/set1/SiFiGAN/seg1_f2.00.wav", "4"),
            ("wav/set1/VAE_SiFiGAN_v1/seg1_f2.00.wav", "1"),
            ("wav/set1/VAE_SiFiGAN_v1/seg3_f2.00.wav", "5"),
        ],
    );
    fixture
}

#[test]
fn test_reference_scenario_summary_and_pairwise() {
    let fixture = SurveyFixture::new();
    fixture.write_rater(
        "rater.csv",
        &[
            ("file", "score"),
            ("a/b/natural/seg1.wav", "5"),
            ("a/b/natural/seg1.wav", "3"),
            ("a/b/SiFiGAN/seg1_f1.00.wav", "4"),
            ("a/b/SiFiGAN/seg1_f1.00.wav", "4"),
        ],
    );

    let config = SurveyConfig::default();
    let run = pipeline::run(&config, &fixture.paths(), TABLES_ONLY).unwrap();
    assert_eq!(run.input.rows_read, 4);
    assert_eq!(run.input.rows_skipped, 1);

    let summary = fixture.read("results.csv");
    let rows = csv_rows(&summary);
    assert_eq!(
        rows[0],
        vec!["f0factor", "model", "count", "mean", "lower95", "upper95", "mean±margin"]
    );
    assert_eq!(rows[1], vec!["f1.00", "natural", "2", "4.000", "-8.706", "16.706", "4.000±12.706"]);
    assert_eq!(rows[2], vec!["f1.00", "SiFiGAN", "2", "4.000", "4.000", "4.000", "4.000±0.000"]);
    // Empty configured groups still appear
    assert_eq!(rows[3], vec!["f1.00", "VAE_SiFiGAN_v1", "0", "NaN", "NaN", "NaN", "NaN"]);
    assert_eq!(rows.len(), 11);

    let pairwise = fixture.read("analysis/pairwise.csv");
    let rows = csv_rows(&pairwise);
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[1][..8], &["f1.00", "natural", "SiFiGAN", "2", "2", "0.000", "1.000e0", "0.000"]);
    assert_eq!(rows[1][9], "not significant");
    assert_eq!(rows[1][10], "tie");
}

#[test]
fn test_header_row_does_not_change_counts() {
    let with_header = SurveyFixture::new();
    with_header.write_rater(
        "r.csv",
        &[("path", "score"), ("w/s/SiFiGAN/x_f0.50.wav", "3")],
    );
    let without = SurveyFixture::new();
    without.write_rater("r.csv", &[("w/s/SiFiGAN/x_f0.50.wav", "3")]);

    let config = SurveyConfig::default();
    let a = pipeline::run(&config, &with_header.paths(), TABLES_ONLY).unwrap();
    let b = pipeline::run(&config, &without.paths(), TABLES_ONLY).unwrap();
    assert_eq!(a.summary, b.summary);
    assert_eq!(with_header.read("results.csv"), without.read("results.csv"));
}

#[test]
fn test_rankings_and_artifacts() {
    let fixture = ranking_fixture();
    fixture.touch_audio("wav/set1/SiFiGAN/seg1_f2.00.wav");
    fixture.touch_audio("wav/set1/VAE_SiFiGAN_v1/seg1_f2.00.wav");
    fixture.touch_audio("wav/set1/VAE_SiFiGAN_v2/seg1_f2.00.wav");

    let options = RunOptions {
        plots: false,
        ..RunOptions::default()
    };
    let run = pipeline::run(&SurveyConfig::default(), &fixture.paths(), options).unwrap();
    assert_eq!(run.rankings.len(), 3);

    let ranking = fixture.read(
        "analysis/compare_voice/SiFiGAN_vs_VAE_SiFiGAN_v1/f2.00/ranking_SiFiGAN_vs_VAE_SiFiGAN_v1.csv",
    );
    let lines: Vec<&str> = ranking.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Rank,SegmentName,MOS_Difference,SiFiGAN_AvgMOS,VAE_SiFiGAN_v1_AvgMOS,SiFiGAN_Median,VAE_SiFiGAN_v1_Median",
            "1,seg1,3.000,4.500,1.500,4.000,3.000",
            "2,seg2,0.000,4.000,4.000,4.000,3.000",
            "",
            "Total segments: 2",
            "Total raters: 2",
        ]
    );

    let dir = fixture
        .analysis_dir()
        .join("compare_voice/SiFiGAN_vs_VAE_SiFiGAN_v1/f2.00");
    assert!(dir.join("seg1_f2.00_SiFiGAN.wav").is_file());
    assert!(dir.join("seg1_f2.00_VAE_SiFiGAN_v1.wav").is_file());
    assert!(!dir.join("seg2_f2.00_SiFiGAN.wav").exists());
    assert_eq!(run.copies.copied.len(), 6);
    assert_eq!(run.copies.missing.len(), 2);
}

#[test]
fn test_segment_missing_from_one_side_is_not_ranked() {
    let fixture = SurveyFixture::new();
    fixture.write_rater(
        "r.csv",
        &[
            ("w/s/SiFiGAN/seg1_f0.50.wav", "4"),
            ("w/s/VAE_SiFiGAN_v1/seg1_f0.50.wav", "2"),
            ("w/s/VAE_SiFiGAN_v1/seg2_f0.50.wav", "5"),
        ],
    );
    let options = RunOptions {
        plots: false,
        copy_artifacts: false,
        ..RunOptions::default()
    };
    let run = pipeline::run(&SurveyConfig::default(), &fixture.paths(), options).unwrap();
    let table = run
        .rankings
        .iter()
        .find(|t| t.pair.label() == "SiFiGAN_vs_VAE_SiFiGAN_v1")
        .unwrap();
    let ids: Vec<&str> = table.records.iter().map(|r| r.segment_id.as_str()).collect();
    assert_eq!(ids, vec!["seg1"]);
}

#[test]
fn test_unknown_model_aborts_before_writing() {
    let fixture = SurveyFixture::new();
    fixture.write_rater(
        "r.csv",
        &[("wav/set1/SiFiGAN/a_f1.00.wav", "4"), ("wav/set1/HiFiGAN/a_f1.00.wav", "3")],
    );
    let err = pipeline::run(&SurveyConfig::default(), &fixture.paths(), TABLES_ONLY).unwrap_err();
    match err {
        MosError::UnknownModel { model, path } => {
            assert_eq!(model, "HiFiGAN");
            assert_eq!(path, "wav/set1/HiFiGAN/a_f1.00.wav");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!fixture.summary_file().exists());
}

#[test]
fn test_unknown_bucket_is_reported() {
    let fixture = SurveyFixture::new();
    fixture.write_rater("r.csv", &[("loose.wav", "4"), ("w/s/natural/a.wav", "5")]);
    let run = pipeline::run(&SurveyConfig::default(), &fixture.paths(), TABLES_ONLY).unwrap();
    assert_eq!(run.unknown_model_ratings, 1);

    let summary = fixture.read("results.csv");
    let last = csv_rows(&summary).pop().unwrap();
    assert_eq!(last, vec!["f1.00", "unknown_model", "1", "NaN", "NaN", "NaN", "NaN"]);
}

#[test]
fn test_missing_and_empty_input_directories() {
    let fixture = SurveyFixture::new();
    let mut paths = fixture.paths();

    let run = pipeline::run(&SurveyConfig::default(), &paths, TABLES_ONLY).unwrap();
    assert!(run.is_empty());
    assert!(run.written.is_empty());

    paths.input_dir = fixture.root.join("nowhere");
    assert!(matches!(
        pipeline::run(&SurveyConfig::default(), &paths, TABLES_ONLY),
        Err(MosError::NoInput(_))
    ));
}

#[test]
fn test_rater_file_order_does_not_change_results() {
    let rows_a = [("w/s/SiFiGAN/x_f2.00.wav", "1"), ("w/s/SiFiGAN/y_f2.00.wav", "5")];
    let rows_b = [("w/s/SiFiGAN/x_f2.00.wav", "4"), ("w/s/SiFiGAN/y_f2.00.wav", "2")];

    let first = SurveyFixture::new();
    first.write_rater("a.csv", &rows_a);
    first.write_rater("b.csv", &rows_b);
    let second = SurveyFixture::new();
    second.write_rater("a.csv", &rows_b);
    second.write_rater("b.csv", &rows_a);

    let config = SurveyConfig::default();
    pipeline::run(&config, &first.paths(), TABLES_ONLY).unwrap();
    pipeline::run(&config, &second.paths(), TABLES_ONLY).unwrap();
    assert_eq!(first.read("results.csv"), second.read("results.csv"));
}

#[test]
fn test_plots_and_json() {
    let fixture = ranking_fixture();
    let options = RunOptions {
        copy_artifacts: false,
        json: true,
        ..RunOptions::default()
    };
    let run = pipeline::run(&SurveyConfig::default(), &fixture.paths(), options).unwrap();

    let histogram = fixture.analysis_dir().join("fig/SiFiGAN_f0_f2.00.png");
    let bytes = std::fs::read(&histogram).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    assert!(fixture
        .analysis_dir()
        .join("fig/SiFiGAN_vs_VAE_SiFiGAN_v1_f2.00.png")
        .is_file());
    assert!(run.written.contains(&histogram));

    let json: serde_json::Value =
        serde_json::from_str(&fixture.read("analysis/summary.json")).unwrap();
    assert_eq!(json["metadata"]["input_files"], 2);
    assert_eq!(json["metadata"]["rows_read"], 8);
    assert_eq!(json["rankings"].as_array().unwrap().len(), 3);
    assert_eq!(json["config"]["top_k"], 10);
}

#[test]
fn test_out_of_scale_scores_are_counted_not_dropped() {
    let fixture = SurveyFixture::new();
    fixture.write_rater(
        "r.csv",
        &[
            ("w/s/SiFiGAN/x_f2.00.wav", "0"),
            ("w/s/SiFiGAN/x_f2.00.wav", "6"),
            ("w/s/SiFiGAN/x_f2.00.wav", "3"),
        ],
    );
    let run = pipeline::run(&SurveyConfig::default(), &fixture.paths(), TABLES_ONLY).unwrap();
    assert_eq!(run.input.rows_read, 3);
    assert_eq!(run.input.rows_skipped, 0);
    assert_eq!(run.input.rows_out_of_scale, 2);

    let summary = fixture.read("results.csv");
    let row = csv_rows(&summary)
        .into_iter()
        .find(|r| r[0] == "f2.00" && r[1] == "SiFiGAN")
        .unwrap();
    assert_eq!(&row[2..4], &["3", "3.000"]);
}

#[cfg(target_os = "linux")]
#[test]
fn test_file_failing_mid_read_is_unreadable_and_run_continues() {
    // Opening works but every read fails with EIO
    let source = std::path::Path::new("/proc/self/mem");
    if !source.exists() {
        return;
    }
    let fixture = SurveyFixture::new();
    fixture.write_rater("a.csv", &[("w/s/SiFiGAN/x_f1.00.wav", "4")]);
    let broken = fixture.input_dir().join("b.csv");
    std::os::unix::fs::symlink(source, &broken).unwrap();
    fixture.write_rater("c.csv", &[("w/s/SiFiGAN/x_f1.00.wav", "2")]);

    let run = pipeline::run(&SurveyConfig::default(), &fixture.paths(), TABLES_ONLY).unwrap();
    assert_eq!(run.input.files.len(), 3);
    assert_eq!(run.input.unreadable, vec![broken]);
    assert_eq!(run.input.rows_read, 2);
    assert_eq!(run.input.rows_skipped, 0);
    assert!(fixture.summary_file().is_file());
}

#[test]
fn test_unwritable_summary_is_fatal() {
    let fixture = SurveyFixture::new();
    fixture.write_rater("r.csv", &[("w/s/SiFiGAN/x_f1.00.wav", "4")]);
    // A regular file where the output directory should be
    let blocker = fixture.root.join("blocker");
    std::fs::write(&blocker, b"").unwrap();
    let mut paths = fixture.paths();
    paths.summary_file = blocker.join("results.csv");

    let err = pipeline::run(&SurveyConfig::default(), &paths, TABLES_ONLY).unwrap_err();
    assert!(matches!(err, MosError::Io { .. }), "unexpected error: {err}");
    assert!(!paths.summary_file.exists());
}
