use std::fs;
use std::path::Path;

use pool_report::execution::ExecutionOptions;
use pool_report::pipeline::{discover, run_pipeline, PipelineConfig, ScanMode};

fn config_for(output: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::new("tests/fixtures/pools");
    config.output_dir = output.to_path_buf();
    config.mode = ScanMode::All;
    config.execution = ExecutionOptions {
        num_threads: Some(2),
        max_in_flight_files: 2,
    };
    config
}

#[test]
fn discovers_fixture_files_sorted() {
    let out = tempfile::tempdir().unwrap();
    let files = discover(&config_for(out.path())).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "Pool_0201_395.pol",
            "Pool_0002_50001234_X.pol",
            "unnamed.pol",
            "Pool_0003_12.pol",
        ]
    );
}

#[test]
fn pattern_restricts_full_scan() {
    let out = tempfile::tempdir().unwrap();
    let mut config = config_for(out.path());
    config.pattern = Some("a/*.pol".to_string());
    assert_eq!(discover(&config).unwrap().len(), 1);
}

#[test]
fn full_run_writes_reports_summary_and_index() {
    let out = tempfile::tempdir().unwrap();
    let summary = run_pipeline(&config_for(out.path())).unwrap();

    assert_eq!(summary.total_files_processed, 4);
    assert_eq!(summary.successful_transforms, 3);
    assert_eq!(summary.failed_transforms, 1);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].file, "b/unnamed.pol");
    assert!(summary.errors[0].error.contains("invalid metadata"));

    // One document per source file, mirroring the source layout.
    let report_path = out.path().join("a/Pool_0201_395.json");
    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["metadata"]["source_file"], "a/Pool_0201_395.pol");
    assert_eq!(report["metadata"]["pool_id"], "0201");
    assert_eq!(report["statistics"]["summary"]["total_sum"], 7740);

    let empty: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.path().join("empty/Pool_0003_12.json")).unwrap()).unwrap();
    assert_eq!(empty["statistics"]["summary"]["total_records"], 0);
    assert_eq!(empty["sample_data"]["first_10"], serde_json::json!([]));

    let agg = summary.aggregated.as_ref().unwrap();
    assert_eq!(agg.total_files, 3);
    assert_eq!(agg.total_records, 30);
    assert_eq!(agg.total_skipped_lines, 1);
    assert_eq!(agg.files_by_folder["a"], 1);
    assert_eq!(agg.files_by_folder["empty"], 1);

    let run_summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.path().join("_pipeline_summary.json")).unwrap()).unwrap();
    assert_eq!(run_summary["successful_transforms"], 3);
    assert_eq!(run_summary["output_files"].as_array().unwrap().len(), 3);

    let csv = fs::read_to_string(out.path().join("_all_files_summary.csv")).unwrap();
    assert_eq!(csv.lines().count(), 4);
}

#[test]
fn csv_index_can_be_disabled() {
    let out = tempfile::tempdir().unwrap();
    let mut config = config_for(out.path());
    config.write_csv_index = false;
    run_pipeline(&config).unwrap();
    assert!(!out.path().join("_all_files_summary.csv").exists());
    assert!(out.path().join("_pipeline_summary.json").exists());
}

#[test]
fn invalid_execution_options_fail_the_run() {
    let out = tempfile::tempdir().unwrap();
    let mut config = config_for(out.path());
    config.execution.max_in_flight_files = 0;
    let err = run_pipeline(&config).unwrap_err();
    assert!(err.to_string().contains("max_in_flight_files"));
}

#[test]
fn unwritable_report_counts_as_failure_everywhere() {
    let out = tempfile::tempdir().unwrap();
    // A plain file where the `a/` output directory should go.
    fs::write(out.path().join("a"), "not a directory").unwrap();

    let summary = run_pipeline(&config_for(out.path())).unwrap();

    assert_eq!(summary.total_files_processed, 4);
    assert_eq!(summary.successful_transforms, 2);
    assert_eq!(summary.failed_transforms, 2);
    assert_eq!(summary.errors.len(), 2);
    assert_eq!(summary.output_files.len(), 2);
    assert!(summary.errors.iter().any(|e| e.file == "a/Pool_0201_395.pol"));

    let agg = summary.aggregated.as_ref().unwrap();
    assert_eq!(agg.total_files, 2);
    assert!(!agg.files_by_folder.contains_key("a"));

    let csv = fs::read_to_string(out.path().join("_all_files_summary.csv")).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(!csv.contains("a/Pool_0201_395.pol"));

    let on_disk: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.path().join("_pipeline_summary.json")).unwrap()).unwrap();
    assert_eq!(on_disk["failed_transforms"], 2);
}
