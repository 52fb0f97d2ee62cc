use flagparity_core::{Confidence, Platform};
use flagparity_io::{
    fetch_both, ConfigError, ExportWriter, FetchError, FileFetcher, JsonExportWriter, RunConfig,
    StaticFetcher,
};
use flagparity_test_utils::{sample_amp_export, sample_statsig_export};
use serde_json::{json, Value};
use tempfile::TempDir;

async fn write_json(dir: &TempDir, name: &str, value: &Value) -> std::path::PathBuf {
    let path = dir.path().join(name);
    tokio::fs::write(&path, serde_json::to_vec(value).unwrap())
        .await
        .unwrap();
    path
}

#[tokio::test]
async fn fetch_both_reads_files() {
    let dir = TempDir::new().unwrap();
    let a_path = write_json(&dir, "a.json", &sample_amp_export()).await;
    let b_path = write_json(&dir, "b.json", &sample_statsig_export()).await;

    let (a, b) = fetch_both(
        &FileFetcher::new(Platform::A, a_path),
        &FileFetcher::new(Platform::B, b_path),
    )
    .await
    .unwrap();

    assert_eq!(a.len(), 5);
    assert_eq!(b.len(), 4);
    assert!(a.find_exact("boost-price-test").is_some());
}

#[tokio::test]
async fn fetch_both_fails_on_either_side() {
    let dir = TempDir::new().unwrap();
    let broken = dir.path().join("broken.json");
    tokio::fs::write(&broken, "{not json").await.unwrap();

    let err = fetch_both(
        &StaticFetcher::new(Platform::A, sample_amp_export()),
        &FileFetcher::new(Platform::B, &broken),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, FetchError::Json { platform: Platform::B, .. }));
}

#[tokio::test]
async fn json_writer_creates_directory_and_pretty_prints() {
    let dir = TempDir::new().unwrap();
    let writer = JsonExportWriter::new(dir.path().join("nested").join("out"));

    let path = writer
        .write("comparison", &json!({"target_key": "x", "found_a": true}))
        .await
        .unwrap();

    assert_eq!(path, writer.dir().join("comparison.json"));
    let content = tokio::fs::read_to_string(&path).await.unwrap();
    assert!(content.contains('\n'));
    let parsed: Value = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed["target_key"], json!("x"));
}

#[tokio::test]
async fn config_load_resolves_relative_paths_and_runs() {
    let dir = TempDir::new().unwrap();
    write_json(&dir, "amp.json", &sample_amp_export()).await;
    write_json(&dir, "statsig.json", &sample_statsig_export()).await;
    let config_path = dir.path().join("run.toml");
    tokio::fs::write(
        &config_path,
        r#"
source_a = "amp.json"
source_b = "statsig.json"
output_dir = "out"
targets = ["mpu-heuristics-v1", "boost-price-test"]
policy = "exact_only"
"#,
    )
    .await
    .unwrap();

    let config = RunConfig::load(&config_path).await.unwrap();
    assert_eq!(config.source_a, dir.path().join("amp.json"));
    assert_eq!(config.output_dir, dir.path().join("out"));

    let (a, b) = fetch_both(
        &FileFetcher::new(Platform::A, &config.source_a),
        &FileFetcher::new(Platform::B, &config.source_b),
    )
    .await
    .unwrap();
    let report = config.reconciler().unwrap().run(&a, &b, &config.targets);

    assert_eq!(report.policy, "exact_only");
    assert_eq!(report.results[0].confidence(), Confidence::Exact);
    assert_eq!(report.results[1].confidence(), Confidence::None);
}

#[tokio::test]
async fn config_load_reports_path_on_bad_toml() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("bad.toml");
    tokio::fs::write(&config_path, "source_a = [").await.unwrap();

    let err = RunConfig::load(&config_path).await.unwrap_err();
    match err {
        ConfigError::Toml { path, .. } => assert_eq!(path, config_path),
        other => panic!("unexpected error: {other}"),
    }
}
