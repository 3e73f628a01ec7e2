mod common;

use common::{click_track, silence, wav_bytes};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use track_analyzer::{
    AnalysisRequest, AnalysisService, AnalyzerConfig, ServiceConfig, ServiceError, Upload,
};

const SAMPLE_RATE: u32 = 22050;

fn config(dir: &TempDir) -> ServiceConfig {
    let staging = dir.path().join("staging");
    fs::create_dir_all(&staging).unwrap();
    ServiceConfig::new()
        .with_rate_limit(None)
        .with_log_path(dir.path().join("analysis.log"))
        .with_staging_dir(staging)
}

fn log_lines(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(contents) => contents.lines().map(str::to_string).collect(),
        Err(_) => Vec::new(),
    }
}

fn staged_files(dir: &TempDir) -> usize {
    fs::read_dir(dir.path().join("staging")).unwrap().count()
}

#[test]
fn test_analyzes_wav_upload_and_logs_it() {
    let dir = TempDir::new().unwrap();
    let service = AnalysisService::from_config(config(&dir)).unwrap();

    let bytes = wav_bytes(&click_track(120.0, SAMPLE_RATE, 8.0), SAMPLE_RATE, 1);
    let request = AnalysisRequest::new("10.0.0.1", Upload::new("Beat.WAV", bytes));

    let result = service.handle(&request).unwrap();
    assert!((117..=123).contains(&result.bpm), "got {}", result.bpm);
    assert_eq!(result.format.as_str(), "WAV");

    let lines = log_lines(&dir.path().join("analysis.log"));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("client=10.0.0.1"));
    assert!(lines[0].contains("Beat.WAV"));
    assert!(lines[0].contains("\"format\":\"WAV\""));

    assert_eq!(staged_files(&dir), 0);
}

#[test]
fn test_silent_upload_returns_partial_result() {
    let dir = TempDir::new().unwrap();
    let service = AnalysisService::from_config(config(&dir)).unwrap();

    let bytes = wav_bytes(&silence(SAMPLE_RATE, 3.0), SAMPLE_RATE, 1);
    let result = service
        .handle(&AnalysisRequest::new("c", Upload::new("quiet.wav", bytes)))
        .unwrap();

    assert_eq!(result.bpm, 0);
    assert_eq!(result.key.to_string(), "C Minor");
    assert!(!result.warnings.is_empty());

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["bpm"], 0);
    assert_eq!(json["key"], "C Minor");
    assert_eq!(json["format"], "WAV");
}

#[test]
fn test_strict_service_fails_on_silence() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir).with_analyzer(AnalyzerConfig::strict());
    let service = AnalysisService::from_config(config).unwrap();

    let bytes = wav_bytes(&silence(SAMPLE_RATE, 3.0), SAMPLE_RATE, 1);
    let err = service
        .handle(&AnalysisRequest::new("c", Upload::new("quiet.wav", bytes)))
        .unwrap_err();

    assert!(matches!(err, ServiceError::Analysis(_)));
    assert_eq!(err.status_code(), 500);
    assert!(log_lines(&dir.path().join("analysis.log")).is_empty());
}

#[test]
fn test_rejects_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let service = AnalysisService::from_config(config(&dir)).unwrap();

    let bytes = wav_bytes(&silence(SAMPLE_RATE, 1.0), SAMPLE_RATE, 1);
    let err = service
        .handle(&AnalysisRequest::new("c", Upload::new("clip.ogg", bytes)))
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert!(err.to_string().starts_with("Unsupported file type"));
    assert!(log_lines(&dir.path().join("analysis.log")).is_empty());
    assert_eq!(staged_files(&dir), 0);
}

#[test]
fn test_rejects_missing_file_and_empty_name() {
    let dir = TempDir::new().unwrap();
    let service = AnalysisService::from_config(config(&dir)).unwrap();

    let no_file = AnalysisRequest {
        client: "c".to_string(),
        file: None,
    };
    let err = service.handle(&no_file).unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.to_string(), "No file part");

    let unnamed = AnalysisRequest::new("c", Upload::new("", vec![1, 2, 3]));
    let err = service.handle(&unnamed).unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.to_string(), "No selected file");
}

#[test]
fn test_corrupt_upload_is_a_decode_error() {
    let dir = TempDir::new().unwrap();
    let service = AnalysisService::from_config(config(&dir)).unwrap();

    let garbage = b"this is not an mp3 at all, just text".repeat(64);
    let err = service
        .handle(&AnalysisRequest::new("c", Upload::new("broken.mp3", garbage)))
        .unwrap_err();

    assert_eq!(err.status_code(), 422);
    assert_eq!(staged_files(&dir), 0);
    assert!(log_lines(&dir.path().join("analysis.log")).is_empty());
}

#[test]
fn test_rate_limit_per_client() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir).with_rate_limit(Some(Duration::from_secs(30)));
    let service = AnalysisService::from_config(config).unwrap();

    let bytes = wav_bytes(&click_track(100.0, SAMPLE_RATE, 4.0), SAMPLE_RATE, 1);

    service
        .handle(&AnalysisRequest::new("a", Upload::new("one.wav", bytes.clone())))
        .unwrap();

    let err = service
        .handle(&AnalysisRequest::new("a", Upload::new("two.wav", bytes.clone())))
        .unwrap_err();
    assert_eq!(err.status_code(), 429);
    let retry = err.retry_after_secs().unwrap();
    assert!(retry > 0 && retry <= 30);

    // Other clients are unaffected
    service
        .handle(&AnalysisRequest::new("b", Upload::new("three.wav", bytes)))
        .unwrap();

    assert_eq!(log_lines(&dir.path().join("analysis.log")).len(), 2);
}

#[test]
fn test_rejected_upload_does_not_consume_rate_limit() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir).with_rate_limit(Some(Duration::from_secs(30)));
    let service = AnalysisService::from_config(config).unwrap();

    let bytes = wav_bytes(&click_track(100.0, SAMPLE_RATE, 4.0), SAMPLE_RATE, 1);

    let err = service
        .handle(&AnalysisRequest::new("a", Upload::new("x.ogg", bytes.clone())))
        .unwrap_err();
    assert_eq!(err.status_code(), 400);

    service
        .handle(&AnalysisRequest::new("a", Upload::new("x.wav", bytes)))
        .unwrap();
}

#[test]
fn test_concurrent_requests_share_one_service() {
    let dir = TempDir::new().unwrap();
    let service = AnalysisService::from_config(config(&dir)).unwrap();
    let bytes = wav_bytes(&click_track(120.0, SAMPLE_RATE, 4.0), SAMPLE_RATE, 1);

    std::thread::scope(|scope| {
        for i in 0..4 {
            let service = &service;
            let bytes = bytes.clone();
            scope.spawn(move || {
                let request =
                    AnalysisRequest::new(format!("client-{}", i), Upload::new("beat.wav", bytes));
                service.handle(&request).unwrap();
            });
        }
    });

    assert_eq!(log_lines(&dir.path().join("analysis.log")).len(), 4);
    assert_eq!(staged_files(&dir), 0);
}
