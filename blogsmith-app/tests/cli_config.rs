use blogsmith_app::cli::Cli;
use blogsmith_config::SinkConfig;
use clap::Parser;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const BASE_YAML: &str = r#"
llm:
  provider: gemini
  api_key: test-key
extract:
  body_paragraphs: 6
sink:
  kind: display
  access_token: ya29.test
"#;

fn write_config(tmp: &TempDir) -> PathBuf {
    let p = tmp.path().join("blogsmith.yaml");
    std::fs::write(&p, BASE_YAML).expect("write yaml");
    p
}

fn cli(config: &Path, args: &[&str]) -> Cli {
    let mut argv = vec!["blogsmith", "--config", config.to_str().expect("utf-8 temp path")];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("valid arguments")
}

#[test]
fn plain_generate_keeps_the_file_settings() {
    let tmp = TempDir::new().unwrap();
    let cfg = cli(&write_config(&tmp), &["generate", "https://example.com/widget"])
        .load_config()
        .unwrap();

    assert!(matches!(cfg.sink, SinkConfig::Display { output: None }));
    assert_eq!(cfg.extract.body_paragraphs, 6);
}

#[test]
fn sink_flag_switches_to_docs() {
    let tmp = TempDir::new().unwrap();
    let cfg = cli(
        &write_config(&tmp),
        &["generate", "https://example.com/widget", "--sink", "docs"],
    )
    .load_config()
    .unwrap();

    assert!(matches!(
        &cfg.sink,
        SinkConfig::Docs { access_token, .. } if access_token == "ya29.test"
    ));
}

#[test]
fn output_flag_selects_a_display_file() {
    let tmp = TempDir::new().unwrap();
    let cfg = cli(
        &write_config(&tmp),
        &[
            "generate",
            "https://example.com/widget",
            "--sink",
            "display",
            "--output",
            "post.html",
        ],
    )
    .load_config()
    .unwrap();

    assert!(matches!(
        &cfg.sink,
        SinkConfig::Display { output: Some(p) } if p == Path::new("post.html")
    ));
}

#[test]
fn output_with_docs_sink_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let err = cli(
        &write_config(&tmp),
        &[
            "generate",
            "https://example.com/widget",
            "--sink",
            "docs",
            "--output",
            "post.html",
        ],
    )
    .load_config()
    .unwrap_err();

    assert!(err.to_string().contains("--output"), "got {err:#}");
}

#[test]
fn no_excerpt_zeroes_the_paragraph_limit() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(&tmp);

    let cfg = cli(&path, &["generate", "https://example.com/widget", "--no-excerpt"])
        .load_config()
        .unwrap();
    assert_eq!(cfg.extract.body_paragraphs, 0);

    let cfg = cli(&path, &["prompt", "https://example.com/widget", "--no-excerpt"])
        .load_config()
        .unwrap();
    assert_eq!(cfg.extract.body_paragraphs, 0);
}

#[test]
fn missing_config_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let err = cli(&tmp.path().join("absent.yaml"), &["check"]).load_config();
    assert!(err.is_err());
}
