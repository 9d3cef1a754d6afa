//! `kgb suggest` against a mocked OpenAI-compatible endpoint.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EMPLOYEES: &str = r#"[
  {"name": "Jane Smith", "yearsOfService": 8, "salaryIncreaseFrequency": 3,
   "otherRelevantCriteria": "Led the archive digitisation"},
  {"name": "Budi", "yearsOfService": 2, "salaryIncreaseFrequency": 1}
]"#;

fn setup(server_uri: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let config = format!(
        r#"default_provider = "openai"
default_model = "gpt-4.1-mini"

[providers.openai]
type = "openai"
api_key = "test-key"
base_url = "{server_uri}"
"#
    );
    std::fs::write(dir.path().join("kgb.toml"), config).unwrap();
    std::fs::write(dir.path().join("employees.json"), EMPLOYEES).unwrap();
    dir
}

fn kgb(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("kgb").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("KGB_OPENAI_KEY")
        .env_remove("KGB_ANTHROPIC_KEY");
    cmd
}

fn completion(content: &str) -> Value {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content}, "index": 0}],
        "model": "gpt-4.1-mini",
        "usage": {"prompt_tokens": 200, "completion_tokens": 40, "total_tokens": 240}
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn suggest_prints_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "```json\n{\"candidates\": [\
             {\"name\": \"Jane Smith\", \"reason\": \"Eight years of service\"},\
             {\"name\": \"Budi\", \"reason\": \"Growing\"}]}\n```",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let dir = setup(&server.uri());
    let output = tokio::task::spawn_blocking(move || {
        let out = kgb(&dir)
            .args(["suggest", "--input", "employees.json", "--count", "1", "--json"])
            .output()
            .unwrap();
        drop(dir);
        out
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{output:?}");
    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    let candidates = body["candidates"].as_array().unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0]["name"], "Jane Smith");
}

#[tokio::test(flavor = "multi_thread")]
async fn provider_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let dir = setup(&server.uri());
    let output = tokio::task::spawn_blocking(move || {
        let out = kgb(&dir)
            .args(["suggest", "--input", "employees.json"])
            .output()
            .unwrap();
        drop(dir);
        out
    })
    .await
    .unwrap();

    output
        .assert()
        .failure()
        .stderr(predicate::str::contains("AI analysis failed"))
        .stderr(predicate::str::contains("upstream down"));
}

#[test]
fn unknown_provider_is_an_error() {
    let dir = setup("http://127.0.0.1:9");
    kgb(&dir)
        .args(["suggest", "--input", "employees.json", "--provider", "anthropic"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("provider 'anthropic' is not configured"));
}
