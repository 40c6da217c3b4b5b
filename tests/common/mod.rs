#![allow(dead_code)]

use std::collections::HashMap;

use serde_json::{Value, json};
use zenhub_export::config::{ExportArgs, Settings};

pub const GITHUB_TOKEN: &str = "gh-test-token";
pub const ZENHUB_TOKEN: &str = "zh-test-token";
pub const TRACKER_ID: u64 = 4242;

/// Settings pointed at mock servers, with millisecond backoff and no pacing.
pub fn mock_settings(github_url: &str, zenhub_url: &str) -> Settings {
    let mut settings = Settings::default();
    settings.github.api_url = github_url.to_owned();
    settings.zenhub.api_url = zenhub_url.to_owned();
    settings.zenhub.requests_per_minute = 0;
    settings.http.max_attempts = 3;
    settings.http.initial_backoff_ms = 1;
    settings.http.max_backoff_ms = 5;
    settings
}

/// A GitHub REST issue as returned by `GET /repos/{owner}/{repo}/issues`.
pub fn issue_json(number: u64, state: &str) -> Value {
    json!({
        "number": number,
        "title": format!("Issue {number}"),
        "body": format!("Body of issue {number}"),
        "state": state,
        "user": { "login": "octocat" },
        "labels": [{ "name": "bug", "color": "d73a4a" }],
        "assignees": [],
        "milestone": null,
        "comments": 0,
        "created_at": "2024-04-01T09:00:00Z",
        "updated_at": "2024-04-02T09:00:00Z"
    })
}

pub fn pull_request_json(number: u64) -> Value {
    let mut value = issue_json(number, "open");
    value["pull_request"] = json!({ "url": format!("https://api.github.com/repos/acme/widgets/pulls/{number}") });
    value
}

pub fn zenhub_issue_json(pipeline: &str, estimate: Option<f64>, is_epic: bool) -> Value {
    let mut value = json!({
        "plus_ones": [],
        "pipeline": { "name": pipeline },
        "is_epic": is_epic
    });
    if let Some(estimate) = estimate {
        value["estimate"] = json!({ "value": estimate });
    }
    value
}

pub fn export_args(file_name: &std::path::Path, state: &str, html: &str) -> ExportArgs {
    ExportArgs {
        file_name: Some(file_name.to_path_buf()),
        repo_list: vec!["acme/widgets".to_owned(), TRACKER_ID.to_string()],
        html: html.to_owned(),
        state: state.to_owned(),
        ..ExportArgs::default()
    }
}

/// Environment lookup backed by a fixed map.
pub fn env_with(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

pub fn token_env() -> impl Fn(&str) -> Option<String> {
    env_with(&[("GITHUB_TOKEN", GITHUB_TOKEN), ("ZENHUB_TOKEN", ZENHUB_TOKEN)])
}
