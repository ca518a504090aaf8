//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.netspect.toml` files. Every section is optional; a missing file runs
//! the built-in demo batch.

use crate::models::{Classification, FetchDescriptor, PayloadKind, TransportKind};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".netspect.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Requests dispatched in one run.
    #[serde(default = "default_requests")]
    pub requests: Vec<FetchDescriptor>,

    /// URLs kept out of the request log.
    #[serde(default = "default_skip_logging")]
    pub skip_logging: Vec<SkipLoggingConfig>,

    /// Canned responses.
    #[serde(default = "default_mocks")]
    pub mocks: Vec<MockConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            requests: default_requests(),
            skip_logging: default_skip_logging(),
            mocks: default_mocks(),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Write the run report here instead of stdout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// A skip-logging rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipLoggingConfig {
    pub url: String,
}

/// A mock rule: requests to `url` are answered with `response` as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockConfig {
    pub url: String,

    #[serde(default = "default_status")]
    pub status: u16,

    pub response: serde_json::Value,
}

const BOOKS_URL: &str =
    "https://openlibrary.org/api/books?bibkeys=ISBN:0201558025,LCCN:93005405&format=json";
const MOCK_URL: &str = "https://mock.example.com/api/mock/1";
const SKIPPED_URL: &str = "https://jsonplaceholder.typicode.com/users";

fn default_requests() -> Vec<FetchDescriptor> {
    vec![
        FetchDescriptor::new("books", BOOKS_URL, PayloadKind::None),
        FetchDescriptor::new(
            "cover",
            "http://covers.openlibrary.org/b/isbn/0385472579-S.jpg",
            PayloadKind::None,
        ),
        FetchDescriptor::new(
            "intentional-error",
            "http://some.unknown.url/for/intentional/error",
            PayloadKind::None,
        ),
        FetchDescriptor::new("books-again", BOOKS_URL, PayloadKind::None),
        FetchDescriptor::new(
            "images",
            "https://picsum.photos/v2/list?page=2&limit=5",
            PayloadKind::Images,
        )
        .with_transport(TransportKind::Configured),
        FetchDescriptor::new("mock", MOCK_URL, PayloadKind::Mock)
            .with_classification(Classification::MockRouted)
            .with_transport(TransportKind::Configured),
        FetchDescriptor::new(
            "characters",
            "https://www.anapioficeandfire.com/api/characters",
            PayloadKind::Characters,
        )
        .with_transport(TransportKind::Configured),
        FetchDescriptor::new(
            "houses",
            "https://www.anapioficeandfire.com/api/houses",
            PayloadKind::Houses,
        ),
        FetchDescriptor::new("users", SKIPPED_URL, PayloadKind::None)
            .with_classification(Classification::Skipped),
    ]
}

fn default_skip_logging() -> Vec<SkipLoggingConfig> {
    vec![SkipLoggingConfig {
        url: SKIPPED_URL.to_string(),
    }]
}

fn default_mocks() -> Vec<MockConfig> {
    vec![MockConfig {
        url: MOCK_URL.to_string(),
        status: default_status(),
        response: serde_json::json!({ "response": "this is a mock response" }),
    }]
}

fn default_status() -> u16 {
    200
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.netspect.toml` from `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(ref output) = args.output {
            self.general.output = Some(output.clone());
        }
    }

    /// Reject request lists the dispatcher cannot report on unambiguously.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for request in &self.requests {
            if request.id.trim().is_empty() {
                bail!("Request targeting {} has an empty id", request.target);
            }
            if !seen.insert(request.id.as_str()) {
                bail!("Duplicate request id: {}", request.id);
            }
        }
        Ok(())
    }

    /// The requests to dispatch, optionally restricted to the given ids.
    pub fn selected_requests(&self, only: Option<&[String]>) -> Result<Vec<FetchDescriptor>> {
        let Some(ids) = only else {
            return Ok(self.requests.clone());
        };

        for id in ids {
            if !self.requests.iter().any(|r| &r.id == id) {
                bail!("Unknown request id: {}", id);
            }
        }

        Ok(self
            .requests
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.requests.len(), 9);
        assert_eq!(
            config
                .requests
                .iter()
                .filter(|r| r.classification == Classification::Skipped)
                .count(),
            1
        );
        assert_eq!(config.skip_logging[0].url, SKIPPED_URL);
        assert_eq!(config.mocks[0].response["response"], "this is a mock response");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true

[[requests]]
id = "houses"
target = "https://www.anapioficeandfire.com/api/houses"
payload = "houses"
transport = "configured"

[[requests]]
id = "mock"
target = "https://mock.example.com/api/mock/1"
payload = "mock"
classification = "mock_routed"

[[mocks]]
url = "https://mock.example.com/api/mock/1"
response = { response = "from toml" }
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.requests.len(), 2);
        assert_eq!(config.requests[0].transport, TransportKind::Configured);
        assert_eq!(config.requests[1].classification, Classification::MockRouted);
        assert_eq!(config.mocks[0].status, 200);
        assert_eq!(config.mocks[0].response["response"], "from toml");
        // Unspecified sections keep their defaults.
        assert_eq!(config.skip_logging, default_skip_logging());
    }

    #[test]
    fn test_default_toml_round_trips() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[[requests]]"));
        assert!(toml_str.contains("[[mocks]]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.requests, default_requests());
        assert_eq!(parsed.mocks, default_mocks());
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        let mut file = std::fs::File::create(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        writeln!(file, "skip_logging = []").unwrap();

        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert!(config.skip_logging.is_empty());
        assert_eq!(config.requests.len(), 9);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[[requests]]\nid = 3\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let mut config = Config::default();
        config.requests.push(config.requests[0].clone());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_selected_requests() {
        let config = Config::default();
        let only = vec!["mock".to_string(), "houses".to_string()];
        let selected = config.selected_requests(Some(&only)).unwrap();
        let ids: Vec<_> = selected.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["mock", "houses"]);

        assert!(config
            .selected_requests(Some(&["nope".to_string()]))
            .is_err());
        assert_eq!(config.selected_requests(None).unwrap().len(), 9);
    }

    #[test]
    fn test_output_path_from_file_and_args() {
        let config: Config =
            toml::from_str("[general]\noutput = \"reports/run.json\"\n").unwrap();
        assert_eq!(config.general.output, Some(PathBuf::from("reports/run.json")));

        let mut config = Config::default();
        let args = crate::cli::Args::parse_from(["netspect", "--output", "out/report.md"]);
        config.merge_with_args(&args);
        assert_eq!(config.general.output, Some(PathBuf::from("out/report.md")));
    }

    #[cfg(unix)]
    #[test]
    fn test_merge_keeps_non_utf8_output_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let raw = OsStr::from_bytes(b"report-\xff.json");
        let mut config = Config::default();
        let args =
            crate::cli::Args::parse_from([OsStr::new("netspect"), OsStr::new("--output"), raw]);
        config.merge_with_args(&args);
        assert_eq!(config.general.output.as_deref(), Some(Path::new(raw)));
    }
}
