//! Loader for Blogsmith configuration with YAML + environment overlays.
//!
//! Sources are merged in this order (later wins):
//!
//! 1. built-in defaults on the typed structs below
//! 2. an optional `blogsmith.yaml` (see [`default_config_path`])
//! 3. inline YAML snippets (tests, CLI overrides)
//! 4. `BLOGSMITH__SECTION__KEY` environment variables
//!
//! After merging, every string value has `${VAR}` placeholders expanded from
//! the process environment. That is how secrets such as the Gemini API key
//! get in without ever being written to the file.
use blogsmith_common::observability::LogFormat;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const CONFIG_FILE_NAME: &str = "blogsmith.yaml";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Deserialize)]
pub struct BlogsmithConfig {
    pub llm: LlmConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Completion provider; the tag is `provider`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum LlmConfig {
    Gemini {
        #[serde(deserialize_with = "lenient_string")]
        api_key: String,
        #[serde(default = "default_gemini_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<u32>,
        #[serde(default = "default_gemini_endpoint")]
        endpoint: String,
    },
    Openai {
        #[serde(deserialize_with = "lenient_string")]
        api_key: String,
        #[serde(default = "default_openai_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<u32>,
        #[serde(default = "default_openai_endpoint")]
        endpoint: String,
    },
}

impl LlmConfig {
    pub fn api_key(&self) -> &str {
        match self {
            LlmConfig::Gemini { api_key, .. } | LlmConfig::Openai { api_key, .. } => api_key,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            LlmConfig::Gemini { model, .. } | LlmConfig::Openai { model, .. } => model,
        }
    }
}

/// Settings for the product page fetch.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    /// How many leading `<p>` elements feed the body excerpt; `0` disables it.
    #[serde(default = "default_body_paragraphs")]
    pub body_paragraphs: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            body_paragraphs: default_body_paragraphs(),
        }
    }
}

/// Where the generated post goes; the tag is `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SinkConfig {
    Display {
        #[serde(default)]
        output: Option<PathBuf>,
    },
    Docs {
        #[serde(deserialize_with = "lenient_string")]
        access_token: String,
        #[serde(default = "default_docs_endpoint")]
        endpoint: String,
    },
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig::Display { output: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub stderr: bool,
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            stderr: false,
            filter: default_log_filter(),
            dir: None,
        }
    }
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.into()
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}
fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/".into()
}
fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1/".into()
}
fn default_docs_endpoint() -> String {
    "https://docs.googleapis.com/v1/".into()
}
fn default_user_agent() -> String {
    "Mozilla/5.0".into()
}
fn default_accept_language() -> String {
    "en-US,en;q=0.9".into()
}
fn default_fetch_timeout_secs() -> u64 {
    30
}
fn default_body_paragraphs() -> usize {
    10
}
fn default_log_filter() -> String {
    "info".into()
}

/// Env values are type-parsed, so an all-digit secret arrives as a number.
fn lenient_string<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    match Value::deserialize(de)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string, found {other}"
        ))),
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Reject secrets that are empty or still hold an unresolved `${VAR}`.
fn require_secret(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Message(format!("{field} is empty")));
    }
    if trimmed.contains("${") {
        return Err(ConfigError::Message(format!(
            "{field} references an unset environment variable: {trimmed}"
        )));
    }
    Ok(())
}

impl BlogsmithConfig {
    /// Check invariants serde cannot express. Called by [`BlogsmithConfigLoader::load`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_secret("llm.api_key", self.llm.api_key())?;
        if self.llm.model().trim().is_empty() {
            return Err(ConfigError::Message("llm.model is empty".into()));
        }
        if let SinkConfig::Docs { access_token, .. } = &self.sink {
            require_secret("sink.access_token", access_token)?;
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "fetch.timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// First existing config file among `./blogsmith.yaml` and
/// `<config_dir>/blogsmith/blogsmith.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("blogsmith").join(CONFIG_FILE_NAME))
        .filter(|p| p.is_file())
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct BlogsmithConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    files: Vec<(PathBuf, bool)>,
    snippets: Vec<String>,
}

impl Default for BlogsmithConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl BlogsmithConfigLoader {
    /// Start empty; the `BLOGSMITH__` environment overlay is always applied last.
    ///
    /// ```
    /// use blogsmith_config::{BlogsmithConfigLoader, SinkConfig};
    ///
    /// let config = BlogsmithConfigLoader::new()
    ///     .with_yaml_str("llm:\n  provider: gemini\n  api_key: test-key\n")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.llm.model(), "gemini-1.5-flash");
    /// assert_eq!(config.extract.body_paragraphs, 10);
    /// assert!(matches!(config.sink, SinkConfig::Display { output: None }));
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            files: Vec::new(),
            snippets: Vec::new(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files.push((path.as_ref().to_path_buf(), true));
        self
    }

    /// Attach a file that may be absent, for headless runs configured purely by env.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files.push((path.as_ref().to_path_buf(), false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.snippets.push(yaml.to_string());
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use blogsmith_config::{BlogsmithConfigLoader, LlmConfig};
    ///
    /// unsafe { std::env::set_var("DOC_GEMINI_KEY", "injected-from-env"); }
    ///
    /// let config = BlogsmithConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// llm:
    ///   provider: gemini
    ///   api_key: "${DOC_GEMINI_KEY}"
    ///   model: "gemini-pro"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// match &config.llm {
    ///     LlmConfig::Gemini { api_key, model, .. } => {
    ///         assert_eq!(api_key, "injected-from-env");
    ///         assert_eq!(model, "gemini-pro");
    ///     }
    ///     _ => panic!("expected Gemini configuration"),
    /// }
    ///
    /// unsafe { std::env::remove_var("DOC_GEMINI_KEY"); }
    /// ```
    pub fn load(self) -> Result<BlogsmithConfig, ConfigError> {
        let mut builder = self.builder;
        for (path, required) in &self.files {
            builder = builder.add_source(File::from(path.as_path()).required(*required));
        }
        for yaml in &self.snippets {
            builder = builder.add_source(File::from_str(yaml, config::FileFormat::Yaml));
        }
        let cfg = builder
            .add_source(
                Environment::with_prefix("BLOGSMITH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: BlogsmithConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MINIMAL: &str = "llm:\n  provider: gemini\n  api_key: k\n";

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_nested_sections() {
        temp_env::with_vars([("KEY_A", Some("a")), ("KEY_B", Some("b"))], || {
            let mut v = json!({
                "llm": { "api_key": "${KEY_A}" },
                "sink": { "access_token": "$KEY_B" },
                "extract": { "body_paragraphs": 10 }
            });
            expand_env_in_value(&mut v);
            assert_eq!(v["llm"]["api_key"], json!("a"));
            assert_eq!(v["sink"]["access_token"], json!("b"));
            assert_eq!(v["extract"]["body_paragraphs"], json!(10));
        });
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn defaults_fill_every_optional_section() {
        let cfg = BlogsmithConfigLoader::new()
            .with_yaml_str(MINIMAL)
            .load()
            .unwrap();

        assert_eq!(cfg.fetch.user_agent, "Mozilla/5.0");
        assert_eq!(cfg.fetch.accept_language, "en-US,en;q=0.9");
        assert_eq!(cfg.fetch.timeout_secs, 30);
        assert_eq!(cfg.extract.body_paragraphs, 10);
        assert_eq!(cfg.logging.format, LogFormat::Text);
        assert_eq!(cfg.logging.filter, "info");
        assert!(matches!(cfg.sink, SinkConfig::Display { output: None }));
    }

    #[test]
    fn later_snippets_override_earlier_ones() {
        let cfg = BlogsmithConfigLoader::new()
            .with_yaml_str(MINIMAL)
            .with_yaml_str("extract:\n  body_paragraphs: 0\n")
            .load()
            .unwrap();
        assert_eq!(cfg.extract.body_paragraphs, 0);
    }

    #[test]
    fn unresolved_api_key_is_rejected() {
        let err = BlogsmithConfigLoader::new()
            .with_yaml_str("llm:\n  provider: gemini\n  api_key: \"${BLOGSMITH_TEST_UNSET_KEY}\"\n")
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("llm.api_key"));
    }

    #[test]
    fn docs_sink_requires_token() {
        let err = BlogsmithConfigLoader::new()
            .with_yaml_str(MINIMAL)
            .with_yaml_str("sink:\n  kind: docs\n  access_token: \"  \"\n")
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("sink.access_token"));
    }

    #[test]
    fn missing_llm_section_fails() {
        assert!(BlogsmithConfigLoader::new()
            .with_yaml_str("extract:\n  body_paragraphs: 3\n")
            .load()
            .is_err());
    }
}
