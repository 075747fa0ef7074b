//! Configuration loading and validation for octoagent.
//!
//! Settings come from an optional TOML file with environment-variable
//! overrides, are validated once at startup, and are then passed by
//! reference into the registry, the scope enforcer, and the agent loop.
//! Nothing downstream reads the environment.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// One message per missing or invalid field, all collected in one pass
    /// so the user fixes everything at once.
    #[error("invalid configuration:\n{}", .0.join("\n"))]
    Invalid(Vec<String>),
}

/// The root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// GitHub identity and credentials
    #[serde(default)]
    pub github: GithubConfig,

    /// Reasoning engine settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Agent loop settings
    #[serde(default)]
    pub agent: AgentSettings,

    /// Tool server launch settings
    #[serde(default)]
    pub server: ServerSettings,
}

/// GitHub identity and credentials.
///
/// `username` is the authenticated identity every resource-addressing tool
/// is bound to. It is read-only for the life of the process.
#[derive(Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// The authenticated account name
    #[serde(default)]
    pub username: String,

    /// Personal access token
    #[serde(default)]
    pub token: String,

    /// API base URL override
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            token: String::new(),
            api_base: default_api_base(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.github.com".into()
}

/// Reasoning engine settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key for the engine backend
    #[serde(default)]
    pub api_key: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Chat-completions base URL
    #[serde(default = "default_llm_base")]
    pub base_url: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            base_url: default_llm_base(),
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

fn default_model() -> String {
    "openai/gpt-4o-mini".into()
}
fn default_llm_base() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_temperature() -> f32 {
    0.7
}

/// Agent loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Step ceiling for the top-level agent
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// Step ceiling for delegated sub-agents. Lower so a stuck sub-agent
    /// fails fast instead of consuming the parent's budget.
    #[serde(default = "default_sub_agent_max_steps")]
    pub sub_agent_max_steps: u32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            sub_agent_max_steps: default_sub_agent_max_steps(),
        }
    }
}

fn default_max_steps() -> u32 {
    10
}
fn default_sub_agent_max_steps() -> u32 {
    5
}

/// How to launch the tool server child process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Program to run
    #[serde(default = "default_server_program")]
    pub program: String,

    /// Container image exposing the stdio tool protocol
    #[serde(default = "default_server_image")]
    pub image: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            program: default_server_program(),
            image: default_server_image(),
        }
    }
}

fn default_server_program() -> String {
    "docker".into()
}
fn default_server_image() -> String {
    "ghcr.io/github/github-mcp-server".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &str) -> &'static str {
    if s.is_empty() { "<unset>" } else { "[REDACTED]" }
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("username", &self.username)
            .field("token", &redact(&self.token))
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}


impl AppConfig {
    /// Load configuration from an optional TOML file, then apply
    /// environment overrides, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse the TOML file alone, without environment overrides.
    fn from_file(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p)?;
                debug!(path = %p.display(), "Loaded config file");
                Ok(toml::from_str(&raw)?)
            }
            None => Ok(Self::default()),
        }
    }

    /// Environment variables take precedence over the file.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("GITHUB_USERNAME") {
            self.github.username = v;
        }
        if let Ok(v) = std::env::var("GITHUB_PERSONAL_ACCESS_TOKEN") {
            self.github.token = v;
        }
        if let Ok(v) = std::env::var("GITHUB_API_BASE") {
            self.github.api_base = v;
        }
        if let Ok(v) = std::env::var("OPENROUTER_API_KEY") {
            self.llm.api_key = v;
        }
        if let Ok(v) = std::env::var("OCTOAGENT_MODEL") {
            self.llm.model = v;
        }
    }

    /// Check every required field, collecting all problems.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.github.username.is_empty() {
            problems.push("github.username is required (set GITHUB_USERNAME)".to_string());
        }
        if self.github.token.is_empty() {
            problems.push(
                "github.token is required (set GITHUB_PERSONAL_ACCESS_TOKEN)".to_string(),
            );
        }
        if self.llm.api_key.is_empty() {
            problems.push("llm.api_key is required (set OPENROUTER_API_KEY)".to_string());
        }
        if self.agent.max_steps == 0 {
            problems.push("agent.max_steps must be at least 1".to_string());
        }
        if self.agent.sub_agent_max_steps == 0 {
            problems.push("agent.sub_agent_max_steps must be at least 1".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn complete() -> AppConfig {
        AppConfig {
            github: GithubConfig {
                username: "alice".into(),
                token: "ghp_test".into(),
                api_base: default_api_base(),
            },
            llm: LlmConfig {
                api_key: "sk-test".into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn validation_collects_all_problems() {
        let err = AppConfig::default().validate().unwrap_err();
        let ConfigError::Invalid(problems) = err else {
            panic!("expected Invalid");
        };
        assert_eq!(problems.len(), 3);
        assert!(problems.iter().any(|p| p.contains("GITHUB_USERNAME")));
        assert!(problems.iter().any(|p| p.contains("OPENROUTER_API_KEY")));
    }

    #[test]
    fn zero_step_ceiling_rejected() {
        let mut config = complete();
        config.agent.max_steps = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_steps"));
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = complete();
        let printed = format!("{config:?}");
        assert!(!printed.contains("ghp_test"));
        assert!(!printed.contains("sk-test"));
        assert!(printed.contains("[REDACTED]"));
        assert!(printed.contains("alice"));
    }

    #[test]
    fn load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[github]
username = "alice"
token = "ghp_from_file"

[llm]
api_key = "sk-from-file"
model = "openai/gpt-4o"

[agent]
max_steps = 12
"#
        )
        .unwrap();

        let config = AppConfig::from_file(Some(file.path())).unwrap();
        assert_eq!(config.github.username, "alice");
        assert_eq!(config.llm.model, "openai/gpt-4o");
        assert_eq!(config.agent.max_steps, 12);
        // Untouched sections keep their defaults
        assert_eq!(config.agent.sub_agent_max_steps, 5);
        assert_eq!(config.server.program, "docker");
    }

    #[test]
    fn defaults_are_sensible() {
        let config = AppConfig::default();
        assert_eq!(config.github.api_base, "https://api.github.com");
        assert_eq!(config.llm.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.agent.max_steps, 10);
        assert_eq!(config.server.image, "ghcr.io/github/github-mcp-server");
    }
}
