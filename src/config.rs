// file: src/config.rs
// description: application configuration management with toml and environment support
// reference: https://docs.rs/config

use crate::error::{Result, SyncError};
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const ENV_PREFIX: &str = "DOCS_SYNC";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub repository: RepositoryConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub author: AuthorConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepositoryConfig {
    pub remote_url: String,
    pub local_path: PathBuf,
    /// Branch to check out on clone. The remote's default branch when unset.
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default = "default_remote_name")]
    pub remote_name: String,
    #[serde(default = "default_commit_message")]
    pub default_commit_message: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CredentialsConfig {
    pub username: Option<String>,
    /// Password or personal access token for HTTPS remotes.
    pub token: Option<String>,
    pub ssh_key_path: Option<PathBuf>,
    pub ssh_passphrase: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthorConfig {
    pub name: Option<String>,
    pub email: Option<String>,
}

fn default_remote_name() -> String {
    "origin".to_string()
}

fn default_commit_message() -> String {
    "Agent auto-update".to_string()
}

impl Config {
    /// Layers built-in defaults, the TOML file and `DOCS_SYNC__*` environment
    /// variables, in that order. An explicit `path` must exist; the default
    /// file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(|e| SyncError::Config(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);

        builder = match path {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder
                .add_source(config::File::from(Path::new(DEFAULT_CONFIG_PATH)).required(false)),
        };

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| SyncError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| SyncError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            repository: RepositoryConfig {
                remote_url: "git@github.com:parmarjh/-N8N-Workflow-Documentation.git".to_string(),
                local_path: PathBuf::from("docs_repo"),
                branch: None,
                remote_name: default_remote_name(),
                default_commit_message: default_commit_message(),
            },
            credentials: CredentialsConfig::default(),
            author: AuthorConfig::default(),
        }
    }

    /// Defaults pointed at a specific remote and working copy.
    pub fn for_repository(remote_url: impl Into<String>, local_path: impl Into<PathBuf>) -> Self {
        let mut config = Self::default_config();
        config.repository.remote_url = remote_url.into();
        config.repository.local_path = local_path.into();
        config
    }

    pub fn validate(&self) -> Result<()> {
        Validator::validate_remote_url(&self.repository.remote_url)?;

        if self.repository.local_path.as_os_str().is_empty() {
            return Err(SyncError::Config(
                "repository.local_path must not be empty".to_string(),
            ));
        }

        if self.repository.remote_name.trim().is_empty() {
            return Err(SyncError::Config(
                "repository.remote_name must not be empty".to_string(),
            ));
        }

        if self.author.name.is_some() != self.author.email.is_some() {
            return Err(SyncError::Config(
                "author.name and author.email must be set together".to_string(),
            ));
        }

        Ok(())
    }
}
