use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CoreError, Result};

/// Reply ceiling after which a thread stops accepting responses
pub const DEFAULT_MAX_RESPONSES: u32 = 1000;

/// Maximum body length, counted in characters
pub const DEFAULT_MAX_BODY_CHARS: usize = 2000;

/// Maximum thread title length, counted in characters
pub const DEFAULT_MAX_TITLE_CHARS: usize = 48;

/// Display name used when a poster leaves the name field blank
pub const DEFAULT_POSTER_NAME: &str = "名無しさん";

/// Mail field value that suppresses the thread bump
pub const DEFAULT_BUMP_SUPPRESSION_KEYWORD: &str = "sage";

/// Centralized configuration for a ch5board deployment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoardConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub posting: PostingRules,
    pub identity: IdentitySalts,
    /// Boards provisioned at startup. Existing rows are never modified.
    pub boards: Vec<BoardSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSection {
    pub bind: SocketAddr,
    /// Allow any origin. Localhost origins only when false.
    pub cors_permissive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseSection {
    pub path: PathBuf,
    pub max_connections: u32,
}

/// Business rules applied to every thread and reply submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PostingRules {
    pub max_responses: u32,
    pub max_body_chars: usize,
    pub max_title_chars: usize,
    pub default_name: String,
    pub bump_suppression_keyword: String,
}

/// Salts for poster identity hashing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IdentitySalts {
    pub user_id_salt: String,
    pub ip_salt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardSeed {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3030)),
            cors_permissive: false,
        }
    }
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: default_data_dir().join("board.db"),
            max_connections: 5,
        }
    }
}

impl Default for PostingRules {
    fn default() -> Self {
        Self {
            max_responses: DEFAULT_MAX_RESPONSES,
            max_body_chars: DEFAULT_MAX_BODY_CHARS,
            max_title_chars: DEFAULT_MAX_TITLE_CHARS,
            default_name: DEFAULT_POSTER_NAME.to_string(),
            bump_suppression_keyword: DEFAULT_BUMP_SUPPRESSION_KEYWORD.to_string(),
        }
    }
}

impl Default for IdentitySalts {
    fn default() -> Self {
        Self {
            user_id_salt: "salt".to_string(),
            ip_salt: "ip_salt".to_string(),
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            server: ServerSection::default(),
            database: DatabaseSection::default(),
            posting: PostingRules::default(),
            identity: IdentitySalts::default(),
            boards: default_boards(),
        }
    }
}

impl PostingRules {
    /// True when the mail field asks for the thread not to be bumped.
    ///
    /// Comparison ignores letter case but not surrounding characters.
    pub fn is_bump_suppressed(&self, mail: Option<&str>) -> bool {
        mail.is_some_and(|m| m.to_lowercase() == self.bump_suppression_keyword.to_lowercase())
    }
}

impl BoardConfig {
    /// Config file path: ~/.ch5board/config.toml
    pub fn config_path() -> PathBuf {
        default_data_dir().join("config.toml")
    }

    /// Load config from `path`, or from the default location.
    ///
    /// A missing file yields the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }

        Self::load_from(&path)
    }

    /// Load config from an existing file. Fails if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| CoreError::config_parse(path, e))?;
        config.validate()?;
        debug!(path = %path.display(), boards = config.boards.len(), "config loaded");
        Ok(config)
    }

    /// Render the config as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the config to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Reject values the posting rules cannot work with.
    pub fn validate(&self) -> Result<()> {
        let posting = &self.posting;
        if posting.max_responses == 0 {
            return Err(CoreError::config("posting.max_responses must be at least 1"));
        }
        if posting.max_body_chars == 0 {
            return Err(CoreError::config("posting.max_body_chars must be at least 1"));
        }
        if posting.max_title_chars == 0 {
            return Err(CoreError::config("posting.max_title_chars must be at least 1"));
        }
        if posting.bump_suppression_keyword.trim().is_empty() {
            return Err(CoreError::config(
                "posting.bump_suppression_keyword cannot be empty",
            ));
        }
        if self.database.max_connections == 0 {
            return Err(CoreError::config("database.max_connections must be at least 1"));
        }

        let mut seen = HashSet::new();
        for board in &self.boards {
            if !seen.insert(board.id.as_str()) {
                return Err(CoreError::config(format!(
                    "duplicate board id '{}'",
                    board.id
                )));
            }
        }

        Ok(())
    }
}

/// Base directory for config and database: ~/.ch5board
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".ch5board"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn default_boards() -> Vec<BoardSeed> {
    [
        ("news", "ニュース速報", "ニュース", "最新ニュースを語るスレ"),
        ("zatsudan", "なんでも雑談", "雑談", "雑談なんでもOK"),
        ("tech", "技術・プログラミング", "専門", "プログラミング関連の話題"),
        ("game", "ゲーム総合", "趣味", "ゲーム全般について"),
        ("music", "音楽総合", "趣味", "音楽全般について"),
    ]
    .into_iter()
    .map(|(id, name, category, description)| BoardSeed {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        description: Some(description.to_string()),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_are_valid() {
        let config = BoardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.posting.max_responses, 1000);
        assert_eq!(config.posting.max_body_chars, 2000);
        assert_eq!(config.posting.max_title_chars, 48);
        assert_eq!(config.boards.len(), 5);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = BoardConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, BoardConfig::default());
    }

    #[test]
    fn save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = BoardConfig::default();
        config.posting.max_responses = 10;
        config.boards.truncate(1);
        config.save(&path).unwrap();

        let loaded = BoardConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [posting]
            max_responses = 3

            [[boards]]
            id = "tech"
            name = "Tech"
            category = "Hobby"
            "#,
        )
        .unwrap();

        let config = BoardConfig::load_from(&path).unwrap();
        assert_eq!(config.posting.max_responses, 3);
        assert_eq!(config.posting.max_body_chars, DEFAULT_MAX_BODY_CHARS);
        assert_eq!(config.boards.len(), 1);
        assert_eq!(config.boards[0].description, None);
        assert_eq!(config.server, ServerSection::default());
    }

    #[test]
    fn rejects_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[posting\nmax_responses = ").unwrap();

        let err = BoardConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, CoreError::ConfigParse { .. }));
    }

    #[test]
    fn rejects_zero_ceiling() {
        let mut config = BoardConfig::default();
        config.posting.max_responses = 0;
        assert!(matches!(config.validate(), Err(CoreError::Config { .. })));
    }

    #[test]
    fn rejects_duplicate_boards() {
        let mut config = BoardConfig::default();
        let first = config.boards[0].clone();
        config.boards.push(first);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate board id 'news'"));
    }

    #[test]
    fn bump_suppression_ignores_case() {
        let rules = PostingRules::default();
        assert!(rules.is_bump_suppressed(Some("sage")));
        assert!(rules.is_bump_suppressed(Some("SAGE")));
        assert!(rules.is_bump_suppressed(Some("SaGe")));
        assert!(!rules.is_bump_suppressed(Some("sage ")));
        assert!(!rules.is_bump_suppressed(Some("age")));
        assert!(!rules.is_bump_suppressed(None));
    }
}
