//! Connection configuration from the environment and `.env` files.

use crate::error::{DbError, DbResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// How many parent directories are searched for a `.env` file.
const ENV_SEARCH_DEPTH: usize = 5;

/// Key-value source: process environment first, then values read from a `.env` file.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    file_vars: HashMap<String, String>,
    use_process_env: bool,
}

impl EnvSource {
    /// Process environment only.
    pub fn process() -> Self {
        Self {
            file_vars: HashMap::new(),
            use_process_env: true,
        }
    }

    /// Fixed values, ignoring the process environment.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            file_vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            use_process_env: false,
        }
    }

    /// Process environment layered over the given `.env` file.
    ///
    /// The file is parsed without modifying the process environment.
    pub fn with_file(path: &Path) -> DbResult<Self> {
        if !path.is_file() {
            return Err(DbError::missing_config(format!(
                ".env file not found at {}",
                path.display()
            )));
        }
        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            DbError::missing_config(format!("failed to read {}: {e}", path.display()))
        })?;

        let mut file_vars = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| {
                DbError::missing_config(format!("failed to parse {}: {e}", path.display()))
            })?;
            file_vars.insert(key, value);
        }

        Ok(Self {
            file_vars,
            use_process_env: true,
        })
    }

    /// Find a `.env` file in `start` or one of its parents.
    pub fn discover(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .take(ENV_SEARCH_DEPTH + 1)
            .map(|dir| dir.join(".env"))
            .find(|candidate| candidate.is_file())
    }

    /// Look a key up; the process environment wins over file values.
    pub fn get(&self, key: &str) -> Option<String> {
        if self.use_process_env {
            if let Ok(value) = std::env::var(key) {
                return Some(value);
            }
        }
        self.file_vars.get(key).cloned()
    }

    /// Check that every key is present.
    pub fn check_required(&self, keys: &[&str]) -> DbResult<()> {
        match keys.iter().find(|k| self.get(k).is_none()) {
            Some(key) => Err(DbError::missing_config(*key)),
            None => Ok(()),
        }
    }
}

/// Connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: Option<String>,
    pub charset: String,
    pub timezone: String,
}

impl DbConfig {
    pub const DEFAULT_HOST: &'static str = "localhost";
    pub const DEFAULT_PORT: u16 = 3306;
    pub const DEFAULT_CHARSET: &'static str = "utf8mb4";
    pub const DEFAULT_TIMEZONE: &'static str = "+00:00";

    /// Read `DB_*` keys from a source.
    ///
    /// `DB_DATABASE` and `DB_USERNAME` are required and must be non-empty.
    pub fn from_source(source: &EnvSource) -> DbResult<Self> {
        let required = |key: &str| {
            source
                .get(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| DbError::missing_config(key))
        };
        let database = required("DB_DATABASE")?;
        let username = required("DB_USERNAME")?;

        let port = match source.get("DB_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                DbError::invalid_config("DB_PORT", format!("expected a port number, got '{raw}'"))
            })?,
            None => Self::DEFAULT_PORT,
        };

        Ok(Self {
            host: source
                .get("DB_HOST")
                .unwrap_or_else(|| Self::DEFAULT_HOST.to_string()),
            port,
            database,
            username,
            password: source.get("DB_PASSWORD"),
            charset: source
                .get("DB_CHARSET")
                .unwrap_or_else(|| Self::DEFAULT_CHARSET.to_string()),
            timezone: source
                .get("DB_TIMEZONE")
                .unwrap_or_else(|| Self::DEFAULT_TIMEZONE.to_string()),
        })
    }

    /// Read from the process environment plus the nearest `.env` above the
    /// current directory, if there is one.
    pub fn from_env() -> DbResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| DbError::missing_config(format!("cannot resolve working directory: {e}")))?;
        let source = match EnvSource::discover(&cwd) {
            Some(path) => EnvSource::with_file(&path)?,
            None => EnvSource::process(),
        };
        Self::from_source(&source)
    }

    /// MySQL-style DSN: `mysql:host=..;port=..;dbname=..;charset=..`.
    pub fn dsn(&self) -> String {
        format!(
            "mysql:host={};port={};dbname={};charset={}",
            self.host, self.port, self.database, self.charset
        )
    }

    /// Session statement that applies the configured time zone.
    pub fn timezone_statement(&self) -> String {
        format!("SET time_zone = '{}'", self.timezone.replace('\'', "''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let source = EnvSource::from_pairs([("DB_DATABASE", "app"), ("DB_USERNAME", "root")]);
        let config = DbConfig::from_source(&source).unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 3306);
        assert_eq!(config.charset, "utf8mb4");
        assert_eq!(config.timezone, "+00:00");
        assert_eq!(config.password, None);
        assert_eq!(
            config.dsn(),
            "mysql:host=localhost;port=3306;dbname=app;charset=utf8mb4"
        );
        assert_eq!(config.timezone_statement(), "SET time_zone = '+00:00'");
    }

    #[test]
    fn test_missing_required() {
        let source = EnvSource::from_pairs([("DB_USERNAME", "root")]);
        let err = DbConfig::from_source(&source).unwrap_err();
        assert!(err.is_missing_configuration());
        assert!(err.to_string().contains("DB_DATABASE"));

        let source = EnvSource::from_pairs([("DB_DATABASE", "app"), ("DB_USERNAME", "")]);
        let err = DbConfig::from_source(&source).unwrap_err();
        assert!(err.to_string().contains("DB_USERNAME"));
    }

    #[test]
    fn test_invalid_port() {
        let source = EnvSource::from_pairs([
            ("DB_DATABASE", "app"),
            ("DB_USERNAME", "root"),
            ("DB_PORT", "mysql"),
        ]);
        let err = DbConfig::from_source(&source).unwrap_err();
        assert!(err.is_invalid_configuration());
        assert_eq!(
            err.to_string(),
            "Invalid configuration for DB_PORT: expected a port number, got 'mysql'"
        );
    }

    #[test]
    fn test_check_required() {
        let source = EnvSource::from_pairs([("A", "1")]);
        assert!(source.check_required(&["A"]).is_ok());
        assert!(source.check_required(&["A", "B"]).unwrap_err().to_string().contains('B'));
    }

    #[test]
    fn test_env_file_discovery() {
        let root = std::env::temp_dir().join(format!("sqlchain-config-{}", std::process::id()));
        let nested = root.join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            root.join(".env"),
            "# database\nSQLCHAIN_TEST_DB=\"shop\"\nSQLCHAIN_TEST_HOST=db.internal\n",
        )
        .unwrap();

        let found = EnvSource::discover(&nested).unwrap();
        assert_eq!(found, root.join(".env"));

        let source = EnvSource::with_file(&found).unwrap();
        assert_eq!(source.get("SQLCHAIN_TEST_DB").as_deref(), Some("shop"));
        assert_eq!(source.get("SQLCHAIN_TEST_HOST").as_deref(), Some("db.internal"));
        assert_eq!(source.get("SQLCHAIN_TEST_MISSING"), None);

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_missing_env_file() {
        let err = EnvSource::with_file(Path::new("/nonexistent/sqlchain/.env")).unwrap_err();
        assert!(err.is_missing_configuration());
    }
}
