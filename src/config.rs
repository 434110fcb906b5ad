use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5287;

/// Contents of `rollbook.toml`. Every key is optional; CLI flags win.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RollbookConfig {
    pub database: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub cors: Option<bool>,
    pub ui_dir: Option<String>,
}

impl RollbookConfig {
    /// The config `init` writes: every default spelled out
    pub fn with_defaults(database: &Path) -> Self {
        Self {
            database: Some(database.to_string_lossy().to_string()),
            host: Some(DEFAULT_HOST.to_string()),
            port: Some(DEFAULT_PORT),
            cors: Some(true),
            ui_dir: None,
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.database
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path)
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let host = self.host.as_deref().unwrap_or(DEFAULT_HOST);
        let ip: IpAddr = host
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid host '{}': {}", host, e))?;
        Ok(SocketAddr::new(ip, self.port.unwrap_or(DEFAULT_PORT)))
    }

    /// Base URL a local client uses to reach the configured server.
    ///
    /// A wildcard bind address is reached through loopback.
    pub fn server_url(&self) -> anyhow::Result<String> {
        let addr = self.bind_addr()?;
        let ip = if addr.ip().is_unspecified() {
            IpAddr::from([127, 0, 0, 1])
        } else {
            addr.ip()
        };
        Ok(format!("http://{}", SocketAddr::new(ip, addr.port())))
    }

    pub fn cors_enabled(&self) -> bool {
        self.cors.unwrap_or(true)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("rollbook.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from(".rollbook").join("students.db")
}

/// Read `rollbook.toml` (or `path`); a missing file means "all defaults"
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<RollbookConfig>> {
    let path = path.map_or_else(default_config_path, Path::to_path_buf);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };

    let config = toml::from_str::<RollbookConfig>(&contents)
        .with_context(|| format!("parsing {}", path.display()))?;
    tracing::debug!("Rollbook config: {}", path.display());
    Ok(Some(config))
}

/// Write the config `init` produces, refusing to clobber one unless forced
pub fn write_config(path: &Path, config: &RollbookConfig, force: bool) -> anyhow::Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "{} already exists (pass --force to replace it)",
        path.display()
    );

    std::fs::write(path, toml::to_string_pretty(config)?)
        .with_context(|| format!("writing {}", path.display()))
}

/// Create the directory that will hold the student database.
///
/// Only the serving path calls this; reading an existing database never
/// creates anything.
pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    match db_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
            .with_context(|| format!("creating database directory {}", dir.display())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(dir.path().join("nope.toml").as_path())).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rollbook.toml");
        let config = RollbookConfig::with_defaults(Path::new("data/students.db"));

        write_config(&path, &config, false).unwrap();
        assert_eq!(load_config(Some(path.as_path())).unwrap(), Some(config.clone()));

        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config: RollbookConfig = toml::from_str("port = 8080\n").unwrap();
        assert_eq!(config.database_path(), default_database_path());
        assert_eq!(config.bind_addr().unwrap(), "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert!(config.cors_enabled());
    }

    #[test]
    fn test_bad_host_is_rejected() {
        let config = RollbookConfig {
            host: Some("not an ip".to_string()),
            ..Default::default()
        };
        assert!(config.bind_addr().is_err());
    }

    #[test]
    fn test_server_url_reaches_wildcard_binds_through_loopback() {
        let config = RollbookConfig {
            host: Some("0.0.0.0".to_string()),
            port: Some(9000),
            ..Default::default()
        };
        assert_eq!(config.server_url().unwrap(), "http://127.0.0.1:9000");
        assert_eq!(RollbookConfig::default().server_url().unwrap(), "http://127.0.0.1:5287");
    }

    #[test]
    fn test_malformed_config_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rollbook.toml");
        std::fs::write(&path, "port = \"high\"\n").unwrap();

        let err = load_config(Some(path.as_path())).unwrap_err();
        assert!(err.to_string().contains("rollbook.toml"));
    }

    #[test]
    fn test_ensure_db_dir_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("students.db");
        ensure_db_dir(&db).unwrap();
        assert!(db.parent().unwrap().is_dir());
    }
}
