use std::path::{Path, PathBuf};
use std::sync::Arc;
use rollbook::config::{self, RollbookConfig};
use rollbook::server::{self, AppState, ServeOptions};
use rollbook::client::StudentClient;
use rollbook::storage::{SqliteStore, StudentGateway};
use rollbook::ui::{self, Icons};

/// Flags that override values from `rollbook.toml`
#[derive(Debug, Default)]
pub struct Overrides {
    pub database: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub ui_dir: Option<PathBuf>,
    pub no_cors: bool,
}

pub fn resolve_config(config_path: Option<&Path>, overrides: Overrides) -> anyhow::Result<RollbookConfig> {
    let mut config = config::load_config(config_path)?.unwrap_or_default();

    if let Some(database) = overrides.database {
        config.database = Some(database.to_string_lossy().to_string());
    }
    if let Some(host) = overrides.host {
        config.host = Some(host);
    }
    if let Some(port) = overrides.port {
        config.port = Some(port);
    }
    if let Some(ui_dir) = overrides.ui_dir {
        config.ui_dir = Some(ui_dir.to_string_lossy().to_string());
    }
    if overrides.no_cors {
        config.cors = Some(false);
    }
    Ok(config)
}

/// Where the `list` display client reads students from
#[derive(Debug, Clone, PartialEq)]
pub enum ListSource {
    /// A running server, through `GET /students`
    Server(String),
    /// An existing database file, opened read-only
    Database(PathBuf),
}

impl ListSource {
    /// An explicit database wins, then an explicit URL, then the configured server
    pub fn choose(config: &RollbookConfig, url: Option<String>, database: Option<PathBuf>) -> anyhow::Result<Self> {
        match (database, url) {
            (Some(database), _) => Ok(Self::Database(database)),
            (None, Some(url)) => Ok(Self::Server(url)),
            (None, None) => Ok(Self::Server(config.server_url()?)),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Server(url) => url.clone(),
            Self::Database(path) => path.display().to_string(),
        }
    }
}

fn open_store(config: &RollbookConfig) -> anyhow::Result<SqliteStore> {
    let database = config.database_path();
    config::ensure_db_dir(&database)?;
    tracing::debug!("Opening database {}", database.display());
    Ok(SqliteStore::open(&database)?)
}

pub async fn run_serve(config: RollbookConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;
    let store = open_store(&config)?;

    ui::header("Rollbook");
    ui::info("Database", &config.database_path().display().to_string());
    ui::info("Students", &store.count()?.to_string());

    let gateway: Arc<dyn StudentGateway> = Arc::new(store);
    let options = ServeOptions {
        cors: config.cors_enabled(),
        ui_dir: config.ui_dir.as_ref().map(PathBuf::from),
    };

    server::start_server(addr, Arc::new(AppState::new(gateway)), options).await
}

pub async fn run_list(source: ListSource, json: bool) -> anyhow::Result<()> {
    let students = match &source {
        ListSource::Server(url) => StudentClient::new(url.as_str()).list_students().await?,
        ListSource::Database(path) => {
            tracing::debug!("Reading {} without a server", path.display());
            let store = SqliteStore::open_read_only(path)?;
            tokio::task::spawn_blocking(move || store.list_all()).await??
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&students)?);
    } else {
        ui::student_list(&source.describe(), &students);
    }
    Ok(())
}

pub fn run_init(config_path: Option<&Path>, database: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = config_path.map(Path::to_path_buf).unwrap_or_else(config::default_config_path);
    let database = database.unwrap_or_else(config::default_database_path);

    config::write_config(&path, &RollbookConfig::with_defaults(&database), force)?;
    ui::success(&format!("Wrote {}", path.display()));
    ui::info(&format!("{} Database", Icons::DATABASE), &database.display().to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_defaults_to_configured_server() {
        let config = RollbookConfig {
            port: Some(6000),
            ..Default::default()
        };
        let source = ListSource::choose(&config, None, None).unwrap();
        assert_eq!(source, ListSource::Server("http://127.0.0.1:6000".to_string()));
    }

    #[test]
    fn test_list_flags_pick_the_source() {
        let config = RollbookConfig::default();

        let source = ListSource::choose(&config, Some("http://10.0.0.2:80".to_string()), None).unwrap();
        assert_eq!(source, ListSource::Server("http://10.0.0.2:80".to_string()));

        let source = ListSource::choose(&config, None, Some(PathBuf::from("a.db"))).unwrap();
        assert_eq!(source, ListSource::Database(PathBuf::from("a.db")));
    }

    #[tokio::test]
    async fn test_listing_a_missing_database_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("none.db");

        assert!(run_list(ListSource::Database(path.clone()), true).await.is_err());
        assert!(!path.parent().unwrap().exists());
    }
}
