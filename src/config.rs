use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

const DEFAULT_DATABASE: &str = "superlists.db";
const DEFAULT_HTTP_BIND: &str = "127.0.0.1:8000";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_path: PathBuf,
    pub http_bind_address: SocketAddr,
}

impl ServerConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            database: cli_database,
            http_bind: cli_http_bind,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            database: file_database,
            http_bind: file_http_bind,
        } = file_config;

        let database_path = cli_database
            .or(file_database)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE));

        let http_bind_address = cli_http_bind.or(file_http_bind).unwrap_or_else(|| {
            DEFAULT_HTTP_BIND
                .parse()
                .expect("default bind address valid")
        });

        Ok(Self {
            database_path,
            http_bind_address,
        })
    }

    /// Fails fast when the database would land in a directory that does not
    /// exist, instead of letting SQLite error at first open.
    pub fn ensure_database_dir(&self) -> Result<()> {
        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                anyhow::ensure!(
                    parent.exists(),
                    "database directory {:?} does not exist",
                    parent
                );
                anyhow::ensure!(
                    parent.is_dir(),
                    "database parent {:?} is not a directory",
                    parent
                );
            }
        }
        Ok(())
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(name = "superlists", about = "To-Do lists web server", version)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "SUPERLISTS_DATABASE",
        value_name = "FILE",
        help = "Path to the SQLite database file"
    )]
    pub database: Option<PathBuf>,

    #[arg(
        long,
        env = "SUPERLISTS_HTTP_BIND",
        value_name = "ADDR",
        help = "Address the HTTP server binds to"
    )]
    pub http_bind: Option<SocketAddr>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    database: Option<PathBuf>,
    http_bind: Option<SocketAddr>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_provided() {
        let config = ServerConfig::from_args(CliArgs::default()).expect("defaults are valid");
        assert_eq!(config.database_path, PathBuf::from("superlists.db"));
        assert_eq!(
            config.http_bind_address,
            "127.0.0.1:8000".parse().unwrap()
        );
    }

    #[test]
    fn cli_values_override_the_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.yaml");
        fs::write(&path, "database: from-file.db\nhttp_bind: 127.0.0.1:9999\n")
            .expect("config writes");

        let args = CliArgs {
            config: Some(path),
            database: Some(PathBuf::from("from-cli.db")),
            http_bind: None,
        };
        let config = ServerConfig::from_args(args).expect("config parses");

        assert_eq!(config.database_path, PathBuf::from("from-cli.db"));
        assert_eq!(
            config.http_bind_address,
            "127.0.0.1:9999".parse().unwrap()
        );
    }

    #[test]
    fn json_config_files_are_supported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"database": "json.db"}"#).expect("config writes");

        let args = CliArgs {
            config: Some(path),
            ..CliArgs::default()
        };
        let config = ServerConfig::from_args(args).expect("config parses");
        assert_eq!(config.database_path, PathBuf::from("json.db"));
    }

    #[test]
    fn unsupported_config_extensions_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "database = \"nope.db\"\n").expect("config writes");

        let args = CliArgs {
            config: Some(path),
            ..CliArgs::default()
        };
        let error = ServerConfig::from_args(args).expect_err("toml is rejected");
        assert!(error.to_string().contains("unsupported config extension"));
    }

    #[test]
    fn missing_config_file_is_rejected() {
        let args = CliArgs {
            config: Some(PathBuf::from("/definitely/not/here.yaml")),
            ..CliArgs::default()
        };
        let error = ServerConfig::from_args(args).expect_err("missing file is rejected");
        assert!(error.to_string().contains("does not exist"));
    }

    #[test]
    fn database_dir_check_accepts_bare_filenames() {
        let config = ServerConfig {
            database_path: PathBuf::from("superlists.db"),
            http_bind_address: "127.0.0.1:8000".parse().unwrap(),
        };
        config.ensure_database_dir().expect("bare filename is fine");
    }

    #[test]
    fn database_dir_check_rejects_missing_directories() {
        let config = ServerConfig {
            database_path: PathBuf::from("/definitely/not/here/superlists.db"),
            http_bind_address: "127.0.0.1:8000".parse().unwrap(),
        };
        let error = config
            .ensure_database_dir()
            .expect_err("missing directory is rejected");
        assert!(error.to_string().contains("does not exist"));
    }
}
