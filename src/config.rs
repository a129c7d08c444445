//! layered configuration
//!
//! sources, highest wins:
//!  1. environment variables (`SUMMITDB_DATABASE`, `SUMMITDB_SOURCE`,
//!     `SUMMITDB_EXPORT_DIR`)
//!  2. `config.toml` in the OS specific configuration folder
//!     (eg `~/.config/summitdb` for unix)
//!  3. built-in defaults

use std::path::PathBuf;

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DB_NAME     : &str = "climbersapp.db";
pub const SOURCE_NAME : &str = "expeditions.json";
pub const ENV_PREFIX  : &str = "SUMMITDB_";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config
{
    /// sqlite database file
    pub database   : PathBuf,
    /// expeditions JSON loaded into an empty database
    pub source     : PathBuf,
    /// folder csv exports are written to
    pub export_dir : PathBuf,
}

impl Default for Config
{
    fn default() -> Self
    {
        // falls back to the working directory if the OS has no such folder
        let data_dir = project_dirs()
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        Config {
            database   : data_dir.join(DB_NAME),
            source     : PathBuf::from(SOURCE_NAME),
            export_dir : PathBuf::from("."),
        }
    }
}

impl Config
{
    pub fn load() -> Result<Self>
    {
        Ok(Self::figment().extract()?)
    }

    /// provider chain reading the user's `config.toml`
    pub fn figment() -> Figment
    {
        Self::figment_with(Self::config_file())
    }

    /// provider chain w/ an explicit config file; skipped if None or missing
    pub fn figment_with(config_file: Option<PathBuf>) -> Figment
    {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if let Some(path) = config_file
        {
            if path.exists()
            {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn config_file() -> Option<PathBuf>
    {
        project_dirs().map(|d| d.config_dir().join("config.toml"))
    }
}

fn project_dirs() -> Option<ProjectDirs>
{
    ProjectDirs::from("dev", "sintheta", "summitdb")
}
