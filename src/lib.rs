//! ingestion of a mountaineering expeditions dataset into sqlite
//! and the analytical queries on top of it

pub mod config;
pub mod db;
pub mod entity;
pub mod error;

pub use config::Config;
pub use db::load::{load, load_file, load_if_empty, load_str, LoadSummary};
pub use db::report::Reporter;
pub use db::{Repository, Store};
pub use entity::{Climber, Expedition, Mountain};
pub use error::{Result, SummitError};

/// open the configured store, load the source if the store is empty
/// and hand back a reporter on it
pub fn open_reporter(config: &Config) -> Result<Reporter>
{
    if let Some(dir) = config.database.parent()
    {
        if !dir.as_os_str().is_empty() && !dir.exists()
        {
            tracing::info!(dir = %dir.display(), "folder doesn't exist, creating");
            std::fs::create_dir_all(dir)?;
        }
    }

    let mut store = Store::open(&config.database)?;
    load_if_empty(&mut store, &config.source)?;

    Ok(Reporter::new(store, &config.export_dir))
}
