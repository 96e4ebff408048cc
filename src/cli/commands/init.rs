//! `init` command: write default settings and create the database.

use std::path::Path;

use console::style;

use crate::config::{Settings, API_KEY_ENV, SETTINGS_FILE};
use crate::repository::JobRepository;

pub fn run(settings: &Settings, config_path: Option<&Path>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(|| Path::new(SETTINGS_FILE));
    if path.exists() {
        println!("Settings file already exists: {}", path.display());
    } else {
        settings.write(path)?;
        println!("{} {}", style("Wrote").green(), path.display());
    }

    JobRepository::new(&settings.database.path)?;
    println!(
        "{} {}",
        style("Database ready:").green(),
        settings.database.path.display()
    );
    println!("Set {API_KEY_ENV} (or put it in .env) before running `iscout search`.");
    Ok(())
}
