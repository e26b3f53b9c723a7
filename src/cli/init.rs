//! gt init command implementation
//!
//! Creates the store snapshot and a default `.goaltrack.toml`.

use std::path::{Path, PathBuf};

use crate::cli::{config_path, resolve_storage, GlobalOptions};
use crate::config::Config;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

pub struct InitOptions {
    pub global: GlobalOptions,
}

#[derive(serde::Serialize)]
struct InitReport {
    store: PathBuf,
    config: PathBuf,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    store: bool,
    config: bool,
}

pub fn run(options: InitOptions) -> Result<()> {
    let (config, storage) = resolve_storage(&options.global)?;
    let created_store = storage.init()?;

    // The per-user store has no working-directory config to seed.
    let config_file = config_path(&options.global)?;
    let created_config = if options.global.global || config_file.exists() {
        false
    } else {
        ensure_config(&config_file, &config)?
    };

    let report = InitReport {
        store: storage.store_path().to_path_buf(),
        config: config_file.clone(),
        created: InitCreated {
            store: created_store,
            config: created_config,
        },
    };

    let header = if created_store || created_config {
        "gt initialized"
    } else {
        "gt already initialized"
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("Store", storage.store_path().display().to_string());
    if created_config {
        human.push_summary("Config", config_file.display().to_string());
    }
    human.push_next_step("gt goal new \"<title>\"");

    emit_success(options.global.output(), "init", &report, Some(&human))
}

fn ensure_config(path: &Path, config: &Config) -> Result<bool> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    config.save(path)?;
    tracing::info!(path = %path.display(), "wrote default config");
    Ok(true)
}
