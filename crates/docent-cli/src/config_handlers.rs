//! Handlers for `docent config`.
//!
//! Keys are dotted paths into the TOML document (`loader.cache_ttl_secs`,
//! `loader.search.max_results`, `storage.backend`). Values given to `set`
//! are read as TOML literals when they parse as one (`25`, `true`,
//! `["md", "json"]`) and as plain strings otherwise.

use std::path::{Path, PathBuf};

use docent_core::{Error, Result};
use toml::{Table, Value};

use crate::cli::ConfigAction;
use crate::config::{DocentConfig, PROJECT_NAME};

// ============================================================================
// Command dispatch
// ============================================================================

/// Run a config subcommand, printing its outcome.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => {
            let path = config_file(config_path)?;
            println!("{}", path.display());
            if !path.exists() {
                eprintln!("(not created yet; `{PROJECT_NAME} config init` writes the defaults)");
            }
        }
        ConfigAction::Get { key } => println!("{}", cmd_config_get(config_path, &key)?),
        ConfigAction::Set { key, value } => {
            let path = cmd_config_set(config_path, &key, &value)?;
            log::info!("updated {key} in {}", path.display());
            println!("{key} = {}", cmd_config_get(Some(&path.to_string_lossy()), &key)?);
        }
        ConfigAction::Init { file, force } => {
            let path = cmd_config_init(file.as_deref().or(config_path), force)?;
            println!("Wrote default configuration to {}", path.display());
        }
    }
    Ok(())
}

fn config_file(config_path: Option<&str>) -> Result<PathBuf> {
    DocentConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("no config directory on this platform; pass --config"))
}

fn read_table(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    text.parse::<Table>()
        .map_err(|e| Error::config(format!("{}: {e}", path.display())))
}

// ============================================================================
// Command handlers
// ============================================================================

/// The effective value at `key`: the file's setting, or the default.
pub fn cmd_config_get(config_path: Option<&str>, key: &str) -> Result<String> {
    let config = DocentConfig::load(config_path)?;
    let tree = Value::try_from(&config).map_err(|e| Error::config(e.to_string()))?;
    lookup(&tree, key)
        .map(display_value)
        .ok_or_else(|| Error::config(format!("unknown configuration key '{key}'")))
}

/// Write `value` at `key` in the existing config file. Returns the file.
///
/// Nothing is written unless the edited file still loads as a
/// [`DocentConfig`].
pub fn cmd_config_set(config_path: Option<&str>, key: &str, value: &str) -> Result<PathBuf> {
    let path = config_file(config_path)?;
    if !path.is_file() {
        return Err(Error::config(format!(
            "{} does not exist; run `{PROJECT_NAME} config init` first",
            path.display()
        )));
    }

    let mut table = read_table(&path)?;
    assign(&mut table, key, literal(value))?;

    let text = toml::to_string_pretty(&table).map_err(|e| Error::config(e.to_string()))?;
    if let Err(e) = DocentConfig::from_toml_str(&text) {
        return Err(Error::config(format!("'{value}' is not valid for {key}: {e}")));
    }
    std::fs::write(&path, text).map_err(|e| Error::io_with_path(e, &path))?;
    Ok(path)
}

/// Write the default configuration to `file` (or the platform location).
pub fn cmd_config_init(file: Option<&str>, force: bool) -> Result<PathBuf> {
    let path = match file {
        Some(file) => PathBuf::from(file),
        None => config_file(None)?,
    };
    if path.exists() && !force {
        return Err(Error::config(format!(
            "{} already exists (use --force to replace it)",
            path.display()
        )));
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| Error::io_with_path(e, dir))?;
    }
    let text = DocentConfig::default().to_toml_string()?;
    std::fs::write(&path, text).map_err(|e| Error::io_with_path(e, &path))?;
    Ok(path)
}

// ============================================================================
// Dotted keys
// ============================================================================

/// The value at a dotted key, if every segment resolves.
pub fn lookup<'a>(tree: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(tree, |node, segment| node.get(segment))
}

/// Put `value` at a dotted key, creating missing tables along the way.
pub fn assign(table: &mut Table, key: &str, value: Value) -> Result<()> {
    let mut segments: Vec<&str> = key.split('.').collect();
    let last = segments.pop().filter(|s| !s.is_empty());
    let Some(last) = last.filter(|_| segments.iter().all(|s| !s.is_empty())) else {
        return Err(Error::config(format!("malformed key '{key}'")));
    };

    let mut node = table;
    for segment in segments {
        let entry = node
            .entry(segment)
            .or_insert_with(|| Value::Table(Table::new()));
        node = entry
            .as_table_mut()
            .ok_or_else(|| Error::config(format!("'{segment}' in '{key}' is not a section")))?;
    }
    node.insert(last.to_string(), value);
    Ok(())
}

/// Read a command-line value as a TOML literal, or as a bare string.
pub fn literal(raw: &str) -> Value {
    format!("v = {raw}")
        .parse::<Table>()
        .ok()
        .and_then(|mut t| t.remove("v"))
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

/// Render a value for stdout: strings bare, everything else as TOML.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Table(table) => toml::to_string_pretty(table).unwrap_or_else(|_| value.to_string()),
        other => other.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
