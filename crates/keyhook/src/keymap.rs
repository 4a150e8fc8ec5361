//! Keymap file persistence.
//!
//! Bindings are stored as TOML with one `[bindings]` table whose keys are
//! operation names and whose values hold the alternatives:
//!
//! ```toml
//! [bindings]
//! Copy = "Ctrl+C"
//! Rename = "Shift+F6;F2"
//! Delete = ["F8", "Delete"]
//! ```
//!
//! A value may be one string with `;`-separated alternatives or an array of
//! strings. Table order is preserved, so the order conflicts are resolved in
//! matches the order of the file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use keyhook_core::{ALTERNATIVE_SEPARATOR, Bindings, Operation};
use serde::{Deserialize, Serialize};

use crate::error::KeymapError;
use crate::logging::targets;

/// File name of the keymap inside the configuration directory.
pub const KEYMAP_FILE_NAME: &str = "keymap.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
struct KeymapDocument {
    #[serde(default)]
    bindings: toml::Table,
}

/// The platform location of the keymap file, e.g.
/// `~/.config/keyhook/keymap.toml` on Linux.
pub fn default_keymap_path() -> Result<PathBuf, KeymapError> {
    let dirs = ProjectDirs::from("", "", "keyhook").ok_or(KeymapError::NoConfigDir)?;
    Ok(dirs.config_dir().join(KEYMAP_FILE_NAME))
}

/// Parse keymap TOML text.
///
/// Unknown operation names and values that are neither a string nor an array
/// of strings are skipped with a warning.
pub fn parse_keymap(text: &str) -> Result<Bindings, toml::de::Error> {
    let document: KeymapDocument = toml::from_str(text)?;
    let mut bindings = Bindings::new();

    for (name, value) in document.bindings {
        let Some(operation) = Operation::from_name(&name) else {
            tracing::warn!(target: targets::KEYMAP, operation = %name, "unknown operation in keymap, skipping");
            continue;
        };
        match alternatives_text(&value) {
            Some(text) => bindings.insert(operation, text),
            None => {
                tracing::warn!(target: targets::KEYMAP, %operation, "keymap value is not a string or string array, skipping")
            }
        }
    }
    Ok(bindings)
}

fn alternatives_text(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(text) => Some(text.clone()),
        toml::Value::Array(items) => {
            let parts = items
                .iter()
                .map(|item| item.as_str().map(str::trim))
                .collect::<Option<Vec<_>>>()?;
            Some(parts.join(ALTERNATIVE_SEPARATOR.to_string().as_str()))
        }
        _ => None,
    }
}

/// Render bindings as keymap TOML.
pub fn keymap_to_string(bindings: &Bindings) -> Result<String, KeymapError> {
    let mut table = toml::Table::new();
    for (operation, text) in bindings.iter() {
        table.insert(operation.name().to_string(), toml::Value::String(text.to_string()));
    }
    let document = KeymapDocument { bindings: table };
    Ok(toml::to_string_pretty(&document)?)
}

/// Read a keymap file. A missing file is an error; see [`load_keymap`] for
/// the create-on-first-run behavior.
pub fn read_keymap(path: impl AsRef<Path>) -> Result<Bindings, KeymapError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|err| KeymapError::io(path, err))?;
    parse_keymap(&text).map_err(|source| KeymapError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a keymap file, writing the default bindings to it if it does not
/// exist yet.
pub fn load_keymap(path: impl AsRef<Path>) -> Result<Bindings, KeymapError> {
    let path = path.as_ref();
    match read_keymap(path) {
        Err(KeymapError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            tracing::info!(target: targets::KEYMAP, path = %path.display(), "no keymap found, writing defaults");
            let defaults = Bindings::defaults();
            save_keymap(path, &defaults)?;
            Ok(defaults)
        }
        other => other,
    }
}

/// Like [`load_keymap`], but logs any failure and falls back to the default
/// bindings instead of returning an error.
pub fn load_keymap_or_default(path: impl AsRef<Path>) -> Bindings {
    let path = path.as_ref();
    load_keymap(path).unwrap_or_else(|err| {
        tracing::error!(target: targets::KEYMAP, error = %err, "failed to load keymap, using defaults");
        Bindings::defaults()
    })
}

/// Write bindings to `path`, creating parent directories as needed.
///
/// The file is written to a temporary sibling first and then renamed over
/// the target, so readers never see a half-written keymap.
pub fn save_keymap(path: impl AsRef<Path>, bindings: &Bindings) -> Result<(), KeymapError> {
    let path = path.as_ref();
    let text = keymap_to_string(bindings)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|err| KeymapError::io(dir, err))?;

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|err| KeymapError::io(dir, err))?;
    file.write_all(text.as_bytes())
        .map_err(|err| KeymapError::io(file.path(), err))?;
    file.persist(path)
        .map_err(|err| KeymapError::io(path, err.error))?;

    tracing::debug!(target: targets::KEYMAP, path = %path.display(), entries = bindings.len(), "keymap saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string_and_array_values() {
        let bindings = parse_keymap(
            r#"
            [bindings]
            Copy = "Ctrl+C"
            Delete = ["F8", " Delete "]
            "#,
        )
        .unwrap();

        assert_eq!(bindings.get(Operation::Copy), Some("Ctrl+C"));
        assert_eq!(bindings.get(Operation::Delete), Some("F8;Delete"));
    }

    #[test]
    fn test_parse_preserves_file_order() {
        let bindings = parse_keymap(
            r#"
            [bindings]
            Move = "ctrl+c"
            Copy = "ctrl+c"
            "#,
        )
        .unwrap();

        let order: Vec<_> = bindings.iter().map(|(op, _)| op).collect();
        assert_eq!(order, vec![Operation::Move, Operation::Copy]);
    }

    #[test]
    fn test_parse_skips_unknown_entries() {
        let bindings = parse_keymap(
            r#"
            [bindings]
            Teleport = "ctrl+t"
            Refresh = 5
            Open = "enter"
            "#,
        )
        .unwrap();

        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings.get(Operation::Open), Some("enter"));
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_keymap("").unwrap().is_empty());
        assert!(parse_keymap("[bindings]").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(parse_keymap("[bindings\nCopy = ").is_err());
    }

    #[test]
    fn test_text_round_trip() {
        let defaults = Bindings::defaults();
        let text = keymap_to_string(&defaults).unwrap();
        assert!(text.contains("[bindings]"));
        assert!(text.contains("Rename = \"Shift+F6;F2\""));
        assert_eq!(parse_keymap(&text).unwrap(), defaults);
    }
}
