//! Bundle file collecting a controller setup and signed relay calls.
//!
//! Relay calls keep their signing order so the bundle can be submitted as one
//! `executeRelayCallBatch`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde_json::{json, Value};

use crate::error::EncoderError;

/// Where a command's result lands inside a bundle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    /// Latest controller setup; replaces any earlier one.
    Setup,
    /// Signed relay calls, appended in signing order.
    RelayCalls,
}

/// Merge `entry` into the bundle at `path` and replace the file in one rename.
/// Returns the number of relay calls the bundle now holds.
pub fn update_bundle(path: &Path, section: Section, entry: Value) -> Result<usize, EncoderError> {
    let mut bundle = if path.exists() {
        serde_json::from_str::<Value>(&fs::read_to_string(path)?)?
    } else {
        json!({ "relayCalls": [] })
    };
    let relay_calls = merge_entry(&mut bundle, section, entry)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let staged = staging_path(path);
    fs::write(&staged, serde_json::to_string_pretty(&bundle)?)?;
    fs::rename(&staged, path)?;
    Ok(relay_calls)
}

fn merge_entry(bundle: &mut Value, section: Section, entry: Value) -> Result<usize, EncoderError> {
    let Some(fields) = bundle.as_object_mut() else {
        return Err(EncoderError::Bundle("not a JSON object".to_string()));
    };

    match section {
        Section::Setup => {
            fields.insert("setup".to_string(), entry);
        }
        Section::RelayCalls => {
            let calls = fields
                .entry("relayCalls")
                .or_insert_with(|| json!([]))
                .as_array_mut()
                .ok_or_else(|| EncoderError::Bundle("relayCalls is not an array".to_string()))?;
            // a signer's nonce can only be spent once per batch
            if calls
                .iter()
                .any(|c| c["signer"] == entry["signer"] && c["nonce"] == entry["nonce"])
            {
                return Err(EncoderError::Bundle(format!(
                    "already holds a call from {} with nonce {}",
                    entry["signer"], entry["nonce"]
                )));
            }
            calls.push(entry);
        }
    }
    Ok(fields
        .get("relayCalls")
        .and_then(Value::as_array)
        .map_or(0, Vec::len))
}

fn staging_path(path: &Path) -> PathBuf {
    let mut staged = path.as_os_str().to_os_string();
    staged.push(".partial");
    PathBuf::from(staged)
}
