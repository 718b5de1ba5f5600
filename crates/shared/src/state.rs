use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Channel key -> id of the last video announced (or skipped) for that channel.
///
/// Keys stay sorted, so the saved file is always in key order.
pub type StateMap = BTreeMap<String, String>;

pub const DEFAULT_STATE_FILE: &str = ".github/data/last_seen.json";

/// Load the marker map; a missing file means no channel has been processed yet
pub fn load_state(path: &Path) -> Result<StateMap> {
    if !path.exists() {
        return Ok(StateMap::new());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file: {}", path.display()))?;

    serde_json::from_str(&content).with_context(|| {
        format!(
            "Failed to parse state file {}. Expected a JSON object of channel key to video id.",
            path.display()
        )
    })
}

/// Write the marker map as pretty JSON with a trailing newline
pub fn save_state(path: &Path, state: &StateMap) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create state directory: {}", parent.display()))?;
    }

    let mut json = serde_json::to_string_pretty(state).context("Failed to serialize state")?;
    json.push('\n');

    fs::write(path, json)
        .with_context(|| format!("Failed to write state file: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = load_state(&dir.path().join("last_seen.json")).unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_seen.json");

        let mut state = StateMap::new();
        state.insert("hashtag_united_extra".to_string(), "abc123".to_string());
        state.insert("hashtag_united".to_string(), "xyz-_9".to_string());

        save_state(&path, &state).unwrap();
        assert_eq!(load_state(&path).unwrap(), state);
    }

    #[test]
    fn test_saved_file_is_sorted_with_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_seen.json");

        let mut state = StateMap::new();
        state.insert("zeta".to_string(), "2".to_string());
        state.insert("alpha".to_string(), "1".to_string());
        save_state(&path, &state).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "{\n  \"alpha\": \"1\",\n  \"zeta\": \"2\"\n}\n");
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".github").join("data").join("last_seen.json");

        save_state(&path, &StateMap::new()).unwrap();
        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}\n");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_seen.json");
        fs::write(&path, "[\"not\", \"a map\"]").unwrap();

        let err = load_state(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse state file"));
    }
}
