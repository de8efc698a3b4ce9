use crate::session::{SavedWidgetState, SCHEMA_VERSION};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub fn default_state_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".coursedeck").join("state"))
}

fn file_stem(turn_id: &str) -> String {
    let stem: String = turn_id
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_')
        .take(64)
        .collect();
    if stem.is_empty() {
        "default".to_string()
    } else {
        stem
    }
}

fn state_path(dir: &Path, turn_id: &str) -> PathBuf {
    dir.join(format!("{}.json", file_stem(turn_id)))
}

fn read_state_file(path: &Path) -> Result<SavedWidgetState, String> {
    let data = fs::read(path).map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    let saved: SavedWidgetState = serde_json::from_slice(&data)
        .map_err(|err| format!("failed to parse {}: {err}", path.display()))?;
    if saved.schema_version != SCHEMA_VERSION {
        return Err(format!(
            "unknown schema_version in {}: {}",
            path.display(),
            saved.schema_version
        ));
    }
    Ok(saved)
}

/// Writes to a temp file first and renames it over the previous state.
pub fn save(dir: &Path, saved: &SavedWidgetState) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let final_path = state_path(dir, &saved.turn_id);
    let tmp_path = dir.join(format!("{}.json.tmp", file_stem(&saved.turn_id)));
    let bytes = serde_json::to_vec_pretty(saved)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;

    fs::write(&tmp_path, bytes)?;
    match fs::rename(&tmp_path, &final_path) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if final_path.exists() {
                fs::remove_file(&final_path)?;
                fs::rename(&tmp_path, &final_path)?;
                Ok(())
            } else {
                Err(rename_err)
            }
        }
    }
}

/// Loads the state saved for `turn_id`. A missing file is a first mount, not a
/// warning.
pub fn load_one(dir: &Path, turn_id: &str) -> (Option<SavedWidgetState>, Option<String>) {
    let path = state_path(dir, turn_id);
    if !path.exists() {
        return (None, None);
    }

    match read_state_file(&path) {
        Ok(saved) => (Some(saved), None),
        Err(err) => (None, Some(err)),
    }
}
