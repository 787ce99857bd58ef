use std::path::{Path, PathBuf};

use directories_next::ProjectDirs;

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "Cosmos";
const APPLICATION: &str = "Cosmos";
pub const CONFIG_FILE: &str = "cosmos.toml";

/// Picks the scene file to load: an explicit path (flag or `COSMOS_CONFIG`)
/// always wins, otherwise `cosmos.toml` in the platform config dir if it
/// exists.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let dirs = ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)?;
    existing_config_in(dirs.config_dir())
}

fn existing_config_in(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join(CONFIG_FILE);
    candidate.is_file().then_some(candidate)
}
