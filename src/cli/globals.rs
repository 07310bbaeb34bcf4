use directories::ProjectDirs;
use std::path::PathBuf;

/// Resolved client settings shared by every action.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub state_file: PathBuf,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String, state_file: PathBuf) -> Self {
        Self {
            api_url,
            state_file,
        }
    }
}

/// Platform data-dir location for the persisted session records, with a
/// dotfile fallback when no home directory can be determined.
#[must_use]
pub fn default_state_file() -> PathBuf {
    ProjectDirs::from("dev", "graphflix", "graphflix").map_or_else(
        || PathBuf::from(".graphflix-session.json"),
        |dirs| dirs.data_dir().join("session.json"),
    )
}
