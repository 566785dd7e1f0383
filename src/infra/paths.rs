// src/infra/paths.rs — Working-directory relative paths
//
// Everything convoloop reads or writes lives next to where it is launched.
// CONVOLOOP_CONFIG overrides the config file location.

use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "convoloop.toml";

/// Returns the CONVOLOOP_CONFIG override, if set.
fn config_override() -> Option<PathBuf> {
    std::env::var_os("CONVOLOOP_CONFIG").map(PathBuf::from)
}

/// Working directory, falling back to "." when it cannot be determined.
pub fn working_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Config file path: $CONVOLOOP_CONFIG or ./convoloop.toml
pub fn config_file_path() -> PathBuf {
    config_override().unwrap_or_else(|| working_dir().join(CONFIG_FILE_NAME))
}

/// Resolve the conversations directory. Relative paths hang off the working directory.
pub fn conversations_dir(configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        working_dir().join(configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_conversations_dir() {
        let dir = conversations_dir(Path::new("conversations"));
        assert!(dir.is_absolute() || dir.starts_with("."));
        assert!(dir.ends_with("conversations"));
    }

    #[test]
    fn test_absolute_conversations_dir_kept() {
        let abs = working_dir().join("elsewhere");
        assert_eq!(conversations_dir(&abs), abs);
    }
}
