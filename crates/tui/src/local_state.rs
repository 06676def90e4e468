use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What the console remembers between runs.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LocalState {
    #[serde(default)]
    pub token: Option<String>,
}

impl LocalState {
    pub fn load(path: &str) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let parent = Path::new(path).parent();
        if let Some(parent) = parent {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(self)?;
        fs::write(path, payload)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_state() {
        let state = LocalState::load("config/no-such-state.json").unwrap();
        assert_eq!(state, LocalState::default());
    }

    #[test]
    fn token_survives_save_and_load() {
        let dir = std::env::temp_dir().join(format!("jumla-state-{}", std::process::id()));
        let path = dir.join("nested/console_state.json");
        let path = path.to_str().unwrap();

        let state = LocalState {
            token: Some("abc".to_string()),
        };
        state.save(path).unwrap();
        assert_eq!(LocalState::load(path).unwrap(), state);

        fs::remove_dir_all(dir).unwrap();
    }
}
