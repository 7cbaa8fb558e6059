use std::{ffi::OsStr, path::PathBuf};

use serde::{Deserialize, Serialize};

/// Java executable used to start the game: either a bare command looked up
/// in `PATH` or an explicit path.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(transparent)]
pub struct JavaRunner(PathBuf);

impl JavaRunner {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn get(&self) -> &OsStr {
        self.0.as_os_str()
    }
}

impl Default for JavaRunner {
    fn default() -> JavaRunner {
        JavaRunner(PathBuf::from("java"))
    }
}
