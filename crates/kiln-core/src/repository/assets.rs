use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Asset index: logical name to content-addressed object.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AssetIndex {
    pub objects: BTreeMap<String, AssetObject>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssetObject {
    pub hash: String,
    pub size: u64,
}

impl AssetIndex {
    pub async fn read(path: impl AsRef<Path>) -> Result<Self> {
        crate::fs::read_json(path).await
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
