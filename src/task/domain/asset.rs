//! Names of the files a task produces.

use super::ColorName;
use serde::Serialize;
use std::fmt;

/// File name of an asset stored under a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AssetName(String);

impl AssetName {
    /// Name of the background-removed cutout.
    #[must_use]
    pub fn baseline() -> Self {
        Self("baseline.png".to_owned())
    }

    /// Name of the variant rendered on `color`.
    #[must_use]
    pub fn variant(color: &ColorName) -> Self {
        Self(format!("{color}.jpg"))
    }

    /// Name of the print sheet of the given layout kind.
    #[must_use]
    pub fn layout(kind: &str) -> Self {
        Self(format!("layout_{kind}.jpg"))
    }

    /// Returns the file name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
