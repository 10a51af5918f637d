//! Photo specifications, the built-in catalog and background colors.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Code of the specification used when a caller names none or an unknown one.
pub const DEFAULT_SPEC_CODE: &str = "passport";

/// Color used when neither the caller nor the task names one.
pub const DEFAULT_COLOR: &str = "white";

/// Output geometry requested for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Specification code, for example `cn_1inch`.
    pub code: String,
    /// Output width in pixels.
    pub width_px: u32,
    /// Output height in pixels.
    pub height_px: u32,
    /// Output resolution in dots per inch.
    pub dpi: u32,
}

/// Catalog entry describing a supported photo specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoSpec {
    /// Stable specification code.
    pub code: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Width in pixels.
    pub width_px: u32,
    /// Height in pixels.
    pub height_px: u32,
    /// Resolution in dots per inch.
    pub dpi: u32,
    /// Background colors offered for the specification.
    pub colors: &'static [&'static str],
}

const STANDARD_COLORS: &[&str] = &[
    "white",
    "blue",
    "red",
    "tint",
    "grey",
    "gradient",
    "dark_blue",
    "sky_blue",
];

const PASSPORT: PhotoSpec = PhotoSpec {
    code: "passport",
    name: "Passport",
    width_px: 354,
    height_px: 472,
    dpi: 300,
    colors: &["white", "blue", "red"],
};

const BUILTIN_SPECS: &[PhotoSpec] = &[
    PASSPORT,
    PhotoSpec {
        code: "cn_1inch",
        name: "One inch",
        width_px: 295,
        height_px: 413,
        dpi: 300,
        colors: STANDARD_COLORS,
    },
    PhotoSpec {
        code: "cn_2inch",
        name: "Two inch",
        width_px: 413,
        height_px: 579,
        dpi: 300,
        colors: STANDARD_COLORS,
    },
    PhotoSpec {
        code: "cn_2inch_small",
        name: "Small two inch",
        width_px: 413,
        height_px: 531,
        dpi: 300,
        colors: STANDARD_COLORS,
    },
    PhotoSpec {
        code: "cn_1inch_large",
        name: "Large one inch",
        width_px: 390,
        height_px: 567,
        dpi: 300,
        colors: STANDARD_COLORS,
    },
    PhotoSpec {
        code: "cn_social_security",
        name: "Social security card",
        width_px: 358,
        height_px: 441,
        dpi: 300,
        colors: &["white"],
    },
];

/// Lookup over the built-in photo specifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecCatalog;

impl SpecCatalog {
    /// Returns every built-in specification.
    #[must_use]
    pub const fn all(self) -> &'static [PhotoSpec] {
        BUILTIN_SPECS
    }

    /// Finds a specification by code, falling back to `passport`.
    #[must_use]
    pub fn find(self, code: &str) -> &'static PhotoSpec {
        let wanted = code.trim();
        BUILTIN_SPECS
            .iter()
            .find(|spec| spec.code == wanted)
            .unwrap_or(&PASSPORT)
    }

    /// Completes caller geometry with catalog defaults.
    ///
    /// Zero dimensions are taken from the matched catalog entry. A blank code
    /// becomes `passport`; an unknown code is kept but sized like `passport`.
    #[must_use]
    pub fn resolve(self, code: &str, width_px: u32, height_px: u32, dpi: u32) -> TaskSpec {
        let trimmed = code.trim();
        let resolved_code = if trimmed.is_empty() {
            DEFAULT_SPEC_CODE
        } else {
            trimmed
        };
        let entry = self.find(resolved_code);
        TaskSpec {
            code: resolved_code.to_owned(),
            width_px: non_zero_or(width_px, entry.width_px),
            height_px: non_zero_or(height_px, entry.height_px),
            dpi: non_zero_or(dpi, entry.dpi),
        }
    }
}

const fn non_zero_or(value: u32, fallback: u32) -> u32 {
    if value == 0 { fallback } else { value }
}

/// Validated background color name.
///
/// Names are lowercase and limited to `[a-z0-9_-]` so they can be used as
/// asset file stems.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColorName(String);

impl ColorName {
    /// Creates a validated color name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidColor`] when the value is blank or
    /// contains characters unusable in a file name.
    pub fn new(value: &str) -> Result<Self, TaskDomainError> {
        let normalized = value.trim().to_ascii_lowercase();
        let valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-');
        if !valid {
            return Err(TaskDomainError::InvalidColor(value.to_owned()));
        }
        Ok(Self(normalized))
    }

    /// Returns the color name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the six-digit hex value sent to the photo processor.
    ///
    /// Only `white`, `blue` and `red` have dedicated values; every other
    /// name renders white.
    #[must_use]
    pub fn hex(&self) -> &'static str {
        match self.0.as_str() {
            "blue" => "638cce",
            "red" => "ff0000",
            _ => "ffffff",
        }
    }
}

impl fmt::Display for ColorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ColorName {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ColorName> for String {
    fn from(color: ColorName) -> Self {
        color.0
    }
}
