use serde::{Deserialize, Serialize};
use std::fmt;

/// Aspect ratios accepted by both image backends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "4:3")]
    Landscape,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "16:9")]
    Wide,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Landscape => "4:3",
            AspectRatio::Tall => "9:16",
            AspectRatio::Wide => "16:9",
        }
    }

    pub fn all() -> [AspectRatio; 5] {
        [
            AspectRatio::Square,
            AspectRatio::Portrait,
            AspectRatio::Landscape,
            AspectRatio::Tall,
            AspectRatio::Wide,
        ]
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|ratio| ratio.as_str() == value.trim())
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageProvider {
    Imagen,
    Stability,
}

impl ImageProvider {
    pub fn name(&self) -> &'static str {
        match self {
            ImageProvider::Imagen => "Imagen (Google)",
            ImageProvider::Stability => "Stability AI",
        }
    }
}

/// Trims and drops blank optional text, e.g. negative prompts and niches.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
