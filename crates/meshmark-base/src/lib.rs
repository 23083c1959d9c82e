use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of a mesh inside the loaded scene. Uniqueness is assumed, not enforced.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeshId(String);

impl MeshId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MeshId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for MeshId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl std::fmt::Display for MeshId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display color stored as normalized lowercase `#rrggbb`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    pub const WHITE_HEX: &'static str = "#ffffff";

    pub fn white() -> Self {
        Self(Self::WHITE_HEX.to_string())
    }

    pub fn parse(text: &str) -> Result<Self> {
        let digits = text
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| Error::InvalidColor(text.to_string()))?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidColor(text.to_string()));
        }
        let expanded = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => digits.to_string(),
            _ => return Err(Error::InvalidColor(text.to_string())),
        };
        Ok(Self(format!("#{}", expanded.to_ascii_lowercase())))
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(format!("#{r:02x}{g:02x}{b:02x}"))
    }

    pub fn rgb(&self) -> [u8; 3] {
        let channel = |start: usize| u8::from_str_radix(&self.0[start..start + 2], 16).unwrap_or(0);
        [channel(1), channel(3), channel(5)]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self::white()
    }
}

impl std::str::FromStr for HexColor {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        Self::parse(text)
    }
}

impl TryFrom<String> for HexColor {
    type Error = Error;

    fn try_from(text: String) -> Result<Self> {
        Self::parse(&text)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}

impl std::fmt::Display for HexColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid color: {0:?} (expected #rgb or #rrggbb)")]
    InvalidColor(String),
    #[error("unsupported scene format: {0}")]
    UnsupportedFormat(String),
    #[error("scene contains no triangle meshes")]
    EmptyScene,
}

pub type Result<T> = std::result::Result<T, Error>;
