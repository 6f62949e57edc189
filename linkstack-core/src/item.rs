use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type ItemId = String;

/// Folder assigned when the user leaves the field blank.
pub const DEFAULT_FOLDER: &str = "General";

/// A saved link or file. Serialized field names match the persisted
/// layout (`createdAt`, `fileName`, ...), with `type` as the discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(flatten)]
    pub kind: ItemKind,
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_folder")]
    pub folder: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub fav: bool,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub later: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub note: String,
    #[serde(rename = "createdAt", with = "iso_millis")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemKind {
    Link {
        url: String,
        #[serde(default)]
        preview: String,
    },
    File {
        #[serde(rename = "fileName")]
        file_name: String,
        #[serde(rename = "fileType", default)]
        file_type: String,
        #[serde(rename = "fileData")]
        file_data: String,
        #[serde(rename = "fileSize", default)]
        file_size: u64,
    },
}

impl Item {
    pub fn is_link(&self) -> bool {
        matches!(self.kind, ItemKind::Link { .. })
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, ItemKind::File { .. })
    }

    /// The link URL, or an empty string for files.
    pub fn url(&self) -> &str {
        match &self.kind {
            ItemKind::Link { url, .. } => url,
            ItemKind::File { .. } => "",
        }
    }

    pub fn folder_or_default(&self) -> &str {
        if self.folder.is_empty() {
            DEFAULT_FOLDER
        } else {
            &self.folder
        }
    }

    pub fn flag(&self, field: ToggleField) -> bool {
        match field {
            ToggleField::Fav => self.fav,
            ToggleField::Pinned => self.pinned,
            ToggleField::Later => self.later,
        }
    }

    pub fn set_flag(&mut self, field: ToggleField, value: bool) {
        match field {
            ToggleField::Fav => self.fav = value,
            ToggleField::Pinned => self.pinned = value,
            ToggleField::Later => self.later = value,
        }
    }
}

impl ItemKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ItemKind::Link { .. } => "link",
            ItemKind::File { .. } => "file",
        }
    }
}

/// The user-toggleable boolean flags on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleField {
    Fav,
    Pinned,
    Later,
}

impl ToggleField {
    pub const ALL: [ToggleField; 3] = [ToggleField::Fav, ToggleField::Pinned, ToggleField::Later];

    pub fn as_str(self) -> &'static str {
        match self {
            ToggleField::Fav => "fav",
            ToggleField::Pinned => "pinned",
            ToggleField::Later => "later",
        }
    }
}

impl fmt::Display for ToggleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToggleField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fav" | "favorite" | "favourite" => Ok(ToggleField::Fav),
            "pinned" | "pin" => Ok(ToggleField::Pinned),
            "later" => Ok(ToggleField::Later),
            other => Err(format!("unknown field '{other}' (expected fav, pinned or later)")),
        }
    }
}

/// Split a comma-separated tag input, trimming entries and dropping blanks.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn default_folder() -> String {
    DEFAULT_FOLDER.to_string()
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
