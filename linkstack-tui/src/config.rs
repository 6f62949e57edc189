use linkstack_core::ViewMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub storage: Storage,
    pub tui: Option<Tui>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum Storage {
    Sqlite {
        db_path: Option<PathBuf>,
    },
    /// One JSON document in `dir`.
    Json {
        dir: Option<PathBuf>,
    },
}

impl Default for Storage {
    fn default() -> Self {
        Storage::Sqlite { db_path: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Tui {
    /// Initial feed layout: grid|list
    pub view_mode: Option<ViewMode>,
    /// Colour overrides; names (`cyan`), `#rrggbb` or `rgb(r,g,b)`
    pub theme: Option<ThemeColors>,
    /// Where `d` in the browser writes downloaded files; defaults to the
    /// current directory
    pub download_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ThemeColors {
    pub highlight_fg: Option<String>,
    pub highlight_bg: Option<String>,
    pub border_fg: Option<String>,
    pub help_fg: Option<String>,
    pub accent_fg: Option<String>,
}

impl Settings {
    pub fn view_mode(&self) -> ViewMode {
        self.tui
            .as_ref()
            .and_then(|t| t.view_mode)
            .unwrap_or_default()
    }

    pub fn theme_colors(&self) -> Option<&ThemeColors> {
        self.tui.as_ref().and_then(|t| t.theme.as_ref())
    }

    pub fn download_dir(&self) -> PathBuf {
        self.tui
            .as_ref()
            .and_then(|t| t.download_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

pub fn config_dir() -> PathBuf {
    if let Some(bd) = directories::BaseDirs::new() {
        bd.config_dir().join("linkstack")
    } else {
        PathBuf::from("./.config/linkstack")
    }
}

pub fn state_dir() -> PathBuf {
    // XDG state dir when the platform has one; config dir otherwise
    if let Some(bd) = directories::BaseDirs::new() {
        if let Some(sd) = bd.state_dir() {
            return sd.join("linkstack");
        }
    }
    config_dir()
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.toml")
}

pub fn default_db_path() -> PathBuf {
    config_dir().join("db").join("linkstack.db")
}

pub fn default_json_dir() -> PathBuf {
    config_dir().join("data")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    match std::fs::read_to_string(&path) {
        Ok(s) => toml::from_str(&s).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "invalid settings, using defaults");
            Settings::default()
        }),
        Err(_) => Settings::default(),
    }
}
