use std::path::PathBuf;

use iced::Theme;

use serde::{ser::SerializeStruct, Deserialize, Serialize};

const SETTINGS_FILE: &str = "settings.json";

/// Connection settings for the local model server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub url: String,
    pub model: String,
    pub auto_start: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            auto_start: true,
        }
    }
}

/// Settings for locally executed actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ActionConfig {
    /// Where screenshots land. Empty means `~/Desktop`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_dir: Option<String>,
}

impl ActionConfig {
    pub fn screenshot_dir(&self) -> PathBuf {
        match &self.screenshot_dir {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => home::home_dir()
                .map(|path| path.join("Desktop"))
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub server: ServerConfig,
    pub actions: ActionConfig,
    pub settings_file: String,
}

impl Config {
    fn load_settings(path: Option<String>) -> Self {
        let settings_file_path = path.unwrap_or_else(Self::settings_file_path);
        if !std::path::Path::new(&settings_file_path).exists() {
            let default_settings = Self {
                theme: Theme::Light,
                server: ServerConfig::default(),
                actions: ActionConfig::default(),
                settings_file: settings_file_path.clone(),
            };
            let settings_json = serde_json::to_string(&default_settings).unwrap();
            std::fs::write(&settings_file_path, settings_json)
                .expect("Failed to write default settings");
            return default_settings;
        }

        std::fs::read_to_string(&settings_file_path)
            .ok()
            .and_then(|settings_json| serde_json::from_str::<Self>(&settings_json).ok())
            .map(|mut settings| {
                settings.settings_file = settings_file_path.clone();
                settings
            })
            .unwrap_or_else(|| Self {
                theme: Theme::Light,
                server: ServerConfig::default(),
                actions: ActionConfig::default(),
                settings_file: settings_file_path,
            })
    }

    pub fn update_settings(&self) {
        let settings_json = serde_json::to_string(self).expect("Failed to serialize settings");
        std::fs::write(&self.settings_file, settings_json).expect("Failed to write settings file");
    }

    fn settings_file_path() -> String {
        let settings_dir = home::home_dir()
            .map(|path| path.join(".deskmate"))
            .unwrap_or_else(|| ".deskmate".into());

        if !settings_dir.exists() {
            std::fs::create_dir_all(&settings_dir).expect("Failed to create settings directory");
        }

        settings_dir
            .join(SETTINGS_FILE)
            .to_string_lossy()
            .into_owned()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::load_settings(None)
    }
}

impl Serialize for Config {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let theme_name = match self.theme {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            _ => "Default",
        };
        let mut state = serializer.serialize_struct("Config", 3)?;
        state.serialize_field("theme", theme_name)?;
        state.serialize_field("server", &self.server)?;
        state.serialize_field("actions", &self.actions)?;
        state.end()
    }
}

/// On-disk shape; sections left out of older files fall back to defaults.
#[derive(Deserialize)]
struct ConfigFile {
    theme: Option<String>,
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    actions: ActionConfig,
}

impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let file = ConfigFile::deserialize(deserializer)?;
        let theme = match file.theme.as_deref() {
            Some("Light") => Theme::Light,
            Some("Dark") => Theme::Dark,
            _ => Theme::Light,
        };
        Ok(Config {
            theme,
            server: file.server,
            actions: file.actions,
            settings_file: Config::settings_file_path(),
        })
    }
}
