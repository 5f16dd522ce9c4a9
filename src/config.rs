//! Layered configuration.
//!
//! Layers, lowest precedence first: programmed defaults, user config
//! (`$XDG_CONFIG_HOME/embedmap/embedmap.toml`), project config
//! (`<root>/embedmap.toml`), then an override value such as initialization
//! options. A layer that fails to load is skipped with a warning event.

pub mod settings;
pub mod user;

use std::fs;
use std::path::Path;

use serde_json::Value;

pub use settings::{
    EmbedSettings, FeatureSettings, FeaturesConfig, RegistryConfig, RegistrySettings, Settings,
};
pub use user::{UserConfigError, UserConfigResult, load_user_config, user_config_path};

/// File name of the project configuration, relative to the project root
pub const PROJECT_CONFIG_FILE: &str = "embedmap.toml";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsEventKind {
    Info,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsEvent {
    pub kind: SettingsEventKind,
    pub message: String,
}

impl SettingsEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: SettingsEventKind::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: SettingsEventKind::Warning,
            message: message.into(),
        }
    }

    /// Forward this event to the `log` facade
    pub fn log(&self) {
        match self.kind {
            SettingsEventKind::Info => {
                log::info!(target: "embedmap::config", "{}", self.message)
            }
            SettingsEventKind::Warning => {
                log::warn!(target: "embedmap::config", "{}", self.message)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsSource {
    InitializationOptions,
    CommandLine,
}

impl SettingsSource {
    fn description(self) -> &'static str {
        match self {
            SettingsSource::InitializationOptions => "initialization options",
            SettingsSource::CommandLine => "command line settings",
        }
    }
}

#[derive(Default, Debug)]
pub struct SettingsLoadOutcome {
    pub settings: EmbedSettings,
    pub events: Vec<SettingsEvent>,
}

/// The programmed defaults, expressed as a layer
pub fn default_settings() -> Settings {
    let defaults = EmbedSettings::default();
    Settings {
        registry: RegistryConfig {
            cache_capacity: Some(defaults.registry.cache_capacity),
        },
        features: FeaturesConfig {
            follow_teleports: Some(defaults.features.follow_teleports),
            merge_hovers: Some(defaults.features.merge_hovers),
        },
    }
}

pub fn load_settings(
    root_path: Option<&Path>,
    override_settings: Option<(SettingsSource, Value)>,
) -> SettingsLoadOutcome {
    let mut events = Vec::new();

    let defaults = Some(default_settings());
    let user_config = load_user_config_with_events(&mut events);
    let project_settings = load_project_settings(root_path, &mut events);
    let override_settings = override_settings
        .and_then(|(source, value)| parse_override_settings(source, value, &mut events));

    let merged = merge_all(&[defaults, user_config, project_settings, override_settings])
        .unwrap_or_default();

    if merged.registry.cache_capacity == Some(0) {
        events.push(SettingsEvent::warning(format!(
            "registry.cacheCapacity must be at least {}; using {}",
            settings::MIN_CACHE_CAPACITY,
            settings::MIN_CACHE_CAPACITY
        )));
    }

    SettingsLoadOutcome {
        settings: EmbedSettings::from(&merged),
        events,
    }
}

/// Merge multiple layers in order; later layers take precedence.
pub fn merge_all(configs: &[Option<Settings>]) -> Option<Settings> {
    configs.iter().cloned().reduce(merge_settings).flatten()
}

/// Merge two layers, preferring values from `primary` over `fallback`
pub fn merge_settings(fallback: Option<Settings>, primary: Option<Settings>) -> Option<Settings> {
    match (fallback, primary) {
        (None, None) => None,
        (Some(settings), None) | (None, Some(settings)) => Some(settings),
        (Some(fallback), Some(primary)) => Some(Settings {
            registry: RegistryConfig {
                cache_capacity: primary
                    .registry
                    .cache_capacity
                    .or(fallback.registry.cache_capacity),
            },
            features: FeaturesConfig {
                follow_teleports: primary
                    .features
                    .follow_teleports
                    .or(fallback.features.follow_teleports),
                merge_hovers: primary
                    .features
                    .merge_hovers
                    .or(fallback.features.merge_hovers),
            },
        }),
    }
}

fn load_user_config_with_events(events: &mut Vec<SettingsEvent>) -> Option<Settings> {
    match load_user_config() {
        Ok(Some(settings)) => {
            events.push(SettingsEvent::info("Loaded user config"));
            Some(settings)
        }
        Ok(None) => None,
        Err(err) => {
            events.push(SettingsEvent::warning(format!(
                "Failed to load user config: {}",
                err
            )));
            None
        }
    }
}

fn load_project_settings(
    root_path: Option<&Path>,
    events: &mut Vec<SettingsEvent>,
) -> Option<Settings> {
    let config_path = root_path?.join(PROJECT_CONFIG_FILE);
    if !config_path.exists() {
        return None;
    }

    events.push(SettingsEvent::info(format!(
        "Found config file: {}",
        config_path.display()
    )));

    match fs::read_to_string(&config_path) {
        Ok(contents) => match toml::from_str::<Settings>(&contents) {
            Ok(settings) => {
                events.push(SettingsEvent::info(format!(
                    "Successfully loaded {}",
                    PROJECT_CONFIG_FILE
                )));
                Some(settings)
            }
            Err(err) => {
                events.push(SettingsEvent::warning(format!(
                    "Failed to parse {}: {}",
                    PROJECT_CONFIG_FILE, err
                )));
                None
            }
        },
        Err(err) => {
            events.push(SettingsEvent::warning(format!(
                "Failed to read {}: {}",
                PROJECT_CONFIG_FILE, err
            )));
            None
        }
    }
}

fn parse_override_settings(
    source: SettingsSource,
    value: Value,
    events: &mut Vec<SettingsEvent>,
) -> Option<Settings> {
    match serde_json::from_value::<Settings>(value) {
        Ok(settings) => {
            events.push(SettingsEvent::info(format!(
                "Parsed {}",
                source.description()
            )));
            Some(settings)
        }
        Err(err) => {
            events.push(SettingsEvent::warning(format!(
                "Failed to parse {}: {}",
                source.description(),
                err
            )));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;

    struct XdgGuard(Option<std::ffi::OsString>);

    impl XdgGuard {
        fn set(path: &Path) -> Self {
            let original = env::var_os("XDG_CONFIG_HOME");
            // SAFETY: #[serial(xdg_env)] prevents concurrent modification of XDG_CONFIG_HOME
            unsafe {
                env::set_var("XDG_CONFIG_HOME", path);
            }
            Self(original)
        }
    }

    impl Drop for XdgGuard {
        fn drop(&mut self) {
            // SAFETY: #[serial(xdg_env)] prevents concurrent modification of XDG_CONFIG_HOME
            unsafe {
                match self.0.take() {
                    Some(val) => env::set_var("XDG_CONFIG_HOME", val),
                    None => env::remove_var("XDG_CONFIG_HOME"),
                }
            }
        }
    }

    fn write_user_config(dir: &TempDir, contents: &str) {
        let config_dir = dir.path().join("embedmap");
        fs::create_dir_all(&config_dir).expect("failed to create config dir");
        fs::write(config_dir.join("embedmap.toml"), contents).expect("failed to write user config");
    }

    #[test]
    fn test_merge_settings_prefers_primary() {
        let fallback = Settings {
            registry: RegistryConfig {
                cache_capacity: Some(8),
            },
            features: FeaturesConfig {
                follow_teleports: Some(false),
                merge_hovers: Some(false),
            },
        };
        let primary = Settings {
            features: FeaturesConfig {
                merge_hovers: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = merge_settings(Some(fallback), Some(primary)).unwrap();
        assert_eq!(merged.registry.cache_capacity, Some(8));
        assert_eq!(merged.features.follow_teleports, Some(false));
        assert_eq!(merged.features.merge_hovers, Some(true));
    }

    #[test]
    #[serial(xdg_env)]
    fn test_load_settings_merges_user_project_and_override() {
        let user_dir = TempDir::new().expect("failed to create user config temp dir");
        let project_dir = TempDir::new().expect("failed to create project temp dir");
        write_user_config(
            &user_dir,
            r#"
            [registry]
            cacheCapacity = 4

            [features]
            followTeleports = false
            mergeHovers = false
        "#,
        );
        fs::write(
            project_dir.path().join("embedmap.toml"),
            r#"
            [features]
            followTeleports = true
        "#,
        )
        .expect("failed to write project config");

        let _guard = XdgGuard::set(user_dir.path());
        let outcome = load_settings(
            Some(project_dir.path()),
            Some((
                SettingsSource::InitializationOptions,
                serde_json::json!({ "features": { "mergeHovers": true } }),
            )),
        );

        assert_eq!(outcome.settings.registry.cache_capacity, 4);
        assert!(outcome.settings.features.follow_teleports);
        assert!(outcome.settings.features.merge_hovers);
        assert!(
            outcome
                .events
                .iter()
                .any(|e| e.kind == SettingsEventKind::Info && e.message.contains("user config"))
        );
    }

    #[test]
    #[serial(xdg_env)]
    fn test_broken_project_config_is_skipped_with_warning() {
        let user_dir = TempDir::new().expect("failed to create user config temp dir");
        let project_dir = TempDir::new().expect("failed to create project temp dir");
        fs::write(project_dir.path().join("embedmap.toml"), "features = [")
            .expect("failed to write project config");

        let _guard = XdgGuard::set(user_dir.path());
        let outcome = load_settings(Some(project_dir.path()), None);

        assert_eq!(outcome.settings, EmbedSettings::default());
        assert!(
            outcome
                .events
                .iter()
                .any(|e| e.kind == SettingsEventKind::Warning
                    && e.message.contains("embedmap.toml"))
        );
    }

    #[test]
    #[serial(xdg_env)]
    fn test_zero_capacity_warns_and_clamps() {
        let user_dir = TempDir::new().expect("failed to create user config temp dir");
        let _guard = XdgGuard::set(user_dir.path());

        let outcome = load_settings(
            None,
            Some((
                SettingsSource::CommandLine,
                serde_json::json!({ "registry": { "cacheCapacity": 0 } }),
            )),
        );

        assert_eq!(outcome.settings.registry.cache_capacity, 1);
        assert!(
            outcome
                .events
                .iter()
                .any(|e| e.kind == SettingsEventKind::Warning)
        );
    }
}
