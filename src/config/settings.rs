use serde::{Deserialize, Serialize};

/// Smallest accepted registry cache capacity
pub const MIN_CACHE_CAPACITY: usize = 1;

/// Raw settings of one configuration layer
///
/// Every field is optional so that layers can be merged; see
/// [`crate::config::merge_settings`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    /// Number of source snapshots whose embedded documents stay cached
    pub cache_capacity: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturesConfig {
    /// Also query positions reachable through teleports
    pub follow_teleports: Option<bool>,
    /// Combine hovers from several embedded documents instead of keeping the first
    pub merge_hovers: Option<bool>,
}

/// Fully resolved settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmbedSettings {
    pub registry: RegistrySettings,
    pub features: FeatureSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrySettings {
    pub cache_capacity: usize,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            cache_capacity: crate::embedding::registry::DEFAULT_CACHE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSettings {
    pub follow_teleports: bool,
    pub merge_hovers: bool,
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self {
            follow_teleports: true,
            merge_hovers: true,
        }
    }
}

impl From<&Settings> for EmbedSettings {
    fn from(settings: &Settings) -> Self {
        let defaults = EmbedSettings::default();
        EmbedSettings {
            registry: RegistrySettings {
                cache_capacity: settings
                    .registry
                    .cache_capacity
                    .unwrap_or(defaults.registry.cache_capacity)
                    .max(MIN_CACHE_CAPACITY),
            },
            features: FeatureSettings {
                follow_teleports: settings
                    .features
                    .follow_teleports
                    .unwrap_or(defaults.features.follow_teleports),
                merge_hovers: settings
                    .features
                    .merge_hovers
                    .unwrap_or(defaults.features.merge_hovers),
            },
        }
    }
}

impl From<Settings> for EmbedSettings {
    fn from(settings: Settings) -> Self {
        EmbedSettings::from(&settings)
    }
}
