//! Configuration Module
//!
//! Two layers:
//! - [`Config`]: process settings loaded from environment variables.
//! - [`PlaceholderConfig`]: the read-only tables the engine works from
//!   (provider descriptors, per-type defaults, randomization bounds, SVG
//!   palette and performance knobs). Built-in defaults, optionally replaced by
//!   a JSON file.

use std::collections::BTreeMap;
use std::env;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::models::{ContentCategory, StyleModifier};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Expired-entry sweep interval in seconds
    pub cleanup_interval: u64,
    /// Duplicate-url optimization interval in seconds
    pub optimize_interval: u64,
    /// Optional JSON file replacing the built-in placeholder tables
    pub placeholder_config_path: Option<String>,
    /// Overrides `performance.timeout_ms`
    pub probe_timeout_ms: Option<u64>,
    /// Overrides `performance.cache_duration_ms`
    pub cache_duration_ms: Option<u64>,
    /// Overrides `performance.max_cache_entries`
    pub max_cache_entries: Option<usize>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 300)
    /// - `OPTIMIZE_INTERVAL` - Dedup frequency in seconds (default: 1800)
    /// - `PLACEHOLDER_CONFIG` - Path to a JSON placeholder config (optional)
    /// - `PROBE_TIMEOUT_MS`, `CACHE_DURATION_MS`, `MAX_CACHE_ENTRIES` - knob overrides
    pub fn from_env() -> Self {
        Self {
            server_port: parse_env("SERVER_PORT").unwrap_or(3000),
            cleanup_interval: parse_env("CLEANUP_INTERVAL").unwrap_or(300),
            optimize_interval: parse_env("OPTIMIZE_INTERVAL").unwrap_or(1800),
            placeholder_config_path: env::var("PLACEHOLDER_CONFIG")
                .ok()
                .filter(|v| !v.is_empty()),
            probe_timeout_ms: parse_env("PROBE_TIMEOUT_MS"),
            cache_duration_ms: parse_env("CACHE_DURATION_MS"),
            max_cache_entries: parse_env("MAX_CACHE_ENTRIES"),
        }
    }

    /// Loads the placeholder tables and applies the knob overrides from the environment.
    pub fn load_placeholder_config(&self) -> anyhow::Result<PlaceholderConfig> {
        let mut placeholder_config = match &self.placeholder_config_path {
            Some(path) => PlaceholderConfig::from_json_file(path)?,
            None => PlaceholderConfig::default(),
        };

        let performance = &mut placeholder_config.performance;
        if let Some(timeout_ms) = self.probe_timeout_ms {
            performance.timeout_ms = timeout_ms;
        }
        if let Some(cache_duration_ms) = self.cache_duration_ms {
            performance.cache_duration_ms = cache_duration_ms;
        }
        if let Some(max_cache_entries) = self.max_cache_entries {
            performance.max_cache_entries = max_cache_entries.max(1);
        }

        Ok(placeholder_config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 300,
            optimize_interval: 1800,
            placeholder_config_path: None,
            probe_timeout_ms: None,
            cache_duration_ms: None,
            max_cache_entries: None,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

// == Placeholder Tables ==

/// One external placeholder-generation provider.
///
/// `endpoint_template` may contain `{width}`, `{height}`, `{quality}` and
/// `{prompt}`; `style_params` are appended as query parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub name: String,
    pub endpoint_template: String,
    #[serde(default)]
    pub style_params: BTreeMap<String, String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

/// Defaults applied to requests of one content category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefaults {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub prompt: String,
    #[serde(default)]
    pub modifiers: Vec<StyleModifier>,
}

impl TypeDefaults {
    fn new(width: u32, height: u32, prompt: &str, modifiers: Vec<StyleModifier>) -> Self {
        Self {
            width,
            height,
            quality: 80,
            prompt: prompt.to_string(),
            modifiers,
        }
    }
}

/// Inclusive sampling interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomizationConfig {
    /// Rotation in degrees
    pub rotation: Bounds,
    /// Horizontal offset in pixels
    pub translate_x: Bounds,
    /// Vertical offset in pixels
    pub translate_y: Bounds,
    /// Probability of a tape strip
    pub tape_chance: f64,
    /// Probability of a staple (kept lower than tape)
    pub staple_chance: f64,
}

impl Default for RandomizationConfig {
    fn default() -> Self {
        Self {
            rotation: Bounds::new(-5.0, 5.0),
            translate_x: Bounds::new(-3.0, 3.0),
            translate_y: Bounds::new(-3.0, 3.0),
            tape_chance: 0.3,
            staple_chance: 0.1,
        }
    }
}

/// Palette and label table for procedural synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgConfig {
    pub paper_colors: Vec<String>,
    pub decoration_colors: Vec<String>,
    pub tape_color: String,
    pub text_color: String,
    pub messages: BTreeMap<ContentCategory, String>,
    pub default_message: String,
}

impl SvgConfig {
    /// Label for a category, falling back to the generic message.
    pub fn message_for(&self, category: ContentCategory) -> &str {
        self.messages
            .get(&category)
            .map(String::as_str)
            .unwrap_or(&self.default_message)
    }
}

impl Default for SvgConfig {
    fn default() -> Self {
        let messages = [
            (ContentCategory::Character, "Character coming soon"),
            (ContentCategory::Location, "Location being scouted"),
            (ContentCategory::Event, "Event in the works"),
            (ContentCategory::Item, "Item on its way"),
            (ContentCategory::Avatar, "Portrait pending"),
        ]
        .into_iter()
        .map(|(category, text)| (category, text.to_string()))
        .collect();

        Self {
            paper_colors: ["#f5f0e6", "#efe6d2", "#f8f4ea", "#e9e2cf", "#fdf6e3"]
                .into_iter()
                .map(String::from)
                .collect(),
            decoration_colors: ["#d9534f", "#2a6f97", "#e0a526", "#3c8d5a", "#7a4fa3"]
                .into_iter()
                .map(String::from)
                .collect(),
            tape_color: "#fff8c4".to_string(),
            text_color: "#3b3024".to_string(),
            messages,
            default_message: "Coming soon".to_string(),
        }
    }
}

/// Timing, retry and sizing knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Per-provider probe timeout
    pub timeout_ms: u64,
    /// Extra probe attempts on transport errors, within the same timeout
    pub retries: u32,
    /// Cache entry time-to-live
    pub cache_duration_ms: u64,
    /// Maximum in-flight provider probes
    pub max_concurrent: usize,
    /// Cache capacity
    pub max_cache_entries: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            retries: 1,
            cache_duration_ms: 60 * 60 * 1000,
            max_concurrent: 4,
            max_cache_entries: 100,
        }
    }
}

/// Read-only tables the engine is driven by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    /// Providers in priority order
    pub services: Vec<ServiceDescriptor>,
    pub type_defaults: BTreeMap<ContentCategory, TypeDefaults>,
    pub randomization: RandomizationConfig,
    pub svg: SvgConfig,
    pub performance: PerformanceConfig,
}

impl PlaceholderConfig {
    /// Parses a JSON config file; absent sections keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read placeholder config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse placeholder config {}", path.display()))
    }

    /// Defaults for a category; unknown categories get a generic 400x300 card.
    pub fn defaults_for(&self, category: ContentCategory) -> TypeDefaults {
        self.type_defaults
            .get(&category)
            .cloned()
            .unwrap_or_else(|| TypeDefaults::new(400, 300, category.as_str(), Vec::new()))
    }

    pub fn enabled_services(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.services.iter().filter(|service| service.enabled)
    }
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        use StyleModifier::*;

        let services = vec![
            ServiceDescriptor {
                name: "pollinations".to_string(),
                endpoint_template: "https://image.pollinations.ai/prompt/{prompt}?width={width}&height={height}"
                    .to_string(),
                style_params: BTreeMap::from([
                    ("nologo".to_string(), "true".to_string()),
                    ("model".to_string(), "flux".to_string()),
                ]),
                enabled: true,
            },
            ServiceDescriptor {
                name: "picsum".to_string(),
                endpoint_template: "https://picsum.photos/{width}/{height}".to_string(),
                style_params: BTreeMap::from([("grayscale".to_string(), "".to_string())]),
                enabled: true,
            },
            ServiceDescriptor {
                name: "placehold".to_string(),
                endpoint_template: "https://placehold.co/{width}x{height}/png".to_string(),
                style_params: BTreeMap::from([("font".to_string(), "playfair-display".to_string())]),
                enabled: true,
            },
        ];

        let type_defaults = BTreeMap::from([
            (
                ContentCategory::Character,
                TypeDefaults::new(400, 300, "character portrait", vec![MagazineCutout, TornPaper]),
            ),
            (
                ContentCategory::Location,
                TypeDefaults::new(800, 600, "scenic location", vec![MagazineCutout, Vintage]),
            ),
            (
                ContentCategory::Event,
                TypeDefaults::new(600, 400, "dramatic event scene", vec![MagazineCutout, Halftone]),
            ),
            (
                ContentCategory::Item,
                TypeDefaults::new(300, 300, "object still life", vec![MagazineCutout]),
            ),
            (
                ContentCategory::Avatar,
                TypeDefaults::new(128, 128, "avatar headshot", vec![TornPaper, Pastel]),
            ),
            (
                ContentCategory::Banner,
                TypeDefaults::new(1200, 400, "wide collage banner", vec![MagazineCutout, Grunge]),
            ),
        ]);

        Self {
            services,
            type_defaults,
            randomization: RandomizationConfig::default(),
            svg: SvgConfig::default(),
            performance: PerformanceConfig::default(),
        }
    }
}
