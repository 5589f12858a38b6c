//! Request models for the placeholder engine
//!
//! Defines what callers ask for and how a request is resolved against the
//! per-type defaults before generation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::PlaceholderConfig;

/// Kind of content a placeholder stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    Character,
    Location,
    Event,
    Item,
    Avatar,
    Banner,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 6] = [
        ContentCategory::Character,
        ContentCategory::Location,
        ContentCategory::Event,
        ContentCategory::Item,
        ContentCategory::Avatar,
        ContentCategory::Banner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::Character => "character",
            ContentCategory::Location => "location",
            ContentCategory::Event => "event",
            ContentCategory::Item => "item",
            ContentCategory::Avatar => "avatar",
            ContentCategory::Banner => "banner",
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A collage treatment appended to the generation prompt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleModifier {
    MagazineCutout,
    TornPaper,
    Vintage,
    Halftone,
    Grunge,
    Pastel,
    Custom(String),
}

impl StyleModifier {
    /// Prompt phrase contributed by this modifier.
    pub fn text(&self) -> &str {
        match self {
            StyleModifier::MagazineCutout => "magazine cutout collage",
            StyleModifier::TornPaper => "torn paper edges",
            StyleModifier::Vintage => "vintage print",
            StyleModifier::Halftone => "halftone dots",
            StyleModifier::Grunge => "grunge texture",
            StyleModifier::Pastel => "pastel palette",
            StyleModifier::Custom(text) => text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Normal,
    Low,
}

/// Request body for placeholder generation (POST /placeholder)
///
/// # Fields
/// - `type`: The content category
/// - `width` / `height`: Optional size, per-type defaults apply when absent
/// - `prompt`: Optional subject description
/// - `custom_modifiers`: Extra style modifiers on top of the type defaults
/// - `priority`: Optional scheduling hint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceholderRequest {
    #[serde(rename = "type")]
    pub category: ContentCategory,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub custom_modifiers: Vec<StyleModifier>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

impl PlaceholderRequest {
    /// Creates a request for a category with every optional field unset.
    pub fn new(category: ContentCategory) -> Self {
        Self {
            category,
            width: None,
            height: None,
            prompt: None,
            custom_modifiers: Vec::new(),
            priority: None,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_modifiers(mut self, modifiers: Vec<StyleModifier>) -> Self {
        self.custom_modifiers = modifiers;
        self
    }
}

// == Resolved Config ==
/// A request merged with its type defaults. Width and height are always > 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    #[serde(rename = "type")]
    pub category: ContentCategory,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub prompt: String,
    pub enhanced_prompt: String,
    pub modifiers: Vec<StyleModifier>,
    pub priority: Priority,
}

impl ResolvedConfig {
    /// Merges request fields with the configured defaults for its type.
    ///
    /// Missing or zero dimensions fall back to the type defaults. Modifiers are
    /// the type defaults followed by the custom ones, first occurrence wins.
    pub fn resolve(request: &PlaceholderRequest, config: &PlaceholderConfig) -> Self {
        let defaults = config.defaults_for(request.category);

        let width = request.width.filter(|w| *w > 0).unwrap_or(defaults.width).max(1);
        let height = request
            .height
            .filter(|h| *h > 0)
            .unwrap_or(defaults.height)
            .max(1);

        let prompt = request
            .prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| defaults.prompt.clone());

        let mut modifiers: Vec<StyleModifier> = Vec::new();
        for modifier in defaults.modifiers.iter().chain(request.custom_modifiers.iter()) {
            if !modifiers.contains(modifier) {
                modifiers.push(modifier.clone());
            }
        }

        let enhanced_prompt = if modifiers.is_empty() {
            prompt.clone()
        } else {
            let joined = modifiers
                .iter()
                .map(StyleModifier::text)
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}, {}", prompt, joined)
        };

        Self {
            category: request.category,
            width,
            height,
            quality: defaults.quality,
            prompt,
            enhanced_prompt,
            modifiers,
            priority: request.priority.unwrap_or_default(),
        }
    }
}

/// Request body for PUT /cache/max-size
#[derive(Debug, Clone, Deserialize)]
pub struct MaxSizeRequest {
    pub max_size: usize,
}

impl MaxSizeRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.max_size == 0 {
            return Some("max_size must be greater than zero".to_string());
        }
        None
    }
}
