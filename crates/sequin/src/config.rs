//! Configuration types for Sequin diagram rendering.
//!
//! This module provides configuration structures that control how diagrams
//! are laid out and styled. All types implement [`serde::Deserialize`] so
//! they can be loaded from a TOML file.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration combining layout and style settings.
//! - [`LayoutConfig`] - Spacing overrides and the text measurement backend.
//! - [`StyleConfig`] - Visual styling options such as background color and font.
//!
//! # Example
//!
//! ```
//! # use sequin::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert!(config.style().background_color().is_ok());
//! assert_eq!(config.layout().agent_margin(), None);
//! ```

use serde::Deserialize;

use sequin_core::{color::Color, draw::TextMetrics};

/// Top-level application configuration combining layout and style settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified layout and style configurations.
    pub fn new(layout: LayoutConfig, style: StyleConfig) -> Self {
        Self { layout, style }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Spacing overrides and text measurement settings.
///
/// Unset margins keep the theme's values.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LayoutConfig {
    /// Minimum gap between two agents that are visible at the same time.
    #[serde(default)]
    agent_margin: Option<f32>,

    /// Vertical gap after every stage.
    #[serde(default)]
    action_margin: Option<f32>,

    /// Space around the whole diagram.
    #[serde(default)]
    outer_margin: Option<f32>,

    /// How label widths are measured.
    #[serde(default)]
    text_metrics: TextMetrics,
}

impl LayoutConfig {
    /// Creates a [`LayoutConfig`] with theme margins and the given [`TextMetrics`].
    pub fn new(text_metrics: TextMetrics) -> Self {
        Self {
            text_metrics,
            ..Self::default()
        }
    }

    pub fn with_agent_margin(mut self, margin: f32) -> Self {
        self.agent_margin = Some(margin);
        self
    }

    pub fn with_action_margin(mut self, margin: f32) -> Self {
        self.action_margin = Some(margin);
        self
    }

    pub fn with_outer_margin(mut self, margin: f32) -> Self {
        self.outer_margin = Some(margin);
        self
    }

    pub fn agent_margin(&self) -> Option<f32> {
        self.agent_margin
    }

    pub fn action_margin(&self) -> Option<f32> {
        self.action_margin
    }

    pub fn outer_margin(&self) -> Option<f32> {
        self.outer_margin
    }

    pub fn text_metrics(&self) -> TextMetrics {
        self.text_metrics
    }
}

/// Visual styling configuration for rendered diagrams.
///
/// Fields that are not set fall back to the theme.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    /// Background [`Color`] for diagrams, as a color string.
    #[serde(default)]
    background_color: Option<String>,

    /// Font family applied to every text style.
    #[serde(default)]
    font_family: Option<String>,
}

impl StyleConfig {
    pub fn new(background_color: Option<String>, font_family: Option<String>) -> Self {
        Self {
            background_color,
            font_family,
        }
    }

    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    pub fn font_family(&self) -> Option<&str> {
        self.font_family.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let config: AppConfig = toml::from_str(
            r##"
            [layout]
            agent_margin = 20.0
            outer_margin = 8
            text_metrics = "estimate"

            [style]
            background_color = "#fafafa"
            font_family = "monospace"
            "##,
        )
        .unwrap();

        assert_eq!(config.layout().agent_margin(), Some(20.0));
        assert_eq!(config.layout().action_margin(), None);
        assert_eq!(config.layout().outer_margin(), Some(8.0));
        assert_eq!(config.layout().text_metrics(), TextMetrics::Estimate);
        assert!(config.style().background_color().unwrap().is_some());
        assert_eq!(config.style().font_family(), Some("monospace"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.layout().text_metrics(), TextMetrics::Font);
        assert_eq!(config.style().background_color(), Ok(None));
        assert_eq!(config.style().font_family(), None);
    }

    #[test]
    fn test_invalid_background_color() {
        let style = StyleConfig::new(Some("not-a-color".to_string()), None);
        let err = style.background_color().unwrap_err();
        assert!(err.starts_with("Invalid background color in config"));
    }
}
