//! Visual constants for rendering.
//!
//! A [`Theme`] is read-only during a render. [`Theme::basic`] is the default
//! look and [`Theme::from_config`] applies the overrides of an
//! [`AppConfig`].

use sequin_core::{
    color::Color,
    draw::{
        ArrowheadDefinition, BoxedTextDefinition, NoteBoxDefinition, NoteShape, StrokeDefinition,
        TextAnchor, TextDefinition, TextMetrics,
    },
    geometry::Insets,
    semantic::{LineStyle, NoteMode},
};

use crate::config::AppConfig;

/// Agent begin/end markers.
#[derive(Debug, Clone)]
pub(crate) struct AgentCapTheme {
    /// Labelled box. Its text width also sizes bar caps.
    pub(crate) boxed: BoxedTextDefinition,
    pub(crate) cross_size: f32,
    pub(crate) cross_stroke: StrokeDefinition,
    pub(crate) bar_height: f32,
    pub(crate) bar_fill: Color,
    /// Vertical space taken by a cap that draws nothing.
    pub(crate) none_height: f32,
}

/// Connection lines, arrowheads and labels.
#[derive(Debug, Clone)]
pub(crate) struct ConnectTheme {
    pub(crate) loopback_radius: f32,
    pub(crate) solid: StrokeDefinition,
    pub(crate) dashed: StrokeDefinition,
    pub(crate) arrow: ArrowheadDefinition,
    /// Horizontal space on both sides of a label.
    pub(crate) label_padding: f32,
    /// Vertical space above and below a label.
    pub(crate) label_margin: Insets,
    /// Centred label on a masked box.
    pub(crate) label: BoxedTextDefinition,
    /// Left-aligned label beside a self-connection loop.
    pub(crate) loopback_label: BoxedTextDefinition,
}

impl ConnectTheme {
    pub(crate) fn stroke(&self, line: LineStyle) -> &StrokeDefinition {
        match line {
            LineStyle::Solid => &self.solid,
            LineStyle::Dash => &self.dashed,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct BlockTheme {
    pub(crate) margin: Insets,
    pub(crate) box_stroke: StrokeDefinition,
    pub(crate) box_radius: f32,
    pub(crate) section_padding: Insets,
    pub(crate) mode: BoxedTextDefinition,
    pub(crate) label: BoxedTextDefinition,
    pub(crate) separator: StrokeDefinition,
}

#[derive(Debug, Clone)]
pub(crate) struct NoteStyle {
    pub(crate) margin: Insets,
    pub(crate) padding: Insets,
    /// How far a multi-agent note extends past its outer agents, left and right.
    pub(crate) overlap: (f32, f32),
    pub(crate) label: TextDefinition,
    pub(crate) shape: NoteBoxDefinition,
}

/// Read-only visual configuration of the renderer.
///
/// ```
/// # use sequin::{theme::Theme, config::AppConfig};
/// let theme = Theme::from_config(&AppConfig::default()).unwrap();
/// assert_eq!(theme.agent_margin(), Theme::basic().agent_margin());
/// ```
#[derive(Debug, Clone)]
pub struct Theme {
    title_margin: f32,
    outer_margin: f32,
    agent_margin: f32,
    action_margin: f32,
    text_metrics: TextMetrics,
    background: Option<Color>,

    pub(crate) title: TextDefinition,
    pub(crate) agent_line: StrokeDefinition,
    pub(crate) agent_cap: AgentCapTheme,
    pub(crate) connect: ConnectTheme,
    pub(crate) block: BlockTheme,
    pub(crate) note: NoteStyle,
    pub(crate) state: NoteStyle,
}

impl Theme {
    /// The default theme: black lines on white boxes, sans-serif text.
    pub fn basic() -> Self {
        let black = Color::default();
        let white = Color::white();
        let thin = StrokeDefinition::solid(black, 1.0);

        let agent_cap = AgentCapTheme {
            boxed: BoxedTextDefinition::new(
                TextDefinition::new(12.0).with_anchor(TextAnchor::Middle),
                Insets::new(5.0, 10.0, 5.0, 10.0),
            )
            .with_fill(white)
            .with_stroke(thin.clone()),
            cross_size: 20.0,
            cross_stroke: thin.clone(),
            bar_height: 5.0,
            bar_fill: black,
            none_height: 10.0,
        };

        let mask_padding = Insets::new(0.0, 3.0, 1.0, 3.0);
        let connect = ConnectTheme {
            loopback_radius: 6.0,
            solid: thin.clone(),
            dashed: StrokeDefinition::dashed(black, 1.0),
            arrow: ArrowheadDefinition::new(4.0, 8.0, Some(black), StrokeDefinition::solid(black, 0.0)),
            label_padding: 6.0,
            label_margin: Insets::vertical(2.0, 1.0),
            label: BoxedTextDefinition::new(
                TextDefinition::new(8.0).with_anchor(TextAnchor::Middle),
                mask_padding,
            )
            .with_fill(white),
            loopback_label: BoxedTextDefinition::new(
                TextDefinition::new(8.0).with_anchor(TextAnchor::Start),
                mask_padding,
            )
            .with_fill(white),
        };

        let block = BlockTheme {
            margin: Insets::vertical(0.0, 0.0),
            box_stroke: StrokeDefinition::solid(black, 1.5),
            box_radius: 2.0,
            section_padding: Insets::vertical(3.0, 2.0),
            mode: BoxedTextDefinition::new(
                TextDefinition::new(9.0).with_bold(true),
                Insets::new(1.0, 3.0, 0.0, 3.0),
            )
            .with_fill(white)
            .with_stroke(thin.clone())
            .with_corner_radius(2.0),
            label: BoxedTextDefinition::new(TextDefinition::new(9.0), Insets::new(1.0, 3.0, 0.0, 5.0))
                .with_fill(white),
            separator: StrokeDefinition::dashed(black, 1.5),
        };

        let note = NoteStyle {
            margin: Insets::new(0.0, 5.0, 0.0, 5.0),
            padding: Insets::new(5.0, 10.0, 5.0, 5.0),
            overlap: (10.0, 10.0),
            label: TextDefinition::new(8.0),
            shape: NoteBoxDefinition::new(NoteShape::Folded, white, thin.clone()),
        };

        let state = NoteStyle {
            margin: Insets::new(0.0, 5.0, 0.0, 5.0),
            padding: Insets::uniform(7.0),
            overlap: (10.0, 10.0),
            label: TextDefinition::new(8.0).with_anchor(TextAnchor::Middle),
            shape: NoteBoxDefinition::new(NoteShape::Rounded(10.0), white, thin.clone()),
        };

        Self {
            title_margin: 10.0,
            outer_margin: 5.0,
            agent_margin: 10.0,
            action_margin: 5.0,
            text_metrics: TextMetrics::default(),
            background: None,
            title: TextDefinition::new(20.0).with_anchor(TextAnchor::Middle),
            agent_line: thin,
            agent_cap,
            connect,
            block,
            note,
            state,
        }
    }

    /// Builds the basic theme with the overrides from `config` applied.
    ///
    /// # Errors
    ///
    /// Returns an error message if the configured background color is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, String> {
        let mut theme = Self::basic();
        let layout = config.layout();

        if let Some(margin) = layout.agent_margin() {
            theme.agent_margin = margin;
        }
        if let Some(margin) = layout.action_margin() {
            theme.action_margin = margin;
        }
        if let Some(margin) = layout.outer_margin() {
            theme.outer_margin = margin;
        }
        theme.text_metrics = layout.text_metrics();
        theme.background = config.style().background_color()?;

        if let Some(family) = config.style().font_family() {
            theme.set_font_family(family);
        }
        Ok(theme)
    }

    fn set_font_family(&mut self, family: &str) {
        for text in [
            &mut self.title,
            self.agent_cap.boxed.text_mut(),
            self.connect.label.text_mut(),
            self.connect.loopback_label.text_mut(),
            self.block.mode.text_mut(),
            self.block.label.text_mut(),
            &mut self.note.label,
            &mut self.state.label,
        ] {
            text.set_font_family(family);
        }
    }

    pub fn title_margin(&self) -> f32 {
        self.title_margin
    }

    pub fn outer_margin(&self) -> f32 {
        self.outer_margin
    }

    pub fn agent_margin(&self) -> f32 {
        self.agent_margin
    }

    pub fn action_margin(&self) -> f32 {
        self.action_margin
    }

    pub fn text_metrics(&self) -> TextMetrics {
        self.text_metrics
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub(crate) fn note_style(&self, mode: NoteMode) -> &NoteStyle {
        match mode {
            NoteMode::Note => &self.note,
            NoteMode::State => &self.state,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::basic()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{LayoutConfig, StyleConfig};

    use super::*;

    #[test]
    fn test_config_overrides() {
        let config = AppConfig::new(
            LayoutConfig::new(TextMetrics::Estimate)
                .with_agent_margin(25.0)
                .with_outer_margin(0.0),
            StyleConfig::new(Some("#eeeeee".to_string()), Some("serif".to_string())),
        );
        let theme = Theme::from_config(&config).unwrap();

        assert_eq!(theme.agent_margin(), 25.0);
        assert_eq!(theme.outer_margin(), 0.0);
        assert_eq!(theme.action_margin(), Theme::basic().action_margin());
        assert_eq!(theme.text_metrics(), TextMetrics::Estimate);
        assert!(theme.background().is_some());
        assert_eq!(theme.title.font_family(), "serif");
        assert_eq!(theme.block.mode.text().font_family(), "serif");
        assert_eq!(theme.state.label.font_family(), "serif");
    }

    #[test]
    fn test_invalid_background_is_rejected() {
        let config = AppConfig::new(
            LayoutConfig::default(),
            StyleConfig::new(Some("nope".to_string()), None),
        );
        assert!(Theme::from_config(&config).is_err());
    }

    #[test]
    fn test_note_styles() {
        let theme = Theme::basic();
        assert_eq!(theme.note_style(NoteMode::Note).shape.shape(), NoteShape::Folded);
        assert_eq!(
            theme.note_style(NoteMode::State).shape.shape(),
            NoteShape::Rounded(10.0)
        );
    }
}
