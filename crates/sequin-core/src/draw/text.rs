//! Text styles, measurement and rendering.
//!
//! Layout needs label sizes long before anything is drawn, so measurement is
//! split out behind the [`TextMeasurer`] trait:
//!
//! - [`FontMeasurer`] shapes text with cosmic-text against the system fonts
//! - [`EstimateMeasurer`] uses a fixed per-character width and is fully
//!   deterministic, which makes it the measurer of choice for tests
//!
//! [`TextSizer`] wraps a measurer with a width cache. The renderer owns one
//! sizer and clears its cache at the start of every render.

use std::{
    cell::RefCell,
    collections::HashMap,
    sync::{Mutex, OnceLock},
};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Weight};
use log::{debug, info};
use serde::Deserialize;
use svg::{node::Text as SvgText, node::element as svg_element};

use crate::{
    color::Color,
    draw::{Drawable, LayeredOutput, RenderLayer},
    geometry::{Point, Size},
};

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT: f32 = 1.3;

/// Horizontal alignment of text relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn to_svg_value(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// Font and alignment of a family of labels.
///
/// ```
/// # use sequin_core::draw::{TextAnchor, TextDefinition};
/// let mut style = TextDefinition::new(12.0);
/// style.set_anchor(TextAnchor::Middle);
/// style.set_bold(true);
/// assert_eq!(style.line_px(), 12.0 * 1.3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TextDefinition {
    font_family: String,
    font_size: f32,
    line_height: f32,
    anchor: TextAnchor,
    bold: bool,
    color: Option<Color>,
}

impl TextDefinition {
    /// A sans-serif, start-anchored style of the given pixel size.
    pub fn new(font_size: f32) -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size,
            line_height: LINE_HEIGHT,
            anchor: TextAnchor::Start,
            bold: false,
            color: None,
        }
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn anchor(&self) -> TextAnchor {
        self.anchor
    }

    pub fn bold(&self) -> bool {
        self.bold
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Height of one line in pixels.
    pub fn line_px(&self) -> f32 {
        self.font_size * self.line_height
    }

    pub fn set_font_family(&mut self, family: &str) {
        self.font_family = family.to_string();
    }

    pub fn set_anchor(&mut self, anchor: TextAnchor) {
        self.anchor = anchor;
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.bold = bold;
    }

    /// Builder-style [`Self::set_anchor`].
    pub fn with_anchor(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Builder-style [`Self::set_bold`].
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }
}

impl Default for TextDefinition {
    fn default() -> Self {
        Self::new(12.0)
    }
}

/// Measures the rendered width of a single line of text.
pub trait TextMeasurer: std::fmt::Debug {
    fn line_width(&self, definition: &TextDefinition, line: &str) -> f32;
}

/// Which [`TextMeasurer`] to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMetrics {
    /// Shape text with real fonts
    #[default]
    Font,
    /// Fixed per-character estimate
    Estimate,
}

/// Deterministic measurer: every character is `font_size * ratio` wide.
#[derive(Debug, Clone, Copy)]
pub struct EstimateMeasurer {
    ratio: f32,
}

impl EstimateMeasurer {
    pub fn new(ratio: f32) -> Self {
        Self { ratio }
    }
}

impl Default for EstimateMeasurer {
    fn default() -> Self {
        Self::new(0.55)
    }
}

impl TextMeasurer for EstimateMeasurer {
    fn line_width(&self, definition: &TextDefinition, line: &str) -> f32 {
        line.chars().count() as f32 * definition.font_size() * self.ratio
    }
}

/// Shared font database. Loading system fonts is slow, so it happens once per process.
static FONT_SYSTEM: OnceLock<Mutex<FontSystem>> = OnceLock::new();

/// Measurer backed by cosmic-text shaping.
///
/// Falls back to [`EstimateMeasurer`] when shaping yields no glyphs, for
/// example on hosts without any installed fonts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FontMeasurer {
    fallback: EstimateMeasurer,
}

impl FontMeasurer {
    pub fn new() -> Self {
        Self::default()
    }

    fn family(name: &str) -> Family<'_> {
        match name {
            "sans-serif" => Family::SansSerif,
            "serif" => Family::Serif,
            "monospace" => Family::Monospace,
            _ => Family::Name(name),
        }
    }
}

impl TextMeasurer for FontMeasurer {
    fn line_width(&self, definition: &TextDefinition, line: &str) -> f32 {
        if line.is_empty() {
            return 0.0;
        }

        let mut font_system = FONT_SYSTEM
            .get_or_init(|| {
                info!("Initializing FontSystem");
                Mutex::new(FontSystem::new())
            })
            .lock()
            .expect("failed to lock FontSystem");

        let metrics = Metrics::new(definition.font_size(), definition.line_px());
        let mut buffer = Buffer::new(&mut font_system, metrics);
        let mut buffer = buffer.borrow_with(&mut font_system);

        let mut attrs = Attrs::new().family(Self::family(definition.font_family()));
        if definition.bold() {
            attrs = attrs.weight(Weight::BOLD);
        }

        buffer.set_size(None, None);
        buffer.set_text(line, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let width = buffer
            .layout_runs()
            .filter_map(|run| run.glyphs.last().map(|glyph| glyph.x + glyph.w))
            .fold(0.0f32, f32::max);

        if width > 0.0 {
            width
        } else {
            debug!(line = line; "No glyphs shaped, estimating width");
            self.fallback.line_width(definition, line)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct WidthKey {
    family: String,
    size_bits: u32,
    bold: bool,
    line: String,
}

/// Caching front end for a [`TextMeasurer`].
///
/// ```
/// # use sequin_core::draw::{EstimateMeasurer, TextDefinition, TextSizer};
/// let sizer = TextSizer::new(Box::new(EstimateMeasurer::new(0.5)));
/// let style = TextDefinition::new(10.0);
///
/// let size = sizer.measure(&style, "abcd\nab");
/// assert_eq!(size.width(), 20.0);
/// assert_eq!(size.height(), 2.0 * 13.0);
/// assert!(sizer.measure(&style, "").is_zero());
/// ```
#[derive(Debug)]
pub struct TextSizer {
    measurer: Box<dyn TextMeasurer>,
    cache: RefCell<HashMap<WidthKey, f32>>,
}

impl TextSizer {
    pub fn new(measurer: Box<dyn TextMeasurer>) -> Self {
        Self {
            measurer,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Builds a sizer around the measurer selected by `metrics`.
    pub fn from_metrics(metrics: TextMetrics) -> Self {
        match metrics {
            TextMetrics::Font => Self::new(Box::new(FontMeasurer::new())),
            TextMetrics::Estimate => Self::new(Box::new(EstimateMeasurer::default())),
        }
    }

    /// Size of `content`: the widest line by the number of lines.
    ///
    /// Lines are separated by `\n`. Empty content measures zero.
    pub fn measure(&self, definition: &TextDefinition, content: &str) -> Size {
        if content.is_empty() {
            return Size::default();
        }
        let mut lines = 0;
        let mut width: f32 = 0.0;
        for line in content.split('\n') {
            lines += 1;
            width = width.max(self.line_width(definition, line));
        }
        Size::new(width, lines as f32 * definition.line_px())
    }

    pub fn width(&self, definition: &TextDefinition, content: &str) -> f32 {
        self.measure(definition, content).width()
    }

    pub fn height(&self, definition: &TextDefinition, content: &str) -> f32 {
        self.measure(definition, content).height()
    }

    /// Drops all cached widths.
    pub fn reset_cache(&mut self) {
        self.cache.get_mut().clear();
    }

    /// Number of cached line widths.
    pub fn cached_len(&self) -> usize {
        self.cache.borrow().len()
    }

    fn line_width(&self, definition: &TextDefinition, line: &str) -> f32 {
        let key = WidthKey {
            family: definition.font_family().to_string(),
            size_bits: definition.font_size().to_bits(),
            bold: definition.bold(),
            line: line.to_string(),
        };
        if let Some(width) = self.cache.borrow().get(&key) {
            return *width;
        }
        let width = self.measurer.line_width(definition, line);
        self.cache.borrow_mut().insert(key, width);
        width
    }
}

/// A measured label ready to be drawn.
///
/// The render position is the anchor point on the first line's top edge: the
/// left edge for [`TextAnchor::Start`], the centre for [`TextAnchor::Middle`]
/// and the right edge for [`TextAnchor::End`].
#[derive(Debug, Clone)]
pub struct Text<'a> {
    definition: &'a TextDefinition,
    content: &'a str,
    size: Size,
    class: Option<&'a str>,
}

impl<'a> Text<'a> {
    pub fn new(definition: &'a TextDefinition, content: &'a str, sizer: &TextSizer) -> Self {
        Self {
            definition,
            content,
            size: sizer.measure(definition, content),
            class: None,
        }
    }

    /// Adds a `class` attribute to the rendered `<text>` element.
    pub fn with_class(mut self, class: &'a str) -> Self {
        self.class = Some(class);
        self
    }

    pub fn content(&self) -> &str {
        self.content
    }

    pub fn definition(&self) -> &TextDefinition {
        self.definition
    }
}

impl Drawable for Text<'_> {
    fn render_to_layers(&self, position: Point) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        if self.content.is_empty() {
            return output;
        }

        let definition = self.definition;
        let mut text = svg_element::Text::new("")
            .set("x", position.x())
            .set("y", position.y())
            .set("text-anchor", definition.anchor().to_svg_value())
            .set("font-family", definition.font_family())
            .set("font-size", definition.font_size());
        if definition.bold() {
            text = text.set("font-weight", "bold");
        }
        if let Some(color) = definition.color() {
            text = text.set("fill", &color);
        }
        if let Some(class) = self.class {
            text = text.set("class", class);
        }

        // Baseline sits one em below each line's top edge.
        for (i, line) in self.content.split('\n').enumerate() {
            let baseline = position.y() + i as f32 * definition.line_px() + definition.font_size();
            let tspan = svg_element::TSpan::new("")
                .set("x", position.x())
                .set("y", baseline)
                .add(SvgText::new(line));
            text = text.add(tspan);
        }

        output.add_to_layer(RenderLayer::Labels, Box::new(text));
        output
    }

    fn size(&self) -> Size {
        self.size
    }
}
