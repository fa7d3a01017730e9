//! Layout and rendering behaviour checked through the public renderer.

use sequin::{
    DiagramBuilder, Renderer,
    config::{AppConfig, LayoutConfig, StyleConfig},
    draw::TextMetrics,
    identifier::Id,
    semantic::{Agent, CapStyle, Connection, ConnectionOptions, LineStyle, Meta, Sequence, Stage},
    theme::Theme,
};

fn config() -> AppConfig {
    AppConfig::new(LayoutConfig::new(TextMetrics::Estimate), StyleConfig::default())
}

fn renderer() -> Renderer {
    Renderer::new(Theme::from_config(&config()).expect("valid theme"))
}

fn agents(names: &[&str]) -> Vec<Agent> {
    names
        .iter()
        .map(|name| Agent::new(Id::new(name)).with_anchor_right(*name == "["))
        .collect()
}

fn ids(names: &[&str]) -> Vec<Id> {
    names.iter().map(|name| Id::new(name)).collect()
}

fn begin(names: &[&str], cap: CapStyle) -> Stage {
    Stage::AgentBegin {
        agents: ids(names),
        cap,
    }
}

fn end(names: &[&str], cap: CapStyle) -> Stage {
    Stage::AgentEnd {
        agents: ids(names),
        cap,
    }
}

fn connect(from: &str, to: &str, label: &str) -> Stage {
    Stage::Connection(Connection::new(
        Id::new(from),
        Id::new(to),
        label,
        ConnectionOptions::new(LineStyle::Solid, false, true),
    ))
}

/// The opening tag of the first element carrying `class`.
fn element_with_class<'a>(svg: &'a str, class: &str) -> &'a str {
    let marker = format!(r#"class="{class}""#);
    let at = svg.find(&marker).expect("class present");
    let start = svg[..at].rfind('<').expect("element start");
    let end = at + svg[at..].find('>').expect("element end");
    &svg[start..=end]
}

fn attribute(element: &str, name: &str) -> f32 {
    let marker = format!(r#" {name}=""#);
    let start = element.find(&marker).expect("attribute present") + marker.len();
    let len = element[start..].find('"').expect("attribute end");
    element[start..start + len].parse().expect("numeric attribute")
}

#[test]
fn test_title_is_rendered() {
    let sequence = Sequence::new(
        Meta::new("Title", CapStyle::None),
        agents(&["[", "Col 1", "Col 2", "]"]),
        Vec::new(),
    );
    let svg = renderer()
        .render(&sequence)
        .expect("render")
        .into_svg()
        .to_string();

    let at = svg.find(r#"class="title""#).expect("title element");
    let close = at + svg[at..].find("</text>").expect("title end");
    assert!(svg[at..close].contains("Title"));
}

#[test]
fn test_agent_lines_are_positioned() {
    let sequence = Sequence::new(
        Meta::default(),
        agents(&["[", "A", "B", "]"]),
        vec![
            begin(&["A", "B"], CapStyle::Box),
            connect("A", "B", ""),
            end(&["A", "B"], CapStyle::None),
        ],
    );
    let diagram = renderer().render(&sequence).expect("render");
    let agent_x = diagram.agent_x("A").expect("A is positioned");
    let svg = diagram.into_svg().to_string();

    let line = element_with_class(&svg, "agent-1-line");
    assert_eq!(attribute(line, "x1"), agent_x);
}

#[test]
fn test_agents_are_arranged_left_to_right() {
    let sequence = Sequence::new(
        Meta::default(),
        agents(&["[", "A", "B", "C", "]"]),
        vec![
            begin(&["A", "B", "C"], CapStyle::Box),
            connect("[", "A", ""),
            connect("A", "B", ""),
            connect("B", "C", ""),
            connect("C", "]", ""),
            end(&["A", "B", "C"], CapStyle::None),
        ],
    );
    let diagram = renderer().render(&sequence).expect("render");
    let x = |name| diagram.agent_x(name).expect("positioned");

    assert!(x("A") > x("["));
    assert!(x("B") > x("A"));
    assert!(x("C") > x("B"));
    assert!(x("]") > x("C"));
}

#[test]
fn test_mutually_exclusive_agents_share_space() {
    let sequence = Sequence::new(
        Meta::default(),
        agents(&["[", "A", "B", "C", "D", "]"]),
        vec![
            begin(&["A", "B"], CapStyle::Box),
            connect("A", "B", "short"),
            end(&["B"], CapStyle::Cross),
            begin(&["C"], CapStyle::Box),
            connect("A", "C", "long description here"),
            end(&["C"], CapStyle::Cross),
            begin(&["D"], CapStyle::Box),
            connect("A", "D", "short again"),
            end(&["A", "D"], CapStyle::Cross),
        ],
    );
    let diagram = renderer().render(&sequence).expect("render");
    let x = |name| diagram.agent_x(name).expect("positioned");

    assert!(x("B") > x("A"));
    assert!(x("C") > x("A"));
    assert!(x("D") > x("A"));

    assert!(x("C") > x("B"));
    assert!(x("D") > x("B"));

    assert!(x("D") < x("C"));
}

#[test]
fn test_parsed_connection_orders_agents() {
    let builder = DiagramBuilder::new(config());
    let sequence = builder.parse("A -> B: hi").expect("parse");
    let diagram = builder.render(&sequence).expect("render");

    assert!(diagram.agent_x("A") < diagram.agent_x("B"));
}

#[test]
fn test_longer_label_never_narrows_layout() {
    let builder = DiagramBuilder::new(config());
    let mut previous = 0.0;
    for label in ["", "a", "a label", "a much longer label than before"] {
        let source = format!("A -> B: {label}");
        let sequence = builder.parse(&source).expect("parse");
        let diagram = builder.render(&sequence).expect("render");
        let gap = diagram.agent_x("B").expect("B") - diagram.agent_x("A").expect("A");
        assert!(gap >= previous, "gap shrank for label {label:?}");
        previous = gap;
    }
}

#[test]
fn test_svg_is_grouped_by_layer() {
    let builder = DiagramBuilder::new(config());
    let sequence = builder
        .parse("if ok\nA -> B: go\nnote over A: wait\nend")
        .expect("parse");
    let svg = builder.render_svg(&sequence).expect("render");

    let layers = ["agent-lines", "mask", "blocks", "shapes", "labels"];
    let offsets: Vec<usize> = layers
        .iter()
        .map(|layer| {
            svg.find(&format!(r#"data-layer="{layer}""#))
                .unwrap_or_else(|| panic!("missing layer {layer}"))
        })
        .collect();
    assert!(offsets.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_rerender_is_idempotent() {
    let builder = DiagramBuilder::new(config());
    let sequence = builder
        .parse("title Again\nA -> B: one\nB -> B: loop\nnote over A, B: both")
        .expect("parse");

    let first = builder.render_svg(&sequence).expect("first render");
    let second = builder.render_svg(&sequence).expect("second render");
    assert_eq!(first, second);
}

#[test]
fn test_agent_margin_override_widens_layout() {
    let sequence = DiagramBuilder::new(config())
        .parse("A -> B\nB -> C")
        .expect("parse");

    let mut narrow = renderer();
    let wide_config = AppConfig::new(
        LayoutConfig::new(TextMetrics::Estimate).with_agent_margin(60.0),
        StyleConfig::default(),
    );
    let mut wide = Renderer::new(Theme::from_config(&wide_config).expect("valid theme"));

    let narrow_width = narrow.render(&sequence).expect("render").width();
    let wide_diagram = wide.render(&sequence).expect("render");
    assert!(wide_diagram.width() > narrow_width);

    // The input is not modified by rendering with another theme.
    let again = narrow.render(&sequence).expect("render").width();
    assert_eq!(again, narrow_width);
}

#[test]
fn test_action_margin_override_adds_height_per_stage() {
    let sequence = DiagramBuilder::new(config())
        .parse("A -> B\nB -> C\nC -> A")
        .expect("parse");

    let spaced_config = AppConfig::new(
        LayoutConfig::new(TextMetrics::Estimate).with_action_margin(40.0),
        StyleConfig::default(),
    );
    let mut spaced = Renderer::new(Theme::from_config(&spaced_config).expect("valid theme"));

    let base = renderer().render(&sequence).expect("render");
    let tall = spaced.render(&sequence).expect("render");
    assert!(tall.height() > base.height());
    assert_eq!(tall.width(), base.width());
}
