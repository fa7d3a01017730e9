//! Integration tests for the DiagramBuilder API

use sequin::{
    DiagramBuilder, SequinError,
    config::{AppConfig, LayoutConfig, StyleConfig},
    draw::TextMetrics,
};

fn builder() -> DiagramBuilder {
    DiagramBuilder::new(AppConfig::new(
        LayoutConfig::new(TextMetrics::Estimate),
        StyleConfig::default(),
    ))
}

#[test]
fn test_builder_api_exists() {
    let _builder = DiagramBuilder::default();
}

#[test]
fn test_render_simple_diagram() {
    let builder = builder();
    let sequence = builder
        .parse("title Greeting\nAlice -> Bob: hello\nBob --> Alice: hi")
        .expect("Failed to parse sequence");
    let result = builder.render_svg(&sequence);

    match result {
        Ok(svg) => {
            assert!(svg.contains("<svg"), "Output should contain SVG tag");
            assert!(svg.contains("</svg>"), "Output should be complete SVG");
            assert!(svg.contains("Greeting"));
        }
        Err(err) => panic!("Failed to render: {err:?}"),
    }
}

#[test]
fn test_parse_invalid_syntax_returns_error() {
    let source = "this is not a command";
    let result = builder().parse(source);

    match result {
        Err(SequinError::Parse { err, src }) => {
            assert_eq!(src, source);
            let code = err.first().and_then(|diagnostic| diagnostic.code());
            assert_eq!(code.map(|code| code.as_str()), Some("E100"));
        }
        other => panic!("Expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_builder_reusability() {
    let builder = builder();

    let first = builder.parse("A -> B").expect("Failed to parse first");
    let second = builder.parse("C -> D: longer label").expect("Failed to parse second");

    let diagram1 = builder.render(&first).expect("Failed to render first");
    let diagram2 = builder.render(&second).expect("Failed to render second");

    assert!(diagram1.agent_x("A").is_some());
    assert!(diagram1.agent_x("C").is_none());
    assert!(diagram2.width() > diagram1.width());
}

#[test]
fn test_invalid_background_is_config_error() {
    let config: AppConfig = toml::from_str(
        r#"
        [style]
        background_color = "not-a-color"
        "#,
    )
    .expect("Failed to read config");
    let builder = DiagramBuilder::new(config);
    let sequence = builder.parse("A -> B").expect("Failed to parse");

    assert!(matches!(
        builder.render_svg(&sequence),
        Err(SequinError::Config(_))
    ));
}

#[test]
fn test_background_is_drawn() {
    let config: AppConfig = toml::from_str(
        r#"
        [layout]
        text_metrics = "estimate"

        [style]
        background_color = "white"
        "#,
    )
    .expect("Failed to read config");
    let builder = DiagramBuilder::new(config);
    let sequence = builder.parse("A -> B").expect("Failed to parse");
    let svg = builder.render_svg(&sequence).expect("Failed to render");

    assert!(svg.contains(r#"data-layer="background""#));
}
