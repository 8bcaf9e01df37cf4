use proptest::prelude::*;
use sitestack_core::{
    identifier::Id,
    resource::ResourceKind,
    template::TemplatePart,
    token::{Attribute, Token},
};
use sitestack_parser::{
    check_references, error::ErrorCode, parse_expression, parse_template,
};

const KNOWN: &[&str] = &["timestamp", "bucket", "region", "index_document"];

const DEFAULT_HTML: &str =
    "<html><head></head><body><h1>Hello DevOps {{ timestamp }}</h1></body></html>";

#[test]
fn test_default_template_renders_and_extracts() {
    let template = parse_template(DEFAULT_HTML, KNOWN).expect("Failed to parse");

    let rendered = template
        .render(&[("timestamp", "1700000000".to_string())].into_iter().collect())
        .expect("Failed to render");
    assert_eq!(
        rendered,
        "<html><head></head><body><h1>Hello DevOps 1700000000</h1></body></html>"
    );

    let bindings = template.extract(&rendered).expect("Rendered text must match");
    assert_eq!(bindings.get("timestamp").map(String::as_str), Some("1700000000"));
}

#[test]
fn test_template_display_normalizes_whitespace() {
    let template = parse_template("{{bucket}}.s3.{{   region   }}", KNOWN).unwrap();
    assert_eq!(template.to_string(), "{{ bucket }}.s3.{{ region }}");
}

#[test]
fn test_template_with_every_known_placeholder() {
    let template = parse_template(
        "{{ bucket }} {{ region }} {{ index_document }} {{ timestamp }}",
        KNOWN,
    )
    .unwrap();

    assert_eq!(template.placeholders().collect::<Vec<_>>(), KNOWN);
    assert!(matches!(template.parts()[1], TemplatePart::Text(ref t) if t == " "));
}

#[test]
fn test_template_errors_carry_codes() {
    let err = parse_template("{{ clock }}", KNOWN).unwrap_err();
    assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E200));
    assert_eq!(
        err.to_string(),
        "error[E200]: unknown template placeholder `clock`"
    );
}

#[test]
fn test_output_expression_against_stack() {
    let parsed =
        parse_expression("https://${website_distribution.domain_name}/${static_website_index.etag}")
            .unwrap();

    let tokens: Vec<Token> = parsed.expr().tokens().collect();
    assert_eq!(
        tokens,
        vec![
            Token::new(Id::new("website_distribution"), Attribute::DomainName),
            Token::new(Id::new("static_website_index"), Attribute::Etag),
        ]
    );

    let result = check_references(&parsed, |id| {
        if id == "website_distribution" {
            Some(ResourceKind::Distribution)
        } else if id == "static_website_index" {
            Some(ResourceKind::ContentObject)
        } else {
            None
        }
    });
    assert!(result.is_ok());
}

#[test]
fn test_output_attribute_not_exported() {
    let parsed = parse_expression("${enable_versioning.arn}").unwrap();

    let err = check_references(&parsed, |_| Some(ResourceKind::Versioning)).unwrap_err();
    let diag = &err.diagnostics()[0];

    assert_eq!(diag.code(), Some(ErrorCode::E202));
    assert_eq!(diag.message(), "`enable_versioning` does not export `arn`");
    assert_eq!(diag.help(), Some("a versioning exports: id"));
}

proptest! {
    #[test]
    fn test_generated_references_round_trip(
        node in "[a-z_][a-z0-9_]{0,20}",
        attribute in prop::sample::select(Attribute::ALL.to_vec()),
        prefix in "[a-zA-Z0-9:/. ]{0,12}",
    ) {
        let source = format!("{prefix}${{{node}.{attribute}}}");
        let parsed = parse_expression(&source).unwrap();

        prop_assert_eq!(parsed.references().len(), 1);
        let token = *parsed.references()[0].inner();
        prop_assert_eq!(token.owner(), Id::new(&node));
        prop_assert_eq!(token.attribute(), attribute);
        prop_assert_eq!(parsed.references()[0].span().end(), source.len());
    }

    #[test]
    fn test_rendered_timestamp_is_recovered(timestamp in any::<u64>()) {
        let template = parse_template(DEFAULT_HTML, KNOWN).unwrap();
        let rendered = template
            .render(&[("timestamp", timestamp.to_string())].into_iter().collect())
            .unwrap();

        let bindings = template.extract(&rendered).unwrap();
        prop_assert_eq!(bindings.get("timestamp"), Some(&timestamp.to_string()));
    }
}
