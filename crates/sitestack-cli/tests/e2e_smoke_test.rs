use std::{fs, path::Path};

use serde_json::Value;
use tempfile::tempdir;

use sitestack::{SitestackError, Topology, export::Format};
use sitestack_cli::{Args, run};

const ACCOUNT_ID: &str = "123456789012";

fn args(output: &Path) -> Args {
    Args {
        region: Some("eu-central-1".to_string()),
        bucket: Some("demo-bucket".to_string()),
        index_document: None,
        topology: None,
        stack_name: None,
        template: None,
        account_id: Some(ACCOUNT_ID.to_string()),
        output: output.to_string_lossy().to_string(),
        format: Format::Plan,
        config: None,
        log_level: "off".to_string(),
    }
}

fn read_json(path: &Path) -> Value {
    let content = fs::read_to_string(path).expect("Failed to read output");
    serde_json::from_str(&content).expect("Output is not valid JSON")
}

#[test]
fn e2e_private_edge_cached_plan() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output = temp_dir.path().join("plan.json");

    run(&args(&output)).expect("Synthesis failed");

    let plan = read_json(&output);
    let names: Vec<&str> = plan["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["name"].as_str().unwrap())
        .collect();
    let position = |name: &str| names.iter().position(|n| *n == name).unwrap();

    assert!(position("static_website") < position("website_distribution"));
    assert!(position("website_distribution") < position("allow_cloudfront_only"));

    let policy = plan["entries"][position("allow_cloudfront_only")]["properties"]["policy"]
        .as_str()
        .unwrap();
    assert!(policy.contains(&format!("arn:aws:cloudfront::{ACCOUNT_ID}:distribution/")));
    assert!(!policy.contains("${TOKEN["));
    assert_eq!(plan["outputs"][0]["name"], "cloudfront_distribution_domain");
}

#[test]
fn e2e_public_direct_terraform_from_config_file() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    let template_path = temp_dir.path().join("index.tmpl");
    let output = temp_dir.path().join("main.tf.json");

    fs::write(
        &config_path,
        r#"
        [stack]
        name = "docs"
        topology = "public_direct"
        bucket = "docs-bucket"

        [provider]
        region = "us-east-1"

        [[outputs]]
        name = "bucket_arn"
        value = "${static_website.arn}"
        "#,
    )
    .unwrap();
    fs::write(
        &template_path,
        "<h1>Docs at {{ timestamp }}</h1><script>const u = `${location.host}`;</script>",
    )
    .unwrap();

    let args = Args {
        region: None,
        bucket: None,
        account_id: None,
        template: Some(template_path.to_string_lossy().to_string()),
        config: Some(config_path.to_string_lossy().to_string()),
        format: Format::Terraform,
        ..args(&output)
    };
    run(&args).expect("Synthesis failed");

    let config = read_json(&output);
    assert_eq!(config["provider"]["aws"][0]["region"], "us-east-1");
    assert!(config.get("data").is_none());
    assert_eq!(
        config["output"]["website_url"]["value"],
        "https://docs-bucket.s3.us-east-1.amazonaws.com/index.html"
    );
    assert_eq!(
        config["output"]["bucket_arn"]["value"],
        "arn:aws:s3:::docs-bucket"
    );
    let content = config["resource"]["aws_s3_object"]["static_website_index"]["content"]
        .as_str()
        .unwrap();
    assert!(content.starts_with("<h1>Docs at "));
    assert!(content.ends_with("<script>const u = `$${location.host}`;</script>"));
}

#[test]
fn e2e_command_line_overrides_config_file() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    let output = temp_dir.path().join("graph.dot");

    fs::write(&config_path, "[stack]\nbucket = \"from-file\"\n").unwrap();

    let args = Args {
        bucket: Some("from-flag".to_string()),
        topology: Some(Topology::PublicDirect),
        config: Some(config_path.to_string_lossy().to_string()),
        format: Format::Dot,
        ..args(&output)
    };
    run(&args).expect("Synthesis failed");

    let dot = fs::read_to_string(&output).unwrap();
    assert!(dot.starts_with("digraph {"));
    assert!(dot.contains("output.website_url"));
    assert!(!dot.contains("aws_cloudfront_distribution"));
}

#[test]
fn e2e_invalid_inputs_fail() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output = temp_dir.path().join("plan.json");

    let empty_bucket = Args {
        bucket: Some(String::new()),
        ..args(&output)
    };
    assert!(matches!(
        run(&empty_bucket),
        Err(SitestackError::InvalidConfiguration(_))
    ));

    let bad_account = Args {
        account_id: Some("not-an-account".to_string()),
        ..args(&output)
    };
    assert!(matches!(run(&bad_account), Err(SitestackError::Identity(_))));

    let missing_config = Args {
        config: Some(temp_dir.path().join("missing.toml").to_string_lossy().to_string()),
        ..args(&output)
    };
    assert!(run(&missing_config).is_err());

    let template_path = temp_dir.path().join("static.html");
    fs::write(&template_path, "<h1>no timestamp</h1>").unwrap();
    let static_template = Args {
        template: Some(template_path.to_string_lossy().to_string()),
        ..args(&output)
    };
    assert!(matches!(
        run(&static_template),
        Err(SitestackError::Parse { .. })
    ));

    assert!(!output.exists(), "No plan is written when synthesis fails");
}
