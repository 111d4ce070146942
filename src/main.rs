use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use blocflow::classifier::{ChannelNavigator, ResponseClassifier};
use blocflow::config::{BuildMode, Config};
use blocflow::logging::init_tracing;
use blocflow::response::Response;
use blocflow::state::{ErrorType, OpaqueFactory};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;

#[derive(Debug, Parser)]
#[command(name = "blocflow", version, about = "Classify transport responses into UI states")]
struct Cli {
    /// Config file (default: ~/.config/blocflow/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify a JSON response document and print the resulting state
    Classify {
        /// Path to the response document
        file: PathBuf,

        /// Which state branch errors are routed to
        #[arg(long, value_enum, default_value_t = ErrorTypeArg::NonRender)]
        error_type: ErrorTypeArg,

        /// Behave as a release build (parsing errors are absorbed)
        #[arg(long)]
        release: bool,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ErrorTypeArg {
    Render,
    NonRender,
    None,
}

impl From<ErrorTypeArg> for ErrorType {
    fn from(arg: ErrorTypeArg) -> Self {
        match arg {
            ErrorTypeArg::Render => ErrorType::Render,
            ErrorTypeArg::NonRender => ErrorType::NonRender,
            ErrorTypeArg::None => ErrorType::None,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    init_tracing(&config.logging);

    match cli.command {
        Command::Classify {
            file,
            error_type,
            release,
        } => {
            let document = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read '{}'", file.display()))?;
            let mut config = config;
            if release {
                config.classifier.build_mode = BuildMode::Release;
            }
            let output = classify_document(&document, error_type.into(), &config)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Classifies one JSON response and reports the state plus navigation intents.
fn classify_document(
    document: &str,
    error_type: ErrorType,
    config: &Config,
) -> anyhow::Result<serde_json::Value> {
    let response: Response<serde_json::Value> =
        serde_json::from_str(document).context("Response document is not valid JSON")?;

    let (navigator, mut intents) = ChannelNavigator::new();
    let classifier = ResponseClassifier::from_config(
        OpaqueFactory::<serde_json::Value>::new(),
        config,
        Arc::new(navigator),
    );
    let state = classifier.classify(response, error_type);

    let mut navigation = Vec::new();
    while let Ok(intent) = intents.try_recv() {
        navigation.push(intent.surface);
    }

    Ok(json!({
        "state": state,
        "navigation": navigation,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_classify_defaults_to_non_render() {
        let cli = Cli::try_parse_from(["blocflow", "classify", "response.json"]).unwrap();
        match cli.command {
            Command::Classify {
                file,
                error_type,
                release,
            } => {
                assert_eq!(file, PathBuf::from("response.json"));
                assert_eq!(error_type, ErrorTypeArg::NonRender);
                assert!(!release);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parse_classify_with_flags() {
        let cli = Cli::try_parse_from([
            "blocflow",
            "--config",
            "/tmp/blocflow.toml",
            "classify",
            "r.json",
            "--error-type",
            "render",
            "--release",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/blocflow.toml")));
        assert!(matches!(
            cli.command,
            Command::Classify {
                error_type: ErrorTypeArg::Render,
                release: true,
                ..
            }
        ));
    }

    #[test]
    fn classify_document_reports_navigation() {
        let output = classify_document(
            r#"{"classification": "serverError", "exceptionMessage": "502"}"#,
            ErrorType::Render,
            &Config::default(),
        )
        .unwrap();

        assert_eq!(output["navigation"], json!(["maintenance"]));
        assert_eq!(
            output["state"],
            json!({"nonRender": {"type": "error", "message": "", "classification": "serverError"}})
        );
    }

    #[test]
    fn classify_document_wraps_success_payload() {
        let output = classify_document(
            r#"{"classification": "success", "payload": {"id": 7}}"#,
            ErrorType::NonRender,
            &Config::default(),
        )
        .unwrap();

        assert_eq!(output["state"], json!({"render": {"type": "data", "data": {"id": 7}}}));
        assert_eq!(output["navigation"], json!([]));
    }

    #[test]
    fn classify_document_rejects_invalid_json() {
        assert!(classify_document("not json", ErrorType::Render, &Config::default()).is_err());
    }
}
