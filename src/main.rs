use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use catto_novelty::config::{AppConfig, APP_NAME, APP_VERSION};
use catto_novelty::models::CaseInput;
use catto_novelty::pipeline::{AnalysisResult, EmailDraft};
use catto_novelty::{api, build_pipeline, init_tracing};

#[derive(Parser)]
#[command(name = "catto-novelty", version, about = "Case-report novelty screening against PubMed")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Screen one case read from a JSON file.
    Analyze {
        /// Path to a case JSON object.
        #[arg(short, long)]
        input: PathBuf,
        /// Print the email draft and its mailto link instead of the summary.
        #[arg(long)]
        email_draft: bool,
        /// Print the full analysis result as JSON.
        #[arg(long, conflicts_with = "email_draft")]
        json: bool,
    },
    /// Serve the screening HTTP API.
    Serve {
        /// Listen address; overrides CATTO_BIND.
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let config = AppConfig::from_env();

    tracing::info!("{APP_NAME} v{APP_VERSION} starting");

    let outcome = match cli.command {
        Command::Analyze {
            input,
            email_draft,
            json,
        } => analyze(&config, &input, email_draft, json).await,
        Command::Serve { bind } => serve(&config, bind).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn analyze(
    config: &AppConfig,
    input: &Path,
    email_draft: bool,
    json: bool,
) -> Result<(), String> {
    let raw = std::fs::read_to_string(input)
        .map_err(|e| format!("Cannot read {}: {e}", input.display()))?;
    let case: CaseInput =
        serde_json::from_str(&raw).map_err(|e| format!("Invalid case JSON: {e}"))?;

    let pipeline = build_pipeline(config)?;
    let result = pipeline.run(&case).await.map_err(|e| {
        tracing::error!(error = %e, retryable = e.is_retryable(), "Analysis failed");
        e.user_message()
    })?;

    if json {
        let text = serde_json::to_string_pretty(&result)
            .map_err(|e| format!("Cannot serialize result: {e}"))?;
        println!("{text}");
    } else if email_draft {
        let draft = EmailDraft::from_analysis(&result, &case);
        println!("To: {}", draft.to.as_deref().unwrap_or("(no contact address)"));
        println!("Subject: {}\n", draft.subject);
        println!("{}\n", draft.body);
        println!("{}", draft.mailto_link());
    } else {
        print_summary(&result);
    }
    Ok(())
}

fn print_summary(result: &AnalysisResult) {
    println!(
        "{} priority, novelty {}% (CATTO level {})",
        result.judgement, result.score, result.max_level
    );
    println!("Query ({}): {}", result.query.strength, result.query.chosen);
    println!("\n{}\n", result.reasoning);
    for cite in &result.citations {
        println!(
            "  L{} {} (PMID: {}) {}",
            cite.verified_level, cite.title, cite.pmid, cite.url
        );
    }
}

async fn serve(config: &AppConfig, bind: Option<String>) -> Result<(), String> {
    let bind = bind.unwrap_or_else(|| config.bind_addr.clone());
    let addr: SocketAddr = bind
        .parse()
        .map_err(|e| format!("Invalid bind address {bind}: {e}"))?;

    let pipeline = Arc::new(build_pipeline(config)?);
    api::serve(pipeline, addr).await
}
