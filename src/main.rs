use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use ai_test_agent::api::{ApiServer, ServerConfig};
use ai_test_agent::capability::GeminiClient;
use ai_test_agent::report::{self, RunResults};
use ai_test_agent::request::RawTestRequest;
use ai_test_agent::runner::{ConsoleEventListener, Orchestrator};
use ai_test_agent::utils::Config;

#[derive(Parser)]
#[command(name = "ai-test-agent")]
#[command(version = "0.1.0")]
#[command(about = "Turns a URL and a testing goal into a generated test plan and report", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once for a URL and a testing prompt
    Run {
        /// Website under test
        #[arg(short, long)]
        url: String,

        /// What to test, in plain language
        #[arg(short, long)]
        prompt: String,

        /// Output directory for reports
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Generate reports (JSON, HTML, JUnit)
        #[arg(long, default_value = "false")]
        report: bool,
    },

    /// Serve the pipeline over HTTP
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "9334")]
        port: u16,
    },

    /// Generate report from a saved results.json
    Report {
        /// Path to results.json
        results: PathBuf,

        /// Output format (json, html, junit)
        #[arg(short, long, default_value = "html")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn build_orchestrator() -> anyhow::Result<Orchestrator> {
    let config = Config::from_env()?;
    let client = Arc::new(GeminiClient::from_config(&config)?);
    log::info!("Using model {}", client.model());

    Ok(Orchestrator::new(client.clone(), client).with_retry_policy(config.retry_policy()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            url,
            prompt,
            output,
            report,
        } => {
            let orchestrator = build_orchestrator()?;
            let listener = tokio::spawn(ConsoleEventListener::listen(orchestrator.subscribe()));

            let request = RawTestRequest::new(url, prompt);
            let outcome = orchestrator.run_traced(&request).await;
            // Let the listener print the final line before the report
            let _ = listener.await;

            // Failures were already printed by the listener
            if let Some(result) = outcome.result.report() {
                println!("\n{}", "Summary".bold().underline());
                println!("{}", result.summary);
                println!("\n{}", "Actions".bold().underline());
                println!("{}", result.actions);
            }

            if report {
                let results = RunResults {
                    run_id: outcome.trace.run_id.clone(),
                    url: request.url.clone(),
                    prompt: request.prompt.clone(),
                    result: outcome.result.clone(),
                    trace: outcome.trace,
                    generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                };
                println!("\n{} Writing reports to {}", "📊".cyan(), output.display());
                report::write_all(&results, &output)?;
            }

            if !outcome.result.is_success() {
                std::process::exit(1);
            }
        }
        Commands::Serve { host, port } => {
            let orchestrator = build_orchestrator()?;
            let server = ApiServer::new(ServerConfig { host, port }, orchestrator);
            server.start().await?;
        }
        Commands::Report {
            results,
            format,
            output,
        } => {
            report::generate_report(&results, &format, output.as_deref())?;
        }
    }

    Ok(())
}
