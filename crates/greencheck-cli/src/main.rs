use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use greencheck_core::{Config, GreenbookClient, ProgressEvent, Submission, Verifier};

/// Greencheck - Verify pharmaceutical products against the NAFDAC Greenbook
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a product photo to verify
    image: Option<PathBuf>,

    /// Registration number to validate directly (e.g. A4-1234)
    #[arg(long, short)]
    number: Option<String>,

    /// Base URL of the verification API
    #[arg(long)]
    api_url: Option<String>,

    /// Bound the remote call to this many seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // CLI flags > env vars > defaults
    let api_base_url = args
        .api_url
        .or_else(|| std::env::var("GREENCHECK_API_URL").ok())
        .unwrap_or_else(|| Config::default().api_base_url);

    let submission = match (&args.image, &args.number) {
        (Some(path), None) => Submission::ImageBytes(std::fs::read(path)?),
        (None, Some(number)) => Submission::Manual(number.clone()),
        (Some(_), Some(_)) => anyhow::bail!("pass either an image or --number, not both"),
        (None, None) => anyhow::bail!("pass a product photo or --number (see --help)"),
    };

    let client = GreenbookClient::new(&Config {
        api_base_url,
        request_timeout_secs: args.timeout,
    })?;
    let mut verifier = Verifier::new(client);

    // Ctrl-C cuts the in-flight attempt; the engine discards its results.
    let cancel = verifier.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    bar.enable_steady_tick(Duration::from_millis(100));
    let ticker = bar.clone();
    let current_label = std::sync::Mutex::new("");

    let result = verifier
        .submit(submission, move |event| match event {
            ProgressEvent::StageStarted { id, total, label } => {
                *current_label.lock().unwrap() = label;
                ticker.set_message(format!("[{id}/{total}] {label}..."));
            }
            ProgressEvent::StageCompleted { id, total } => {
                let label = *current_label.lock().unwrap();
                ticker.println(format!("  {} [{id}/{total}] {label}", "ok".green()));
            }
        })
        .await;

    bar.finish_and_clear();

    match result {
        Err(e) if e.is_validation() => {
            eprintln!("{}", e.red());
            std::process::exit(2);
        }
        Err(e) => Err(e.into()),
        Ok(None) => {
            println!("{}", "Verification cancelled.".yellow());
            Ok(())
        }
        Ok(Some(report)) => {
            render_outcome(&report.outcome);
            Ok(())
        }
    }
}

fn render_outcome(outcome: &greencheck_core::VerificationOutcome) {
    println!();

    if let Some(detail) = &outcome.error_detail {
        println!("{}", detail.red().bold());
        return;
    }

    if outcome.is_not_found() {
        println!("{}", "Product not found".yellow().bold());
        if let Some(message) = &outcome.message {
            println!("  {message}");
        }
        if let Some(number) = &outcome.source_identifier {
            println!("  Searched for: {number}");
        }
        return;
    }

    if outcome.found == Some(true) {
        println!(
            "{} ({} match{})",
            "Product found".green().bold(),
            outcome.products.len(),
            if outcome.products.len() == 1 { "" } else { "es" },
        );
        for record in &outcome.products {
            println!();
            println!("  {}", record.name.bold());
            println!("    Active ingredients: {}", record.active_ingredients);
            println!("    Category:           {}", record.category);
            println!("    NRN:                {}", record.registration_number);
            if record.is_active() {
                println!("    Status:             {}", record.status.green());
            } else {
                println!(
                    "    Status:             {} (registration not active)",
                    record.status.yellow()
                );
            }
        }
    } else if let Some(message) = &outcome.message {
        println!("{message}");
    }

    if let Some(confidence) = outcome.extraction_confidence {
        println!();
        println!("  OCR confidence: {confidence:.1}%");
    }
    if let Some(text) = &outcome.raw_extracted_text {
        println!("  Extracted text: {text}");
    }
}
