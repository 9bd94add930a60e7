//! Batch command - summarize every PDF in a directory.

use crate::batch::{self, BatchEvent, BatchSummary};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::openai::ApiCredential;
use crate::pipeline::Pipeline;
use console::{style, Term};
use indicatif::ProgressBar;
use std::io::{self, Write};
use std::path::Path;

/// Run the batch command.
pub async fn run_batch(
    dir: Option<String>,
    api_key: Option<String>,
    output: Option<String>,
    settings: Settings,
) -> anyhow::Result<()> {
    preflight::check(Operation::Batch, &settings)?;

    let dir = match dir {
        Some(dir) => dir,
        None => prompt_line("Enter the directory containing PDF files:")?,
    };
    let dir = Settings::expand_path(dir.trim());

    let credential = match api_key {
        Some(key) => ApiCredential::new(key)?,
        None => {
            eprint!("{} Enter your OpenAI API key: ", style("?").cyan());
            ApiCredential::new(Term::stderr().read_secure_line()?)?
        }
    };

    let output_dir = output
        .map(|o| Settings::expand_path(&o))
        .unwrap_or_else(|| settings.output_dir());
    let suffix = settings.batch.output_suffix.clone();
    let strip = settings.batch.strip_code_fences;

    let pipeline = Pipeline::new(settings, &credential)?.with_fence_stripping(strip);

    Output::header("Batch summaries");
    Output::kv("Input", &dir.display().to_string());
    Output::kv("Output", &output_dir.display().to_string());
    Output::kv("Questions", &pipeline.questions().len().to_string());
    println!();

    let mut spinner: Option<ProgressBar> = None;
    let summary = batch::run_batch(&pipeline, &dir, &output_dir, &suffix, |event| match event {
        BatchEvent::Started { file, index, total } => {
            spinner = Some(Output::spinner(&format!(
                "[{}/{}] Processing {}",
                index + 1,
                total,
                file_label(file)
            )));
        }
        BatchEvent::Saved { file, output } => {
            if let Some(pb) = spinner.take() {
                pb.finish_and_clear();
            }
            Output::success(&format!("{} -> {}", file_label(file), output.display()));
        }
        BatchEvent::Failed { file, error } => {
            if let Some(pb) = spinner.take() {
                pb.finish_and_clear();
            }
            Output::error(&format!("Error processing {}: {}", file_label(file), error));
        }
    })
    .await?;

    print_summary(&summary);

    Ok(())
}

fn print_summary(summary: &BatchSummary) {
    println!();
    if summary.total() == 0 {
        Output::warning("No PDF files found.");
        return;
    }

    Output::header("Summary");
    Output::kv("Written", &summary.written.len().to_string());
    Output::kv("Failed", &summary.failed.len().to_string());

    if summary.failed.is_empty() {
        Output::success("All files processed.");
    } else {
        println!();
        for (file, error) in &summary.failed {
            Output::list_item(&format!("{}: {}", file_label(file), error));
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Prompt for a line of input on stdin.
fn prompt_line(message: &str) -> io::Result<String> {
    print!("{} {} ", style("?").cyan(), message);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
