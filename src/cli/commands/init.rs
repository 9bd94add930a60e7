//! Init command - interactive first-run setup.

use crate::cli::Output;
use crate::config::{Settings, DEFAULT_QUESTIONS, DEFAULT_SYSTEM_PROMPT};
use crate::openai::ApiCredential;
use console::style;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    Output::header("Plandigest Setup");
    println!();
    println!("Let's make sure everything is in place to answer questions about your PDFs.\n");

    // Step 1: API key
    println!("{}", style("Step 1: Checking API configuration").bold().cyan());
    println!();

    match ApiCredential::from_env() {
        Some(credential) => {
            Output::success(&format!("OPENAI_API_KEY is set ({})", credential.masked()));
        }
        None => {
            Output::info("OPENAI_API_KEY is not set.");
            println!();
            println!("  Batch runs will ask for your key, and the web page has a key field.");
            println!(
                "  To skip the prompt, export it: {}",
                style("export OPENAI_API_KEY='sk-...'").green()
            );
            println!(
                "  Get a key from: {}",
                style("https://platform.openai.com/api-keys").underlined()
            );
        }
    }

    println!();

    // Step 2: Prompt and questions
    println!("{}", style("Step 2: Prompt and questions").bold().cyan());
    println!();

    write_template(&settings.prompt_path(), DEFAULT_SYSTEM_PROMPT, "System prompt")?;
    write_template(&settings.questions_path(), DEFAULT_QUESTIONS, "Questions")?;

    println!();

    // Step 3: Directories
    println!("{}", style("Step 3: Setting up directories").bold().cyan());
    println!();

    ensure_dir(&settings.temp_dir(), "Temp directory")?;
    ensure_dir(&settings.output_dir(), "Output directory")?;

    println!();

    // Step 4: Config file
    println!("{}", style("Step 4: Configuration file").bold().cyan());
    println!();

    let config_path = config_path.unwrap_or_else(Settings::default_config_path);
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        write_config(settings, &config_path)?;
        println!();
        println!("  Edit your config with: {}", style("plandigest config edit").green());
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check system status", style("plandigest doctor").cyan());
    println!("  {} Summarize a folder of PDFs", style("plandigest batch <dir>").cyan());
    println!("  {} Start the web page", style("plandigest serve").cyan());
    println!();
    println!("For more help: {}", style("plandigest --help").cyan());

    Ok(())
}

/// Write `content` to `path` unless a file is already there.
///
/// Returns whether a file was created.
fn write_template(path: &Path, content: &str, label: &str) -> anyhow::Result<bool> {
    if path.exists() {
        Output::info(&format!("{} exists: {}", label, path.display()));
        return Ok(false);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Output::success(&format!("Created {}: {}", label.to_lowercase(), path.display()));
    Ok(true)
}

/// Save `settings` to `path`, creating parent directories as needed.
fn write_config(settings: &Settings, path: &PathBuf) -> anyhow::Result<()> {
    settings.save_to(path)?;
    Output::success(&format!("Created config file: {}", path.display()));
    Ok(())
}

fn ensure_dir(path: &Path, label: &str) -> anyhow::Result<()> {
    if path.exists() {
        Output::info(&format!("{} exists: {}", label, path.display()));
    } else {
        std::fs::create_dir_all(path)?;
        Output::success(&format!("Created {}: {}", label.to_lowercase(), path.display()));
    }
    Ok(())
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y" || input.trim().to_lowercase() == "yes")
}
