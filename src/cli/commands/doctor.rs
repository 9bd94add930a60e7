//! Doctor command - verify configuration and input files.

use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::openai::ApiCredential;
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Plandigest Doctor");
    println!();
    println!("Checking configuration and input files...\n");

    let mut checks = Vec::new();

    let sections: [(&str, Vec<CheckResult>); 4] = [
        ("API Configuration", vec![check_openai_api_key()]),
        ("Input Files", check_inputs(settings)),
        ("Directories", check_directories(settings)),
        ("Configuration", vec![check_config_file()]),
    ];

    for (title, results) in sections {
        println!("{}", style(title).bold());
        for check in &results {
            check.print();
        }
        checks.extend(results);
        println!();
    }

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before running Plandigest.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Plandigest is ready to use.");
    }

    Ok(())
}

/// The key is optional in the environment since every run can supply one.
fn check_openai_api_key() -> CheckResult {
    match ApiCredential::from_env() {
        Some(credential) if credential.expose().starts_with("sk-") => CheckResult::ok(
            "OPENAI_API_KEY",
            &format!("configured ({})", credential.masked()),
        ),
        Some(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        None => CheckResult::warning(
            "OPENAI_API_KEY",
            "not set",
            "You will be asked for a key on each run",
        ),
    }
}

fn check_inputs(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    match preflight::check_inputs(settings) {
        Ok(count) => {
            results.push(CheckResult::ok(
                "System prompt",
                &settings.prompt_path().display().to_string(),
            ));
            results.push(CheckResult::ok(
                "Questions",
                &format!("{} ({} questions)", settings.questions_path().display(), count),
            ));
        }
        Err(e) => results.push(CheckResult::error(
            "Prompt and questions",
            &e.to_string(),
            "Create templates with: plandigest init",
        )),
    }

    for path in settings.shared_documents() {
        results.push(check_file("Shared document", &path));
    }

    results
}

fn check_file(name: &str, path: &Path) -> CheckResult {
    if path.is_file() {
        let size = std::fs::metadata(path)
            .map(|m| format_size(m.len()))
            .unwrap_or_else(|_| "unknown size".to_string());
        CheckResult::ok(name, &format!("{} ({})", path.display(), size))
    } else {
        CheckResult::error(
            name,
            &format!("{} not found", path.display()),
            "Fix interactive.shared_documents in the config file",
        )
    }
}

fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    [
        ("Temp directory", settings.temp_dir()),
        ("Output directory", settings.output_dir()),
    ]
    .into_iter()
    .map(|(name, dir)| {
        if dir.is_dir() {
            CheckResult::ok(name, &dir.display().to_string())
        } else {
            CheckResult::warning(
                name,
                &format!("{} (will be created)", dir.display()),
                "Directory will be created on first use",
            )
        }
    })
    .collect()
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: plandigest init (or plandigest config edit)",
        )
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
