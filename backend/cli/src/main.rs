mod report;
mod terminal_output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use trackscan_client::{
    probe_with_timeout, simulate, HttpBackend, ResultSimulator, SubmissionController, Upload,
};
use trackscan_config::{
    apply_all_defaults, config_dir, config_file_path, load_and_prepare, override_base_url,
    write_config, TrackscanConfig,
};
use trackscan_core::{ControllerSnapshot, SubmissionResult};
use trackscan_logging::{init_logger, redact_sensitive_data, LoggerOptions};

use report::render_result;
use terminal_output::{note_error, note_info, note_success, note_warn, supports_color};

/// File written by `--save` when no path is given.
const DEFAULT_SAVE_FILE: &str = "ocr_results.json";

#[derive(Parser)]
#[command(name = "trackscan")]
#[command(about = "Extract tracking patterns from label images via a remote OCR backend")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.trackscan/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit an image to the OCR backend
    Submit {
        file: PathBuf,
        /// Backend base URL, overriding the config
        #[arg(long)]
        api_url: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Also write the result as JSON
        #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_SAVE_FILE)]
        save: Option<PathBuf>,
    },
    /// Check whether the backend answers its health endpoint
    Probe {
        #[arg(long)]
        api_url: Option<String>,
    },
    /// Print a simulated result without contacting the backend
    Simulate {
        /// Seed name (normally the image file name)
        name: String,
        /// Draw from a fixed RNG seed instead of the name
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        json: bool,
    },
    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a config file with every default spelled out
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| config_file_path(&config_dir()));
    let mut config = load_and_prepare(&config_path).await?;

    init_logger(&LoggerOptions {
        level: config.log_level().to_string(),
        dir: config.log_dir(),
        json: config.log_json(),
    });
    debug!(path = %config_path.display(), "Configuration ready");

    match cli.command {
        Commands::Submit {
            file,
            api_url,
            json,
            save,
        } => {
            if let Some(url) = api_url {
                override_base_url(&mut config, url)?;
            }
            submit(&config, &file, json, save.as_deref()).await
        }
        Commands::Probe { api_url } => {
            if let Some(url) = api_url {
                override_base_url(&mut config, url)?;
            }
            let url = redact_sensitive_data(config.base_url());
            if probe_with_timeout(config.base_url(), config.probe_timeout()).await {
                note_success(&format!("Connected to {url}"));
                Ok(ExitCode::SUCCESS)
            } else {
                note_error(&format!("Failed to reach {url}"));
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Simulate { name, seed, json } => {
            let result = match seed {
                Some(seed) => ResultSimulator::seeded(seed).generate(&name),
                None => simulate(&name),
            };
            print_result(&result, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { force } => {
                if config_path.exists() && !force {
                    bail!(
                        "{} already exists (use --force to overwrite)",
                        config_path.display()
                    );
                }
                write_config(&apply_all_defaults(TrackscanConfig::default()), &config_path)
                    .await?;
                note_success(&format!("Wrote {}", config_path.display()));
                Ok(ExitCode::SUCCESS)
            }
            ConfigAction::Show => {
                let yaml = serde_yaml::to_string(&config).context("Failed to render config")?;
                print!("{}", redact_sensitive_data(&yaml));
                Ok(ExitCode::SUCCESS)
            }
        },
    }
}

async fn submit(
    config: &TrackscanConfig,
    file: &Path,
    json: bool,
    save: Option<&Path>,
) -> Result<ExitCode> {
    let upload = Upload::from_path(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    if !upload.is_image() {
        note_warn(&format!(
            "{} does not look like an image ({}); sending anyway",
            upload.file_name, upload.mime_type
        ));
    }

    let backend = HttpBackend::new(config.base_url())
        .with_probe_timeout(config.probe_timeout())
        .with_submit_timeout(config.submit_timeout());
    let controller = SubmissionController::new(Arc::new(backend))
        .with_demo_fallback(config.demo_fallback())
        .with_probe_timeout(config.probe_timeout());

    note_info(&format!(
        "Processing {} ({:.1} KB) via {}",
        upload.file_name,
        upload.len() as f64 / 1024.0,
        redact_sensitive_data(config.base_url())
    ));

    let result = match controller.submit(upload).await {
        Ok(result) => result,
        Err(e) => {
            note_error(&e.to_string());
            return Ok(ExitCode::FAILURE);
        }
    };

    if let Some(notice) = outcome_notice(&controller.snapshot()) {
        note_warn(notice);
    }

    print_result(&result, json)?;

    if let Some(path) = save {
        let body = serde_json::to_string_pretty(&result)?;
        tokio::fs::write(path, body)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        note_success(&format!("Saved {}", path.display()));
    }

    Ok(ExitCode::SUCCESS)
}

/// Note to print beside the rendered result.
///
/// Errors the backend reports inside a result are already part of the report.
fn outcome_notice(snapshot: &ControllerSnapshot) -> Option<&str> {
    if snapshot.simulated {
        snapshot.error.as_deref()
    } else {
        None
    }
}

fn print_result(result: &SubmissionResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print!("{}", render_result(result, supports_color()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackscan_core::DEMO_MODE_NOTICE;

    fn failed_body() -> SubmissionResult {
        SubmissionResult {
            success: false,
            target_match: None,
            detections: vec![],
            full_text: "SHIPPING LABEL".into(),
            preprocessing_steps: vec![],
            error: Some("No tracking pattern found".into()),
        }
    }

    #[test]
    fn backend_error_is_reported_once() {
        let result = failed_body();
        let snapshot = ControllerSnapshot::completed(result.clone());
        assert_eq!(outcome_notice(&snapshot), None);

        let rendered = render_result(&result, false);
        assert_eq!(rendered.matches("No tracking pattern found").count(), 1);
    }

    #[test]
    fn simulated_result_carries_demo_notice() {
        let snapshot = ControllerSnapshot::simulated(simulate("label.jpg"));
        assert_eq!(outcome_notice(&snapshot), Some(DEMO_MODE_NOTICE));
    }

    #[test]
    fn api_url_flag_is_parsed_for_submit() {
        let cli = Cli::try_parse_from(["trackscan", "submit", "a.jpg", "--api-url", "not a url"])
            .unwrap();
        let Commands::Submit { api_url, .. } = cli.command else {
            panic!("expected submit");
        };
        let mut config = apply_all_defaults(TrackscanConfig::default());
        assert!(override_base_url(&mut config, api_url.unwrap()).is_err());
    }
}
