#![warn(missing_docs)]
//! # sortify binary
//!
//! Command-line panel: classifies one mail item and draws the risk gauge,
//! or drafts a support referral for it.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sortify_app::config::{
    ENDPOINT_VAR, INSECURE_HTTP_VAR, LOG_VAR, POLICY_VAR, SUPPORT_ADDRESS_VAR, TIMEOUT_VAR,
    parse_timeout_secs,
};
use sortify_app::render::{JsonSink, TextGaugeSink};
use sortify_app::telemetry::init_tracing;
use sortify_app::{
    AppConfig, ClassificationSession, ClassifyOutcome, SupportReferral, app_version,
    prepare_support_referral,
};
use sortify_gauge::GaugePolicy;
use sortify_host::{FileMailHost, MailHost, StdinMailHost};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "sortify", version, about = "Email risk classification panel")]
struct Cli {
    /// Classification endpoint (overrides SORTIFY_ENDPOINT).
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Request timeout in seconds (overrides SORTIFY_TIMEOUT_SECS).
    #[arg(long, global = true, value_parser = parse_timeout_arg)]
    timeout_secs: Option<Duration>,

    /// Gauge policy: categorical or banded (overrides SORTIFY_GAUGE_POLICY).
    #[arg(long, global = true)]
    policy: Option<GaugePolicy>,

    /// Allow plain http endpoints.
    #[arg(long, global = true)]
    allow_insecure_http: bool,

    /// Palette override file (overrides SORTIFY_PALETTE_PATH).
    #[arg(long, global = true)]
    palette: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify a mail document and draw the gauge.
    Classify {
        /// Mail document; reads stdin when omitted.
        file: Option<PathBuf>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Draft a support referral for a mail document.
    Support {
        /// Mail document to forward.
        file: PathBuf,

        /// Referral recipient (overrides SORTIFY_SUPPORT_ADDRESS).
        #[arg(long)]
        to: Option<String>,

        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Print the panel version.
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_timeout_arg(raw: &str) -> Result<Duration, String> {
    parse_timeout_secs(raw).map_err(|error| error.to_string())
}

impl Cli {
    /// Command-line value for an environment variable, if one was given.
    fn override_for(&self, key: &str) -> Option<String> {
        match key {
            ENDPOINT_VAR => self.endpoint.clone(),
            TIMEOUT_VAR => self.timeout_secs.map(|timeout| timeout.as_secs().to_string()),
            POLICY_VAR => self.policy.map(|policy| policy.to_string()),
            INSECURE_HTTP_VAR => self.allow_insecure_http.then(|| "true".to_string()),
            SUPPORT_ADDRESS_VAR => match &self.command {
                Command::Support { to, .. } => to.clone(),
                _ => None,
            },
            LOG_VAR => self.log.clone(),
            _ => None,
        }
    }

    /// Loads configuration with command-line values taking precedence.
    fn load_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::from_env_with(|key| self.override_for(key))
            .context("failed to load configuration")?;
        if let Some(palette) = &self.palette {
            config.palette_path = Some(palette.clone());
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    if let Err(error) = init_tracing(&config.log_level) {
        eprintln!("warning: tracing not initialized: {error}");
    }

    match &cli.command {
        Command::Classify { file, format } => run_classify(&config, file.clone(), *format).await,
        Command::Support { file, yes, .. } => run_support(&config, file.clone(), *yes).await,
        Command::Version => {
            println!("sortify {}", app_version());
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_classify(
    config: &AppConfig,
    file: Option<PathBuf>,
    format: OutputFormat,
) -> Result<ExitCode> {
    let palette = config.load_palette().context("failed to load palette")?;
    let session = ClassificationSession::from_config(config)
        .context("failed to build classification client")?;
    let host: Box<dyn MailHost> = match file {
        Some(path) => Box::new(FileMailHost::new(path)),
        None => Box::new(StdinMailHost),
    };

    info!(
        stage = "startup",
        action = "classify",
        version = app_version(),
        policy = %config.policy
    );

    let outcome = match format {
        OutputFormat::Text => {
            let mut sink = TextGaugeSink::new(std::io::stdout().lock(), palette);
            let outcome = session.classify_active_item(host.as_ref(), &mut sink).await;
            sink.finish().context("failed to write gauge")?;
            outcome
        }
        OutputFormat::Json => {
            let mut sink = JsonSink::new(palette);
            let outcome = session.classify_active_item(host.as_ref(), &mut sink).await;
            let rendered = serde_json::to_string_pretty(&sink.document())
                .context("failed to encode panel document")?;
            println!("{rendered}");
            outcome
        }
    };

    Ok(exit_code(&outcome))
}

async fn run_support(config: &AppConfig, file: PathBuf, yes: bool) -> Result<ExitCode> {
    let host = FileMailHost::new(&file);
    let Some(referral) = prepare_support_referral(&host, &config.support_address).await? else {
        eprintln!("No email item is open: {} was not found.", file.display());
        return Ok(ExitCode::FAILURE);
    };

    if !yes && !confirm(&referral).await? {
        println!("Support referral cancelled.");
        return Ok(ExitCode::SUCCESS);
    }

    let rendered =
        serde_json::to_string_pretty(&referral).context("failed to encode support referral")?;
    println!("{rendered}");
    Ok(ExitCode::SUCCESS)
}

async fn confirm(referral: &SupportReferral) -> Result<bool> {
    eprintln!(
        "Forward this email to {} for manual verification? [y/N]",
        referral.to.join(", ")
    );
    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn exit_code(outcome: &ClassifyOutcome) -> ExitCode {
    if outcome.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use sortify_app::telemetry::filter_directives;

    use super::*;

    fn config_with(cli: &Cli, env: &[(&str, &str)]) -> Result<AppConfig, sortify_app::ConfigError> {
        let env: HashMap<&str, &str> = env.iter().copied().collect();
        AppConfig::from_lookup(|key| {
            cli.override_for(key)
                .or_else(|| env.get(key).map(|value| value.to_string()))
        })
    }

    #[test]
    fn log_flag_beats_sortify_log() {
        let cli = Cli::try_parse_from(["sortify", "--log", "debug", "version"])
            .expect("arguments should parse");
        let config = config_with(&cli, &[("SORTIFY_LOG", "warn")]).expect("config should load");

        assert_eq!(config.log_level, "debug");
        assert_eq!(filter_directives(None, &config.log_level), "debug");
    }

    #[test]
    fn flags_replace_invalid_env_values_before_validation() {
        let cli = Cli::try_parse_from([
            "sortify",
            "--timeout-secs",
            "3",
            "--policy",
            "banded",
            "classify",
        ])
        .expect("arguments should parse");
        let config = config_with(
            &cli,
            &[("SORTIFY_TIMEOUT_SECS", "soon"), ("SORTIFY_GAUGE_POLICY", "continuous")],
        )
        .expect("flags should shadow invalid env values");

        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.policy, GaugePolicy::Banded);
    }

    #[test]
    fn env_values_apply_without_flags() {
        let cli =
            Cli::try_parse_from(["sortify", "support", "mail.eml", "--to", "desk@example.test"])
                .expect("arguments should parse");
        let env = [("SORTIFY_ENDPOINT", "https://alt.example.test/classify")];
        let config = config_with(&cli, &env).expect("config should load");

        assert_eq!(config.endpoint, "https://alt.example.test/classify");
        assert_eq!(config.support_address, "desk@example.test");
        assert!(!config.allow_insecure_http);
        assert!(config_with(&cli, &[("SORTIFY_TIMEOUT_SECS", "0")]).is_err());
    }
}
