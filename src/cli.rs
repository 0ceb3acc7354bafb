use clap::Parser;
use std::path::PathBuf;

use crate::context::{self, RunContext, Settings};
use crate::credentials::Credentials;
use crate::error::AuditResult;
use crate::util;

#[derive(Parser, Debug)]
#[command(
    name = "config-audit",
    version,
    about = "Audit a repository's environment-specific configuration into a CSV report",
    long_about = None
)]
pub struct Cli {
  /// Repository name (without owner), e.g. billing-api
  #[arg(required_unless_present = "gen_man")]
  pub repository: Option<String>,

  /// Owner or organization of the repository
  #[arg(long, env = "CONFIG_AUDIT_OWNER")]
  pub owner: Option<String>,

  /// Source-control token used for the clone
  #[arg(long = "github-token", env = "GITHUB_TOKEN", hide_env_values = true)]
  pub github_token: Option<String>,

  /// API key for the AI service
  #[arg(long = "api-key", env = "GEMINI_API_KEY", hide_env_values = true)]
  pub api_key: Option<String>,

  /// Service-account key file; enables publishing when the cloud SDK is present
  #[arg(long = "key-file", env = "GOOGLE_APPLICATION_CREDENTIALS")]
  pub key_file: Option<PathBuf>,

  /// Destination bucket for published reports
  #[arg(long, env = "CONFIG_AUDIT_BUCKET", default_value = context::DEFAULT_BUCKET)]
  pub bucket: String,

  /// Model used for extraction
  #[arg(long, env = "CONFIG_AUDIT_MODEL", default_value = context::DEFAULT_MODEL)]
  pub model: String,

  /// Parent directory for the ephemeral workspace (default: <tmp>/config-audit)
  #[arg(long, env = "CONFIG_AUDIT_WORKDIR")]
  pub workdir: Option<PathBuf>,

  /// Directory for the local <repository>.csv report
  #[arg(long = "out-dir", env = "CONFIG_AUDIT_OUT_DIR", default_value = ".")]
  pub out_dir: PathBuf,

  /// Debug-level logging (RUST_LOG still wins when set)
  #[arg(short, long)]
  pub verbose: bool,

  /// Emit JSON-formatted log lines
  #[arg(long)]
  pub json: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Skip dependency checks and installs (hidden; tests only)
  #[arg(long, hide = true)]
  pub skip_preflight: bool,

  /// Override the AI service base URL (hidden; tests only)
  #[arg(long, hide = true, env = "CONFIG_AUDIT_AI_ENDPOINT", default_value = context::DEFAULT_AI_ENDPOINT)]
  pub ai_endpoint: String,
}

#[derive(Debug)]
pub struct EffectiveConfig {
  pub ctx: RunContext,
  pub credentials: Credentials,
  pub preflight: bool,
}

pub fn normalize(cli: Cli) -> AuditResult<EffectiveConfig> {
  let repository = cli.repository.unwrap_or_default();

  let workdir = cli
    .workdir
    .unwrap_or_else(|| std::env::temp_dir().join("config-audit"));

  let mut settings = Settings::new(
    cli.owner.unwrap_or_default(),
    util::canonicalize_lossy(&workdir),
    util::canonicalize_lossy(&cli.out_dir),
  );
  settings.bucket = cli.bucket;
  settings.model = cli.model;
  settings.ai_endpoint = cli.ai_endpoint;

  let ctx = RunContext::new(repository.trim(), settings)?;

  let credentials = Credentials {
    github_token: cli.github_token,
    api_key: cli.api_key,
    key_file: cli.key_file,
  };

  Ok(EffectiveConfig {
    ctx,
    credentials,
    preflight: !cli.skip_preflight,
  })
}
