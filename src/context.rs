// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Immutable per-run context (repository identity, workspace and output locations, endpoints)
// role: model/context
// inputs: Validated repository name plus non-secret settings from the CLI layer
// outputs: RunContext threaded by reference through every stage
// invariants:
// - repo_name matches [A-Za-z0-9._-]+ and is neither "." nor ".."
// - clone_path = workdir/<repo_name>; output_path = out_dir/<repo_name>.csv
// - storage_url is deterministic in (storage_host, bucket, repo_name)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AuditError, AuditResult};

pub const DEFAULT_GIT_HOST: &str = "github.com";
pub const DEFAULT_STORAGE_HOST: &str = "storage.googleapis.com";
pub const DEFAULT_BUCKET: &str = "config-audit-reports";
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_AI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

static RE_REPO_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("valid repo name regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
  pub repo_name: String,
  pub owner: String,
  /// Ephemeral workspace holding the clone and summary artifact.
  pub clone_path: PathBuf,
  /// Local `<repo_name>.csv` report location.
  pub output_path: PathBuf,
  pub git_host: String,
  pub storage_host: String,
  pub bucket: String,
  pub model: String,
  pub ai_endpoint: String,
}

/// Non-secret knobs used to build a `RunContext`.
#[derive(Debug, Clone)]
pub struct Settings {
  pub owner: String,
  pub workdir: PathBuf,
  pub out_dir: PathBuf,
  pub git_host: String,
  pub storage_host: String,
  pub bucket: String,
  pub model: String,
  pub ai_endpoint: String,
}

impl Settings {
  pub fn new(owner: impl Into<String>, workdir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
    Self {
      owner: owner.into(),
      workdir: workdir.into(),
      out_dir: out_dir.into(),
      git_host: DEFAULT_GIT_HOST.to_string(),
      storage_host: DEFAULT_STORAGE_HOST.to_string(),
      bucket: DEFAULT_BUCKET.to_string(),
      model: DEFAULT_MODEL.to_string(),
      ai_endpoint: DEFAULT_AI_ENDPOINT.to_string(),
    }
  }
}

pub fn validate_repo_name(name: &str) -> AuditResult<()> {
  if name == "." || name == ".." || !RE_REPO_NAME.is_match(name) {
    return Err(AuditError::Usage(format!(
      "invalid repository name {:?}: expected letters, digits, '.', '_' or '-'",
      name
    )));
  }
  Ok(())
}

impl RunContext {
  pub fn new(repo_name: &str, settings: Settings) -> AuditResult<Self> {
    validate_repo_name(repo_name)?;
    if settings.owner.trim().is_empty() {
      return Err(AuditError::Usage(
        "repository owner is required (--owner or CONFIG_AUDIT_OWNER)".into(),
      ));
    }

    Ok(Self {
      repo_name: repo_name.to_string(),
      owner: settings.owner.trim().to_string(),
      clone_path: settings.workdir.join(repo_name),
      output_path: settings.out_dir.join(format!("{}.csv", repo_name)),
      git_host: settings.git_host,
      storage_host: settings.storage_host,
      bucket: settings.bucket,
      model: settings.model,
      ai_endpoint: settings.ai_endpoint.trim_end_matches('/').to_string(),
    })
  }

  pub fn workspace(&self) -> &Path {
    &self.clone_path
  }

  /// Object name inside the bucket.
  pub fn object_name(&self) -> String {
    format!("{}.csv", self.repo_name)
  }

  pub fn storage_url(&self) -> String {
    format!("https://{}/{}/{}", self.storage_host, self.bucket, self.object_name())
  }

  pub fn storage_uri(&self) -> String {
    format!("gs://{}/{}", self.bucket, self.object_name())
  }
}
