// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Upload the local report to the fixed bucket, or skip in degraded mode
// role: stage/publish
// inputs: RunContext (bucket, storage host, object name); local report path; optional key file; Toolchain
// outputs: Option<PublishResult> (None = skipped); access URL printed to stdout on success
// side_effects: Spawns gcloud auth + gcloud storage cp; deletes the local report after a successful upload
// invariants:
// - skipped entirely unless the cloud SDK is available AND a key file is configured
// - the local report is removed only after a successful upload; a failed removal only warns
// - the printed URL is https://<storage_host>/<bucket>/<repo>.csv
// errors: PublishError for authentication or upload failures (local file kept)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

use tracing::{info, warn};

use crate::context::RunContext;
use crate::deps::Toolchain;
use crate::error::{AuditError, AuditResult};
use crate::util::run_tool;

/// Storage collaborator.
pub trait ReportStore {
  fn authenticate(&self, key_file: &Path) -> Result<(), String>;
  fn upload(&self, local: &Path, destination: &str) -> Result<(), String>;
}

pub struct GcloudStore;

impl ReportStore for GcloudStore {
  fn authenticate(&self, key_file: &Path) -> Result<(), String> {
    let args: Vec<String> = vec![
      "auth".into(),
      "activate-service-account".into(),
      format!("--key-file={}", key_file.display()),
      "--quiet".into(),
    ];
    run_tool("gcloud", &args, None).map(|_| ()).map_err(|e| e.message)
  }

  fn upload(&self, local: &Path, destination: &str) -> Result<(), String> {
    let args: Vec<String> = vec![
      "storage".into(),
      "cp".into(),
      local.to_string_lossy().to_string(),
      destination.into(),
      "--quiet".into(),
    ];
    run_tool("gcloud", &args, None).map(|_| ()).map_err(|e| e.message)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
  pub uri: String,
  pub published: bool,
}

pub fn publish(
  ctx: &RunContext,
  report: &Path,
  key_file: Option<&Path>,
  toolchain: Toolchain,
  store: &dyn ReportStore,
) -> AuditResult<Option<PublishResult>> {
  let key_file = match (toolchain.cloud_sdk, key_file) {
    (true, Some(k)) => k,
    (sdk, key) => {
      let reason = if key.is_none() { "no storage key file configured" } else { "cloud SDK unavailable" };
      warn!(
        reason,
        cloud_sdk = sdk,
        report = %report.display(),
        "skipping publish; report kept locally"
      );
      return Ok(None);
    }
  };

  store
    .authenticate(key_file)
    .map_err(|e| AuditError::Publish(format!("authentication with {} failed: {}", key_file.display(), e)))?;

  let destination = ctx.storage_uri();
  info!(%destination, "uploading report");
  store
    .upload(report, &destination)
    .map_err(|e| AuditError::Publish(format!("upload to {} failed: {}", destination, e)))?;

  let url = ctx.storage_url();
  println!("{}", url);

  // upload succeeded; a removal failure only warns
  if let Err(e) = std::fs::remove_file(report) {
    warn!(error = %e, report = %report.display(), "published, but could not remove local report");
  }

  Ok(Some(PublishResult { uri: url, published: true }))
}
