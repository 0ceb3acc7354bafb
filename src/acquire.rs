// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Materialize the target repository into the run workspace (idempotent)
// role: stage/acquisition
// inputs: RunContext (owner, repo, git host, clone path); verified source-control token
// outputs: Acquisition telling whether a clone happened or an existing tree was reused
// side_effects: Spawns `git clone` into the workspace
// invariants:
// - an existing workspace directory is reused as-is; no clone is attempted
// - a non-directory at the workspace path is an AcquisitionError, never a reuse
// - the token never appears in errors or logs
// errors: AcquisitionError with git stderr (redacted)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

use tracing::info;

use crate::context::RunContext;
use crate::error::{AuditError, AuditResult};
use crate::util::{redact, run_tool};

/// Clone collaborator.
pub trait RepositorySource {
  fn clone_into(&self, url: &str, dest: &Path) -> Result<(), String>;
}

pub struct GitSource;

impl RepositorySource for GitSource {
  fn clone_into(&self, url: &str, dest: &Path) -> Result<(), String> {
    let args: Vec<String> = vec![
      "clone".into(),
      "--quiet".into(),
      url.into(),
      dest.to_string_lossy().to_string(),
    ];
    run_tool("git", &args, None).map(|_| ()).map_err(|e| e.message)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquisition {
  Cloned,
  Reused,
}

/// `https://x-access-token:<token>@<host>/<owner>/<repo>.git`
pub fn authenticated_url(ctx: &RunContext, token: &str) -> String {
  format!(
    "https://x-access-token:{}@{}/{}/{}.git",
    token, ctx.git_host, ctx.owner, ctx.repo_name
  )
}

pub fn acquire(ctx: &RunContext, token: &str, source: &dyn RepositorySource) -> AuditResult<Acquisition> {
  let dest = ctx.workspace();

  if dest.is_dir() {
    info!(path = %dest.display(), "workspace already present; skipping clone");
    return Ok(Acquisition::Reused);
  }
  if dest.exists() {
    return Err(AuditError::Acquisition(format!(
      "workspace path {} exists but is not a directory",
      dest.display()
    )));
  }

  if let Some(parent) = dest.parent() {
    std::fs::create_dir_all(parent)
      .map_err(AuditError::io(format!("creating workspace parent {}", parent.display())))?;
  }

  let url = authenticated_url(ctx, token);
  info!(repo = %format!("{}/{}", ctx.owner, ctx.repo_name), "cloning");

  source
    .clone_into(&url, dest)
    .map_err(|e| AuditError::Acquisition(redact(&e, token)))?;

  Ok(Acquisition::Cloned)
}
