// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Scoped guard that removes the run workspace on every exit path
// role: resource/cleanup
// inputs: Workspace path
// outputs: None; removal happens in Drop
// side_effects: Recursively deletes the workspace directory
// invariants:
// - created before any side-effecting stage; dropped after the last one
// - removal failures are logged, never raised or panicked on
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

pub struct WorkspaceGuard {
  path: PathBuf,
}

impl WorkspaceGuard {
  pub fn register(path: &Path) -> Self {
    debug!(path = %path.display(), "workspace cleanup registered");
    Self { path: path.to_path_buf() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl Drop for WorkspaceGuard {
  fn drop(&mut self) {
    if !self.path.exists() {
      return;
    }
    match std::fs::remove_dir_all(&self.path) {
      Ok(()) => debug!(path = %self.path.display(), "workspace removed"),
      Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove workspace"),
    }
  }
}
