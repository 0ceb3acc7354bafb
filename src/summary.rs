// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Produce the single-text summary of the workspace tree via the external summarizer
// role: stage/summarization
// inputs: Workspace path; static ExclusionPolicy
// outputs: Path to the summary artifact inside the workspace
// side_effects: Writes the ignore descriptor into the workspace; spawns `npx repomix`
// invariants:
// - the descriptor is written before the summarizer starts
// - exactly one artifact named SUMMARY_FILE is expected; its absence is fatal
// errors: SummarizationError (summarizer stderr is passed through unclassified)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{AuditError, AuditResult};
use crate::util::run_tool;

pub const SUMMARY_FILE: &str = "repomix-output.txt";
pub const POLICY_FILE: &str = ".repomixignore";

/// Globs the summarizer must leave out.
#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
  pub patterns: &'static [&'static str],
}

pub const DEFAULT_EXCLUSIONS: ExclusionPolicy = ExclusionPolicy {
  patterns: &[
    "**/.git/**",
    "**/node_modules/**",
    "**/vendor/**",
    "**/dist/**",
    "**/build/**",
    "**/target/**",
    "**/coverage/**",
    "**/*.lock",
    "**/package-lock.json",
    "**/yarn.lock",
    "**/*.min.js",
    "**/*.map",
    "**/*.png",
    "**/*.jpg",
    "**/*.jpeg",
    "**/*.gif",
    "**/*.svg",
    "**/*.ico",
    "**/*.pdf",
    "**/*.zip",
    "**/*.jar",
    "**/*.woff",
    "**/*.woff2",
    "**/*.ttf",
    "**/*.mp4",
  ],
};

impl ExclusionPolicy {
  /// Ignore-file body; also hides the summarizer's own files.
  pub fn descriptor(&self) -> String {
    let mut out = String::new();
    for p in self.patterns.iter().chain([POLICY_FILE, SUMMARY_FILE].iter()) {
      out.push_str(p);
      out.push('\n');
    }
    out
  }

  pub fn write_into(&self, workspace: &Path) -> AuditResult<PathBuf> {
    let path = workspace.join(POLICY_FILE);
    std::fs::write(&path, self.descriptor())
      .map_err(AuditError::io(format!("writing exclusion policy {}", path.display())))?;
    Ok(path)
  }
}

/// Summarizer collaborator: runs inside `workspace` and leaves artifacts there.
pub trait Summarizer {
  fn run(&self, workspace: &Path) -> Result<(), String>;
}

/// `npx --yes repomix` confined to the workspace.
pub struct Repomix;

impl Summarizer for Repomix {
  fn run(&self, workspace: &Path) -> Result<(), String> {
    let args: Vec<String> = vec![
      "--yes".into(),
      "repomix".into(),
      "--style".into(),
      "plain".into(),
      "--output".into(),
      SUMMARY_FILE.into(),
      ".".into(),
    ];
    run_tool("npx", &args, Some(workspace)).map(|_| ()).map_err(|e| e.message)
  }
}

pub fn summarize(workspace: &Path, policy: &ExclusionPolicy, summarizer: &dyn Summarizer) -> AuditResult<PathBuf> {
  let descriptor = policy.write_into(workspace)?;
  debug!(path = %descriptor.display(), patterns = policy.patterns.len(), "exclusion policy written");

  info!("summarizing repository tree");
  summarizer.run(workspace).map_err(AuditError::Summarization)?;

  let artifact = workspace.join(SUMMARY_FILE);
  if !artifact.is_file() {
    return Err(AuditError::Summarization(format!(
      "expected {} after summarizer run, found nothing",
      artifact.display()
    )));
  }

  Ok(artifact)
}
