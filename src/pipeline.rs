// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate one audit run: preflight, acquire, summarize, extract, validate, write, publish
// role: processing/orchestrator
// inputs: RunContext, Credentials, Collaborators (one adapter per external tool or service)
// outputs: RunOutcome (local report path if kept, publish result, row count, quality flag)
// side_effects: Everything the stages do; workspace removal via WorkspaceGuard
// invariants:
// - WorkspaceGuard is created before the first stage and dropped on every return path
// - stages run strictly in order; each external call happens at most once
// - no report file is written unless the AI reply passed validation
// errors: First failing stage's AuditError, unchanged
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::PathBuf;

use tracing::{info, info_span, warn};

use crate::acquire::{self, GitSource, RepositorySource};
use crate::context::RunContext;
use crate::credentials::Credentials;
use crate::deps::{self, HostShell, SystemShell, Toolchain};
use crate::error::{AuditError, AuditResult};
use crate::model_api::{self, GeminiClient, ModelClient};
use crate::publish::{self, GcloudStore, PublishResult, ReportStore};
use crate::report::CleanedReport;
use crate::request;
use crate::summary::{self, Repomix, Summarizer, DEFAULT_EXCLUSIONS};
use crate::workspace::WorkspaceGuard;

/// External collaborators, swappable in tests.
pub struct Collaborators {
  /// `None` skips dependency preflight and assumes no cloud SDK.
  pub shell: Option<Box<dyn SystemShell>>,
  pub source: Box<dyn RepositorySource>,
  pub summarizer: Box<dyn Summarizer>,
  pub model: Box<dyn ModelClient>,
  pub store: Box<dyn ReportStore>,
}

impl Collaborators {
  /// Real tools and services for `ctx`.
  pub fn live(ctx: &RunContext, credentials: &Credentials, preflight: bool) -> Self {
    let api_key = credentials.api_key.clone().unwrap_or_default();
    let shell: Option<Box<dyn SystemShell>> = if preflight { Some(Box::new(HostShell)) } else { None };
    Self {
      shell,
      source: Box::new(GitSource),
      summarizer: Box::new(Repomix),
      model: Box::new(GeminiClient::new(ctx, api_key.trim())),
      store: Box::new(GcloudStore),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
  /// Set when the report stayed on disk (degraded mode).
  pub report_path: Option<PathBuf>,
  pub publish: Option<PublishResult>,
  pub row_count: usize,
  pub quality_warning: bool,
}

pub fn run(ctx: &RunContext, credentials: &Credentials, tools: &Collaborators) -> AuditResult<RunOutcome> {
  let span = info_span!("audit", repo = %ctx.repo_name, owner = %ctx.owner);
  let _enter = span.enter();

  let guard = WorkspaceGuard::register(ctx.workspace());

  let toolchain = match tools.shell.as_deref() {
    Some(shell) => deps::resolve(shell, credentials.key_file.is_some())?,
    None => Toolchain::default(),
  };

  let secrets = credentials.gate()?;

  let acquisition = acquire::acquire(ctx, secrets.github_token, tools.source.as_ref())?;
  info!(?acquisition, path = %guard.path().display(), "repository ready");

  let artifact = summary::summarize(guard.path(), &DEFAULT_EXCLUSIONS, tools.summarizer.as_ref())?;
  let extraction = request::build(&artifact)?;
  info!(prompt_bytes = extraction.prompt.len(), "extraction request built");

  let reply = tools.model.generate(&extraction)?;
  let text = model_api::interpret_reply(&reply)?;

  let report = CleanedReport::from_model_text(&text);
  let quality_warning = report.is_low_quality();
  if quality_warning {
    warn!(lines = report.lines.len(), "report has no data rows; no relevant configuration found");
  }

  report
    .write_to(&ctx.output_path)
    .map_err(AuditError::io(format!("writing report {}", ctx.output_path.display())))?;
  info!(path = %ctx.output_path.display(), rows = report.row_count(), "report written");

  let published = publish::publish(
    ctx,
    &ctx.output_path,
    secrets.key_file,
    toolchain,
    tools.store.as_ref(),
  )?;

  Ok(RunOutcome {
    report_path: if published.is_some() { None } else { Some(ctx.output_path.clone()) },
    publish: published,
    row_count: report.row_count(),
    quality_warning,
  })
}
