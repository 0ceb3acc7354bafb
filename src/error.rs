// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Typed failure taxonomy for every pipeline stage
// role: errors/taxonomy
// outputs: AuditError enum (thiserror) consumed by the orchestrator and surfaced by main via anyhow
// invariants:
// - Application keeps the raw response body verbatim in its Display output
// - No variant embeds a secret; callers redact before constructing
// - Io always carries the operation and path it concerns
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
  /// Bad or missing invocation argument
  #[error("usage: {0}")]
  Usage(String),

  /// Required tool missing and could not be installed
  #[error("dependency: {0}")]
  Dependency(String),

  /// Missing secret or missing key file
  #[error("credentials: {0}")]
  Credential(String),

  /// Clone failed (auth, network, not found)
  #[error("clone failed: {0}")]
  Acquisition(String),

  /// Summarizer failed or its artifact is absent
  #[error("summarizer: {0}")]
  Summarization(String),

  /// AI call produced no response at all
  #[error("AI service unreachable: {0}")]
  Transport(String),

  /// AI call answered with a non-200 status
  #[error("AI service returned HTTP {status}: {body}")]
  Application { status: u16, body: String },

  /// AI call succeeded but the extracted text is unusable
  #[error("AI response had no usable text: {0}")]
  Content(String),

  /// Storage authentication or upload failed
  #[error("publish: {0}")]
  Publish(String),

  /// Local file failure; `context` names the operation and path
  #[error("{context}: {source}")]
  Io {
    context: String,
    #[source]
    source: std::io::Error,
  },
}

impl AuditError {
  /// `map_err` adapter for local I/O: `fs::write(&p, b).map_err(AuditError::io(format!("writing {}", p.display())))`.
  pub fn io(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> AuditError {
    let context = context.into();
    move |source| AuditError::Io { context, source }
  }
}

pub type AuditResult<T> = std::result::Result<T, AuditError>;
