// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Send the extraction request to the AI service once and validate its reply
// role: stage/ai-call
// inputs: ExtractionRequest; RunContext (endpoint, model); verified API key
// outputs: Extracted text from candidates.0.content.parts.0.text
// side_effects: One HTTPS POST via ureq
// invariants:
// - exactly one attempt; no retry, no backoff
// - no response (or a body cut off mid-read) => Transport; non-200 => Application with the raw body verbatim
// - body bytes are decoded lossily, never dropped
// - 200 with missing/null/blank text => Content
// - the API key travels in a header, never in the URL
// errors: AuditError::{Transport, Application, Content}
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Read;

use tracing::{debug, info};

use crate::context::RunContext;
use crate::error::{AuditError, AuditResult};
use crate::ext::serde_json::JsonFetch;
use crate::request::ExtractionRequest;

pub const TEXT_PATH: &str = "candidates.0.content.parts.0.text";

/// Raw reply: whatever status and body came back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
  pub status: u16,
  pub body: String,
}

/// AI collaborator. `Err` is reserved for "no response at all".
pub trait ModelClient {
  fn generate(&self, request: &ExtractionRequest) -> AuditResult<RawReply>;
}

pub struct GeminiClient {
  agent: ureq::Agent,
  url: String,
  api_key: String,
}

impl GeminiClient {
  pub fn new(ctx: &RunContext, api_key: &str) -> Self {
    Self {
      agent: ureq::AgentBuilder::new().build(),
      url: format!("{}/models/{}:generateContent", ctx.ai_endpoint, ctx.model),
      api_key: api_key.to_string(),
    }
  }
}

/// Body bytes decoded lossily; a non-UTF-8 error page still reaches the user.
fn read_body(resp: ureq::Response) -> std::io::Result<String> {
  let mut raw = Vec::new();
  resp.into_reader().read_to_end(&mut raw)?;
  Ok(String::from_utf8_lossy(&raw).into_owned())
}

fn body_read_failed(status: u16) -> impl FnOnce(std::io::Error) -> AuditError {
  move |e| AuditError::Transport(format!("HTTP {} response body could not be read: {}", status, e))
}

impl ModelClient for GeminiClient {
  fn generate(&self, request: &ExtractionRequest) -> AuditResult<RawReply> {
    let body = request
      .envelope_bytes()
      .map_err(|e| AuditError::io("encoding request envelope")(e.into()))?;
    info!(url = %self.url, bytes = body.len(), "calling AI service");

    let result = self
      .agent
      .post(&self.url)
      .set("Content-Type", "application/json")
      .set("User-Agent", "config-audit")
      .set("x-goog-api-key", &self.api_key)
      .send_bytes(&body);

    match result {
      Ok(resp) | Err(ureq::Error::Status(_, resp)) => {
        let status = resp.status();
        let body = read_body(resp).map_err(body_read_failed(status))?;
        debug!(status, bytes = body.len(), "AI service replied");
        Ok(RawReply { status, body })
      }
      Err(ureq::Error::Transport(t)) => Err(AuditError::Transport(t.to_string())),
    }
  }
}

/// Validate a reply and pull out the model's text.
pub fn interpret_reply(reply: &RawReply) -> AuditResult<String> {
  if reply.status != 200 {
    return Err(AuditError::Application {
      status: reply.status,
      body: reply.body.clone(),
    });
  }

  let parsed: serde_json::Value = serde_json::from_str(&reply.body)
    .map_err(|e| AuditError::Content(format!("HTTP 200 body is not JSON: {}", e)))?;

  let text = parsed.fetch(TEXT_PATH).to_text().unwrap_or("");
  if text.trim().is_empty() {
    let reason = parsed
      .fetch("promptFeedback.blockReason")
      .to::<String>()
      .or_else(|| parsed.fetch("candidates.0.finishReason").to::<String>());
    return Err(AuditError::Content(match reason {
      Some(r) => format!("{} is null or empty (reason: {})", TEXT_PATH, r),
      None => format!("{} is null or empty", TEXT_PATH),
    }));
  }

  debug!(chars = text.len(), "extracted model text");
  Ok(text.to_string())
}
