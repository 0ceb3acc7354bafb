// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Compose the extraction request (fixed instruction + raw summary) and its JSON envelope
// role: stage/request-building
// inputs: Summary artifact path
// outputs: ExtractionRequest; envelope bytes written through serde_json::to_writer
// invariants:
// - prompt text is exactly INSTRUCTION followed by the summary, byte for byte
// - no size cap is applied here; the envelope streams into a writer, never through argv
// errors: Io (naming the artifact path) when the artifact cannot be read
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::{AuditError, AuditResult};

/// CSV header the model is told to emit.
pub const REPORT_HEADER: &str = "key,value,environment,profiles,category,value_type,current_usage";

pub const INSTRUCTION: &str = r#"You are auditing a software repository for dynamic, environment-specific configuration.
The full repository content follows after the line "=== REPOSITORY ===".

Step 1. Find every configuration value that differs per environment or deployment: environment
variables, Spring/Quarkus/Micronaut profiles, application-<env>.yml/properties files, .env files,
Helm values, Kubernetes manifests, Terraform variables, feature flags, docker-compose overrides and
values read at runtime from config servers or secret stores.

Step 2. For each value produce one row with these columns, in this order:
  key           - the configuration key or variable name
  value         - the literal value, or the placeholder/reference exactly as written
  environment   - dev, test, staging, prod, local, default, or the name used in the repository
  profiles      - the profiles or overlays the value applies to, separated by ";"
  category      - one of: database, messaging, cache, security, network, feature-flag, observability, storage, external-service, runtime, other
  value_type    - one of: string, number, boolean, url, duration, secret-reference, list, map
  current_usage - one short sentence describing where and how the value is used in code

Step 3. Group rows by key, then by environment. Remove duplicates: a (key, value, environment, profiles)
combination must appear only once. Never print real secret material; write secret-reference instead.

Step 4. Validate your table three times before answering: every row has exactly seven columns,
fields containing commas or quotes are quoted per RFC 4180, there are no duplicate rows and nothing
was invented that is absent from the repository.

Step 5. Answer with CSV only. The first line must be exactly:
key,value,environment,profiles,category,value_type,current_usage
Do not add commentary, markdown or code fences. If nothing qualifies, answer with the header line only.

=== REPOSITORY ===
"#;

/// Prompt handed to the AI service. Never persisted.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
  pub prompt: String,
}

#[derive(Serialize)]
struct Part<'a> {
  text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
  parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Envelope<'a> {
  contents: [Content<'a>; 1],
}

impl ExtractionRequest {
  pub fn new(summary: &str) -> Self {
    let mut prompt = String::with_capacity(INSTRUCTION.len() + summary.len());
    prompt.push_str(INSTRUCTION);
    prompt.push_str(summary);
    Self { prompt }
  }

  /// Serialize `{"contents":[{"parts":[{"text": prompt}]}]}` into `w`.
  pub fn write_envelope<W: Write>(&self, w: W) -> serde_json::Result<()> {
    let envelope = Envelope {
      contents: [Content { parts: [Part { text: &self.prompt }] }],
    };
    serde_json::to_writer(w, &envelope)
  }

  pub fn envelope_bytes(&self) -> serde_json::Result<Vec<u8>> {
    let mut body = Vec::with_capacity(self.prompt.len() + 64);
    self.write_envelope(&mut body)?;
    Ok(body)
  }
}

/// Read the summary artifact (lossy UTF-8, no size limit) and build the request.
pub fn build(artifact: &Path) -> AuditResult<ExtractionRequest> {
  let raw = std::fs::read(artifact)
    .map_err(AuditError::io(format!("reading summary artifact {}", artifact.display())))?;
  let summary = String::from_utf8_lossy(&raw);
  Ok(ExtractionRequest::new(&summary))
}
