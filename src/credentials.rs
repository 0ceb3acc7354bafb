// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Hold run secrets and gate the pipeline on their presence before any side effect
// role: preflight/credentials
// inputs: GITHUB_TOKEN, GEMINI_API_KEY, optional GOOGLE_APPLICATION_CREDENTIALS (via the CLI layer)
// outputs: Verified borrowed view of the secrets
// invariants:
// - Debug output never prints a secret
// - a configured key file must exist when the gate passes
// errors: CredentialError naming the missing variable
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use crate::error::{AuditError, AuditResult};

pub const TOKEN_VAR: &str = "GITHUB_TOKEN";
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const KEY_FILE_VAR: &str = "GOOGLE_APPLICATION_CREDENTIALS";

#[derive(Clone, Default)]
pub struct Credentials {
  pub github_token: Option<String>,
  pub api_key: Option<String>,
  pub key_file: Option<PathBuf>,
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mask = |v: &Option<String>| v.as_ref().map(|_| "<set>").unwrap_or("<unset>");
    f.debug_struct("Credentials")
      .field("github_token", &mask(&self.github_token))
      .field("api_key", &mask(&self.api_key))
      .field("key_file", &self.key_file)
      .finish()
  }
}

/// Secrets after the gate has passed.
#[derive(Clone, Copy)]
pub struct Verified<'a> {
  pub github_token: &'a str,
  pub api_key: &'a str,
  pub key_file: Option<&'a Path>,
}

impl std::fmt::Debug for Verified<'_> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Verified").field("key_file", &self.key_file).finish_non_exhaustive()
  }
}

fn present<'a>(value: &'a Option<String>, var: &str) -> AuditResult<&'a str> {
  match value.as_deref().map(str::trim) {
    Some(v) if !v.is_empty() => Ok(v),
    _ => Err(AuditError::Credential(format!("{} is not set", var))),
  }
}

impl Credentials {
  pub fn gate(&self) -> AuditResult<Verified<'_>> {
    let github_token = present(&self.github_token, TOKEN_VAR)?;
    let api_key = present(&self.api_key, API_KEY_VAR)?;

    let key_file = match self.key_file.as_deref() {
      Some(p) if p.as_os_str().is_empty() => None,
      Some(p) if !p.is_file() => {
        return Err(AuditError::Credential(format!(
          "{} points to {} which does not exist",
          KEY_FILE_VAR,
          p.display()
        )));
      }
      other => other,
    };

    Ok(Verified { github_token, api_key, key_file })
  }
}
