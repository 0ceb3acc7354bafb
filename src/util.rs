// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for paths, subprocess invocation, secret redaction, and man page rendering
// role: utilities/helpers
// inputs: Various primitives; paths; clap CommandFactory
// outputs: Canonicalized paths, captured subprocess output, redacted strings, man page text
// side_effects: run_tool and tool_responds spawn subprocesses
// invariants:
// - run_tool errors carry the program name, args and stderr, never stdout
// - redact never leaves the secret substring in its output
// errors: Spawn failures and non-zero exits are surfaced as ToolFailure
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use clap::CommandFactory;

pub fn canonicalize_lossy<P: AsRef<Path>>(p: P) -> PathBuf {
  let p = p.as_ref();
  match std::fs::canonicalize(p) {
    Ok(x) => x,
    Err(_) => match std::env::current_dir() {
      Ok(cwd) => cwd.join(p),
      Err(_) => PathBuf::from(p),
    },
  }
}

/// Failure of an external program, already rendered for humans.
#[derive(Debug)]
pub struct ToolFailure {
  pub message: String,
}

impl std::fmt::Display for ToolFailure {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.message)
  }
}

/// Run `program args...` (optionally inside `cwd`) and return its stdout.
pub fn run_tool(program: &str, args: &[String], cwd: Option<&Path>) -> Result<String, ToolFailure> {
  let mut cmd = Command::new(program);
  cmd.args(args).stdin(Stdio::null());
  if let Some(dir) = cwd {
    cmd.current_dir(dir);
  }

  let out = cmd.output().map_err(|e| ToolFailure {
    message: format!("spawning {} {:?}: {}", program, args, e),
  })?;

  if out.status.success() {
    Ok(String::from_utf8_lossy(&out.stdout).to_string())
  } else {
    let stderr = String::from_utf8_lossy(&out.stderr);
    Err(ToolFailure {
      message: format!("{} {:?} failed ({}): {}", program, args, out.status, stderr.trim()),
    })
  }
}

/// True when `program --version` can be spawned and exits 0.
pub fn tool_responds(program: &str) -> bool {
  Command::new(program)
    .arg("--version")
    .stdin(Stdio::null())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .status()
    .map(|st| st.success())
    .unwrap_or(false)
}

/// Replace every occurrence of `secret` in `text`.
pub fn redact(text: &str, secret: &str) -> String {
  if secret.is_empty() {
    return text.to_string();
  }
  text.replace(secret, "***")
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
