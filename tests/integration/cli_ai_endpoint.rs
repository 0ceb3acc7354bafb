use predicates::prelude::*;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Directory holding an `npx` stand-in that writes the summary artifact in its cwd.
fn fake_npx_dir() -> tempfile::TempDir {
  let dir = test_support::tempdir();
  let script = dir.path().join("npx");
  std::fs::write(
    &script,
    "#!/bin/sh\nprintf 'File: config/application-prod.yml\\nserver:\\n  port: 80\\n' > repomix-output.txt\n",
  )
  .unwrap();
  std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
  dir
}

fn path_with(dir: &Path) -> String {
  match std::env::var("PATH") {
    Ok(p) => format!("{}:{}", dir.display(), p),
    Err(_) => dir.display().to_string(),
  }
}

/// Workspace already present, so the run reuses it instead of cloning.
fn prepared_workdir() -> tempfile::TempDir {
  let work = test_support::tempdir();
  std::fs::create_dir_all(work.path().join("svc/config")).unwrap();
  std::fs::write(work.path().join("svc/config/application-prod.yml"), "server:\n  port: 80\n").unwrap();
  work
}

#[test]
fn ai_endpoint_override_drives_a_local_run() {
  let work = prepared_workdir();
  let out = test_support::tempdir();
  let bin = fake_npx_dir();
  let csv = "key,value,environment,profiles,category,value_type,current_usage\nserver.port,80,prod,prod,network,number,HTTP listen port";
  let (base, server) = test_support::serve_once(200, test_support::model_reply(&format!("```csv\n{}\n```", csv)));

  let mut cmd = test_support::cmd_bin("config-audit");
  cmd
    .args(["svc", "--owner", "acme", "--skip-preflight", "--model", "test-model"])
    .env("CONFIG_AUDIT_AI_ENDPOINT", format!("{}/v1beta", base))
    .env("CONFIG_AUDIT_WORKDIR", work.path())
    .env("CONFIG_AUDIT_OUT_DIR", out.path())
    .env("GITHUB_TOKEN", "ghp_test")
    .env("GEMINI_API_KEY", "AIza_test")
    .env("PATH", path_with(bin.path()))
    .assert()
    .success()
    .stdout(predicate::str::is_empty());

  let seen = server.join().unwrap();
  assert!(seen.starts_with("POST /v1beta/models/test-model:generateContent "));
  assert!(seen.contains("application-prod.yml"));

  let report = std::fs::read_to_string(out.path().join("svc.csv")).unwrap();
  assert_eq!(report, format!("{}\n", csv));
  assert!(!work.path().join("svc").exists());
}

#[test]
fn ai_endpoint_error_page_is_shown_and_nothing_is_written() {
  let work = prepared_workdir();
  let out = test_support::tempdir();
  let bin = fake_npx_dir();
  let (base, server) = test_support::serve_once(502, b"<html>Bad gateway \xe9t\xe9</html>".to_vec());

  let mut cmd = test_support::cmd_bin("config-audit");
  cmd
    .args(["svc", "--owner", "acme", "--skip-preflight", "--ai-endpoint", &base])
    .env("CONFIG_AUDIT_WORKDIR", work.path())
    .env("CONFIG_AUDIT_OUT_DIR", out.path())
    .env("GITHUB_TOKEN", "ghp_test")
    .env("GEMINI_API_KEY", "AIza_test")
    .env("PATH", path_with(bin.path()))
    .assert()
    .code(1)
    .stderr(predicate::str::contains("HTTP 502").and(predicate::str::contains("<html>Bad gateway ")));

  server.join().unwrap();
  assert!(!out.path().join("svc.csv").exists());
  assert!(!work.path().join("svc").exists());
}
