#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use config_audit::acquire::RepositorySource;
use config_audit::context::{RunContext, Settings};
use config_audit::credentials::Credentials;
use config_audit::deps::{InstallCommand, SystemShell};
use config_audit::error::{AuditError, AuditResult};
use config_audit::model_api::{ModelClient, RawReply};
use config_audit::pipeline::Collaborators;
use config_audit::publish::ReportStore;
use config_audit::request::ExtractionRequest;
use config_audit::summary::{Summarizer, SUMMARY_FILE};

/// Ordered record of every collaborator call made during a run.
pub type Calls = Rc<RefCell<Vec<String>>>;

pub struct FakeSource {
  pub calls: Calls,
  pub fail: bool,
}

impl RepositorySource for FakeSource {
  fn clone_into(&self, _url: &str, dest: &Path) -> Result<(), String> {
    self.calls.borrow_mut().push("clone".into());
    if self.fail {
      return Err("remote: Repository not found.".into());
    }
    std::fs::create_dir_all(dest.join("config")).map_err(|e| e.to_string())?;
    std::fs::write(dest.join("config/application.yml"), "port: 8080\n").map_err(|e| e.to_string())
  }
}

/// Concatenates every file under `config/` into the artifact.
pub struct FakeSummarizer {
  pub calls: Calls,
  pub produce: bool,
}

impl Summarizer for FakeSummarizer {
  fn run(&self, workspace: &Path) -> Result<(), String> {
    self.calls.borrow_mut().push("summarize".into());
    if !self.produce {
      return Ok(());
    }
    let mut text = String::new();
    if let Ok(entries) = std::fs::read_dir(workspace.join("config")) {
      for e in entries.flatten() {
        text.push_str(&format!("File: {}\n", e.file_name().to_string_lossy()));
        text.push_str(&std::fs::read_to_string(e.path()).unwrap_or_default());
      }
    }
    std::fs::write(workspace.join(SUMMARY_FILE), text).map_err(|e| e.to_string())
  }
}

pub enum ModelBehaviour {
  Reply(RawReply),
  Unreachable,
}

pub struct FakeModel {
  pub calls: Calls,
  pub behaviour: ModelBehaviour,
  pub seen_prompts: Rc<RefCell<Vec<String>>>,
}

impl ModelClient for FakeModel {
  fn generate(&self, request: &ExtractionRequest) -> AuditResult<RawReply> {
    self.calls.borrow_mut().push("generate".into());
    self.seen_prompts.borrow_mut().push(request.prompt.clone());
    match &self.behaviour {
      ModelBehaviour::Reply(r) => Ok(r.clone()),
      ModelBehaviour::Unreachable => Err(AuditError::Transport("connection refused".into())),
    }
  }
}

pub struct FakeStore {
  pub calls: Calls,
  pub fail_upload: bool,
}

impl ReportStore for FakeStore {
  fn authenticate(&self, _key_file: &Path) -> Result<(), String> {
    self.calls.borrow_mut().push("auth".into());
    Ok(())
  }

  fn upload(&self, _local: &Path, destination: &str) -> Result<(), String> {
    self.calls.borrow_mut().push(format!("upload {}", destination));
    if self.fail_upload { Err("AccessDeniedException: 403".into()) } else { Ok(()) }
  }
}

/// Every tool present, gcloud included.
pub struct ReadyShell;

impl SystemShell for ReadyShell {
  fn os(&self) -> &str {
    "linux"
  }

  fn is_available(&self, _program: &str) -> bool {
    true
  }

  fn install(&self, cmd: &InstallCommand) -> Result<(), String> {
    Err(format!("unexpected install: {}", cmd))
  }
}

/// 200 reply wrapping `text` at candidates.0.content.parts.0.text.
pub fn model_text(text: &str) -> RawReply {
  let body = serde_json::json!({
    "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }]
  });
  RawReply { status: 200, body: body.to_string() }
}

pub const GOOD_CSV: &str = "```csv\nkey,value,environment,profiles,category,value_type,current_usage\n\nserver.port,8080,default,default,network,number,HTTP listener\nserver.port,80,prod,prod,network,number,HTTP listener\n```\n";

pub struct Harness {
  pub root: tempfile::TempDir,
  pub ctx: RunContext,
  pub credentials: Credentials,
  pub calls: Calls,
  pub prompts: Rc<RefCell<Vec<String>>>,
}

impl Harness {
  pub fn new() -> Self {
    test_support::init_tracing();
    let root = test_support::tempdir();
    let settings = Settings::new("acme", root.path().join("work"), root.path().join("out"));
    let ctx = RunContext::new("billing-api", settings).unwrap();
    let credentials = Credentials {
      github_token: Some("ghp_test_token".into()),
      api_key: Some("AIza_test_key".into()),
      key_file: None,
    };
    Self {
      root,
      ctx,
      credentials,
      calls: Rc::new(RefCell::new(Vec::new())),
      prompts: Rc::new(RefCell::new(Vec::new())),
    }
  }

  /// Write a service-account key file and configure it.
  pub fn with_key_file(mut self) -> Self {
    let key = self.root.path().join("sa.json");
    std::fs::write(&key, "{\"type\":\"service_account\"}").unwrap();
    self.credentials.key_file = Some(key);
    self
  }

  pub fn tools(&self, model: ModelBehaviour) -> Collaborators {
    self.tools_with(model, false, true, false)
  }

  pub fn tools_with(&self, model: ModelBehaviour, clone_fails: bool, summary: bool, upload_fails: bool) -> Collaborators {
    let shell: Option<Box<dyn SystemShell>> = if self.credentials.key_file.is_some() { Some(Box::new(ReadyShell)) } else { None };
    Collaborators {
      shell,
      source: Box::new(FakeSource { calls: self.calls.clone(), fail: clone_fails }),
      summarizer: Box::new(FakeSummarizer { calls: self.calls.clone(), produce: summary }),
      model: Box::new(FakeModel {
        calls: self.calls.clone(),
        behaviour: model,
        seen_prompts: self.prompts.clone(),
      }),
      store: Box::new(FakeStore { calls: self.calls.clone(), fail_upload: upload_fails }),
    }
  }

  pub fn workspace(&self) -> PathBuf {
    self.ctx.clone_path.clone()
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.borrow().clone()
  }
}
