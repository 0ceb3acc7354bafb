// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Ensure external tools (git, npx, gcloud) exist; install missing ones via the host package manager
// role: preflight/dependencies
// inputs: SystemShell seam (OS, availability probe, installer execution); whether the cloud SDK is wanted
// outputs: Toolchain describing which optional tools ended up available
// side_effects: May run the package manager (brew, apt-get, dnf, yum, apk, pacman)
// invariants:
// - a required tool missing after one install attempt is fatal
// - unknown OS / package manager with a missing required tool is fatal
// - the cloud SDK is optional; its absence only disables publishing
// errors: DependencyError naming the tool and the attempted command
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use tracing::{debug, info, warn};

use crate::error::{AuditError, AuditResult};
use crate::util::{run_tool, tool_responds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
  Brew,
  AptGet,
  Dnf,
  Yum,
  Apk,
  Pacman,
}

impl PackageManager {
  pub fn binary(self) -> &'static str {
    match self {
      PackageManager::Brew => "brew",
      PackageManager::AptGet => "apt-get",
      PackageManager::Dnf => "dnf",
      PackageManager::Yum => "yum",
      PackageManager::Apk => "apk",
      PackageManager::Pacman => "pacman",
    }
  }

  /// Families worth probing on `os`, in preference order.
  pub fn candidates(os: &str) -> &'static [PackageManager] {
    match os {
      "macos" => &[PackageManager::Brew],
      "linux" => &[
        PackageManager::AptGet,
        PackageManager::Dnf,
        PackageManager::Yum,
        PackageManager::Apk,
        PackageManager::Pacman,
        PackageManager::Brew,
      ],
      _ => &[],
    }
  }

  fn install_args(self, package: &str, cask: bool) -> Vec<String> {
    let mut args: Vec<String> = match self {
      PackageManager::Brew if cask => vec!["install".into(), "--cask".into()],
      PackageManager::Brew => vec!["install".into()],
      PackageManager::AptGet | PackageManager::Dnf | PackageManager::Yum => vec!["install".into(), "-y".into()],
      PackageManager::Apk => vec!["add".into(), "--no-cache".into()],
      PackageManager::Pacman => vec!["-S".into(), "--noconfirm".into()],
    };
    args.push(package.to_string());
    args
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCommand {
  pub program: String,
  pub args: Vec<String>,
}

impl std::fmt::Display for InstallCommand {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} {}", self.program, self.args.join(" "))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Necessity {
  Required,
  Optional,
}

#[derive(Debug, Clone, Copy)]
pub struct Tool {
  pub name: &'static str,
  pub necessity: Necessity,
  /// Human hint used when no installer applies.
  pub manual_hint: &'static str,
}

pub const GIT: Tool = Tool {
  name: "git",
  necessity: Necessity::Required,
  manual_hint: "install Git from https://git-scm.com/downloads",
};

pub const NPX: Tool = Tool {
  name: "npx",
  necessity: Necessity::Required,
  manual_hint: "install Node.js (which ships npx) from https://nodejs.org",
};

pub const GCLOUD: Tool = Tool {
  name: "gcloud",
  necessity: Necessity::Optional,
  manual_hint: "install the Google Cloud CLI from https://cloud.google.com/sdk/docs/install",
};

impl Tool {
  pub fn install_command(&self, pm: PackageManager) -> Option<InstallCommand> {
    let (package, cask) = match (self.name, pm) {
      ("git", _) => ("git", false),
      ("npx", PackageManager::Brew) => ("node", false),
      ("npx", PackageManager::Dnf) | ("npx", PackageManager::Yum) => ("nodejs", false),
      ("npx", _) => ("npm", false),
      ("gcloud", PackageManager::Brew) => ("google-cloud-sdk", true),
      ("gcloud", PackageManager::AptGet) | ("gcloud", PackageManager::Dnf) | ("gcloud", PackageManager::Yum) => {
        ("google-cloud-cli", false)
      }
      _ => return None,
    };

    Some(InstallCommand {
      program: pm.binary().to_string(),
      args: pm.install_args(package, cask),
    })
  }
}

/// Host seam for probing and installing tools.
pub trait SystemShell {
  fn os(&self) -> &str;
  fn is_available(&self, program: &str) -> bool;
  fn install(&self, cmd: &InstallCommand) -> Result<(), String>;
}

pub struct HostShell;

impl SystemShell for HostShell {
  fn os(&self) -> &str {
    std::env::consts::OS
  }

  fn is_available(&self, program: &str) -> bool {
    tool_responds(program)
  }

  fn install(&self, cmd: &InstallCommand) -> Result<(), String> {
    run_tool(&cmd.program, &cmd.args, None).map(|_| ()).map_err(|e| e.message)
  }
}

/// What the resolver left available for later stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Toolchain {
  pub cloud_sdk: bool,
}

pub fn detect_package_manager(shell: &dyn SystemShell) -> Option<PackageManager> {
  PackageManager::candidates(shell.os())
    .iter()
    .copied()
    .find(|pm| shell.is_available(pm.binary()))
}

fn ensure(shell: &dyn SystemShell, tool: &Tool, pm: &mut Option<Option<PackageManager>>) -> AuditResult<bool> {
  if shell.is_available(tool.name) {
    debug!(tool = tool.name, "tool present");
    return Ok(true);
  }

  let manager = *pm.get_or_insert_with(|| detect_package_manager(shell));
  let cmd = manager.and_then(|m| tool.install_command(m));

  let failure = match cmd {
    None => format!(
      "`{}` is not installed and no supported package manager was found on {}; {}",
      tool.name,
      shell.os(),
      tool.manual_hint
    ),
    Some(cmd) => {
      info!(tool = tool.name, command = %cmd, "installing missing tool");
      match shell.install(&cmd) {
        Ok(()) if shell.is_available(tool.name) => {
          info!(tool = tool.name, "tool installed");
          return Ok(true);
        }
        Ok(()) => format!("`{}` still missing after `{}`; {}", tool.name, cmd, tool.manual_hint),
        Err(e) => format!("`{}` failed: {}; {}", cmd, e, tool.manual_hint),
      }
    }
  };

  match tool.necessity {
    Necessity::Required => Err(AuditError::Dependency(failure)),
    Necessity::Optional => {
      warn!(tool = tool.name, reason = %failure, "optional tool unavailable");
      Ok(false)
    }
  }
}

/// Make sure git and npx exist, and gcloud too when publishing is wanted.
pub fn resolve(shell: &dyn SystemShell, want_cloud_sdk: bool) -> AuditResult<Toolchain> {
  let mut pm: Option<Option<PackageManager>> = None;

  for tool in [GIT, NPX] {
    ensure(shell, &tool, &mut pm)?;
  }

  let cloud_sdk = if want_cloud_sdk {
    ensure(shell, &GCLOUD, &mut pm)?
  } else {
    debug!("no storage key file configured; not resolving gcloud");
    false
  };

  Ok(Toolchain { cloud_sdk })
}
