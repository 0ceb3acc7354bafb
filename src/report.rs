// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Clean the model's text into report lines, judge its quality, and write <repo>.csv
// role: model/report
// inputs: Extracted model text; output path
// outputs: CleanedReport; local CSV file
// side_effects: write_to creates parent directories and the report file
// invariants:
// - clean_text is pure and idempotent
// - cleaned lines are never blank and never start with a code fence at either boundary
// - a report with <= 1 line is a quality warning, not an error
// errors: Io on write
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

const FENCE: &str = "```";

fn is_fence(line: &str) -> bool {
  line.trim_start().starts_with(FENCE)
}

/// Drop blank lines, then peel code-fence lines off both ends.
pub fn clean_text(raw: &str) -> Vec<String> {
  let mut lines: Vec<&str> = raw
    .lines()
    .map(|l| l.trim_end_matches('\r'))
    .filter(|l| !l.trim().is_empty())
    .collect();

  while lines.first().is_some_and(|l| is_fence(l)) {
    lines.remove(0);
  }
  while lines.last().is_some_and(|l| is_fence(l)) {
    lines.pop();
  }

  lines.into_iter().map(str::to_string).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedReport {
  pub lines: Vec<String>,
}

impl CleanedReport {
  pub fn from_model_text(raw: &str) -> Self {
    Self { lines: clean_text(raw) }
  }

  pub fn header(&self) -> Option<&str> {
    self.lines.first().map(String::as_str)
  }

  pub fn row_count(&self) -> usize {
    self.lines.len().saturating_sub(1)
  }

  /// Header-only or empty: nothing relevant was found.
  pub fn is_low_quality(&self) -> bool {
    self.lines.len() <= 1
  }

  pub fn render(&self) -> String {
    if self.lines.is_empty() {
      return String::new();
    }
    let mut out = self.lines.join("\n");
    out.push('\n');
    out
  }

  pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent)?;
      }
    }
    std::fs::write(path, self.render())
  }
}
