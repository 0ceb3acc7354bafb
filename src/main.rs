use anyhow::Result;
use clap::Parser;
use tracing::info;

use config_audit::cli::{normalize, Cli};
use config_audit::{logging, pipeline, util};

fn main() -> Result<()> {
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(e) => {
      // help/version go to stdout and succeed; everything else is a usage error
      let code = if e.use_stderr() { 1 } else { 0 };
      let _ = e.print();
      std::process::exit(code);
    }
  };

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  logging::init(cli.verbose, cli.json);

  // Phase 1: normalize CLI into the immutable run configuration
  let cfg = normalize(cli)?;

  // Phase 2: run; workspace cleanup happens inside before any error reaches here
  let tools = pipeline::Collaborators::live(&cfg.ctx, &cfg.credentials, cfg.preflight);
  let outcome = pipeline::run(&cfg.ctx, &cfg.credentials, &tools)?;

  match (&outcome.publish, &outcome.report_path) {
    (Some(p), _) => info!(uri = %p.uri, rows = outcome.row_count, "report published"),
    (None, Some(path)) => info!(path = %path.display(), rows = outcome.row_count, "report kept locally"),
    (None, None) => {}
  }

  Ok(())
}
