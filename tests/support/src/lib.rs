//! test-support: helpers for robust, nextest-friendly tests.
//!
//! Add as a dev-dependency in your top-level `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test_support = { path = "tests/support" }
//! ```
//!
//! Then in tests:
//! ```rust
//! use test_support::{init_tracing, init_fixture_repo};
//!
//! #[test]
//! fn example() {
//!     init_tracing();
//!     let _repo = init_fixture_repo();
//! }
//! ```

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::Command;
use std::thread::JoinHandle;

/// Initialize `tracing` once, honoring `RUST_LOG` and writing via the test writer.
///
/// Safe to call from multiple tests; only the first call configures the global subscriber.
pub fn init_tracing() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("warn,config_audit=debug"))
            .unwrap();
        // with_test_writer() causes logs to appear alongside failing tests only (cargo/nextest)
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    });
    Lazy::force(&INIT);
}

/// Create a temp directory that deletes on drop.
pub fn tempdir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create tempdir")
}

/// Run a binary target with `assert_cmd`, returning the ready-to-run `Command`.
///
/// Secrets and config-audit settings inherited from the developer's shell are
/// removed so tests only see what they set explicitly.
pub fn cmd_bin(bin: &str) -> assert_cmd::Command {
    init_tracing();
    let mut cmd = assert_cmd::Command::cargo_bin(bin).expect("binary target not found");
    for var in [
        "GITHUB_TOKEN",
        "GEMINI_API_KEY",
        "GOOGLE_APPLICATION_CREDENTIALS",
        "CONFIG_AUDIT_OWNER",
        "CONFIG_AUDIT_BUCKET",
        "CONFIG_AUDIT_MODEL",
        "CONFIG_AUDIT_WORKDIR",
        "CONFIG_AUDIT_OUT_DIR",
        "CONFIG_AUDIT_AI_ENDPOINT",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

pub fn run(repo: &Path, args: &[&str]) {
    let status = Command::new("git").args(args).current_dir(repo).status().unwrap();
    assert!(status.success(), "git {:?} failed", args);
}

/// A small git repository with per-environment configuration files.
pub fn init_fixture_repo() -> tempfile::TempDir {
    let dir = tempdir();

    run(dir.path(), &["init", "-q", "-b", "main"]);
    run(dir.path(), &["config", "user.name", "Fixture Bot"]);
    run(dir.path(), &["config", "user.email", "fixture@example.com"]);
    run(dir.path(), &["config", "commit.gpgsign", "false"]);

    std::fs::create_dir_all(dir.path().join("config")).unwrap();
    std::fs::write(
        dir.path().join("config/application.yml"),
        "server:\n  port: 8080\nspring:\n  datasource:\n    url: ${DB_URL:jdbc:postgresql://localhost/app}\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("config/application-prod.yml"),
        "server:\n  port: 80\nfeatures:\n  new-checkout: true\n",
    )
    .unwrap();
    std::fs::write(dir.path().join(".env.example"), "REDIS_URL=redis://localhost:6379\n").unwrap();

    run(dir.path(), &["add", "."]);
    run(dir.path(), &["commit", "-q", "-m", "chore: add configuration"]);

    dir
}

/// One-shot HTTP server on loopback.
///
/// Answers the first request with `status` and the raw `body` bytes, then
/// exits. Joining the handle yields the request as received (head + body).
pub fn serve_once(status: u16, body: Vec<u8>) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let base = format!("http://{}", listener.local_addr().unwrap());

    let handle = std::thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut head = String::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
            }
            let done = line == "\r\n" || line.is_empty();
            head.push_str(&line);
            if done {
                break;
            }
        }
        let mut req_body = vec![0u8; content_length];
        reader.read_exact(&mut req_body).unwrap();

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            body.len()
        )
        .unwrap();
        stream.write_all(&body).unwrap();
        stream.flush().unwrap();

        head.push_str(&String::from_utf8_lossy(&req_body));
        head
    });

    (base, handle)
}

/// A 200 generateContent reply whose text part is `text`.
pub fn model_reply(text: &str) -> Vec<u8> {
    serde_json::json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
        .to_string()
        .into_bytes()
}
