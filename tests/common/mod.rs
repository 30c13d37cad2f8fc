//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Manifest used by the binary tests: a clamped default handler, an
/// interactive-only subcommand and a console-only command.
pub const SAMPLE_MANIFEST: &str = r#"
[caller]
sentinel = "CONSOLE"

[[commands]]
name = "test"
description = "Exercise every parser"

[[commands.params]]
name = "int1"
type = "int"
range = { min = 0, max = 10 }

[[commands.params]]
name = "bool"
type = "boolean"

[[commands.params]]
name = "c"
type = "char"

[[commands]]
name = "test test"
interactive_only = true

[[commands.params]]
name = "argument"
type = "string"

[[commands]]
name = "volume"

[[commands.params]]
name = "level"
type = "byte"
range = { min = 0, max = 100, method = "LIMIT" }

[[commands]]
name = "stop"
non_interactive_only = true
"#;

/// Writes `content` to `commands.toml` inside `dir` and returns its path.
pub fn write_manifest(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("commands.toml");
    std::fs::write(&path, content).expect("Failed to write manifest");
    path
}

fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_commandkit"))
}

/// Runs the binary with the given arguments.
pub fn run(args: &[&str]) -> (i32, String, String) {
    run_with_stdin(args, "")
}

/// Runs the binary with the given arguments, feeding `input` on stdin.
pub fn run_with_stdin(args: &[&str], input: &str) -> (i32, String, String) {
    let mut child = Command::new(binary_path())
        .args(args)
        .env_remove("COMMANDKIT_MANIFEST")
        .env("RUST_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute command");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");

    let output = child.wait_with_output().expect("Failed to wait for command");
    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (exit_code, stdout, stderr)
}
