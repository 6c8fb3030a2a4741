//! Integration tests for `suishi serve` over stdio.
//! Verifies tool calls round-trip and that closing stdin exits cleanly.

use std::io::Write;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn suishi_binary() -> std::path::PathBuf {
    assert_cmd::cargo::cargo_bin!("suishi").into()
}

fn spawn_serve(home: &TempDir) -> std::process::Child {
    Command::new(suishi_binary())
        .args(["serve", "--today", "2026-02-04"])
        .env("SUISHI_HOME", home.path())
        .env_remove("SUISHI_CONFIG")
        .env_remove("SUISHI_API_KEY")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn suishi serve")
}

/// Send the MCP initialize handshake so the server enters its main loop.
fn mcp_handshake(child: &mut std::process::Child) {
    let stdin = child.stdin.as_mut().expect("stdin pipe");

    let init_req = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": { "name": "test", "version": "0.1.0" }
        }
    });
    send_jsonrpc(stdin, &init_req);
    std::thread::sleep(Duration::from_millis(300));

    let initialized = serde_json::json!({
        "jsonrpc": "2.0",
        "method": "notifications/initialized"
    });
    send_jsonrpc(stdin, &initialized);
    std::thread::sleep(Duration::from_millis(200));
}

/// Newline-delimited JSON-RPC, as rmcp's stdio transport expects.
fn send_jsonrpc(stdin: &mut impl Write, msg: &serde_json::Value) {
    let line = serde_json::to_string(msg).unwrap();
    writeln!(stdin, "{line}").unwrap();
    stdin.flush().unwrap();
}

#[test]
fn serve_exits_on_early_stdin_eof() {
    let dir = TempDir::new().unwrap();
    let mut child = spawn_serve(&dir);
    std::thread::sleep(Duration::from_millis(200));

    drop(child.stdin.take());

    let start = Instant::now();
    let output = child.wait_with_output().expect("wait");
    let elapsed = start.elapsed();

    assert!(
        output.status.success(),
        "early stdin EOF should exit 0, got {}",
        output.status
    );
    assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
}

#[test]
fn current_term_over_stdio() {
    let dir = TempDir::new().unwrap();
    let mut child = spawn_serve(&dir);
    mcp_handshake(&mut child);

    let stdin = child.stdin.as_mut().expect("stdin pipe");
    let call = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": "tools/call",
        "params": { "name": "current_term", "arguments": {} }
    });
    send_jsonrpc(stdin, &call);
    std::thread::sleep(Duration::from_millis(300));

    drop(child.stdin.take());
    let start = Instant::now();
    let output = child.wait_with_output().expect("wait");
    let elapsed = start.elapsed();

    assert!(output.status.success(), "got {}", output.status);
    assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let response = stdout
        .lines()
        .filter_map(|l| serde_json::from_str::<serde_json::Value>(l).ok())
        .find(|v| v["id"] == 2)
        .expect("tools/call response");
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    let payload: serde_json::Value = serde_json::from_str(text).unwrap();
    assert_eq!(payload["term"]["name"], "立春");
    assert_eq!(payload["date"], "2026-02-04");
}
