use std::path::Path;
use std::process::Output;

use tokio::process::Command;

/// Run the CLI binary against an isolated data directory.
///
/// Connection settings come from the environment so every test starts
/// from the same clean slate regardless of the caller's shell.
pub async fn run_cli(args: &[&str], data_dir: &Path, api_url: &str, identity_url: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_portal"));
    cmd.args(args);
    cmd.env("PORTAL_DATA_DIR", data_dir);
    cmd.env("PORTAL_API_URL", api_url);
    cmd.env("PORTAL_IDENTITY_URL", identity_url);
    cmd.env_remove("PORTAL_CUSTOM_TOKEN");
    cmd.env_remove("RUST_LOG");
    cmd.output().await.expect("Failed to execute CLI")
}

/// Run the CLI and expect success, returning stdout.
pub async fn run_cli_success(
    args: &[&str],
    data_dir: &Path,
    api_url: &str,
    identity_url: &str,
) -> String {
    let output = run_cli(args, data_dir, api_url, identity_url).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Read the raw storage file, if any.
pub fn read_storage(data_dir: &Path) -> Option<serde_json::Value> {
    let contents = std::fs::read_to_string(data_dir.join("storage.json")).ok()?;
    serde_json::from_str(&contents).ok()
}
