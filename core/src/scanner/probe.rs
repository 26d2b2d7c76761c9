// Tool probe - detects whether an external scanning binary is invocable.

use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// True when the binary can be spawned and exits within the probe
/// budget. A non-zero exit still means the tool is installed.
pub async fn is_available(binary: &str) -> bool {
    let child = Command::new(binary)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn();

    let mut child = match child {
        Ok(child) => child,
        Err(_) => return false,
    };

    match timeout(PROBE_TIMEOUT, child.wait()).await {
        Ok(Ok(_status)) => true,
        Ok(Err(_)) => false,
        Err(_) => {
            let _ = child.kill().await;
            false
        }
    }
}
