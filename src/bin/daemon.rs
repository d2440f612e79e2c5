//! Entry point for one daemon process, bound to a single document path
//! (§4.9). Spawned detached by `hwpcore::daemon::launcher::ensure_daemon`;
//! not meant to be run interactively.

use std::path::PathBuf;

use hwpcore::config::DaemonConfig;
use hwpcore::daemon;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path = match std::env::args().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => {
            eprintln!("usage: hwpcore-daemon <path>");
            std::process::exit(2);
        }
    };

    let config = DaemonConfig::from_env();
    if let Err(e) = daemon::run(path, config).await {
        tracing::error!(error = %e, "daemon exited with an error");
        std::process::exit(1);
    }
}
