//! Single-threaded cooperative event loop (§4.9, §5): one daemon per
//! canonical document path, serving the wire protocol in `transport` and
//! dispatching through `commands`. `launcher` is the client-side half:
//! discover-or-spawn-and-retry.
//!
//! Each accepted connection runs on its own task so a slow client can't
//! stall frame I/O for anyone else, but every command still funnels through
//! one `mpsc` channel into the single task that owns the `Holder` — that
//! task is the only place the holder is ever touched, so commands across
//! connections are still strictly serialized (§5) without a lock.

pub mod commands;
pub mod launcher;
pub mod state_file;
pub mod transport;

use std::path::PathBuf;

use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::config::DaemonConfig;
use crate::error::{HwpError, Result};
use crate::holder::{DocumentHolder, FlushScheduler, Holder};

use self::state_file::StateFile;
use self::transport::Response;

/// One parsed, token-checked request waiting for the holder-owning task to
/// dispatch it and hand the response back over `respond_to`.
struct Job {
    command: String,
    args: Value,
    respond_to: oneshot::Sender<Response>,
}

/// Runs the daemon for `path` until idle timeout or SIGTERM. Deletes the
/// state file on every exit path, including an error return, so a dead
/// daemon never leaves a stale discovery record behind.
pub async fn run(path: PathBuf, config: DaemonConfig) -> Result<()> {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.map_err(HwpError::Io)?;
    let port = listener.local_addr().map_err(HwpError::Io)?.port();
    let token = state_file::generate_token();
    let state_path = state_file::path_for(&path)?;
    StateFile::new(port, token.clone()).write_atomic(&state_path)?;
    info!(port, path = %path.display(), "daemon listening");

    let mut holder = Holder::open(&path)?;
    let scheduler = FlushScheduler::new(config.flush_debounce);
    let (jobs_tx, jobs_rx) = mpsc::channel::<Job>(32);

    let result = event_loop(&listener, &mut holder, &scheduler, &token, jobs_tx, jobs_rx, config.idle_timeout).await;

    if holder.is_dirty() {
        if let Err(e) = holder.flush() {
            warn!(error = %e, "final flush before exit failed");
        }
    }
    if let Err(e) = std::fs::remove_file(&state_path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(error = %e, "failed to remove state file on exit");
        }
    }
    result
}

#[allow(clippy::too_many_arguments)]
async fn event_loop(
    listener: &TcpListener,
    holder: &mut Holder,
    scheduler: &FlushScheduler,
    token: &str,
    jobs_tx: mpsc::Sender<Job>,
    mut jobs_rx: mpsc::Receiver<Job>,
    idle_timeout: std::time::Duration,
) -> Result<()> {
    loop {
        tokio::select! {
            _ = shutdown_signal() => {
                info!("received shutdown signal");
                return Ok(());
            }
            _ = tokio::time::sleep(idle_timeout) => {
                info!("idle timeout elapsed, exiting");
                return Ok(());
            }
            () = scheduler.wait() => {
                if let Err(e) = holder.flush() {
                    warn!(error = %e, "debounced flush failed");
                }
            }
            job = jobs_rx.recv() => {
                // The sender side is held by every connection task plus
                // this function's own `jobs_tx` clone below, so `None`
                // here would mean every task has dropped — unreachable
                // while `run` is still awaiting this loop.
                if let Some(job) = job {
                    let response = commands::dispatch(holder, &job.command, &job.args).await;
                    holder.schedule_flush(scheduler);
                    let _ = job.respond_to.send(response);
                }
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        let jobs_tx = jobs_tx.clone();
                        let token = token.to_string();
                        tokio::spawn(async move {
                            handle_connection(stream, jobs_tx, token).await;
                        });
                    }
                    Err(e) => warn!(error = %e, "accept failed"),
                }
            }
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(_) => std::future::pending::<()>().await,
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    std::future::pending::<()>().await
}

/// One request, one response, per connection: the client never keeps a
/// connection open past its reply (§5 "client" scheduling model), so this
/// does not loop reading further frames off the same socket. Token checking
/// happens here, off the holder-owning task, since it never touches the
/// holder.
async fn handle_connection(mut stream: TcpStream, jobs_tx: mpsc::Sender<Job>, token: String) {
    let body = match transport::read_frame(&mut stream).await {
        Ok(body) => body,
        Err(e) => {
            debug!(error = %e, "failed to read request frame");
            return;
        }
    };

    let request = match transport::decode_request(&body) {
        Ok(request) => request,
        Err(e) => {
            let _ = send(&mut stream, &Response::from_error(&e)).await;
            return;
        }
    };

    if request.token != token {
        let _ = send(&mut stream, &Response::failure("Unauthorized: invalid token")).await;
        return;
    }

    let (respond_to, response_rx) = oneshot::channel();
    let job = Job { command: request.command, args: request.args, respond_to };
    if jobs_tx.send(job).await.is_err() {
        // The event loop has already exited (idle timeout/SIGTERM raced the
        // accept); nothing more to do for this connection.
        return;
    }

    if let Ok(response) = response_rx.await {
        let _ = send(&mut stream, &response).await;
    }
}

async fn send(stream: &mut TcpStream, response: &Response) -> Result<()> {
    let body = serde_json::to_vec(response).map_err(|e| HwpError::Protocol(e.to_string()))?;
    transport::write_frame(stream, &body).await
}
