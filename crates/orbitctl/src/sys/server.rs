use crate::events::HostEvent;
use async_channel::Sender;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

pub const SOCKET_PATH: &str = "/tmp/orbit.sock";

/// Accepts line commands on the daemon socket and answers each with `ok` or
/// `error: <reason>`.
pub async fn run_server(socket: PathBuf, tx: Sender<HostEvent>) {
    // Cleanup old socket if it exists
    if socket.exists() {
        let _ = fs_err::remove_file(&socket);
    }

    let listener = match UnixListener::bind(&socket) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind {}: {}", socket.display(), e);
            return;
        }
    };
    log::info!("Listening on {}", socket.display());

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                tokio::spawn(serve_client(stream, tx.clone()));
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

async fn serve_client(stream: UnixStream, tx: Sender<HostEvent>) {
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let reply = match line.parse::<HostEvent>() {
            Ok(event) => {
                if tx.send(event).await.is_err() {
                    break;
                }
                "ok".to_string()
            }
            Err(e) => {
                log::warn!("Rejected command '{}': {}", line.trim(), e);
                format!("error: {}", e)
            }
        };

        if write.write_all(format!("{reply}\n").as_bytes()).await.is_err() {
            break;
        }
    }
}
