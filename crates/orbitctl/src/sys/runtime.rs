use crate::events::HostEvent;
use async_channel::Sender;
use std::path::PathBuf;
use std::thread;
use tokio::runtime::Runtime;

/// Socket server and config watcher, on their own runtime thread. Both only
/// talk to the engine loop through `tx`.
pub fn start_background_services(socket: PathBuf, config_path: PathBuf, tx: Sender<HostEvent>) {
    thread::spawn(move || {
        let rt = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("Failed to create Tokio runtime: {}", e);
                return;
            }
        };

        rt.block_on(async {
            tokio::spawn(crate::sys::server::run_server(socket, tx.clone()));
            tokio::spawn(crate::sys::watcher::run_async_watcher(config_path, tx));

            std::future::pending::<()>().await;
        });
    });
}
