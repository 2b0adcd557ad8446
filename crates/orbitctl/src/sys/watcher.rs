use crate::events::HostEvent;
use async_channel::Sender;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;

/// Sends one `ConfigReload` per burst of changes to `config_path`.
///
/// Editors usually produce several events per save; everything already
/// queued when the first relevant event arrives is folded into it.
pub async fn run_async_watcher(config_path: PathBuf, tx: Sender<HostEvent>) {
    let Some(config_dir) = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
    else {
        log::error!("Config path {} has no parent", config_path.display());
        return;
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    // The directory is watched rather than the file so that atomic
    // replace-on-save keeps being noticed.
    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    let touches_config = |res: &notify::Result<notify::Event>| match res {
        Ok(event) => {
            matches!(
                event.kind,
                EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
            ) && event.paths.iter().any(|p| p == &config_path)
        }
        Err(e) => {
            log::error!("Watch error: {}", e);
            false
        }
    };

    while let Ok(res) = bridge_rx.recv().await {
        if !touches_config(&res) {
            continue;
        }
        while let Ok(queued) = bridge_rx.try_recv() {
            touches_config(&queued);
        }

        log::debug!("{} changed", config_path.display());
        if tx.send(HostEvent::ConfigReload).await.is_err() {
            break;
        }
    }
}
