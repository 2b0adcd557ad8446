use crate::events::HostEvent;
use crate::host::DaemonHost;
use crate::sys::runtime::start_background_services;
use orbit::config::{Settings, load_settings_from};
use orbit::{AnchorRect, Engine, Invalidation, LayoutSnapshot, ManualClock};
use std::path::PathBuf;
use std::time::Duration;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

type Emit = fn(&LayoutSnapshot);

/// Owns the engine and applies host events to it, one at a time.
pub struct Daemon {
    engine: Engine<DaemonHost, ManualClock>,
    clock: ManualClock,
    config_path: PathBuf,
    emit: Emit,
}

impl Daemon {
    pub fn new(
        settings: Settings,
        host: DaemonHost,
        anchor: AnchorRect,
        config_path: PathBuf,
        emit: Emit,
    ) -> Self {
        let clock = ManualClock::new();
        let engine = build_engine(settings, host, anchor, clock.clone(), emit);
        Self {
            engine,
            clock,
            config_path,
            emit,
        }
    }

    pub fn engine(&self) -> &Engine<DaemonHost, ManualClock> {
        &self.engine
    }

    /// Delivers every frame the engine asked for since the last tick.
    pub fn tick(&mut self) {
        while let Some(ticket) = self.clock.take_due() {
            self.engine.on_frame(ticket);
        }
    }

    pub fn handle(&mut self, event: HostEvent) {
        log::debug!("event: {:?}", event);
        match event {
            HostEvent::Anchor { rect, sync: false } => self.engine.reposition(rect),
            HostEvent::Anchor { rect, sync: true } => self.engine.reposition_sync(rect),
            HostEvent::Viewport(viewport) => {
                self.engine.host_mut().viewport = viewport;
                self.engine.notify_viewport_changed();
            }
            HostEvent::Toggle(id) => self.engine.toggle_panel(&id),
            HostEvent::Collapse => self.engine.collapse_all(),
            HostEvent::Measure(id, size) => {
                self.engine.host_mut().set_panel_size(id.clone(), size);
                self.engine.notify_content_changed(&id);
            }
            HostEvent::Flush => self.engine.flush_now(Invalidation::NONE),
            HostEvent::ConfigReload => match load_settings_from(&self.config_path) {
                Ok(settings) => self.reload(settings),
                Err(e) => log::warn!("Keeping current settings: {}", e),
            },
        }
    }

    /// Swaps in `settings`. Triggers are fixed for an engine's lifetime, so the
    /// engine is rebuilt with the same host, anchor and open panel.
    pub fn reload(&mut self, settings: Settings) {
        self.engine.flush_now(Invalidation::NONE);
        let host = self.engine.host().clone();
        let anchor = self.engine.snapshot().anchor;
        let active = self.engine.active_panel().cloned();
        self.engine.destroy();

        self.engine = build_engine(settings, host, anchor, self.clock.clone(), self.emit);
        if let Some(id) = active {
            self.engine.toggle_panel(&id);
            self.engine.flush_now(Invalidation::NONE);
        }
        log::info!("Settings reloaded");
    }

    /// Tears the engine down and removes the socket file so the next daemon
    /// can bind it.
    pub fn shutdown(&mut self, socket: &std::path::Path) {
        self.engine.destroy();
        if let Err(e) = fs_err::remove_file(socket) {
            log::debug!("{}", e);
        }
    }
}

fn build_engine(
    settings: Settings,
    host: DaemonHost,
    anchor: AnchorRect,
    clock: ManualClock,
    emit: Emit,
) -> Engine<DaemonHost, ManualClock> {
    let mut engine = Engine::create(settings.trigger_specs(), anchor, host, clock, settings);
    emit(engine.snapshot());
    engine.subscribe(emit);
    engine
}

/// Prints a snapshot as one JSON line.
pub fn print_snapshot(snapshot: &LayoutSnapshot) {
    match serde_json::to_string(snapshot) {
        Ok(line) => println!("{line}"),
        Err(e) => log::error!("Failed to encode snapshot: {}", e),
    }
}

/// Runs the daemon until Ctrl-C. The background services hold the event
/// sender for the life of the process, so the channel itself never closes.
pub fn run(mut daemon: Daemon, socket: PathBuf) -> anyhow::Result<()> {
    let (tx, rx) = async_channel::unbounded();
    start_background_services(socket.clone(), daemon.config_path.clone(), tx);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        let mut frames = tokio::time::interval(FRAME_INTERVAL);
        frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Ok(event) => daemon.handle(event),
                    Err(_) => break,
                },
                _ = frames.tick() => daemon.tick(),
                res = &mut shutdown => {
                    if let Err(e) = res {
                        log::error!("Failed to listen for Ctrl-C: {}", e);
                    }
                    break;
                }
            }
        }
    });

    log::info!("Shutting down");
    daemon.shutdown(&socket);
    Ok(())
}
