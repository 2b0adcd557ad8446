mod daemon;
mod events;
mod host;
mod sys;

use anyhow::Context;
use clap::{Parser, Subcommand};
use host::DaemonHost;
use orbit::config::{self, Settings};
use orbit::{AnchorRect, Engine, Invalidation, ManualClock, Size, TriggerId, ViewportInfo};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use sys::server::SOCKET_PATH;

#[derive(Parser, Debug)]
#[command(name = "orbitctl", version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Lay out the wheel once and print the result as JSON.
    Place {
        /// Viewport size, e.g. 1280x800
        #[arg(long, default_value = "1280x800", value_parser = parse_size)]
        viewport: Size,
        /// Hub rect as LEFT,TOP,WIDTH,HEIGHT
        #[arg(long, value_parser = parse_anchor)]
        anchor: AnchorRect,
        /// Open this trigger's panel
        #[arg(long)]
        open: Option<String>,
        /// Measured size of the open panel, e.g. 230x150
        #[arg(long, value_parser = parse_size, requires = "open")]
        panel_size: Option<Size>,
    },
    /// Run the layout daemon, printing a JSON line per layout pass.
    Serve {
        #[arg(long, default_value = "1280x800", value_parser = parse_size)]
        viewport: Size,
        #[arg(long, default_value = "612,372,56,56", value_parser = parse_anchor)]
        anchor: AnchorRect,
        #[arg(long, default_value = SOCKET_PATH)]
        socket: PathBuf,
    },
    /// Send one command to a running daemon, e.g. `orbitctl send toggle ask`.
    Send {
        #[arg(long, default_value = SOCKET_PATH)]
        socket: PathBuf,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// Write the default config file if none exists.
    InitConfig,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Place {
            viewport,
            anchor,
            open,
            panel_size,
        } => {
            let settings = settings_from(cli.config.as_deref())?;
            place(settings, viewport, anchor, open, panel_size)
        }
        Commands::Serve {
            viewport,
            anchor,
            socket,
        } => {
            let config_path = match cli.config {
                Some(path) => watchable_path(&path)?,
                None => config::get_config_path()?,
            };
            let settings = settings_from(Some(&config_path))?;
            let host = DaemonHost::new(ViewportInfo::new(viewport.width, viewport.height));
            let daemon =
                daemon::Daemon::new(settings, host, anchor, config_path, daemon::print_snapshot);
            daemon::run(daemon, socket)
        }
        Commands::Send { socket, words } => send_command(&socket, &shell_words::join(&words)),
        Commands::InitConfig => {
            let path = match cli.config {
                Some(path) => path,
                None => config::get_config_path()?,
            };
            let written = config::write_default_config(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if written {
                println!("Wrote {}", path.display());
            } else {
                println!("{} already exists, left untouched", path.display());
            }
            Ok(())
        }
    }
}

fn settings_from(path: Option<&std::path::Path>) -> anyhow::Result<Settings> {
    let settings = match path {
        Some(path) => config::load_settings_from(path)?,
        None => config::load_or_default(),
    };
    Ok(settings)
}

/// The watcher needs a real parent directory and compares against the
/// absolute paths notify reports, so `--config orbit.toml` is anchored to
/// the working directory.
fn watchable_path(path: &std::path::Path) -> anyhow::Result<PathBuf> {
    std::path::absolute(path)
        .with_context(|| format!("Failed to resolve config path {}", path.display()))
}

fn place(
    settings: Settings,
    viewport: Size,
    anchor: AnchorRect,
    open: Option<String>,
    panel_size: Option<Size>,
) -> anyhow::Result<()> {
    let mut host = DaemonHost::new(ViewportInfo::new(viewport.width, viewport.height));
    let open = open.map(TriggerId::new);
    if let (Some(id), Some(size)) = (&open, panel_size) {
        host.set_panel_size(id.clone(), size);
    }

    let mut engine = Engine::create(
        settings.trigger_specs(),
        anchor,
        host,
        ManualClock::new(),
        settings,
    );

    if let Some(id) = &open {
        if engine.wheel_anchor(id).is_none() {
            anyhow::bail!("No trigger named '{}' is configured", id);
        }
        engine.toggle_panel(id);
        engine.flush_now(Invalidation::NONE);
    }

    println!("{}", serde_json::to_string_pretty(engine.snapshot())?);
    Ok(())
}

fn send_command(socket: &std::path::Path, line: &str) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(socket).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to orbit daemon at {}: {}. Is `orbitctl serve` running?",
            socket.display(),
            e
        )
    })?;

    writeln!(stream, "{}", line)?;
    stream.shutdown(std::net::Shutdown::Write)?;

    let mut reply = String::new();
    BufReader::new(stream).read_line(&mut reply)?;
    let reply = reply.trim();
    match reply.strip_prefix("error: ") {
        Some(reason) => anyhow::bail!("Daemon rejected '{}': {}", line, reason),
        None => {
            log::debug!("daemon replied '{}'", reply);
            Ok(())
        }
    }
}

fn parse_pair(s: &str, sep: char) -> Result<Vec<f64>, String> {
    s.split(sep)
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid number '{}'", part))
        })
        .collect()
}

fn parse_size(s: &str) -> Result<Size, String> {
    match parse_pair(s, 'x')?.as_slice() {
        [w, h] => Ok(Size::new(*w, *h)),
        _ => Err(format!("expected WIDTHxHEIGHT, got '{}'", s)),
    }
}

fn parse_anchor(s: &str) -> Result<AnchorRect, String> {
    match parse_pair(s, ',')?.as_slice() {
        [l, t, w, h] => Ok(AnchorRect::new(*l, *t, *w, *h)),
        _ => Err(format!("expected LEFT,TOP,WIDTH,HEIGHT, got '{}'", s)),
    }
}
