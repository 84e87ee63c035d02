//! dhcpspy - report new MAC to IP assignments seen on a bridge.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use dhcpspy::capture::PnetCapture;
use dhcpspy::display::{startup_screen, DisplayPanel, PanelFile};
use dhcpspy::notifier::{AssignmentLog, ConsoleReporter, DisplayBuffer, Notifier};
use dhcpspy::utils::ensure_root;
use dhcpspy::{Config, ControlEvent, Monitor, MonitorError};

/// How long the goodbye screen stays up before the panel is cleared.
const GOODBYE_DELAY: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "dhcpspy")]
#[command(about = "Watch DHCP traffic and report new MAC to IP assignments")]
struct Args {
    /// Also monitor the wireless interface (wired + wireless devices);
    /// `wifi = true` in the config file does the same
    #[arg(long)]
    wifi: bool,

    /// Config file (default: /etc/dhcpspy.conf if it exists)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable the display panel; console output only
    #[arg(long)]
    no_display: bool,

    /// List available network interfaces and exit
    #[arg(short, long)]
    list_interfaces: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.list_interfaces {
        for iface in PnetCapture::list_interfaces() {
            println!("{}", iface);
        }
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config);

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    // stdout is the operator console; diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args, config: &Config) -> Result<()> {
    ensure_root().context("Please run with sudo or as root user")?;

    let display = open_display(config, args.no_display);

    let notifier = Notifier::new()
        .with_transient(ConsoleReporter::new())
        .with_transient(Arc::clone(&display))
        .with_durable(AssignmentLog::new(&config.device_log))
        .with_durable(AssignmentLog::new(&config.assignments_log))
        .with_log_write_attempts(config.log_write_attempts);

    let mut monitor = Monitor::new(notifier);

    let (events_tx, events_rx) = mpsc::channel();
    let signal_tx = events_tx.clone();
    ctrlc::set_handler(move || {
        let _ = signal_tx.send(ControlEvent::Shutdown);
    })
    .context("Failed to install signal handler")?;

    let interfaces = config.interfaces(args.wifi);
    info!("Starting bridge IP monitor on {}", interfaces.join(", "));
    if interfaces.len() > 1 {
        info!("Plug in a device or connect via WiFi to see its assigned IP address");
    } else {
        info!("Plug in a device to see its assigned IP address");
    }

    for interface in &interfaces {
        let started = PnetCapture::new(interface)
            .map_err(|source| MonitorError::CaptureStart {
                interface: interface.clone(),
                source,
            })
            .and_then(|capture| monitor.start_session(capture, events_tx.clone()));

        if let Err(e) = started {
            warn!("Skipping {}: {}", interface, e);
        }
    }
    drop(events_tx);

    if monitor.interfaces().is_empty() {
        display.release();
        return Err(MonitorError::NoSessions.into());
    }

    info!("Press Ctrl+C to stop");
    monitor.wait(&events_rx);

    info!("Stopping bridge monitor...");
    let stragglers = monitor.shutdown(config.shutdown_timeout);
    if !stragglers.is_empty() {
        warn!("Leaving captures running on {}", stragglers.join(", "));
    }

    if display.has_panel() {
        monitor.notifier().status("Goodbye!", false);
        thread::sleep(GOODBYE_DELAY);
    }
    display.release();

    Ok(())
}

/// Build the display buffer, with a panel when one can be initialised.
///
/// A panel that fails to initialise is reported once; the monitor then
/// runs console-only.
fn open_display(config: &Config, disabled: bool) -> Arc<DisplayBuffer> {
    let panel = if disabled || !config.display_enabled {
        info!("Display disabled, console output only");
        None
    } else {
        let mut panel = PanelFile::new(&config.display_path);
        match panel.init() {
            Ok(()) => {
                info!("Display panel at {:?}", panel.path());
                Some(Box::new(panel) as Box<dyn DisplayPanel>)
            }
            Err(e) => {
                warn!("Display unavailable, continuing console-only: {}", e);
                None
            }
        }
    };

    let display = DisplayBuffer::new(config.display_max_lines, panel);
    display.push_lines(startup_screen(PnetCapture::interface_ipv4(
        &config.bridge_interface,
    )));
    Arc::new(display)
}
