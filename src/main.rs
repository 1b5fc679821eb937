// fm-monitor: main.rs
//
// Polls one DEVA4004 receiver on two independent cadences:
//
//  data   every data_interval_seconds   monitoring subtree, accumulated per frequency
//  alarm  every alarm_interval_seconds  50-slot alarm table, rebuilt each time
//
// The channel table is read once at startup. If that fails the daemon exits
// with the device's error; there is nothing to report against.

use anyhow::{Context, Result};
use clap::Parser;
use futures::stream::StreamExt;
use log::info;
use signal_hook::consts::signal::*;
use signal_hook_tokio::Signals;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use fm_monitor::config::Config;
use fm_monitor::logging::DaemonLogger;
use fm_monitor::poller::PollManager;

// ====================== CLI ======================

#[derive(Parser, Debug)]
#[command(about = "SNMP poller for DEVA4004 FM monitoring receivers")]
struct Args {
    #[arg(short, long, default_value = "/etc/fm-monitor/config.toml")]
    config: PathBuf,
    /// Discover, poll both streams once, print the readings and exit.
    #[arg(short, long)]
    once: bool,
    /// Mirror every log line to stdout and enable debug output.
    #[arg(short, long)]
    verbose: bool,
}

// ====================== Entry Point ======================

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;
    config.validate()?;
    let verbose = args.verbose || config.logging.verbose;

    DaemonLogger::new(&config.logging, verbose)?.install()?;

    println!("fm-monitor v{} starting", env!("CARGO_PKG_VERSION"));
    println!("  Config         : {}", args.config.display());
    println!("  Device         : {} ({})", config.device.name, config.target());
    println!("  SNMP version   : {:?}", config.device.version);
    println!("  Data interval  : {}s", config.polling.data_interval_seconds);
    println!("  Alarm interval : {}s", config.polling.alarm_interval_seconds);
    println!("  Verbose        : {}", verbose);

    let mut mgr = PollManager::from_config(&config);
    let enabled = mgr
        .discover()
        .await
        .with_context(|| format!("Channel discovery on {} failed", config.target()))?;
    info!("[{}] {} enabled channel(s)", config.device.name, enabled);

    if args.once {
        mgr.poll_data().await;
        mgr.poll_alarms().await;
        for r in mgr.readings() {
            println!("{}", r.summary());
        }
        return Ok(());
    }

    let mut data_tick = interval(Duration::from_secs(config.polling.data_interval_seconds));
    let mut alarm_tick = interval(Duration::from_secs(config.polling.alarm_interval_seconds));
    data_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    alarm_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut signals = Signals::new([SIGTERM, SIGINT])?.fuse();

    println!("Ready, polling {}.", config.target());

    loop {
        tokio::select! {
            // ── Monitoring stream ────────────────────────────────────────
            _ = data_tick.tick() => {
                mgr.poll_data().await;
                mgr.report();
            }

            // ── Alarm stream ─────────────────────────────────────────────
            _ = alarm_tick.tick() => {
                mgr.poll_alarms().await;
            }

            // ── SIGTERM / SIGINT ─────────────────────────────────────────
            _ = signals.next() => {
                info!("Signal received, daemon stopping.");
                break;
            }
        }
    }

    log::logger().flush();
    println!("fm-monitor stopped.");
    Ok(())
}
