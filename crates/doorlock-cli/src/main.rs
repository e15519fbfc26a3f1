//! In-process door lock emulator.
//!
//! Wires a remote HMI session and a local controller over an in-memory
//! link, with mock panel devices and actuators, then walks through a
//! scripted demonstration: enrollment, a granted door open, and three
//! wrong attempts that sound the alarm. Pass a file path to persist the
//! credential store between runs.
//!
//! ```text
//! doorlock [STORE_PATH]
//! ```

use anyhow::Context;
use doorlock_control::LocalController;
use doorlock_core::constants::MSG_MATCHING;
use doorlock_hardware::mock::{MemoryEeprom, MockAlarm, MockDisplay, MockKeypad, MockMotor};
use doorlock_hardware::{CredentialStore, FileEeprom, KeyPress};
use doorlock_hmi::RemoteSession;
use doorlock_link::channel_pair;
use doorlock_timing::TickClock;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Demo tick period, much faster than the production one second.
const TICK: Duration = Duration::from_millis(20);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match std::env::args().nth(1) {
        Some(path) => {
            info!(path = %path, "using file-backed credential store");
            let store = FileEeprom::open(&path).await?;
            run_demo(store).await
        }
        None => run_demo(MemoryEeprom::new()).await,
    }
}

async fn run_demo<S>(store: S) -> anyhow::Result<()>
where
    S: CredentialStore + 'static,
{
    let (remote_link, local_link) = channel_pair(64);

    let local_clock = TickClock::new();
    let remote_clock = TickClock::new();
    let _tickers = (
        local_clock.start_periodic(TICK),
        remote_clock.start_periodic(TICK),
    );

    let (motor, motor_log) = MockMotor::new();
    let (alarm, alarm_log) = MockAlarm::new();
    let (keypad_dev, keypad) = MockKeypad::new();
    let (display_dev, display) = MockDisplay::new();

    let mut controller = LocalController::new(local_link, store, motor, alarm, local_clock);
    let mut session = RemoteSession::new(remote_link, keypad_dev, display_dev, remote_clock);

    let controller_task = tokio::spawn(async move {
        if let Err(err) = controller.run().await {
            info!(%err, "controller stopped");
        }
    });
    let session_task = tokio::spawn(async move {
        if let Err(err) = session.run().await {
            info!(%err, "session stopped");
        }
    });

    info!("enrolling credential 12345");
    keypad.send_entry(&[1, 2, 3, 4, 5]).await?;
    keypad.send_entry(&[1, 2, 3, 4, 5]).await?;
    wait_for(|| display.saw_message(MSG_MATCHING)).await?;

    info!("opening the door with the enrolled credential");
    keypad.send_key(KeyPress::Plus).await?;
    keypad.send_entry(&[1, 2, 3, 4, 5]).await?;
    wait_for(|| motor_log.commands().len() >= 4).await?;
    info!(commands = ?motor_log.commands(), "door cycle ran");

    info!("entering a wrong credential three times");
    keypad.send_key(KeyPress::Plus).await?;
    for _ in 0..3 {
        keypad.send_entry(&[9, 9, 9, 9, 9]).await?;
    }
    wait_for(|| alarm_log.events().len() >= 2).await?;
    info!("alarm sounded and cleared");

    println!("screens shown during the demo:");
    for line in display.history() {
        println!("  {line}");
    }

    controller_task.abort();
    session_task.abort();
    Ok(())
}

async fn wait_for(cond: impl Fn() -> bool) -> anyhow::Result<()> {
    tokio::time::timeout(Duration::from_secs(30), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .context("timed out waiting for the emulated nodes")
}
