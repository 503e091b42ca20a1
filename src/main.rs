use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::{bounded, select, tick, Sender};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ltop::common::time::now_unix;
use ltop::config::{Cli, EngineConfig};
use ltop::engine::Engine;
use ltop::printer::{Sink, StdoutPrinter};
use ltop::tailer::Tailer;

const RENDER_TICK: Duration = Duration::from_secs(10);

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "ltop exited with an error");
            ExitCode::FAILURE
        }
    }
}

fn run() -> ltop::error::Result<()> {
    let cli = Cli::parse();
    let config = EngineConfig::try_from(cli)?;
    let engine = Engine::new(config.clone())?;
    let filter = engine.build_filter()?;

    let (stop_tx, stop_rx) = bounded::<()>(0);
    let stop_tx: Arc<Mutex<Option<Sender<()>>>> = Arc::new(Mutex::new(Some(stop_tx)));
    let handler_tx = stop_tx.clone();
    ctrlc::set_handler(move || {
        info!("received shutdown signal");
        if let Some(tx) = handler_tx.lock().expect("stop sender lock poisoned").take() {
            drop(tx);
        }
    })
    .map_err(|e| ltop::error::Error::General(format!("installing signal handler: {e}")))?;

    let tailer = Tailer::new(&config.log_file);
    let tailer_stop = stop_rx.clone();
    let tailer_handle = std::thread::spawn(move || tailer.run(filter, tailer_stop));

    engine
        .registry()
        .start_gather(config.collect_interval, stop_rx.clone())?;

    let alert_manager = engine.build_alert_manager();
    let alerts_rx = alert_manager.start();

    let mut sink: Box<dyn Sink> = Box::new(StdoutPrinter);
    let ticker = tick(RENDER_TICK);

    loop {
        select! {
            recv(ticker) -> _ => {
                let summary = engine.assemble_summary(now_unix());
                sink.render(&summary);
            }
            recv(alerts_rx) -> alert => {
                if let Ok(alert) = alert {
                    sink.alert(&alert);
                }
            }
            recv(stop_rx) -> _ => break,
        }
    }

    match tailer_handle.join() {
        Ok(result) => result,
        Err(_) => Err(ltop::error::Error::General("tailer thread panicked".into())),
    }
}
