use anyhow::{bail, Context, Result};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::LocalSet;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use seerr_tv::demo::{DemoCatalog, DemoRouter, LogSurface};
use seerr_tv::gamepad::spawn_gamepad_listener;
use seerr_tv::model::MediaCategory;
use seerr_tv::scroll_driver::ScrollDriver;
use seerr_tv::storage::{config_path, load_config, load_config_from, save_config};
use seerr_tv::{EngineConfig, FocusEngine, Key, KeyEvent, KeyPhase};

const PAGE_LATENCY: Duration = Duration::from_millis(350);

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    write_config: bool,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut parsed = Args::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let path = args.next().context("--config needs a path")?;
                    parsed.config = Some(PathBuf::from(path));
                }
                "--write-config" => parsed.write_config = true,
                other => bail!("Unknown argument `{}`", other),
            }
        }
        Ok(parsed)
    }
}

fn main() -> Result<()> {
    let mut env_filter = EnvFilter::from_default_env();
    if let Ok(directive) = "seerr_tv=info".parse() {
        env_filter = env_filter.add_directive(directive);
    }

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse(std::env::args().skip(1))?;
    let config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    if args.write_config {
        let path = match args.config {
            Some(path) => path,
            None => config_path()?,
        };
        save_config(&config, &path)?;
        info!(path = %path.display(), "Wrote configuration");
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to build runtime")?;
    LocalSet::new().block_on(&runtime, run(config))
}

async fn run(config: EngineConfig) -> Result<()> {
    let mut engine = FocusEngine::new(config.clone());
    let mut catalog = DemoCatalog::new();
    let mut router = DemoRouter::new("main");
    let surface = Rc::new(RefCell::new(LogSurface::default()));
    let (mut driver, mut settled_rx) = ScrollDriver::new(Rc::clone(&surface));
    let (loaded_tx, mut loaded_rx) = mpsc::unbounded_channel::<String>();
    let mut focus_rx = engine.subscribe_focus();
    let mut gamepad_rx = spawn_gamepad_listener(
        Duration::from_millis(config.repeat_delay_ms),
        Duration::from_millis(config.repeat_interval_ms),
    );
    let mut gamepad_open = true;
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    let now = Instant::now();
    for category in MediaCategory::ALL {
        let command =
            engine.attach_carousel(category.key(), category.card_kind(), &mut catalog, now);
        driver.execute(command);
    }
    for command in engine.on_route_changed(&router, &mut catalog, now) {
        driver.execute(command);
    }
    info!("Ready. Commands: up, down, left, right, enter, back, refresh, quit");

    loop {
        let event = tokio::select! {
            line = stdin.next_line() => match line.context("Failed to read stdin")? {
                Some(line) if line.trim() == "quit" => break,
                Some(line) => match Key::from_command(&line) {
                    Some(key) => Some(KeyEvent::down(key)),
                    None => {
                        warn!(command = line.trim(), "Unknown command");
                        None
                    }
                },
                None => break,
            },
            key = gamepad_rx.recv(), if gamepad_open => {
                if key.is_none() {
                    info!("Gamepad input unavailable, continuing with stdin");
                    gamepad_open = false;
                }
                key
            }
            Some(settled) = settled_rx.recv() => {
                if let Some(command) = engine.on_scroll_settled(&settled, &mut catalog, Instant::now()) {
                    driver.execute(command);
                }
                None
            }
            Some(key) = loaded_rx.recv() => {
                if catalog.finish_load(&key) {
                    if let Some(command) = engine.on_data_changed(&key, &mut catalog, Instant::now()) {
                        driver.execute(command);
                    }
                }
                None
            }
            Ok(()) = focus_rx.changed() => {
                let focus = *focus_rx.borrow_and_update();
                info!(?focus, route = %engine.route(), "Focus changed");
                None
            }
        };

        if let Some(event) = event {
            let outcome = engine.handle_key(event, &mut router, &mut catalog, Instant::now());
            for command in outcome.commands {
                driver.execute(command);
            }
            for activation in outcome.activations {
                info!(?activation, "Activation");
            }
            if !outcome.consumed && event.key == Key::Back && event.phase == KeyPhase::Down {
                info!("Back pressed at the root, exiting");
                break;
            }
        }

        for key in catalog.take_pending() {
            if let Some(command) = engine.on_data_changed(&key, &mut catalog, Instant::now()) {
                driver.execute(command);
            }
            let loaded_tx = loaded_tx.clone();
            tokio::task::spawn_local(async move {
                tokio::time::sleep(PAGE_LATENCY).await;
                let _ = loaded_tx.send(key);
            });
        }
    }

    driver.cancel_all();
    Ok(())
}
