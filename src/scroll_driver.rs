//! Executes [`ScrollCommand`]s against whatever actually scrolls.
//!
//! Animated scrolls run as local tasks on the UI thread; each carousel has at
//! most one in flight and a newer command aborts the older one. Every scroll
//! that is not superseded reports where it came to rest on the settle channel.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::carousel::{ScrollCommand, ScrollMode, ScrollSettled};

pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Error, PartialEq)]
pub enum ScrollError {
    #[error("Carousel `{0}` is not attached to a scroll surface.")]
    Detached(String),
    #[error("Scroll surface rejected offset {offset} for `{key}`.")]
    Rejected { key: String, offset: f32 },
}

/// The rendering side of a carousel row. Offsets are in item units.
pub trait ScrollSurface {
    fn offset(&self, key: &str) -> f32;

    fn set_offset(&mut self, key: &str, offset: f32) -> Result<(), ScrollError>;
}

struct RunningScroll {
    generation: u64,
    target: usize,
    handle: JoinHandle<()>,
}

pub struct ScrollDriver<S> {
    surface: Rc<RefCell<S>>,
    running: HashMap<String, RunningScroll>,
    settled: mpsc::UnboundedSender<ScrollSettled>,
    frame: Duration,
}

impl<S: ScrollSurface + 'static> ScrollDriver<S> {
    pub fn new(surface: Rc<RefCell<S>>) -> (Self, mpsc::UnboundedReceiver<ScrollSettled>) {
        Self::with_frame(surface, FRAME_INTERVAL)
    }

    pub fn with_frame(
        surface: Rc<RefCell<S>>,
        frame: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<ScrollSettled>) {
        let (settled, receiver) = mpsc::unbounded_channel();
        let driver = Self {
            surface,
            running: HashMap::new(),
            settled,
            frame,
        };
        (driver, receiver)
    }

    pub fn is_animating(&self, key: &str) -> bool {
        self.running
            .get(key)
            .is_some_and(|running| !running.handle.is_finished())
    }

    /// Starts a command, superseding whatever the carousel was doing.
    ///
    /// Animated commands spawn onto the current `LocalSet`; instant ones
    /// complete before this returns.
    pub fn execute(&mut self, command: ScrollCommand) {
        if let Some(previous) = self.running.remove(&command.key) {
            if !previous.handle.is_finished() {
                debug!(
                    key = %command.key,
                    superseded = previous.generation,
                    generation = command.generation,
                    "Superseding scroll"
                );
                previous.handle.abort();
            }
        }

        match command.mode {
            ScrollMode::Instant => self.snap(&command.key, command.generation, command.target),
            ScrollMode::Animated(duration) => {
                let start = self.surface.borrow().offset(&command.key);
                let key = command.key.clone();
                let generation = command.generation;
                let target = command.target;
                let handle = tokio::task::spawn_local(tween(
                    Rc::clone(&self.surface),
                    self.settled.clone(),
                    command,
                    start,
                    duration,
                    self.frame,
                ));
                self.running.insert(
                    key,
                    RunningScroll {
                        generation,
                        target,
                        handle,
                    },
                );
            }
        }
    }

    /// Stops every animation, jumping each carousel to its target.
    pub fn cancel_all(&mut self) {
        let running: Vec<(String, RunningScroll)> = self.running.drain().collect();
        for (key, scroll) in running {
            if scroll.handle.is_finished() {
                continue;
            }
            scroll.handle.abort();
            self.snap(&key, scroll.generation, scroll.target);
        }
    }

    fn snap(&self, key: &str, generation: u64, target: usize) {
        let result = self.surface.borrow_mut().set_offset(key, target as f32);
        let offset = match result {
            Ok(()) => target,
            Err(err) => {
                warn!(%err, key, target, "Instant scroll failed");
                whole_items(self.surface.borrow().offset(key))
            }
        };
        report(&self.settled, key, generation, offset);
    }
}

async fn tween<S: ScrollSurface>(
    surface: Rc<RefCell<S>>,
    settled: mpsc::UnboundedSender<ScrollSettled>,
    command: ScrollCommand,
    start: f32,
    duration: Duration,
    frame: Duration,
) {
    let target = command.target as f32;
    let began = tokio::time::Instant::now();
    let mut ticker = tokio::time::interval(frame);

    loop {
        ticker.tick().await;
        let t = if duration.is_zero() {
            1.0
        } else {
            (began.elapsed().as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
        };
        let value = start + (target - start) * ease_out(t);

        let result = surface.borrow_mut().set_offset(&command.key, value);
        if let Err(err) = result {
            warn!(%err, key = %command.key, "Scroll animation interrupted, jumping to target");
            let result = surface.borrow_mut().set_offset(&command.key, target);
            if let Err(err) = result {
                warn!(%err, key = %command.key, "Failed to jump to scroll target");
            }
            break;
        }
        if t >= 1.0 {
            break;
        }
    }

    let landed = whole_items(surface.borrow().offset(&command.key));
    report(&settled, &command.key, command.generation, landed);
}

fn report(
    settled: &mpsc::UnboundedSender<ScrollSettled>,
    key: &str,
    generation: u64,
    offset: usize,
) {
    let event = ScrollSettled {
        key: key.to_string(),
        generation,
        offset,
    };
    if settled.send(event).is_err() {
        debug!(key, "Settle receiver dropped");
    }
}

// Quadratic ease-out
fn ease_out(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

fn whole_items(offset: f32) -> usize {
    offset.round().max(0.0) as usize
}
