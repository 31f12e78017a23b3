//! Clock-driven audio output
//!
//! `SimulatedOutput` behaves like a media element without producing sound. It
//! resolves locators against a table of known media, reports duration and
//! readiness on load, and while playing advances a position clock on a tokio
//! interval, emitting time updates and finally `Ended`.
//!
//! Headless embedders and the integration tests drive the engine with it;
//! under a paused tokio clock the whole timeline is deterministic.

use crate::error::OutputError;
use crate::output::{
    AudioOutput, LoadId, OutputEvent, OutputEventKind, OutputEventSender, OutputEvents,
    PlayFuture,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// How a known locator behaves
#[derive(Debug, Clone, Copy, PartialEq)]
enum Media {
    Playable { duration: f64 },
    Broken,
}

#[derive(Debug)]
struct Loaded {
    load_id: LoadId,
    duration: f64,
    /// f64 bits of the playhead, shared with the clock task
    position: Arc<AtomicU64>,
}

/// Simulated output with a position clock
#[derive(Debug)]
pub struct SimulatedOutput {
    media: HashMap<String, Media>,
    events: OutputEventSender,
    tick: Duration,
    start_delay: Duration,
    volume: f32,
    loaded: Option<Loaded>,
    clock: Option<JoinHandle<()>>,
}

impl SimulatedOutput {
    /// Create an output reporting progress every `tick`
    pub fn new(events: OutputEventSender, tick: Duration) -> Self {
        Self {
            media: HashMap::new(),
            events,
            tick,
            start_delay: Duration::ZERO,
            volume: 1.0,
            loaded: None,
            clock: None,
        }
    }

    /// Create an output together with the event channel the engine consumes
    pub fn channel(tick: Duration) -> (Self, OutputEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx, tick), rx)
    }

    /// Register playable media of the given duration (seconds)
    #[must_use]
    pub fn with_media(mut self, locator: impl Into<String>, duration: f64) -> Self {
        self.media.insert(
            locator.into(),
            Media::Playable {
                duration: duration.max(0.0),
            },
        );
        self
    }

    /// Register media that fails to load
    #[must_use]
    pub fn with_broken_media(mut self, locator: impl Into<String>) -> Self {
        self.media.insert(locator.into(), Media::Broken);
        self
    }

    /// Delay between `play()` and playback actually starting
    #[must_use]
    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn emit(&self, load_id: LoadId, kind: OutputEventKind) {
        // Receiver gone means the engine shut down; nothing left to inform
        let _ = self.events.send(OutputEvent::new(load_id, kind));
    }

    fn stop_clock(&mut self) {
        if let Some(clock) = self.clock.take() {
            clock.abort();
        }
    }

    fn clock_running(&self) -> bool {
        self.clock.as_ref().is_some_and(|clock| !clock.is_finished())
    }
}

impl AudioOutput for SimulatedOutput {
    fn load(&mut self, locator: &str, load_id: LoadId) {
        self.stop_clock();
        self.loaded = None;

        match self.media.get(locator).copied() {
            Some(Media::Playable { duration }) => {
                debug!(locator, %load_id, duration, "Simulated media loaded");
                self.loaded = Some(Loaded {
                    load_id,
                    duration,
                    position: Arc::new(AtomicU64::new(0f64.to_bits())),
                });
                self.emit(load_id, OutputEventKind::DurationChanged(duration));
                self.emit(load_id, OutputEventKind::Ready);
            }
            Some(Media::Broken) => {
                self.emit(
                    load_id,
                    OutputEventKind::Error(format!("failed to decode {locator}")),
                );
            }
            None => {
                self.emit(
                    load_id,
                    OutputEventKind::Error(format!("unsupported media: {locator}")),
                );
            }
        }
    }

    fn play(&mut self) -> PlayFuture {
        let Some(loaded) = &self.loaded else {
            return Box::pin(async { Err(OutputError::NotLoaded) });
        };

        let delay = self.start_delay;
        if self.clock_running() {
            return Box::pin(async { Ok::<(), OutputError>(()) });
        }

        let load_id = loaded.load_id;
        let duration = loaded.duration;
        let position = Arc::clone(&loaded.position);
        let events = self.events.clone();
        let tick = self.tick;

        self.clock = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let mut interval = tokio::time::interval(tick);
            // First tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;

                let now = (f64::from_bits(position.load(Ordering::Acquire)) + tick.as_secs_f64())
                    .min(duration);
                position.store(now.to_bits(), Ordering::Release);
                trace!(%load_id, now, "Simulated clock tick");

                if events
                    .send(OutputEvent::new(load_id, OutputEventKind::TimeUpdate(now)))
                    .is_err()
                {
                    break;
                }

                if now >= duration {
                    let _ = events.send(OutputEvent::new(load_id, OutputEventKind::Ended));
                    break;
                }
            }
        }));

        Box::pin(async move {
            tokio::time::sleep(delay).await;
            Ok::<(), OutputError>(())
        })
    }

    fn pause(&mut self) {
        self.stop_clock();
    }

    fn seek(&mut self, position: f64) {
        if let Some(loaded) = &self.loaded {
            let target = position.clamp(0.0, loaded.duration);
            loaded.position.store(target.to_bits(), Ordering::Release);
        }
    }

    fn set_volume(&mut self, level: f32) {
        self.volume = level;
    }

    fn unload(&mut self) {
        self.stop_clock();
        self.loaded = None;
    }
}

impl Drop for SimulatedOutput {
    fn drop(&mut self) {
        self.stop_clock();
    }
}
