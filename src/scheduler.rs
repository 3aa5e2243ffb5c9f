//! Dual-loop pacing on a single thread.
//!
//! The think loop and the render loop are two independently paced,
//! self re-arming iterations over the same [`Scene`]. The [`Scheduler`]
//! keeps the next due time of each and runs whatever is due when the host
//! calls [`Scheduler::pump`]:
//!
//! - a tick is re-armed `round(1000 / tick_rate)` ms after it completed
//! - a frame is re-armed `round(1000 / fps)` ms after it completed, or
//!   immediately when `fps == 0`
//! - when both are due the tick runs first
//!
//! Nothing overlaps: an iteration is only re-armed once it has completed,
//! and stopping simply means no longer re-arming.

use log::{debug, info};
use std::time::{Duration, Instant};

use crate::scene::Scene;
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ran {
    Nothing,
    Tick,
    Frame,
    Both,
}

impl Ran {
    fn from_flags(tick: bool, frame: bool) -> Self {
        match (tick, frame) {
            (false, false) => Ran::Nothing,
            (true, false) => Ran::Tick,
            (false, true) => Ran::Frame,
            (true, true) => Ran::Both,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    next_tick: Option<f64>,
    next_frame: Option<f64>,
    stopped: bool,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// A scheduler with both loops due immediately.
    pub fn new() -> Self {
        Self {
            next_tick: Some(f64::NEG_INFINITY),
            next_frame: Some(f64::NEG_INFINITY),
            stopped: false,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.stopped
    }

    /// Stop re-arming both loops. An iteration already running completes.
    pub fn stop(&mut self) {
        if !self.stopped {
            debug!("Scheduler stopped");
        }
        self.stopped = true;
        self.next_tick = None;
        self.next_frame = None;
    }

    /// Clock time (ms) of the next due iteration, `None` once stopped.
    pub fn next_wake(&self) -> Option<f64> {
        match (self.next_tick, self.next_frame) {
            (Some(t), Some(f)) => Some(t.min(f)),
            (t, f) => t.or(f),
        }
    }

    /// Whether a render frame would run at `now`.
    pub fn frame_due(&self, now: f64) -> bool {
        self.next_frame.is_some_and(|due| now >= due)
    }

    /// Run the think pass if it is due at `now`.
    ///
    /// With a simulated clock no time passes during the pass, so the next
    /// tick is armed from `now`. Hosts on a real clock use the `_clock`
    /// variants.
    pub fn poll_tick(&mut self, scene: &mut Scene, now: f64) -> bool {
        self.poll_tick_clock(scene, &|| now)
    }

    /// Run a render frame if one is due at `now`.
    pub fn poll_frame(&mut self, scene: &mut Scene, surface: &mut dyn Surface, now: f64) -> bool {
        self.poll_frame_clock(scene, surface, &|| now)
    }

    /// Run whatever is due at `now`, tick first.
    pub fn pump(&mut self, scene: &mut Scene, surface: &mut dyn Surface, now: f64) -> Ran {
        self.pump_clock(scene, surface, &|| now)
    }

    /// Like [`pump`](Self::pump) but reads `clock` (ms) before each
    /// iteration and again once it completes; the completion time is what
    /// the next iteration is armed from.
    pub fn pump_clock(
        &mut self,
        scene: &mut Scene,
        surface: &mut dyn Surface,
        clock: &dyn Fn() -> f64,
    ) -> Ran {
        if self.stopped {
            return Ran::Nothing;
        }
        let ticked = self.poll_tick_clock(scene, clock);
        let framed = self.poll_frame_clock(scene, surface, clock);
        Ran::from_flags(ticked, framed)
    }

    pub fn poll_tick_clock(&mut self, scene: &mut Scene, clock: &dyn Fn() -> f64) -> bool {
        let now = clock();
        match self.next_tick {
            Some(due) if now >= due => {
                scene.tick(now);
                if !self.stopped {
                    self.next_tick = Some(clock().max(now) + scene.config().tick_interval_ms());
                }
                true
            }
            _ => false,
        }
    }

    pub fn poll_frame_clock(
        &mut self,
        scene: &mut Scene,
        surface: &mut dyn Surface,
        clock: &dyn Fn() -> f64,
    ) -> bool {
        let now = clock();
        match self.next_frame {
            Some(due) if now >= due => {
                scene.render_frame(now, surface);
                if !self.stopped {
                    self.next_frame = Some(clock().max(now) + scene.config().frame_delay_ms());
                }
                true
            }
            _ => false,
        }
    }

    /// Drive both loops against the wall clock for `duration`, sleeping
    /// between due times. Returns the number of frames rendered.
    pub fn run_for(
        &mut self,
        scene: &mut Scene,
        surface: &mut dyn Surface,
        duration: Duration,
    ) -> u64 {
        let started = Instant::now();
        let base = scene.now();
        let limit = duration.as_secs_f64() * 1000.0;
        let frames_before = scene.timing().frames;
        info!("Running scene for {:.0} ms", limit);

        let clock = || base + started.elapsed().as_secs_f64() * 1000.0;
        loop {
            let elapsed = clock() - base;
            if elapsed >= limit {
                break;
            }
            self.pump_clock(scene, surface, &clock);
            let Some(wake) = self.next_wake() else {
                break;
            };
            let wait = (wake - clock()).min(limit - elapsed);
            if wait > 0.0 {
                std::thread::sleep(Duration::from_secs_f64(wait / 1000.0));
            } else {
                std::thread::yield_now();
            }
        }
        scene.timing().frames - frames_before
    }
}
