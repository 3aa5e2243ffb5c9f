//! Frame pacing statistics and per-frame callbacks.

use bevy_ecs::prelude::*;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;

/// Rolling frame-duration statistics.
///
/// Each frame pushes one duration sample (seconds) into a ring buffer of
/// `capacity` entries. `delta_time` is the buffer average and `fps` is
/// `floor(1 / delta_time)`.
#[derive(Resource, Debug, Clone, Serialize)]
pub struct FrameTiming {
    /// Clock time (ms) the last frame started.
    pub frame_start: f64,
    /// Clock time (ms) the last frame ended.
    pub frame_end: f64,
    /// Rolling average frame duration in seconds.
    pub delta_time: f64,
    pub fps: u32,
    pub frames: u64,
    capacity: usize,
    samples: VecDeque<f64>,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new(50)
    }
}

impl FrameTiming {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frame_start: 0.0,
            frame_end: 0.0,
            delta_time: 0.0,
            fps: 0,
            frames: 0,
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Push one frame duration in milliseconds and refresh the averages.
    pub fn record(&mut self, duration_ms: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(duration_ms.max(0.0) / 1000.0);
        self.frames += 1;

        self.delta_time = self.samples.iter().sum::<f64>() / self.samples.len() as f64;
        self.fps = if self.delta_time > 0.0 {
            (1.0 / self.delta_time).floor() as u32
        } else {
            0
        };
    }

    /// Resize the ring buffer, keeping the most recent samples.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

pub type FrameCallback = Arc<dyn Fn(&mut World, &FrameTiming) + Send + Sync>;

/// Callbacks invoked at the end of every frame, in registration order.
#[derive(Resource, Default)]
pub struct FrameCallbacks {
    pub callbacks: Vec<FrameCallback>,
}

impl FrameCallbacks {
    pub fn push(&mut self, f: impl Fn(&mut World, &FrameTiming) + Send + Sync + 'static) {
        self.callbacks.push(Arc::new(f));
    }
}
