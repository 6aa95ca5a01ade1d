//! A threaded animation engine.

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use log::{debug, trace, warn};
use parking_lot::Mutex;
use scroller_core::{Animation, AnimationEngine, AnimationEvent, AnimationEventKind, AnimationId};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Running {
    animation: Animation,
    started_at: Instant,
}

type Animations = Arc<Mutex<HashMap<AnimationId, Running>>>;

#[derive(Debug, Clone, Copy)]
enum Wake {
    Started,
    Shutdown,
}

/// Samples animations on its own thread, once per frame, and sends the samples to the owner
/// thread.
#[derive(Debug)]
pub struct Compositor {
    animations: Animations,
    wake: Sender<Wake>,
    thread: Option<JoinHandle<()>>,
}

impl Compositor {
    /// Spawns the compositor thread. Samples are sent to `events`.
    pub fn spawn(events: Sender<AnimationEvent>, frame_interval: Duration) -> Compositor {
        let animations: Animations = Arc::new(Mutex::new(HashMap::new()));
        let (wake, wake_recv) = channel::unbounded();

        let thread = {
            let animations = Arc::clone(&animations);
            thread::spawn(move || run(animations, wake_recv, events, frame_interval))
        };

        Compositor {
            animations,
            wake,
            thread: Some(thread),
        }
    }

    /// Number of animations currently running.
    pub fn running(&self) -> usize {
        self.animations.lock().len()
    }
}

impl AnimationEngine for Compositor {
    fn start(&mut self, id: AnimationId, animation: Animation) {
        trace!("starting {:?}", id);
        self.animations.lock().insert(
            id,
            Running {
                animation,
                started_at: Instant::now(),
            },
        );
        if self.wake.send(Wake::Started).is_err() {
            warn!("compositor thread is gone; {:?} will not run", id);
        }
    }

    fn stop(&mut self, id: AnimationId) {
        trace!("stopping {:?}", id);
        self.animations.lock().remove(&id);
    }
}

impl Drop for Compositor {
    fn drop(&mut self) {
        let _ = self.wake.send(Wake::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("compositor thread panicked");
            }
        }
    }
}

fn run(
    animations: Animations,
    wake: Receiver<Wake>,
    events: Sender<AnimationEvent>,
    frame_interval: Duration,
) {
    debug!("compositor running at {:?} per frame", frame_interval);
    let mut last_frame = Instant::now();
    loop {
        let idle = animations.lock().is_empty();
        let message = if idle {
            wake.recv().map_err(|_| RecvTimeoutError::Disconnected)
        } else {
            let next_frame = last_frame + frame_interval;
            wake.recv_timeout(next_frame.saturating_duration_since(Instant::now()))
        };

        match message {
            Ok(Wake::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Ok(Wake::Started) => {
                // sample new animations with the next frame unless it's already due
                if last_frame.elapsed() < frame_interval {
                    continue;
                }
            }
            Err(RecvTimeoutError::Timeout) => (),
        }

        last_frame = Instant::now();
        if !tick(&animations, &events, last_frame) {
            break;
        }
    }
    debug!("compositor stopped");
}

/// Samples every running animation. Returns false if nobody is listening anymore.
fn tick(animations: &Animations, events: &Sender<AnimationEvent>, now: Instant) -> bool {
    let mut samples = Vec::new();
    animations.lock().retain(|id, running| {
        let t = now.saturating_duration_since(running.started_at).as_secs_f64();
        let (value, finished) = running.animation.sample(t);
        let kind = if finished {
            AnimationEventKind::Completed(value)
        } else {
            AnimationEventKind::Progress(value)
        };
        samples.push(AnimationEvent { id: *id, kind });
        !finished
    });

    for event in samples {
        if events.send(event).is_err() {
            return false;
        }
    }
    true
}
