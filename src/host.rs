use crate::compositor::Compositor;
use crate::presenter::ScrollPresenter;
use crossbeam::channel::{self, Receiver, RecvTimeoutError, TryRecvError};
use log::{trace, warn};
use scroller_core::{AnimationEvent, Result, ScrollerConfig, SystemSettings};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Runs a scroll presenter with a threaded compositor.
///
/// The presenter lives on the thread that owns the host. Animation samples arrive from the
/// compositor thread and are only applied when the host is polled.
pub struct Host {
    presenter: ScrollPresenter<Compositor>,
    animation_recv: Receiver<AnimationEvent>,
}

impl Host {
    /// Creates a new Host and spawns its compositor.
    ///
    /// The surface starts out unloaded; requests are delayed until you call `load` on the
    /// presenter.
    pub fn new(config: ScrollerConfig, settings: Arc<dyn SystemSettings>) -> Result<Host> {
        config.validate()?;
        let (animation_sender, animation_recv) = channel::unbounded();
        let frame_interval = Duration::from_millis(config.frame_interval_ms.max(1));
        let compositor = Compositor::spawn(animation_sender, frame_interval);

        Ok(Host {
            presenter: ScrollPresenter::new(config, settings, compositor)?,
            animation_recv,
        })
    }

    pub fn presenter(&self) -> &ScrollPresenter<Compositor> {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut ScrollPresenter<Compositor> {
        &mut self.presenter
    }

    /// Applies all animation samples received so far and delivers pending events. Returns how
    /// many events were delivered.
    pub fn poll(&mut self) -> usize {
        loop {
            match self.animation_recv.try_recv() {
                Ok(event) => self.presenter.handle_animation_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("animation receiver has been disconnected");
                    break;
                }
            }
        }
        self.presenter.dispatch()
    }

    /// Waits up to `timeout` for an animation sample, then polls.
    pub fn poll_timeout(&mut self, timeout: Duration) -> usize {
        self.wait(timeout);
        self.poll()
    }

    /// Polls until `done` returns true or `timeout` elapses. Returns whether `done` returned true.
    pub fn run_until<F>(&mut self, timeout: Duration, mut done: F) -> bool
    where
        F: FnMut(&ScrollPresenter<Compositor>) -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            self.poll();
            if done(&self.presenter) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                trace!("gave up waiting after {:?}", timeout);
                return false;
            }
            self.wait(deadline - now);
        }
    }

    fn wait(&mut self, timeout: Duration) {
        match self.animation_recv.recv_timeout(timeout) {
            Ok(event) => self.presenter.handle_animation_event(event),
            Err(RecvTimeoutError::Timeout) => (),
            Err(RecvTimeoutError::Disconnected) => {
                warn!("animation receiver has been disconnected");
                thread::sleep(timeout);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ScrollCompleted, ViewChanged};
    use cgmath::Vector2;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use scroller_core::{AnimationTiming, FixedSettings, ScrollOptions, ViewChangeResult};

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn loaded_host(config: ScrollerConfig) -> Host {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut host = Host::new(config, Arc::new(FixedSettings::default())).unwrap();
        let presenter = host.presenter_mut();
        presenter.set_viewport_size(Vector2::new(300., 200.)).unwrap();
        presenter
            .set_content_size(Some(Vector2::new(1200., 900.)))
            .unwrap();
        presenter.load();
        host.poll();
        host
    }

    type Recorded<T> = Arc<Mutex<Vec<T>>>;

    fn record(host: &mut Host) -> (Recorded<ViewChanged>, Recorded<ScrollCompleted>) {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let completed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&changes);
        host.presenter_mut()
            .on_view_changed(move |event| sink.lock().push(*event));
        let sink = Arc::clone(&completed);
        host.presenter_mut()
            .on_scroll_completed(move |event| sink.lock().push(*event));
        (changes, completed)
    }

    #[test]
    fn test_animated_scroll() {
        let mut host = loaded_host(ScrollerConfig::default());
        let (changes, completed) = record(&mut host);

        let id = host
            .presenter_mut()
            .scroll_to(600., 400., ScrollOptions::animated())
            .unwrap();
        assert!(host.run_until(TIMEOUT, |_| !completed.lock().is_empty()));

        assert_eq!(
            *completed.lock(),
            vec![ScrollCompleted {
                correlation_id: id,
                result: ViewChangeResult::Completed,
            }]
        );
        assert_eq!(host.presenter().horizontal_offset(), 600.);
        assert_eq!(host.presenter().vertical_offset(), 400.);
        assert!(changes.lock().len() > 1, "animation had intermediate frames");
        assert_eq!(host.presenter().scheduler().engine().running(), 0);
    }

    #[test]
    fn test_zero_jump_interrupts_animation() {
        let mut config = ScrollerConfig::default();
        config.offsets_animation = AnimationTiming {
            ms_per_unit: 10.,
            min_ms: 50.,
            max_ms: 10_000.,
        };
        let mut host = loaded_host(config);
        let (_, completed) = record(&mut host);

        let animated = host
            .presenter_mut()
            .scroll_to(600., 400., ScrollOptions::animated())
            .unwrap();
        assert!(host.run_until(TIMEOUT, |presenter| presenter.vertical_offset() > 0.));

        let stop = host
            .presenter_mut()
            .scroll_by(0., 0., ScrollOptions::jump())
            .unwrap();
        host.poll();
        assert_eq!(
            *completed.lock(),
            vec![
                ScrollCompleted {
                    correlation_id: animated,
                    result: ViewChangeResult::Interrupted,
                },
                ScrollCompleted {
                    correlation_id: stop,
                    result: ViewChangeResult::Completed,
                },
            ]
        );

        let presenter = host.presenter();
        assert!(presenter.horizontal_offset() < 600.);
        assert!(presenter.vertical_offset() < 400.);

        // stale samples from the compositor don't move the view anymore
        let offsets = (presenter.horizontal_offset(), presenter.vertical_offset());
        host.poll_timeout(Duration::from_millis(50));
        let presenter = host.presenter();
        assert_eq!(
            (presenter.horizontal_offset(), presenter.vertical_offset()),
            offsets
        );
    }

    #[test]
    fn test_inertia() {
        let mut host = loaded_host(ScrollerConfig::default());
        let (changes, completed) = record(&mut host);

        let id = host
            .presenter_mut()
            .scroll_from(Vector2::new(0., 500.), Some(Vector2::new(0.999, 0.999)))
            .unwrap();
        assert!(host.run_until(TIMEOUT, |_| !completed.lock().is_empty()));
        assert_eq!(completed.lock()[0].correlation_id, id);
        assert_eq!(completed.lock()[0].result, ViewChangeResult::Completed);

        let changes = changes.lock();
        assert!(changes.len() > 1);
        for pair in changes.windows(2) {
            assert!(pair[1].vertical_offset >= pair[0].vertical_offset);
            assert_eq!(pair[1].horizontal_offset, 0.);
        }
        let rest = 500. / -(0.001_f64).ln();
        let last = changes[changes.len() - 1].vertical_offset;
        assert!((last - rest).abs() < 1e-9, "came to rest at {}", last);
    }

    #[test]
    fn test_jump_completion_waits_for_poll() {
        let mut host = loaded_host(ScrollerConfig::default());
        let (_, completed) = record(&mut host);

        host.presenter_mut()
            .scroll_to(100., 100., ScrollOptions::jump())
            .unwrap();
        assert_eq!(host.presenter().vertical_offset(), 100.);
        assert!(completed.lock().is_empty());
        assert_eq!(host.poll(), 2);
        assert_eq!(completed.lock().len(), 1);
    }
}
