use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

/// Host hook that schedules one more frame callback, the "notify me before
/// the next repaint" primitive.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Cancels the animation loop from outside the frame callback.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Cooperative per-frame loop: each callback re-registers itself with the
/// host scheduler, then issues exactly one render call. Cadence is owned
/// entirely by the host; there is no delta-time or pacing logic here.
#[derive(Debug, Default)]
pub struct AnimationDriver {
    stop: StopHandle,
    frames: u64,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Number of render calls issued so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Registers the first callback; subsequent registrations happen inside
    /// [`AnimationDriver::frame`].
    pub fn start<S: FrameScheduler>(&self, scheduler: &mut S) {
        debug!("animation driver started");
        scheduler.request_frame();
    }

    /// Runs one frame callback: re-register first, then render. Returns
    /// false once the stop handle fired, in which case nothing is scheduled
    /// or rendered.
    pub fn frame<S, R>(&mut self, scheduler: &mut S, mut render: R) -> bool
    where
        S: FrameScheduler,
        R: FnMut(),
    {
        if self.stop.is_stopped() {
            debug!("animation driver stopped after {} frames", self.frames);
            return false;
        }
        scheduler.request_frame();
        render();
        self.frames += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingScheduler {
        registrations: u32,
    }

    impl FrameScheduler for CountingScheduler {
        fn request_frame(&mut self) {
            self.registrations += 1;
        }
    }

    #[test]
    fn n_signals_issue_n_renders_and_n_registrations() {
        let mut driver = AnimationDriver::new();
        let mut scheduler = CountingScheduler::default();
        let mut renders = 0;
        for _ in 0..10 {
            assert!(driver.frame(&mut scheduler, || renders += 1));
        }
        assert_eq!(renders, 10);
        assert_eq!(scheduler.registrations, 10);
        assert_eq!(driver.frames(), 10);
    }

    #[test]
    fn start_registers_exactly_once() {
        let driver = AnimationDriver::new();
        let mut scheduler = CountingScheduler::default();
        driver.start(&mut scheduler);
        assert_eq!(scheduler.registrations, 1);
    }

    #[test]
    fn stopped_driver_neither_renders_nor_reregisters() {
        let mut driver = AnimationDriver::new();
        let mut scheduler = CountingScheduler::default();
        let mut renders = 0;
        assert!(driver.frame(&mut scheduler, || renders += 1));

        driver.stop_handle().stop();
        assert!(!driver.frame(&mut scheduler, || renders += 1));
        assert_eq!(renders, 1);
        assert_eq!(scheduler.registrations, 1);
        assert_eq!(driver.frames(), 1);
    }

    #[test]
    fn stop_handle_is_shared() {
        let driver = AnimationDriver::new();
        let handle = driver.stop_handle();
        assert!(!handle.is_stopped());
        driver.stop_handle().stop();
        assert!(handle.is_stopped());
    }
}
