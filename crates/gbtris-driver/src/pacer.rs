//! Cooperative waits between button events and polling ticks.
//!
//! A [`Pacer`] returns [`ControlFlow::Break`] when the wait was cut short by
//! cancellation, so callers can stop issuing inputs (after releasing any held
//! button).

use std::{
    ops::ControlFlow,
    thread,
    time::{Duration, Instant},
};

use crate::cancel::CancellationToken;

pub trait Pacer {
    /// Waits for `duration` unless `token` is cancelled first.
    fn wait(&mut self, duration: Duration, token: &CancellationToken) -> ControlFlow<()>;
}

impl<P> Pacer for &mut P
where
    P: Pacer + ?Sized,
{
    fn wait(&mut self, duration: Duration, token: &CancellationToken) -> ControlFlow<()> {
        (**self).wait(duration, token)
    }
}

/// Sleeps the current thread in short slices, checking the token in between.
#[derive(Debug, Clone)]
pub struct ThreadPacer {
    slice: Duration,
}

impl Default for ThreadPacer {
    fn default() -> Self {
        Self::new(Duration::from_millis(10))
    }
}

impl ThreadPacer {
    /// Creates a pacer that re-checks cancellation at least every `slice`.
    #[must_use]
    pub fn new(slice: Duration) -> Self {
        Self {
            slice: slice.max(Duration::from_millis(1)),
        }
    }
}

impl Pacer for ThreadPacer {
    fn wait(&mut self, duration: Duration, token: &CancellationToken) -> ControlFlow<()> {
        let deadline = Instant::now() + duration;
        loop {
            if token.is_cancelled() {
                return ControlFlow::Break(());
            }
            let now = Instant::now();
            if now >= deadline {
                return ControlFlow::Continue(());
            }
            thread::sleep(self.slice.min(deadline - now));
        }
    }
}

/// Returns immediately, accumulating the time that would have been spent.
///
/// Used to run a simulated game as fast as possible.
#[derive(Debug, Clone, Default)]
pub struct InstantPacer {
    elapsed: Duration,
}

impl InstantPacer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total duration of all waits that completed.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Pacer for InstantPacer {
    fn wait(&mut self, duration: Duration, token: &CancellationToken) -> ControlFlow<()> {
        if token.is_cancelled() {
            return ControlFlow::Break(());
        }
        self.elapsed += duration;
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_pacer_waits() {
        let token = CancellationToken::new();
        let mut pacer = ThreadPacer::new(Duration::from_millis(2));
        let start = Instant::now();
        assert_eq!(
            pacer.wait(Duration::from_millis(20), &token),
            ControlFlow::Continue(())
        );
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_thread_pacer_stops_when_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let mut pacer = ThreadPacer::default();
        let start = Instant::now();
        assert_eq!(
            pacer.wait(Duration::from_secs(60), &token),
            ControlFlow::Break(())
        );
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_thread_pacer_observes_cancel_mid_wait() {
        let token = CancellationToken::new();
        let remote = token.clone();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });
        let mut pacer = ThreadPacer::new(Duration::from_millis(5));
        let start = Instant::now();
        assert!(pacer.wait(Duration::from_secs(60), &token).is_break());
        assert!(start.elapsed() < Duration::from_secs(10));
        canceller.join().unwrap();
    }

    #[test]
    fn test_instant_pacer_accumulates() {
        let token = CancellationToken::new();
        let mut pacer = InstantPacer::new();
        assert!(pacer.wait(Duration::from_millis(50), &token).is_continue());
        assert!(pacer.wait(Duration::from_millis(100), &token).is_continue());
        assert_eq!(pacer.elapsed(), Duration::from_millis(150));

        token.cancel();
        assert!(pacer.wait(Duration::from_millis(100), &token).is_break());
        assert_eq!(pacer.elapsed(), Duration::from_millis(150));
    }
}
