use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle, time::Instant};

use crate::models::GameStatus;

/// Identifies one arming of a phase timer. A firing carrying a token that is
/// no longer armed is stale and must be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

#[derive(Debug, Clone, Copy)]
struct Armed {
    token: TimerToken,
    phase: GameStatus,
    deadline: Instant,
}

/// Countdown for the current phase, without any I/O.
///
/// The session arms and cancels it; whoever drives the session turns the
/// armed deadline into a real sleep (see [`TimerDriver`]) and reports back
/// through [`PhaseTimer::fire`].
#[derive(Debug, Default)]
pub struct PhaseTimer {
    issued: u64,
    armed: Option<Armed>,
}

impl PhaseTimer {
    /// Start a countdown for `phase`, replacing any running one
    pub fn arm(&mut self, phase: GameStatus, duration: Duration) -> TimerToken {
        self.issued += 1;
        let token = TimerToken(self.issued);
        self.armed = Some(Armed {
            token,
            phase,
            deadline: Instant::now() + duration,
        });
        token
    }

    /// Stop the countdown. Cancelling twice, or after firing, is a no-op.
    pub fn cancel(&mut self) {
        self.armed = None;
    }

    /// Consume an expiry. Returns the phase it belonged to, or `None` when
    /// the token was cancelled or superseded.
    pub fn fire(&mut self, token: TimerToken) -> Option<GameStatus> {
        match self.armed {
            Some(armed) if armed.token == token => {
                self.armed = None;
                Some(armed.phase)
            }
            _ => None,
        }
    }

    pub fn armed_token(&self) -> Option<TimerToken> {
        self.armed.map(|armed| armed.token)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.armed.map(|armed| armed.deadline)
    }

    /// Whole seconds left, rounded up; 0 when nothing is armed
    pub fn remaining_secs(&self) -> u64 {
        let Some(deadline) = self.deadline() else {
            return 0;
        };
        let left = deadline.saturating_duration_since(Instant::now());
        let secs = left.as_secs();
        if left.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

struct RunningTimer {
    token: TimerToken,
    handle: JoinHandle<()>,
}

/// Tokio side of a [`PhaseTimer`]: one sleeping task per armed token
#[derive(Default)]
pub struct TimerDriver {
    running: Option<RunningTimer>,
}

impl TimerDriver {
    /// Make the running sleep match what `timer` has armed. A superseded
    /// sleep is aborted before the new one is spawned.
    pub fn sync<M>(&mut self, timer: &PhaseTimer, tx: &mpsc::Sender<M>, on_fire: fn(TimerToken) -> M)
    where
        M: Send + 'static,
    {
        let wanted = timer.armed_token().zip(timer.deadline());
        let current = self.running.as_ref().map(|running| running.token);
        if wanted.map(|(token, _)| token) == current {
            return;
        }

        self.cancel();
        if let Some((token, deadline)) = wanted {
            let tx = tx.clone();
            let handle = tokio::spawn(async move {
                tokio::time::sleep_until(deadline).await;
                let _ = tx.send(on_fire(token)).await;
            });
            self.running = Some(RunningTimer { token, handle });
        }
    }

    /// Abort the running sleep, if any
    pub fn cancel(&mut self) {
        if let Some(running) = self.running.take() {
            running.handle.abort();
        }
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_only_matches_current_token() {
        let mut timer = PhaseTimer::default();
        let first = timer.arm(GameStatus::Playing, Duration::from_secs(5));
        let second = timer.arm(GameStatus::Challenging, Duration::from_secs(5));

        assert_eq!(timer.fire(first), None);
        assert_eq!(timer.fire(second), Some(GameStatus::Challenging));
        assert_eq!(timer.fire(second), None);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut timer = PhaseTimer::default();
        let token = timer.arm(GameStatus::Playing, Duration::from_secs(5));
        timer.cancel();
        timer.cancel();
        assert_eq!(timer.fire(token), None);
        assert_eq!(timer.remaining_secs(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_rounds_up() {
        let mut timer = PhaseTimer::default();
        timer.arm(GameStatus::Playing, Duration::from_secs(10));
        tokio::time::advance(Duration::from_millis(2500)).await;
        assert_eq!(timer.remaining_secs(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_delivers_only_latest_token() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut timer = PhaseTimer::default();
        let mut driver = TimerDriver::default();

        timer.arm(GameStatus::Playing, Duration::from_secs(30));
        driver.sync(&timer, &tx, |token| token);
        let latest = timer.arm(GameStatus::Challenging, Duration::from_secs(5));
        driver.sync(&timer, &tx, |token| token);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(rx.try_recv(), Ok(latest));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_cancel_is_idempotent() {
        let (tx, mut rx) = mpsc::channel::<TimerToken>(4);
        let mut timer = PhaseTimer::default();
        let mut driver = TimerDriver::default();

        timer.arm(GameStatus::Playing, Duration::from_secs(1));
        driver.sync(&timer, &tx, |token| token);
        timer.cancel();
        driver.sync(&timer, &tx, |token| token);
        driver.cancel();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }
}
