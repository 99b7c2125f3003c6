use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::Match;

/// Background driver that ticks a shared match once per second.
///
/// The match and every user action go through one mutex; the countdown is
/// just another contender for it. The thread parks on a channel between
/// ticks, so cancelling wakes it immediately instead of waiting out the
/// period, and it exits on its own once the match ends.
#[derive(Debug)]
pub struct Countdown {
    stop: mpsc::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Countdown {
    /// Ticks once per second, the wall-clock rate of a match.
    pub fn start(game: Arc<Mutex<Match>>) -> Self {
        Self::with_period(game, Duration::from_secs(1))
    }

    pub fn with_period(game: Arc<Mutex<Match>>, period: Duration) -> Self {
        let (stop, ticks) = mpsc::channel();
        let handle = thread::spawn(move || {
            loop {
                match ticks.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {}
                    // stop requested, or the countdown handle was dropped
                    _ => break,
                }
                let Ok(mut game) = game.lock() else {
                    log::warn!("match mutex poisoned, countdown stopping");
                    break;
                };
                game.tick();
                if game.ended() {
                    break;
                }
            }
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Stops the clock and waits for the tick thread to exit.
    pub fn cancel(mut self) {
        let _ = self.stop.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        let _ = self.stop.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Minefield;
    use std::time::Instant;

    fn running_match() -> Arc<Mutex<Match>> {
        let mut game = Match::new(Minefield::with_seed(9, 9, 10, false, 1), 1000);
        game.reveal((4, 4));
        Arc::new(Mutex::new(game))
    }

    fn remaining(game: &Arc<Mutex<Match>>) -> u32 {
        game.lock().unwrap().remaining_seconds()
    }

    #[test]
    fn countdown_ticks_a_running_match() {
        let game = running_match();
        let clock = Countdown::with_period(Arc::clone(&game), Duration::from_millis(5));

        let deadline = Instant::now() + Duration::from_secs(5);
        while remaining(&game) == 1000 {
            assert!(Instant::now() < deadline, "no tick arrived");
            thread::sleep(Duration::from_millis(5));
        }

        clock.cancel();
        assert!(remaining(&game) < 1000);
    }

    #[test]
    fn cancel_stops_the_clock() {
        let game = running_match();
        let clock = Countdown::with_period(Arc::clone(&game), Duration::from_millis(5));
        clock.cancel();

        let frozen = remaining(&game);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(remaining(&game), frozen);
    }

    #[test]
    fn countdown_does_not_touch_an_unstarted_match() {
        let game = Arc::new(Mutex::new(Match::new(
            Minefield::with_seed(9, 9, 10, false, 1),
            1000,
        )));
        let clock = Countdown::with_period(Arc::clone(&game), Duration::from_millis(5));
        thread::sleep(Duration::from_millis(50));
        clock.cancel();

        assert_eq!(remaining(&game), 1000);
        assert!(!game.lock().unwrap().started());
    }

    #[test]
    fn countdown_runs_a_short_match_to_its_end() {
        let game = Arc::new(Mutex::new({
            let mut game = Match::new(Minefield::with_seed(9, 9, 10, false, 1), 3);
            game.reveal((4, 4));
            game
        }));
        let clock = Countdown::with_period(Arc::clone(&game), Duration::from_millis(5));

        let deadline = Instant::now() + Duration::from_secs(5);
        while !game.lock().unwrap().ended() {
            assert!(Instant::now() < deadline, "match never timed out");
            thread::sleep(Duration::from_millis(5));
        }

        clock.cancel();
        let game = game.lock().unwrap();
        assert!(!game.player_won());
        assert_eq!(game.remaining_seconds(), 0);
    }
}
