use std::time::Duration;

/// The retransmission timer of a sender. There is a single timer per
/// connection covering the oldest outstanding segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetransmissionTimer {
    initial_rto: Duration,
    /// Current timeout, doubled by each backoff
    rto: Duration,
    /// Time accumulated since the timer was last restarted
    elapsed: Duration,
}

impl RetransmissionTimer {
    pub fn new(initial_rto: Duration) -> Self {
        Self {
            initial_rto,
            rto: initial_rto,
            elapsed: Duration::ZERO,
        }
    }

    /// Returns the timeout to its initial value and starts counting from zero.
    pub fn restart(&mut self) {
        self.rto = self.initial_rto;
        self.elapsed = Duration::ZERO;
    }

    /// Starts counting from zero without touching the timeout.
    pub fn rearm(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    pub fn advance(&mut self, elapsed: Duration) {
        self.elapsed = self.elapsed.saturating_add(elapsed);
    }

    pub fn expired(&self) -> bool {
        self.elapsed >= self.rto
    }

    /// Doubles the timeout (exponential backoff).
    pub fn back_off(&mut self) {
        self.rto = self.rto.saturating_mul(2);
    }

    pub fn rto(&self) -> Duration {
        self.rto
    }

    /// The current timeout in whole milliseconds, saturating at `u64::MAX`.
    pub fn rto_millis(&self) -> u64 {
        u64::try_from(self.rto.as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_and_backs_off() {
        let mut timer = RetransmissionTimer::new(Duration::from_millis(100));
        timer.advance(Duration::from_millis(99));
        assert!(!timer.expired());
        timer.advance(Duration::from_millis(1));
        assert!(timer.expired());

        timer.back_off();
        timer.rearm();
        assert_eq!(timer.rto(), Duration::from_millis(200));
        timer.advance(Duration::from_millis(150));
        assert!(!timer.expired());

        timer.restart();
        assert_eq!(timer.rto(), Duration::from_millis(100));
        assert!(!timer.expired());
    }

    #[test]
    fn back_off_saturates() {
        let mut timer = RetransmissionTimer::new(Duration::MAX);
        timer.back_off();
        assert_eq!(timer.rto(), Duration::MAX);
        assert_eq!(timer.rto_millis(), u64::MAX);
    }

    #[test]
    fn rto_in_millis() {
        let mut timer = RetransmissionTimer::new(Duration::from_millis(1500));
        assert_eq!(timer.rto_millis(), 1500);
        timer.back_off();
        assert_eq!(timer.rto_millis(), 3000);
    }
}
