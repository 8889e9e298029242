//! Bookkeeping for the one notification a job may deliver.

/// Outcome of trying to start a delivery sequence.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeliveryGuard {
    /// The caller owns the sequence and must finish it with
    /// [`NotificationRecord::mark_delivered`], [`NotificationRecord::mark_exhausted`]
    /// or [`NotificationRecord::release`].
    Claimed,
    AlreadyDelivered,
    InFlight,
    Exhausted,
}

/// Delivery state of the job's terminal notification.
///
/// `delivered` goes from false to true at most once and never resets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationRecord {
    delivered: bool,
    attempts_made: u32,
    in_flight: bool,
    exhausted: bool,
}

impl NotificationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> bool {
        self.delivered
    }

    pub fn attempts_made(&self) -> u32 {
        self.attempts_made
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn exhausted(&self) -> bool {
        self.exhausted
    }

    /// Claim the right to run the delivery sequence.
    pub fn try_claim(&mut self) -> DeliveryGuard {
        if self.delivered {
            DeliveryGuard::AlreadyDelivered
        } else if self.in_flight {
            DeliveryGuard::InFlight
        } else if self.exhausted {
            DeliveryGuard::Exhausted
        } else {
            self.in_flight = true;
            DeliveryGuard::Claimed
        }
    }

    /// Count one attempt; returns the attempt number (1-based).
    pub fn record_attempt(&mut self) -> u32 {
        self.attempts_made += 1;
        self.attempts_made
    }

    pub fn mark_delivered(&mut self) {
        self.delivered = true;
        self.in_flight = false;
    }

    pub fn mark_exhausted(&mut self) {
        self.exhausted = true;
        self.in_flight = false;
    }

    /// Give up a claimed sequence without consuming it (nothing was sent).
    pub fn release(&mut self) {
        self.in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_claim_at_a_time() {
        let mut rec = NotificationRecord::new();
        assert_eq!(rec.try_claim(), DeliveryGuard::Claimed);
        assert_eq!(rec.try_claim(), DeliveryGuard::InFlight);
    }

    #[test]
    fn delivered_is_sticky() {
        let mut rec = NotificationRecord::new();
        rec.try_claim();
        assert_eq!(rec.record_attempt(), 1);
        assert_eq!(rec.record_attempt(), 2);
        rec.mark_delivered();

        assert!(rec.delivered());
        assert!(!rec.in_flight());
        assert_eq!(rec.attempts_made(), 2);
        assert_eq!(rec.try_claim(), DeliveryGuard::AlreadyDelivered);
        assert!(rec.delivered());
    }

    #[test]
    fn exhaustion_is_permanent() {
        let mut rec = NotificationRecord::new();
        rec.try_claim();
        rec.mark_exhausted();
        assert_eq!(rec.try_claim(), DeliveryGuard::Exhausted);
        assert!(!rec.delivered());
    }

    #[test]
    fn release_allows_a_later_claim() {
        let mut rec = NotificationRecord::new();
        rec.try_claim();
        rec.release();
        assert_eq!(rec.try_claim(), DeliveryGuard::Claimed);
    }
}
