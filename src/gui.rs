//! Throttled GUI tick sink (§4.12). Receives pricing *adds* and forwards a tick only when both
//! the minimum inter-emit interval has elapsed and the emission cap has not been reached. Time is
//! read through an injectable clock, mirroring [`crate::rng::VenueRouter`]'s pluggable
//! randomness, so the throttle's boundary behavior is testable without sleeping.

use crate::fabric::Listener;
use crate::io::LineSink;
use crate::model::PriceQuote;
use std::time::{Duration, Instant};

/// A pluggable source of "now", so tests can advance time deterministically instead of sleeping.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The production clock: the real monotonic clock.
#[derive(Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Forwards pricing ticks to `gui.txt` when `(now - last_emit) >= interval` and
/// `emitted < cap`. Both are configured at construction. `last_emit` seeds to the
/// construction-time clock reading, so the first tick is gated by `interval` exactly like every
/// later one rather than bypassing the throttle.
pub struct GuiThrottleListener {
    sink: LineSink,
    clock: Box<dyn Clock>,
    interval: Duration,
    cap: usize,
    last_emit: Instant,
    emitted: usize,
}

impl GuiThrottleListener {
    pub fn new(path: &str, interval: Duration, cap: usize) -> Self {
        Self::with_clock(path, interval, cap, Box::new(SystemClock))
    }

    pub fn with_clock(path: &str, interval: Duration, cap: usize, clock: Box<dyn Clock>) -> Self {
        let start = clock.now();
        Self {
            sink: LineSink::create(path),
            clock,
            interval,
            cap,
            last_emit: start,
            emitted: 0,
        }
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    fn try_emit(&mut self, quote: &PriceQuote) {
        if self.emitted >= self.cap {
            return;
        }
        let now = self.clock.now();
        if now.duration_since(self.last_emit) < self.interval {
            return;
        }
        self.sink.publish_line(&format!(
            "{},{},{}",
            quote.product.id_type,
            quote.product.id,
            crate::price::format_price(quote.mid)
        ));
        self.last_emit = now;
        self.emitted += 1;
    }
}

impl Listener<PriceQuote> for GuiThrottleListener {
    fn process_add(&mut self, data: &PriceQuote) {
        self.try_emit(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Bond;
    use rust_decimal_macros::dec;
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::NamedTempFile;

    struct SteppedClock {
        base: Instant,
        offset: Rc<Cell<Duration>>,
    }

    impl Clock for SteppedClock {
        fn now(&self) -> Instant {
            self.base + self.offset.get()
        }
    }

    fn quote() -> PriceQuote {
        PriceQuote {
            product: Bond::default(),
            mid: dec!(100),
            spread: dec!(0.015625),
        }
    }

    #[test]
    fn throttle_gates_the_first_tick_since_construction() {
        let file = NamedTempFile::new().unwrap();
        let offset = Rc::new(Cell::new(Duration::ZERO));
        let clock = SteppedClock {
            base: Instant::now(),
            offset: offset.clone(),
        };
        let mut listener = GuiThrottleListener::with_clock(
            file.path().to_str().unwrap(),
            Duration::from_millis(300),
            100,
            Box::new(clock),
        );

        // no time has elapsed since construction yet: gated like any other tick.
        listener.process_add(&quote());
        assert_eq!(listener.emitted(), 0);

        offset.set(Duration::from_millis(300));
        listener.process_add(&quote());
        listener.process_add(&quote()); // same instant as the emit above, should be dropped
        assert_eq!(listener.emitted(), 1);

        offset.set(Duration::from_millis(600));
        listener.process_add(&quote());
        assert_eq!(listener.emitted(), 2);
    }

    #[test]
    fn throttle_caps_total_emits() {
        let file = NamedTempFile::new().unwrap();
        let offset = Rc::new(Cell::new(Duration::ZERO));
        let clock = SteppedClock {
            base: Instant::now(),
            offset: offset.clone(),
        };
        let mut listener = GuiThrottleListener::with_clock(
            file.path().to_str().unwrap(),
            Duration::from_millis(1),
            2,
            Box::new(clock),
        );

        for i in 0..10u64 {
            offset.set(Duration::from_millis(i * 10));
            listener.process_add(&quote());
        }
        assert_eq!(listener.emitted(), 2);
    }
}
