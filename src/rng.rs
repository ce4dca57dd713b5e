//! Injectable randomness for execution venue routing (§4.4, §9). Market routing in the reference
//! draws from a process-wide PRNG; here it is an explicit trait object the topology constructs
//! once and hands to `BondExecutionService`, so tests can substitute a seeded source.

use derive_more::Display;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One of the three venues `BondExecutionService` may route an execution order to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Venue {
    #[display("BROKERTEC")]
    BrokerTec,
    #[display("ESPEED")]
    ESpeed,
    #[display("CME")]
    Cme,
}

const VENUES: [Venue; 3] = [Venue::BrokerTec, Venue::ESpeed, Venue::Cme];

/// A pluggable source of venue choices, so `BondExecutionService` never reaches for a global
/// thread-local RNG directly.
pub trait VenueRouter {
    fn choose_venue(&mut self) -> Venue;
}

/// The production router: a seedable PRNG picking uniformly among the three venues.
pub struct RandomVenueRouter {
    rng: StdRng,
}

impl RandomVenueRouter {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl VenueRouter for RandomVenueRouter {
    fn choose_venue(&mut self) -> Venue {
        let idx = self.rng.random_range(0..VENUES.len());
        VENUES[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_yields_same_sequence() {
        let mut a = RandomVenueRouter::from_seed(7);
        let mut b = RandomVenueRouter::from_seed(7);
        let seq_a: Vec<_> = (0..10).map(|_| a.choose_venue()).collect();
        let seq_b: Vec<_> = (0..10).map(|_| b.choose_venue()).collect();
        assert_eq!(seq_a, seq_b);
    }
}
