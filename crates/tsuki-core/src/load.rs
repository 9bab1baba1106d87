/// Progress of a component's most recent request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    /// The catalog returned the unavailable signal; the caller offers a retry.
    Unavailable,
}

/// Monotonic request counter.
///
/// Each request carries the ticket it was issued with. A response is applied
/// only while its ticket is still the latest one, so late answers for pages the
/// user already navigated away from never overwrite fresher state.
#[derive(Debug, Default)]
pub struct Generation(u64);

impl Generation {
    /// Issue a new ticket, invalidating every earlier one.
    pub fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.0 == ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_ticket_is_current() {
        let mut generation = Generation::default();
        let first = generation.next();
        assert!(generation.is_current(first));
        let second = generation.next();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }
}
