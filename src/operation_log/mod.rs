use crate::common::Term;

/// Outer timestamp of a log position: seconds and an increment within the second.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Display)]
#[display(fmt = "Timestamp({}, {})", secs, inc)]
pub struct Timestamp {
    pub secs: u32,
    pub inc: u32,
}

impl Timestamp {
    pub fn new(secs: u32, inc: u32) -> Timestamp {
        Timestamp { secs, inc }
    }
}

/// How far a node's log has advanced. Ordered by timestamp first, the election term
/// of the write breaks ties.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Display)]
#[display(fmt = "{{ ts: {}, t: {} }}", timestamp, term)]
pub struct Position {
    pub timestamp: Timestamp,
    pub term: Term,
}

impl Position {
    pub fn new(secs: u32, inc: u32, term: Term) -> Position {
        Position {
            timestamp: Timestamp::new(secs, inc),
            term,
        }
    }
}

/// Log-application pipeline as seen by the election core. The pipeline reports applied and
/// durable positions through the node handle and answers a drain-mode notice with
/// `signal_drain_complete`.
pub trait LogApplier: Send + 'static {
    fn drain_mode_entered(&self, term: Term);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_orders_before_term() {
        let older_write_newer_term = Position::new(100, 1, 5);
        let newer_write_older_term = Position::new(100, 2, 1);

        assert!(older_write_newer_term < newer_write_older_term);
        assert!(Position::new(100, 2, 1) < Position::new(100, 2, 2));
        assert!(Position::default() < Position::new(0, 1, 0));
    }

    #[test]
    fn test_position_display() {
        assert_eq!("{ ts: Timestamp(100, 1), t: 0 }", Position::new(100, 1, 0).to_string());
    }
}
