/// Site state definitions for tracking a single site's crawl
use crate::{CrawlError, Result};
use std::fmt;

/// Represents the current state of one site's crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteState {
    /// Created, nothing fetched yet
    Idle,

    /// Waiting for the site's robots.txt
    FetchingRobots,

    /// Pulling entries from the frontier until it empties or the budget runs out
    DrainingQueue,

    /// Crawl finished; the report is final
    Done,
}

impl SiteState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if `next` directly follows this state
    ///
    /// The lifecycle is strictly linear: Idle, FetchingRobots, DrainingQueue, Done.
    pub fn can_transition_to(&self, next: SiteState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::FetchingRobots)
                | (Self::FetchingRobots, Self::DrainingQueue)
                | (Self::DrainingQueue, Self::Done)
        )
    }

    /// Moves to `next`, failing on any transition outside the lifecycle
    pub fn transition(&mut self, next: SiteState) -> Result<()> {
        if !self.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    /// Converts the state to its string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FetchingRobots => "fetching_robots",
            Self::DrainingQueue => "draining_queue",
            Self::Done => "done",
        }
    }

    /// Parses a state from its string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(Self::Idle),
            "fetching_robots" => Some(Self::FetchingRobots),
            "draining_queue" => Some(Self::DrainingQueue),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    /// Returns all possible site states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Idle,
            Self::FetchingRobots,
            Self::DrainingQueue,
            Self::Done,
        ]
    }
}

impl Default for SiteState {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for SiteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!SiteState::Idle.is_terminal());
        assert!(!SiteState::FetchingRobots.is_terminal());
        assert!(!SiteState::DrainingQueue.is_terminal());
        assert!(SiteState::Done.is_terminal());
    }

    #[test]
    fn test_full_lifecycle() {
        let mut state = SiteState::default();
        assert_eq!(state, SiteState::Idle);

        state.transition(SiteState::FetchingRobots).unwrap();
        state.transition(SiteState::DrainingQueue).unwrap();
        state.transition(SiteState::Done).unwrap();
        assert!(state.is_terminal());
    }

    #[test]
    fn test_invalid_transitions() {
        let mut state = SiteState::Idle;
        let err = state.transition(SiteState::DrainingQueue).unwrap_err();
        assert!(matches!(
            err,
            CrawlError::InvalidTransition {
                from: SiteState::Idle,
                to: SiteState::DrainingQueue
            }
        ));
        assert_eq!(state, SiteState::Idle);

        assert!(!SiteState::Done.can_transition_to(SiteState::Idle));
        assert!(!SiteState::DrainingQueue.can_transition_to(SiteState::FetchingRobots));
        assert!(!SiteState::Idle.can_transition_to(SiteState::Idle));
    }

    #[test]
    fn test_roundtrip_db_string() {
        for state in SiteState::all_states() {
            let db_str = state.to_db_string();
            let parsed = SiteState::from_db_string(db_str);
            assert_eq!(Some(state), parsed, "Failed roundtrip for {:?}", state);
        }
        assert_eq!(SiteState::from_db_string("invalid"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", SiteState::FetchingRobots), "fetching_robots");
        assert_eq!(format!("{}", SiteState::Done), "done");
    }
}
