use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchState {
    PendingSwipe,
    Matched,
    Unmatched,
}

impl MatchState {
    /// State of a user pair, computed from the `unmatched` flags of its match rows
    /// and whether any liked swipe exists between the two users.
    pub fn derive<I>(unmatched_flags: I, liked_swipe_exists: bool) -> Option<Self>
    where
        I: IntoIterator<Item = bool>,
    {
        let mut rows = 0usize;
        for unmatched in unmatched_flags {
            if unmatched {
                return Some(MatchState::Unmatched);
            }
            rows += 1;
        }
        match (rows, liked_swipe_exists) {
            (0, false) => None,
            (0, true) => Some(MatchState::PendingSwipe),
            _ => Some(MatchState::Matched),
        }
    }

    pub fn allows_chat(self) -> bool {
        self == MatchState::Matched
    }
}

/// A liked swipe creates a match row when the reverse like exists, unless the
/// pair was unmatched before. Unmatching is never undone.
pub fn should_create_match(liked: bool, reverse_liked: bool, state: Option<MatchState>) -> bool {
    liked && reverse_liked && state != Some(MatchState::Unmatched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_lifecycle_states() {
        assert_eq!(MatchState::derive([], false), None);
        assert_eq!(MatchState::derive([], true), Some(MatchState::PendingSwipe));
        assert_eq!(MatchState::derive([false], true), Some(MatchState::Matched));
        assert_eq!(MatchState::derive([false, false], false), Some(MatchState::Matched));
        assert_eq!(MatchState::derive([false, true], true), Some(MatchState::Unmatched));
    }

    #[test]
    fn unmatched_pair_never_rematches() {
        assert!(should_create_match(true, true, Some(MatchState::PendingSwipe)));
        assert!(should_create_match(true, true, Some(MatchState::Matched)));
        assert!(!should_create_match(true, true, Some(MatchState::Unmatched)));
        assert!(!should_create_match(true, false, Some(MatchState::PendingSwipe)));
        assert!(!should_create_match(false, true, None));
    }

    #[test]
    fn only_matched_pairs_chat() {
        assert!(MatchState::Matched.allows_chat());
        assert!(!MatchState::Unmatched.allows_chat());
        assert!(!MatchState::PendingSwipe.allows_chat());
    }

    #[test]
    fn serializes_in_screaming_case() {
        let json = serde_json::to_string(&MatchState::PendingSwipe).unwrap();
        assert_eq!(json, "\"PENDING_SWIPE\"");
    }
}
