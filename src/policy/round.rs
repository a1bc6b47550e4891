//! Round policies: how many containers a player may open in one round.

/// Validates a round's open-count.
pub trait RoundPolicy {
    /// Check whether opening `chosen` containers is allowed when
    /// `unopened_excluding_player` containers other than the player's are
    /// still closed.
    fn is_allowed(&self, unopened_excluding_player: usize, chosen: usize) -> bool;
}

/// The player picks any count per round.
///
/// At least one container must be opened, and at least one container other
/// than the player's must stay closed afterwards. This keeps the game moving
/// toward a two-container final reveal without ever emptying the board.
#[derive(Clone, Copy, Debug, Default)]
pub struct PerRoundPolicy;

impl RoundPolicy for PerRoundPolicy {
    fn is_allowed(&self, unopened_excluding_player: usize, chosen: usize) -> bool {
        chosen >= 1 && chosen < unopened_excluding_player
    }
}

impl<R: RoundPolicy + ?Sized> RoundPolicy for &R {
    fn is_allowed(&self, unopened_excluding_player: usize, chosen: usize) -> bool {
        (**self).is_allowed(unopened_excluding_player, chosen)
    }
}
