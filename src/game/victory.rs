//! Victory Arithmetic
//!
//! Pure comparisons shared by the mode policies.

use crate::game::state::Team;

/// Side that has reached `to_win` with a lead of at least `margin`.
///
/// Red is checked first. Both sides can only qualify together when
/// `margin == 0` and the counts are equal, in which case Red is returned.
pub fn winner_by_margin(red: u32, blu: u32, to_win: u32, margin: u32) -> Team {
    if red >= to_win && red >= blu.saturating_add(margin) {
        Team::Red
    } else if blu >= to_win && blu >= red.saturating_add(margin) {
        Team::Blu
    } else {
        Team::Nobody
    }
}

/// First side at or past `to_win`. Red wins a same-tick crossing.
pub fn winner_by_threshold<T: PartialOrd>(red: T, blu: T, to_win: T) -> Team {
    if red >= to_win {
        Team::Red
    } else if blu >= to_win {
        Team::Blu
    } else {
        Team::Nobody
    }
}

/// Strictly larger side, or `Tie`.
pub fn winner_by_most<T: Ord>(red: T, blu: T) -> Team {
    match red.cmp(&blu) {
        std::cmp::Ordering::Greater => Team::Red,
        std::cmp::Ordering::Less => Team::Blu,
        std::cmp::Ordering::Equal => Team::Tie,
    }
}

/// Is `progress` within `margin` of `target`?
#[inline]
pub fn within_margin(progress: u32, target: u32, margin: u32) -> bool {
    progress.saturating_add(margin) >= target
}
