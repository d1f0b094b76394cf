//! Match state: phase and score

use std::fmt;

/// Top-level game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameState {
    /// Waiting for a confirm press to start a match
    #[default]
    Menu,
    /// Ball in play
    Active,
    /// A player reached the winning score
    Win,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    /// Left paddle (W/S)
    One,
    /// Right paddle (Up/Down)
    Two,
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => write!(f, "Player 1"),
            Player::Two => write!(f, "Player 2"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scoreboard {
    pub left: u32,
    pub right: u32,
}

impl Scoreboard {
    pub fn award(&mut self, player: Player) {
        match player {
            Player::One => self.left += 1,
            Player::Two => self.right += 1,
        }
    }

    /// The player that reached `target`, if any
    pub fn winner(&self, target: u32) -> Option<Player> {
        if self.left >= target {
            Some(Player::One)
        } else if self.right >= target {
            Some(Player::Two)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for Scoreboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.left, self.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoreboard_display() {
        let mut score = Scoreboard::default();
        assert_eq!(score.to_string(), "0 : 0");
        score.award(Player::One);
        score.award(Player::Two);
        score.award(Player::Two);
        assert_eq!(score.to_string(), "1 : 2");
    }

    #[test]
    fn test_winner_threshold() {
        let mut score = Scoreboard { left: 9, right: 3 };
        assert_eq!(score.winner(10), None);
        score.award(Player::One);
        assert_eq!(score.winner(10), Some(Player::One));
        score.reset();
        assert_eq!(score, Scoreboard::default());
    }

    #[test]
    fn test_player_display() {
        assert_eq!(format!("{} Won!", Player::Two), "Player 2 Won!");
    }
}
