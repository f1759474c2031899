use rust_decimal::Decimal;

/// One of the two teams in a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Side {
    Challengers,
    Opponents,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Self::Challengers => Self::Opponents,
            Self::Opponents => Self::Challengers,
        }
    }
}

/// Why a battle ended without a decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum AbortReason {
    /// An action needed a living target and none existed.
    NoLivingTarget,
    /// The initial checkpoint could not be saved.
    CheckpointFailed,
    /// The display channel went away mid-encounter.
    PresenterUnavailable,
    /// The caller cancelled the encounter.
    Cancelled,
}

/// Terminal outcome, from the challengers' point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    Victory,
    Defeat,
    /// Time ran out and the side with more remaining health won.
    Timeout,
    /// Time ran out with both sides at the same health fraction.
    Draw,
    Aborted(AbortReason),
}

impl Outcome {
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }
}

impl core::fmt::Display for Outcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Victory => f.write_str("victory"),
            Self::Defeat => f.write_str("defeat"),
            Self::Timeout => f.write_str("timeout"),
            Self::Draw => f.write_str("draw"),
            Self::Aborted(reason) => write!(f, "aborted ({reason})"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleResult {
    pub outcome: Outcome,
    /// `None` for draws and aborted battles.
    pub winner: Option<Side>,
    pub ticks: u64,
}

impl BattleResult {
    pub fn decided(outcome: Outcome, winner: Side, ticks: u64) -> Self {
        Self {
            outcome,
            winner: Some(winner),
            ticks,
        }
    }

    pub fn undecided(outcome: Outcome, ticks: u64) -> Self {
        Self {
            outcome,
            winner: None,
            ticks,
        }
    }

    /// Timeout tie-break on aggregate health fractions.
    pub fn by_health(challengers: Decimal, opponents: Decimal, ticks: u64) -> Self {
        match challengers.cmp(&opponents) {
            core::cmp::Ordering::Greater => {
                Self::decided(Outcome::Timeout, Side::Challengers, ticks)
            }
            core::cmp::Ordering::Less => Self::decided(Outcome::Timeout, Side::Opponents, ticks),
            core::cmp::Ordering::Equal => Self::undecided(Outcome::Draw, ticks),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BattlePhase {
    NotStarted,
    InProgress,
    Finished(BattleResult),
}

impl BattlePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Finished(_) => "finished",
        }
    }
}

/// Two-phase opponent succession.
///
/// When the active opponent falls and more remain, the battle arms the
/// transition; the following tick performs it as its own logged action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpponentTransition {
    #[default]
    Idle,
    Armed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tie_break_prefers_healthier_side() {
        let high = Decimal::new(6, 1);
        let low = Decimal::new(4, 1);
        assert_eq!(
            BattleResult::by_health(high, low, 9).winner,
            Some(Side::Challengers)
        );
        assert_eq!(
            BattleResult::by_health(low, high, 9).winner,
            Some(Side::Opponents)
        );
        let draw = BattleResult::by_health(low, low, 9);
        assert_eq!((draw.outcome, draw.winner), (Outcome::Draw, None));
    }

    #[test]
    fn outcome_display() {
        assert_eq!(
            Outcome::Aborted(AbortReason::PresenterUnavailable).to_string(),
            "aborted (presenter_unavailable)"
        );
    }
}
