use rust_decimal::Decimal;

use super::{Combatant, CombatantId};

/// When a team counts as defeated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DefeatPolicy {
    /// Every member is down.
    #[default]
    AllDown,
    /// The player is down, even if pets are still standing. Teams without a
    /// player fall back to [`DefeatPolicy::AllDown`].
    PlayerDown,
}

/// One side of an encounter.
#[derive(Debug, Default)]
pub struct Team {
    pub name: String,
    pub members: Vec<Combatant>,
    pub policy: DefeatPolicy,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            policy: DefeatPolicy::AllDown,
        }
    }

    pub fn with_member(mut self, member: Combatant) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_policy(mut self, policy: DefeatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn push(&mut self, member: Combatant) {
        self.members.push(member);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn living(&self) -> impl Iterator<Item = &Combatant> {
        self.members.iter().filter(|member| member.is_alive())
    }

    pub fn living_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.members.iter_mut().filter(|member| member.is_alive())
    }

    pub fn get(&self, id: CombatantId) -> Option<&Combatant> {
        self.members.iter().find(|member| member.id == id)
    }

    pub fn get_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.members.iter_mut().find(|member| member.id == id)
    }

    pub fn is_defeated(&self) -> bool {
        let mut players = self.members.iter().filter(|member| member.is_player()).peekable();
        match self.policy {
            DefeatPolicy::PlayerDown if players.peek().is_some() => {
                players.all(|player| !player.is_alive())
            }
            _ => self.members.iter().all(|member| !member.is_alive()),
        }
    }

    /// Combined remaining health over combined maximum health.
    pub fn hp_fraction(&self) -> Decimal {
        let max: Decimal = self.members.iter().map(Combatant::max_hp).sum();
        if max.is_zero() {
            return Decimal::ZERO;
        }
        let current: Decimal = self.members.iter().map(Combatant::hp).sum();
        current / max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::PlayerId;

    fn party(policy: DefeatPolicy) -> Team {
        Team::new("Party")
            .with_member(Combatant::player(
                CombatantId(1),
                "Hero",
                PlayerId(1),
                Decimal::from(100),
            ))
            .with_member(Combatant::pet(
                CombatantId(2),
                "Wolf",
                PlayerId(1),
                Decimal::from(50),
            ))
            .with_policy(policy)
    }

    #[test]
    fn player_down_policy_ignores_living_pets() {
        let mut team = party(DefeatPolicy::PlayerDown);
        team.members[0].take_damage(Decimal::from(100));
        assert!(team.is_defeated());
        assert_eq!(team.living().count(), 1);

        let mut team = party(DefeatPolicy::AllDown);
        team.members[0].take_damage(Decimal::from(100));
        assert!(!team.is_defeated());
    }

    #[test]
    fn player_down_without_player_means_all_down() {
        let team = Team::new("Beasts")
            .with_member(Combatant::monster(CombatantId(5), "Rat", Decimal::from(10)))
            .with_policy(DefeatPolicy::PlayerDown);
        assert!(!team.is_defeated());
    }

    #[test]
    fn empty_team_is_defeated() {
        assert!(Team::new("Nobody").is_defeated());
    }

    #[test]
    fn aggregate_hp_fraction() {
        let mut team = party(DefeatPolicy::AllDown);
        team.members[1].take_damage(Decimal::from(50));
        assert_eq!(team.hp_fraction(), Decimal::from(100) / Decimal::from(150));
    }
}
