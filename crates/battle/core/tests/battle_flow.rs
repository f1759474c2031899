//! End-to-end battle state machine scenarios.

use std::time::{Duration, Instant};

use battle_core::{
    AbortReason, Battle, BattleConfig, BattleEnv, BattleError, BattlePhase, BattleResult,
    BattleSnapshot, CheckpointError, CheckpointStore, Combatant, CombatantId, Control,
    DefeatPolicy, NoopStore, NullSink, OpponentTransition, Outcome, PlayerId, Side, Team, VecSink,
};
use rust_decimal::Decimal;

const HERO: CombatantId = CombatantId(1);
const WOLF: CombatantId = CombatantId(2);

fn hero(damage: i64) -> Combatant {
    Combatant::player(HERO, "Aria", PlayerId(7), Decimal::from(1000))
        .with_damage(Decimal::from(damage))
}

fn wolf(owner: PlayerId) -> Combatant {
    Combatant::pet(WOLF, "Wolf", owner, Decimal::from(1000)).with_damage(Decimal::from(5))
}

fn monster(id: u32, name: &str, hp: i64) -> Combatant {
    Combatant::monster(CombatantId(id), name, Decimal::from(hp))
}

/// No variance and zero base damage: every landed hit deals nothing.
fn inert_config() -> BattleConfig {
    BattleConfig {
        damage_variance: 0,
        ..BattleConfig::default()
    }
}

struct FailingStore;

impl CheckpointStore for FailingStore {
    fn save(&mut self, _snapshot: &BattleSnapshot) -> Result<(), CheckpointError> {
        Err(CheckpointError::Unavailable("disk full".into()))
    }
}

fn run_to_end(battle: &mut Battle, now: Instant, env: &mut BattleEnv<'_>) -> BattleResult {
    for _ in 0..500 {
        if let Some(result) = battle.step(now, env).expect("battle started") {
            return result;
        }
    }
    panic!("battle did not finish");
}

#[test]
fn kill_on_the_last_tick_beats_timeout() {
    let config = BattleConfig::default()
        .with_guaranteed_player_hits(true)
        .with_timeout_secs(60);
    let mut battle = Battle::new(
        Team::new("Heroes").with_member(hero(1000)),
        Team::new("Den").with_member(monster(10, "Rat", 10)),
        config,
        7,
    );
    let mut store = NoopStore;
    let mut sink = NullSink;
    let mut env = BattleEnv::new(&mut store, &mut sink);
    let t0 = Instant::now();
    battle.start(t0, &mut env).unwrap();

    while battle.peek_next_actor() != Some(HERO) {
        assert_eq!(battle.step(t0, &mut env).unwrap(), None);
    }

    let late = t0 + Duration::from_secs(61);
    let result = battle.step(late, &mut env).unwrap().expect("decided");
    assert_eq!(result.outcome, Outcome::Victory);
    assert_eq!(result.winner, Some(Side::Challengers));
}

#[test]
fn timeout_awards_the_healthier_side() {
    let mut battle = Battle::new(
        Team::new("Heroes").with_member(hero(0).with_hp(Decimal::from(500))),
        Team::new("Den").with_member(monster(10, "Golem", 1000)),
        inert_config().with_timeout_secs(30),
        11,
    );
    let mut store = NoopStore;
    let mut sink = NullSink;
    let mut env = BattleEnv::new(&mut store, &mut sink);
    let t0 = Instant::now();
    battle.start(t0, &mut env).unwrap();

    assert_eq!(battle.step(t0 + Duration::from_secs(5), &mut env).unwrap(), None);
    let result = battle
        .step(t0 + Duration::from_secs(30), &mut env)
        .unwrap()
        .expect("timed out");
    assert_eq!(result.outcome, Outcome::Timeout);
    assert_eq!(result.winner, Some(Side::Opponents));
}

#[test]
fn timeout_with_equal_health_is_a_draw() {
    let mut battle = Battle::new(
        Team::new("Heroes").with_member(hero(0)),
        Team::new("Den").with_member(monster(10, "Golem", 1000)),
        inert_config().with_timeout_secs(30),
        11,
    );
    let mut store = NoopStore;
    let mut sink = NullSink;
    let mut env = BattleEnv::new(&mut store, &mut sink);
    let t0 = Instant::now();
    battle.start(t0, &mut env).unwrap();

    let result = battle
        .step(t0 + Duration::from_secs(31), &mut env)
        .unwrap()
        .expect("timed out");
    assert_eq!(result.outcome, Outcome::Draw);
    assert_eq!(result.winner, None);
}

#[test]
fn opponent_succession_takes_its_own_tick() {
    let config = inert_config().with_guaranteed_player_hits(true);
    let mut battle = Battle::new(
        Team::new("Heroes").with_member(hero(1000)),
        Team::new("Den")
            .with_member(monster(10, "Rat", 10))
            .with_member(monster(11, "Rat King", 10)),
        config,
        3,
    );
    let mut store = NoopStore;
    let mut sink = NullSink;
    let mut env = BattleEnv::new(&mut store, &mut sink);
    let t0 = Instant::now();
    battle.start(t0, &mut env).unwrap();

    let mut guard = 0;
    while battle.transition() != OpponentTransition::Armed {
        assert_eq!(battle.step(t0, &mut env).unwrap(), None);
        guard += 1;
        assert!(guard < 10, "first opponent never fell");
    }
    assert_eq!(battle.peek_next_actor(), None);
    assert!(battle.log().last().unwrap().message.contains("has fallen"));

    let ticks = battle.ticks();
    assert_eq!(battle.step(t0, &mut env).unwrap(), None);
    assert_eq!(battle.ticks(), ticks + 1);
    assert_eq!(battle.transition(), OpponentTransition::Idle);
    assert_eq!(battle.active_opponent().map(|o| o.id), Some(CombatantId(11)));
    assert!(battle.log().last().unwrap().message.contains("Rat King steps forward"));

    let result = run_to_end(&mut battle, t0, &mut env);
    assert_eq!(result.outcome, Outcome::Victory);
}

#[test]
fn checkpoints_on_start_and_finish() {
    let mut battle = Battle::new(
        Team::new("Heroes").with_member(hero(1000)),
        Team::new("Den").with_member(monster(10, "Rat", 10)),
        BattleConfig::default().with_guaranteed_player_hits(true),
        5,
    );
    let mut store: Vec<BattleSnapshot> = Vec::new();
    let mut sink = NullSink;
    let t0 = Instant::now();
    {
        let mut env = BattleEnv::new(&mut store, &mut sink);
        battle.start(t0, &mut env).unwrap();
        run_to_end(&mut battle, t0, &mut env);
    }

    assert_eq!(store.len(), 2);
    assert_eq!(store[0].phase, "in_progress");
    assert_eq!(store[0].result, None);
    assert_eq!(store[1].phase, "finished");
    assert_eq!(
        store[1].result.as_ref().map(|r| r.outcome),
        Some(Outcome::Victory)
    );
    assert!(store[1].log_len > store[0].log_len);
}

#[test]
fn failed_opening_checkpoint_aborts() {
    let mut battle = Battle::new(
        Team::new("Heroes").with_member(hero(10)),
        Team::new("Den").with_member(monster(10, "Rat", 10)),
        BattleConfig::default(),
        5,
    );
    let mut store = FailingStore;
    let mut sink = VecSink::new();
    let t0 = Instant::now();
    {
        let mut env = BattleEnv::new(&mut store, &mut sink);
        battle.start(t0, &mut env).unwrap();
        let again = battle.step(t0, &mut env).unwrap().expect("already finished");
        assert_eq!(again.outcome, Outcome::Aborted(AbortReason::CheckpointFailed));
    }

    assert!(battle.is_finished());
    assert_eq!(battle.ticks(), 0);
    assert!(sink.warnings().any(|w| w.contains("opening checkpoint")));
}

#[test]
fn lifecycle_misuse_is_reported() {
    let mut battle = Battle::new(
        Team::new("Heroes").with_member(hero(10)),
        Team::new("Den").with_member(monster(10, "Rat", 100)),
        BattleConfig::default(),
        1,
    );
    let mut store = NoopStore;
    let mut sink = NullSink;
    let t0 = Instant::now();

    assert_eq!(
        battle.bind_skills(CombatantId(99), &["Flame Burst"], &mut NullSink),
        Err(BattleError::CombatantNotFound(CombatantId(99)))
    );
    let binding = battle
        .bind_skills(HERO, &["Flame Burst", "Treasure Sense"], &mut NullSink)
        .unwrap();
    assert_eq!(binding.bound.len(), 1);

    let mut env = BattleEnv::new(&mut store, &mut sink);
    assert_eq!(battle.step(t0, &mut env), Err(BattleError::NotStarted));
    battle.start(t0, &mut env).unwrap();
    assert_eq!(battle.start(t0, &mut env), Err(BattleError::AlreadyStarted));
    assert_eq!(
        battle.bind_skills(HERO, &["Tidal Wave"], &mut NullSink),
        Err(BattleError::AlreadyStarted)
    );

    let result = battle.abort(AbortReason::Cancelled, &mut env);
    assert_eq!(result.outcome, Outcome::Aborted(AbortReason::Cancelled));
    assert_eq!(result.winner, None);
    assert_eq!(battle.phase(), &BattlePhase::Finished(result));
}

#[test]
fn pets_are_benched_when_disallowed() {
    let config = BattleConfig {
        allow_pets: false,
        ..BattleConfig::default()
    };
    let battle = Battle::new(
        Team::new("Heroes")
            .with_member(hero(10))
            .with_member(wolf(PlayerId(7))),
        Team::new("Den").with_member(monster(10, "Rat", 100)),
        config,
        1,
    );
    assert_eq!(battle.challengers().len(), 1);
    assert!(battle.combatant(WOLF).is_none());
}

#[test]
fn player_death_ends_the_battle_unless_configured_otherwise() {
    let challengers = || {
        Team::new("Heroes")
            .with_member(hero(0).with_hp(Decimal::ZERO))
            .with_member(wolf(PlayerId(7)))
    };
    let den = || Team::new("Den").with_member(monster(10, "Golem", 100_000));

    let mut battle = Battle::new(challengers(), den(), inert_config(), 9);
    assert_eq!(battle.challengers().policy, DefeatPolicy::PlayerDown);
    let mut store = NoopStore;
    let mut sink = NullSink;
    let mut env = BattleEnv::new(&mut store, &mut sink);
    let t0 = Instant::now();
    battle.start(t0, &mut env).unwrap();
    let result = battle.step(t0, &mut env).unwrap().expect("player already down");
    assert_eq!(result.outcome, Outcome::Defeat);

    let config = BattleConfig {
        continue_after_player_death: true,
        ..inert_config()
    };
    let mut battle = Battle::new(challengers(), den(), config, 9);
    assert_eq!(battle.challengers().policy, DefeatPolicy::AllDown);
    battle.start(t0, &mut env).unwrap();
    assert_eq!(battle.step(t0, &mut env).unwrap(), None);
}

#[test]
fn same_seed_replays_the_same_log() {
    let play = || {
        let mut battle = Battle::new(
            Team::new("Heroes")
                .with_member(hero(60))
                .with_member(wolf(PlayerId(7))),
            Team::new("Den")
                .with_member(monster(10, "Rat", 300).with_damage(Decimal::from(40)))
                .with_member(monster(11, "Rat King", 400).with_damage(Decimal::from(50))),
            BattleConfig::default(),
            424242,
        );
        let mut store = NoopStore;
        let mut sink = NullSink;
        let mut env = BattleEnv::new(&mut store, &mut sink);
        let t0 = Instant::now();
        battle.start(t0, &mut env).unwrap();
        let result = run_to_end(&mut battle, t0, &mut env);
        let lines: Vec<String> = battle
            .log()
            .entries()
            .iter()
            .map(|entry| entry.message.clone())
            .collect();
        (result, lines)
    };

    assert_eq!(play(), play());
}

#[test]
fn attacker_killed_by_thorns_stays_dead_and_leaves_the_turn_order() {
    const IMP: CombatantId = CombatantId(3);
    const GOLEM: CombatantId = CombatantId(10);

    let imp = Combatant::pet(IMP, "Imp", PlayerId(7), Decimal::from(100))
        .with_hp(Decimal::from(10))
        .with_damage(Decimal::from(1000))
        .with_lifesteal(Decimal::new(5, 1));
    let config = inert_config()
        .with_guaranteed_player_hits(true)
        .with_proc_chance_override("thorn_armor", Decimal::ONE);
    let mut battle = Battle::new(
        Team::new("Heroes").with_member(hero(0)).with_member(imp),
        Team::new("Den").with_member(monster(10, "Golem", 1_000_000)),
        config,
        21,
    );
    battle
        .bind_skills(GOLEM, &["Thorn Armor"], &mut NullSink)
        .unwrap();

    let mut store = NoopStore;
    let mut sink = NullSink;
    let mut env = BattleEnv::new(&mut store, &mut sink);
    let t0 = Instant::now();
    battle.start(t0, &mut env).unwrap();

    let mut guard = 0;
    while battle.combatant(IMP).is_some_and(Combatant::is_alive) {
        assert_eq!(battle.step(t0, &mut env).unwrap(), None);
        guard += 1;
        assert!(guard < 10, "imp never attacked");
    }

    let imp = battle.combatant(IMP).unwrap();
    assert_eq!(imp.hp(), Decimal::ZERO);
    let messages: Vec<&str> = battle
        .log()
        .entries()
        .iter()
        .map(|entry| entry.message.as_str())
        .collect();
    assert!(messages.iter().any(|m| m.contains("pricks Imp")));
    assert!(!messages.iter().any(|m| m.contains("Imp steals")));

    for _ in 0..6 {
        assert_ne!(battle.peek_next_actor(), Some(IMP));
        assert_eq!(battle.step(t0, &mut env).unwrap(), None);
        assert!(!battle.combatant(IMP).unwrap().is_alive());
    }
}

#[test]
fn controlled_actor_loses_its_turn() {
    const GOLEM: CombatantId = CombatantId(10);

    let mut aria = hero(100);
    aria.add_status_effect(Box::new(Control::new("Paralyzed", 1)), None);
    let mut battle = Battle::new(
        Team::new("Heroes").with_member(aria),
        Team::new("Den").with_member(monster(10, "Golem", 10_000)),
        inert_config().with_guaranteed_player_hits(true),
        13,
    );
    let mut store = NoopStore;
    let mut sink = NullSink;
    let mut env = BattleEnv::new(&mut store, &mut sink);
    let t0 = Instant::now();
    battle.start(t0, &mut env).unwrap();

    while battle.peek_next_actor() != Some(HERO) {
        assert_eq!(battle.step(t0, &mut env).unwrap(), None);
    }
    let before = battle_hp(&battle, GOLEM);
    let from = battle.log().len() as u64;
    assert_eq!(battle.step(t0, &mut env).unwrap(), None);
    let lines: Vec<&str> = battle
        .log()
        .since(from)
        .iter()
        .map(|entry| entry.message.as_str())
        .collect();
    assert!(lines.contains(&"Aria is unable to act."), "{lines:?}");
    assert!(lines.contains(&"Aria's Paralyzed wears off."), "{lines:?}");
    assert_eq!(battle_hp(&battle, GOLEM), before);

    while battle.peek_next_actor() != Some(HERO) {
        assert_eq!(battle.step(t0, &mut env).unwrap(), None);
    }
    assert_eq!(battle.step(t0, &mut env).unwrap(), None);
    assert_eq!(battle_hp(&battle, GOLEM), before - Decimal::from(100));
}

fn battle_hp(battle: &Battle, id: CombatantId) -> Decimal {
    battle.combatant(id).map(Combatant::hp).unwrap_or_default()
}
