mod facts;

use tracing::{info, warn};

pub use facts::{FactScope, FactStore, FactStoreError};

pub const GOODIE_COUNTERS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VictoryRule {
    /// Win after this many destination arrivals.
    Destination(u32),
    /// Win when every goodie counter reaches its threshold.
    Goodies([i32; GOODIE_COUNTERS]),
    /// Win after this many enemy defeats; `None` means every enemy created so far.
    EnemyCount(Option<u32>),
    /// Win after this many seconds of play.
    Survive(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Playing,
    Won,
    Lost,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Playing => "playing",
            Outcome::Won => "won",
            Outcome::Lost => "lost",
        }
    }
}

#[derive(Debug)]
pub struct Score {
    goodies: [i32; GOODIE_COUNTERS],
    enemies_created: u32,
    enemies_defeated: u32,
    heroes_created: u32,
    heroes_defeated: u32,
    arrivals: u32,
    victory: Option<VictoryRule>,
    lose_countdown: Option<f32>,
    win_countdown: Option<f32>,
    survive_elapsed: f32,
    must_survive_lost: bool,
    outcome: Outcome,
    facts: FactStore,
}

impl Default for Score {
    fn default() -> Self {
        Self::new(FactStore::in_memory())
    }
}

impl Score {
    pub fn new(facts: FactStore) -> Self {
        Self {
            goodies: [0; GOODIE_COUNTERS],
            enemies_created: 0,
            enemies_defeated: 0,
            heroes_created: 0,
            heroes_defeated: 0,
            arrivals: 0,
            victory: None,
            lose_countdown: None,
            win_countdown: None,
            survive_elapsed: 0.0,
            must_survive_lost: false,
            outcome: Outcome::Playing,
            facts,
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn victory(&self) -> Option<VictoryRule> {
        self.victory
    }

    pub fn set_victory_destination(&mut self, count: u32) {
        self.set_victory(VictoryRule::Destination(count));
    }

    pub fn set_victory_goodies(&mut self, v1: i32, v2: i32, v3: i32, v4: i32) {
        self.set_victory(VictoryRule::Goodies([v1, v2, v3, v4]));
    }

    pub fn set_victory_enemy_count(&mut self, count: Option<u32>) {
        self.set_victory(VictoryRule::EnemyCount(count));
    }

    pub fn set_victory_survive(&mut self, seconds: f32) {
        self.set_victory(VictoryRule::Survive(seconds.max(0.0)));
    }

    fn set_victory(&mut self, rule: VictoryRule) {
        if let Some(existing) = self.victory {
            warn!(existing = ?existing, ignored = ?rule, "victory_rule_already_set");
            return;
        }
        self.victory = Some(rule);
    }

    /// Counter `n` in `1..=4`; other indices read as 0.
    pub fn goodies(&self, n: usize) -> i32 {
        counter_index(n).map_or(0, |index| self.goodies[index])
    }

    pub fn goodie_counts(&self) -> [i32; GOODIE_COUNTERS] {
        self.goodies
    }

    pub fn increment_goodies(&mut self, n: usize, by: i32) {
        match counter_index(n) {
            Some(index) => self.goodies[index] = self.goodies[index].saturating_add(by),
            None => warn!(counter = n, "goodie_counter_out_of_range"),
        }
    }

    pub fn set_goodies(&mut self, n: usize, value: i32) {
        match counter_index(n) {
            Some(index) => self.goodies[index] = value,
            None => warn!(counter = n, "goodie_counter_out_of_range"),
        }
    }

    pub(crate) fn add_goodie_vector(&mut self, vector: [i32; GOODIE_COUNTERS]) {
        for (counter, delta) in self.goodies.iter_mut().zip(vector) {
            *counter = counter.saturating_add(delta);
        }
    }

    pub fn enemies_created(&self) -> u32 {
        self.enemies_created
    }

    pub fn enemies_defeated(&self) -> u32 {
        self.enemies_defeated
    }

    pub fn heroes_created(&self) -> u32 {
        self.heroes_created
    }

    pub fn heroes_defeated(&self) -> u32 {
        self.heroes_defeated
    }

    pub fn arrivals(&self) -> u32 {
        self.arrivals
    }

    pub(crate) fn note_enemy_created(&mut self) {
        self.enemies_created += 1;
    }

    pub(crate) fn note_enemy_defeated(&mut self) {
        self.enemies_defeated += 1;
    }

    pub(crate) fn note_hero_created(&mut self) {
        self.heroes_created += 1;
    }

    pub(crate) fn note_hero_defeated(&mut self, must_survive: bool) {
        self.heroes_defeated += 1;
        self.must_survive_lost |= must_survive;
    }

    pub(crate) fn note_arrival(&mut self) {
        self.arrivals += 1;
    }

    pub fn set_lose_countdown(&mut self, seconds: f32) {
        self.lose_countdown = Some(seconds.max(0.0));
    }

    pub fn lose_countdown(&self) -> Option<f32> {
        self.lose_countdown
    }

    pub fn set_win_countdown(&mut self, seconds: f32) {
        self.win_countdown = Some(seconds.max(0.0));
    }

    pub fn win_countdown(&self) -> Option<f32> {
        self.win_countdown
    }

    /// Seconds left on a survive rule, if one is active.
    pub fn survive_remaining(&self) -> Option<f32> {
        match self.victory {
            Some(VictoryRule::Survive(seconds)) => Some((seconds - self.survive_elapsed).max(0.0)),
            _ => None,
        }
    }

    pub(crate) fn tick_countdowns(&mut self, dt: f32) {
        if self.outcome != Outcome::Playing {
            return;
        }
        if let Some(remaining) = self.lose_countdown.as_mut() {
            *remaining = (*remaining - dt).max(0.0);
        }
        if let Some(remaining) = self.win_countdown.as_mut() {
            *remaining = (*remaining - dt).max(0.0);
        }
        if matches!(self.victory, Some(VictoryRule::Survive(_))) {
            self.survive_elapsed += dt;
        }
    }

    /// Settles the outcome once; later calls keep the first terminal result.
    pub(crate) fn evaluate(&mut self) -> Outcome {
        if self.outcome != Outcome::Playing {
            return self.outcome;
        }
        let next = if self.must_survive_lost || self.lose_countdown == Some(0.0) {
            Outcome::Lost
        } else if self.is_won() {
            Outcome::Won
        } else if self.no_hero_left() {
            Outcome::Lost
        } else {
            Outcome::Playing
        };
        if next != Outcome::Playing {
            info!(
                outcome = next.as_str(),
                arrivals = self.arrivals,
                enemies_defeated = self.enemies_defeated,
                heroes_defeated = self.heroes_defeated,
                "level_outcome"
            );
            self.outcome = next;
        }
        self.outcome
    }

    /// Every hero is either defeated or already parked at a destination.
    fn no_hero_left(&self) -> bool {
        self.heroes_defeated > 0 && self.heroes_defeated + self.arrivals >= self.heroes_created
    }

    fn is_won(&self) -> bool {
        if self.win_countdown == Some(0.0) {
            return true;
        }
        match self.victory {
            None => false,
            Some(VictoryRule::Destination(count)) => self.arrivals >= count,
            Some(VictoryRule::Goodies(thresholds)) => self
                .goodies
                .iter()
                .zip(thresholds)
                .all(|(counter, threshold)| *counter >= threshold),
            Some(VictoryRule::EnemyCount(Some(count))) => self.enemies_defeated >= count,
            Some(VictoryRule::EnemyCount(None)) => {
                self.enemies_created > 0 && self.enemies_defeated >= self.enemies_created
            }
            Some(VictoryRule::Survive(seconds)) => self.survive_elapsed >= seconds,
        }
    }

    pub fn facts(&self) -> &FactStore {
        &self.facts
    }

    pub fn facts_mut(&mut self) -> &mut FactStore {
        &mut self.facts
    }

    pub(crate) fn into_facts(self) -> FactStore {
        self.facts
    }

    pub fn level_fact<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.facts.get_or(FactScope::Level, key, default)
    }

    pub fn session_fact<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.facts.get_or(FactScope::Session, key, default)
    }

    pub fn game_fact<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.facts.get_or(FactScope::Game, key, default)
    }

    pub fn set_level_fact(&mut self, key: &str, value: &str) {
        self.facts.set(FactScope::Level, key, value);
    }

    pub fn set_session_fact(&mut self, key: &str, value: &str) {
        self.facts.set(FactScope::Session, key, value);
    }

    pub fn set_game_fact(&mut self, key: &str, value: &str) {
        self.facts.set(FactScope::Game, key, value);
    }
}

fn counter_index(n: usize) -> Option<usize> {
    (1..=GOODIE_COUNTERS).contains(&n).then(|| n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_rule_never_wins() {
        let mut score = Score::default();
        score.note_hero_created();
        score.note_arrival();
        score.add_goodie_vector([9, 9, 9, 9]);
        assert_eq!(score.evaluate(), Outcome::Playing);
    }

    #[test]
    fn second_victory_rule_is_ignored() {
        let mut score = Score::default();
        score.set_victory_destination(2);
        score.set_victory_enemy_count(None);
        assert_eq!(score.victory(), Some(VictoryRule::Destination(2)));
    }

    #[test]
    fn goodie_thresholds_need_every_counter() {
        let mut score = Score::default();
        score.set_victory_goodies(2, 0, 1, 0);
        score.increment_goodies(1, 2);
        assert_eq!(score.evaluate(), Outcome::Playing);
        score.set_goodies(3, 1);
        assert_eq!(score.evaluate(), Outcome::Won);
    }

    #[test]
    fn counters_may_go_negative_and_ignore_bad_indices() {
        let mut score = Score::default();
        score.set_goodies(1, 5);
        score.add_goodie_vector([-2, 0, 0, 0]);
        score.increment_goodies(9, 4);
        assert_eq!(score.goodies(1), 3);
        assert_eq!(score.goodies(0), 0);
        score.increment_goodies(2, -1);
        assert_eq!(score.goodies(2), -1);
        assert_eq!(score.goodie_counts(), [3, -1, 0, 0]);
    }

    #[test]
    fn enemy_count_without_target_needs_created_enemies() {
        let mut score = Score::default();
        score.set_victory_enemy_count(None);
        assert_eq!(score.evaluate(), Outcome::Playing);

        score.note_enemy_created();
        score.note_enemy_created();
        score.note_enemy_defeated();
        assert_eq!(score.evaluate(), Outcome::Playing);
        score.note_enemy_defeated();
        assert_eq!(score.evaluate(), Outcome::Won);
    }

    #[test]
    fn losing_last_hero_loses() {
        let mut score = Score::default();
        score.set_victory_destination(2);
        score.note_hero_created();
        score.note_hero_created();
        score.note_hero_defeated(false);
        assert_eq!(score.evaluate(), Outcome::Playing);
        score.note_arrival();
        assert_eq!(score.evaluate(), Outcome::Lost);
    }

    #[test]
    fn must_survive_hero_loses_immediately() {
        let mut score = Score::default();
        score.note_hero_created();
        score.note_hero_created();
        score.note_hero_defeated(true);
        assert_eq!(score.evaluate(), Outcome::Lost);
    }

    #[test]
    fn lose_countdown_ends_level() {
        let mut score = Score::default();
        score.set_victory_destination(1);
        score.set_lose_countdown(0.5);
        score.tick_countdowns(0.25);
        assert_eq!(score.evaluate(), Outcome::Playing);
        assert_eq!(score.lose_countdown(), Some(0.25));
        score.tick_countdowns(0.25);
        assert_eq!(score.evaluate(), Outcome::Lost);
    }

    #[test]
    fn survive_rule_and_win_countdown_win() {
        let mut survive = Score::default();
        survive.set_victory_survive(1.0);
        for _ in 0..3 {
            survive.tick_countdowns(0.25);
        }
        assert_eq!(survive.survive_remaining(), Some(0.25));
        assert_eq!(survive.evaluate(), Outcome::Playing);
        survive.tick_countdowns(0.25);
        assert_eq!(survive.evaluate(), Outcome::Won);

        let mut countdown = Score::default();
        countdown.set_win_countdown(0.5);
        countdown.tick_countdowns(0.5);
        assert_eq!(countdown.evaluate(), Outcome::Won);
    }

    #[test]
    fn outcome_is_terminal() {
        let mut score = Score::default();
        score.set_victory_destination(1);
        score.note_hero_created();
        score.note_arrival();
        assert_eq!(score.evaluate(), Outcome::Won);
        score.note_hero_defeated(true);
        assert_eq!(score.evaluate(), Outcome::Won);
    }

    #[test]
    fn fact_round_trip_per_scope() {
        let mut score = Score::default();
        score.set_level_fact("crossings", "2");
        score.set_session_fact("attempts", "5");
        score.set_game_fact("best", "40");
        assert_eq!(score.level_fact("crossings", "0"), "2");
        assert_eq!(score.session_fact("attempts", "0"), "5");
        assert_eq!(score.game_fact("best", "0"), "40");
        assert_eq!(score.level_fact("missing", "none"), "none");
    }
}
