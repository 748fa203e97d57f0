use crate::{clutch, economy, source, tracker};

/// Maximum time between a teammate's death and a kill on their killer for it
/// to count as a trade.
pub const TRADE_WINDOW: std::time::Duration = std::time::Duration::from_secs(5);

pub struct Config {
    pub trade_window: std::time::Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trade_window: TRADE_WINDOW,
        }
    }
}

#[derive(Debug)]
pub enum ParseError<E> {
    /// The decoder could not identify the stream as a demo.
    Header(E),
    /// The decoder failed mid stream.
    Stream(E),
}

// Round end reason codes as emitted by the engine, see
// https://github.com/markus-wa/demoinfocs-golang/blob/master/pkg/demoinfocs/events/events.go
static WIN_METHOD: phf::Map<i32, common::WinMethod> = phf::phf_map! {
    1_i32 => common::WinMethod::BombExploded,
    7_i32 => common::WinMethod::BombDefused,
    8_i32 => common::WinMethod::Elimination,
    9_i32 => common::WinMethod::Elimination,
    12_i32 => common::WinMethod::TimeExpired,
};

fn win_method(reason: i32) -> common::WinMethod {
    WIN_METHOD
        .get(&reason)
        .copied()
        .unwrap_or(common::WinMethod::Unknown)
}

fn winner_side(team: source::TeamId) -> common::Side {
    match team {
        source::TeamId::CounterTerrorists => common::Side::CT,
        _ => common::Side::T,
    }
}

fn player_side(team: source::TeamId) -> Option<common::Side> {
    match team {
        source::TeamId::CounterTerrorists => Some(common::Side::CT),
        source::TeamId::Terrorists => Some(common::Side::T),
        _ => None,
    }
}

/// Side the team that started as CT plays in the given round. Sides swap at
/// round 13 and then at every 3-round overtime half starting with round 25.
fn starting_ct_side(round: u32) -> common::Side {
    let half = if round <= 12 {
        0
    } else if round <= 24 {
        1
    } else {
        2 + (round - 25) / 3
    };
    if half % 2 == 0 {
        common::Side::CT
    } else {
        common::Side::T
    }
}

pub fn parse<S>(source: &mut S) -> Result<common::Match, ParseError<S::Error>>
where
    S: source::DemoSource,
{
    parse_with_config(&Config::default(), source)
}

#[tracing::instrument(name = "MatchAnalysis", skip(config, source))]
pub fn parse_with_config<S>(
    config: &Config,
    source: &mut S,
) -> Result<common::Match, ParseError<S::Error>>
where
    S: source::DemoSource,
{
    let header = source.header().map_err(ParseError::Header)?;

    let mut state = MatchState::new(config);
    // header fields are only populated for CS:GO demos, CS2 fills the map in
    // via ServerInfo and the duration via the clock fallback below
    if !header.map_name.is_empty() {
        state.map_name = header.map_name;
    }
    state.duration = header.playback_time;

    while let Some(event) = source.next_event() {
        let event = event.map_err(ParseError::Stream)?;
        state.handle_event(event, source);
    }

    if state.duration.is_zero() {
        state.duration = source.current_time();
        tracing::debug!("Zero playback time in header, using final clock time");
    }

    Ok(state.build_match(source))
}

struct RecentDeath {
    victim: u64,
    killer: u64,
    time: std::time::Duration,
    round: u32,
}

/// Mutable analysis state, driven by one event at a time.
#[derive(Default)]
struct MatchState {
    map_name: String,
    duration: std::time::Duration,

    players: std::collections::HashMap<u64, tracker::PlayerTracker>,
    rounds: Vec<common::Round>,

    round_num: u32,
    round_start: std::time::Duration,
    round_kills: Vec<common::KillEvent>,
    round_bomb: Option<common::BombEvent>,
    round_defuse: Option<common::BombEvent>,
    round_has_first_kill: bool,

    // alive snapshots for clutch detection: initial_* are frozen at the
    // round start snapshot, alive_* shrink as kills come in
    initial_alive_ct: std::collections::HashSet<u64>,
    initial_alive_t: std::collections::HashSet<u64>,
    alive_ct: std::collections::HashSet<u64>,
    alive_t: std::collections::HashSet<u64>,

    recent_deaths: Vec<RecentDeath>,

    ct_name: String,
    t_name: String,

    ct_economy: common::EconomySnapshot,
    t_economy: common::EconomySnapshot,

    // entity based damage tracking for CS2 demos without PlayerHurt events
    prev_damage: std::collections::HashMap<u64, i32>,
    has_hurt_events: bool,
    entity_damage_mode: bool,

    has_freezetime_end: bool,
    round_end_snapshots: bool,

    trade_window: std::time::Duration,
}

impl MatchState {
    fn new(config: &Config) -> Self {
        Self {
            trade_window: config.trade_window,
            ..Self::default()
        }
    }

    fn handle_event<S>(&mut self, event: source::DemoEvent, source: &S)
    where
        S: source::DemoSource,
    {
        match event {
            source::DemoEvent::MatchStart => self.on_match_start(),
            source::DemoEvent::RoundStart => self.on_round_start(),
            source::DemoEvent::RoundFreezetimeEnd => self.on_freezetime_end(source),
            source::DemoEvent::Kill(kill) => self.on_kill(kill, source),
            source::DemoEvent::PlayerHurt(hurt) => self.on_player_hurt(hurt),
            source::DemoEvent::BombPlanted(bomb) => {
                if let Some(event) = self.bomb_event(bomb, source) {
                    self.round_bomb = Some(event);
                }
            }
            source::DemoEvent::BombDefused(bomb) => {
                if let Some(event) = self.bomb_event(bomb, source) {
                    self.round_defuse = Some(event);
                }
            }
            source::DemoEvent::RoundEnd(end) => self.on_round_end(end, source),
            source::DemoEvent::ServerInfo(info) => {
                if !info.map_name.is_empty() {
                    tracing::debug!(map = %info.map_name, "Map name from server info");
                    self.map_name = info.map_name;
                }
            }
        }
    }

    fn ensure_player(&mut self, steam_id: u64, name: &str, team: source::TeamId) {
        if steam_id == 0 {
            return;
        }
        self.players
            .entry(steam_id)
            .or_insert_with(|| tracker::PlayerTracker::new(steam_id))
            .observe(name, player_side(team));
    }

    fn on_match_start(&mut self) {
        tracing::debug!("Match start, dropping warmup state");
        self.rounds.clear();
        self.round_num = 0;
        for tracker in self.players.values_mut() {
            tracker.reset();
        }
    }

    fn on_round_start(&mut self) {
        self.round_num += 1;
        self.round_kills.clear();
        self.recent_deaths.clear();
        self.round_bomb = None;
        self.round_defuse = None;
        self.round_has_first_kill = false;

        self.initial_alive_ct.clear();
        self.initial_alive_t.clear();
        self.alive_ct.clear();
        self.alive_t.clear();
    }

    fn on_freezetime_end<S>(&mut self, source: &S)
    where
        S: source::DemoSource,
    {
        self.has_freezetime_end = true;
        self.snapshot_round_start(source);
    }

    /// Capture the round start timestamp, the alive players per side, the
    /// clan names and the economy. Runs at freeze time end, or at round end
    /// for demos that never emit the freeze end event. The alive sets were
    /// already cleared on `RoundStart`, this only populates them.
    fn snapshot_round_start<S>(&mut self, source: &S)
    where
        S: source::DemoSource,
    {
        self.round_start = source.current_time();

        for pl in source.playing() {
            if pl.steam_id == 0 {
                continue;
            }
            self.ensure_player(pl.steam_id, &pl.name, pl.team);
            if !pl.is_alive {
                continue;
            }
            match pl.team {
                source::TeamId::CounterTerrorists => {
                    self.initial_alive_ct.insert(pl.steam_id);
                    self.alive_ct.insert(pl.steam_id);
                }
                source::TeamId::Terrorists => {
                    self.initial_alive_t.insert(pl.steam_id);
                    self.alive_t.insert(pl.steam_id);
                }
                _ => {}
            }
        }

        let ct = source.team_state(source::TeamId::CounterTerrorists);
        let t = source.team_state(source::TeamId::Terrorists);
        if let Some(ct) = ct.as_ref() {
            self.ct_name = ct.clan_name.clone();
        }
        if let Some(t) = t.as_ref() {
            self.t_name = t.clan_name.clone();
        }

        self.ct_economy = economy::snapshot_team_economy(source, ct.as_ref(), self.round_num);
        self.t_economy = economy::snapshot_team_economy(source, t.as_ref(), self.round_num);
    }

    fn on_kill<S>(&mut self, kill: source::Kill, source: &S)
    where
        S: source::DemoSource,
    {
        if self.round_num == 0 {
            // warmup or pre-match
            return;
        }

        let kill_time = source.current_time();

        let (attacker_id, attacker_name, attacker_position) = match kill.killer.as_ref() {
            Some(p) => (p.steam_id, p.name.clone(), p.position),
            None => (0, String::new(), common::Position::default()),
        };
        let (victim_id, victim_name, victim_position) = match kill.victim.as_ref() {
            Some(p) => (p.steam_id, p.name.clone(), p.position),
            None => (0, String::new(), common::Position::default()),
        };
        let (assister_id, assister_name) = match kill.assister.as_ref() {
            Some(p) => (p.steam_id, p.name.clone()),
            None => (0, String::new()),
        };

        if let Some(p) = kill.killer.as_ref() {
            self.ensure_player(p.steam_id, &p.name, p.team);
        }
        if let Some(p) = kill.victim.as_ref() {
            self.ensure_player(p.steam_id, &p.name, p.team);
        }
        if let Some(p) = kill.assister.as_ref() {
            self.ensure_player(p.steam_id, &p.name, p.team);
        }

        // trade detection: does this kill avenge a recent teammate death?
        let mut is_trade = false;
        if kill.killer.is_some() && kill.victim.is_some() {
            for rd in &self.recent_deaths {
                if rd.killer == victim_id
                    && kill_time.saturating_sub(rd.time) <= self.trade_window
                    && rd.round == self.round_num
                {
                    is_trade = true;
                    if let Some(pt) = self.players.get_mut(&attacker_id) {
                        pt.record_trade_kill();
                    }
                    if let Some(pt) = self.players.get_mut(&rd.victim) {
                        pt.mark_traded(self.round_num);
                    }
                    break;
                }
            }
        }

        self.round_kills.push(common::KillEvent {
            tick: source.ingame_tick(),
            round_number: self.round_num,
            attacker_steam_id: attacker_id,
            attacker_name,
            attacker_position,
            victim_steam_id: victim_id,
            victim_name,
            victim_position,
            weapon: kill.weapon.clone().unwrap_or_default(),
            is_headshot: kill.is_headshot,
            is_wallbang: kill.penetrated_objects > 0,
            assister_steam_id: assister_id,
            assister_name,
            is_flash_assist: kill.assisted_flash,
            is_trade,
            time: kill_time,
        });

        if attacker_id != 0 {
            if let Some(pt) = self.players.get_mut(&attacker_id) {
                pt.record_kill(self.round_num, kill.is_headshot);
            }
        }
        if victim_id != 0 {
            if let Some(pt) = self.players.get_mut(&victim_id) {
                pt.record_death();
            }
        }
        if assister_id != 0 {
            if let Some(pt) = self.players.get_mut(&assister_id) {
                if kill.assisted_flash {
                    pt.record_flash_assist(self.round_num);
                } else {
                    pt.record_assist(self.round_num);
                }
            }
        }

        if !self.round_has_first_kill {
            self.round_has_first_kill = true;
            if attacker_id != 0 {
                if let Some(pt) = self.players.get_mut(&attacker_id) {
                    pt.record_first_kill();
                }
            }
            if victim_id != 0 {
                if let Some(pt) = self.players.get_mut(&victim_id) {
                    pt.record_first_death();
                }
            }
        }

        if kill.victim.is_some() {
            self.recent_deaths.push(RecentDeath {
                victim: victim_id,
                killer: attacker_id,
                time: kill_time,
                round: self.round_num,
            });
        }

        self.alive_ct.remove(&victim_id);
        self.alive_t.remove(&victim_id);
    }

    fn on_player_hurt(&mut self, hurt: source::PlayerHurt) {
        if self.round_num == 0 {
            return;
        }
        let (attacker, player) = match (hurt.attacker.as_ref(), hurt.player.as_ref()) {
            (Some(a), Some(p)) => (a, p),
            _ => return,
        };
        if attacker.steam_id == 0 {
            return;
        }
        // friendly fire stays out of ADR
        if attacker.team == player.team {
            return;
        }

        self.ensure_player(attacker.steam_id, &attacker.name, attacker.team);
        self.has_hurt_events = true;

        // HealthDamageTaken is pre-capped at the victim's remaining health,
        // fall back to HealthDamage with the overkill subtracted back out
        let mut damage = hurt.health_damage_taken;
        if damage <= 0 {
            damage = hurt.health_damage + hurt.health.min(0);
            if damage < 0 {
                damage = 0;
            }
        }

        if let Some(pt) = self.players.get_mut(&attacker.steam_id) {
            pt.record_damage(damage as usize);
            if hurt.weapon_class == source::EquipmentClass::Grenade {
                pt.record_utility_damage(damage as usize);
            }
        }
    }

    fn bomb_event<S>(&self, bomb: source::BombAction, source: &S) -> Option<common::BombEvent>
    where
        S: source::DemoSource,
    {
        if self.round_num == 0 {
            return None;
        }
        let (steam_id, name) = match bomb.player {
            Some(p) => (p.steam_id, p.name),
            None => (0, String::new()),
        };
        Some(common::BombEvent {
            player_steam_id: steam_id,
            player_name: name,
            site: bomb.site,
            tick: source.ingame_tick(),
        })
    }

    fn on_round_end<S>(&mut self, end: source::RoundEnd, source: &S)
    where
        S: source::DemoSource,
    {
        if self.round_num == 0 {
            return;
        }

        let _round_guard = tracing::debug_span!("Round", number = self.round_num).entered();

        let duration = source.current_time().saturating_sub(self.round_start);

        // survivors keep their KAST credit for the round
        for pl in source.playing() {
            if pl.steam_id == 0 || !pl.is_alive {
                continue;
            }
            self.ensure_player(pl.steam_id, &pl.name, pl.team);
            if let Some(pt) = self.players.get_mut(&pl.steam_id) {
                pt.mark_survived(self.round_num);
            }
        }

        // CS2 demos never fire the freeze end event, so the snapshot taken
        // there would be empty. Capture at round end instead, where the
        // entity properties are populated.
        if !self.has_freezetime_end && !self.round_end_snapshots {
            self.round_end_snapshots = true;
            tracing::debug!("No freeze time end events, snapshotting at round end");
        }
        if self.round_end_snapshots {
            self.snapshot_round_start(source);
        }

        let kills = std::mem::take(&mut self.round_kills);
        let first_kill = if kills.is_empty() { None } else { Some(0) };
        let clutch = clutch::detect(&kills, &self.initial_alive_ct, &self.initial_alive_t);

        let round = common::Round {
            number: self.round_num,
            winner: winner_side(end.winner),
            win_method: win_method(end.reason),
            kills,
            first_kill,
            clutch,
            ct_economy: self.ct_economy.clone(),
            t_economy: self.t_economy.clone(),
            duration,
            bomb_plant: self.round_bomb.take(),
            bomb_defuse: self.round_defuse.take(),
        };
        tracing::debug!(
            round = round.number,
            winner = %round.winner,
            kills = round.kills.len(),
            "Round ended"
        );
        self.rounds.push(round);

        if !self.has_hurt_events {
            if !self.entity_damage_mode {
                self.entity_damage_mode = true;
                tracing::debug!("No hurt events, reading damage from entity properties");
            }
            self.collect_entity_damage(source);
        }
    }

    /// `m_pActionTrackingServices.m_iDamage` is cumulative, credit each
    /// player with the delta since the previous round end.
    fn collect_entity_damage<S>(&mut self, source: &S)
    where
        S: source::DemoSource,
    {
        for pl in source.playing() {
            if pl.steam_id == 0 {
                continue;
            }
            let entity = match pl.entity {
                Some(e) => e,
                None => continue,
            };
            let current = match source.entity_prop(entity, "m_pActionTrackingServices.m_iDamage") {
                Some(v) => v,
                None => continue,
            };

            let previous = self.prev_damage.get(&pl.steam_id).copied().unwrap_or(0);
            let delta = (current - previous).max(0);
            self.prev_damage.insert(pl.steam_id, current);

            if delta > 0 {
                self.ensure_player(pl.steam_id, &pl.name, pl.team);
                if let Some(pt) = self.players.get_mut(&pl.steam_id) {
                    pt.record_damage(delta as usize);
                }
            }
        }
    }

    fn build_match<S>(mut self, source: &S) -> common::Match
    where
        S: source::DemoSource,
    {
        let rounds = std::mem::take(&mut self.rounds);
        let total_rounds = rounds.len();

        let mut ct_score = source
            .team_state(source::TeamId::CounterTerrorists)
            .map(|t| t.score.max(0) as usize)
            .unwrap_or(0);
        let mut t_score = source
            .team_state(source::TeamId::Terrorists)
            .map(|t| t.score.max(0) as usize)
            .unwrap_or(0);

        // every round carries a winner, so when rounds were seen at all the
        // derived totals fully cover the match and override the decoder's
        // team state, which can be stale in some demos
        if total_rounds > 0 {
            let started_ct_wins = rounds
                .iter()
                .filter(|r| r.winner == starting_ct_side(r.number))
                .count();
            ct_score = started_ct_wins;
            t_score = total_rounds - started_ct_wins;
        }

        // CS2 matchmaking demos leave the clan names empty
        let ct_name = if self.ct_name.is_empty() {
            "Counter-Terrorists".to_owned()
        } else {
            std::mem::take(&mut self.ct_name)
        };
        let t_name = if self.t_name.is_empty() {
            "Terrorists".to_owned()
        } else {
            std::mem::take(&mut self.t_name)
        };

        let mut ct_players = std::collections::HashSet::new();
        let mut t_players = std::collections::HashSet::new();
        for pt in self.players.values() {
            match pt.team {
                Some(common::Side::CT) => {
                    ct_players.insert(pt.steam_id);
                }
                Some(common::Side::T) => {
                    t_players.insert(pt.steam_id);
                }
                None => {}
            }
        }

        let players: std::collections::HashMap<u64, common::Player> = self
            .players
            .into_iter()
            .map(|(steam_id, pt)| (steam_id, pt.finalize(total_rounds)))
            .collect();

        common::Match {
            map: self.map_name,
            date: chrono::Utc::now(),
            duration: self.duration,
            teams: [
                common::Team {
                    name: ct_name,
                    score: ct_score,
                    started_as: common::Side::CT,
                    players: ct_players,
                    rounds_won: ct_score,
                    rounds_lost: t_score,
                },
                common::Team {
                    name: t_name,
                    score: t_score,
                    started_as: common::Side::T,
                    players: t_players,
                    rounds_won: t_score,
                    rounds_lost: ct_score,
                },
            ],
            rounds,
            players,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_method_codes() {
        assert_eq!(common::WinMethod::BombExploded, win_method(1));
        assert_eq!(common::WinMethod::BombDefused, win_method(7));
        assert_eq!(common::WinMethod::Elimination, win_method(8));
        assert_eq!(common::WinMethod::Elimination, win_method(9));
        assert_eq!(common::WinMethod::TimeExpired, win_method(12));
        assert_eq!(common::WinMethod::Unknown, win_method(0));
        assert_eq!(common::WinMethod::Unknown, win_method(42));
    }

    #[test]
    fn side_swap_schedule() {
        for round in 1..=12 {
            assert_eq!(common::Side::CT, starting_ct_side(round), "round {}", round);
        }
        for round in 13..=24 {
            assert_eq!(common::Side::T, starting_ct_side(round), "round {}", round);
        }
        // overtime halves of three rounds each
        for round in 25..=27 {
            assert_eq!(common::Side::CT, starting_ct_side(round), "round {}", round);
        }
        for round in 28..=30 {
            assert_eq!(common::Side::T, starting_ct_side(round), "round {}", round);
        }
        for round in 31..=33 {
            assert_eq!(common::Side::CT, starting_ct_side(round), "round {}", round);
        }
    }

    #[test]
    fn winner_mapping() {
        assert_eq!(
            common::Side::CT,
            winner_side(source::TeamId::CounterTerrorists)
        );
        assert_eq!(common::Side::T, winner_side(source::TeamId::Terrorists));
        assert_eq!(common::Side::T, winner_side(source::TeamId::Spectator));
    }
}
