use crate::metrics;

/// Accumulates one player's counters and per-round facts across the match.
#[derive(Debug, Default)]
pub struct PlayerTracker {
    pub(crate) steam_id: u64,
    pub(crate) name: String,
    pub(crate) team: Option<common::Side>,

    kills: usize,
    deaths: usize,
    assists: usize,
    headshots: usize,
    flash_assists: usize,
    utility_damage: usize,
    trade_kills: usize,
    total_damage: usize,
    first_kills: usize,
    first_deaths: usize,

    // per-round facts feeding KAST
    round_kill: std::collections::HashSet<u32>,
    round_assist: std::collections::HashSet<u32>,
    round_survived: std::collections::HashSet<u32>,
    round_traded: std::collections::HashSet<u32>,

    kills_in_round: std::collections::HashMap<u32, usize>,
}

impl PlayerTracker {
    pub fn new(steam_id: u64) -> Self {
        Self {
            steam_id,
            ..Self::default()
        }
    }

    /// Refresh identity from a sighting. The display name is last seen wins,
    /// the team is stamped on first observation only.
    pub fn observe(&mut self, name: &str, team: Option<common::Side>) {
        if !name.is_empty() {
            self.name = name.to_owned();
        }
        if self.team.is_none() {
            self.team = team;
        }
    }

    /// Drop all accumulated stats but keep the player identity. Used when a
    /// `MatchStart` discards warmup rounds.
    pub fn reset(&mut self) {
        *self = Self {
            steam_id: self.steam_id,
            name: std::mem::take(&mut self.name),
            team: self.team,
            ..Self::default()
        };
    }

    pub fn record_kill(&mut self, round: u32, is_headshot: bool) {
        self.kills += 1;
        self.round_kill.insert(round);
        *self.kills_in_round.entry(round).or_insert(0) += 1;
        if is_headshot {
            self.headshots += 1;
        }
    }

    pub fn record_death(&mut self) {
        self.deaths += 1;
    }

    pub fn record_assist(&mut self, round: u32) {
        self.assists += 1;
        self.round_assist.insert(round);
    }

    pub fn record_flash_assist(&mut self, round: u32) {
        self.flash_assists += 1;
        self.round_assist.insert(round);
    }

    pub fn record_damage(&mut self, damage: usize) {
        self.total_damage += damage;
    }

    pub fn record_utility_damage(&mut self, damage: usize) {
        self.utility_damage += damage;
    }

    pub fn record_trade_kill(&mut self) {
        self.trade_kills += 1;
    }

    pub fn mark_traded(&mut self, round: u32) {
        self.round_traded.insert(round);
    }

    pub fn mark_survived(&mut self, round: u32) {
        self.round_survived.insert(round);
    }

    pub fn record_first_kill(&mut self) {
        self.first_kills += 1;
    }

    pub fn record_first_death(&mut self) {
        self.first_deaths += 1;
    }

    pub fn finalize(self, total_rounds: usize) -> common::Player {
        let mut kast_rounds = 0;
        let mut survived = 0;
        for round in 1..=total_rounds as u32 {
            if self.round_kill.contains(&round)
                || self.round_assist.contains(&round)
                || self.round_survived.contains(&round)
                || self.round_traded.contains(&round)
            {
                kast_rounds += 1;
            }
            if self.round_survived.contains(&round) {
                survived += 1;
            }
        }

        let adr = metrics::calculate_adr(self.total_damage, total_rounds);
        let kast = metrics::calculate_kast(kast_rounds, total_rounds);
        let headshot_pct = metrics::calculate_headshot_pct(self.headshots, self.kills);
        let rating =
            metrics::calculate_rating(self.kills, self.deaths, self.assists, total_rounds, kast, adr);

        let mut multi_kills = std::collections::HashMap::new();
        for count in self.kills_in_round.values().copied() {
            if count >= 2 {
                *multi_kills.entry(count).or_insert(0) += 1;
            }
        }

        common::Player {
            steam_id: self.steam_id,
            name: self.name,
            team: self.team,
            stats: common::PlayerStats {
                kills: self.kills,
                deaths: self.deaths,
                assists: self.assists,
                adr,
                kast,
                headshot_pct,
                flash_assists: self.flash_assists,
                utility_damage: self.utility_damage,
                trade_kills: self.trade_kills,
                rating,
                total_damage: self.total_damage,
                headshots: self.headshots,
                rounds_played: total_rounds,
                survived,
                first_kills: self.first_kills,
                first_deaths: self.first_deaths,
                multi_kills,
            },
        }
    }
}
