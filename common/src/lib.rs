#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Match {
    pub map: String,
    pub date: chrono::DateTime<chrono::Utc>,
    pub duration: std::time::Duration,
    pub teams: [Team; 2],
    pub rounds: Vec<Round>,
    pub players: std::collections::HashMap<u64, Player>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Team {
    pub name: String,
    pub score: usize,
    pub started_as: Side,
    pub players: std::collections::HashSet<u64>,
    pub rounds_won: usize,
    pub rounds_lost: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    CT,
    T,
}

impl core::fmt::Display for Side {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::CT => write!(f, "CT"),
            Self::T => write!(f, "T"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Player {
    pub steam_id: u64,
    pub name: String,
    /// Side the player was first observed on, None if never seen on CT or T.
    pub team: Option<Side>,
    pub stats: PlayerStats,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlayerStats {
    pub kills: usize,
    pub deaths: usize,
    pub assists: usize,
    pub adr: f64,
    pub kast: f64,
    pub headshot_pct: f64,
    pub flash_assists: usize,
    pub utility_damage: usize,
    pub trade_kills: usize,
    pub rating: f64,
    pub total_damage: usize,
    pub headshots: usize,
    pub rounds_played: usize,
    pub survived: usize,
    pub first_kills: usize,
    pub first_deaths: usize,
    /// kills-in-round -> occurrences, only entries with 2+ kills (3 -> 2 means two 3Ks)
    pub multi_kills: std::collections::HashMap<usize, usize>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Round {
    pub number: u32,
    pub winner: Side,
    pub win_method: WinMethod,
    pub kills: Vec<KillEvent>,
    /// Index into `kills`, always 0 when the round had any kill.
    pub first_kill: Option<usize>,
    pub clutch: Option<ClutchInfo>,
    pub ct_economy: EconomySnapshot,
    pub t_economy: EconomySnapshot,
    pub duration: std::time::Duration,
    pub bomb_plant: Option<BombEvent>,
    pub bomb_defuse: Option<BombEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum WinMethod {
    Elimination,
    BombExploded,
    BombDefused,
    TimeExpired,
    Unknown,
}

impl core::fmt::Display for WinMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Elimination => "Elimination",
            Self::BombExploded => "BombExploded",
            Self::BombDefused => "BombDefused",
            Self::TimeExpired => "TimeExpired",
            Self::Unknown => "Unknown",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KillEvent {
    pub tick: i32,
    pub round_number: u32,
    pub attacker_steam_id: u64,
    pub attacker_name: String,
    pub attacker_position: Position,
    pub victim_steam_id: u64,
    pub victim_name: String,
    pub victim_position: Position,
    pub weapon: String,
    pub is_headshot: bool,
    pub is_wallbang: bool,
    pub assister_steam_id: u64,
    pub assister_name: String,
    pub is_flash_assist: bool,
    pub is_trade: bool,
    pub time: std::time::Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClutchInfo {
    pub player_steam_id: u64,
    pub player_name: String,
    pub opponents: usize,
    pub kills: usize,
    pub success: bool,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EconomySnapshot {
    pub team_spend: i32,
    pub equipment_value: i32,
    pub buy_type: BuyType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BuyType {
    #[default]
    Eco,
    Force,
    Full,
    Pistol,
}

impl core::fmt::Display for BuyType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Eco => "Eco",
            Self::Force => "Force",
            Self::Full => "Full",
            Self::Pistol => "Pistol",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BombEvent {
    pub player_steam_id: u64,
    pub player_name: String,
    pub site: String,
    pub tick: i32,
}
