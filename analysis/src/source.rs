//! The contract the analyzer requires from a demo decoder.
//!
//! The decoder owns byte-stream I/O and entity bookkeeping. The analyzer only
//! consumes typed events pulled one at a time plus a handful of snapshot
//! accessors that answer questions about the game state at the moment the
//! last event was delivered.

#[derive(Debug, Clone, PartialEq)]
pub struct DemoHeader {
    /// Empty for CS2 demos, the map name arrives via `ServerInfo` instead.
    pub map_name: String,
    /// Zero for CS2 demos.
    pub playback_time: std::time::Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeamId {
    Unassigned,
    Spectator,
    Terrorists,
    CounterTerrorists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u32);

impl From<u32> for EntityId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
impl From<i32> for EntityId {
    fn from(value: i32) -> Self {
        Self(value as u32)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub steam_id: u64,
    pub name: String,
    pub team: TeamId,
    pub is_alive: bool,
    pub position: common::Position,
    pub entity: Option<EntityId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamState {
    pub clan_name: String,
    pub score: i32,
    /// Team level freeze time end snapshot, zero in CS2 demos.
    pub freeze_time_end_equipment_value: i32,
    /// Team level money spent aggregate, zero in CS2 demos.
    pub money_spent_this_round: i32,
    pub members: Vec<Participant>,
}

/// Player snapshot attached to an event at emission time.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPlayer {
    pub steam_id: u64,
    pub name: String,
    pub team: TeamId,
    pub position: common::Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipmentClass {
    Unknown,
    Pistols,
    SMG,
    Heavy,
    Rifle,
    Equipment,
    Grenade,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Kill {
    pub killer: Option<EventPlayer>,
    pub victim: Option<EventPlayer>,
    pub assister: Option<EventPlayer>,
    pub weapon: Option<String>,
    pub is_headshot: bool,
    pub penetrated_objects: u32,
    pub assisted_flash: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerHurt {
    pub attacker: Option<EventPlayer>,
    pub player: Option<EventPlayer>,
    /// Victim health after the hit, may be negative on overkill.
    pub health: i32,
    pub health_damage: i32,
    /// Damage already capped at the victim's remaining health, zero when the
    /// decoder cannot provide it.
    pub health_damage_taken: i32,
    pub weapon_class: EquipmentClass,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BombAction {
    pub player: Option<EventPlayer>,
    pub site: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundEnd {
    pub winner: TeamId,
    /// Raw engine round end reason code.
    pub reason: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerInfo {
    pub map_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DemoEvent {
    MatchStart,
    RoundStart,
    RoundFreezetimeEnd,
    Kill(Kill),
    PlayerHurt(PlayerHurt),
    BombPlanted(BombAction),
    BombDefused(BombAction),
    RoundEnd(RoundEnd),
    ServerInfo(ServerInfo),
}

pub trait DemoSource {
    type Error: core::fmt::Debug;

    /// Probe the stream header. Called once before any event is pulled.
    fn header(&mut self) -> Result<DemoHeader, Self::Error>;

    /// Pull the next event, `None` at end of stream.
    fn next_event(&mut self) -> Option<Result<DemoEvent, Self::Error>>;

    /// Monotonic match clock at the last delivered event.
    fn current_time(&self) -> std::time::Duration;

    fn ingame_tick(&self) -> i32;

    /// All currently playing participants.
    fn playing(&self) -> Vec<Participant>;

    fn team_state(&self, team: TeamId) -> Option<TeamState>;

    /// String keyed entity property lookup, e.g. `m_unCurrentEquipmentValue`.
    fn entity_prop(&self, entity: EntityId, name: &str) -> Option<i32>;
}
