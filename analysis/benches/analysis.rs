use std::time::Duration;

use analysis::matchstats;
use analysis::source::{
    DemoEvent, DemoHeader, DemoSource, EntityId, EquipmentClass, EventPlayer, Kill, Participant,
    PlayerHurt, RoundEnd, TeamId, TeamState,
};

fn main() {
    divan::main();
}

struct SyntheticSource {
    events: std::collections::VecDeque<DemoEvent>,
    time: Duration,
    tick: i32,
    playing: Vec<Participant>,
}

impl SyntheticSource {
    fn new(rounds: u32) -> Self {
        let mut events = std::collections::VecDeque::new();
        events.push_back(DemoEvent::MatchStart);
        for _ in 0..rounds {
            events.push_back(DemoEvent::RoundStart);
            events.push_back(DemoEvent::RoundFreezetimeEnd);
            for (attacker, victim) in [(1, 3), (3, 2), (1, 4), (4, 1)] {
                events.push_back(DemoEvent::PlayerHurt(PlayerHurt {
                    attacker: Some(player(attacker)),
                    player: Some(player(victim)),
                    health: 0,
                    health_damage: 100,
                    health_damage_taken: 100,
                    weapon_class: EquipmentClass::Rifle,
                }));
                events.push_back(DemoEvent::Kill(Kill {
                    killer: Some(player(attacker)),
                    victim: Some(player(victim)),
                    assister: None,
                    weapon: Some("ak47".to_owned()),
                    is_headshot: victim % 2 == 0,
                    penetrated_objects: 0,
                    assisted_flash: false,
                }));
            }
            events.push_back(DemoEvent::RoundEnd(RoundEnd {
                winner: TeamId::CounterTerrorists,
                reason: 8,
            }));
        }

        let playing = (1..=4)
            .map(|id| {
                let p = player(id);
                Participant {
                    steam_id: p.steam_id,
                    name: p.name,
                    team: p.team,
                    is_alive: true,
                    position: p.position,
                    entity: Some(EntityId(100 + id as u32)),
                }
            })
            .collect();

        Self {
            events,
            time: Duration::ZERO,
            tick: 0,
            playing,
        }
    }
}

fn player(steam_id: u64) -> EventPlayer {
    let team = if steam_id <= 2 {
        TeamId::CounterTerrorists
    } else {
        TeamId::Terrorists
    };
    EventPlayer {
        steam_id,
        name: format!("player{}", steam_id),
        team,
        position: common::Position::default(),
    }
}

impl DemoSource for SyntheticSource {
    type Error = String;

    fn header(&mut self) -> Result<DemoHeader, String> {
        Ok(DemoHeader {
            map_name: "de_dust2".to_owned(),
            playback_time: Duration::ZERO,
        })
    }

    fn next_event(&mut self) -> Option<Result<DemoEvent, String>> {
        let event = self.events.pop_front()?;
        self.time += Duration::from_secs(2);
        self.tick += 128;
        Some(Ok(event))
    }

    fn current_time(&self) -> Duration {
        self.time
    }

    fn ingame_tick(&self) -> i32 {
        self.tick
    }

    fn playing(&self) -> Vec<Participant> {
        self.playing.clone()
    }

    fn team_state(&self, _team: TeamId) -> Option<TeamState> {
        Some(TeamState {
            clan_name: String::new(),
            score: 0,
            freeze_time_end_equipment_value: 20000,
            money_spent_this_round: 18000,
            members: self.playing.clone(),
        })
    }

    fn entity_prop(&self, _entity: EntityId, _name: &str) -> Option<i32> {
        None
    }
}

#[divan::bench(args = [6, 24, 48])]
fn fullmatch(bencher: divan::Bencher, rounds: u32) {
    bencher.bench(|| {
        let mut source = SyntheticSource::new(divan::black_box(rounds));
        matchstats::parse(&mut source).unwrap()
    });
}
