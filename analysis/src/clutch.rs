/// Detect a 1-vs-N situation by replaying the round's kills against the
/// freeze time end alive snapshots. Live game state is deliberately not
/// consulted, the kill sequence is authoritative for the round.
pub fn detect(
    kills: &[common::KillEvent],
    initial_alive_ct: &std::collections::HashSet<u64>,
    initial_alive_t: &std::collections::HashSet<u64>,
) -> Option<common::ClutchInfo> {
    if kills.is_empty() {
        return None;
    }

    let mut ct_alive = initial_alive_ct.clone();
    let mut t_alive = initial_alive_t.clone();

    let mut clutch: Option<common::ClutchInfo> = None;

    for kill in kills {
        ct_alive.remove(&kill.victim_steam_id);
        t_alive.remove(&kill.victim_steam_id);

        // first 1-vN transition wins, CT checked first when both sides reach
        // one player on the same kill
        if clutch.is_none() && ct_alive.len() == 1 && !t_alive.is_empty() {
            if let Some(survivor) = ct_alive.iter().copied().next() {
                clutch = Some(common::ClutchInfo {
                    player_steam_id: survivor,
                    player_name: player_name(kills, survivor),
                    opponents: t_alive.len(),
                    kills: 0,
                    success: false,
                });
            }
        }
        if clutch.is_none() && t_alive.len() == 1 && !ct_alive.is_empty() {
            if let Some(survivor) = t_alive.iter().copied().next() {
                clutch = Some(common::ClutchInfo {
                    player_steam_id: survivor,
                    player_name: player_name(kills, survivor),
                    opponents: ct_alive.len(),
                    kills: 0,
                    success: false,
                });
            }
        }

        if let Some(info) = clutch.as_mut() {
            if kill.attacker_steam_id == info.player_steam_id {
                info.kills += 1;
            }
        }
    }

    if let Some(info) = clutch.as_mut() {
        info.success =
            ct_alive.contains(&info.player_steam_id) || t_alive.contains(&info.player_steam_id);
    }

    clutch
}

fn player_name(kills: &[common::KillEvent], steam_id: u64) -> String {
    for kill in kills {
        if kill.attacker_steam_id == steam_id {
            return kill.attacker_name.clone();
        }
        if kill.victim_steam_id == steam_id {
            return kill.victim_name.clone();
        }
    }
    String::new()
}
