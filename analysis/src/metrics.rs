pub fn calculate_adr(total_damage: usize, rounds_played: usize) -> f64 {
    if rounds_played == 0 {
        return 0.0;
    }
    total_damage as f64 / rounds_played as f64
}

pub fn calculate_kast(kast_rounds: usize, rounds_played: usize) -> f64 {
    if rounds_played == 0 {
        return 0.0;
    }
    kast_rounds as f64 / rounds_played as f64 * 100.0
}

pub fn calculate_headshot_pct(headshots: usize, kills: usize) -> f64 {
    if kills == 0 {
        return 0.0;
    }
    headshots as f64 / kills as f64 * 100.0
}

/// Simplified HLTV 2.0 style composite over KAST, kills/deaths per round,
/// impact and ADR.
pub fn calculate_rating(
    kills: usize,
    deaths: usize,
    assists: usize,
    rounds_played: usize,
    kast_pct: f64,
    adr: f64,
) -> f64 {
    if rounds_played == 0 {
        return 0.0;
    }
    let rounds = rounds_played as f64;
    let kpr = kills as f64 / rounds;
    let dpr = deaths as f64 / rounds;
    let impact = (kills as f64 + 0.5 * assists as f64) / rounds;

    0.0073 * kast_pct + 0.3591 * kpr - 0.5329 * dpr + 0.2372 * impact + 0.0032 * adr + 0.1587
}
