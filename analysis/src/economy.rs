use crate::source;

pub fn classify_buy_type(team_equipment_value: i32) -> common::BuyType {
    if team_equipment_value < 5000 {
        common::BuyType::Eco
    } else if team_equipment_value <= 15000 {
        common::BuyType::Force
    } else {
        common::BuyType::Full
    }
}

/// First round of each half, and the first round of each 6-round overtime
/// starting at round 25.
pub fn is_pistol_round(round: u32) -> bool {
    if round == 1 || round == 13 {
        return true;
    }
    round >= 25 && (round - 25) % 6 == 0
}

/// Capture one team's buy for the round. The team level aggregates are only
/// populated in CS:GO demos, CS2 demos report zero there and the per player
/// entity properties are summed instead.
pub fn snapshot_team_economy<S>(
    source: &S,
    team: Option<&source::TeamState>,
    round: u32,
) -> common::EconomySnapshot
where
    S: source::DemoSource,
{
    let team = match team {
        Some(t) => t,
        None => return common::EconomySnapshot::default(),
    };

    let mut equipment_value = team.freeze_time_end_equipment_value;
    let mut spent = team.money_spent_this_round;

    if equipment_value == 0 {
        equipment_value = sum_member_prop(source, team, "m_unCurrentEquipmentValue");
    }
    if spent == 0 {
        spent = sum_member_prop(source, team, "m_iCashSpentThisRound");
    }

    let mut buy_type = classify_buy_type(equipment_value);
    if is_pistol_round(round) {
        buy_type = common::BuyType::Pistol;
    }

    common::EconomySnapshot {
        team_spend: spent,
        equipment_value,
        buy_type,
    }
}

fn sum_member_prop<S>(source: &S, team: &source::TeamState, prop: &str) -> i32
where
    S: source::DemoSource,
{
    team.members
        .iter()
        .filter_map(|pl| pl.entity.and_then(|entity| source.entity_prop(entity, prop)))
        .sum()
}
