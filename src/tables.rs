use chrono::TimeDelta;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::{
        profile::HourlyProfile,
        safety::safe_hours,
        strategy::OptimalHourSet,
        target::ChargeTarget,
    },
    quantity::{power::Kilowatts, rate::KilowattHourRate},
};

/// Day plan: one row per hour with the combined load, its cost, and the selection rank.
pub fn build_plan_table(
    load: &HourlyProfile<Kilowatts>,
    rates: &HourlyProfile<KilowattHourRate>,
    target: &ChargeTarget,
    hours: &OptimalHourSet,
    current_hour: u32,
) -> Table {
    let safe_hours = safe_hours(load, target.charging_power, target.max_total_load);

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table.set_header(vec!["Hour", "Load", "Total", "Rate", "Cost", "Safe", "Rank"]);
    for (hour, household_load) in load.iter() {
        let total_load = household_load + target.charging_power;
        let rate = rates[hour];
        let is_safe = safe_hours.iter().any(|safe_hour| safe_hour.hour == hour);
        let rank = hours.iter().position(|selected| selected == hour);
        table.add_row(vec![
            Cell::new(format!("{hour:02}:00")).add_attribute(if hour == current_hour {
                Attribute::Bold
            } else {
                Attribute::Dim
            }),
            Cell::new(household_load).set_alignment(CellAlignment::Right),
            Cell::new(total_load)
                .set_alignment(CellAlignment::Right)
                .fg(if is_safe { Color::Reset } else { Color::Red }),
            Cell::new(rate).set_alignment(CellAlignment::Right),
            Cell::new(total_load * TimeDelta::hours(1) * rate).set_alignment(CellAlignment::Right),
            Cell::new(if is_safe { "yes" } else { "no" })
                .fg(if is_safe { Color::Green } else { Color::Red }),
            rank.map_or_else(
                || Cell::new(""),
                |rank| Cell::new(rank + 1).fg(Color::Green).add_attribute(Attribute::Bold),
            ),
        ]);
    }
    table
}
