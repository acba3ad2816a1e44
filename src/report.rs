use std::io;

use itertools::Itertools;

use super::parameters::Parameters;
use super::Corridor;
use super::CorridorError;


/// One row of the scenario comparison table.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioSummary {
    pub name: String,
    pub total_demand: f64,
    // minutes
    pub avg_travel_time: f64,
    // generalized cost per trip
    pub cost_per_trip: f64,
    pub infra_cost: f64,
    pub operating_cost: f64,
    pub total_cost: f64,
    // against the reference
    pub total_surplus: f64,
}

impl ScenarioSummary {
    pub fn new(params: &Parameters, reference: &Corridor, corridor: &Corridor)
               -> ScenarioSummary {
        let total_demand = corridor.total_demand();
        let cost_per_trip = if total_demand > 0. {
            corridor.generalized_cost(params) / total_demand
        } else {
            0.
        };
        return ScenarioSummary {
            name: corridor.name.clone(),
            total_demand,
            avg_travel_time: corridor.avg_travel_time(params) * 60.,
            cost_per_trip,
            infra_cost: corridor.infra_cost(params),
            operating_cost: corridor.operating_cost(params),
            total_cost: corridor.total_cost(params),
            total_surplus: reference.total_surplus(params, corridor),
        };
    }
}

pub fn summary_rows(params: &Parameters, reference: &Corridor, corridors: &[Corridor])
                    -> Vec<ScenarioSummary> {
    return corridors.iter()
        .map(|corridor| ScenarioSummary::new(params, reference, corridor))
        .collect();
}


/// What one line offers and costs, as shown per scenario.
#[derive(Clone, Debug, PartialEq)]
pub struct LineSupply {
    pub name: String,
    pub demand: f64,
    // percent of the corridor's trips
    pub share: f64,
    // percent of the hourly capacity used at the line's share of the peak load
    pub load_ratio: f64,
    pub frequency: f64,
    pub commercial_speed: f64,
    // metres, per zone
    pub spacing: Vec<f64>,
    pub fleet: f64,
    pub infra_cost: f64,
    pub operating_cost: f64,
    pub operator_cost: f64,
    pub revenues: f64,
}

/// Supply rows for every line of the corridor, in line order.  Peak loads are
/// shared out between lines as in the capacity malus.
pub fn line_supply_rows(params: &Parameters, corridor: &Corridor) -> Vec<LineSupply> {
    let geometry = corridor.geometry();
    let total_demand = corridor.total_demand();
    let peak_load = corridor.max_load();
    let demands = corridor.line_demands(params);
    let revenues = corridor.line_revenues(params);

    let mut rows = vec![];
    for ((line, demand), revenues) in corridor.lines().iter().zip(demands).zip(revenues) {
        let share = if total_demand > 0. { demand / total_demand } else { 0. };
        let load = share * peak_load;
        let load_ratio = if load > 0. { load / line.hourly_capacity() * 100. } else { 0. };
        rows.push(LineSupply {
            name: line.name.clone(),
            demand,
            share: share * 100.,
            load_ratio,
            frequency: line.frequency,
            commercial_speed: line.corridor_commercial_speed(geometry),
            spacing: line.spacing.iter().map(|ss| ss * 1000.).collect(),
            fleet: line.vehicles_number(geometry),
            infra_cost: line.infra_cost(geometry, params),
            operating_cost: line.operating_cost(geometry, params),
            operator_cost: line.operator_cost(geometry, params),
            revenues,
        });
    }
    return rows;
}


// f64's Display already writes the infinities as inf and -inf
fn fmt_value(value: f64) -> String {
    return value.to_string();
}

pub fn write_summary_csv<W: io::Write>(writer: W, rows: &[ScenarioSummary])
                                       -> Result<(), CorridorError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(&["name", "total_demand", "avg_travel_time_min", "cost_per_trip",
                          "infra_cost", "operating_cost", "total_cost", "total_surplus"])?;
    for row in rows {
        let values = [row.total_demand, row.avg_travel_time, row.cost_per_trip, row.infra_cost,
                      row.operating_cost, row.total_cost, row.total_surplus];
        let mut record = vec![row.name.clone()];
        record.extend(values.iter().map(|vv| fmt_value(*vv)));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    return Ok(());
}

pub fn write_supply_csv<W: io::Write>(writer: W, rows: &[LineSupply])
                                      -> Result<(), CorridorError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(&["name", "demand", "share_pct", "load_ratio_pct", "frequency",
                          "commercial_speed", "spacing_m", "fleet", "infra_cost",
                          "operating_cost", "operator_cost", "revenues"])?;
    for row in rows {
        let spacing = row.spacing.iter().map(|ss| format!("{:.0}", ss)).join(" ");
        let record = vec![
            row.name.clone(),
            fmt_value(row.demand),
            fmt_value(row.share),
            fmt_value(row.load_ratio),
            fmt_value(row.frequency),
            fmt_value(row.commercial_speed),
            spacing,
            fmt_value(row.fleet),
            fmt_value(row.infra_cost),
            fmt_value(row.operating_cost),
            fmt_value(row.operator_cost),
            fmt_value(row.revenues),
        ];
        writer.write_record(&record)?;
    }
    writer.flush()?;
    return Ok(());
}
