//! Flat CSV view of a [`SimulationResult`]: one `fleet,metric,ship_type,value` row
//! per victory probability and expected-survivor entry, plus a single draw row.

use std::io::Write;

use serde::Serialize;

use crate::simulator::monte_carlo::SimulationResult;

#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    fleet: &'a str,
    metric: &'static str,
    ship_type: &'a str,
    value: f64,
}

pub fn write_result_csv<W: Write>(result: &SimulationResult, writer: W) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    for (fleet, &probability) in &result.victory_probability {
        out.serialize(ResultRow {
            fleet,
            metric: "victory_probability",
            ship_type: "",
            value: probability,
        })?;
    }
    out.serialize(ResultRow {
        fleet: "",
        metric: "draw_probability",
        ship_type: "",
        value: result.draw_probability,
    })?;
    for (fleet, by_type) in &result.expected_survivors {
        for (ship_type, &mean) in by_type {
            out.serialize(ResultRow {
                fleet,
                metric: "expected_survivors",
                ship_type: ship_type.as_str(),
                value: mean,
            })?;
        }
    }
    out.flush()?;
    Ok(())
}
