use serde::Deserialize;

/// Fixed-rate assumptions for the sol-ahead forecast. These are planning
/// averages, deliberately decoupled from live telemetry.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolModel {
    pub avg_generation_w: f32,
    pub sol_duration_h: f32,
    pub daylight_fraction: f32,
    pub avg_consumption_w: f32,
}

impl Default for SolModel {
    fn default() -> Self {
        Self {
            avg_generation_w: 80.0,
            sol_duration_h: 24.6,
            daylight_fraction: 0.5,
            avg_consumption_w: 40.0,
        }
    }
}

/// Coarse net-energy forecast for one full sol, in watt-hours. Generation
/// only runs during the daylight fraction; consumption runs around the clock.
/// Advisory: never fed back into mode decisions.
pub fn predict_sol_energy(model: &SolModel) -> f32 {
    let sol_s = model.sol_duration_h * 3600.0;
    let generation_wh = model.avg_generation_w * sol_s * model.daylight_fraction / 3600.0;
    let consumption_wh = model.avg_consumption_w * sol_s / 3600.0;
    generation_wh - consumption_wh
}
