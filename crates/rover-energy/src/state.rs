use crate::mode::PowerMode;

/// Pack voltage at which the SOC map reads 0%.
pub const SOC_FLOOR_V: f32 = 24.0;
/// Voltage span of the pack between 0% and 100%.
pub const SOC_SPAN_V: f32 = 5.4;

/// Snapshot of the rover's electrical/thermal condition.
///
/// `battery_soc` is always derived from the latest voltage reading through
/// [`soc_from_voltage`]; nothing else writes it.
#[derive(Debug, Clone)]
pub struct EnergyState {
    pub battery_soc: f32,
    pub voltage: f32,
    pub current: f32,
    pub power_consumption: f32,
    pub solar_generation: f32,
    pub temperature: f32,
    pub mode: PowerMode,
}

impl Default for EnergyState {
    fn default() -> Self {
        Self {
            battery_soc: 100.0,
            voltage: 28.0,
            current: 0.0,
            power_consumption: 0.0,
            solar_generation: 0.0,
            temperature: 20.0,
            mode: PowerMode::Normal,
        }
    }
}

/// Linear pack-voltage to state-of-charge map, clamped to 0..100%.
pub fn soc_from_voltage(v: f32) -> f32 {
    (((v - SOC_FLOOR_V) / SOC_SPAN_V) * 100.0).clamp(0.0, 100.0)
}
