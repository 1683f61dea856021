use thiserror::Error;
use tracing::{info, warn};

use crate::alloc::allocate;
use crate::mode::{component_enabled, determine_target_mode, PowerMode, Thresholds};
use crate::registry::Registry;
use crate::state::{soc_from_voltage, EnergyState};

/// Motor draw estimate from a velocity command: idle floor plus linear and
/// angular terms.
pub const MOTOR_IDLE_W: f32 = 10.0;
pub const MOTOR_LINEAR_W: f32 = 40.0;
pub const MOTOR_ANGULAR_W: f32 = 20.0;

/// Sensor readings that fail validation are rejected and the last good value
/// is kept; the caller decides whether to log.
#[derive(Debug, Error, PartialEq)]
pub enum SensorError {
    #[error("non-finite {field} reading: {value}")]
    NonFinite { field: &'static str, value: f32 },
    #[error("negative {field} reading: {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("no '{0}' component in the registry")]
    UnknownComponent(&'static str),
}

fn require_finite(field: &'static str, value: f32) -> Result<(), SensorError> {
    if !value.is_finite() {
        return Err(SensorError::NonFinite { field, value });
    }
    Ok(())
}

fn require_non_negative(field: &'static str, value: f32) -> Result<(), SensorError> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(SensorError::Negative { field, value });
    }
    Ok(())
}

/// What one control tick decided; handed to the host for emission.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub mode: PowerMode,
    /// `Some((old, new))` only on an actual transition.
    pub mode_change: Option<(PowerMode, PowerMode)>,
    pub power_balance: f32,
    pub power_consumption: f32,
    pub available_power: f32,
}

/// Owns all mutable power state: the energy snapshot and the component
/// registry. The host is expected to keep it behind a single lock; every
/// method here is a bounded synchronous computation.
pub struct PowerManager {
    state: EnergyState,
    registry: Registry,
    thresholds: Thresholds,
    current_mode: PowerMode,
}

impl PowerManager {
    pub fn new(registry: Registry, thresholds: Thresholds) -> Self {
        info!("power manager initialized: {} components", registry.len());
        Self {
            state: EnergyState::default(),
            registry,
            thresholds,
            current_mode: PowerMode::Normal,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(Registry::default_catalog(), Thresholds::default())
    }

    pub fn current_mode(&self) -> PowerMode {
        self.current_mode
    }

    pub fn snapshot(&self) -> EnergyState {
        self.state.clone()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Headroom beyond critical-system needs: what a non-critical task could
    /// request right now. Never negative.
    pub fn available_power(&self) -> f32 {
        (self.state.solar_generation - self.registry.critical_consumption()).max(0.0)
    }

    /// Force a mode. Same-mode is a strict no-op: no transition record, no
    /// policy re-application.
    pub fn set_mode(&mut self, mode: PowerMode) -> Option<(PowerMode, PowerMode)> {
        if mode == self.current_mode {
            return None;
        }
        Some(self.switch_mode(mode))
    }

    fn switch_mode(&mut self, new_mode: PowerMode) -> (PowerMode, PowerMode) {
        let old_mode = self.current_mode;
        warn!("switching power mode: {} -> {}", old_mode, new_mode);

        self.current_mode = new_mode;
        self.state.mode = new_mode;
        for comp in self.registry.iter_mut() {
            comp.is_enabled = component_enabled(new_mode, comp);
        }
        (old_mode, new_mode)
    }

    /// One control tick: aggregate consumption, decide the mode, switch if
    /// needed, allocate over the (possibly changed) enabled set, report.
    pub fn tick(&mut self) -> TickReport {
        self.state.power_consumption = self.registry.total_consumption();
        let power_balance = self.state.solar_generation - self.state.power_consumption;

        let target = determine_target_mode(
            &self.thresholds,
            self.state.battery_soc,
            power_balance,
            self.state.solar_generation,
            self.current_mode,
        );
        let mode_change = self.set_mode(target);

        allocate(&mut self.registry, self.state.solar_generation);

        TickReport {
            mode: self.current_mode,
            mode_change,
            power_balance,
            power_consumption: self.state.power_consumption,
            available_power: self.available_power(),
        }
    }

    /// Battery voltage update; re-derives SOC. Returns the new SOC.
    pub fn handle_battery_voltage(&mut self, volts: f32) -> Result<f32, SensorError> {
        require_non_negative("battery_voltage", volts)?;
        self.state.voltage = volts;
        self.state.battery_soc = soc_from_voltage(volts);
        Ok(self.state.battery_soc)
    }

    /// Solar generation update.
    pub fn handle_solar_power(&mut self, watts: f32) -> Result<(), SensorError> {
        require_non_negative("solar_power", watts)?;
        self.state.solar_generation = watts;
        Ok(())
    }

    /// Velocity command: write a derived motor draw straight into the motors
    /// component. The next tick's allocation pass reconciles it.
    pub fn handle_velocity(&mut self, linear_x: f32, angular_z: f32) -> Result<f32, SensorError> {
        require_finite("linear_x", linear_x)?;
        require_finite("angular_z", angular_z)?;

        let motor_power =
            MOTOR_IDLE_W + MOTOR_LINEAR_W * linear_x.abs() + MOTOR_ANGULAR_W * angular_z.abs();
        let motors = self
            .registry
            .get_mut("motors")
            .ok_or(SensorError::UnknownComponent("motors"))?;
        motors.current_power = motor_power;
        Ok(motor_power)
    }
}
