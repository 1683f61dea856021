use serde::Deserialize;

use crate::registry::{ComponentPriority, PowerComponent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    Normal,
    LowPower,
    Hibernation,
    Emergency,
}

impl PowerMode {
    /// Wire/telemetry label. Total: every variant maps to a name.
    pub fn label(self) -> &'static str {
        match self {
            PowerMode::Normal => "NORMAL",
            PowerMode::LowPower => "LOW_POWER",
            PowerMode::Hibernation => "HIBERNATION",
            PowerMode::Emergency => "EMERGENCY",
        }
    }

}

impl std::fmt::Display for PowerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Mode transition thresholds. Defaults are the flight constants; config may
/// override them without changing the rule ladder.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Below this SOC, EMERGENCY no matter what.
    pub soc_emergency: f32,
    /// HIBERNATION needs generation below `solar_floor_w` AND SOC below this.
    pub soc_hibernation: f32,
    pub solar_floor_w: f32,
    /// LOW_POWER on SOC below this OR balance below `balance_drain_w`.
    pub soc_low: f32,
    pub balance_drain_w: f32,
    /// NORMAL needs SOC above this AND a positive balance.
    pub soc_normal: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            soc_emergency: 15.0,
            soc_hibernation: 50.0,
            solar_floor_w: 5.0,
            soc_low: 30.0,
            balance_drain_w: -10.0,
            soc_normal: 40.0,
        }
    }
}

/// Rule ladder for the target mode; first match wins. Falls through to
/// `current_mode` inside the dead band so the machine does not chatter
/// around the boundaries.
pub fn determine_target_mode(
    th: &Thresholds,
    soc: f32,
    power_balance: f32,
    solar_generation: f32,
    current_mode: PowerMode,
) -> PowerMode {
    if soc < th.soc_emergency {
        return PowerMode::Emergency;
    }
    if solar_generation < th.solar_floor_w && soc < th.soc_hibernation {
        return PowerMode::Hibernation;
    }
    if soc < th.soc_low || power_balance < th.balance_drain_w {
        return PowerMode::LowPower;
    }
    if soc > th.soc_normal && power_balance > 0.0 {
        return PowerMode::Normal;
    }
    current_mode
}

/// Per-component enable predicate for a target mode. Depends only on the
/// component's own priority/essential flags (and one named exception), so
/// policy application order never matters.
pub fn component_enabled(mode: PowerMode, comp: &PowerComponent) -> bool {
    match mode {
        PowerMode::Normal => true,
        // Sheds the LOW class, plus cameras by name (a named exception,
        // not a priority rule).
        PowerMode::LowPower => {
            comp.priority != ComponentPriority::Low && comp.name != "cameras"
        }
        PowerMode::Hibernation => {
            comp.priority == ComponentPriority::Critical || comp.is_essential
        }
        PowerMode::Emergency => comp.priority == ComponentPriority::Critical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    fn target(soc: f32, balance: f32, solar: f32, cur: PowerMode) -> PowerMode {
        determine_target_mode(&Thresholds::default(), soc, balance, solar, cur)
    }

    #[test]
    fn emergency_overrides_everything() {
        assert_eq!(target(10.0, 100.0, 200.0, PowerMode::Normal), PowerMode::Emergency);
        assert_eq!(target(14.9, 0.0, 0.0, PowerMode::Hibernation), PowerMode::Emergency);
    }

    #[test]
    fn hibernation_needs_dark_and_thin_reserve() {
        assert_eq!(target(40.0, -5.0, 2.0, PowerMode::Normal), PowerMode::Hibernation);
        // Ample reserve: generation collapse alone is not enough.
        assert_eq!(target(60.0, 5.0, 2.0, PowerMode::Normal), PowerMode::Normal);
    }

    #[test]
    fn low_power_on_reserve_or_drain() {
        assert_eq!(target(25.0, 5.0, 50.0, PowerMode::Normal), PowerMode::LowPower);
        assert_eq!(target(60.0, -15.0, 50.0, PowerMode::Normal), PowerMode::LowPower);
    }

    #[test]
    fn normal_on_comfortable_surplus() {
        assert_eq!(target(60.0, 5.0, 80.0, PowerMode::LowPower), PowerMode::Normal);
    }

    #[test]
    fn dead_band_holds_current_mode() {
        // soc=35, balance=0 matches neither the LOW_POWER nor the NORMAL rule.
        assert_eq!(target(35.0, 0.0, 50.0, PowerMode::Normal), PowerMode::Normal);
        assert_eq!(target(35.0, 0.0, 50.0, PowerMode::LowPower), PowerMode::LowPower);
    }

    #[test]
    fn rule_order_is_fixed() {
        // soc=10 also matches the hibernation and low-power conditions, but
        // the emergency rule is evaluated first.
        assert_eq!(target(10.0, -50.0, 0.0, PowerMode::Normal), PowerMode::Emergency);
    }

    #[test]
    fn low_power_policy_sheds_low_class_and_cameras() {
        let reg = Registry::default_catalog();
        for comp in reg.iter() {
            let on = component_enabled(PowerMode::LowPower, comp);
            match comp.name.as_str() {
                "science_instruments" | "cameras" => assert!(!on, "{} should shed", comp.name),
                _ => assert!(on, "{} should stay", comp.name),
            }
        }
    }

    #[test]
    fn hibernation_keeps_critical_and_essential() {
        let reg = Registry::default_catalog();
        for comp in reg.iter() {
            let on = component_enabled(PowerMode::Hibernation, comp);
            let expect = comp.priority == ComponentPriority::Critical || comp.is_essential;
            assert_eq!(on, expect, "{}", comp.name);
        }
    }

    #[test]
    fn emergency_policy_is_critical_only() {
        let reg = Registry::default_catalog();
        for comp in reg.iter() {
            let on = component_enabled(PowerMode::Emergency, comp);
            assert_eq!(on, comp.priority == ComponentPriority::Critical, "{}", comp.name);
        }
    }

    #[test]
    fn mode_labels_match_the_wire_names() {
        assert_eq!(PowerMode::Normal.label(), "NORMAL");
        assert_eq!(PowerMode::LowPower.label(), "LOW_POWER");
        assert_eq!(PowerMode::Hibernation.label(), "HIBERNATION");
        assert_eq!(PowerMode::Emergency.label(), "EMERGENCY");
        assert_eq!(PowerMode::Emergency.to_string(), "EMERGENCY");
    }
}
