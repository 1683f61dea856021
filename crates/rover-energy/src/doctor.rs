use anyhow::Result;
use std::collections::HashSet;

use crate::mode::Thresholds;
use crate::predict::SolModel;
use crate::registry::{ComponentPriority, Registry};

pub fn check_thresholds(th: &Thresholds) -> Result<()> {
    anyhow::ensure!(th.soc_emergency > 0.0, "thresholds.soc_emergency must be positive");
    anyhow::ensure!(
        th.soc_emergency < th.soc_low,
        "thresholds.soc_emergency must sit below soc_low"
    );
    anyhow::ensure!(
        th.soc_low <= th.soc_normal,
        "thresholds.soc_low must not exceed soc_normal"
    );
    anyhow::ensure!(
        th.soc_normal < 100.0,
        "thresholds.soc_normal must leave headroom below 100%"
    );
    anyhow::ensure!(
        th.soc_hibernation > th.soc_emergency,
        "thresholds.soc_hibernation must sit above soc_emergency"
    );
    anyhow::ensure!(th.solar_floor_w > 0.0, "thresholds.solar_floor_w must be positive");
    anyhow::ensure!(
        th.balance_drain_w < 0.0,
        "thresholds.balance_drain_w must be a net drain (negative)"
    );
    Ok(())
}

pub fn check_catalog(registry: &Registry) -> Result<()> {
    anyhow::ensure!(!registry.is_empty(), "component catalog is empty");

    let mut names = HashSet::new();
    for comp in registry.iter() {
        anyhow::ensure!(!comp.name.is_empty(), "component with empty name");
        anyhow::ensure!(
            names.insert(comp.name.as_str()),
            "duplicate component name: {}",
            comp.name
        );
        anyhow::ensure!(
            comp.nominal_power >= 0.0 && comp.nominal_power.is_finite(),
            "component {} has invalid nominal_power {}",
            comp.name,
            comp.nominal_power
        );
    }
    anyhow::ensure!(
        registry.iter().any(|c| c.priority == ComponentPriority::Critical),
        "catalog needs at least one critical component"
    );
    Ok(())
}

pub fn check_sol_model(model: &SolModel) -> Result<()> {
    anyhow::ensure!(model.avg_generation_w > 0.0, "predict.avg_generation_w must be positive");
    anyhow::ensure!(model.avg_consumption_w > 0.0, "predict.avg_consumption_w must be positive");
    anyhow::ensure!(model.sol_duration_h > 0.0, "predict.sol_duration_h must be positive");
    anyhow::ensure!(
        model.daylight_fraction > 0.0 && model.daylight_fraction <= 1.0,
        "predict.daylight_fraction should be in (0, 1]"
    );
    Ok(())
}
