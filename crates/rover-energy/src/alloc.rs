use crate::registry::Registry;

/// Priority water-filling over the enabled set.
///
/// Enabled components are served in priority order (stable, registry order
/// breaks ties); each gets its nominal draw while the budget lasts, the first
/// one past the budget absorbs whatever remains, everyone after gets zero.
/// Disabled components are not touched here at all — disabling is the mode
/// controller's signal and their stale `current_power` is excluded from the
/// enabled consumption sum anyway.
pub fn allocate(registry: &mut Registry, generated_power: f32) {
    let mut remaining = generated_power.max(0.0);

    let mut order: Vec<(usize, _)> = registry
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_enabled)
        .map(|(i, c)| (i, c.priority))
        .collect();
    // Stable: registry order breaks ties within a priority class.
    order.sort_by_key(|&(_, p)| p);

    let mut comps: Vec<_> = registry.iter_mut().collect();
    for (i, _) in order {
        let comp = &mut *comps[i];
        if remaining >= comp.nominal_power {
            comp.current_power = comp.nominal_power;
            remaining -= comp.nominal_power;
        } else {
            comp.current_power = remaining;
            remaining = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ComponentPriority, PowerComponent, Registry};

    fn comp(name: &str, priority: ComponentPriority, nominal: f32) -> PowerComponent {
        PowerComponent {
            name: name.to_string(),
            priority,
            nominal_power: nominal,
            current_power: 0.0,
            is_enabled: true,
            is_essential: false,
        }
    }

    #[test]
    fn never_exceeds_budget() {
        let mut reg = Registry::default_catalog();
        for budget in [0.0, 10.0, 37.5, 100.0, 500.0] {
            allocate(&mut reg, budget);
            let sum: f32 = reg.iter().filter(|c| c.is_enabled).map(|c| c.current_power).sum();
            assert!(sum <= budget + 1e-3, "sum {} over budget {}", sum, budget);
        }
    }

    #[test]
    fn critical_saturates_before_lower_gets_anything() {
        let mut reg = Registry::new(vec![
            comp("crit", ComponentPriority::Critical, 20.0),
            comp("high", ComponentPriority::High, 25.0),
        ]);
        allocate(&mut reg, 30.0);
        assert_eq!(reg.get("crit").unwrap().current_power, 20.0);
        assert_eq!(reg.get("high").unwrap().current_power, 10.0);
    }

    #[test]
    fn critical_fully_served_when_budget_covers_it() {
        let mut reg = Registry::default_catalog();
        let crit_nominal: f32 = reg
            .iter()
            .filter(|c| c.priority == ComponentPriority::Critical)
            .map(|c| c.nominal_power)
            .sum();
        allocate(&mut reg, crit_nominal);
        for c in reg.iter().filter(|c| c.priority == ComponentPriority::Critical) {
            assert_eq!(c.current_power, c.nominal_power, "{}", c.name);
        }
    }

    #[test]
    fn registry_order_breaks_priority_ties() {
        let mut reg = Registry::new(vec![
            comp("first_med", ComponentPriority::Medium, 30.0),
            comp("second_med", ComponentPriority::Medium, 30.0),
        ]);
        allocate(&mut reg, 40.0);
        assert_eq!(reg.get("first_med").unwrap().current_power, 30.0);
        assert_eq!(reg.get("second_med").unwrap().current_power, 10.0);
    }

    #[test]
    fn exhausted_budget_zeroes_the_tail() {
        let mut reg = Registry::new(vec![
            comp("a", ComponentPriority::Critical, 50.0),
            comp("b", ComponentPriority::High, 10.0),
            comp("c", ComponentPriority::Low, 10.0),
        ]);
        allocate(&mut reg, 50.0);
        assert_eq!(reg.get("a").unwrap().current_power, 50.0);
        assert_eq!(reg.get("b").unwrap().current_power, 0.0);
        assert_eq!(reg.get("c").unwrap().current_power, 0.0);
    }

    #[test]
    fn disabled_components_keep_last_assignment() {
        let mut reg = Registry::new(vec![
            comp("on", ComponentPriority::High, 10.0),
            comp("off", ComponentPriority::High, 10.0),
        ]);
        reg.get_mut("off").unwrap().current_power = 7.5;
        reg.get_mut("off").unwrap().is_enabled = false;
        allocate(&mut reg, 100.0);
        assert_eq!(reg.get("on").unwrap().current_power, 10.0);
        assert_eq!(reg.get("off").unwrap().current_power, 7.5);
    }

    #[test]
    fn empty_enabled_set_is_a_no_op() {
        let mut reg = Registry::new(Vec::new());
        allocate(&mut reg, 100.0);
        assert_eq!(reg.total_consumption(), 0.0);
    }
}
