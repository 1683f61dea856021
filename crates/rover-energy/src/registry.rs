use serde::Deserialize;

/// Allocation order and mode policy both key off this; lower value wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentPriority {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

#[derive(Debug, Clone)]
pub struct PowerComponent {
    pub name: String,
    pub priority: ComponentPriority,
    pub nominal_power: f32,
    pub current_power: f32,
    pub is_enabled: bool,
    pub is_essential: bool,
}

/// Fixed catalog of power-consuming subsystems. Built once at startup;
/// membership never changes, only per-record fields do.
#[derive(Debug, Clone)]
pub struct Registry {
    components: Vec<PowerComponent>,
}

impl Registry {
    pub fn new(components: Vec<PowerComponent>) -> Self {
        Self { components }
    }

    /// The stock rover loadout.
    pub fn default_catalog() -> Self {
        use ComponentPriority::*;
        let mk = |name: &str, priority, nominal: f32, current: f32, essential| PowerComponent {
            name: name.to_string(),
            priority,
            nominal_power: nominal,
            current_power: current,
            is_enabled: true,
            is_essential: essential,
        };
        Self::new(vec![
            mk("communication", Critical, 15.0, 15.0, true),
            mk("fdir_watchdog", Critical, 5.0, 5.0, true),
            mk("navigation", High, 25.0, 25.0, true),
            mk("motors", High, 50.0, 0.0, true),
            mk("lidar", Medium, 20.0, 20.0, false),
            mk("cameras", Medium, 15.0, 15.0, false),
            mk("science_instruments", Low, 30.0, 0.0, false),
            mk("heating", Medium, 40.0, 0.0, false),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PowerComponent> {
        self.components.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PowerComponent> {
        self.components.iter_mut()
    }

    pub fn get(&self, name: &str) -> Option<&PowerComponent> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PowerComponent> {
        self.components.iter_mut().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Sum of `current_power` over enabled components.
    pub fn total_consumption(&self) -> f32 {
        self.components
            .iter()
            .filter(|c| c.is_enabled)
            .map(|c| c.current_power)
            .sum()
    }

    /// Sum of `current_power` over enabled CRITICAL components only.
    pub fn critical_consumption(&self) -> f32 {
        self.components
            .iter()
            .filter(|c| c.is_enabled && c.priority == ComponentPriority::Critical)
            .map(|c| c.current_power)
            .sum()
    }
}
