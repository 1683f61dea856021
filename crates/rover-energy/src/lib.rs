pub mod alloc;
pub mod doctor;
pub mod manager;
pub mod mode;
pub mod predict;
pub mod registry;
pub mod state;

pub use manager::{PowerManager, SensorError, TickReport};
pub use mode::{PowerMode, Thresholds};
pub use predict::{predict_sol_energy, SolModel};
pub use registry::{ComponentPriority, PowerComponent, Registry};
pub use state::EnergyState;
