use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventKind {
    ModeChange,
    Battery,
    Budget,
    Forecast,
}

/// One line of power telemetry. Fields that don't apply to a kind stay None.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerEvent {
    pub ts_unix_ms: i64,
    pub kind: EventKind,
    pub mode: Option<String>,
    pub soc_pct: Option<f32>,
    pub available_w: Option<f32>,
    pub predicted_wh: Option<f32>,
    pub msg: String,
}

impl PowerEvent {
    pub fn new(ts_unix_ms: i64, kind: EventKind, msg: String) -> Self {
        Self {
            ts_unix_ms,
            kind,
            mode: None,
            soc_pct: None,
            available_w: None,
            predicted_wh: None,
            msg,
        }
    }
}
