use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::belt::constants::{FULL_CIRCLE, INTENSITY_MAX, INTENSITY_MIN};
use crate::belt::types::PowerStatus;

/// Behavior of the simulated belt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulatorConfig {
    /// How often (milliseconds) the simulated belt advances one step.
    pub step_interval_ms: u64,
    /// When false, scanning ends without finding a belt.
    pub belt_present: bool,
    /// Names the simulated belts advertise during a scan.
    pub belt_names: Vec<String>,
    pub default_intensity: u8,
    pub initial_battery_level: f64,
    pub battery_drain_per_step: f64,
    pub power_status: PowerStatus,
    /// Degrees the heading drifts each step while connected.
    pub heading_step: i32,
    pub accuracy_signal_enabled: bool,
    /// Simulate a connection loss after this many connected steps.
    pub drop_connection_after_steps: Option<u32>,
}

impl SimulatorConfig {
    pub fn sanitize(&mut self) {
        self.step_interval_ms = self.step_interval_ms.max(10);
        self.heading_step = self.heading_step.rem_euclid(FULL_CIRCLE);
        self.belt_names = self.belt_names
            .iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        self.default_intensity = self.default_intensity.clamp(INTENSITY_MIN, INTENSITY_MAX);
        if !self.initial_battery_level.is_finite() {
            self.initial_battery_level = 100.0;
        }
        self.initial_battery_level = self.initial_battery_level.clamp(0.0, 100.0);
        if !self.battery_drain_per_step.is_finite() || self.battery_drain_per_step < 0.0 {
            self.battery_drain_per_step = 0.0;
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            step_interval_ms: 250,
            belt_present: true,
            belt_names: vec!["naviGuertel 4B1F".to_string(), "naviGuertel 7C02".to_string()],
            default_intensity: 50,
            initial_battery_level: 80.0,
            battery_drain_per_step: 0.02,
            power_status: PowerStatus::OnBattery,
            heading_step: 3,
            accuracy_signal_enabled: true,
            drop_connection_after_steps: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub simulator: SimulatorConfig,
}

impl Config {
    pub fn sanitize(&mut self) {
        self.simulator.sanitize();
    }
}
