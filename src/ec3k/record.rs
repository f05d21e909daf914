//! The record emitted for an accepted frame.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::EC3K_MODEL;
use crate::ec3k::fields::DecodedFields;

/// Emitted record. Key order on the wire is `model`, `id`, `power`, `energy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyRecord {
    pub model: String,
    pub id: u16,
    /// Instantaneous power in W.
    pub power: f64,
    /// Cumulative energy in kWh.
    pub energy: f64,
}

impl EnergyRecord {
    pub fn new(id: u16, power: f64, energy: f64) -> Self {
        Self {
            model: EC3K_MODEL.to_string(),
            id,
            power,
            energy,
        }
    }
}

impl From<&DecodedFields> for EnergyRecord {
    fn from(fields: &DecodedFields) -> Self {
        Self::new(fields.id, fields.power_w(), fields.energy_kwh())
    }
}

impl fmt::Display for EnergyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} id={:04X} power={:.1} W energy={:.3} kWh",
            self.model, self.id, self.power, self.energy
        )
    }
}
