//! Audio filter presets offered by the filter menu.
//!
//! Each preset renders to the filter object of the Lavalink v4 player REST
//! API, so the node adapter can pass it through without knowing the presets.

use serde_json::{json, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPreset {
    Clear,
    Nightcore,
    Vaporwave,
    BassBoost,
    EightD,
    Karaoke,
}

impl FilterPreset {
    pub const ALL: [FilterPreset; 6] = [
        FilterPreset::Clear,
        FilterPreset::Nightcore,
        FilterPreset::Vaporwave,
        FilterPreset::BassBoost,
        FilterPreset::EightD,
        FilterPreset::Karaoke,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "clear" | "none" | "off" | "reset" => Some(FilterPreset::Clear),
            "nightcore" => Some(FilterPreset::Nightcore),
            "vaporwave" => Some(FilterPreset::Vaporwave),
            "bassboost" | "bass" => Some(FilterPreset::BassBoost),
            "8d" | "eightd" => Some(FilterPreset::EightD),
            "karaoke" => Some(FilterPreset::Karaoke),
            _ => None,
        }
    }

    /// Valor usado en el menú de selección
    pub fn value(&self) -> &'static str {
        match self {
            FilterPreset::Clear => "clear",
            FilterPreset::Nightcore => "nightcore",
            FilterPreset::Vaporwave => "vaporwave",
            FilterPreset::BassBoost => "bassboost",
            FilterPreset::EightD => "8d",
            FilterPreset::Karaoke => "karaoke",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterPreset::Clear => "Clear filters",
            FilterPreset::Nightcore => "Nightcore",
            FilterPreset::Vaporwave => "Vaporwave",
            FilterPreset::BassBoost => "Bass boost",
            FilterPreset::EightD => "8D audio",
            FilterPreset::Karaoke => "Karaoke",
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            FilterPreset::Clear => json!({}),
            FilterPreset::Nightcore => json!({
                "timescale": { "speed": 1.2, "pitch": 1.2, "rate": 1.0 }
            }),
            FilterPreset::Vaporwave => json!({
                "timescale": { "speed": 0.85, "pitch": 0.8, "rate": 1.0 }
            }),
            FilterPreset::BassBoost => {
                // Refuerzo en las cinco bandas más graves
                let bands: Vec<Value> = [0.25, 0.2, 0.15, 0.1, 0.05]
                    .iter()
                    .enumerate()
                    .map(|(band, gain)| json!({ "band": band, "gain": gain }))
                    .collect();
                json!({ "equalizer": bands })
            }
            FilterPreset::EightD => json!({
                "rotation": { "rotationHz": 0.2 }
            }),
            FilterPreset::Karaoke => json!({
                "karaoke": {
                    "level": 1.0,
                    "monoLevel": 1.0,
                    "filterBand": 220.0,
                    "filterWidth": 100.0
                }
            }),
        }
    }
}

impl fmt::Display for FilterPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
