// SPDX-License-Identifier: MIT

//! Severity colors of clinician findings

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity color attached to a rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TriggerColor {
    #[default]
    Red,
    Orange,
    Yellow,
    Green,
}

/// Display values for a color in the clinician report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: &'static str,
    pub border: &'static str,
    pub text: &'static str,
    pub emoji: &'static str,
}

impl TriggerColor {
    pub fn palette(self) -> Palette {
        match self {
            TriggerColor::Red => Palette {
                background: "#fef2f2",
                border: "#fca5a5",
                text: "#991b1b",
                emoji: "🔴",
            },
            TriggerColor::Orange => Palette {
                background: "#fff7ed",
                border: "#fdba74",
                text: "#9a3412",
                emoji: "🟠",
            },
            TriggerColor::Yellow => Palette {
                background: "#fefce8",
                border: "#fde047",
                text: "#854d0e",
                emoji: "🟡",
            },
            TriggerColor::Green => Palette {
                background: "#f0fdf4",
                border: "#86efac",
                text: "#166534",
                emoji: "🟢",
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TriggerColor::Red => "red",
            TriggerColor::Orange => "orange",
            TriggerColor::Yellow => "yellow",
            TriggerColor::Green => "green",
        }
    }
}

impl fmt::Display for TriggerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
