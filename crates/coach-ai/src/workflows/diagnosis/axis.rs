use serde::{Deserialize, Serialize};
use std::fmt;

/// The six health axes tracked for every client.
///
/// Declaration order doubles as the tie-break priority when quests are
/// sequenced, and as the rendering order of dashboard payloads. The survey
/// battery addresses the same six dimensions by short labels ("asset",
/// "time", ...); `battery_label`/`from_battery_label` are the only place that
/// correspondence lives.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    AssetStability,
    TimeIndependence,
    PhysicalCondition,
    EmotionalBalance,
    NetworkPower,
    SystemLeverage,
}

impl Axis {
    pub const ALL: [Axis; 6] = [
        Axis::AssetStability,
        Axis::TimeIndependence,
        Axis::PhysicalCondition,
        Axis::EmotionalBalance,
        Axis::NetworkPower,
        Axis::SystemLeverage,
    ];

    /// Short category label used by the survey battery.
    pub const fn battery_label(self) -> &'static str {
        match self {
            Axis::AssetStability => "asset",
            Axis::TimeIndependence => "time",
            Axis::PhysicalCondition => "body",
            Axis::EmotionalBalance => "emotion",
            Axis::NetworkPower => "network",
            Axis::SystemLeverage => "system",
        }
    }

    pub fn from_battery_label(label: &str) -> Option<Self> {
        Axis::ALL
            .into_iter()
            .find(|axis| axis.battery_label() == label)
    }

    /// Column name of this axis on the persisted health index, also the JSON
    /// field name dashboards consume. Matches the serde form of the variant.
    pub const fn field_name(self) -> &'static str {
        match self {
            Axis::AssetStability => "asset_stability",
            Axis::TimeIndependence => "time_independence",
            Axis::PhysicalCondition => "physical_condition",
            Axis::EmotionalBalance => "emotional_balance",
            Axis::NetworkPower => "network_power",
            Axis::SystemLeverage => "system_leverage",
        }
    }

    /// Human-readable axis name used in prompts and notifications.
    pub const fn label(self) -> &'static str {
        match self {
            Axis::AssetStability => "Asset Stability",
            Axis::TimeIndependence => "Time Independence",
            Axis::PhysicalCondition => "Physical Condition",
            Axis::EmotionalBalance => "Emotional Balance",
            Axis::NetworkPower => "Network Power",
            Axis::SystemLeverage => "System Leverage",
        }
    }

    /// Title of the improvement quest seeded for this axis.
    pub const fn quest_title(self) -> &'static str {
        match self {
            Axis::AssetStability => "Asset Stability Check-In",
            Axis::TimeIndependence => "Time Independence Check-In",
            Axis::PhysicalCondition => "Physical Condition Check-In",
            Axis::EmotionalBalance => "Emotional Balance Check-In",
            Axis::NetworkPower => "Network Power Check-In",
            Axis::SystemLeverage => "System Leverage Check-In",
        }
    }

    /// Empathetic framing handed to the oracle alongside the axis label.
    pub const fn empathy_context(self) -> &'static str {
        match self {
            Axis::AssetStability => {
                "They feel financially exposed. Before falling asleep they sometimes wonder, \"What if my income stopped tomorrow?\""
            }
            Axis::TimeIndependence => {
                "They feel chased by the clock. \"When will I ever get some breathing room?\" Every day feels rushed."
            }
            Axis::PhysicalCondition => {
                "They are physically worn down. \"Can I really keep running at this pace?\" They worry they are ignoring the signals their body sends."
            }
            Axis::EmotionalBalance => {
                "They are emotionally shaken. \"Is it only me who finds this hard?\" That thought wears them out some days."
            }
            Axis::NetworkPower => {
                "Their network feels thin. \"Is there anyone who would truly back me?\" At times running the business feels lonely."
            }
            Axis::SystemLeverage => {
                "They repeat the same work by hand. \"How long do I have to keep doing this manually?\" They suspect there is a better way but cannot see it."
            }
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Serde adapter so battery configuration files can keep using the short
/// category labels while the rest of the system speaks `Axis`.
pub mod battery_label {
    use super::Axis;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(axis: &Axis, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(axis.battery_label())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Axis, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Axis::from_battery_label(&raw)
            .ok_or_else(|| D::Error::custom(format!("unknown battery category '{raw}'")))
    }
}
