//! Workstation health derived from the status of its assets

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Unit types that make up the system unit itself
pub const SYSTEM_COMPONENT_TYPES: [&str; 11] = [
    "SSD",
    "PSU",
    "RAM",
    "CPU",
    "HDD",
    "Case",
    "CPU Fan",
    "Motherboard",
    "System Fan",
    "GPU",
    "Video Card",
];

/// Status names that count as healthy
const HEALTHY_STATUSES: [&str; 3] = ["Functional", "Working", "Operational"];

/// Aggregate health of a workstation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum WorkstationStatus {
    Functional,
    #[serde(rename = "For Repair")]
    ForRepair,
}

impl WorkstationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkstationStatus::Functional => "Functional",
            WorkstationStatus::ForRepair => "For Repair",
        }
    }
}

impl fmt::Display for WorkstationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that carries a unit type and a status name
pub trait StatusBearing {
    fn unit_type(&self) -> &str;
    fn status_name(&self) -> &str;
}

impl<T: StatusBearing> StatusBearing for &T {
    fn unit_type(&self) -> &str {
        (*self).unit_type()
    }

    fn status_name(&self) -> &str {
        (*self).status_name()
    }
}

pub fn is_system_component(unit_type: &str) -> bool {
    let unit_type = unit_type.trim();
    SYSTEM_COMPONENT_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(unit_type))
}

pub fn is_healthy(status_name: &str) -> bool {
    let status_name = status_name.trim();
    HEALTHY_STATUSES
        .iter()
        .any(|s| s.eq_ignore_ascii_case(status_name))
}

/// `Functional` only when there is at least one system component and all of
/// them are healthy. Peripherals are ignored.
pub fn aggregate_status<I, A>(assets: I) -> WorkstationStatus
where
    I: IntoIterator<Item = A>,
    A: StatusBearing,
{
    let mut seen_system = false;
    for asset in assets {
        if !is_system_component(asset.unit_type()) {
            continue;
        }
        seen_system = true;
        if !is_healthy(asset.status_name()) {
            return WorkstationStatus::ForRepair;
        }
    }

    if seen_system {
        WorkstationStatus::Functional
    } else {
        WorkstationStatus::ForRepair
    }
}

/// Splits assets into (system components, peripherals), preserving order
pub fn split_by_kind<A: StatusBearing>(assets: Vec<A>) -> (Vec<A>, Vec<A>) {
    assets
        .into_iter()
        .partition(|a| is_system_component(a.unit_type()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Part(&'static str, &'static str);

    impl StatusBearing for Part {
        fn unit_type(&self) -> &str {
            self.0
        }

        fn status_name(&self) -> &str {
            self.1
        }
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        assert!(is_system_component("cpu"));
        assert!(is_system_component(" Video Card "));
        assert!(is_system_component("system fan"));
        assert!(!is_system_component("Keyboard"));
        assert!(!is_system_component("Monitor"));
        assert!(!is_system_component("CPU Fanatic"));
    }

    #[test]
    fn test_healthy_synonyms() {
        assert!(is_healthy("Functional"));
        assert!(is_healthy("working"));
        assert!(is_healthy("OPERATIONAL"));
        assert!(!is_healthy("For Repair"));
        assert!(!is_healthy("For Upgrade"));
    }

    #[test]
    fn test_all_system_functional() {
        let parts = [Part("CPU", "Functional"), Part("RAM", "Working"), Part("PSU", "Operational")];
        assert_eq!(aggregate_status(&parts), WorkstationStatus::Functional);
    }

    #[test]
    fn test_one_broken_system_component() {
        let parts = [Part("CPU", "Functional"), Part("RAM", "For Repair")];
        assert_eq!(aggregate_status(&parts), WorkstationStatus::ForRepair);
    }

    #[test]
    fn test_peripherals_do_not_count() {
        let parts = [
            Part("CPU", "Functional"),
            Part("Keyboard", "For Replacement"),
            Part("Mouse", "For Repair"),
        ];
        assert_eq!(aggregate_status(&parts), WorkstationStatus::Functional);
    }

    #[test]
    fn test_no_system_components_is_for_repair() {
        let empty: [Part; 0] = [];
        assert_eq!(aggregate_status(&empty), WorkstationStatus::ForRepair);
        let peripherals_only = [Part("Monitor", "Functional")];
        assert_eq!(aggregate_status(&peripherals_only), WorkstationStatus::ForRepair);
    }

    #[test]
    fn test_split_by_kind() {
        let (system, peripherals) = split_by_kind(vec![
            Part("Monitor", "Functional"),
            Part("SSD", "Functional"),
            Part("Mouse", "Functional"),
        ]);
        assert_eq!(system.len(), 1);
        assert_eq!(peripherals.len(), 2);
        assert_eq!(system[0].0, "SSD");
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_string(&WorkstationStatus::ForRepair).unwrap(),
            "\"For Repair\""
        );
        assert_eq!(WorkstationStatus::Functional.to_string(), "Functional");
    }
}
