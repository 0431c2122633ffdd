//! Structural comparison of declared and observed monitors
//!
//! Any mismatch means "needs update"; nothing here ever asks for a
//! delete-and-recreate.

use crate::error::Result;
use crate::model::{DesiredState, MonitorSpec, ObservedState};

/// A top-level monitor field that can drift
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Sensors,
    Sinks,
    Active,
    Type,
    Variables,
    SinksOptions,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Sensors => "sensors",
            Field::Sinks => "sinks",
            Field::Active => "active",
            Field::Type => "type",
            Field::Variables => "variables",
            Field::SinksOptions => "sinksOptions",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields whose canonical values differ between `desired` and `observed`
///
/// Sensors compare element-wise in order. Absent and empty variables (or
/// sinks) are different values. Sink options compare by key set and then
/// per-key value order.
pub fn drifted_fields(desired: &MonitorSpec, observed: &MonitorSpec) -> Vec<Field> {
    let checks = [
        (Field::Name, desired.name == observed.name),
        (Field::Sensors, desired.sensors == observed.sensors),
        (Field::Sinks, desired.sinks == observed.sinks),
        (Field::Active, desired.active == observed.active),
        (Field::Type, desired.kind == observed.kind),
        (Field::Variables, desired.variables == observed.variables),
        (Field::SinksOptions, desired.sinks_options == observed.sinks_options),
    ];

    checks
        .into_iter()
        .filter_map(|(field, same)| (!same).then_some(field))
        .collect()
}

/// Whether two canonical monitors are structurally equal
pub fn specs_match(desired: &MonitorSpec, observed: &MonitorSpec) -> bool {
    drifted_fields(desired, observed).is_empty()
}

/// Whether the observed monitor already matches the declared one
pub fn is_up_to_date(desired: &DesiredState, observed: &ObservedState) -> Result<bool> {
    Ok(specs_match(&desired.canonicalize()?, &observed.canonicalize()?))
}
