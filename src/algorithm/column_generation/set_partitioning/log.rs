//! # Progress log
//!
//! A serializable snapshot of the fix state and coverage, one per iteration of the driver.
use serde::{Deserialize, Serialize};

use crate::algorithm::column_generation::set_partitioning::SetPartitioningProblem;

/// Something the fixing heuristic did since the last log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixEvent {
    /// Constraints were fixed to members at this coverage level.
    ThresholdShift {
        /// Threshold on the coverage that was used.
        level: f64,
    },
    /// A column was fixed to one.
    ColumnFixed {
        /// Value of the column before fixing.
        fractional_value: f64,
    },
    /// Nothing could be fixed anymore.
    IntegerSolution,
}

/// Coverage of one side constraint by one member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintEntry {
    /// Whether the constraint is fixed for the member.
    pub fixed: bool,
    /// The fixed value, or the coverage in the fractional solution.
    pub value: f64,
}

/// State of one member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberEntry {
    /// Name of the member, or its index if it has none.
    pub id: String,
    /// One entry per side constraint.
    pub constraints: Vec<ConstraintEntry>,
}

/// State of all members after an iteration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LogEntry {
    /// One entry per member.
    pub members: Vec<MemberEntry>,
    /// What happened since the previous entry.
    pub events: Vec<FixEvent>,
}

impl SetPartitioningProblem {
    /// Describe the current state.
    ///
    /// Events recorded since the previous entry are moved into this one.
    pub fn create_log_entry(&mut self) -> LogEntry {
        let members = (0..self.number_of_groups())
            .map(|member| MemberEntry {
                id: self.member_name(member),
                constraints: self.fixes.row(member).iter()
                    .zip(self.fractional.row(member))
                    .map(|(fix, &value)| match fix.value() {
                        Some(fixed) => ConstraintEntry { fixed: true, value: f64::from(fixed) },
                        None => ConstraintEntry { fixed: false, value },
                    })
                    .collect(),
            })
            .collect();

        LogEntry { members, events: self.events.drain(..).collect() }
    }
}
