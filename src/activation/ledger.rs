// Activation ledger - Which rule governs which class at which height
//
// Built once from the deployment table and never mutated. A network upgrade
// ships a new table (and a new ledger), it never edits this one.
//
// Invariants checked at construction, per spendable class:
//   - first phase starts at height 0
//   - phase[i].end == phase[i+1].start  (no gap, no overlap)
//   - end > start for bounded phases
//   - the last phase, and only the last, is open-ended

use super::phase::{DeploymentPhase, EnforcementRule};
use crate::types::{AddressClass, Height};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Immutable, validated phase table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationLedger {
    phases: BTreeMap<AddressClass, Vec<DeploymentPhase>>,
}

impl ActivationLedger {
    /// Validate and freeze a deployment table
    pub fn new(table: &[DeploymentPhase]) -> Result<Self, LedgerError> {
        let mut phases: BTreeMap<AddressClass, Vec<DeploymentPhase>> = BTreeMap::new();

        for phase in table {
            if !phase.class.is_spendable() {
                return Err(LedgerError::UnknownClassPhase {
                    start_height: phase.start_height,
                });
            }
            if let Some(end) = phase.end_height {
                if end <= phase.start_height {
                    return Err(LedgerError::EmptyRange {
                        class: phase.class,
                        start_height: phase.start_height,
                        end_height: end,
                    });
                }
            }
            phases.entry(phase.class).or_default().push(*phase);
        }

        for class in AddressClass::SPENDABLE {
            let list = phases
                .get_mut(&class)
                .ok_or(LedgerError::ClassNotCovered(class))?;
            list.sort_by_key(|phase| phase.start_height);
            validate_partition(class, list)?;
        }

        let ledger = Self { phases };
        for phase in ledger.iter() {
            info!("Deployment phase: {}", phase);
        }
        Ok(ledger)
    }

    /// Phase governing `class` at `height`
    ///
    /// Inclusive start: the block at a phase's `start_height` is already
    /// governed by it. Returns `None` only for `Unknown`, which has no
    /// phases.
    pub fn active_phase(&self, class: AddressClass, height: Height) -> Option<&DeploymentPhase> {
        let list = self.phases.get(&class)?;
        let idx = list.partition_point(|phase| phase.start_height <= height);
        // idx >= 1 because every list starts at height 0
        let phase = list.get(idx.checked_sub(1)?)?;
        debug!("Active phase for {} at #{}: {}", class, height, phase.rule);
        Some(phase)
    }

    /// Rule governing `class` at `height`
    pub fn active_rule(&self, class: AddressClass, height: Height) -> Option<EnforcementRule> {
        self.active_phase(class, height).map(|phase| phase.rule)
    }

    /// Height at which the rule for `class` next changes, if ever
    pub fn next_transition(&self, class: AddressClass, height: Height) -> Option<Height> {
        self.active_phase(class, height)?.end_height
    }

    /// All phases, ordered by class then start height
    pub fn iter(&self) -> impl Iterator<Item = &DeploymentPhase> {
        self.phases.values().flatten()
    }

    pub fn phases_for(&self, class: AddressClass) -> &[DeploymentPhase] {
        self.phases.get(&class).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn validate_partition(class: AddressClass, list: &[DeploymentPhase]) -> Result<(), LedgerError> {
    let first = list.first().ok_or(LedgerError::ClassNotCovered(class))?;
    if first.start_height != 0 {
        return Err(LedgerError::MissingGenesisPhase {
            class,
            first_start: first.start_height,
        });
    }

    for pair in list.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        match current.end_height {
            None => {
                return Err(LedgerError::Overlap {
                    class,
                    first_start: current.start_height,
                    second_start: next.start_height,
                })
            }
            Some(end) if end > next.start_height => {
                return Err(LedgerError::Overlap {
                    class,
                    first_start: current.start_height,
                    second_start: next.start_height,
                })
            }
            Some(end) if end < next.start_height => {
                return Err(LedgerError::Gap {
                    class,
                    from: end,
                    to: next.start_height,
                })
            }
            Some(_) => {}
        }
    }

    if let Some(last) = list.last() {
        if let Some(end) = last.end_height {
            return Err(LedgerError::NotOpenEnded { class, end });
        }
    }

    Ok(())
}

/// Deployment table errors (fatal configuration errors)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("No deployment phase covers class {0}")]
    ClassNotCovered(AddressClass),

    #[error("First phase for {class} starts at {first_start}, expected 0")]
    MissingGenesisPhase { class: AddressClass, first_start: Height },

    #[error("Phases for {class} starting at {first_start} and {second_start} overlap")]
    Overlap {
        class: AddressClass,
        first_start: Height,
        second_start: Height,
    },

    #[error("Gap in phases for {class}: heights [{from}, {to}) are not covered")]
    Gap { class: AddressClass, from: Height, to: Height },

    #[error("Phase for {class} [{start_height}, {end_height}) is empty")]
    EmptyRange {
        class: AddressClass,
        start_height: Height,
        end_height: Height,
    },

    #[error("Last phase for {class} ends at {end}; heights above it are not covered")]
    NotOpenEnded { class: AddressClass, end: Height },

    #[error("Phase starting at {start_height} targets the Unknown class")]
    UnknownClassPhase { start_height: Height },
}
