// Deployment phase - One row of the activation table
use crate::types::{AddressClass, Height};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Enforcement rule for a class during a phase
///
/// Only two levels exist. A value-destroying level ("outputs of this class
/// become unspendable") is deliberately not representable, so a table that
/// names one fails to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnforcementRule {
    /// Every class spends under its native scheme
    Voluntary,
    /// Legacy spends must migrate value into quantum-resistant outputs
    TurnstileRequired,
}

impl fmt::Display for EnforcementRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EnforcementRule::Voluntary => f.write_str("Voluntary"),
            EnforcementRule::TurnstileRequired => f.write_str("TurnstileRequired"),
        }
    }
}

/// Rule binding for one class over `[start_height, end_height)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentPhase {
    #[serde(rename = "addressClass")]
    pub class: AddressClass,

    #[serde(rename = "startHeight")]
    pub start_height: Height,

    /// Exclusive end; `None` = open-ended
    #[serde(rename = "endHeight", default)]
    pub end_height: Option<Height>,

    pub rule: EnforcementRule,
}

impl DeploymentPhase {
    pub fn new(
        class: AddressClass,
        start_height: Height,
        end_height: Option<Height>,
        rule: EnforcementRule,
    ) -> Self {
        Self {
            class,
            start_height,
            end_height,
            rule,
        }
    }

    /// Open-ended phase starting at `start_height`
    pub fn open(class: AddressClass, start_height: Height, rule: EnforcementRule) -> Self {
        Self::new(class, start_height, None, rule)
    }

    /// Inclusive start, exclusive end
    pub fn contains(&self, height: Height) -> bool {
        height >= self.start_height && self.end_height.map_or(true, |end| height < end)
    }
}

impl fmt::Display for DeploymentPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.end_height {
            Some(end) => write!(f, "{} [{}, {}) {}", self.class, self.start_height, end, self.rule),
            None => write!(f, "{} [{}, ∞) {}", self.class, self.start_height, self.rule),
        }
    }
}
