// Deployments - Built-in per-network activation schedules
use crate::activation::{DeploymentPhase, EnforcementRule};
use crate::types::{AddressClass, Height};

/// Height from which legacy spends on mainnet must migrate
pub const MAINNET_TURNSTILE_HEIGHT: Height = 680_000;

/// Height from which legacy spends on testnet must migrate
pub const TESTNET_TURNSTILE_HEIGHT: Height = 120_000;

/// Regtest activates early so that tests can cross the boundary quickly
pub const REGTEST_TURNSTILE_HEIGHT: Height = 200;

/// Two-phase schedule: legacy voluntary until `turnstile_height`, then
/// turnstile required; QR and hybrid outputs stay voluntary throughout.
pub fn two_phase_schedule(turnstile_height: Height) -> Vec<DeploymentPhase> {
    vec![
        DeploymentPhase::new(
            AddressClass::LegacyEcc,
            0,
            Some(turnstile_height),
            EnforcementRule::Voluntary,
        ),
        DeploymentPhase::open(
            AddressClass::LegacyEcc,
            turnstile_height,
            EnforcementRule::TurnstileRequired,
        ),
        DeploymentPhase::open(AddressClass::QuantumResistant, 0, EnforcementRule::Voluntary),
        DeploymentPhase::open(AddressClass::Hybrid, 0, EnforcementRule::Voluntary),
    ]
}

pub fn mainnet() -> Vec<DeploymentPhase> {
    two_phase_schedule(MAINNET_TURNSTILE_HEIGHT)
}

pub fn testnet() -> Vec<DeploymentPhase> {
    two_phase_schedule(TESTNET_TURNSTILE_HEIGHT)
}

pub fn regtest() -> Vec<DeploymentPhase> {
    two_phase_schedule(REGTEST_TURNSTILE_HEIGHT)
}
