// Tests module
// Scenarios: transaction validation across the migration boundary
// Properties: ledger totality, turnstile floor, idempotence
// Block validation: parallel validation, cancellation, atomic apply

pub mod helpers;
pub mod properties;
