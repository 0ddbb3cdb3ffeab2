// Consensus - Transaction and block validation for the quantum migration
// Principle: every path returns a verdict, nothing is repaired or retried

pub mod binding;
pub mod block;
pub mod turnstile;
pub mod validation;

pub use binding::{KeyHashBinding, MigrationBindingPolicy};
pub use block::{BlockValidationError, BlockValidator, ConnectedBlock};
pub use turnstile::{TurnstileRecord, TurnstileValidator};
pub use validation::{ConsensusValidator, RejectReason, TxValidationResult};
