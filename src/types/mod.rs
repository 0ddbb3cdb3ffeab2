// Types fondamentaux du moteur de migration
// Principe: Minimal, auditable, déterministe

pub mod primitives;
pub mod signature;
pub mod output;
pub mod transaction;

pub use primitives::*;
pub use signature::*;
pub use output::*;
pub use transaction::*;
