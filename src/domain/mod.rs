//! Variables, candidate domains and domain snapshots.

mod set;
mod snapshot;
mod variable;

pub use set::Domain;
pub use snapshot::DomainSnapshot;
pub use variable::{Variable, VariableParseError};
