//! Contract data structures, observed histories and CSV ingestion

mod data;
mod observation;
pub mod schedule;
pub mod loader;

pub use data::{CarCategory, ContractProfile, ContractTerms, Gender};
pub use observation::{Observation, ObservationWindow};
pub use schedule::synthesize_schedule;
pub use loader::{load_contracts, load_contracts_from_readers, ContractRecord, LoadError, ScheduleSource};
