/*!
 * Process State
 * Priority records and the store that owns them
 */

pub mod store;
pub mod types;

pub use store::PriorityStore;
pub use types::{PriorityRecord, ProcessSnapshot, ProcessState};
