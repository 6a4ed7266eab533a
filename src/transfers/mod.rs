//! Transfer listing and cleanup

mod cleaner;
mod list;

pub use cleaner::{clean_transfers, CleanReport};
pub use list::list_transfers;
