pub mod results_catalog;
pub mod user_directory;

pub use results_catalog::{CatalogState, ResultsCatalogController};
pub use user_directory::{Confirmation, UserDirectoryController, LOGIN_ENTRY_POINT};
