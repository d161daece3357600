pub mod request;
pub mod response;

pub use request::{AccountQuery, PageRequest};
pub use response::{ApiErrorBody, PageResult, ProfileResponse, ResultStatistics, RoleCounts};
