pub mod account_api;
pub mod certificate_service;
pub mod http_helpers;
pub mod results_query;

pub use account_api::{AccountApi, HttpAccountApi};
pub use certificate_service::{CertificateDocument, CertificateService, DocumentRenderer};
