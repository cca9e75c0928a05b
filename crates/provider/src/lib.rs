pub mod context;
pub mod error;
pub mod log;
pub mod payload;
pub mod provider;
pub mod transport;

pub use context::ErrorContext;
pub use error::{ApiError, ProviderError};
pub use log::LogBackend;
pub use payload::{PayloadVisitor, populate};
pub use provider::EmailBackend;
pub use transport::{
    BasicAuth, FieldValue, FilePart, FormFields, FormRequest, HttpTransport, ReqwestTransport,
    TransportResponse,
};
