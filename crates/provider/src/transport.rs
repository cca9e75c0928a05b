use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::context::ErrorContext;
use crate::error::{ApiError, ProviderError};

/// Default request timeout for [`ReqwestTransport`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A form field carrying one value or a repeated list of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Many(Vec<String>),
}

impl FieldValue {
    /// Iterate the values in send order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        };
        values.iter().map(String::as_str)
    }

    /// The single value, if this is not a list.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Many(_) => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_owned())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

/// Form fields by name, in a stable order.
pub type FormFields = BTreeMap<String, FieldValue>;

/// A file uploaded as one part of a multipart request.
#[derive(Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Form field name the file is sent under.
    pub field: String,
    pub filename: Option<String>,
    pub content: Vec<u8>,
    pub mimetype: String,
}

impl std::fmt::Debug for FilePart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilePart")
            .field("field", &self.field)
            .field("filename", &self.filename)
            .field("content", &format_args!("<{} bytes>", self.content.len()))
            .field("mimetype", &self.mimetype)
            .finish()
    }
}

/// HTTP Basic credentials.
#[derive(Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A fully-built form POST, ready for the transport.
#[derive(Debug, Clone)]
pub struct FormRequest {
    pub url: String,
    pub auth: BasicAuth,
    pub fields: FormFields,
    pub files: Vec<FilePart>,
}

impl FormRequest {
    /// Flatten the fields into `(name, value)` pairs, repeating the name for
    /// list values.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.fields
            .iter()
            .flat_map(|(name, value)| value.values().map(move |v| (name.as_str(), v)))
            .collect()
    }
}

/// Status and raw body of a provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Classify a non-2xx response.
    ///
    /// HTTP 429 becomes [`ProviderError::RateLimited`]; any other failure
    /// status becomes [`ProviderError::Api`]. Both carry this response.
    pub fn error_for_status(&self, provider: &str) -> Result<(), ProviderError> {
        if self.is_success() {
            return Ok(());
        }
        let err = ApiError::new(
            format!("{provider} API response {}", self.status),
            ErrorContext::default().with_response(self.clone()),
        );
        if self.status == 429 {
            return Err(ProviderError::RateLimited(Box::new(err)));
        }
        Err(ProviderError::Api(Box::new(err)))
    }
}

/// The outbound HTTP collaborator used by backends.
#[async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    /// POST the request and return the status and raw body.
    ///
    /// Non-2xx responses are returned as `Ok`; classifying them is the
    /// caller's job.
    async fn post_form(&self, request: FormRequest) -> Result<TransportResponse, ProviderError>;
}

/// [`HttpTransport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Build a transport with its own client and the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, timeout })
    }

    /// Use an existing client, e.g. to share a connection pool.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    fn classify(&self, err: &reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Connection(err.to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn post_form(&self, request: FormRequest) -> Result<TransportResponse, ProviderError> {
        let builder = self
            .client
            .post(&request.url)
            .basic_auth(&request.auth.username, Some(&request.auth.password));

        let builder = if request.files.is_empty() {
            debug!(fields = request.fields.len(), "posting url-encoded form");
            builder.form(&request.pairs())
        } else {
            debug!(
                fields = request.fields.len(),
                files = request.files.len(),
                "posting multipart form"
            );
            builder.multipart(multipart_form(request))
        };

        let response = builder.send().await.map_err(|e| self.classify(&e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.classify(&e))?;

        debug!(status, "provider responded");
        Ok(TransportResponse { status, body })
    }
}

fn multipart_form(request: FormRequest) -> reqwest::multipart::Form {
    let mut form = reqwest::multipart::Form::new();
    for (name, value) in request.fields {
        match value {
            FieldValue::Single(v) => form = form.text(name, v),
            FieldValue::Many(values) => {
                for v in values {
                    form = form.text(name.clone(), v);
                }
            }
        }
    }

    for file in request.files {
        let part = file_part(&file);
        form = form.part(file.field, part);
    }
    form
}

fn file_part(file: &FilePart) -> reqwest::multipart::Part {
    let bare = || {
        let part = reqwest::multipart::Part::bytes(file.content.clone());
        match &file.filename {
            Some(name) => part.file_name(name.clone()),
            None => part,
        }
    };
    bare().mime_str(&file.mimetype).unwrap_or_else(|_| bare())
}
