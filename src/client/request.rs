//! Request descriptors.
//!
//! An [`ApiRequest`] describes one call: where it goes, what it carries, and
//! whether it needs a bearer token. The body kind is explicit, so multipart
//! uploads are never mistaken for JSON.

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Request payload
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Encoded to JSON text just before sending
    Json(serde_json::Value),
    /// Already-encoded text, sent verbatim
    Raw(String),
    /// multipart/form-data; the HTTP stack writes the boundary header
    Multipart(MultipartForm),
}

impl RequestBody {
    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }
}

#[derive(Debug, Clone)]
enum FormField {
    Text(String),
    File {
        bytes: Vec<u8>,
        file_name: String,
        mime: Option<String>,
    },
}

/// A multipart form that can be rebuilt for every attempt.
///
/// `reqwest::multipart::Form` is consumed on send, and the 401 retry has to
/// send the same payload twice, so fields are kept here and turned into a
/// fresh `Form` per attempt.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    fields: Vec<(String, FormField)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), FormField::Text(value.into())));
        self
    }

    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        bytes: Vec<u8>,
        file_name: impl Into<String>,
        mime: Option<&str>,
    ) -> Self {
        self.fields.push((
            name.into(),
            FormField::File {
                bytes,
                file_name: file_name.into(),
                mime: mime.map(str::to_string),
            },
        ));
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn to_form(&self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for (name, field) in &self.fields {
            form = match field {
                FormField::Text(value) => form.text(name.clone(), value.clone()),
                FormField::File {
                    bytes,
                    file_name,
                    mime,
                } => {
                    let mut part = Part::bytes(bytes.clone()).file_name(file_name.clone());
                    if let Some(mime) = mime {
                        part = part.mime_str(mime)?;
                    }
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

/// Everything needed to issue one API call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub endpoint: String,
    pub method: Method,
    pub headers: BTreeMap<String, String>,
    pub body: RequestBody,
    pub require_auth: bool,
    /// Deadline for the whole lifecycle, retry included
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            headers: BTreeMap::new(),
            body: RequestBody::Empty,
            require_auth: true,
            timeout: None,
            cancel: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    /// Marks the request as not needing a session
    #[must_use]
    pub fn public(mut self) -> Self {
        self.require_auth = false;
        self
    }

    #[must_use]
    pub fn require_auth(mut self, require_auth: bool) -> Self {
        self.require_auth = require_auth;
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn form(self, form: MultipartForm) -> Self {
        self.body(RequestBody::Multipart(form))
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}
