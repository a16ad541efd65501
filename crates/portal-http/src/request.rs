//! Authenticated request value object and the BUILD step of the pipeline.

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use url::Url;

use portal_core::error::InvalidInputError;
use portal_core::{ApiUrl, Result};

use crate::client::ClientConfig;
use crate::endpoints::{CLIENT_HEADER, LANGUAGE_HEADER};

/// A logical API call: method, path, query, body, and extra headers.
///
/// Query values of `None` are dropped before transmission. Caller-supplied
/// headers never override the pipeline's own headers of the same name.
///
/// # Example
///
/// ```
/// use portal_http::ApiRequest;
///
/// let request = ApiRequest::get("/apps")
///     .query("page", 2)
///     .query_opt("search", None::<&str>)
///     .header("X-Trace", "abc");
/// assert_eq!(request.path(), "/apps");
/// ```
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, Option<String>)>,
    body: Option<serde_json::Value>,
    headers: Vec<(String, String)>,
}

/// A request after BUILD: everything except the bearer token.
#[derive(Debug, Clone)]
pub struct BuiltRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// Create a request with an explicit method.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    /// Create a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Create a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Create a PUT request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Create a DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), Some(value.to_string())));
        self
    }

    /// Append a query parameter that is omitted when `None`.
    pub fn query_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.query
            .push((key.into(), value.map(|v| v.to_string())));
        self
    }

    /// Set the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be serialized to JSON.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| InvalidInputError::Body {
            reason: e.to_string(),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Add a caller-supplied header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the endpoint path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Assemble URL, headers, and body.
    ///
    /// Custom headers are inserted first and the fixed headers after them, so
    /// a caller can never replace `Content-Type`, `Language`, or `Client`.
    pub fn build(&self, base: &ApiUrl, config: &ClientConfig) -> Result<BuiltRequest> {
        if self.path.contains(['?', '#']) {
            return Err(InvalidInputError::Path {
                value: self.path.clone(),
                reason: "query and fragment must not be part of the path".to_string(),
            }
            .into());
        }

        let endpoint = base.endpoint(&self.path);
        let mut url = Url::parse(&endpoint).map_err(|e| InvalidInputError::Path {
            value: self.path.clone(),
            reason: e.to_string(),
        })?;

        let pairs: Vec<_> = self
            .query
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
            .collect();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let (name, value) = parse_header(name, value)?;
            headers.append(name, value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static(LANGUAGE_HEADER),
            parse_header(LANGUAGE_HEADER, &config.language)?.1,
        );
        headers.insert(
            HeaderName::from_static(CLIENT_HEADER),
            parse_header(CLIENT_HEADER, &config.client)?.1,
        );

        let body = match &self.body {
            Some(value) => Some(serde_json::to_vec(value).map_err(|e| InvalidInputError::Body {
                reason: e.to_string(),
            })?),
            None => None,
        };

        Ok(BuiltRequest {
            method: self.method.clone(),
            url,
            headers,
            body,
        })
    }
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
        InvalidInputError::Header {
            name: name.to_string(),
            reason: e.to_string(),
        }
    })?;
    let header_value = HeaderValue::from_str(value).map_err(|e| InvalidInputError::Header {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    Ok((header_name, header_value))
}
