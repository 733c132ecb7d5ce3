use std::{collections::BTreeMap, fmt, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub type Headers = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RequestMethod::Get => write!(f, "GET"),
            RequestMethod::Post => write!(f, "POST"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: RequestMethod,
    pub url: Url,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// A single raw HTTP exchange. Implementations must not retry and must not
/// interpret the status code, that is left to [`HttpClient`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, HttpClientError> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpClientError> {
        let method = match request.method {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
        };

        let mut builder = self.client.request(method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { status, body })
    }
}

/// JSON client on top of an [`HttpTransport`]. Stateless apart from the
/// transport itself, so it can be shared between concurrent callers.
#[derive(Debug, Clone)]
pub struct HttpClient<T> {
    transport: T,
}

impl<T: HttpTransport> HttpClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub async fn get<R>(&self, url: &str, headers: &Headers) -> Result<R, HttpClientError>
    where
        R: DeserializeOwned,
    {
        self.request(RequestMethod::Get, url, headers, None).await
    }

    pub async fn post<R, B>(&self, url: &str, headers: &Headers, body: &B) -> Result<R, HttpClientError>
    where
        R: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let body = serde_json::to_vec(body).map_err(HttpClientError::Encoding)?;
        self.request(RequestMethod::Post, url, headers, Some(body)).await
    }

    async fn request<R>(
        &self,
        method: RequestMethod,
        url: &str,
        headers: &Headers,
        body: Option<Vec<u8>>,
    ) -> Result<R, HttpClientError>
    where
        R: DeserializeOwned,
    {
        let url = Url::parse(url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(HttpClientError::UnexpectedResponseType(url.scheme().to_string()));
        }

        debug!(%method, %url, "sending request");
        let request = HttpRequest {
            method,
            url,
            headers: merge_headers(method, headers),
            body,
        };

        let response = self.transport.execute(request).await?;
        validate_response(&response)?;

        serde_json::from_slice(&response.body).map_err(HttpClientError::Decoding)
    }
}

fn merge_headers(method: RequestMethod, headers: &Headers) -> Headers {
    let mut merged = Headers::new();
    merged.insert("Accept".into(), "application/json".into());
    if method == RequestMethod::Post {
        merged.insert("Content-Type".into(), "application/json".into());
    }

    // Header names are case-insensitive, a caller's "accept" replaces our "Accept"
    for (name, value) in headers {
        merged.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        merged.insert(name.clone(), value.clone());
    }

    merged
}

fn validate_response(response: &HttpResponse) -> Result<(), HttpClientError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }

    Err(HttpClientError::RequestUnsuccessful {
        status: response.status,
        body: String::from_utf8_lossy(&response.body).into_owned(),
    })
}

#[derive(Debug, Error)]
pub enum HttpClientError {
    #[error("Invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Response for scheme '{0}' is not an HTTP response")]
    UnexpectedResponseType(String),
    #[error("Server returned error {status}: {body}")]
    RequestUnsuccessful { status: u16, body: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Transport failed: {0}")]
    Transport(String),
    #[error("Failed to encode request body: {0}")]
    Encoding(serde_json::Error),
    #[error("Failed to decode response body: {0}")]
    Decoding(serde_json::Error),
}
