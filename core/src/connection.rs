//! Blocking connection to the scnnr recognition API.
//!
//! # Design
//! `Connection` holds the target URI, the method for generic requests, an
//! optional API key and the `tracing::Dispatch` it logs to. Every send goes
//! through the same path: build an `HttpRequest`, let the caller adjust it,
//! execute it with ureq and hand back the raw response. Responses are never
//! inspected; status handling belongs to the caller.

use std::fmt;
use std::io::Read;

use serde::Serialize;
use tracing::subscriber::NoSubscriber;
use tracing::Dispatch;
use ureq::{Agent, SendBody};

use crate::error::Result;
use crate::http::{Body, HttpRequest, HttpResponse, Method, API_KEY_HEADER, TRANSFER_ENCODING};

const OCTET_STREAM: &str = "application/octet-stream";
const JSON: &str = "application/json";

#[derive(Clone)]
pub struct Connection {
    uri: String,
    method: Method,
    api_key: Option<String>,
    logger: Dispatch,
    agent: Agent,
}

impl Connection {
    pub fn new(
        uri: impl Into<String>,
        method: Method,
        api_key: Option<String>,
        logger: Dispatch,
    ) -> Self {
        // Non-2xx responses are data for the caller, not transport errors.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            uri: uri.into(),
            method,
            api_key,
            logger,
            agent,
        }
    }

    /// A connection whose log output goes nowhere.
    pub fn with_silent_logger(
        uri: impl Into<String>,
        method: Method,
        api_key: Option<String>,
    ) -> Self {
        Self::new(uri, method, api_key, Dispatch::new(NoSubscriber::default()))
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Build a bodiless request for the configured method.
    pub fn build_request(&self) -> HttpRequest<'static> {
        self.prepare(self.method)
    }

    /// Build a chunked POST whose body is pulled from `reader`.
    pub fn build_stream<'a>(&self, reader: &'a mut dyn Read) -> HttpRequest<'a> {
        let mut request = self.prepare(Method::Post);
        request.set_content_type(OCTET_STREAM);
        request.set_header(TRANSFER_ENCODING, "chunked");
        request.set_body_stream(reader);
        request
    }

    /// Build a POST carrying `data` serialized as JSON.
    pub fn build_json<T: Serialize + ?Sized>(&self, data: &T) -> Result<HttpRequest<'static>> {
        let body = serde_json::to_vec(data)?;
        let mut request = self.prepare(Method::Post);
        request.set_content_type(JSON);
        request.set_body(body);
        Ok(request)
    }

    pub fn send_request(&self) -> Result<HttpResponse> {
        self.send_request_with(|_| {})
    }

    /// Send a request for the configured method, letting `mutator` adjust it
    /// first. The mutator runs exactly once, before anything is written.
    pub fn send_request_with<F>(&self, mutator: F) -> Result<HttpResponse>
    where
        F: FnOnce(&mut HttpRequest<'_>),
    {
        let mut request = self.build_request();
        mutator(&mut request);
        self.execute(request)
    }

    /// Upload the bytes of `reader` as `application/octet-stream`.
    ///
    /// The reader stays owned by the caller and is not closed here.
    pub fn send_stream(&self, reader: &mut dyn Read) -> Result<HttpResponse> {
        self.execute(self.build_stream(reader))
    }

    pub fn send_json<T: Serialize + ?Sized>(&self, data: &T) -> Result<HttpResponse> {
        self.execute(self.build_json(data)?)
    }

    /// Run `request` over the network and return the response verbatim.
    pub fn execute(&self, request: HttpRequest<'_>) -> Result<HttpResponse> {
        tracing::dispatcher::with_default(&self.logger, || -> Result<HttpResponse> {
            let HttpRequest {
                method,
                uri,
                headers,
                body,
            } = request;

            tracing::debug!(method = %method, uri = %uri, "sending request");

            let mut builder = ureq::http::Request::builder()
                .method(ureq::http::Method::from(method))
                .uri(uri.as_str());
            for (name, value) in &headers {
                builder = builder.header(name.as_str(), value.as_str());
            }

            let response = match body {
                None => self.agent.run(builder.body(())?)?,
                Some(Body::Bytes(bytes)) => self.agent.run(builder.body(bytes)?)?,
                Some(Body::Stream(reader)) => {
                    self.agent.run(builder.body(SendBody::from_reader(reader))?)?
                }
            };

            tracing::debug!(status = response.status().as_u16(), uri = %uri, "response received");
            Ok(response)
        })
    }

    fn prepare<'a>(&self, method: Method) -> HttpRequest<'a> {
        let mut request = HttpRequest::new(method, self.uri.clone());
        if let Some(key) = &self.api_key {
            request.set_header(API_KEY_HEADER, key.clone());
        }
        request
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("uri", &self.uri)
            .field("method", &self.method)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}
