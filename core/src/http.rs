//! Request types handed between `Connection` and the transport.
//!
//! # Design
//! An `HttpRequest` is plain data: method, URI, an ordered header list and an
//! optional body. `Connection::build_*` produces one, a caller-supplied hook
//! may edit it, and `Connection::execute` converts it into a ureq request.
//! Keeping the request as data makes header and body selection testable
//! without a network.
//!
//! A streamed body borrows the caller's reader, hence the lifetime on
//! `HttpRequest`. The reader is pulled by the transport while the request is
//! written and is never read into memory up front.

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use crate::error::Error;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const TRANSFER_ENCODING: &str = "Transfer-Encoding";

/// The raw transport response, returned to callers untouched.
pub type HttpResponse = ureq::http::Response<ureq::Body>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("get") {
            Ok(Method::Get)
        } else if s.eq_ignore_ascii_case("post") {
            Ok(Method::Post)
        } else {
            Err(Error::UnsupportedMethod(s.to_string()))
        }
    }
}

impl From<Method> for ureq::http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => ureq::http::Method::GET,
            Method::Post => ureq::http::Method::POST,
        }
    }
}

/// Request body: either fully buffered bytes or a reader streamed lazily.
pub enum Body<'a> {
    Bytes(Vec<u8>),
    Stream(&'a mut dyn Read),
}

impl fmt::Debug for Body<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Body::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `Connection::build_*` methods and consumed by
/// `Connection::execute`.
#[derive(Debug)]
pub struct HttpRequest<'a> {
    pub method: Method,
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Body<'a>>,
}

impl<'a> HttpRequest<'a> {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Look up a header value. Names compare case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set a header, replacing any existing value under the same name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value));
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.set_header(CONTENT_TYPE, content_type);
    }

    pub fn set_body(&mut self, bytes: impl Into<Vec<u8>>) {
        self.body = Some(Body::Bytes(bytes.into()));
    }

    /// Attach a reader as the body. The transport pulls from it while sending.
    pub fn set_body_stream(&mut self, reader: &'a mut dyn Read) {
        self.body = Some(Body::Stream(reader));
    }
}
