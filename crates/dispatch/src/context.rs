//! Per-request context handed to every handler.
//!
//! A [`Context`] bundles read access to one inbound request (method, path, headers, query
//! string, url-encoded or multipart form body) with a buffered [`ResponseWriter`] for the outgoing response.
//! One context is created for every request and dropped once the response has been produced.

use crate::error::BindError;
use crate::form::{form_encoding, FormEncoding};
use crate::values::Values;
use bytes::{Bytes, BytesMut};
use http::header::{CONNECTION, CONTENT_TYPE, UPGRADE, X_CONTENT_TYPE_OPTIONS};
use http::request::Parts;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Response, StatusCode, Uri};
use http_body_util::Full;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::io;
use tracing::{error, warn};

/// Represents the state of a single request/response exchange.
///
/// The request side is immutable; handlers only mutate the response side through
/// [`status`](Context::status), [`header`](Context::header) and the body writers.
#[derive(Debug)]
pub struct Context {
    request: Parts,
    body: Bytes,
    path: String,
    method: Method,
    query: Values,
    form: Values,
    writer: ResponseWriter,
}

impl Context {
    /// Creates a context from the request head and its fully read body.
    ///
    /// The query string is decoded eagerly. For `POST`, `PUT` and `PATCH` requests declaring
    /// `Content-Type: application/x-www-form-urlencoded` the body is decoded into form values.
    /// Multipart bodies need an async read and are decoded by [`Engine::call`](crate::Engine::call).
    pub fn new(request: Parts, body: Bytes) -> Self {
        let form = match form_encoding(&request) {
            Some(FormEncoding::UrlEncoded) => Values::parse_bytes(&body),
            _ => Values::empty(),
        };
        Self::with_form(request, body, form)
    }

    pub(crate) fn with_form(request: Parts, body: Bytes, form: Values) -> Self {
        let path = request.uri.path().to_owned();
        let method = request.method.clone();
        let query = request.uri.query().map(Values::parse).unwrap_or_default();

        Self { request, body, path, method, query, form, writer: ResponseWriter::new() }
    }

    /// Returns the request head this context was built from
    pub fn request(&self) -> &Parts {
        &self.request
    }

    /// Returns the HTTP method of the request
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the URL path of the request, without the query string
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the request target as received
    pub fn uri(&self) -> &Uri {
        &self.request.uri
    }

    /// Returns the HTTP headers of the request
    pub fn headers(&self) -> &HeaderMap {
        &self.request.headers
    }

    /// Returns the first value of the request header `key` if it is valid visible ASCII
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.request.headers.get(key).and_then(|value| value.to_str().ok())
    }

    /// Returns the raw request body
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the keyed url query value if it exists, otherwise an empty string.
    pub fn query(&self, key: &str) -> &str {
        self.query.get(key).unwrap_or_default()
    }

    /// Returns the keyed url query value if the key is present, otherwise `default_value`.
    ///
    /// Presence is what counts: for `?x=` the result of `default_query("x", "fallback")` is `""`.
    pub fn default_query<'a>(&'a self, key: &str, default_value: &'a str) -> &'a str {
        self.query.get(key).unwrap_or(default_value)
    }

    /// Returns the keyed value from a url-encoded or multipart form body if it exists, otherwise an empty string.
    pub fn post_form(&self, key: &str) -> &str {
        self.form.get(key).unwrap_or_default()
    }

    /// Returns the keyed form value if the key is present, otherwise `default_value`.
    pub fn default_post_form<'a>(&'a self, key: &str, default_value: &'a str) -> &'a str {
        self.form.get(key).unwrap_or(default_value)
    }

    /// Returns all decoded query values
    pub fn query_values(&self) -> &Values {
        &self.query
    }

    /// Returns all decoded form values
    pub fn form_values(&self) -> &Values {
        &self.form
    }

    /// Deserializes the query string into `T`.
    ///
    /// A request without a query string is treated as an empty one.
    ///
    /// # Errors
    /// Returns [`BindError::Query`] when the query string does not match `T`.
    pub fn bind_query<T>(&self) -> Result<T, BindError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let query = self.request.uri.query().unwrap_or_default();
        Ok(serde_qs::from_str::<T>(query)?)
    }

    /// Deserializes the url-encoded request body into `T`.
    ///
    /// # Errors
    /// Returns [`BindError::Form`] when the body does not match `T`.
    pub fn bind_form<T>(&self) -> Result<T, BindError>
    where
        T: for<'de> Deserialize<'de>,
    {
        Ok(serde_urlencoded::from_bytes::<T>(&self.body)?)
    }

    /// Returns whether the request headers indicate a websocket handshake is being initiated by the client.
    ///
    /// `Connection` must contain `upgrade` and `Upgrade` must be `websocket`, both compared
    /// case-insensitively. The `Connection` check is a plain substring test, not token parsing.
    pub fn is_websocket(&self) -> bool {
        let connection_upgrade =
            self.get_header(CONNECTION.as_str()).is_some_and(|value| value.to_ascii_lowercase().contains("upgrade"));
        let upgrade_websocket =
            self.get_header(UPGRADE.as_str()).is_some_and(|value| value.eq_ignore_ascii_case("websocket"));

        connection_upgrade && upgrade_websocket
    }

    /// Returns the response status, `None` until one is set or implied by a body write.
    pub fn status_code(&self) -> Option<StatusCode> {
        self.writer.status
    }

    /// Sets the HTTP response status.
    pub fn status(&mut self, code: StatusCode) {
        self.writer.write_status(code);
    }

    /// Sets the response header `key` to `value`, replacing any previous value.
    /// An empty `value` removes the header instead.
    pub fn header(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            self.writer.remove_header(key);
        } else {
            self.writer.set_header(key, value);
        }
    }

    /// Writes `text` as a `text/plain` body with status `code`.
    ///
    /// Any [`Display`] value is accepted, so a template with values is written as
    /// `ctx.string(StatusCode::OK, format_args!("hello {}", name))`.
    pub fn string(&mut self, code: StatusCode, text: impl Display) {
        self.header(CONTENT_TYPE.as_str(), mime::TEXT_PLAIN.as_ref());
        self.status(code);
        self.writer.write_bytes(text.to_string().as_bytes());
    }

    /// Serializes `value` as an `application/json` body with status `code`.
    ///
    /// Serialization happens before anything is written; if it fails the response becomes a
    /// plain `500 Internal Server Error` carrying the serializer's message.
    pub fn json<T: Serialize + ?Sized>(&mut self, code: StatusCode, value: &T) {
        match serde_json::to_vec(value) {
            Ok(mut body) => {
                body.push(b'\n');
                self.header(CONTENT_TYPE.as_str(), mime::APPLICATION_JSON.as_ref());
                self.status(code);
                self.writer.write_bytes(&body);
            }
            Err(e) => {
                error!(cause = %e, path = %self.path, "failed to serialize json response");
                self.error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
            }
        }
    }

    /// Writes `data` verbatim with status `code`. No content type is set.
    pub fn data(&mut self, code: StatusCode, data: impl AsRef<[u8]>) {
        self.status(code);
        self.writer.write_bytes(data.as_ref());
    }

    /// Replies with `message` as a plain text error body and status `code`.
    pub fn error(&mut self, code: StatusCode, message: &str) {
        self.header(CONTENT_TYPE.as_str(), mime::TEXT_PLAIN_UTF_8.as_ref());
        self.header(X_CONTENT_TYPE_OPTIONS.as_str(), "nosniff");
        self.status(code);
        self.writer.write_bytes(message.as_bytes());
        self.writer.write_bytes(b"\n");
    }

    /// Returns the response writer for handlers that stream text with `write!`.
    pub fn writer(&mut self) -> &mut ResponseWriter {
        &mut self.writer
    }

    /// Consumes the context and produces the outgoing response.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        self.writer.into_response()
    }
}

impl From<Request<Bytes>> for Context {
    fn from(request: Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        Context::new(parts, body)
    }
}

/// Buffered response channel for one request.
///
/// Status and headers stay mutable until the first body byte is written; from then on the
/// response head is committed and further changes are ignored.
#[derive(Debug)]
pub struct ResponseWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
    committed: bool,
}

impl ResponseWriter {
    fn new() -> Self {
        Self { status: None, headers: HeaderMap::new(), body: BytesMut::new(), committed: false }
    }

    /// Returns the response headers written so far
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns whether body bytes have been written
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Appends `data` to the body, committing `200 OK` if no status was set.
    pub fn write_bytes(&mut self, data: &[u8]) {
        if !self.committed {
            self.committed = true;
            self.status.get_or_insert(StatusCode::OK);
        }
        self.body.extend_from_slice(data);
    }

    fn write_status(&mut self, code: StatusCode) {
        if self.committed {
            warn!(current = ?self.status, ignored = %code, "superfluous status write after body");
            return;
        }
        self.status = Some(code);
    }

    fn set_header(&mut self, key: &str, value: &str) {
        if self.committed {
            warn!(key, "header change after body is ignored");
            return;
        }

        let name = match HeaderName::from_bytes(key.as_bytes()) {
            Ok(name) => name,
            Err(e) => {
                warn!(key, cause = %e, "invalid response header name");
                return;
            }
        };
        let value = match HeaderValue::from_str(value) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, cause = %e, "invalid response header value");
                return;
            }
        };

        self.headers.insert(name, value);
    }

    fn remove_header(&mut self, key: &str) {
        if self.committed {
            warn!(key, "header change after body is ignored");
            return;
        }
        self.headers.remove(key);
    }

    fn into_response(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl io::Write for ResponseWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
