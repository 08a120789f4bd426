//! Form body detection and decoding.
//!
//! Only `POST`, `PUT` and `PATCH` requests carry form values. A url-encoded body is decoded
//! synchronously; a `multipart/form-data` body is decoded with `multer`, keeping the text
//! fields and skipping file parts.

use crate::values::Values;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::request::Parts;
use http::Method;
use std::convert::Infallible;
use tracing::warn;

/// How a request body encodes its form values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FormEncoding {
    UrlEncoded,
    Multipart { boundary: String },
}

/// Returns the form encoding of the request, `None` when its body holds no form values.
pub(crate) fn form_encoding(request: &Parts) -> Option<FormEncoding> {
    if !matches!(request.method, Method::POST | Method::PUT | Method::PATCH) {
        return None;
    }

    let content_type = request.headers.get(CONTENT_TYPE)?.to_str().ok()?;
    let media_type = content_type.parse::<mime::Mime>().ok()?;

    if media_type.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
        return Some(FormEncoding::UrlEncoded);
    }

    if media_type.essence_str() == mime::MULTIPART_FORM_DATA.essence_str() {
        return match multer::parse_boundary(content_type) {
            Ok(boundary) => Some(FormEncoding::Multipart { boundary }),
            Err(e) => {
                warn!(cause = %e, content_type, "multipart request without a usable boundary");
                None
            }
        };
    }

    None
}

/// Decodes the text fields of a multipart body.
///
/// Decoding stops at the first malformed part; fields read before it are kept.
pub(crate) async fn decode_multipart(body: Bytes, boundary: String) -> Values {
    let stream = futures::stream::once(futures::future::ready(Ok::<_, Infallible>(body)));
    let mut multipart = multer::Multipart::new(stream, boundary);
    let mut pairs = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(cause = %e, "failed to read multipart field");
                break;
            }
        };

        if field.file_name().is_some() {
            continue;
        }

        let name = field.name().unwrap_or_default().to_owned();
        match field.text().await {
            Ok(text) => pairs.push((name, text)),
            Err(e) => {
                warn!(cause = %e, %name, "failed to read multipart field value");
                break;
            }
        }
    }

    pairs.into_iter().collect()
}
