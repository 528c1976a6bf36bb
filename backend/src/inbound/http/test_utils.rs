//! Test helpers for inbound HTTP components.

use actix_web::http::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use actix_web::web::Bytes;

const BOUNDARY: &str = "campus-trade-test-boundary";

/// Incrementally built `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plain text part.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    /// Append a file part with the given declared content type.
    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Append a JPEG-typed image part of `len` bytes.
    pub fn jpeg(self, filename: &str, len: usize) -> Self {
        self.file("images", filename, "image/jpeg", &vec![0xAB; len])
    }

    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    /// Close the body and return it.
    pub fn finish(mut self) -> Bytes {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Bytes::from(self.body)
    }

    /// Header map carrying the multipart content type.
    pub fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(&Self::content_type()).expect("valid header"),
        );
        headers
    }
}

/// The five text fields of a valid submission.
pub fn valid_listing_fields(body: MultipartBody) -> MultipartBody {
    body.text("title", "Calculus Textbook 2e")
        .text("description", "Hardly used, all chapters included")
        .text("price", "25.99")
        .text("category", "books")
        .text("meetupLocation", "library")
}
