//! Response classification

use encoding_rs::{Encoding, UTF_8};
use pjax_dom::Document;
use url::Url;

use crate::error::FetchError;
use crate::Result;

/// Raw outcome of a completed `GET`, before classification
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    /// URL the transport ended up at, after any redirects
    pub final_url: Url,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// A successfully fetched and parsed page
#[derive(Debug)]
pub struct Page {
    pub final_url: Url,
    pub document: Document,
}

impl FetchedPage {
    /// A `200 text/html` response
    pub fn html(final_url: Url, body: impl Into<String>) -> Self {
        Self {
            status: 200,
            final_url,
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: body.into().into_bytes(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_content_type(mut self, content_type: Option<&str>) -> Self {
        self.content_type = content_type.map(str::to_string);
        self
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Check the status and content type, then parse the body.
    ///
    /// A missing content type is treated as HTML.
    pub fn into_page(self) -> Result<Page> {
        if !self.is_success() {
            return Err(FetchError::Status(self.status));
        }

        if let Some(content_type) = &self.content_type {
            if !content_type.to_ascii_lowercase().contains("html") {
                return Err(FetchError::ContentType(content_type.clone()));
            }
        }

        let source = decode_body(&self.body, self.content_type.as_deref())?;

        Ok(Page {
            final_url: self.final_url,
            document: Document::parse(&source),
        })
    }
}

/// Decode with the byte order mark if present, else the declared charset,
/// else UTF-8. Malformed input is an error rather than replaced.
fn decode_body(body: &[u8], content_type: Option<&str>) -> Result<String> {
    let (encoding, bom_len) = match Encoding::for_bom(body) {
        Some(found) => found,
        None => (
            content_type
                .and_then(charset_label)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
                .unwrap_or(UTF_8),
            0,
        ),
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(&body[bom_len..])
        .map(|text| text.into_owned())
        .ok_or_else(|| FetchError::Unparsable(format!("body is not valid {}", encoding.name())))
}

fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let label = value.trim().trim_matches('"').trim_matches('\'');
        (!label.is_empty()).then_some(label)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://example.com/a").unwrap()
    }

    #[test]
    fn test_html_page() {
        let page = FetchedPage::html(url(), "<title>A</title><p>a</p>")
            .into_page()
            .unwrap();
        assert_eq!(page.document.title(), "A");
        assert_eq!(page.final_url, url());
    }

    #[test]
    fn test_missing_content_type_is_html() {
        let page = FetchedPage::html(url(), "<title>A</title>")
            .with_content_type(None)
            .into_page()
            .unwrap();
        assert_eq!(page.document.title(), "A");
    }

    #[test]
    fn test_xhtml_is_html() {
        assert!(FetchedPage::html(url(), "<title>A</title>")
            .with_content_type(Some("application/xhtml+xml"))
            .into_page()
            .is_ok());
    }

    #[test]
    fn test_error_status() {
        let err = FetchedPage::html(url(), "not found")
            .with_status(404)
            .into_page()
            .unwrap_err();
        assert_eq!(err, FetchError::Status(404));

        let err = FetchedPage::html(url(), "").with_status(304).into_page().unwrap_err();
        assert_eq!(err, FetchError::Status(304));
    }

    #[test]
    fn test_non_html_rejected() {
        let err = FetchedPage::html(url(), "{}")
            .with_content_type(Some("application/json"))
            .into_page()
            .unwrap_err();
        assert!(matches!(err, FetchError::ContentType(_)));
    }

    #[test]
    fn test_undecodable_body() {
        let mut fetched = FetchedPage::html(url(), "");
        fetched.body = b"<title>Caf\xc3\x28</title>".to_vec();
        assert!(matches!(
            fetched.into_page().unwrap_err(),
            FetchError::Unparsable(_)
        ));
    }

    #[test]
    fn test_declared_charset_is_honored() {
        let mut fetched = FetchedPage::html(url(), "")
            .with_content_type(Some("text/html; Charset=\"ISO-8859-1\""));
        fetched.body = b"<title>Caf\xe9</title>".to_vec();
        assert_eq!(fetched.into_page().unwrap().document.title(), "Caf\u{e9}");
    }

    #[test]
    fn test_byte_order_mark_wins_over_header() {
        let mut fetched = FetchedPage::html(url(), "")
            .with_content_type(Some("text/html; charset=iso-8859-1"));
        fetched.body = b"\xef\xbb\xbf<title>Caf\xc3\xa9</title>".to_vec();
        assert_eq!(fetched.into_page().unwrap().document.title(), "Caf\u{e9}");
    }

    #[test]
    fn test_unknown_charset_falls_back_to_utf8() {
        let page = FetchedPage::html(url(), "<title>Caf\u{e9}</title>")
            .with_content_type(Some("text/html; charset=klingon"))
            .into_page()
            .unwrap();
        assert_eq!(page.document.title(), "Caf\u{e9}");
    }
}
