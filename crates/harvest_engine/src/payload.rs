use bytes::Bytes;
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use serde_json::Value;

use crate::AdapterError;

/// One raw response handed to an adapter: a paginated API page, an HTML
/// document, or an intercepted browser response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Where the payload came from (final URL), used in diagnostics.
    pub source: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl Payload {
    pub fn new(
        source: impl Into<String>,
        content_type: Option<String>,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            source: source.into(),
            content_type,
            body: body.into(),
        }
    }

    /// Convenience constructor for a JSON body.
    pub fn json_body(source: impl Into<String>, value: &Value) -> Self {
        Self::new(
            source,
            Some("application/json".to_string()),
            value.to_string().into_bytes(),
        )
    }

    /// Decode the body to UTF-8: BOM, then Content-Type charset, then chardetng.
    pub fn text(&self) -> String {
        let bytes = self.body.as_ref();
        if let Some((encoding, _)) = Encoding::for_bom(bytes) {
            return decode_with(bytes, encoding);
        }

        if let Some(label) = self.content_type.as_deref().and_then(extract_charset) {
            if let Some(enc) = Encoding::for_label(label.as_bytes()) {
                return decode_with(bytes, enc);
            }
        }

        let mut detector = EncodingDetector::new();
        detector.feed(bytes, true);
        let enc = detector.guess(None, true);
        decode_with(bytes, enc)
    }

    pub fn json(&self) -> Result<Value, AdapterError> {
        let text = self.text();
        serde_json::from_str(text.trim_start_matches('\u{feff}')).map_err(|err| {
            AdapterError::Malformed {
                origin: self.source.clone(),
                expected: "json",
                message: err.to_string(),
            }
        })
    }

    /// HTML by content type, or by sniffing the first non-blank byte when the type is absent.
    pub fn is_html(&self) -> bool {
        if let Some(ct) = self.content_type.as_deref() {
            let ct = ct.to_ascii_lowercase();
            if ct.contains("html") {
                return true;
            }
            if ct.contains("json") {
                return false;
            }
        }
        self.body
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|b| *b == b'<')
    }
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim_matches([' ', '"', '\''].as_ref()))
        })
        .next()
        .map(|s| s.to_string())
}

// Replacement characters are tolerated; adapters only need the structural parts.
fn decode_with(bytes: &[u8], enc: &'static Encoding) -> String {
    let (text, _, _) = enc.decode(bytes);
    text.into_owned()
}
