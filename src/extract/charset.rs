//! Byte-to-text decoding for fetched pages.

use encoding_rs::Encoding;
use tracing::debug;

/// Tried in order after the server-declared charset.
const FALLBACK_LABELS: [&str; 3] = ["utf-8", "euc-kr", "shift_jis"];

/// Decode a page body: the declared charset first, then UTF-8, then the
/// legacy Korean and Japanese encodings. The first decoding without
/// malformed sequences wins; lossy UTF-8 is the last resort.
pub fn decode_html(bytes: &[u8], declared: Option<&str>) -> String {
    let mut tried: Vec<&'static Encoding> = Vec::new();
    for label in declared.into_iter().chain(FALLBACK_LABELS) {
        let Some(encoding) = Encoding::for_label(label.trim().as_bytes()) else {
            debug!(label, "Unknown charset label");
            continue;
        };
        if tried.contains(&encoding) {
            continue;
        }
        tried.push(encoding);
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            debug!(encoding = encoding.name(), "Decoded page");
            return text.trim_start_matches('\u{feff}').to_string();
        }
    }
    String::from_utf8_lossy(bytes).into_owned()
}

/// The `charset` parameter of a `Content-Type` header value.
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
            .filter(|v| !v.is_empty())
    })
}
