//! Source map version 3 construction (§4.6). The [`SourceMapBuilder`] is
//! fed `(generated_line, generated_column) -> Span` mappings as the
//! printer emits text, and turns them into the standard
//! line/column-delta-encoded VLQ `mappings` string used by every source
//! map consumer.

use std::collections::HashMap;

use base64::Engine;
use serde::Serialize;
use url::Url;

use crate::error::Span;

/// One recorded correspondence between a position in the generated CSS
/// and a position in a source file.
struct Mapping {
    generated_line: usize,
    generated_column: usize,
    source_index: usize,
    source_line: usize,
    source_column: usize,
}

/// Accumulates mappings during printing and a table of source URLs
/// (de-duplicated by canonical URL), then renders the "version 3" JSON
/// shape on demand.
#[derive(Default)]
pub struct SourceMapBuilder {
    mappings: Vec<Mapping>,
    sources: Vec<Url>,
    source_index: HashMap<Url, usize>,
    embed_sources: bool,
    source_text: HashMap<Url, String>,
}

impl SourceMapBuilder {
    #[must_use]
    pub fn new(embed_sources: bool) -> Self {
        Self {
            embed_sources,
            ..Self::default()
        }
    }

    /// Record that `generated` (0-based line/column) was produced from
    /// `span`'s start position.
    pub fn add(&mut self, generated_line: usize, generated_column: usize, span: &Span) {
        let index = self.intern(span);
        let (line, column) = span.source.line_col(span.start);
        self.mappings.push(Mapping {
            generated_line,
            generated_column,
            source_index: index,
            // `line_col` is 1-based; source maps are 0-based.
            source_line: line.saturating_sub(1),
            source_column: column.saturating_sub(1),
        });
    }

    fn intern(&mut self, span: &Span) -> usize {
        let url = span.source.url.clone();
        if let Some(&i) = self.source_index.get(&url) {
            return i;
        }
        let i = self.sources.len();
        self.source_index.insert(url.clone(), i);
        if self.embed_sources {
            self.source_text.insert(url.clone(), span.source.text.to_string());
        }
        self.sources.push(url);
        i
    }

    /// Render the accumulated mappings as version-3 source map JSON.
    #[must_use]
    pub fn to_json(&self, file: &str) -> String {
        let mut sorted: Vec<&Mapping> = self.mappings.iter().collect();
        sorted.sort_by_key(|m| (m.generated_line, m.generated_column));

        let mut mappings = String::new();
        let mut prev_line = 0usize;
        let mut prev_generated_column = 0i64;
        let mut prev_source = 0i64;
        let mut prev_source_line = 0i64;
        let mut prev_source_column = 0i64;
        for mapping in sorted {
            if mapping.generated_line != prev_line {
                for _ in prev_line..mapping.generated_line {
                    mappings.push(';');
                }
                prev_line = mapping.generated_line;
                prev_generated_column = 0;
            } else if !mappings.is_empty() && !mappings.ends_with(';') {
                mappings.push(',');
            }
            encode_vlq(&mut mappings, mapping.generated_column as i64 - prev_generated_column);
            encode_vlq(&mut mappings, mapping.source_index as i64 - prev_source);
            encode_vlq(&mut mappings, mapping.source_line as i64 - prev_source_line);
            encode_vlq(&mut mappings, mapping.source_column as i64 - prev_source_column);
            prev_generated_column = mapping.generated_column as i64;
            prev_source = mapping.source_index as i64;
            prev_source_line = mapping.source_line as i64;
            prev_source_column = mapping.source_column as i64;
        }

        let sources: Vec<String> = self.sources.iter().map(ToString::to_string).collect();
        let sources_content: Option<Vec<Option<String>>> = self.embed_sources.then(|| {
            self.sources.iter().map(|url| self.source_text.get(url).cloned()).collect()
        });

        let doc = SourceMapDocument {
            version: 3,
            file: file.to_string(),
            sources,
            sources_content,
            names: Vec::new(),
            mappings,
        };
        serde_json::to_string(&doc).unwrap_or_default()
    }

    /// Wrap `json` as a base64 `data:` URL suitable for
    /// `/*# sourceMappingURL=... */` embedding.
    #[must_use]
    pub fn embed_as_data_url(json: &str) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(json.as_bytes());
        format!("data:application/json;charset=utf-8;base64,{encoded}")
    }
}

#[derive(Serialize)]
struct SourceMapDocument {
    version: u8,
    file: String,
    sources: Vec<String>,
    #[serde(rename = "sourcesContent", skip_serializing_if = "Option::is_none")]
    sources_content: Option<Vec<Option<String>>>,
    names: Vec<String>,
    mappings: String,
}

const BASE64_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Encode one signed value as Base64-VLQ, per the source map spec: the
/// sign occupies the low bit, and each subsequent 5-bit group's top bit
/// is a continuation flag.
fn encode_vlq(out: &mut String, value: i64) {
    let mut num = if value < 0 { ((-value) << 1) | 1 } else { value << 1 };
    loop {
        let mut digit = (num & 0b1_1111) as u8;
        num >>= 5;
        if num > 0 {
            digit |= 0b10_0000;
        }
        out.push(BASE64_ALPHABET[digit as usize] as char);
        if num == 0 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceFile;
    use std::sync::Arc;

    #[test]
    fn encodes_zero_as_a() {
        let mut out = String::new();
        encode_vlq(&mut out, 0);
        assert_eq!(out, "A");
    }

    #[test]
    fn records_source_and_builds_json() {
        let mut builder = SourceMapBuilder::new(false);
        let source = Arc::new(SourceFile::new(Url::parse("file:///a.scss").unwrap(), "a {\n  b: c;\n}"));
        let span = Span::new(source, 6, 7);
        builder.add(0, 2, &span);
        let json = builder.to_json("out.css");
        assert!(json.contains("\"version\":3"));
        assert!(json.contains("file:///a.scss"));
    }
}
