//! JavaScript / TypeScript extractor.
//!
//! Regex matching over raw text, no structural parse. Covers Express-style
//! registrations (`app.get("/path", ...)`), axios/fetch client calls, and
//! `process.env` references. A partially invalid file still yields whatever
//! the patterns can find.

use lazy_static::lazy_static;
use regex::Regex;

use super::{ConsumedApi, Extraction, Extractor, HttpMethod, ProducedApi, Value};

lazy_static! {
    /// `const NAME = "literal"` (also let/var).
    static ref CONST_DECL: Regex = Regex::new(
        r#"\b(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*['"]([^'"]*)['"]"#
    ).unwrap();

    /// `app.get("/path"` or `router.post(PATH_CONST` registrations.
    static ref ROUTE_CALL: Regex = Regex::new(
        r#"\b(?:app|router)\.(get|post|put|delete)\(\s*(?:['"]([^'"]*)['"]|([A-Za-z_$][\w$]*))"#
    ).unwrap();

    /// `axios.get("url"` / `axios.post(URL_CONST` client calls.
    static ref AXIOS_CALL: Regex = Regex::new(
        r#"\baxios\.(get|post|put|delete)\(\s*(?:['"]([^'"]*)['"]|([A-Za-z_$][\w$]*))"#
    ).unwrap();

    /// Bare `fetch("url"` calls; the method lives in the options object and
    /// is not recovered.
    static ref FETCH_CALL: Regex = Regex::new(
        r#"\bfetch\(\s*['"]([^'"]*)['"]"#
    ).unwrap();

    /// `process.env.NAME` references.
    static ref ENV_REF: Regex = Regex::new(
        r"\bprocess\.env\.([A-Za-z_][A-Za-z0-9_]*)"
    ).unwrap();
}

pub struct JavaScriptExtractor;

impl JavaScriptExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JavaScriptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// First argument from a literal-or-identifier capture pair.
fn captured_arg(literal: Option<&str>, ident: Option<&str>) -> Option<Value> {
    literal
        .or(ident)
        .map(|s| Value::Str(s.to_string()))
}

impl Extractor for JavaScriptExtractor {
    fn language_id(&self) -> &'static str {
        "javascript"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["js", "jsx", "mjs", "ts", "tsx", "mts"]
    }

    fn extract(&self, path: &str, source: &str) -> anyhow::Result<Extraction> {
        let mut out = Extraction::new();

        for caps in CONST_DECL.captures_iter(source) {
            out.constants
                .push((caps[1].to_string(), Value::Str(caps[2].to_string())));
        }

        // Environment references register under the variable's own name;
        // the table resolves the placeholder when the constant is merged.
        for caps in ENV_REF.captures_iter(source) {
            let name = caps[1].to_string();
            let placeholder = Value::Str(format!("<ENV:{}>", name));
            out.constants.push((name, placeholder));
        }

        for caps in ROUTE_CALL.captures_iter(source) {
            out.produced.push(ProducedApi {
                file: path.to_string(),
                function: None,
                method: HttpMethod::from_verb(&caps[1]),
                path: captured_arg(
                    caps.get(2).map(|m| m.as_str()),
                    caps.get(3).map(|m| m.as_str()),
                ),
            });
        }

        for caps in AXIOS_CALL.captures_iter(source) {
            out.consumed.push(ConsumedApi {
                file: path.to_string(),
                method: HttpMethod::from_verb(&caps[1]),
                target: captured_arg(
                    caps.get(2).map(|m| m.as_str()),
                    caps.get(3).map(|m| m.as_str()),
                ),
            });
        }

        for caps in FETCH_CALL.captures_iter(source) {
            out.consumed.push(ConsumedApi {
                file: path.to_string(),
                method: HttpMethod::Unknown,
                target: Some(Value::Str(caps[1].to_string())),
            });
        }

        Ok(out)
    }
}
