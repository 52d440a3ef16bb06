//! Go extractor.
//!
//! Regex matching for `const`/`var` string declarations, net/http and
//! router-style handler registrations, `http.Get`/`http.Post` client calls,
//! and `os.Getenv` references. Go string arguments may be quoted or raw
//! backtick literals.

use lazy_static::lazy_static;
use regex::Regex;

use super::{ConsumedApi, Extraction, Extractor, HttpMethod, ProducedApi, Value};

lazy_static! {
    /// `const Name = "literal"` / `var Name = "literal"`.
    static ref CONST_DECL: Regex = Regex::new(
        r#"\b(?:const|var)\s+([A-Za-z_][A-Za-z0-9_]*)\s*=\s*"([^"]*)""#
    ).unwrap();

    /// `http.HandleFunc(` / `mux.Handle(` registrations; no method is
    /// recoverable from the registration itself.
    static ref HANDLE_CALL: Regex = Regex::new(
        r#"\b(?:http\.HandleFunc|mux\.Handle)\(\s*(?:["`]([^"`]*)["`]|([A-Za-z_][A-Za-z0-9_]*))"#
    ).unwrap();

    /// `router.GET("/path"` style registrations (gin/echo idiom).
    static ref ROUTER_CALL: Regex = Regex::new(
        r#"\brouter\.(GET|POST|PUT|DELETE)\(\s*(?:["`]([^"`]*)["`]|([A-Za-z_][A-Za-z0-9_]*))"#
    ).unwrap();

    /// `http.Get("http://..."` / `http.Post(urlConst` client calls.
    static ref CLIENT_CALL: Regex = Regex::new(
        r#"\bhttp\.(Get|Post)\(\s*(?:["`](https?://[^"`]*)["`]|([A-Za-z_][A-Za-z0-9_]*))"#
    ).unwrap();

    /// `os.Getenv("NAME")` references.
    static ref ENV_REF: Regex = Regex::new(
        r#"\bos\.Getenv\(\s*"([A-Za-z_][A-Za-z0-9_]*)"\s*\)"#
    ).unwrap();
}

pub struct GoExtractor;

impl GoExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn captured_arg(literal: Option<&str>, ident: Option<&str>) -> Option<Value> {
    literal.or(ident).map(|s| Value::Str(s.to_string()))
}

impl Extractor for GoExtractor {
    fn language_id(&self) -> &'static str {
        "go"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn extract(&self, path: &str, source: &str) -> anyhow::Result<Extraction> {
        let mut out = Extraction::new();

        for caps in CONST_DECL.captures_iter(source) {
            out.constants
                .push((caps[1].to_string(), Value::Str(caps[2].to_string())));
        }

        for caps in ENV_REF.captures_iter(source) {
            let name = caps[1].to_string();
            let placeholder = Value::Str(format!("<ENV:{}>", name));
            out.constants.push((name, placeholder));
        }

        for caps in HANDLE_CALL.captures_iter(source) {
            out.produced.push(ProducedApi {
                file: path.to_string(),
                function: None,
                method: HttpMethod::Unknown,
                path: captured_arg(
                    caps.get(1).map(|m| m.as_str()),
                    caps.get(2).map(|m| m.as_str()),
                ),
            });
        }

        for caps in ROUTER_CALL.captures_iter(source) {
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

        for caps in CLIENT_CALL.captures_iter(source) {
            out.consumed.push(ConsumedApi {
                file: path.to_string(),
                method: HttpMethod::from_verb(&caps[1]),
                target: captured_arg(
                    caps.get(2).map(|m| m.as_str()),
                    caps.get(3).map(|m| m.as_str()),
                ),
            });
        }

        Ok(out)
    }
}
