//! Java extractor.
//!
//! Regex matching for Spring-style mapping annotations, `static final`
//! string constants, RestTemplate client calls, and `System.getenv`
//! references.

use lazy_static::lazy_static;
use regex::Regex;

use super::{ConsumedApi, Extraction, Extractor, HttpMethod, ProducedApi, Value};

lazy_static! {
    /// Mapping annotations with an optional `("path")` / `(value = "path")`
    /// argument. An annotation without a reachable path still yields a
    /// record with a null path.
    static ref MAPPING: Regex = Regex::new(
        r#"@(GetMapping|PostMapping|PutMapping|DeleteMapping|RequestMapping)\b(?:\(\s*(?:value\s*=\s*)?"([^"]*)")?"#
    ).unwrap();

    /// `static final String NAME = "literal"` constants.
    static ref CONST_DECL: Regex = Regex::new(
        r#"\b(?:static\s+final|final\s+static)\s+String\s+([A-Za-z_$][\w$]*)\s*=\s*"([^"]*)""#
    ).unwrap();

    /// RestTemplate-style calls with an absolute URL.
    static ref REST_CALL: Regex = Regex::new(
        r#"\.(getForObject|getForEntity|postForObject|postForEntity)\(\s*"(https?://[^"]*)""#
    ).unwrap();

    /// `System.getenv("NAME")` references.
    static ref ENV_REF: Regex = Regex::new(
        r#"System\.getenv\(\s*"([A-Za-z_][A-Za-z0-9_]*)"\s*\)"#
    ).unwrap();
}

pub struct JavaExtractor;

impl JavaExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JavaExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn mapping_method(annotation: &str) -> HttpMethod {
    match annotation {
        "GetMapping" => HttpMethod::Get,
        "PostMapping" => HttpMethod::Post,
        "PutMapping" => HttpMethod::Put,
        "DeleteMapping" => HttpMethod::Delete,
        _ => HttpMethod::Unknown,
    }
}

impl Extractor for JavaExtractor {
    fn language_id(&self) -> &'static str {
        "java"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["java"]
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

        for caps in MAPPING.captures_iter(source) {
            out.produced.push(ProducedApi {
                file: path.to_string(),
                function: None,
                method: mapping_method(&caps[1]),
                path: caps.get(2).map(|m| Value::Str(m.as_str().to_string())),
            });
        }

        for caps in REST_CALL.captures_iter(source) {
            let method = if caps[1].starts_with("get") {
                HttpMethod::Get
            } else {
                HttpMethod::Post
            };
            out.consumed.push(ConsumedApi {
                file: path.to_string(),
                method,
                target: Some(Value::Str(caps[2].to_string())),
            });
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Extraction {
        JavaExtractor::new().extract("Controller.java", source).unwrap()
    }

    #[test]
    fn test_mapping_annotations() {
        let out = extract(
            r#"
@GetMapping("/v1/users")
public List<User> listUsers() { return users; }

@PostMapping(value = "/v1/users")
public User createUser() { return null; }

@RequestMapping("/legacy")
public String legacy() { return ""; }
"#,
        );

        assert_eq!(out.produced.len(), 3);
        assert_eq!(out.produced[0].method, HttpMethod::Get);
        assert_eq!(out.produced[0].path, Some(Value::Str("/v1/users".into())));
        assert_eq!(out.produced[1].method, HttpMethod::Post);
        assert_eq!(out.produced[1].path, Some(Value::Str("/v1/users".into())));
        assert_eq!(out.produced[2].method, HttpMethod::Unknown);
    }

    #[test]
    fn test_mapping_without_path() {
        let out = extract(
            r#"
@DeleteMapping
public void wipe() {}
"#,
        );

        assert_eq!(out.produced.len(), 1);
        assert_eq!(out.produced[0].method, HttpMethod::Delete);
        assert_eq!(out.produced[0].path, None);
    }

    #[test]
    fn test_constants_and_env() {
        let out = extract(
            r#"
public class Config {
    private static final String USERS_PATH = "/v1/users";
    private final String host = System.getenv("API_HOST");
}
"#,
        );

        assert_eq!(out.constants.len(), 2);
        assert_eq!(out.constants[0].0, "USERS_PATH");
        assert_eq!(out.constants[1], (
            "API_HOST".to_string(),
            Value::Str("<ENV:API_HOST>".into()),
        ));
    }

    #[test]
    fn test_rest_template_calls() {
        let out = extract(
            r#"
User u = restTemplate.getForObject("http://svc/users/1", User.class);
restTemplate.postForEntity("https://svc/users", req, User.class);
"#,
        );

        assert_eq!(out.consumed.len(), 2);
        assert_eq!(out.consumed[0].method, HttpMethod::Get);
        assert_eq!(
            out.consumed[0].target,
            Some(Value::Str("http://svc/users/1".into()))
        );
        assert_eq!(out.consumed[1].method, HttpMethod::Post);
    }
}
