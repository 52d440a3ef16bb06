//! Python extractor using tree-sitter.
//!
//! Python is the one language that gets a structural parse. Constants are
//! module-level literal assignments; produced APIs come from verb-named
//! call decorators (`@app.get("/path")`); consumed APIs come from calls on
//! the recognized client modules (`requests.get(url)`, `httpx.post(...)`).

use phf::phf_set;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};

use super::{ConsumedApi, Extraction, Extractor, HttpMethod, ProducedApi, Value};

/// Decorator attribute names that register an endpoint.
static ROUTE_VERBS: phf::Set<&'static str> = phf_set! {
    "get", "post", "put", "delete", "route",
};

/// Call attribute names that perform an outbound request.
static CLIENT_VERBS: phf::Set<&'static str> = phf_set! {
    "get", "post", "put", "delete",
};

/// Module identifiers recognized as HTTP clients.
static HTTP_CLIENTS: phf::Set<&'static str> = phf_set! {
    "requests", "httpx",
};

/// Module-level `NAME = <literal>` assignments.
const CONSTANT_QUERY: &str = r#"
(module
  (expression_statement
    (assignment
      left: (identifier) @const_name
      right: [(string) (integer) (float) (true) (false)] @const_value)))
"#;

/// Function definitions decorated with a call-style decorator on an
/// attribute (`@app.get(...)`, `@router.route(...)`).
const PRODUCED_QUERY: &str = r#"
(decorated_definition
  (decorator
    (call
      function: (attribute
        attribute: (identifier) @verb)
      arguments: (argument_list) @args))
  definition: (function_definition
    name: (identifier) @func_name))
"#;

/// `<client>.<verb>(...)` call expressions anywhere in the file.
const CONSUMED_QUERY: &str = r#"
(call
  function: (attribute
    object: (identifier) @client
    attribute: (identifier) @verb)
  arguments: (argument_list) @args)
"#;

pub struct PythonExtractor {
    language: Language,
}

impl PythonExtractor {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    fn node_text<'a>(source: &'a [u8], node: Node) -> &'a str {
        node.utf8_text(source).unwrap_or("")
    }

    /// Decode a literal node into a value.
    ///
    /// Bare identifiers come back as their name (a symbolic reference);
    /// unrecognized node kinds come back as None, matching the rule that an
    /// unreadable argument yields a null path rather than a skipped record.
    fn literal_value(source: &[u8], node: Node) -> Option<Value> {
        match node.kind() {
            "identifier" => Some(Value::Str(Self::node_text(source, node).to_string())),
            "string" => Some(Value::Str(Self::string_content(source, node))),
            "integer" => Self::node_text(source, node)
                .replace('_', "")
                .parse::<i64>()
                .ok()
                .map(Value::Int),
            "float" => Self::node_text(source, node)
                .replace('_', "")
                .parse::<f64>()
                .ok()
                .map(Value::Float),
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        }
    }

    /// Text of a string literal without quotes or prefixes.
    fn string_content(source: &[u8], string_node: Node) -> String {
        let mut cursor = string_node.walk();
        let mut content = String::new();
        for child in string_node.children(&mut cursor) {
            if child.kind() == "string_content" {
                content.push_str(Self::node_text(source, child));
            }
        }
        content
    }

    /// First positional argument of an argument list, skipping keyword
    /// arguments. An empty list yields None.
    fn first_positional(source: &[u8], args: Node) -> Option<Value> {
        let mut cursor = args.walk();
        let arg = args
            .named_children(&mut cursor)
            .find(|n| !matches!(n.kind(), "keyword_argument" | "comment"))?;
        Self::literal_value(source, arg)
    }

    fn extract_constants(
        &self,
        root: Node,
        source: &[u8],
        out: &mut Extraction,
    ) -> anyhow::Result<()> {
        let query = Query::new(&self.language, CONSTANT_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, root, source);

        while let Some(m) = matches.next() {
            let mut name = "";
            let mut value = None;

            for capture in m.captures {
                match query.capture_names()[capture.index as usize] {
                    "const_name" => name = Self::node_text(source, capture.node),
                    "const_value" => value = Self::literal_value(source, capture.node),
                    _ => {}
                }
            }

            if !name.is_empty() {
                if let Some(value) = value {
                    out.constants.push((name.to_string(), value));
                }
            }
        }

        Ok(())
    }

    fn extract_produced(
        &self,
        root: Node,
        source: &[u8],
        path: &str,
        out: &mut Extraction,
    ) -> anyhow::Result<()> {
        let query = Query::new(&self.language, PRODUCED_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, root, source);

        while let Some(m) = matches.next() {
            let mut verb = "";
            let mut func = "";
            let mut args = None;

            for capture in m.captures {
                match query.capture_names()[capture.index as usize] {
                    "verb" => verb = Self::node_text(source, capture.node),
                    "func_name" => func = Self::node_text(source, capture.node),
                    "args" => args = Some(capture.node),
                    _ => {}
                }
            }

            if !ROUTE_VERBS.contains(verb) {
                continue;
            }

            out.produced.push(ProducedApi {
                file: path.to_string(),
                function: Some(func.to_string()),
                method: HttpMethod::from_verb(verb),
                path: args.and_then(|a| Self::first_positional(source, a)),
            });
        }

        Ok(())
    }

    fn extract_consumed(
        &self,
        root: Node,
        source: &[u8],
        path: &str,
        out: &mut Extraction,
    ) -> anyhow::Result<()> {
        let query = Query::new(&self.language, CONSUMED_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, root, source);

        while let Some(m) = matches.next() {
            let mut client = "";
            let mut verb = "";
            let mut args = None;

            for capture in m.captures {
                match query.capture_names()[capture.index as usize] {
                    "client" => client = Self::node_text(source, capture.node),
                    "verb" => verb = Self::node_text(source, capture.node),
                    "args" => args = Some(capture.node),
                    _ => {}
                }
            }

            if !HTTP_CLIENTS.contains(client) || !CLIENT_VERBS.contains(verb) {
                continue;
            }

            out.consumed.push(ConsumedApi {
                file: path.to_string(),
                method: HttpMethod::from_verb(verb),
                target: args.and_then(|a| Self::first_positional(source, a)),
            });
        }

        Ok(())
    }
}

impl Default for PythonExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for PythonExtractor {
    fn language_id(&self) -> &'static str {
        "python"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn extract(&self, path: &str, source: &str) -> anyhow::Result<Extraction> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse Python source: {}", path))?;

        // Partial trees with ERROR nodes are still harvested; whatever the
        // queries can reach is kept.
        let bytes = source.as_bytes();
        let root = tree.root_node();

        let mut out = Extraction::new();
        self.extract_constants(root, bytes, &mut out)?;
        self.extract_produced(root, bytes, path, &mut out)?;
        self.extract_consumed(root, bytes, path, &mut out)?;

        Ok(out)
    }
}
