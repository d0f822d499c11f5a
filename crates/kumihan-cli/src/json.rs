//! JSON mirror of the node tree for `kumihan parse --json`.

use std::collections::BTreeMap;

use kumihan_core::{AttrValue, Content, Diagnostic, Node, ParseResult};
use serde::Serialize;

#[derive(Serialize)]
pub struct JsonDocument<'a> {
    success: bool,
    nodes: Vec<JsonNode<'a>>,
    diagnostics: Vec<JsonDiagnostic<'a>>,
}

#[derive(Serialize)]
struct JsonNode<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<&'a str, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<JsonNode<'a>>,
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    severity: String,
    code: &'static str,
    line: usize,
    message: &'a str,
    span: [u32; 2],
}

pub fn convert_result(result: &ParseResult) -> JsonDocument<'_> {
    JsonDocument {
        success: result.success(),
        nodes: result.nodes.iter().map(convert_node).collect(),
        diagnostics: result.diagnostics.iter().map(convert_diagnostic).collect(),
    }
}

fn convert_node(node: &Node) -> JsonNode<'_> {
    let (text, children) = match &node.content {
        Content::Text(text) => (Some(text.as_str()), Vec::new()),
        Content::Children(children) => (None, children.iter().map(convert_node).collect()),
    };
    JsonNode {
        kind: node.kind.as_str(),
        attributes: node
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), convert_attr_value(v)))
            .collect(),
        text,
        children,
    }
}

fn convert_attr_value(value: &AttrValue) -> serde_json::Value {
    match value {
        AttrValue::Str(s) => serde_json::Value::String(s.clone()),
        AttrValue::Int(i) => serde_json::Value::Number((*i).into()),
        AttrValue::Bool(b) => serde_json::Value::Bool(*b),
    }
}

fn convert_diagnostic(diagnostic: &Diagnostic) -> JsonDiagnostic<'_> {
    JsonDiagnostic {
        severity: diagnostic.severity.to_string(),
        code: diagnostic.kind.as_str(),
        line: diagnostic.line,
        message: &diagnostic.message,
        span: [diagnostic.span.start, diagnostic.span.end],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_json_shape() {
        let result = kumihan_core::parse(";;;見出し1\nTitle\n;;;");
        let value = serde_json::to_value(convert_result(&result)).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["nodes"][0]["type"], "heading");
        assert_eq!(value["nodes"][0]["attributes"]["level"], 1);
        assert_eq!(value["nodes"][0]["children"][0]["text"], "Title");
        assert!(value["nodes"][0]["children"][0].get("children").is_none());
    }

    #[test]
    fn diagnostics_json_shape() {
        let result = kumihan_core::parse(";;;\n");
        let value = serde_json::to_value(convert_result(&result)).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["diagnostics"][0]["severity"], "error");
        assert_eq!(value["diagnostics"][0]["code"], "unmatched-close");
        assert_eq!(value["diagnostics"][0]["line"], 1);
    }
}
