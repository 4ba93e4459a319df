//! XML dialect adapter.
//!
//! The dialect exists only to be read back by this module. It has no
//! attributes and no namespaces:
//!
//! - an object key becomes an element, with characters outside
//!   `[A-Za-z0-9_]` replaced by `_`
//! - an array becomes one `<item>` per element; a scalar element is wrapped
//!   in `<value>`, an object or nested array is written straight into the item
//! - a scalar becomes escaped text content, null becomes an empty element
//!
//! ```text
//! <LifeOSExport>
//!   <exportType>tasks</exportType>
//!   <data><tasks><item><id>1</id><tags><item><value>home</value></item></tags></item></tasks></data>
//! </LifeOSExport>
//! ```
//!
//! Output is written without indentation so that leaf text is exactly the
//! value. Reading infers primitive types from leaf text; see
//! [`infer_primitive`] for the rules and their limits.
//!
//! An `<item>` whose only child is `<value>` reads back as that scalar, and
//! children that are all `<item>` read back as an array. An object whose
//! only key is `value` or `item` therefore does not survive a round trip:
//! `{"value": 5}` inside an array reads back as `5`, and as a record it
//! fails the import with a non-object record error.
//! Empty strings and empty containers read back as null.
//!
//! Documents nested deeper than [`MAX_DEPTH`] elements are rejected.

use crate::io::traits::EnvelopeCodec;
use crate::models::{ExportEnvelope, Record};
use crate::{Error, Result};
use once_cell::sync::Lazy;
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use regex::Regex;
use serde_json::{Map, Number, Value};

/// Root element of every export document.
pub const ROOT_TAG: &str = "LifeOSExport";

/// Deepest element nesting the reader accepts.
pub const MAX_DEPTH: usize = 128;

const ITEM_TAG: &str = "item";
const VALUE_TAG: &str = "value";

/// Numeric-looking text at or above this length stays a string, so long
/// numeric identifiers keep their digits.
const MAX_NUMERIC_LEN: usize = 16;

static NUMERIC: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?$").ok());

/// XML envelope codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlCodec;

impl EnvelopeCodec for XmlCodec {
    fn encode(&self, envelope: &ExportEnvelope) -> Result<String> {
        let mut emitter = Emitter::new();
        emitter.declaration()?;
        emitter.open(ROOT_TAG)?;
        emitter.text_element("exportType", &envelope.export_type)?;
        emitter.text_element("exportedAt", &envelope.exported_at)?;
        emitter.text_element("version", &envelope.version)?;
        emitter.open("data")?;
        for (collection, records) in &envelope.data {
            let tag = sanitize_tag(collection);
            emitter.open(&tag)?;
            for record in records {
                emitter.open(ITEM_TAG)?;
                emitter.fields(record)?;
                emitter.close(ITEM_TAG)?;
            }
            emitter.close(&tag)?;
        }
        emitter.close("data")?;
        emitter.close(ROOT_TAG)?;
        emitter.finish()
    }

    fn decode(&self, input: &str) -> Result<ExportEnvelope> {
        let root = parse_tree(input)?;
        if root.name != ROOT_TAG {
            return Err(Error::InvalidFile(format!(
                "expected <{ROOT_TAG}> root element, found <{}>",
                root.name
            )));
        }

        let mut value = decode_element(&root);
        // An export with no collections has an empty <data/>.
        if let Some(data) = value.get_mut("data").filter(|d| d.is_null()) {
            *data = Value::Object(Map::new());
        }
        ExportEnvelope::from_value(value)
    }
}

/// Replaces every character outside `[A-Za-z0-9_]` with `_`.
#[must_use]
pub fn sanitize_tag(key: &str) -> String {
    if key.is_empty() {
        return "_".to_string();
    }
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Infers a primitive from leaf text.
///
/// - `""` and `"null"` are null
/// - `"true"` / `"false"` are booleans
/// - an integer or decimal token shorter than 16 characters is a number
/// - anything else is the verbatim string
///
/// Strings that look like these tokens do not survive a round trip as
/// strings: `"42"` reads back as `42`, `"true"` as `true`. Likewise an
/// object whose only key is `value` collapses into its scalar when it sits
/// in an array.
#[must_use]
pub fn infer_primitive(text: &str) -> Value {
    match text {
        "" | "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ if text.len() < MAX_NUMERIC_LEN && is_numeric(text) => {
            parse_number(text).unwrap_or_else(|| Value::String(text.to_string()))
        },
        _ => Value::String(text.to_string()),
    }
}

fn is_numeric(text: &str) -> bool {
    NUMERIC.as_ref().is_some_and(|re| re.is_match(text))
}

fn parse_number(text: &str) -> Option<Value> {
    if text.contains('.') {
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
    } else {
        text.parse::<i64>().ok().map(|n| Value::Number(n.into()))
    }
}

/// Thin wrapper over the quick-xml writer that maps errors.
struct Emitter {
    writer: Writer<Vec<u8>>,
}

impl Emitter {
    fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::operation("write_xml", e))
    }

    fn declaration(&mut self) -> Result<()> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    fn open(&mut self, tag: &str) -> Result<()> {
        self.write(Event::Start(BytesStart::new(tag)))
    }

    fn close(&mut self, tag: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(tag)))
    }

    fn text(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.write(Event::Text(BytesText::from_escaped(escape(text))))
    }

    fn text_element(&mut self, tag: &str, text: &str) -> Result<()> {
        self.open(tag)?;
        self.text(text)?;
        self.close(tag)
    }

    fn element(&mut self, tag: &str, value: &Value) -> Result<()> {
        self.open(tag)?;
        self.content(value)?;
        self.close(tag)
    }

    fn fields(&mut self, record: &Record) -> Result<()> {
        for (key, value) in record {
            self.element(&sanitize_tag(key), value)?;
        }
        Ok(())
    }

    fn content(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => Ok(()),
            Value::Bool(b) => self.text(if *b { "true" } else { "false" }),
            Value::Number(n) => self.text(&n.to_string()),
            Value::String(s) => self.text(s),
            Value::Array(items) => {
                for item in items {
                    self.item(item)?;
                }
                Ok(())
            },
            Value::Object(map) => self.fields(map),
        }
    }

    fn item(&mut self, value: &Value) -> Result<()> {
        self.open(ITEM_TAG)?;
        match value {
            Value::Object(_) | Value::Array(_) => self.content(value)?,
            scalar => self.element(VALUE_TAG, scalar)?,
        }
        self.close(ITEM_TAG)
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner()).map_err(|e| Error::operation("write_xml", e))
    }
}

/// Element tree produced by the reader.
#[derive(Debug, Default)]
struct Node {
    name: String,
    text: String,
    children: Vec<Self>,
}

fn parse_tree(input: &str) -> Result<Node> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().expand_empty_elements = true;

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if root.is_some() {
                    return Err(Error::InvalidXml(
                        "more than one root element".to_string(),
                    ));
                }
                if stack.len() >= MAX_DEPTH {
                    return Err(Error::InvalidXml("document nested too deeply".to_string()));
                }
                stack.push(Node {
                    name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                    ..Node::default()
                });
            },
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| Error::InvalidXml("unbalanced closing tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            },
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| Error::InvalidXml(err.to_string()))?;
                match stack.last_mut() {
                    Some(node) => node.text.push_str(&text),
                    None if text.trim().is_empty() => {},
                    None => {
                        return Err(Error::InvalidXml(
                            "text outside the root element".to_string(),
                        ));
                    },
                }
            },
            Ok(Event::CData(e)) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            },
            Ok(Event::Eof) => break,
            Ok(_) => {},
            Err(e) => {
                return Err(Error::InvalidXml(format!(
                    "{e} (at byte {})",
                    reader.error_position()
                )));
            },
        }
    }

    if !stack.is_empty() {
        return Err(Error::InvalidXml("unexpected end of document".to_string()));
    }
    root.ok_or_else(|| Error::InvalidXml("document has no root element".to_string()))
}

/// Decodes an element: leaf → primitive, all-`<item>` children → array,
/// anything else → object. Text next to child elements is ignored.
fn decode_element(node: &Node) -> Value {
    if node.children.is_empty() {
        return infer_primitive(&node.text);
    }
    if node.children.iter().all(|c| c.name == ITEM_TAG) {
        return Value::Array(node.children.iter().map(decode_item).collect());
    }
    Value::Object(
        node.children
            .iter()
            .map(|c| (c.name.clone(), decode_element(c)))
            .collect(),
    )
}

fn decode_item(item: &Node) -> Value {
    match item.children.as_slice() {
        [only] if only.name == VALUE_TAG => decode_element(only),
        _ => decode_element(item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;
    use test_case::test_case;

    fn envelope(collection: &str, records: &Value) -> ExportEnvelope {
        let records: Vec<Record> = records
            .as_array()
            .map(|items| items.iter().filter_map(|v| v.as_object().cloned()).collect())
            .unwrap_or_default();
        let mut data = BTreeMap::new();
        data.insert(collection.to_string(), records);
        ExportEnvelope {
            export_type: collection.to_string(),
            exported_at: "2026-01-01T00:00:00.000Z".to_string(),
            version: "1.0".to_string(),
            data,
        }
    }

    #[test_case("" => Value::Null; "empty is null")]
    #[test_case("null" => Value::Null; "null literal")]
    #[test_case("true" => json!(true); "true literal")]
    #[test_case("false" => json!(false); "false literal")]
    #[test_case("42" => json!(42); "integer")]
    #[test_case("-7" => json!(-7); "negative integer")]
    #[test_case("2.5" => json!(2.5); "decimal")]
    #[test_case("123456789012345" => json!(123_456_789_012_345_i64); "fifteen digits")]
    #[test_case("1234567890123456" => json!("1234567890123456"); "sixteen digits stay text")]
    #[test_case("1e5" => json!("1e5"); "exponent stays text")]
    #[test_case("Work" => json!("Work"); "plain text")]
    #[test_case(" 42" => json!(" 42"); "padded number stays text")]
    fn test_infer_primitive(text: &str) -> Value {
        infer_primitive(text)
    }

    #[test]
    fn test_sanitize_tag() {
        assert_eq!(sanitize_tag("due_date"), "due_date");
        assert_eq!(sanitize_tag("due-date"), "due_date");
        assert_eq!(sanitize_tag("a b.c"), "a_b_c");
        assert_eq!(sanitize_tag(""), "_");
    }

    #[test]
    fn test_encode_layout() {
        let env = envelope(
            "task_categories",
            &json!([{"id": 1, "name": "Work", "tags": ["a", "b"], "parent": null}]),
        );
        let xml = XmlCodec.encode(&env).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(
            "<data><task_categories><item><id>1</id><name>Work</name>\
             <tags><item><value>a</value></item><item><value>b</value></item></tags>\
             <parent></parent></item></task_categories></data>"
        ));
        assert!(xml.ends_with("</LifeOSExport>"));
    }

    #[test]
    fn test_encode_escapes_text() {
        let env = envelope("task_categories", &json!([{"id": 1, "name": "A&B <\"x\"> 'y'"}]));
        let xml = XmlCodec.encode(&env).unwrap();
        assert!(xml.contains("<name>A&amp;B &lt;&quot;x&quot;&gt; &apos;y&apos;</name>"));
    }

    #[test]
    fn test_round_trip_preserves_special_characters() {
        let env = envelope(
            "task_categories",
            &json!([
                {"id": 1, "name": "Work & <Play>"},
                {"id": 2, "name": "\"Home\" 'Office'"}
            ]),
        );
        let decoded = XmlCodec.decode(&XmlCodec.encode(&env).unwrap()).unwrap();
        assert_eq!(decoded, env);
    }

    #[test]
    fn test_round_trip_nested_values() {
        let env = envelope(
            "notes",
            &json!([{
                "id": "n-1",
                "done": false,
                "score": 2.5,
                "meta": {"color": "blue", "pinned": true},
                "checklist": [{"text": "one", "done": true}, {"text": "two", "done": false}],
                "matrix": [[1, 2], [3]],
                "archived_at": null
            }]),
        );
        let decoded = XmlCodec.decode(&XmlCodec.encode(&env).unwrap()).unwrap();
        assert_eq!(decoded, env);
    }

    #[test]
    fn test_empty_values_read_back_as_null() {
        let env = envelope("notes", &json!([{"id": 1, "title": "", "tags": [], "meta": {}}]));
        let decoded = XmlCodec.decode(&XmlCodec.encode(&env).unwrap()).unwrap();
        let record = &decoded.data["notes"][0];
        assert_eq!(record["title"], Value::Null);
        assert_eq!(record["tags"], Value::Null);
        assert_eq!(record["meta"], Value::Null);
    }

    #[test]
    fn test_empty_data_round_trip() {
        let env = ExportEnvelope {
            export_type: "tasks".to_string(),
            exported_at: "2026-01-01T00:00:00.000Z".to_string(),
            version: "1.0".to_string(),
            data: BTreeMap::new(),
        };
        let decoded = XmlCodec.decode(&XmlCodec.encode(&env).unwrap()).unwrap();
        assert_eq!(decoded, env);
    }

    #[test]
    fn test_decode_accepts_whitespace_between_elements() {
        let xml = r"<?xml version='1.0'?>
<LifeOSExport>
  <exportType>tasks</exportType>
  <version>1.0</version>
  <data>
    <tasks>
      <item><id>5</id><title>Call bank</title></item>
    </tasks>
  </data>
</LifeOSExport>
";
        let decoded = XmlCodec.decode(xml).unwrap();
        assert_eq!(decoded.export_type, "tasks");
        assert_eq!(decoded.version, "1.0");
        assert_eq!(decoded.data["tasks"][0]["id"], json!(5));
        assert_eq!(decoded.data["tasks"][0]["title"], json!("Call bank"));
    }

    #[test]
    fn test_decode_self_closing_elements() {
        let xml = "<LifeOSExport><exportType>tasks</exportType><data><tasks><item><id>1</id><note/></item></tasks></data></LifeOSExport>";
        let decoded = XmlCodec.decode(xml).unwrap();
        assert_eq!(decoded.data["tasks"][0]["note"], Value::Null);
    }

    #[test]
    fn test_decode_mismatched_tags() {
        let err = XmlCodec
            .decode("<LifeOSExport><exportType>tasks</version></LifeOSExport>")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidXml(_)));
    }

    #[test]
    fn test_decode_truncated_document() {
        let err = XmlCodec
            .decode("<LifeOSExport><exportType>tasks</exportType><data>")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidXml(_)));
    }

    #[test]
    fn test_decode_rejects_deep_nesting() {
        let depth = 10_000;
        let xml = format!(
            "<LifeOSExport><exportType>tasks</exportType><data><tasks><item><x>{}{}</x></item></tasks></data></LifeOSExport>",
            "<a>".repeat(depth),
            "</a>".repeat(depth)
        );
        let err = XmlCodec.decode(&xml).unwrap_err();
        assert!(matches!(err, Error::InvalidXml(ref m) if m.contains("nested too deeply")));
    }

    #[test]
    fn test_decode_accepts_nesting_up_to_limit() {
        // root, data, collection, item, field: five levels before the nesting
        let inner = MAX_DEPTH - 5;
        let xml = format!(
            "<LifeOSExport><exportType>tasks</exportType><data><tasks><item><x>{}1{}</x></item></tasks></data></LifeOSExport>",
            "<a>".repeat(inner),
            "</a>".repeat(inner)
        );
        let decoded = XmlCodec.decode(&xml).unwrap();
        assert!(decoded.data["tasks"][0]["x"].is_object());
    }

    #[test]
    fn test_lone_value_key_collapses_to_scalar() {
        let env = envelope("tasks", &json!([{"id": 1, "tags": [{"value": 5}]}]));
        let decoded = XmlCodec.decode(&XmlCodec.encode(&env).unwrap()).unwrap();
        assert_eq!(decoded.data["tasks"][0]["tags"], json!([5]));

        let env = envelope("tasks", &json!([{"value": 5}]));
        let err = XmlCodec.decode(&XmlCodec.encode(&env).unwrap()).unwrap_err();
        assert!(matches!(err, Error::InvalidFile(ref m) if m.contains("non-object")));
    }

    #[test]
    fn test_decode_wrong_root() {
        let err = XmlCodec
            .decode("<backup><exportType>tasks</exportType><data></data></backup>")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidFile(ref m) if m.contains("LifeOSExport")));
    }

    #[test]
    fn test_decode_missing_export_type() {
        let err = XmlCodec
            .decode("<LifeOSExport><data></data></LifeOSExport>")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidFile(ref m) if m.contains("exportType")));
    }
}
