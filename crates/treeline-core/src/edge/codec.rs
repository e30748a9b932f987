//! Persistence for edges: the `<arrowline>` XML element and the structured
//! record used inside JSON scene files.
//!
//! Both forms carry `{id, from, to}`. Encoding may skip the id (for exports
//! that will be re-identified on import); decoding requires one, because a
//! persisted edge without an id means the saved state is corrupt.
//!
//! ```text
//! <arrowline id="e1" from="b1" to="b2"/>
//! {"id": "e1", "from": "b1", "to": "b2"}
//! ```

#![allow(clippy::module_name_repetitions)]

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

use super::{Edge, EdgeId};

/// XML element name of a persisted edge.
pub const XML_ELEMENT: &str = "arrowline";

/// Structured form of a persisted edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

/// A decoded edge whose id has been validated as present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEdge {
    pub id: EdgeId,
    pub from: String,
    pub to: String,
}

/// Errors raised while decoding persisted edges.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("no id present in arrowline definition")]
    MissingId,
    #[error("malformed arrowline XML: {0}")]
    Xml(String),
    #[error("expected <{XML_ELEMENT}> element, found <{0}>")]
    UnexpectedElement(String),
    #[error("malformed arrowline record: {0}")]
    Record(String),
}

impl CodecError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MissingId => ErrorCode::MissingEdgeId,
            Self::Xml(_) | Self::UnexpectedElement(_) => ErrorCode::MalformedEdgeXml,
            Self::Record(_) => ErrorCode::MalformedEdgeRecord,
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Encode an edge as a structured record.
#[must_use]
pub fn to_record(edge: &Edge, skip_id: bool) -> EdgeRecord {
    EdgeRecord {
        id: (!skip_id).then(|| edge.id().to_string()),
        from: edge.from_block().to_string(),
        to: edge.to_block().to_string(),
    }
}

/// Validate a structured record.
///
/// # Errors
///
/// Returns [`CodecError::MissingId`] if the id is absent or empty.
pub fn from_record(record: &EdgeRecord) -> Result<DecodedEdge, CodecError> {
    let id = record
        .id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or(CodecError::MissingId)?;
    Ok(DecodedEdge {
        id: EdgeId::new(id),
        from: record.from.clone(),
        to: record.to.clone(),
    })
}

/// Parse and validate a record from JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Record`] for invalid JSON and
/// [`CodecError::MissingId`] if the id is absent.
pub fn from_json(text: &str) -> Result<DecodedEdge, CodecError> {
    let record: EdgeRecord =
        serde_json::from_str(text).map_err(|e| CodecError::Record(e.to_string()))?;
    from_record(&record)
}

// ---------------------------------------------------------------------------
// XML
// ---------------------------------------------------------------------------

/// Encode an edge as a self-closing `<arrowline>` element.
///
/// # Errors
///
/// Returns [`CodecError::Xml`] if the writer fails, which only happens if
/// the output is not valid UTF-8.
pub fn to_xml(edge: &Edge, skip_id: bool) -> Result<String, CodecError> {
    let mut element = BytesStart::new(XML_ELEMENT);
    if !skip_id {
        element.push_attribute(("id", edge.id().as_str()));
    }
    element.push_attribute(("from", edge.from_block()));
    element.push_attribute(("to", edge.to_block()));

    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Empty(element))
        .map_err(|e| CodecError::Xml(e.to_string()))?;
    String::from_utf8(writer.into_inner()).map_err(|e| CodecError::Xml(e.to_string()))
}

/// Decode the first `<arrowline>` element in `text`.
///
/// Missing `from`/`to` attributes decode as empty strings.
///
/// # Errors
///
/// Returns [`CodecError::MissingId`] if the element has no id,
/// [`CodecError::UnexpectedElement`] if the first element is something else,
/// or [`CodecError::Xml`] for syntax errors and empty input.
pub fn from_xml(text: &str) -> Result<DecodedEdge, CodecError> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(element) | Event::Empty(element)) => {
                return decode_element(&element);
            }
            Ok(Event::Eof) => {
                return Err(CodecError::Xml("no arrowline element found".to_string()));
            }
            Ok(_) => {}
            Err(e) => return Err(CodecError::Xml(e.to_string())),
        }
    }
}

/// Decode every `<arrowline>` element nested anywhere in `text`, in
/// document order. Other elements are skipped.
///
/// # Errors
///
/// Fails fast on the first element without an id or on a syntax error.
pub fn from_xml_all(text: &str) -> Result<Vec<DecodedEdge>, CodecError> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut decoded = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(element) | Event::Empty(element))
                if element.name().as_ref() == XML_ELEMENT.as_bytes() =>
            {
                decoded.push(decode_element(&element)?);
            }
            Ok(Event::Eof) => return Ok(decoded),
            Ok(_) => {}
            Err(e) => return Err(CodecError::Xml(e.to_string())),
        }
    }
}

fn decode_element(element: &BytesStart<'_>) -> Result<DecodedEdge, CodecError> {
    let name = element.name();
    if name.as_ref() != XML_ELEMENT.as_bytes() {
        return Err(CodecError::UnexpectedElement(
            String::from_utf8_lossy(name.as_ref()).into_owned(),
        ));
    }

    let mut id = None;
    let mut from = String::new();
    let mut to = String::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| CodecError::Xml(e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| CodecError::Xml(e.to_string()))?
            .into_owned();
        match attr.key.as_ref() {
            b"id" => id = Some(value),
            b"from" => from = value,
            b"to" => to = value,
            _ => {}
        }
    }

    let id = id.filter(|id| !id.is_empty()).ok_or(CodecError::MissingId)?;
    Ok(DecodedEdge {
        id: EdgeId::new(id),
        from,
        to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge() -> Edge {
        Edge::new(EdgeId::from("e1"), "b1", "b2")
    }

    #[test]
    fn xml_round_trip_keeps_id_and_endpoints() {
        let xml = to_xml(&edge(), false).expect("encode");
        assert_eq!(xml, r#"<arrowline id="e1" from="b1" to="b2"/>"#);
        let decoded = from_xml(&xml).expect("decode");
        assert_eq!(decoded.id.as_str(), "e1");
        assert_eq!(decoded.from, "b1");
        assert_eq!(decoded.to, "b2");
    }

    #[test]
    fn record_round_trip_keeps_id_and_endpoints() {
        let record = to_record(&edge(), false);
        let json = serde_json::to_string(&record).expect("serialize");
        let decoded = from_json(&json).expect("decode");
        assert_eq!(
            decoded,
            DecodedEdge {
                id: EdgeId::from("e1"),
                from: "b1".into(),
                to: "b2".into(),
            }
        );
    }

    #[test]
    fn skip_id_omits_the_attribute() {
        let xml = to_xml(&edge(), true).expect("encode");
        assert!(!xml.contains("id="));
        assert_eq!(from_xml(&xml), Err(CodecError::MissingId));

        let record = to_record(&edge(), true);
        assert_eq!(record.id, None);
        assert_eq!(from_record(&record), Err(CodecError::MissingId));
    }

    #[test]
    fn empty_id_is_missing() {
        let err = from_xml(r#"<arrowline id="" from="a" to="b"/>"#).expect_err("must fail");
        assert_eq!(err, CodecError::MissingId);
        assert_eq!(err.code(), ErrorCode::MissingEdgeId);
    }

    #[test]
    fn missing_endpoints_decode_empty() {
        let decoded = from_xml(r#"<arrowline id="x"/>"#).expect("decode");
        assert_eq!(decoded.from, "");
        assert_eq!(decoded.to, "");
    }

    #[test]
    fn special_characters_survive_escaping() {
        let edge = Edge::new(EdgeId::from("a<&>\"b"), "from", "to");
        let xml = to_xml(&edge, false).expect("encode");
        let decoded = from_xml(&xml).expect("decode");
        assert_eq!(decoded.id.as_str(), "a<&>\"b");
    }

    #[test]
    fn wrong_element_is_rejected() {
        let err = from_xml(r#"<block id="x"/>"#).expect_err("must fail");
        assert_eq!(err, CodecError::UnexpectedElement("block".into()));
        assert_eq!(err.code(), ErrorCode::MalformedEdgeXml);
    }

    #[test]
    fn decode_all_skips_unrelated_elements() {
        let xml = r#"<xml>
            <block id="b1"/>
            <arrowline id="e1" from="b1" to="b2"/>
            <arrowline id="e2" from="b2" to="b3"></arrowline>
        </xml>"#;
        let decoded = from_xml_all(xml).expect("decode");
        let ids: Vec<&str> = decoded.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2"]);
    }

    #[test]
    fn decode_all_fails_fast_on_missing_id() {
        let xml = r#"<xml><arrowline id="e1" from="a" to="b"/><arrowline from="b" to="c"/></xml>"#;
        assert_eq!(from_xml_all(xml), Err(CodecError::MissingId));
    }

    #[test]
    fn malformed_json_is_a_record_error() {
        let err = from_json("{not json").expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::MalformedEdgeRecord);
    }
}
