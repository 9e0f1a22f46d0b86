//! JSON projection of a parsed tree, for tooling and UIs.

use crate::boxes::{BoxNode, OpaqueBox};
use crate::container::File;
use crate::display::Displayable;
use crate::known_boxes::KnownBox;
use crate::util::{hex_dump, uuid_string};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct JsonProperty {
    pub label: String,
    pub value: String,
}

/// A non-box sub-record (reference entry, item location, ...).
#[derive(Debug, Serialize)]
pub struct JsonObject {
    pub name: String,
    pub properties: Vec<JsonProperty>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<JsonObject>,
}

/// A JSON-serializable representation of a single box.
#[derive(Debug, Serialize)]
pub struct JsonBox {
    pub offset: u64,
    pub size: u64,
    pub header_size: u64,
    pub payload_size: u64,

    pub typ: String,
    pub uuid: Option<String>,
    pub full_name: String,
    pub properties: Vec<JsonProperty>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<JsonObject>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<JsonBox>,
}

fn json_properties(props: Vec<(String, String)>) -> Vec<JsonProperty> {
    props
        .into_iter()
        .map(|(label, value)| JsonProperty { label, value })
        .collect()
}

fn build_json_object(obj: &dyn Displayable) -> JsonObject {
    JsonObject {
        name: obj.display_name(),
        properties: json_properties(obj.display_properties()),
        objects: obj.nested().into_iter().map(build_json_object).collect(),
    }
}

pub fn build_json_for_box(node: &BoxNode) -> JsonBox {
    let hdr = &node.hdr;
    JsonBox {
        offset: hdr.start,
        size: hdr.size,
        header_size: hdr.header_size,
        payload_size: hdr.payload_size(),

        typ: hdr.typ.to_string(),
        uuid: hdr.uuid.as_ref().map(uuid_string),
        full_name: KnownBox::from(hdr.typ).full_name().to_string(),
        properties: json_properties(node.body.properties()),
        objects: node
            .body
            .objects()
            .into_iter()
            .map(build_json_object)
            .collect(),
        children: node.children().iter().map(build_json_for_box).collect(),
    }
}

/// Top-level boxes of `file` as JSON values.
pub fn to_json(file: &File) -> Vec<JsonBox> {
    file.boxes().iter().map(build_json_for_box).collect()
}

pub fn to_json_string(file: &File) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&to_json(file))
}

#[derive(Debug, Serialize)]
pub struct HexDump {
    pub offset: u64,
    pub length: u64,
    pub hex: String,
}

/// Hex dump of the retained payload of an opaque box, at most `max_len`
/// bytes (0 means all of it). `None` for decoded boxes, whose raw bytes are
/// not kept.
pub fn hex_payload(node: &BoxNode, max_len: u64) -> Option<HexDump> {
    let data = node.get::<OpaqueBox>()?.data();
    let available = data.len() as u64;
    let length = if max_len == 0 {
        available
    } else {
        available.min(max_len)
    };
    let offset = node.hdr.start + node.hdr.header_size;
    Some(HexDump {
        offset,
        length,
        hex: hex_dump(&data[..length as usize], offset),
    })
}

/// Every box of type `typ` anywhere in the tree, depth first.
pub fn collect_boxes<'a>(boxes: &'a [BoxNode], typ: &str, out: &mut Vec<&'a BoxNode>) {
    for b in boxes {
        if b.typ().is(typ) {
            out.push(b);
        }
        collect_boxes(b.children(), typ, out);
    }
}
