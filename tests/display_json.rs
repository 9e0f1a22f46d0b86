mod common;

use common::{bx, concat, ftyp, full_bx};
use isobmff::{Displayable, Parser, hex_payload, to_json, to_json_string};

#[test]
fn description_of_a_leaf() {
    let file = Parser::new().parse_data(ftyp()).expect("parse failed");
    let text = file.boxes()[0].description();
    let expected = "\
[ftyp] File Type Box
{
    Major Brand:       isom
    Minor Version:     0
    Compatible Brands: isom
}
";
    assert_eq!(text, expected);
}

#[test]
fn description_nests_children_and_records() {
    let mut sidx = Vec::new();
    for v in [1u32, 1000, 0, 0] {
        sidx.extend_from_slice(&v.to_be_bytes());
    }
    sidx.extend_from_slice(&0u16.to_be_bytes());
    sidx.extend_from_slice(&1u16.to_be_bytes());
    for v in [0x8000_0064u32, 10, 0] {
        sidx.extend_from_slice(&v.to_be_bytes());
    }
    let data = concat(&[
        ftyp(),
        bx(b"moov", &bx(b"zzzz", &[])),
        full_bx(b"sidx", 0, 0, &sidx),
    ]);
    let file = Parser::new().parse_data(data).expect("parse failed");
    let text = file.to_string();

    assert!(text.starts_with("ISO Media File\n{\n    [ftyp] File Type Box\n"));
    assert!(text.contains("    [moov] Movie Box\n    {\n        [zzzz] Unknown Box\n"));
    assert!(text.contains("        Reference\n        {\n"));
    assert!(text.contains("Reference Type:      true"));
    assert!(text.contains("Reference Size:      100"));
}

#[test]
fn opaque_preview_is_truncated() {
    let data = concat(&[ftyp(), bx(b"zzzz", &[0xab; 20])]);
    let file = Parser::new().parse_data(data).expect("parse failed");

    let props = file.boxes()[1].display_properties();
    assert_eq!(props[0], ("Data Size".to_string(), "20".to_string()));
    assert_eq!(props[1].1, format!("{}...", "ab".repeat(16)));
}

#[test]
fn uuid_name_uses_canonical_form() {
    let mut payload = vec![0u8; 15];
    payload.push(1);
    let data = concat(&[ftyp(), bx(b"uuid", &payload)]);
    let file = Parser::new().parse_data(data).expect("parse failed");

    assert_eq!(
        file.boxes()[1].display_name(),
        "[uuid:00000000-0000-0000-0000-000000000001] User Extension Box"
    );
}

#[test]
fn json_tree_mirrors_the_boxes() {
    let data = concat(&[ftyp(), bx(b"moov", &bx(b"free", &[9; 3]))]);
    let file = Parser::new().parse_data(data).expect("parse failed");

    let boxes = to_json(&file);
    assert_eq!(boxes.len(), 2);
    assert_eq!(boxes[0].typ, "ftyp");
    assert_eq!(boxes[0].full_name, "File Type Box");
    assert_eq!(boxes[0].payload_size, 12);
    assert_eq!(boxes[0].properties[0].label, "Major Brand");
    assert_eq!(boxes[0].properties[0].value, "isom");

    assert_eq!(boxes[1].offset, 20);
    assert_eq!(boxes[1].children.len(), 1);
    assert_eq!(boxes[1].children[0].offset, 28);

    let json = to_json_string(&file).expect("serialize");
    let v: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(v[1]["children"][0]["typ"], "free");
    assert_eq!(v[1]["children"][0]["size"], 11);
    // leaves carry no empty arrays
    assert!(v[0].get("children").is_none());
}

#[test]
fn hex_payload_only_for_opaque_boxes() {
    let data = concat(&[ftyp(), bx(b"free", b"0123456789abcdefXYZ")]);
    let file = Parser::new().parse_data(data).expect("parse failed");

    assert!(hex_payload(&file.boxes()[0], 0).is_none());

    let dump = hex_payload(&file.boxes()[1], 0).expect("dump");
    assert_eq!(dump.offset, 28);
    assert_eq!(dump.length, 19);
    assert_eq!(dump.hex.lines().count(), 2);
    assert!(dump.hex.starts_with("0000001c  30 31 32"));

    let short = hex_payload(&file.boxes()[1], 4).expect("dump");
    assert_eq!(short.length, 4);
    assert!(short.hex.ends_with("|0123|\n"));
}
