mod common;

use common::{bx, concat, ftyp};
use isobmff::decoders::Ftyp;
use isobmff::{BinaryStream, ContainerBox, FourCC, OpaqueBox, ParseError, Parser, read_box_header};
use std::io::Write;

#[test]
fn ftyp_fields_are_recoverable() {
    let data = ftyp();
    assert_eq!(data.len(), 20);

    let file = Parser::new().parse_data(data).expect("parse failed");
    assert_eq!(file.boxes().len(), 1);

    let node = &file.boxes()[0];
    assert_eq!(node.hdr.start, 0);
    assert_eq!(node.hdr.size, 20);
    assert_eq!(node.hdr.header_size, 8);
    assert_eq!(node.typ(), FourCC(*b"ftyp"));

    let ftyp = node.get::<Ftyp>().expect("ftyp should be decoded");
    assert_eq!(ftyp.major_brand, FourCC(*b"isom"));
    assert_eq!(ftyp.minor_version, 0);
    assert_eq!(ftyp.compatible_brands, vec![FourCC(*b"isom")]);
    assert!(ftyp.has_brand("isom"));
    assert!(!ftyp.has_brand("mif1"));
}

#[test]
fn read_single_header() {
    let mut s = BinaryStream::from_vec(ftyp());
    let hdr = read_box_header(&mut s).expect("read_box_header failed");

    assert_eq!(hdr.start, 0);
    assert_eq!(hdr.size, 20);
    assert_eq!(hdr.typ, FourCC(*b"ftyp"));
    assert_eq!(hdr.header_size, 8);
    assert_eq!(hdr.payload_size(), 12);
    assert_eq!(s.position(), 8);
}

#[test]
fn declared_size_past_end_is_truncated() {
    let mut data = ftyp();
    data.extend_from_slice(&100u32.to_be_bytes());
    data.extend_from_slice(b"free");
    data.extend_from_slice(&[0u8; 8]);

    let err = Parser::new().parse_data(data).unwrap_err();
    assert!(
        matches!(err, ParseError::TruncatedStream { .. }),
        "unexpected error: {err:?}"
    );
}

#[test]
fn unknown_first_box_is_rejected() {
    let data = bx(b"xxxx", &[0u8; 8]);
    let err = Parser::new().parse_data(data).unwrap_err();
    assert!(matches!(err, ParseError::InputRejected(_)), "got {err:?}");
}

#[test]
fn empty_and_tiny_inputs_are_rejected() {
    let err = Parser::new().parse_data(Vec::new()).unwrap_err();
    assert!(matches!(err, ParseError::InputRejected(_)));

    let err = Parser::new().parse_data(b"\0\0\0\x08fty".to_vec()).unwrap_err();
    assert!(matches!(err, ParseError::InputRejected(_)));
}

#[test]
fn every_signature_is_accepted() {
    for sig in [b"ftyp", b"sinf", b"wide", b"free", b"skip", b"mdat", b"moov", b"pnot"] {
        // payload-less boxes only; ftyp and sinf would need fields or children
        let data = bx(sig, &[]);
        let res = Parser::new().parse_data(data);
        if sig == b"ftyp" {
            assert!(matches!(res, Err(ParseError::TruncatedStream { .. })));
        } else {
            assert!(res.is_ok(), "{} rejected", FourCC(*sig));
        }
    }
}

#[test]
fn large_size_form() {
    let mut data = ftyp();
    // size32 == 1, then a 64-bit size covering 16 header bytes + 4 payload
    data.extend_from_slice(&1u32.to_be_bytes());
    data.extend_from_slice(b"free");
    data.extend_from_slice(&20u64.to_be_bytes());
    data.extend_from_slice(b"abcd");

    let file = Parser::new().parse_data(data).expect("parse failed");
    let free = &file.boxes()[1];
    assert!(free.hdr.has_large_size());
    assert_eq!(free.hdr.header_size, 16);
    assert_eq!(free.hdr.size, 20);
    assert_eq!(free.get::<OpaqueBox>().expect("opaque").data(), b"abcd");
}

#[test]
fn size_zero_runs_to_end_of_scope() {
    let mut data = ftyp();
    data.extend_from_slice(&0u32.to_be_bytes());
    data.extend_from_slice(b"mdat");
    data.extend_from_slice(&[7u8; 13]);

    let file = Parser::new().parse_data(data).expect("parse failed");
    let mdat = &file.boxes()[1];
    assert!(mdat.hdr.extends_to_end());
    assert_eq!(mdat.hdr.size, 8 + 13);
    assert_eq!(mdat.get::<OpaqueBox>().expect("opaque").data().len(), 13);
}

#[test]
fn nested_size_zero_ends_at_parent() {
    let mut child = 0u32.to_be_bytes().to_vec();
    child.extend_from_slice(b"zzzz");
    child.extend_from_slice(&[3u8; 5]);
    let data = concat(&[ftyp(), bx(b"moov", &child), bx(b"free", &[1, 2])]);

    let file = Parser::new().parse_data(data).expect("parse failed");
    assert_eq!(file.boxes().len(), 3);

    let moov = &file.boxes()[1];
    assert_eq!(moov.hdr.size, 8 + 13);
    let zzzz = &moov.children()[0];
    assert!(zzzz.hdr.extends_to_end());
    assert_eq!(zzzz.hdr.start, 28);
    assert_eq!(zzzz.hdr.size, 13);
    assert_eq!(zzzz.get::<OpaqueBox>().expect("opaque").data(), &[3u8; 5]);

    let free = &file.boxes()[2];
    assert_eq!(free.hdr.start, 41);
    assert_eq!(free.get::<OpaqueBox>().expect("opaque").data(), &[1, 2]);
}

#[test]
fn nested_large_size_form() {
    let mut child = 1u32.to_be_bytes().to_vec();
    child.extend_from_slice(b"free");
    child.extend_from_slice(&20u64.to_be_bytes());
    child.extend_from_slice(b"wxyz");
    let sibling = bx(b"skip", &[]);
    let data = concat(&[ftyp(), bx(b"moov", &concat(&[child, sibling]))]);

    let file = Parser::new().parse_data(data).expect("parse failed");
    let moov = file.find("moov").expect("moov");
    assert_eq!(moov.children().len(), 2);

    let free = &moov.children()[0];
    assert!(free.hdr.has_large_size());
    assert_eq!(free.hdr.header_size, 16);
    assert_eq!(free.hdr.size, 20);
    assert_eq!(free.get::<OpaqueBox>().expect("opaque").data(), b"wxyz");
    assert_eq!(moov.children()[1].hdr.start, 48);
}

#[test]
fn size_smaller_than_header_is_malformed() {
    let mut data = ftyp();
    data.extend_from_slice(&4u32.to_be_bytes());
    data.extend_from_slice(b"free");

    let err = Parser::new().parse_data(data).unwrap_err();
    assert!(matches!(err, ParseError::MalformedBox { .. }), "got {err:?}");
}

#[test]
fn trailing_bytes_too_short_for_a_box() {
    let mut data = ftyp();
    data.extend_from_slice(&[0u8; 5]);

    match Parser::new().parse_data(data) {
        Err(ParseError::MalformedBox { context, offset, .. }) => {
            assert_eq!(context, "file");
            assert_eq!(offset, 20);
        }
        other => panic!("expected MalformedBox, got {other:?}"),
    }
}

#[test]
fn uuid_box_header() {
    let user_type = [0x11u8; 16];
    let mut payload = user_type.to_vec();
    payload.extend_from_slice(&[1, 2, 3]);
    let data = concat(&[ftyp(), bx(b"uuid", &payload)]);

    let file = Parser::new().parse_data(data).expect("parse failed");
    let node = &file.boxes()[1];
    assert_eq!(node.hdr.uuid, Some(user_type));
    assert_eq!(node.hdr.header_size, 24);
    assert_eq!(node.hdr.payload_size(), 3);
    assert_eq!(node.get::<OpaqueBox>().expect("opaque").data(), &[1, 2, 3]);
}

#[test]
fn unregistered_box_keeps_payload() {
    let data = concat(&[ftyp(), bx(b"zzzz", b"hello world")]);
    let file = Parser::new().parse_data(data).expect("parse failed");

    let node = file.find("zzzz").expect("zzzz box");
    let opaque = node.get::<OpaqueBox>().expect("opaque");
    assert_eq!(opaque.data().len() as u64, node.hdr.size - node.hdr.header_size);
    assert_eq!(opaque.data(), b"hello world");
}

#[test]
fn containers_nest_and_children_fill_the_payload() {
    let trak = bx(b"trak", &concat(&[bx(b"aaaa", &[1; 4]), bx(b"bbbb", &[])]));
    let moov = bx(b"moov", &concat(&[trak, bx(b"udta", &bx(b"cccc", &[2; 2]))]));
    let data = concat(&[ftyp(), moov]);

    let file = Parser::new().parse_data(data).expect("parse failed");
    let moov = file.find("moov").expect("moov");
    assert!(moov.get::<ContainerBox>().is_some());

    let sum: u64 = moov.children().iter().map(|c| c.hdr.size).sum();
    assert_eq!(sum, moov.hdr.payload_size());

    let trak = moov.find("trak").expect("trak");
    let kinds: Vec<String> = trak.children().iter().map(|c| c.typ().to_string()).collect();
    assert_eq!(kinds, vec!["aaaa", "bbbb"]);

    let cccc = file.find_path("moov.udta.cccc").expect("path lookup");
    assert_eq!(cccc.hdr.size, 10);
}

#[test]
fn child_past_container_end_is_out_of_scope() {
    // moov holds 8 bytes of header for a child claiming 64; the file has
    // plenty of data after moov so only the scope check can catch it
    let mut inner = Vec::new();
    inner.extend_from_slice(&64u32.to_be_bytes());
    inner.extend_from_slice(b"free");
    let data = concat(&[ftyp(), bx(b"moov", &inner), bx(b"free", &[0u8; 80])]);

    let err = Parser::new().parse_data(data).unwrap_err();
    assert!(matches!(err, ParseError::OutOfScope { .. }), "got {err:?}");
}

#[test]
fn decoder_leftovers_are_skipped() {
    // ftyp with a trailing partial brand: decoder stops, container skips it
    let mut p = Vec::new();
    p.extend_from_slice(b"mif1");
    p.extend_from_slice(&0u32.to_be_bytes());
    p.extend_from_slice(b"heic");
    p.extend_from_slice(b"xy");
    let data = concat(&[bx(b"ftyp", &p), bx(b"free", &[])]);

    let file = Parser::new().parse_data(data).expect("parse failed");
    assert_eq!(file.boxes().len(), 2);
    let ftyp = file.typed_box::<Ftyp>("ftyp").expect("ftyp");
    assert_eq!(ftyp.compatible_brands, vec![FourCC(*b"heic")]);
}

#[test]
fn parsing_twice_gives_the_same_tree() {
    let data = concat(&[ftyp(), bx(b"moov", &bx(b"zzzz", b"abc"))]);
    let mut parser = Parser::new();
    let a = parser.parse_data(data.clone()).expect("first parse");
    let b = parser.parse_data(data).expect("second parse");
    assert_eq!(a.to_string(), b.to_string());
}

#[test]
fn parse_file_from_disk() {
    let data = concat(&[ftyp(), bx(b"free", &[0u8; 4])]);
    let mut tmp = tempfile::NamedTempFile::new().expect("tempfile");
    tmp.write_all(&data).expect("write");
    tmp.flush().expect("flush");

    let file = Parser::new().parse_file(tmp.path()).expect("parse_file");
    assert_eq!(file.boxes().len(), 2);
    assert_eq!(file.boxes()[1].hdr.start, 20);
}

#[test]
fn unreadable_file_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = Parser::new()
        .parse_file(dir.path().join("nope.mp4"))
        .unwrap_err();
    assert!(matches!(err, ParseError::InputRejected(ref m) if m.contains("nope.mp4")), "got {err:?}");
}
