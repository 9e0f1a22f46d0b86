mod common;

use common::{bx, concat, ftyp};
use isobmff::decoders::Ftyp;
use isobmff::{
    BinaryStream, BoxHeader, BoxKey, ContainerBox, FourCC, IsoBox, OpaqueBox, ParseError, Parser,
    Registry, Result,
};

/// Reads one big-endian counter, for exercising custom registration.
#[derive(Debug, Default)]
struct Counter {
    value: u32,
}

impl IsoBox for Counter {
    fn decode(&mut self, _: &mut Parser, _: &BoxHeader, stream: &mut BinaryStream) -> Result<()> {
        self.value = stream.read_u32()?;
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        vec![("Value".to_string(), self.value.to_string())]
    }
}

fn counter_file() -> Vec<u8> {
    concat(&[ftyp(), bx(b"cntr", &42u32.to_be_bytes())])
}

#[test]
fn custom_box_is_used_after_registration() {
    let mut parser = Parser::new();
    let file = parser.parse_data(counter_file()).expect("parse failed");
    assert!(file.boxes()[1].get::<OpaqueBox>().is_some());

    parser
        .register_box("cntr", || Box::new(Counter::default()))
        .expect("register");
    let file = parser.parse_data(counter_file()).expect("parse failed");
    let counter = file.typed_box::<Counter>("cntr").expect("counter");
    assert_eq!(counter.value, 42);
}

#[test]
fn registration_replaces_defaults() {
    let mut parser = Parser::new();
    parser
        .register_box("ftyp", || Box::new(OpaqueBox::default()))
        .expect("register");
    let file = parser.parse_data(ftyp()).expect("parse failed");
    assert!(file.boxes()[0].get::<Ftyp>().is_none());
    assert_eq!(
        file.boxes()[0].get::<OpaqueBox>().expect("opaque").data().len(),
        12
    );
}

#[test]
fn registered_container_recurses() {
    let data = concat(&[ftyp(), bx(b"wrap", &bx(b"cntr", &7u32.to_be_bytes()))]);

    let mut parser = Parser::new();
    parser.register_container_box("wrap").expect("register");
    parser
        .register_box("cntr", || Box::new(Counter::default()))
        .expect("register");

    let file = parser.parse_data(data).expect("parse failed");
    let wrap = file.find("wrap").expect("wrap");
    assert!(wrap.get::<ContainerBox>().is_some());
    assert_eq!(wrap.typed_box::<Counter>("cntr").expect("counter").value, 7);
}

#[test]
fn type_codes_must_be_four_bytes() {
    let mut parser = Parser::new();
    let err = parser.register_container_box("abc").unwrap_err();
    assert!(matches!(err, ParseError::InvalidTypeCode(ref s) if s == "abc"));

    let err = parser
        .register_box("abcde", || Box::new(Counter::default()))
        .unwrap_err();
    assert!(matches!(err, ParseError::InvalidTypeCode(_)));
    assert!("moov".parse::<FourCC>().is_ok());
}

#[test]
fn uuid_boxes_dispatch_on_user_type() {
    let user_type = *b"0123456789abcdef";
    let mut payload = user_type.to_vec();
    payload.extend_from_slice(&5u32.to_be_bytes());
    let other = [0u8; 16];
    let mut other_payload = other.to_vec();
    other_payload.extend_from_slice(&6u32.to_be_bytes());
    let data = concat(&[ftyp(), bx(b"uuid", &payload), bx(b"uuid", &other_payload)]);

    let mut parser = Parser::new();
    parser
        .registry_mut()
        .register_uuid_box(user_type, || Box::new(Counter::default()));
    assert!(parser.registry().contains(&BoxKey::Uuid(user_type)));

    let file = parser.parse_data(data).expect("parse failed");
    assert_eq!(file.boxes()[1].get::<Counter>().expect("counter").value, 5);
    assert!(file.boxes()[2].get::<OpaqueBox>().is_some());
}

#[test]
fn cloned_parser_keeps_custom_and_default_entries() {
    let mut parser = Parser::new();
    parser
        .register_box("cntr", || Box::new(Counter::default()))
        .expect("register");
    // a custom ftyp decoder is overridden by the re-seeded default on copy
    parser
        .register_box("ftyp", || Box::new(OpaqueBox::default()))
        .expect("register");

    let mut copy = parser.clone();
    let file = copy.parse_data(counter_file()).expect("parse failed");
    assert!(file.typed_box::<Ftyp>("ftyp").is_some());
    assert_eq!(file.typed_box::<Counter>("cntr").expect("counter").value, 42);

    // the original is untouched by the copy
    let file = parser.parse_data(counter_file()).expect("parse failed");
    assert!(file.typed_box::<Ftyp>("ftyp").is_none());
}

#[test]
fn parsers_do_not_share_registries() {
    let mut a = Parser::new();
    let mut b = Parser::new();
    a.register_box("cntr", || Box::new(Counter::default()))
        .expect("register");

    let fa = a.parse_data(counter_file()).expect("parse a");
    let fb = b.parse_data(counter_file()).expect("parse b");
    assert!(fa.typed_box::<Counter>("cntr").is_some());
    assert!(fb.typed_box::<Counter>("cntr").is_none());
}

#[test]
fn registry_defaults_and_fallback() {
    let empty = Registry::new();
    assert!(empty.is_empty());
    let b = empty.create_box(&BoxKey::FourCC(FourCC(*b"ftyp")));
    assert!(b.is::<OpaqueBox>());

    let reg = Registry::with_defaults();
    for code in ["moov", "udta", "ftyp", "iloc", "sidx", "tfhd", "trex", "mfhd"] {
        let key = BoxKey::FourCC(code.parse().expect("fourcc"));
        assert!(reg.contains(&key), "{code} missing");
    }
    assert!(
        reg.create_box(&BoxKey::FourCC(FourCC(*b"ftyp")))
            .is::<Ftyp>()
    );
}

#[test]
fn info_side_channel() {
    let mut parser = Parser::new();
    parser.set_info("answer", 42u32);
    assert_eq!(parser.info::<u32>("answer"), Some(&42));
    assert_eq!(parser.info::<String>("answer"), None);

    let copy = parser.clone();
    assert_eq!(copy.info::<u32>("answer"), Some(&42));

    parser.remove_info("answer");
    assert!(parser.info::<u32>("answer").is_none());
}
