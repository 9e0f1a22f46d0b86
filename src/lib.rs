//! Parser for ISO Base Media File Format (ISO/IEC 14496-12) files: MP4,
//! MOV, HEIF and their relatives.
//!
//! A [`Parser`] turns a file or byte buffer into a [`File`], a tree of
//! [`BoxNode`]s. Types with a registered decoder get typed fields; every
//! other type is kept as an [`OpaqueBox`] holding its raw payload.

pub mod boxes;
pub mod container;
pub mod decoders;
pub mod display;
pub mod error;
pub mod json_api;
pub mod known_boxes;
pub mod parser;
pub mod registry;
pub mod stream;
pub mod util;

pub use boxes::{BoxHeader, BoxKey, BoxNode, FourCC, FullBoxHeader, IsoBox, OpaqueBox};
pub use container::{ContainerBox, File};
pub use display::Displayable;
pub use error::{ParseError, Result};
pub use json_api::{JsonBox, hex_payload, to_json, to_json_string};
pub use known_boxes::KnownBox;
pub use parser::{
    FILE_SIGNATURES, ParseOptions, Parser, StringType, parse_children, read_box, read_box_header,
};
pub use registry::{BoxConstructor, Registry, default_registry};
pub use stream::BinaryStream;
