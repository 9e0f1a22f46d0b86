use crate::display::{Displayable, prop};
use crate::error::{ParseError, Result};
use crate::parser::{ParseOptions, Parser};
use crate::stream::BinaryStream;
use serde::{Serialize, Serializer};
use std::any::Any;
use std::fmt;
use std::str::FromStr;

/// A four-character box type code.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub const UUID: FourCC = FourCC(*b"uuid");

    /// Printable form; bytes outside the ASCII graphic range become '.'.
    pub fn as_str_lossy(&self) -> String {
        self.0
            .iter()
            .map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect()
    }

    pub fn is(&self, code: &str) -> bool {
        self.0 == code.as_bytes()
    }
}

impl FromStr for FourCC {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        let b: [u8; 4] = s
            .as_bytes()
            .try_into()
            .map_err(|_| ParseError::InvalidTypeCode(s.to_string()))?;
        Ok(FourCC(b))
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str_lossy())
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str_lossy())
    }
}

impl Serialize for FourCC {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// Registry lookup key: a plain type code, or the 16-byte user type of a
/// `uuid` box.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BoxKey {
    FourCC(FourCC),
    Uuid([u8; 16]),
}

/// Framing information common to every box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxHeader {
    /// Absolute offset of the first header byte.
    pub start: u64,
    /// The 32-bit size field as stored: 0 means "to the end of the enclosing
    /// scope", 1 means a 64-bit size follows the type.
    pub size32: u32,
    /// Effective total size, header included.
    pub size: u64,
    pub typ: FourCC,
    pub uuid: Option<[u8; 16]>,
    /// 8, 16, 24 or 32 bytes.
    pub header_size: u64,
}

impl BoxHeader {
    pub fn payload_size(&self) -> u64 {
        self.size.saturating_sub(self.header_size)
    }

    /// Absolute offset one past the last byte of this box.
    pub fn end(&self) -> u64 {
        self.start + self.size
    }

    pub fn extends_to_end(&self) -> bool {
        self.size32 == 0
    }

    pub fn has_large_size(&self) -> bool {
        self.size32 == 1
    }

    pub fn key(&self) -> BoxKey {
        match self.uuid {
            Some(u) => BoxKey::Uuid(u),
            None => BoxKey::FourCC(self.typ),
        }
    }
}

/// Version and flags prefix of a full box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FullBoxHeader {
    pub version: u8,
    pub flags: u32,
}

impl FullBoxHeader {
    pub fn read(stream: &mut BinaryStream) -> Result<Self> {
        let version = stream.read_u8()?;
        let flags = stream.read_u24()?;
        Ok(Self { version, flags })
    }

    pub fn has_flag(&self, mask: u32) -> bool {
        self.flags & mask != 0
    }

    pub fn properties(&self) -> Vec<(String, String)> {
        vec![
            prop("Version", self.version),
            prop("Flags", format!("0x{:06x}", self.flags)),
        ]
    }
}

#[doc(hidden)]
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Decode contract implemented by every box kind.
///
/// The registry builds a default instance, then the framing code calls
/// [`IsoBox::decode`] once with a stream scoped to exactly the box payload.
/// Bytes a decoder leaves unread are skipped by the caller.
pub trait IsoBox: AsAny + fmt::Debug + Send + Sync {
    fn decode(
        &mut self,
        parser: &mut Parser,
        hdr: &BoxHeader,
        stream: &mut BinaryStream,
    ) -> Result<()>;

    /// Ordered field descriptions used by the display facility.
    fn properties(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Child boxes, for container kinds.
    fn children(&self) -> &[BoxNode] {
        &[]
    }

    /// Non-box sub-records worth displaying (table entries and the like).
    fn objects(&self) -> Vec<&dyn Displayable> {
        Vec::new()
    }
}

impl dyn IsoBox {
    pub fn downcast_ref<T: IsoBox>(&self) -> Option<&T> {
        let any: &dyn Any = AsAny::as_any(self);
        any.downcast_ref::<T>()
    }

    pub fn is<T: IsoBox>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }
}

/// A framed, decoded box: its header plus its kind-specific body.
#[derive(Debug)]
pub struct BoxNode {
    pub hdr: BoxHeader,
    pub body: Box<dyn IsoBox>,
}

impl BoxNode {
    pub fn typ(&self) -> FourCC {
        self.hdr.typ
    }

    /// Typed view of the body, if it is a `T`.
    pub fn get<T: IsoBox>(&self) -> Option<&T> {
        self.body.as_ref().downcast_ref::<T>()
    }

    pub fn children(&self) -> &[BoxNode] {
        self.body.children()
    }

    /// First direct child of the given type.
    pub fn find(&self, typ: &str) -> Option<&BoxNode> {
        self.children().iter().find(|b| b.typ().is(typ))
    }

    /// All direct children of the given type, in source order.
    pub fn boxes_of_type<'a>(&'a self, typ: &'a str) -> impl Iterator<Item = &'a BoxNode> + 'a {
        self.children().iter().filter(move |b| b.typ().is(typ))
    }

    /// First direct child of the given type whose body is a `T`.
    pub fn typed_box<T: IsoBox>(&self, typ: &str) -> Option<&T> {
        self.children()
            .iter()
            .filter(|b| b.typ().is(typ))
            .find_map(|b| b.get::<T>())
    }

    /// Every direct child of the given type whose body is a `T`.
    pub fn typed_boxes<'a, T: IsoBox>(&'a self, typ: &'a str) -> impl Iterator<Item = &'a T> + 'a {
        self.boxes_of_type(typ).filter_map(|b| b.get::<T>())
    }
}

/// Fallback for types nobody registered: keeps the raw payload so that
/// nothing is lost for unknown or future box types.
#[derive(Debug, Default)]
pub struct OpaqueBox {
    data: Vec<u8>,
    skipped: u64,
}

impl OpaqueBox {
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Payload bytes that were skipped instead of retained
    /// (see [`ParseOptions::SKIP_MDAT_DATA`]).
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

impl IsoBox for OpaqueBox {
    fn decode(
        &mut self,
        parser: &mut Parser,
        hdr: &BoxHeader,
        stream: &mut BinaryStream,
    ) -> Result<()> {
        if hdr.typ.is("mdat") && parser.has_option(ParseOptions::SKIP_MDAT_DATA) {
            self.skipped = stream.remaining();
            return Ok(());
        }
        self.data = stream.read_to_end()?;
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        const PREVIEW: usize = 16;
        let mut props = vec![prop("Data Size", self.data.len() as u64 + self.skipped)];
        if !self.data.is_empty() {
            let n = self.data.len().min(PREVIEW);
            let mut preview = hex::encode(&self.data[..n]);
            if self.data.len() > PREVIEW {
                preview.push_str("...");
            }
            props.push(prop("Data", preview));
        }
        props
    }
}
