use crate::boxes::{BoxHeader, BoxKey, BoxNode, FourCC, IsoBox};
use crate::container::File;
use crate::error::{ParseError, Result};
use crate::registry::Registry;
use crate::stream::BinaryStream;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::ops::BitOr;
use std::path::Path;
use std::sync::Arc;

/// Smallest possible box: 32-bit size plus type code.
pub const MIN_HEADER_SIZE: u64 = 8;

/// Top-level types a file may start with.
pub const FILE_SIGNATURES: [&[u8; 4]; 8] = [
    b"ftyp", b"sinf", b"wide", b"free", b"skip", b"mdat", b"moov", b"pnot",
];

/// How string fields are encoded in string-bearing boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringType {
    /// C-style, NUL terminated (ISO files).
    #[default]
    NullTerminated,
    /// One length byte followed by the characters (QuickTime files).
    Pascal,
}

/// Bit set of parse options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions(u64);

impl ParseOptions {
    pub const NONE: ParseOptions = ParseOptions(0);
    /// Do not keep the payload of `mdat` boxes in memory.
    pub const SKIP_MDAT_DATA: ParseOptions = ParseOptions(1 << 0);

    pub fn bits(self) -> u64 {
        self.0
    }

    pub fn from_bits(bits: u64) -> Self {
        ParseOptions(bits)
    }

    pub fn contains(self, other: ParseOptions) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: ParseOptions) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: ParseOptions) {
        self.0 &= !other.0;
    }
}

impl BitOr for ParseOptions {
    type Output = ParseOptions;

    fn bitor(self, rhs: ParseOptions) -> ParseOptions {
        ParseOptions(self.0 | rhs.0)
    }
}

/// Entry point of the library.
///
/// A parser owns its box registry and the per-parse settings that leaf
/// decoders consult (string type, options, and a free-form info map).
/// Separate parsers share no mutable state.
///
/// ```
/// use isobmff::Parser;
///
/// let mut data = Vec::new();
/// data.extend_from_slice(&16u32.to_be_bytes());
/// data.extend_from_slice(b"ftypisom");
/// data.extend_from_slice(&0u32.to_be_bytes());
///
/// let file = Parser::new().parse_data(data)?;
/// assert_eq!(file.boxes().len(), 1);
/// # Ok::<(), isobmff::ParseError>(())
/// ```
pub struct Parser {
    registry: Registry,
    string_type: StringType,
    options: ParseOptions,
    info: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Parser {
    /// A parser with the default registry.
    pub fn new() -> Self {
        Self {
            registry: Registry::with_defaults(),
            string_type: StringType::default(),
            options: ParseOptions::NONE,
            info: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Register (or replace) the constructor used for `typ`.
    pub fn register_box<F>(&mut self, typ: &str, ctor: F) -> Result<()>
    where
        F: Fn() -> Box<dyn IsoBox> + Send + Sync + 'static,
    {
        self.registry.register_box(typ, ctor)
    }

    /// Register `typ` as a plain container of boxes.
    pub fn register_container_box(&mut self, typ: &str) -> Result<()> {
        self.registry.register_container_box(typ)
    }

    pub fn create_box(&self, key: &BoxKey) -> Box<dyn IsoBox> {
        self.registry.create_box(key)
    }

    pub fn string_type(&self) -> StringType {
        self.string_type
    }

    pub fn set_string_type(&mut self, value: StringType) {
        self.string_type = value;
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    pub fn set_options(&mut self, value: ParseOptions) {
        self.options = value;
    }

    pub fn add_option(&mut self, option: ParseOptions) {
        self.options.insert(option);
    }

    pub fn remove_option(&mut self, option: ParseOptions) {
        self.options.remove(option);
    }

    pub fn has_option(&self, option: ParseOptions) -> bool {
        self.options.contains(option)
    }

    /// Value stored under `key`, if any and if it is a `T`.
    pub fn info<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.info.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn set_info<T: Any + Send + Sync>(&mut self, key: &str, value: T) {
        self.info.insert(key.to_string(), Arc::new(value));
    }

    pub fn remove_info(&mut self, key: &str) {
        self.info.remove(key);
    }

    /// Parse a file from disk.
    ///
    /// A file that cannot be read is rejected like an empty one.
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<File> {
        let path = path.as_ref();
        let mut stream = BinaryStream::open(path).map_err(|e| {
            ParseError::InputRejected(format!("cannot read {}: {e}", path.display()))
        })?;
        self.parse(&mut stream)
    }

    /// Parse an in-memory buffer.
    pub fn parse_data(&mut self, data: impl Into<Vec<u8>>) -> Result<File> {
        let mut stream = BinaryStream::from_vec(data.into());
        self.parse(&mut stream)
    }

    /// Parse the remainder of `stream` as an ISO media file.
    ///
    /// The first box must be one of [`FILE_SIGNATURES`]; nothing is decoded
    /// otherwise.
    pub fn parse(&mut self, stream: &mut BinaryStream) -> Result<File> {
        if !stream.has_bytes_available() {
            return Err(ParseError::InputRejected("no data to read".into()));
        }

        let signature = match stream.peek(MIN_HEADER_SIZE) {
            Ok(head) => [head[4], head[5], head[6], head[7]],
            Err(_) => [0; 4],
        };
        if !FILE_SIGNATURES.iter().any(|s| **s == signature) {
            return Err(ParseError::InputRejected(format!(
                "not an ISO media file (first box '{}')",
                FourCC(signature)
            )));
        }

        let mut file = File::default();
        file.decode(self, stream)?;
        tracing::debug!(boxes = file.boxes().len(), "parsed file");
        Ok(file)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// A copy gets its own registry: custom registrations are carried over and
// the defaults are seeded again on top of them.
impl Clone for Parser {
    fn clone(&self) -> Self {
        let mut registry = self.registry.clone();
        registry.register_defaults();
        Self {
            registry,
            string_type: self.string_type,
            options: self.options,
            info: self.info.clone(),
        }
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("registry", &self.registry)
            .field("string_type", &self.string_type)
            .field("options", &self.options)
            .field("info", &self.info.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Frame the next box header: size, type, optional 64-bit size and
/// optional user type. A size of 0 is resolved against what is left in the
/// stream's scope.
pub fn read_box_header(stream: &mut BinaryStream) -> Result<BoxHeader> {
    let start = stream.position();
    let size32 = stream.read_u32()?;
    let typ = stream.read_fourcc()?;

    let mut size = size32 as u64;
    if size32 == 1 {
        size = stream.read_u64()?;
    }

    let mut uuid = None;
    if typ == FourCC::UUID {
        uuid = Some(stream.read_array::<16>()?);
    }

    let header_size = stream.position() - start;

    if size32 == 0 {
        size = header_size + stream.remaining();
    } else if size < header_size {
        return Err(ParseError::malformed(
            typ,
            start,
            format!("declared size {size} is smaller than its {header_size}-byte header"),
        ));
    }

    Ok(BoxHeader {
        start,
        size32,
        size,
        typ,
        uuid,
        header_size,
    })
}

/// Frame one box, build it through the registry and decode it against a
/// view of exactly its payload. On return `stream` sits at the end of the
/// box whatever the decoder consumed.
pub fn read_box(parser: &mut Parser, stream: &mut BinaryStream) -> Result<BoxNode> {
    read_box_with(parser, stream, |p, h| p.registry().create_for_header(h))
}

pub(crate) fn read_box_with<F>(
    parser: &mut Parser,
    stream: &mut BinaryStream,
    make: F,
) -> Result<BoxNode>
where
    F: Fn(&Parser, &BoxHeader) -> Box<dyn IsoBox>,
{
    let hdr = read_box_header(stream)?;
    let payload_size = hdr.payload_size();
    tracing::debug!(offset = hdr.start, typ = %hdr.typ, size = hdr.size, "box");

    let mut payload = stream.sub_stream(payload_size)?;
    let mut body = make(parser, &hdr);
    body.decode(parser, &hdr, &mut payload)?;

    if payload.has_bytes_available() {
        tracing::debug!(
            typ = %hdr.typ,
            unread = payload.remaining(),
            "skipping bytes left by decoder"
        );
    }
    stream.skip(payload_size)?;

    Ok(BoxNode { hdr, body })
}

/// Decode boxes until the scope of `stream` is exhausted.
///
/// `context` names the owner in error messages. Fewer than
/// [`MIN_HEADER_SIZE`] trailing bytes cannot hold a box and are rejected.
pub fn parse_children(
    parser: &mut Parser,
    stream: &mut BinaryStream,
    context: &str,
) -> Result<Vec<BoxNode>> {
    parse_children_with(parser, stream, context, |p, h| {
        p.registry().create_for_header(h)
    })
}

pub(crate) fn parse_children_with<F>(
    parser: &mut Parser,
    stream: &mut BinaryStream,
    context: &str,
    make: F,
) -> Result<Vec<BoxNode>>
where
    F: Fn(&Parser, &BoxHeader) -> Box<dyn IsoBox>,
{
    let mut kids = Vec::new();
    loop {
        let remaining = stream.remaining();
        if remaining == 0 {
            break;
        }
        if remaining < MIN_HEADER_SIZE {
            return Err(ParseError::MalformedBox {
                context: context.to_string(),
                offset: stream.position(),
                reason: format!("{remaining} trailing bytes cannot hold a box header"),
            });
        }
        kids.push(read_box_with(parser, stream, &make)?);
    }
    Ok(kids)
}
