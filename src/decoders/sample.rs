use crate::boxes::{BoxHeader, BoxNode, FourCC, FullBoxHeader, IsoBox};
use crate::display::prop;
use crate::error::Result;
use crate::parser::{Parser, parse_children};
use crate::stream::BinaryStream;

/// Sample Description Box. Sample entries are decoded as child boxes;
/// entry types nobody registered stay opaque.
#[derive(Debug, Default)]
pub struct Stsd {
    pub full: FullBoxHeader,
    pub entry_count: u32,
    children: Vec<BoxNode>,
}

impl IsoBox for Stsd {
    fn decode(
        &mut self,
        parser: &mut Parser,
        hdr: &BoxHeader,
        stream: &mut BinaryStream,
    ) -> Result<()> {
        self.full = FullBoxHeader::read(stream)?;
        self.entry_count = stream.read_u32()?;
        self.children = parse_children(parser, stream, &format!("box '{}'", hdr.typ))?;
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        let mut props = self.full.properties();
        props.push(prop("Entry Count", self.entry_count));
        props
    }

    fn children(&self) -> &[BoxNode] {
        &self.children
    }
}

/// Original Format Box (protected sample entries).
#[derive(Debug, Default, Clone)]
pub struct Frma {
    pub data_format: FourCC,
}

impl IsoBox for Frma {
    fn decode(&mut self, _: &mut Parser, _: &BoxHeader, stream: &mut BinaryStream) -> Result<()> {
        self.data_format = stream.read_fourcc()?;
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        vec![prop("Data Format", self.data_format)]
    }
}

/// Scheme Type Box.
#[derive(Debug, Default, Clone)]
pub struct Schm {
    pub full: FullBoxHeader,
    pub scheme_type: FourCC,
    pub scheme_version: u32,
    pub scheme_uri: Option<String>,
}

impl Schm {
    pub const URI_PRESENT: u32 = 0x000001;
}

impl IsoBox for Schm {
    fn decode(
        &mut self,
        parser: &mut Parser,
        _: &BoxHeader,
        stream: &mut BinaryStream,
    ) -> Result<()> {
        self.full = FullBoxHeader::read(stream)?;
        self.scheme_type = stream.read_fourcc()?;
        self.scheme_version = stream.read_u32()?;
        if self.full.has_flag(Self::URI_PRESENT) {
            self.scheme_uri = Some(stream.read_string(parser.string_type())?);
        }
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        let mut props = self.full.properties();
        props.push(prop("Scheme Type", self.scheme_type));
        props.push(prop("Scheme Version", format!("0x{:08x}", self.scheme_version)));
        if let Some(uri) = &self.scheme_uri {
            props.push(prop("Scheme URI", uri));
        }
        props
    }
}
