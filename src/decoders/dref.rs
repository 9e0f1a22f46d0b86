use crate::boxes::{BoxHeader, BoxNode, FullBoxHeader, IsoBox};
use crate::display::prop;
use crate::error::Result;
use crate::parser::{Parser, parse_children};
use crate::stream::BinaryStream;

/// Data Reference Box: an entry count followed by `url ` / `urn ` entries.
#[derive(Debug, Default)]
pub struct Dref {
    pub full: FullBoxHeader,
    pub entry_count: u32,
    children: Vec<BoxNode>,
}

impl IsoBox for Dref {
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

/// Flag marking a self-contained reference with no location string.
pub const SELF_CONTAINED: u32 = 0x000001;

#[derive(Debug, Default, Clone)]
pub struct Url {
    pub full: FullBoxHeader,
    pub location: String,
}

impl IsoBox for Url {
    fn decode(
        &mut self,
        parser: &mut Parser,
        _: &BoxHeader,
        stream: &mut BinaryStream,
    ) -> Result<()> {
        self.full = FullBoxHeader::read(stream)?;
        if stream.has_bytes_available() {
            self.location = stream.read_string(parser.string_type())?;
        }
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        let mut props = self.full.properties();
        if self.full.has_flag(SELF_CONTAINED) && self.location.is_empty() {
            props.push(prop("Location", "(self-contained)"));
        } else {
            props.push(prop("Location", &self.location));
        }
        props
    }
}

#[derive(Debug, Default, Clone)]
pub struct Urn {
    pub full: FullBoxHeader,
    pub name: String,
    pub location: String,
}

impl IsoBox for Urn {
    fn decode(
        &mut self,
        parser: &mut Parser,
        _: &BoxHeader,
        stream: &mut BinaryStream,
    ) -> Result<()> {
        self.full = FullBoxHeader::read(stream)?;
        if stream.has_bytes_available() {
            self.name = stream.read_string(parser.string_type())?;
        }
        if stream.has_bytes_available() {
            self.location = stream.read_string(parser.string_type())?;
        }
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        let mut props = self.full.properties();
        props.push(prop("Name", &self.name));
        props.push(prop("Location", &self.location));
        props
    }
}
