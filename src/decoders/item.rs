use crate::boxes::{BoxHeader, BoxNode, FourCC, FullBoxHeader, IsoBox};
use crate::display::{Displayable, prop};
use crate::error::{ParseError, Result};
use crate::parser::{Parser, parse_children, parse_children_with};
use crate::stream::BinaryStream;

/// Info key under which `iref` publishes its version to its children.
pub const IREF_VERSION_KEY: &str = "iref.version";

/// Meta Box: a full box whose payload continues as child boxes.
#[derive(Debug, Default)]
pub struct Meta {
    pub full: FullBoxHeader,
    children: Vec<BoxNode>,
}

impl IsoBox for Meta {
    fn decode(
        &mut self,
        parser: &mut Parser,
        hdr: &BoxHeader,
        stream: &mut BinaryStream,
    ) -> Result<()> {
        self.full = FullBoxHeader::read(stream)?;
        self.children = parse_children(parser, stream, &format!("box '{}'", hdr.typ))?;
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        self.full.properties()
    }

    fn children(&self) -> &[BoxNode] {
        &self.children
    }
}

/// Primary Item Box.
#[derive(Debug, Default, Clone)]
pub struct Pitm {
    pub full: FullBoxHeader,
    pub item_id: u32,
}

impl IsoBox for Pitm {
    fn decode(&mut self, _: &mut Parser, _: &BoxHeader, stream: &mut BinaryStream) -> Result<()> {
        self.full = FullBoxHeader::read(stream)?;
        self.item_id = if self.full.version == 0 {
            stream.read_u16()? as u32
        } else {
            stream.read_u32()?
        };
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        let mut props = self.full.properties();
        props.push(prop("Item ID", self.item_id));
        props
    }
}

/// Item Information Box: an entry count followed by `infe` children.
#[derive(Debug, Default)]
pub struct Iinf {
    pub full: FullBoxHeader,
    pub entry_count: u32,
    children: Vec<BoxNode>,
}

impl IsoBox for Iinf {
    fn decode(
        &mut self,
        parser: &mut Parser,
        hdr: &BoxHeader,
        stream: &mut BinaryStream,
    ) -> Result<()> {
        self.full = FullBoxHeader::read(stream)?;
        self.entry_count = if self.full.version == 0 {
            stream.read_u16()? as u32
        } else {
            stream.read_u32()?
        };
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

/// Item Info Entry.
#[derive(Debug, Default, Clone)]
pub struct Infe {
    pub full: FullBoxHeader,
    pub item_id: u32,
    pub item_protection_index: u16,
    /// Only present from version 2 on.
    pub item_type: Option<FourCC>,
    pub item_name: String,
    pub content_type: String,
    pub content_encoding: String,
    pub item_uri_type: String,
}

impl IsoBox for Infe {
    fn decode(
        &mut self,
        parser: &mut Parser,
        _: &BoxHeader,
        stream: &mut BinaryStream,
    ) -> Result<()> {
        let strings = parser.string_type();
        self.full = FullBoxHeader::read(stream)?;

        if self.full.version < 2 {
            self.item_id = stream.read_u16()? as u32;
            self.item_protection_index = stream.read_u16()?;
            self.item_name = stream.read_string(strings)?;
            self.content_type = stream.read_string(strings)?;
            if stream.has_bytes_available() {
                self.content_encoding = stream.read_string(strings)?;
            }
            return Ok(());
        }

        self.item_id = if self.full.version == 2 {
            stream.read_u16()? as u32
        } else {
            stream.read_u32()?
        };
        self.item_protection_index = stream.read_u16()?;
        let item_type = stream.read_fourcc()?;
        self.item_type = Some(item_type);
        self.item_name = stream.read_string(strings)?;

        if item_type.is("mime") {
            self.content_type = stream.read_string(strings)?;
            if stream.has_bytes_available() {
                self.content_encoding = stream.read_string(strings)?;
            }
        } else if item_type.is("uri ") {
            self.item_uri_type = stream.read_string(strings)?;
        }
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        let mut props = self.full.properties();
        props.push(prop("Item ID", self.item_id));
        props.push(prop("Item Protection Index", self.item_protection_index));
        if let Some(t) = self.item_type {
            props.push(prop("Item Type", t));
        }
        props.push(prop("Item Name", &self.item_name));
        if !self.content_type.is_empty() {
            props.push(prop("Content Type", &self.content_type));
        }
        if !self.content_encoding.is_empty() {
            props.push(prop("Content Encoding", &self.content_encoding));
        }
        if !self.item_uri_type.is_empty() {
            props.push(prop("Item URI Type", &self.item_uri_type));
        }
        props
    }
}

/// One extent of an item location.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub index: u64,
    pub offset: u64,
    pub length: u64,
}

impl Displayable for Extent {
    fn display_name(&self) -> String {
        "Extent".to_string()
    }

    fn display_properties(&self) -> Vec<(String, String)> {
        vec![
            prop("Index", self.index),
            prop("Offset", self.offset),
            prop("Length", self.length),
        ]
    }
}

/// Where the bytes of one item live.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ItemLocation {
    pub item_id: u32,
    pub construction_method: u8,
    pub data_reference_index: u16,
    pub base_offset: u64,
    pub extents: Vec<Extent>,
}

impl ItemLocation {
    /// Sum of all extent lengths.
    pub fn total_length(&self) -> u64 {
        self.extents.iter().map(|e| e.length).sum()
    }
}

impl Displayable for ItemLocation {
    fn display_name(&self) -> String {
        "Item".to_string()
    }

    fn display_properties(&self) -> Vec<(String, String)> {
        vec![
            prop("Item ID", self.item_id),
            prop("Construction Method", self.construction_method),
            prop("Data Reference Index", self.data_reference_index),
            prop("Base Offset", self.base_offset),
            prop("Extent Count", self.extents.len()),
        ]
    }

    fn nested(&self) -> Vec<&dyn Displayable> {
        self.extents.iter().map(|e| e as &dyn Displayable).collect()
    }
}

/// Item Location Box.
#[derive(Debug, Default, Clone)]
pub struct Iloc {
    pub full: FullBoxHeader,
    pub offset_size: u8,
    pub length_size: u8,
    pub base_offset_size: u8,
    pub index_size: u8,
    pub items: Vec<ItemLocation>,
}

impl Iloc {
    pub fn item(&self, item_id: u32) -> Option<&ItemLocation> {
        self.items.iter().find(|i| i.item_id == item_id)
    }
}

impl IsoBox for Iloc {
    fn decode(&mut self, _: &mut Parser, hdr: &BoxHeader, stream: &mut BinaryStream) -> Result<()> {
        self.full = FullBoxHeader::read(stream)?;
        let version = self.full.version;

        let sizes = stream.read_u8()?;
        self.offset_size = sizes >> 4;
        self.length_size = sizes & 0x0f;
        let sizes = stream.read_u8()?;
        self.base_offset_size = sizes >> 4;
        // reserved in version 0
        self.index_size = if version == 1 || version == 2 {
            sizes & 0x0f
        } else {
            0
        };

        for width in [
            self.offset_size,
            self.length_size,
            self.base_offset_size,
            self.index_size,
        ] {
            if !matches!(width, 0 | 4 | 8) {
                return Err(ParseError::malformed(
                    hdr.typ,
                    hdr.start,
                    format!("unsupported field width {width}"),
                ));
            }
        }

        let item_count = if version < 2 {
            stream.read_u16()? as u32
        } else {
            stream.read_u32()?
        };

        self.items = Vec::with_capacity(item_count.min(1024) as usize);
        for _ in 0..item_count {
            let mut item = ItemLocation {
                item_id: if version < 2 {
                    stream.read_u16()? as u32
                } else {
                    stream.read_u32()?
                },
                ..Default::default()
            };
            if version == 1 || version == 2 {
                item.construction_method = (stream.read_u16()? & 0x0f) as u8;
            }
            item.data_reference_index = stream.read_u16()?;
            item.base_offset = read_width(stream, self.base_offset_size)?;

            let extent_count = stream.read_u16()?;
            for _ in 0..extent_count {
                let index = if self.index_size > 0 {
                    read_width(stream, self.index_size)?
                } else {
                    0
                };
                let offset = read_width(stream, self.offset_size)?;
                let length = read_width(stream, self.length_size)?;
                item.extents.push(Extent {
                    index,
                    offset,
                    length,
                });
            }
            self.items.push(item);
        }
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        let mut props = self.full.properties();
        props.extend([
            prop("Offset Size", self.offset_size),
            prop("Length Size", self.length_size),
            prop("Base Offset Size", self.base_offset_size),
            prop("Index Size", self.index_size),
            prop("Item Count", self.items.len()),
        ]);
        props
    }

    fn objects(&self) -> Vec<&dyn Displayable> {
        self.items.iter().map(|i| i as &dyn Displayable).collect()
    }
}

// widths were validated up front
fn read_width(stream: &mut BinaryStream, width: u8) -> Result<u64> {
    Ok(stream.read_sized(width)?.unwrap_or(0))
}

/// Item Reference Box.
///
/// Every child is decoded as a [`SingleItemReference`] unless its type has a
/// registered constructor. Children size their item ids from this box's
/// version, which they find under [`IREF_VERSION_KEY`] in the parser info.
#[derive(Debug, Default)]
pub struct Iref {
    pub full: FullBoxHeader,
    children: Vec<BoxNode>,
}

impl Iref {
    /// All references of the given type, e.g. `"thmb"`.
    pub fn references<'a>(
        &'a self,
        typ: &'a str,
    ) -> impl Iterator<Item = &'a SingleItemReference> + 'a {
        self.children
            .iter()
            .filter(move |c| c.typ().is(typ))
            .filter_map(|c| c.get::<SingleItemReference>())
    }
}

impl IsoBox for Iref {
    fn decode(
        &mut self,
        parser: &mut Parser,
        hdr: &BoxHeader,
        stream: &mut BinaryStream,
    ) -> Result<()> {
        self.full = FullBoxHeader::read(stream)?;

        let outer = parser.info::<u8>(IREF_VERSION_KEY).copied();
        parser.set_info(IREF_VERSION_KEY, self.full.version);

        let context = format!("box '{}'", hdr.typ);
        let children = parse_children_with(parser, stream, &context, |p, h| {
            if p.registry().contains(&h.key()) {
                p.registry().create_for_header(h)
            } else {
                Box::new(SingleItemReference::default()) as Box<dyn IsoBox>
            }
        });

        match outer {
            Some(v) => parser.set_info(IREF_VERSION_KEY, v),
            None => parser.remove_info(IREF_VERSION_KEY),
        }

        self.children = children?;
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        self.full.properties()
    }

    fn children(&self) -> &[BoxNode] {
        &self.children
    }
}

/// One typed reference from an item to a list of other items.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SingleItemReference {
    pub from_item_id: u32,
    pub to_item_ids: Vec<u32>,
}

pub type Dimg = SingleItemReference;
pub type Thmb = SingleItemReference;
pub type Cdsc = SingleItemReference;

impl IsoBox for SingleItemReference {
    fn decode(
        &mut self,
        parser: &mut Parser,
        _: &BoxHeader,
        stream: &mut BinaryStream,
    ) -> Result<()> {
        let wide = parser.info::<u8>(IREF_VERSION_KEY).is_some_and(|&v| v != 0);
        let read_id = |s: &mut BinaryStream| -> Result<u32> {
            if wide {
                s.read_u32()
            } else {
                s.read_u16().map(u32::from)
            }
        };

        self.from_item_id = read_id(stream)?;
        let count = stream.read_u16()?;
        self.to_item_ids = (0..count)
            .map(|_| read_id(stream))
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        let ids: Vec<String> = self.to_item_ids.iter().map(u32::to_string).collect();
        vec![
            prop("From Item ID", self.from_item_id),
            prop("Reference Count", self.to_item_ids.len()),
            prop("To Item IDs", ids.join(", ")),
        ]
    }
}
