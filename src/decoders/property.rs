use crate::boxes::{BoxHeader, BoxNode, FourCC, FullBoxHeader, IsoBox};
use crate::display::{Displayable, prop};
use crate::error::Result;
use crate::parser::{Parser, parse_children};
use crate::stream::BinaryStream;

/// Image Rotation property.
#[derive(Debug, Default, Clone)]
pub struct Irot {
    /// Anti-clockwise rotation in units of 90 degrees.
    pub angle: u8,
}

impl Irot {
    pub fn degrees(&self) -> u16 {
        self.angle as u16 * 90
    }
}

impl IsoBox for Irot {
    fn decode(&mut self, _: &mut Parser, _: &BoxHeader, stream: &mut BinaryStream) -> Result<()> {
        self.angle = stream.read_u8()? & 0x03;
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        vec![prop("Angle", self.degrees())]
    }
}

/// One array of parameter-set NAL units in an HEVC configuration record.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NalArray {
    pub array_completeness: bool,
    pub nal_unit_type: u8,
    pub nal_units: Vec<Vec<u8>>,
}

impl Displayable for NalArray {
    fn display_name(&self) -> String {
        "NAL Array".to_string()
    }

    fn display_properties(&self) -> Vec<(String, String)> {
        let mut props = vec![
            prop("Array Completeness", self.array_completeness),
            prop("NAL Unit Type", self.nal_unit_type),
            prop("NAL Unit Count", self.nal_units.len()),
        ];
        for nal in &self.nal_units {
            props.push(prop("NAL Unit", hex::encode(nal)));
        }
        props
    }
}

/// HEVC Decoder Configuration Record.
#[derive(Debug, Default, Clone)]
pub struct Hvcc {
    pub configuration_version: u8,
    pub general_profile_space: u8,
    pub general_tier_flag: bool,
    pub general_profile_idc: u8,
    pub general_profile_compatibility_flags: u32,
    /// 48 bits.
    pub general_constraint_indicator_flags: u64,
    pub general_level_idc: u8,
    pub min_spatial_segmentation_idc: u16,
    pub parallelism_type: u8,
    pub chroma_format_idc: u8,
    pub bit_depth_luma_minus8: u8,
    pub bit_depth_chroma_minus8: u8,
    pub avg_frame_rate: u16,
    pub constant_frame_rate: u8,
    pub num_temporal_layers: u8,
    pub temporal_id_nested: bool,
    pub length_size_minus_one: u8,
    pub arrays: Vec<NalArray>,
}

impl IsoBox for Hvcc {
    fn decode(&mut self, _: &mut Parser, _: &BoxHeader, stream: &mut BinaryStream) -> Result<()> {
        self.configuration_version = stream.read_u8()?;

        let b = stream.read_u8()?;
        self.general_profile_space = b >> 6;
        self.general_tier_flag = (b >> 5) & 0x1 != 0;
        self.general_profile_idc = b & 0x1f;
        self.general_profile_compatibility_flags = stream.read_u32()?;

        let flags: [u8; 6] = stream.read_array()?;
        self.general_constraint_indicator_flags =
            flags.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64);

        self.general_level_idc = stream.read_u8()?;
        self.min_spatial_segmentation_idc = stream.read_u16()? & 0x0fff;
        self.parallelism_type = stream.read_u8()? & 0x03;
        self.chroma_format_idc = stream.read_u8()? & 0x03;
        self.bit_depth_luma_minus8 = stream.read_u8()? & 0x07;
        self.bit_depth_chroma_minus8 = stream.read_u8()? & 0x07;
        self.avg_frame_rate = stream.read_u16()?;

        let b = stream.read_u8()?;
        self.constant_frame_rate = b >> 6;
        self.num_temporal_layers = (b >> 3) & 0x07;
        self.temporal_id_nested = (b >> 2) & 0x01 != 0;
        self.length_size_minus_one = b & 0x03;

        let num_arrays = stream.read_u8()?;
        self.arrays = Vec::with_capacity(num_arrays as usize);
        for _ in 0..num_arrays {
            let b = stream.read_u8()?;
            let num_nalus = stream.read_u16()?;
            let mut nal_units = Vec::with_capacity(num_nalus as usize);
            for _ in 0..num_nalus {
                let len = stream.read_u16()?;
                nal_units.push(stream.read_bytes(len as u64)?);
            }
            self.arrays.push(NalArray {
                array_completeness: b & 0x80 != 0,
                nal_unit_type: b & 0x3f,
                nal_units,
            });
        }
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        vec![
            prop("Configuration Version", self.configuration_version),
            prop("General Profile Space", self.general_profile_space),
            prop("General Tier Flag", self.general_tier_flag),
            prop("General Profile IDC", self.general_profile_idc),
            prop(
                "General Profile Compatibility Flags",
                format!("0x{:08x}", self.general_profile_compatibility_flags),
            ),
            prop(
                "General Constraint Indicator Flags",
                format!("0x{:012x}", self.general_constraint_indicator_flags),
            ),
            prop("General Level IDC", self.general_level_idc),
            prop("Min Spatial Segmentation IDC", self.min_spatial_segmentation_idc),
            prop("Parallelism Type", self.parallelism_type),
            prop("Chroma Format IDC", self.chroma_format_idc),
            prop("Bit Depth Luma Minus 8", self.bit_depth_luma_minus8),
            prop("Bit Depth Chroma Minus 8", self.bit_depth_chroma_minus8),
            prop("Avg Frame Rate", self.avg_frame_rate),
            prop("Constant Frame Rate", self.constant_frame_rate),
            prop("Num Temporal Layers", self.num_temporal_layers),
            prop("Temporal ID Nested", self.temporal_id_nested),
            prop("Length Size Minus One", self.length_size_minus_one),
            prop("Array Count", self.arrays.len()),
        ]
    }

    fn objects(&self) -> Vec<&dyn Displayable> {
        self.arrays.iter().map(|a| a as &dyn Displayable).collect()
    }
}

/// Colour Information property.
#[derive(Debug, Default, Clone)]
pub struct Colr {
    pub colour_type: FourCC,
    pub colour_primaries: u16,
    pub transfer_characteristics: u16,
    pub matrix_coefficients: u16,
    pub full_range: bool,
    /// Raw profile for `rICC` / `prof` colour types.
    pub icc_profile: Vec<u8>,
}

impl Colr {
    pub fn is_nclx(&self) -> bool {
        self.colour_type.is("nclx")
    }
}

impl IsoBox for Colr {
    fn decode(&mut self, _: &mut Parser, _: &BoxHeader, stream: &mut BinaryStream) -> Result<()> {
        self.colour_type = stream.read_fourcc()?;
        if self.is_nclx() {
            self.colour_primaries = stream.read_u16()?;
            self.transfer_characteristics = stream.read_u16()?;
            self.matrix_coefficients = stream.read_u16()?;
            self.full_range = stream.read_u8()? & 0x80 != 0;
        } else {
            self.icc_profile = stream.read_to_end()?;
        }
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        let mut props = vec![prop("Colour Type", self.colour_type)];
        if self.is_nclx() {
            props.extend([
                prop("Colour Primaries", self.colour_primaries),
                prop("Transfer Characteristics", self.transfer_characteristics),
                prop("Matrix Coefficients", self.matrix_coefficients),
                prop("Full Range", self.full_range),
            ]);
        } else {
            props.push(prop("ICC Profile Size", self.icc_profile.len()));
        }
        props
    }
}

/// Image Spatial Extents property.
#[derive(Debug, Default, Clone)]
pub struct Ispe {
    pub full: FullBoxHeader,
    pub width: u32,
    pub height: u32,
}

impl IsoBox for Ispe {
    fn decode(&mut self, _: &mut Parser, _: &BoxHeader, stream: &mut BinaryStream) -> Result<()> {
        self.full = FullBoxHeader::read(stream)?;
        self.width = stream.read_u32()?;
        self.height = stream.read_u32()?;
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        let mut props = self.full.properties();
        props.push(prop("Width", self.width));
        props.push(prop("Height", self.height));
        props
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Association {
    pub essential: bool,
    /// 1-based index into `ipco`; 0 means no property.
    pub property_index: u16,
}

impl Displayable for Association {
    fn display_name(&self) -> String {
        "Association".to_string()
    }

    fn display_properties(&self) -> Vec<(String, String)> {
        vec![
            prop("Essential", self.essential),
            prop("Property Index", self.property_index),
        ]
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IpmaEntry {
    pub item_id: u32,
    pub associations: Vec<Association>,
}

impl Displayable for IpmaEntry {
    fn display_name(&self) -> String {
        "Entry".to_string()
    }

    fn display_properties(&self) -> Vec<(String, String)> {
        vec![
            prop("Item ID", self.item_id),
            prop("Association Count", self.associations.len()),
        ]
    }

    fn nested(&self) -> Vec<&dyn Displayable> {
        self.associations
            .iter()
            .map(|a| a as &dyn Displayable)
            .collect()
    }
}

/// Item Property Association Box.
#[derive(Debug, Default, Clone)]
pub struct Ipma {
    pub full: FullBoxHeader,
    pub entries: Vec<IpmaEntry>,
}

impl Ipma {
    /// Flag selecting 16-bit associations with a 15-bit property index.
    pub const LARGE_PROPERTY_INDEX: u32 = 0x000001;

    pub fn entry(&self, item_id: u32) -> Option<&IpmaEntry> {
        self.entries.iter().find(|e| e.item_id == item_id)
    }
}

impl IsoBox for Ipma {
    fn decode(&mut self, _: &mut Parser, _: &BoxHeader, stream: &mut BinaryStream) -> Result<()> {
        self.full = FullBoxHeader::read(stream)?;
        let large = self.full.has_flag(Self::LARGE_PROPERTY_INDEX);

        let entry_count = stream.read_u32()?;
        self.entries = Vec::with_capacity(entry_count.min(1024) as usize);
        for _ in 0..entry_count {
            let item_id = if self.full.version < 1 {
                stream.read_u16()? as u32
            } else {
                stream.read_u32()?
            };
            let count = stream.read_u8()?;
            let mut associations = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let assoc = if large {
                    let v = stream.read_u16()?;
                    Association {
                        essential: v & 0x8000 != 0,
                        property_index: v & 0x7fff,
                    }
                } else {
                    let v = stream.read_u8()?;
                    Association {
                        essential: v & 0x80 != 0,
                        property_index: (v & 0x7f) as u16,
                    }
                };
                associations.push(assoc);
            }
            self.entries.push(IpmaEntry {
                item_id,
                associations,
            });
        }
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        let mut props = self.full.properties();
        props.push(prop("Entry Count", self.entries.len()));
        props
    }

    fn objects(&self) -> Vec<&dyn Displayable> {
        self.entries.iter().map(|e| e as &dyn Displayable).collect()
    }
}

/// Pixel Information property.
#[derive(Debug, Default, Clone)]
pub struct Pixi {
    pub full: FullBoxHeader,
    pub bits_per_channel: Vec<u8>,
}

impl IsoBox for Pixi {
    fn decode(&mut self, _: &mut Parser, _: &BoxHeader, stream: &mut BinaryStream) -> Result<()> {
        self.full = FullBoxHeader::read(stream)?;
        let channels = stream.read_u8()?;
        self.bits_per_channel = stream.read_bytes(channels as u64)?;
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        let bits: Vec<String> = self.bits_per_channel.iter().map(u8::to_string).collect();
        let mut props = self.full.properties();
        props.push(prop("Channels", self.bits_per_channel.len()));
        props.push(prop("Bits Per Channel", bits.join(", ")));
        props
    }
}

/// Item Property Container: the properties `ipma` indexes into.
#[derive(Debug, Default)]
pub struct Ipco {
    children: Vec<BoxNode>,
}

impl Ipco {
    /// Property at a 1-based `ipma` index.
    pub fn property(&self, index: u16) -> Option<&BoxNode> {
        (index as usize)
            .checked_sub(1)
            .and_then(|i| self.children.get(i))
    }
}

impl IsoBox for Ipco {
    fn decode(
        &mut self,
        parser: &mut Parser,
        hdr: &BoxHeader,
        stream: &mut BinaryStream,
    ) -> Result<()> {
        self.children = parse_children(parser, stream, &format!("box '{}'", hdr.typ))?;
        Ok(())
    }

    fn children(&self) -> &[BoxNode] {
        &self.children
    }
}
