use crate::boxes::{BoxHeader, FullBoxHeader, IsoBox};
use crate::display::{Displayable, prop};
use crate::error::Result;
use crate::parser::Parser;
use crate::stream::BinaryStream;

/// One 12-byte entry of a segment index: a referenced subsegment or a
/// nested index.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceObject {
    reference_type: bool,
    reference_size: u32,
    subsegment_duration: u32,
    starts_with_sap: bool,
    sap_type: u8,
    sap_delta_time: u32,
}

impl ReferenceObject {
    pub fn read(stream: &mut BinaryStream) -> Result<Self> {
        let word = stream.read_u32()?;
        let subsegment_duration = stream.read_u32()?;
        let sap = stream.read_u32()?;
        Ok(Self {
            reference_type: word >> 31 != 0,
            reference_size: word & 0x7fff_ffff,
            subsegment_duration,
            starts_with_sap: sap >> 31 != 0,
            sap_type: (sap >> 28) as u8,
            sap_delta_time: sap & 0x0fff_ffff,
        })
    }

    /// `true` when the entry points at another `sidx` rather than media.
    pub fn reference_type(&self) -> bool {
        self.reference_type
    }

    pub fn reference_size(&self) -> u32 {
        self.reference_size
    }

    pub fn subsegment_duration(&self) -> u32 {
        self.subsegment_duration
    }

    pub fn starts_with_sap(&self) -> bool {
        self.starts_with_sap
    }

    pub fn sap_type(&self) -> u8 {
        self.sap_type
    }

    pub fn sap_delta_time(&self) -> u32 {
        self.sap_delta_time
    }

    pub fn set_reference_type(&mut self, value: bool) {
        self.reference_type = value;
    }

    /// Only the low 31 bits are kept.
    pub fn set_reference_size(&mut self, value: u32) {
        self.reference_size = value & 0x7fff_ffff;
    }

    pub fn set_subsegment_duration(&mut self, value: u32) {
        self.subsegment_duration = value;
    }

    pub fn set_starts_with_sap(&mut self, value: bool) {
        self.starts_with_sap = value;
    }

    /// Only the low 4 bits are kept.
    pub fn set_sap_type(&mut self, value: u8) {
        self.sap_type = value & 0x0f;
    }

    /// Only the low 28 bits are kept.
    pub fn set_sap_delta_time(&mut self, value: u32) {
        self.sap_delta_time = value & 0x0fff_ffff;
    }
}

impl Displayable for ReferenceObject {
    fn display_name(&self) -> String {
        "Reference".to_string()
    }

    fn display_properties(&self) -> Vec<(String, String)> {
        vec![
            prop("Reference Type", self.reference_type),
            prop("Reference Size", self.reference_size),
            prop("Subsegment Duration", self.subsegment_duration),
            prop("Starts With SAP", self.starts_with_sap),
            prop("SAP Type", self.sap_type),
            prop("SAP Delta Time", self.sap_delta_time),
        ]
    }
}

/// Segment Index Box.
#[derive(Debug, Default, Clone)]
pub struct Sidx {
    pub full: FullBoxHeader,
    pub reference_id: u32,
    pub timescale: u32,
    pub earliest_presentation_time: u64,
    pub first_offset: u64,
    pub references: Vec<ReferenceObject>,
}

impl IsoBox for Sidx {
    fn decode(&mut self, _: &mut Parser, _: &BoxHeader, stream: &mut BinaryStream) -> Result<()> {
        self.full = FullBoxHeader::read(stream)?;
        self.reference_id = stream.read_u32()?;
        self.timescale = stream.read_u32()?;
        if self.full.version == 0 {
            self.earliest_presentation_time = stream.read_u32()? as u64;
            self.first_offset = stream.read_u32()? as u64;
        } else {
            self.earliest_presentation_time = stream.read_u64()?;
            self.first_offset = stream.read_u64()?;
        }
        // reserved
        stream.skip(2)?;
        let count = stream.read_u16()?;
        self.references = (0..count)
            .map(|_| ReferenceObject::read(stream))
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        let mut props = self.full.properties();
        props.extend([
            prop("Reference ID", self.reference_id),
            prop("Timescale", self.timescale),
            prop("Earliest Presentation Time", self.earliest_presentation_time),
            prop("First Offset", self.first_offset),
            prop("Reference Count", self.references.len()),
        ]);
        props
    }

    fn objects(&self) -> Vec<&dyn Displayable> {
        self.references.iter().map(|r| r as &dyn Displayable).collect()
    }
}

/// Track Fragment Header Box.
#[derive(Debug, Default, Clone)]
pub struct Tfhd {
    pub full: FullBoxHeader,
    pub track_id: u32,
    pub base_data_offset: u64,
    pub sample_description_index: u32,
    pub default_sample_duration: u32,
    pub default_sample_size: u32,
    pub default_sample_flags: u32,
}

impl Tfhd {
    pub const BASE_DATA_OFFSET_PRESENT: u32 = 0x000001;
    pub const SAMPLE_DESCRIPTION_INDEX_PRESENT: u32 = 0x000002;
    pub const DEFAULT_SAMPLE_DURATION_PRESENT: u32 = 0x000008;
    pub const DEFAULT_SAMPLE_SIZE_PRESENT: u32 = 0x000010;
    pub const DEFAULT_SAMPLE_FLAGS_PRESENT: u32 = 0x000020;
    pub const DURATION_IS_EMPTY: u32 = 0x010000;
    pub const DEFAULT_BASE_IS_MOOF: u32 = 0x020000;
}

impl IsoBox for Tfhd {
    fn decode(&mut self, _: &mut Parser, _: &BoxHeader, stream: &mut BinaryStream) -> Result<()> {
        let full = FullBoxHeader::read(stream)?;
        self.full = full;
        self.track_id = stream.read_u32()?;
        // absent optional fields stay zero
        self.base_data_offset = if full.has_flag(Self::BASE_DATA_OFFSET_PRESENT) {
            stream.read_u64()?
        } else {
            0
        };
        self.sample_description_index =
            read_opt_u32(stream, full, Self::SAMPLE_DESCRIPTION_INDEX_PRESENT)?;
        self.default_sample_duration =
            read_opt_u32(stream, full, Self::DEFAULT_SAMPLE_DURATION_PRESENT)?;
        self.default_sample_size = read_opt_u32(stream, full, Self::DEFAULT_SAMPLE_SIZE_PRESENT)?;
        self.default_sample_flags = read_opt_u32(stream, full, Self::DEFAULT_SAMPLE_FLAGS_PRESENT)?;
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        let mut props = self.full.properties();
        props.extend([
            prop("Track ID", self.track_id),
            prop("Base Data Offset", self.base_data_offset),
            prop("Sample Description Index", self.sample_description_index),
            prop("Default Sample Duration", self.default_sample_duration),
            prop("Default Sample Size", self.default_sample_size),
            prop("Default Sample Flags", format!("0x{:08x}", self.default_sample_flags)),
        ]);
        props
    }
}

fn read_opt_u32(stream: &mut BinaryStream, full: FullBoxHeader, mask: u32) -> Result<u32> {
    if full.has_flag(mask) {
        stream.read_u32()
    } else {
        Ok(0)
    }
}

/// Track Extends Box: per-track sample defaults for movie fragments.
#[derive(Debug, Default, Clone)]
pub struct Trex {
    pub full: FullBoxHeader,
    pub track_id: u32,
    pub default_sample_description_index: u32,
    pub default_sample_duration: u32,
    pub default_sample_size: u32,
    pub default_sample_flags: u32,
}

impl IsoBox for Trex {
    fn decode(&mut self, _: &mut Parser, _: &BoxHeader, stream: &mut BinaryStream) -> Result<()> {
        self.full = FullBoxHeader::read(stream)?;
        self.track_id = stream.read_u32()?;
        self.default_sample_description_index = stream.read_u32()?;
        self.default_sample_duration = stream.read_u32()?;
        self.default_sample_size = stream.read_u32()?;
        self.default_sample_flags = stream.read_u32()?;
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        let mut props = self.full.properties();
        props.extend([
            prop("Track ID", self.track_id),
            prop("Default Sample Description Index", self.default_sample_description_index),
            prop("Default Sample Duration", self.default_sample_duration),
            prop("Default Sample Size", self.default_sample_size),
            prop("Default Sample Flags", format!("0x{:08x}", self.default_sample_flags)),
        ]);
        props
    }
}

/// Movie Fragment Header Box.
#[derive(Debug, Default, Clone)]
pub struct Mfhd {
    pub full: FullBoxHeader,
    pub sequence_number: u32,
}

impl IsoBox for Mfhd {
    fn decode(&mut self, _: &mut Parser, _: &BoxHeader, stream: &mut BinaryStream) -> Result<()> {
        self.full = FullBoxHeader::read(stream)?;
        self.sequence_number = stream.read_u32()?;
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        let mut props = self.full.properties();
        props.push(prop("Sequence Number", self.sequence_number));
        props
    }
}
