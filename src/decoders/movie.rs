use super::{fixed_8_8, fixed_16_16, matrix_string};
use crate::boxes::{BoxHeader, FourCC, FullBoxHeader, IsoBox};
use crate::display::prop;
use crate::error::Result;
use crate::parser::Parser;
use crate::stream::BinaryStream;

fn read_matrix(stream: &mut BinaryStream) -> Result<[u32; 9]> {
    let mut m = [0u32; 9];
    for v in m.iter_mut() {
        *v = stream.read_u32()?;
    }
    Ok(m)
}

/// Movie Header Box.
#[derive(Debug, Default, Clone)]
pub struct Mvhd {
    pub full: FullBoxHeader,
    pub creation_time: u64,
    pub modification_time: u64,
    pub timescale: u32,
    pub duration: u64,
    /// 16.16 fixed point
    pub rate: u32,
    /// 8.8 fixed point
    pub volume: u16,
    pub matrix: [u32; 9],
    pub next_track_id: u32,
}

impl IsoBox for Mvhd {
    fn decode(&mut self, _: &mut Parser, _: &BoxHeader, stream: &mut BinaryStream) -> Result<()> {
        self.full = FullBoxHeader::read(stream)?;
        if self.full.version == 1 {
            self.creation_time = stream.read_u64()?;
            self.modification_time = stream.read_u64()?;
            self.timescale = stream.read_u32()?;
            self.duration = stream.read_u64()?;
        } else {
            self.creation_time = stream.read_u32()? as u64;
            self.modification_time = stream.read_u32()? as u64;
            self.timescale = stream.read_u32()?;
            self.duration = stream.read_u32()? as u64;
        }
        self.rate = stream.read_u32()?;
        self.volume = stream.read_u16()?;
        // reserved: u16 + 2 * u32
        stream.skip(10)?;
        self.matrix = read_matrix(stream)?;
        // pre_defined
        stream.skip(24)?;
        self.next_track_id = stream.read_u32()?;
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        let mut props = self.full.properties();
        props.extend([
            prop("Creation Time", self.creation_time),
            prop("Modification Time", self.modification_time),
            prop("Timescale", self.timescale),
            prop("Duration", self.duration),
            prop("Rate", fixed_16_16(self.rate)),
            prop("Volume", fixed_8_8(self.volume)),
            prop("Matrix", matrix_string(&self.matrix)),
            prop("Next Track ID", self.next_track_id),
        ]);
        props
    }
}

/// Track Header Box.
#[derive(Debug, Default, Clone)]
pub struct Tkhd {
    pub full: FullBoxHeader,
    pub creation_time: u64,
    pub modification_time: u64,
    pub track_id: u32,
    pub duration: u64,
    pub layer: i16,
    pub alternate_group: i16,
    /// 8.8 fixed point
    pub volume: u16,
    pub matrix: [u32; 9],
    /// 16.16 fixed point
    pub width: u32,
    /// 16.16 fixed point
    pub height: u32,
}

impl Tkhd {
    pub fn width_px(&self) -> f64 {
        fixed_16_16(self.width)
    }

    pub fn height_px(&self) -> f64 {
        fixed_16_16(self.height)
    }
}

impl IsoBox for Tkhd {
    fn decode(&mut self, _: &mut Parser, _: &BoxHeader, stream: &mut BinaryStream) -> Result<()> {
        self.full = FullBoxHeader::read(stream)?;
        if self.full.version == 1 {
            self.creation_time = stream.read_u64()?;
            self.modification_time = stream.read_u64()?;
            self.track_id = stream.read_u32()?;
            stream.skip(4)?;
            self.duration = stream.read_u64()?;
        } else {
            self.creation_time = stream.read_u32()? as u64;
            self.modification_time = stream.read_u32()? as u64;
            self.track_id = stream.read_u32()?;
            stream.skip(4)?;
            self.duration = stream.read_u32()? as u64;
        }
        stream.skip(8)?;
        self.layer = stream.read_i16()?;
        self.alternate_group = stream.read_i16()?;
        self.volume = stream.read_u16()?;
        stream.skip(2)?;
        self.matrix = read_matrix(stream)?;
        self.width = stream.read_u32()?;
        self.height = stream.read_u32()?;
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        let mut props = self.full.properties();
        props.extend([
            prop("Creation Time", self.creation_time),
            prop("Modification Time", self.modification_time),
            prop("Track ID", self.track_id),
            prop("Duration", self.duration),
            prop("Layer", self.layer),
            prop("Alternate Group", self.alternate_group),
            prop("Volume", fixed_8_8(self.volume)),
            prop("Matrix", matrix_string(&self.matrix)),
            prop("Width", self.width_px()),
            prop("Height", self.height_px()),
        ]);
        props
    }
}

/// Handler Reference Box.
#[derive(Debug, Default, Clone)]
pub struct Hdlr {
    pub full: FullBoxHeader,
    pub handler_type: FourCC,
    pub name: String,
}

impl IsoBox for Hdlr {
    fn decode(
        &mut self,
        parser: &mut Parser,
        _: &BoxHeader,
        stream: &mut BinaryStream,
    ) -> Result<()> {
        self.full = FullBoxHeader::read(stream)?;
        // pre_defined
        stream.skip(4)?;
        self.handler_type = stream.read_fourcc()?;
        stream.skip(12)?;
        if stream.has_bytes_available() {
            self.name = stream.read_string(parser.string_type())?;
        }
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        let mut props = self.full.properties();
        props.push(prop("Handler Type", self.handler_type));
        props.push(prop("Handler Name", &self.name));
        props
    }
}
