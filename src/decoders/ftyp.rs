use crate::boxes::{BoxHeader, FourCC, IsoBox};
use crate::display::prop;
use crate::error::Result;
use crate::parser::Parser;
use crate::stream::BinaryStream;

/// File Type Box: major brand, minor version and compatible brands.
#[derive(Debug, Default, Clone)]
pub struct Ftyp {
    pub major_brand: FourCC,
    pub minor_version: u32,
    pub compatible_brands: Vec<FourCC>,
}

impl Ftyp {
    pub fn has_brand(&self, brand: &str) -> bool {
        self.major_brand.is(brand) || self.compatible_brands.iter().any(|b| b.is(brand))
    }
}

impl IsoBox for Ftyp {
    fn decode(&mut self, _: &mut Parser, _: &BoxHeader, stream: &mut BinaryStream) -> Result<()> {
        self.major_brand = stream.read_fourcc()?;
        self.minor_version = stream.read_u32()?;
        // a trailing partial brand is ignored
        while stream.remaining() >= 4 {
            self.compatible_brands.push(stream.read_fourcc()?);
        }
        Ok(())
    }

    fn properties(&self) -> Vec<(String, String)> {
        let brands: Vec<String> = self
            .compatible_brands
            .iter()
            .map(|b| b.to_string())
            .collect();
        vec![
            prop("Major Brand", self.major_brand),
            prop("Minor Version", self.minor_version),
            prop("Compatible Brands", brands.join(", ")),
        ]
    }
}
