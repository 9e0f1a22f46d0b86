//! Decoders for the box types the default registry knows about.
//!
//! Each one reads a fixed field grammar from the payload view it is handed;
//! anything it leaves unread is skipped by the caller.

mod dref;
mod fragment;
mod ftyp;
mod item;
mod movie;
mod property;
mod sample;

pub use dref::{Dref, SELF_CONTAINED, Url, Urn};
pub use fragment::{Mfhd, ReferenceObject, Sidx, Tfhd, Trex};
pub use ftyp::Ftyp;
pub use item::{
    Cdsc, Dimg, Extent, IREF_VERSION_KEY, Iinf, Iloc, Infe, ItemLocation, Iref, Meta, Pitm,
    SingleItemReference, Thmb,
};
pub use movie::{Hdlr, Mvhd, Tkhd};
pub use property::{Association, Colr, Hvcc, IpmaEntry, Ipco, Ipma, Irot, Ispe, NalArray, Pixi};
pub use sample::{Frma, Schm, Stsd};

/// 16.16 fixed point to float, as used by rates and track dimensions.
pub(crate) fn fixed_16_16(v: u32) -> f64 {
    v as f64 / 65536.0
}

pub(crate) fn fixed_8_8(v: u16) -> f64 {
    v as f64 / 256.0
}

pub(crate) fn matrix_string(m: &[u32; 9]) -> String {
    let cells: Vec<String> = m.iter().map(|v| format!("0x{v:08x}")).collect();
    format!("[{}]", cells.join(", "))
}
