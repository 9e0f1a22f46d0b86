use crate::boxes::FourCC;

macro_rules! known_boxes {
    ($($variant:ident => $code:literal, $name:literal;)*) => {
        /// Box types with a well-known descriptive name.
        ///
        /// Anything not in this list becomes `KnownBox::Unknown(fourcc)`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum KnownBox {
            $($variant,)*
            Unknown(FourCC),
        }

        impl From<FourCC> for KnownBox {
            fn from(cc: FourCC) -> Self {
                match &cc.0 {
                    $($code => KnownBox::$variant,)*
                    _ => KnownBox::Unknown(cc),
                }
            }
        }

        impl KnownBox {
            pub fn fourcc(&self) -> FourCC {
                match self {
                    $(KnownBox::$variant => FourCC(*$code),)*
                    KnownBox::Unknown(cc) => *cc,
                }
            }

            /// Human-readable name, e.g. "Movie Header Box".
            pub fn full_name(&self) -> &'static str {
                match self {
                    $(KnownBox::$variant => $name,)*
                    KnownBox::Unknown(_) => "Unknown Box",
                }
            }
        }
    };
}

known_boxes! {
    // file level
    Ftyp => b"ftyp", "File Type Box";
    Moov => b"moov", "Movie Box";
    Mdat => b"mdat", "Media Data Box";
    Free => b"free", "Free Space Box";
    Skip => b"skip", "Free Space Box";
    Wide => b"wide", "Wide Box";
    Pnot => b"pnot", "Preview Box";
    Meta => b"meta", "Meta Box";
    Uuid => b"uuid", "User Extension Box";

    // movie / track structure
    Mvhd => b"mvhd", "Movie Header Box";
    Trak => b"trak", "Track Box";
    Tkhd => b"tkhd", "Track Header Box";
    Edts => b"edts", "Edit Box";
    Elst => b"elst", "Edit List Box";
    Mdia => b"mdia", "Media Box";
    Mdhd => b"mdhd", "Media Header Box";
    Hdlr => b"hdlr", "Handler Reference Box";
    Minf => b"minf", "Media Information Box";
    Dinf => b"dinf", "Data Information Box";
    Dref => b"dref", "Data Reference Box";
    Url => b"url ", "Data Entry URL Box";
    Urn => b"urn ", "Data Entry URN Box";
    Stbl => b"stbl", "Sample Table Box";
    Stsd => b"stsd", "Sample Description Box";
    Udta => b"udta", "User Data Box";
    Strk => b"strk", "Sub Track Box";
    Tapt => b"tapt", "Track Aperture Mode Dimensions Box";

    // fragments
    Mvex => b"mvex", "Movie Extends Box";
    Trex => b"trex", "Track Extends Box";
    Moof => b"moof", "Movie Fragment Box";
    Mfhd => b"mfhd", "Movie Fragment Header Box";
    Traf => b"traf", "Track Fragment Box";
    Tfhd => b"tfhd", "Track Fragment Header Box";
    Mfra => b"mfra", "Movie Fragment Random Access Box";
    Sidx => b"sidx", "Segment Index Box";

    // meta / items
    Meco => b"meco", "Additional Metadata Container Box";
    Mere => b"mere", "Metabox Relation Box";
    Pitm => b"pitm", "Primary Item Box";
    Iloc => b"iloc", "Item Location Box";
    Iinf => b"iinf", "Item Information Box";
    Infe => b"infe", "Item Info Entry";
    Iref => b"iref", "Item Reference Box";
    Dimg => b"dimg", "Derived Image Reference";
    Thmb => b"thmb", "Thumbnail Reference";
    Cdsc => b"cdsc", "Content Description Reference";
    Iprp => b"iprp", "Item Properties Box";
    Ipco => b"ipco", "Item Property Container Box";
    Ipma => b"ipma", "Item Property Association Box";
    Ispe => b"ispe", "Image Spatial Extents Property";
    Pixi => b"pixi", "Pixel Information Property";
    Irot => b"irot", "Image Rotation Property";
    Colr => b"colr", "Colour Information Box";
    Hvcc => b"hvcC", "HEVC Configuration Box";

    // protection / delivery
    Ipro => b"ipro", "Item Protection Box";
    Sinf => b"sinf", "Protection Scheme Information Box";
    Frma => b"frma", "Original Format Box";
    Schm => b"schm", "Scheme Type Box";
    Schi => b"schi", "Scheme Information Box";
    Fiin => b"fiin", "FD Item Information Box";
    Paen => b"paen", "Partition Entry Box";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_both_ways() {
        let k = KnownBox::from(FourCC(*b"hvcC"));
        assert_eq!(k, KnownBox::Hvcc);
        assert_eq!(k.fourcc(), FourCC(*b"hvcC"));
        assert_eq!(k.full_name(), "HEVC Configuration Box");
    }

    #[test]
    fn unknown_keeps_code() {
        let k = KnownBox::from(FourCC(*b"zzzz"));
        assert_eq!(k, KnownBox::Unknown(FourCC(*b"zzzz")));
        assert_eq!(k.full_name(), "Unknown Box");
    }
}
