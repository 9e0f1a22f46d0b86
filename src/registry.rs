use crate::boxes::{BoxHeader, BoxKey, FourCC, IsoBox, OpaqueBox};
use crate::container::ContainerBox;
use crate::decoders::{
    Cdsc, Colr, Dimg, Dref, Frma, Ftyp, Hdlr, Hvcc, Iinf, Iloc, Infe, Ipco, Ipma, Iref, Irot,
    Ispe, Meta, Mfhd, Mvhd, Pitm, Pixi, Schm, Sidx, Stsd, Tfhd, Thmb, Tkhd, Trex, Url, Urn,
};
use crate::error::Result;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builds a default, not yet decoded box.
pub type BoxConstructor = Arc<dyn Fn() -> Box<dyn IsoBox> + Send + Sync>;

/// Plain containers known out of the box.
pub const DEFAULT_CONTAINERS: [&[u8; 4]; 22] = [
    b"moov", b"trak", b"edts", b"mdia", b"minf", b"stbl", b"mvex", b"moof", b"traf", b"mfra",
    b"meco", b"mere", b"dinf", b"ipro", b"sinf", b"iprp", b"fiin", b"paen", b"strk", b"tapt",
    b"schi", b"udta",
];

/// Mapping from box type to constructor.
///
/// Each [`Parser`](crate::Parser) owns one. Lookups that miss resolve to
/// [`OpaqueBox`], so an unknown type never fails a parse.
#[derive(Clone)]
pub struct Registry {
    map: HashMap<BoxKey, BoxConstructor>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Create a registry seeded with the default containers and decoders.
    pub fn with_defaults() -> Self {
        let mut reg = Self::new();
        reg.register_defaults();
        reg
    }

    /// Register (or replace) the constructor for a 4-byte type code.
    pub fn register_box<F>(&mut self, typ: &str, ctor: F) -> Result<()>
    where
        F: Fn() -> Box<dyn IsoBox> + Send + Sync + 'static,
    {
        let cc: FourCC = typ.parse()?;
        self.insert(BoxKey::FourCC(cc), Arc::new(ctor));
        Ok(())
    }

    /// Register a type whose default value is its decoder.
    pub fn register<T: IsoBox + Default>(&mut self, typ: &str) -> Result<()> {
        self.register_box(typ, || Box::new(T::default()))
    }

    /// Register `typ` as a plain container of boxes.
    pub fn register_container_box(&mut self, typ: &str) -> Result<()> {
        self.register::<ContainerBox>(typ)
    }

    /// Register a decoder for `uuid` boxes carrying this user type.
    pub fn register_uuid_box<F>(&mut self, user_type: [u8; 16], ctor: F)
    where
        F: Fn() -> Box<dyn IsoBox> + Send + Sync + 'static,
    {
        self.insert(BoxKey::Uuid(user_type), Arc::new(ctor));
    }

    fn insert(&mut self, key: BoxKey, ctor: BoxConstructor) {
        if self.map.insert(key.clone(), ctor).is_some() {
            tracing::trace!(?key, "replaced box constructor");
        }
    }

    pub fn contains(&self, key: &BoxKey) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Build the box registered for `key`, or an opaque box.
    pub fn create_box(&self, key: &BoxKey) -> Box<dyn IsoBox> {
        match self.map.get(key) {
            Some(ctor) => ctor(),
            None => Box::new(OpaqueBox::default()),
        }
    }

    /// Build the box for a framed header. A `uuid` box is looked up by its
    /// user type first, then as a plain `uuid` type.
    pub fn create_for_header(&self, hdr: &BoxHeader) -> Box<dyn IsoBox> {
        let user = hdr.uuid.map(BoxKey::Uuid);
        let ctor = user
            .as_ref()
            .and_then(|k| self.map.get(k))
            .or_else(|| self.map.get(&BoxKey::FourCC(hdr.typ)));
        match ctor {
            Some(ctor) => ctor(),
            None => Box::new(OpaqueBox::default()),
        }
    }

    fn seed<T: IsoBox + Default>(&mut self, typ: &[u8; 4]) {
        self.insert(
            BoxKey::FourCC(FourCC(*typ)),
            Arc::new(|| Box::new(T::default()) as Box<dyn IsoBox>),
        );
    }

    pub(crate) fn register_defaults(&mut self) {
        for typ in DEFAULT_CONTAINERS {
            self.seed::<ContainerBox>(typ);
        }

        self.seed::<Ftyp>(b"ftyp");
        self.seed::<Mvhd>(b"mvhd");
        self.seed::<Tkhd>(b"tkhd");
        self.seed::<Meta>(b"meta");
        self.seed::<Hdlr>(b"hdlr");
        self.seed::<Pitm>(b"pitm");
        self.seed::<Iinf>(b"iinf");
        self.seed::<Dref>(b"dref");
        self.seed::<Url>(b"url ");
        self.seed::<Urn>(b"urn ");
        self.seed::<Iloc>(b"iloc");
        self.seed::<Iref>(b"iref");
        self.seed::<Infe>(b"infe");
        self.seed::<Irot>(b"irot");
        self.seed::<Hvcc>(b"hvcC");
        self.seed::<Dimg>(b"dimg");
        self.seed::<Thmb>(b"thmb");
        self.seed::<Cdsc>(b"cdsc");
        self.seed::<Colr>(b"colr");
        self.seed::<Ispe>(b"ispe");
        self.seed::<Ipma>(b"ipma");
        self.seed::<Pixi>(b"pixi");
        self.seed::<Ipco>(b"ipco");
        self.seed::<Stsd>(b"stsd");
        self.seed::<Frma>(b"frma");
        self.seed::<Schm>(b"schm");

        self.seed::<Sidx>(b"sidx");
        self.seed::<Tfhd>(b"tfhd");
        self.seed::<Trex>(b"trex");
        self.seed::<Mfhd>(b"mfhd");
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.map.len())
            .finish()
    }
}

/// Registry holding every default container and decoder.
pub fn default_registry() -> Registry {
    Registry::with_defaults()
}
