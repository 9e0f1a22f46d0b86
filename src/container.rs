use crate::boxes::{BoxHeader, BoxNode, IsoBox};
use crate::error::Result;
use crate::parser::{Parser, parse_children};
use crate::stream::BinaryStream;

/// A box whose payload is nothing but child boxes (`moov`, `trak`, ...).
#[derive(Debug, Default)]
pub struct ContainerBox {
    children: Vec<BoxNode>,
}

impl ContainerBox {
    pub fn boxes(&self) -> &[BoxNode] {
        &self.children
    }
}

impl IsoBox for ContainerBox {
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

/// Root of a parsed tree: the top-level boxes in source order.
#[derive(Debug, Default)]
pub struct File {
    children: Vec<BoxNode>,
}

impl File {
    /// Decode top-level boxes until `stream` is exhausted.
    pub fn decode(&mut self, parser: &mut Parser, stream: &mut BinaryStream) -> Result<()> {
        self.children = parse_children(parser, stream, "file")?;
        Ok(())
    }

    pub fn boxes(&self) -> &[BoxNode] {
        &self.children
    }

    pub fn find(&self, typ: &str) -> Option<&BoxNode> {
        self.children.iter().find(|b| b.typ().is(typ))
    }

    pub fn boxes_of_type<'a>(&'a self, typ: &'a str) -> impl Iterator<Item = &'a BoxNode> + 'a {
        self.children.iter().filter(move |b| b.typ().is(typ))
    }

    pub fn typed_box<T: IsoBox>(&self, typ: &str) -> Option<&T> {
        self.children
            .iter()
            .filter(|b| b.typ().is(typ))
            .find_map(|b| b.get::<T>())
    }

    pub fn typed_boxes<'a, T: IsoBox>(&'a self, typ: &'a str) -> impl Iterator<Item = &'a T> + 'a {
        self.boxes_of_type(typ).filter_map(|b| b.get::<T>())
    }

    /// Follow a dotted path of types from the top level, e.g.
    /// `"moov.trak.mdia"`. The first match is taken at every level.
    pub fn find_path(&self, path: &str) -> Option<&BoxNode> {
        let mut parts = path.split('.');
        let mut node = self.find(parts.next()?)?;
        for part in parts {
            node = node.find(part)?;
        }
        Some(node)
    }
}
