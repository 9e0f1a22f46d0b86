//! Human-readable description of a parsed tree.
//!
//! Every node exposes a name, an ordered list of `(label, value)` pairs and
//! nested objects; [`Displayable::write_description`] turns that into an
//! indented dump like:
//!
//! ```text
//! [ftyp] File Type Box
//! {
//!     Major Brand: isom
//!     Minor Version: 0
//! }
//! ```

use crate::boxes::BoxNode;
use crate::container::File;
use crate::known_boxes::KnownBox;
use crate::util::uuid_string;
use std::fmt::{self, Write};

const INDENT: &str = "    ";

pub(crate) fn prop(label: &str, value: impl fmt::Display) -> (String, String) {
    (label.to_string(), value.to_string())
}

pub trait Displayable {
    fn display_name(&self) -> String;

    fn display_properties(&self) -> Vec<(String, String)>;

    fn nested(&self) -> Vec<&dyn Displayable> {
        Vec::new()
    }

    fn write_description(&self, out: &mut dyn Write, level: usize) -> fmt::Result {
        let pad = INDENT.repeat(level);
        writeln!(out, "{pad}{}", self.display_name())?;

        let props = self.display_properties();
        let nested = self.nested();
        if props.is_empty() && nested.is_empty() {
            return Ok(());
        }

        writeln!(out, "{pad}{{")?;
        let width = props.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (label, value) in &props {
            writeln!(out, "{pad}{INDENT}{:<width$} {value}", format!("{label}:"), width = width + 1)?;
        }
        for obj in nested {
            obj.write_description(out, level + 1)?;
        }
        writeln!(out, "{pad}}}")
    }

    fn description(&self) -> String {
        let mut s = String::new();
        let _ = self.write_description(&mut s, 0);
        s
    }
}

impl Displayable for BoxNode {
    fn display_name(&self) -> String {
        let name = KnownBox::from(self.hdr.typ).full_name();
        match self.hdr.uuid {
            Some(u) => format!("[uuid:{}] {}", uuid_string(&u), name),
            None => format!("[{}] {}", self.hdr.typ, name),
        }
    }

    fn display_properties(&self) -> Vec<(String, String)> {
        self.body.properties()
    }

    fn nested(&self) -> Vec<&dyn Displayable> {
        let mut v = self.body.objects();
        v.extend(self.children().iter().map(|c| c as &dyn Displayable));
        v
    }
}

impl Displayable for File {
    fn display_name(&self) -> String {
        "ISO Media File".to_string()
    }

    fn display_properties(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn nested(&self) -> Vec<&dyn Displayable> {
        self.boxes().iter().map(|c| c as &dyn Displayable).collect()
    }
}

impl fmt::Display for BoxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_description(f, 0)
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_description(f, 0)
    }
}
