//! wxHexEditor tag-document rendering.
//!
//! The decoders hand over finished [`Annotation`] records; this layer only
//! turns them into markup. It never reorders, renumbers or relabels.

use std::io::{self, Write};

use crate::tags::{Annotation, Color};
use crate::util::now_secs;

/// Font color shared by every tag.
const COLOR_FONT_STANDARD: &str = "#313739";

fn color_hex(color: Color) -> &'static str {
    match color {
        Color::Black => "#515A5A",
        Color::BlueDark => "#2980B9",
        Color::BlueLight => "#3498DB",
        Color::Brown => "#97333D",
        Color::GreenBright => "#50E964",
        Color::GreenDark => "#16A085",
        Color::GreenLight => "#1ABC9C",
        Color::Maroon => "#E96950",
        Color::Pink => "#E949D1",
        Color::RedDark => "#912C21",
        Color::RedLight => "#E74C3C",
        Color::White => "#CCD1D1",
        Color::YellowDark => "#F1C40F",
        Color::YellowLight => "#E9E850",
    }
}

pub struct XmlWriter<W: Write> {
    w: W,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(w: W) -> Self {
        Self { w }
    }

    pub fn doc_header(&mut self, path: &str, options: &str) -> io::Result<()> {
        writeln!(self.w, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(self.w, "<!-- Dump created on: {} -->", now_secs())?;
        writeln!(
            self.w,
            "<!-- Options used: {} -->",
            if options.is_empty() { "None" } else { options }
        )?;
        writeln!(self.w, "<wxHexEditor_XML_TAG>")?;
        writeln!(self.w, "  <filename path=\"{}\">", path)
    }

    pub fn annotation(&mut self, a: &Annotation) -> io::Result<()> {
        writeln!(self.w, "    <TAG id=\"{}\">", a.id)?;
        writeln!(self.w, "      <start_offset>{}</start_offset>", a.start)?;
        writeln!(self.w, "      <end_offset>{}</end_offset>", a.end)?;
        writeln!(self.w, "      <tag_text>{}</tag_text>", a.label)?;
        writeln!(
            self.w,
            "      <font_colour>{}</font_colour>",
            COLOR_FONT_STANDARD
        )?;
        writeln!(
            self.w,
            "      <note_colour>{}</note_colour>",
            color_hex(a.color)
        )?;
        writeln!(self.w, "    </TAG>")
    }

    pub fn annotations(&mut self, tags: &[Annotation]) -> io::Result<()> {
        for a in tags {
            self.annotation(a)?;
        }
        Ok(())
    }

    pub fn doc_footer(&mut self) -> io::Result<()> {
        writeln!(self.w, "  </filename>")?;
        writeln!(self.w, "</wxHexEditor_XML_TAG>")
    }
}
