//! Annotation records and the per-page tag builder.
//!
//! Every structural element a decoder recognizes becomes one [`Annotation`]:
//! a labeled, colored, inclusive byte range in the file's address space.
//! [`PageTags`] is the shared emission path; it assigns run-scoped,
//! strictly increasing ids and rejects any tag that would break the
//! viewer's non-decreasing start-offset contract for the page.

use crate::error::DecodeError;
use crate::session::Session;

/// Display color category; the rendering layer maps these to the palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Black,
    BlueDark,
    BlueLight,
    Brown,
    GreenBright,
    GreenDark,
    GreenLight,
    Maroon,
    Pink,
    RedDark,
    RedLight,
    White,
    YellowDark,
    YellowLight,
}

/// One emitted annotation. Write-once; never revised after emission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    /// Run-scoped id, strictly increasing across all pages.
    pub id: u64,
    /// First byte covered (absolute file offset).
    pub start: u64,
    /// Last byte covered, inclusive (end >= start).
    pub end: u64,
    pub label: String,
    pub color: Color,
}

/// Tag builder for a single page.
///
/// Start offsets are page-relative on the way in and translated to absolute
/// file offsets using the page's base; decoders therefore never see the
/// checksum-verification address space (see `Session::checksum_block`).
pub struct PageTags<'s> {
    session: &'s mut Session,
    blkno: u32,
    level: Option<u32>,
    base: u64,
    last_start: u64,
    tags: Vec<Annotation>,
}

impl<'s> PageTags<'s> {
    pub fn new(session: &'s mut Session, blkno: u32, level: Option<u32>) -> Self {
        let base = session.base_offset(blkno);
        Self {
            session,
            blkno,
            level,
            base,
            last_start: 0,
            tags: Vec::new(),
        }
    }

    pub fn blkno(&self) -> u32 {
        self.blkno
    }

    pub fn level(&self) -> Option<u32> {
        self.level
    }

    pub fn session(&mut self) -> &mut Session {
        self.session
    }

    /// Page-level tag: `block N [(level L)] NAME`.
    pub fn page_tag(
        &mut self,
        name: &str,
        color: Color,
        start: usize,
        end: usize,
    ) -> Result<(), DecodeError> {
        let label = match self.level {
            Some(level) => format!("block {} (level {}) {}", self.blkno, level, name),
            None => format!("block {} {}", self.blkno, name),
        };
        self.push(label, color, start, end)
    }

    /// Item-level tag: `(N,slot) NAME`.
    pub fn tuple_tag(
        &mut self,
        slot: usize,
        name: &str,
        color: Color,
        start: usize,
        end: usize,
    ) -> Result<(), DecodeError> {
        let label = format!("({},{}) {}", self.blkno, slot, name);
        self.push(label, color, start, end)
    }

    fn push(
        &mut self,
        label: String,
        color: Color,
        start: usize,
        end: usize,
    ) -> Result<(), DecodeError> {
        let start = self.base + start as u64;
        let end = self.base + end as u64;
        if end < start {
            return Err(DecodeError::InvertedRange {
                blkno: self.blkno,
                start,
                end,
            });
        }
        if start < self.last_start {
            return Err(DecodeError::AnnotationOrder {
                blkno: self.blkno,
                start,
                last: self.last_start,
            });
        }
        self.last_start = start;
        let id = self.session.next_tag_id();
        self.tags.push(Annotation {
            id,
            start,
            end,
            label,
            color,
        });
        Ok(())
    }

    pub fn into_annotations(self) -> Vec<Annotation> {
        self.tags
    }
}
