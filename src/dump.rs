//! The file loop: discover the page size from block 0, honor the block
//! range, read blocks sequentially, decode each one and render its tags.
//!
//! All decoding state lives in the per-run [`Session`]; pages share nothing
//! else. Non-fatal conditions accumulate into the session's failure flag
//! (surfaced as the exit status); a fatal decode error aborts immediately,
//! without the document footer.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::debug;

use crate::config::Options;
use crate::consts::PAGE_HEADER_SIZE;
use crate::page::{annotate_page, Block, PageHeader};
use crate::session::Session;
use crate::util::segment_number_from_name;
use crate::xml::XmlWriter;

/// Annotate `path` into `out`. Returns whether any reportable condition was
/// encountered (the caller turns that into the exit status).
pub fn dump_file<W: Write>(path: &Path, opts: &Options, out: W) -> Result<bool> {
    let mut file =
        File::open(path).with_context(|| format!("could not open file {}", path.display()))?;

    let page_size = discover_page_size(&mut file)
        .with_context(|| format!("block 0 of {}", path.display()))?;
    debug!("page size {} bytes", page_size);

    let segment_number = opts
        .segment_number
        .unwrap_or_else(|| segment_number_from_name(path));
    let mut session = Session::new(page_size, segment_number, opts.clone());

    let mut xml = XmlWriter::new(out);
    xml.doc_header(&path.display().to_string(), &opts.summary())?;

    let (mut blkno, end) = match opts.range {
        Some(range) => {
            let position = page_size as u64 * range.start as u64;
            file.seek(SeekFrom::Start(position)).with_context(|| {
                format!("seek error encountered before requested start block {}", range.start)
            })?;
            (range.start, Some(range.end))
        }
        None => (0, None),
    };

    let mut initial_read = true;
    loop {
        let data = read_block(&mut file, page_size as usize)?;
        if data.is_empty() {
            // Seeking past EOF does not fail; the first read does.
            if initial_read {
                session.report("premature end of file encountered");
            }
            break;
        }

        let block = Block::new(blkno, data, page_size);
        let page = annotate_page(&mut session, &block)?;
        xml.annotations(&page.annotations)?;

        if end.is_some_and(|end| blkno >= end) {
            break;
        }
        blkno += 1;
        initial_read = false;
    }

    xml.doc_footer()?;
    Ok(session.failed())
}

/// Page size comes off the header of block 0 and applies to every block of
/// the run.
fn discover_page_size(file: &mut File) -> Result<u32> {
    let mut header = [0u8; PAGE_HEADER_SIZE];
    let read = read_into(file, &mut header)?;
    if read < PAGE_HEADER_SIZE {
        bail!("unable to read a full page header (read {} bytes)", read);
    }
    file.seek(SeekFrom::Start(0))?;

    let hdr = PageHeader::parse(&header).context("unable to parse the block 0 header")?;
    let page_size = hdr.page_size();
    if !(1024..=32768).contains(&page_size) || !page_size.is_power_of_two() {
        bail!("declared page size {} is not supported", page_size);
    }
    Ok(page_size)
}

/// Read up to one page, tolerating short reads; the returned length below
/// `page_size` marks a truncated final block.
fn read_block(file: &mut File, page_size: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; page_size];
    let filled = read_into(file, &mut buf)?;
    buf.truncate(filled);
    Ok(buf)
}

fn read_into(file: &mut File, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
