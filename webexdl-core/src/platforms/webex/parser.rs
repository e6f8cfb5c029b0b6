use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{PipelineError, PipelineResult};

const SEQUENCE_TAG: &[u8] = b"Sequence";

fn parse_error(err: impl std::fmt::Display) -> PipelineError {
    PipelineError::DescriptorParse(err.to_string())
}

/// Text content of the first `Sequence` element. The whole document has to be
/// well formed.
pub fn parse_descriptor_filename(xml: &str) -> PipelineResult<String> {
    let mut reader = Reader::from_str(xml);

    let mut depth = 0usize;
    let mut seen_root = false;
    // Depth at which the first Sequence was opened, while we are inside it.
    let mut sequence_depth: Option<usize> = None;
    let mut found: Option<String> = None;
    let mut text = String::new();

    loop {
        let event = reader.read_event().map_err(parse_error)?;
        if depth == 0 {
            match &event {
                Event::Start(_) | Event::Empty(_) if seen_root => {
                    return Err(parse_error("content after the root element"));
                }
                Event::Text(e) if !e.iter().all(u8::is_ascii_whitespace) => {
                    return Err(parse_error("text outside the root element"));
                }
                Event::CData(_) => return Err(parse_error("CDATA outside the root element")),
                _ => {}
            }
        }

        match event {
            Event::Start(e) => {
                depth += 1;
                seen_root = true;
                if found.is_none() && sequence_depth.is_none() && e.name().as_ref() == SEQUENCE_TAG {
                    sequence_depth = Some(depth);
                }
            }
            Event::Empty(e) => {
                seen_root = true;
                if found.is_none() && sequence_depth.is_none() && e.name().as_ref() == SEQUENCE_TAG {
                    found = Some(String::new());
                }
            }
            Event::Text(e) if sequence_depth.is_some() => {
                text.push_str(&e.unescape().map_err(parse_error)?);
            }
            Event::CData(e) if sequence_depth.is_some() => {
                text.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Event::End(_) => {
                if sequence_depth == Some(depth) {
                    found = Some(std::mem::take(&mut text));
                    sequence_depth = None;
                }
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| parse_error("unexpected closing tag"))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(parse_error("document has no root element"));
    }
    if depth != 0 {
        return Err(parse_error("document ended inside an open element"));
    }

    let filename = found.ok_or_else(|| parse_error("no Sequence element"))?;
    let filename = filename.trim().to_string();
    if filename.is_empty() {
        return Err(parse_error("Sequence element is empty"));
    }
    Ok(filename)
}
