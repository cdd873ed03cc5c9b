//! XML event reading helpers for WordprocessingML parts

use crate::error::{ProtocolError, ProtocolResult};
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesRef, BytesStart, BytesText, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::BufRead;

/// Event reader configured for document parts: empty elements are expanded
/// into start/end pairs and text is never trimmed.
pub struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    pub fn new(buf_reader: R) -> Self {
        let mut reader = Reader::from_reader(buf_reader);
        let config = reader.config_mut();
        config.check_end_names = false;
        config.expand_empty_elements = true;
        config.trim_text(false);

        Self {
            reader,
            buffer: Vec::with_capacity(1024),
        }
    }

    /// Next event, or `None` at end of input
    pub fn next(&mut self) -> ProtocolResult<Option<Event<'_>>> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer)? {
            Event::Eof => Ok(None),
            event => Ok(Some(event)),
        }
    }
}

pub trait XmlNodeHelper<'a> {
    fn attribute_value(&'a self, name: &str) -> ProtocolResult<Option<Cow<'a, str>>>;
}

impl<'a> XmlNodeHelper<'a> for BytesStart<'a> {
    fn attribute_value(&'a self, name: &str) -> ProtocolResult<Option<Cow<'a, str>>> {
        Ok(self
            .try_get_attribute(name)?
            .map(|attribute| attribute.unescape_value())
            .transpose()?)
    }
}

/// Builds text content out of text and entity-reference events
pub trait XmlTextHelper {
    fn push_bytes_text(&mut self, text: &BytesText) -> ProtocolResult<()>;
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> ProtocolResult<()>;
}

impl XmlTextHelper for String {
    fn push_bytes_text(&mut self, text: &BytesText) -> ProtocolResult<()> {
        self.push_str(&text.xml_content()?);
        Ok(())
    }

    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> ProtocolResult<()> {
        let raw = bytes.xml_content()?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = match number.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16),
                None => number.parse::<u32>(),
            }
            .map_err(|_| ProtocolError::XmlEntity(raw.to_string()))?;
            if let Some(character) = char::from_u32(code) {
                self.push(character);
            }
        } else if let Some(entity) = resolve_xml_entity(&raw) {
            self.push_str(entity);
        } else {
            return Err(ProtocolError::XmlEntity(raw.to_string()));
        }
        Ok(())
    }
}
