//! Qt Linguist `.ts` document parser.
//!
//! Event-driven on top of `quick-xml`. Unknown elements are skipped so newer schema
//! revisions still load; anything that breaks the `<TS>/<context>/<message>` nesting fails
//! the whole document with a position.

use std::borrow::Cow;
use std::fmt;

use quick_xml::Reader;
use quick_xml::events::{
    BytesCData,
    BytesStart,
    BytesText,
    Event,
};

use super::entry::{
    CatalogEntry,
    Location,
    Status,
    Translations,
    normalize_disambiguation,
};
use super::error::LoadError;
use crate::types::SourcePosition;

/// Attributes of the `<TS>` root element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogHeader {
    pub version: Option<String>,
    pub language: Option<String>,
    pub source_language: Option<String>,
}

/// A parsed document before indexing, messages in document order.
#[derive(Debug, Default)]
pub(crate) struct ParsedCatalog {
    pub(crate) header: CatalogHeader,
    pub(crate) messages: Vec<CatalogEntry>,
}

/// Parses a complete catalog document.
pub(crate) fn parse_catalog(bytes: &[u8]) -> Result<ParsedCatalog, LoadError> {
    let text = std::str::from_utf8(bytes).map_err(|e| LoadError::Encoding {
        position: SourcePosition::from_offset(bytes, e.valid_up_to()),
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let catalog = CatalogParser::new(text).parse()?;
    tracing::debug!(
        messages = catalog.messages.len(),
        language = ?catalog.header.language,
        "Parsed catalog document"
    );
    Ok(catalog)
}

/// Recursive-descent reader over the XML event stream.
struct CatalogParser<'a> {
    /// Underlying XML reader
    reader: Reader<&'a [u8]>,
    /// Whole document, for offset to line/column conversion
    text: &'a str,
}

impl<'a> CatalogParser<'a> {
    /// Creates a parser that keeps whitespace, which is significant in message text.
    fn new(text: &'a str) -> Self {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(false);
        Self { reader, text }
    }

    /// Parses the prolog, the `<TS>` root and anything trailing it.
    fn parse(mut self) -> Result<ParsedCatalog, LoadError> {
        let mut catalog = ParsedCatalog::default();
        let mut seen_root = false;

        loop {
            let offset = self.offset();
            match self.next_event()? {
                Event::Start(start) => {
                    self.expect_root(&start, offset, seen_root)?;
                    catalog.header = self.parse_header(&start)?;
                    self.parse_root_body(&mut catalog.messages)?;
                    seen_root = true;
                }
                Event::Empty(start) => {
                    self.expect_root(&start, offset, seen_root)?;
                    catalog.header = self.parse_header(&start)?;
                    seen_root = true;
                }
                Event::Text(text) if !is_blank(&text) => {
                    return Err(self.structure_error(offset, "text outside the root element"));
                }
                Event::Eof => break,
                // declaration, doctype, comments, processing instructions
                _ => {}
            }
        }

        if !seen_root {
            return Err(
                self.structure_error(self.text.len(), "document has no <TS> root element")
            );
        }
        Ok(catalog)
    }

    fn expect_root(
        &self,
        start: &BytesStart<'_>,
        offset: usize,
        seen_root: bool,
    ) -> Result<(), LoadError> {
        if seen_root {
            return Err(self.structure_error(offset, "content after the root element"));
        }
        if start.name().as_ref() != b"TS" {
            return Err(self.structure_error(
                offset,
                format!("expected <TS> root element, found <{}>", element_name(start)),
            ));
        }
        Ok(())
    }

    fn parse_header(&self, start: &BytesStart<'_>) -> Result<CatalogHeader, LoadError> {
        Ok(CatalogHeader {
            version: non_empty(self.attribute(start, b"version")?),
            language: non_empty(self.attribute(start, b"language")?),
            source_language: non_empty(self.attribute(start, b"sourcelanguage")?),
        })
    }

    fn parse_root_body(&mut self, messages: &mut Vec<CatalogEntry>) -> Result<(), LoadError> {
        loop {
            let offset = self.offset();
            match self.next_event()? {
                Event::Start(start) => match start.name().as_ref() {
                    b"context" => self.parse_context(offset, messages)?,
                    b"message" => {
                        return Err(self.structure_error(offset, "<message> outside <context>"));
                    }
                    _ => self.skip(&start)?,
                },
                Event::Empty(start) if start.name().as_ref() == b"message" => {
                    return Err(self.structure_error(offset, "<message> outside <context>"));
                }
                Event::End(_) => return Ok(()),
                Event::Eof => return Err(self.unexpected_eof(b"TS")),
                _ => {}
            }
        }
    }

    fn parse_context(
        &mut self,
        context_offset: usize,
        messages: &mut Vec<CatalogEntry>,
    ) -> Result<(), LoadError> {
        let mut name: Option<String> = None;
        let mut pending = Vec::new();

        loop {
            let offset = self.offset();
            match self.next_event()? {
                Event::Start(start) => match start.name().as_ref() {
                    b"name" => name = Some(self.read_text(&start)?),
                    b"message" => pending.push(self.parse_message(&start, offset)?),
                    _ => self.skip(&start)?,
                },
                Event::Empty(start) => match start.name().as_ref() {
                    b"name" => name = Some(String::new()),
                    b"message" => {
                        return Err(self.structure_error(offset, "<message> without <source>"));
                    }
                    _ => {}
                },
                Event::End(_) => break,
                Event::Eof => return Err(self.unexpected_eof(b"context")),
                _ => {}
            }
        }

        let Some(context) = name else {
            return Err(self.structure_error(context_offset, "<context> without <name>"));
        };
        for mut entry in pending {
            entry.context.clone_from(&context);
            messages.push(entry);
        }
        Ok(())
    }

    /// Parses one `<message>`. The context name is filled in by the caller.
    fn parse_message(
        &mut self,
        start: &BytesStart<'_>,
        message_offset: usize,
    ) -> Result<CatalogEntry, LoadError> {
        let numerus = self.attribute(start, b"numerus")?.is_some_and(|v| v == "yes");
        let id = non_empty(self.attribute(start, b"id")?);

        let mut source = None;
        let mut disambiguation = None;
        let mut extracomment = None;
        let mut translator_comment = None;
        let mut locations = Vec::new();
        let mut translation = None;

        loop {
            match self.next_event()? {
                Event::Start(child) => match child.name().as_ref() {
                    b"source" => source = Some(self.read_text(&child)?),
                    b"comment" => disambiguation = Some(self.read_text(&child)?),
                    b"extracomment" => extracomment = non_empty(Some(self.read_text(&child)?)),
                    b"translatorcomment" => {
                        translator_comment = non_empty(Some(self.read_text(&child)?));
                    }
                    b"translation" => {
                        translation = Some(self.parse_translation(&child, numerus)?);
                    }
                    b"location" => {
                        locations.push(self.parse_location(&child)?);
                        self.skip(&child)?;
                    }
                    _ => self.skip(&child)?,
                },
                Event::Empty(child) => match child.name().as_ref() {
                    b"source" => source = Some(String::new()),
                    b"location" => locations.push(self.parse_location(&child)?),
                    b"translation" => {
                        let status = self.translation_status(&child)?;
                        translation = Some((status, Translations::empty(numerus)));
                    }
                    _ => {}
                },
                Event::End(_) => break,
                Event::Eof => return Err(self.unexpected_eof(b"message")),
                _ => {}
            }
        }

        let Some(source) = source else {
            return Err(self.structure_error(message_offset, "<message> without <source>"));
        };
        // A message nobody translated yet has no <translation> element at all.
        let (status, translations) =
            translation.unwrap_or_else(|| (Status::Unfinished, Translations::empty(numerus)));

        Ok(CatalogEntry {
            context: String::new(),
            source,
            disambiguation: normalize_disambiguation(disambiguation),
            translations,
            status,
            extracomment,
            translator_comment,
            id,
            locations,
            position: self.position_at(message_offset),
        })
    }

    fn parse_translation(
        &mut self,
        start: &BytesStart<'_>,
        numerus: bool,
    ) -> Result<(Status, Translations), LoadError> {
        let status = self.translation_status(start)?;
        let mut text = String::new();
        let mut forms = Vec::new();
        let mut first_variant: Option<String> = None;

        loop {
            match self.next_event()? {
                Event::Text(chunk) => text.push_str(&self.unescape(&chunk)?),
                Event::CData(chunk) => text.push_str(&self.cdata(&chunk)?),
                Event::Start(child) => match child.name().as_ref() {
                    b"numerusform" => forms.push(self.read_text(&child)?),
                    b"lengthvariant" => {
                        let variant = self.read_text(&child)?;
                        if first_variant.is_none() {
                            first_variant = Some(variant);
                        }
                    }
                    _ => self.skip(&child)?,
                },
                Event::Empty(child) => match child.name().as_ref() {
                    b"numerusform" => forms.push(String::new()),
                    b"byte" => text.extend(self.byte_value(&child)?),
                    _ => {}
                },
                Event::End(_) => break,
                Event::Eof => return Err(self.unexpected_eof(b"translation")),
                _ => {}
            }
        }

        let direct = first_variant.unwrap_or(text);
        let translations = if numerus {
            if forms.is_empty() {
                // indentation around missing <numerusform> children is not a translation
                forms.push(if direct.trim().is_empty() { String::new() } else { direct });
            }
            Translations::Plural(forms)
        } else {
            Translations::Single(direct)
        };
        Ok((status, translations))
    }

    fn translation_status(&self, start: &BytesStart<'_>) -> Result<Status, LoadError> {
        Ok(Status::from_type_attribute(self.attribute(start, b"type")?.as_deref()))
    }

    fn parse_location(&self, start: &BytesStart<'_>) -> Result<Location, LoadError> {
        Ok(Location {
            filename: non_empty(self.attribute(start, b"filename")?),
            line: non_empty(self.attribute(start, b"line")?),
        })
    }

    /// Reads the character content of an element up to its end tag.
    fn read_text(&mut self, start: &BytesStart<'_>) -> Result<String, LoadError> {
        let mut text = String::new();
        loop {
            match self.next_event()? {
                Event::Text(chunk) => text.push_str(&self.unescape(&chunk)?),
                Event::CData(chunk) => text.push_str(&self.cdata(&chunk)?),
                Event::Empty(child) if child.name().as_ref() == b"byte" => {
                    text.extend(self.byte_value(&child)?);
                }
                Event::Start(child) => self.skip(&child)?,
                Event::End(_) => return Ok(text),
                Event::Eof => return Err(self.unexpected_eof(start.name().as_ref())),
                _ => {}
            }
        }
    }

    /// Decodes `<byte value="x9"/>`, used for characters XML 1.0 cannot carry.
    fn byte_value(&self, start: &BytesStart<'_>) -> Result<Option<char>, LoadError> {
        let Some(value) = self.attribute(start, b"value")? else {
            return Ok(None);
        };
        let code = match value.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => value.parse().ok(),
        };
        match code.and_then(char::from_u32) {
            Some(ch) => Ok(Some(ch)),
            None => Err(self.structure_error(
                self.offset(),
                format!("invalid <byte> value '{value}'"),
            )),
        }
    }

    /// Consumes everything up to and including the matching end tag.
    fn skip(&mut self, start: &BytesStart<'_>) -> Result<(), LoadError> {
        match self.reader.read_to_end(start.name()) {
            Ok(_) => Ok(()),
            Err(err) => Err(self.xml_error(&err)),
        }
    }

    fn attribute(&self, start: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, LoadError> {
        for attr in start.attributes() {
            let attr = attr.map_err(|e| self.xml_error(&e))?;
            if attr.key.as_ref() == name {
                let value = attr.unescape_value().map_err(|e| self.xml_error(&e))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }

    fn unescape(&self, text: &BytesText<'_>) -> Result<String, LoadError> {
        text.unescape().map(Cow::into_owned).map_err(|e| self.xml_error(&e))
    }

    fn cdata(&self, data: &BytesCData<'_>) -> Result<String, LoadError> {
        std::str::from_utf8(data)
            .map(str::to_owned)
            .map_err(|_| LoadError::Encoding { position: self.position_at(self.offset()) })
    }

    fn next_event(&mut self) -> Result<Event<'a>, LoadError> {
        match self.reader.read_event() {
            Ok(event) => Ok(event),
            Err(err) => {
                let offset = to_offset(self.reader.error_position());
                Err(LoadError::Xml { position: self.position_at(offset), message: err.to_string() })
            }
        }
    }

    /// Current byte offset of the reader.
    fn offset(&self) -> usize {
        to_offset(self.reader.buffer_position())
    }

    fn position_at(&self, offset: usize) -> SourcePosition {
        SourcePosition::from_offset(self.text.as_bytes(), offset)
    }

    fn xml_error(&self, err: &dyn fmt::Display) -> LoadError {
        LoadError::Xml { position: self.position_at(self.offset()), message: err.to_string() }
    }

    fn structure_error(&self, offset: usize, message: impl Into<String>) -> LoadError {
        LoadError::Structure { position: self.position_at(offset), message: message.into() }
    }

    fn unexpected_eof(&self, inside: &[u8]) -> LoadError {
        self.structure_error(
            self.text.len(),
            format!("unexpected end of document inside <{}>", String::from_utf8_lossy(inside)),
        )
    }
}

/// Reader positions are `u64`; documents that fit in memory fit in `usize`.
fn to_offset(position: impl TryInto<usize>) -> usize {
    position.try_into().unwrap_or(usize::MAX)
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn is_blank(text: &BytesText<'_>) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
