use std::borrow::Cow;
use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::escape::{resolve_predefined_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};

use crate::error::WaypointError;

type Result<T> = std::result::Result<T, WaypointError>;

/// An XML element with its leading text and child elements.
///
/// `text` is the character data before the first child element. Text that follows
/// a child (mixed content) is dropped; nothing in a flight plan relies on it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First element matching a `/`-separated path of child names, in document order.
    ///
    /// Every child matching a path segment is tried, so `Position/Latitude` still
    /// resolves when only a later `<Position>` carries the `<Latitude>`.
    pub fn find(&self, path: &str) -> Option<&Element> {
        match path.split_once('/') {
            None => self.child(path),
            Some((head, rest)) => self
                .children
                .iter()
                .filter(|c| c.name == head)
                .find_map(|c| c.find(rest)),
        }
    }

    /// All elements below this one, depth first, in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }
}

/// Pre-order iterator returned by [`Element::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

/// Entities declared in the document's internal DTD subset, already expanded.
type Entities = HashMap<String, String>;

/// Largest replacement text accepted for one declared entity.
const MAX_ENTITY_LEN: usize = 64 * 1024;

/// Parse an XML document into its root [`Element`].
///
/// The whole input is read before anything is returned, so a structural error
/// anywhere in the document fails the call.
pub fn parse_document(xml: &str) -> Result<Element> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let mut reader = Reader::from_str(xml);
    let decoder = reader.decoder();
    let mut entities = Entities::new();
    let mut open: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                ensure_can_open(&open, &root)?;
                let name = check_start(&e, decoder, &entities)?;
                open.push(Element::new(name));
            }
            Ok(Event::Empty(e)) => {
                ensure_can_open(&open, &root)?;
                let name = check_start(&e, decoder, &entities)?;
                close_element(Element::new(name), &mut open, &mut root);
            }
            Ok(Event::End(e)) => {
                let element = open.pop().ok_or_else(|| {
                    WaypointError::UnexpectedEndTag(
                        String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                    )
                })?;
                close_element(element, &mut open, &mut root);
            }
            Ok(Event::Text(e)) => {
                let raw = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                if raw.contains("]]>") {
                    return Err(WaypointError::CdataEndInText);
                }
                append_text(&mut open, &normalize_newlines(raw))?;
            }
            Ok(Event::CData(e)) => {
                let raw = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                append_text(&mut open, &normalize_newlines(raw))?;
            }
            Ok(Event::GeneralRef(e)) => {
                let name = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                match e.resolve_char_ref()? {
                    Some(ch) => append_text(&mut open, ch.encode_utf8(&mut [0; 4]))?,
                    None => {
                        let value = resolve_entity(name, &entities)
                            .ok_or_else(|| WaypointError::UndefinedEntity(name.to_string()))?;
                        append_text(&mut open, value)?;
                    }
                }
            }
            Ok(Event::DocType(e)) => {
                let raw = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                declare_entities(raw, &mut entities)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(WaypointError::Xml(e)),
            // Declarations, comments and processing instructions carry no data
            _ => {}
        }
    }

    if let Some(unclosed) = open.pop() {
        return Err(WaypointError::UnclosedElement(unclosed.name));
    }

    root.ok_or(WaypointError::NoRootElement)
}

/// Validate a start tag: its name, and every attribute key and value.
fn check_start(start: &BytesStart<'_>, decoder: Decoder, entities: &Entities) -> Result<String> {
    let name = element_name(start);
    check_name(&name)?;

    for attr in start.attributes().with_checks(true) {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref());
        check_name(&key)?;
        if attr.value.contains(&b'<') {
            return Err(WaypointError::InvalidAttributeValue(key.into_owned()));
        }
        attr.decode_and_unescape_value_with(decoder, |entity| resolve_entity(entity, entities))?;
    }

    Ok(name)
}

/// Predefined XML entities first, then the ones declared in the DTD.
fn resolve_entity<'e>(name: &str, entities: &'e Entities) -> Option<&'e str> {
    resolve_predefined_entity(name).or_else(|| entities.get(name).map(String::as_str))
}

/// Collect `<!ENTITY name "value">` declarations from a doctype's internal subset.
///
/// Parameter entities and external (`SYSTEM`/`PUBLIC`) entities are ignored; the
/// first declaration of a name wins.
fn declare_entities(doctype: &str, entities: &mut Entities) -> Result<()> {
    const DECL: &str = "<!ENTITY";

    let mut rest = doctype;
    while let Some(pos) = rest.find(DECL) {
        rest = rest[pos + DECL.len()..].trim_start();
        if rest.starts_with('%') {
            continue;
        }

        let name_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (name, after) = rest.split_at(name_end);
        let after = after.trim_start();
        check_name(name)?;

        let Some(quote) = after.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            rest = after;
            continue;
        };
        let body = &after[1..];
        let end = body
            .find(quote)
            .ok_or_else(|| WaypointError::InvalidEntityDeclaration(name.to_string()))?;

        let known: &Entities = entities;
        let value = unescape_with(&body[..end], |entity| resolve_entity(entity, known))
            .map_err(quick_xml::Error::from)?
            .into_owned();
        if value.len() > MAX_ENTITY_LEN {
            return Err(WaypointError::InvalidEntityDeclaration(name.to_string()));
        }
        entities.entry(name.to_string()).or_insert(value);
        rest = &body[end + 1..];
    }
    Ok(())
}

/// XML `Name` production: a name-start character followed by name characters.
fn check_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(is_name_start_char) && chars.all(is_name_char);
    if valid {
        Ok(())
    } else {
        Err(WaypointError::InvalidName(name.to_string()))
    }
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}' | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

/// A new element may only start inside the root, or as the root itself.
fn ensure_can_open(open: &[Element], root: &Option<Element>) -> Result<()> {
    if open.is_empty() && root.is_some() {
        return Err(WaypointError::ContentOutsideRoot);
    }
    Ok(())
}

fn close_element(element: Element, open: &mut [Element], root: &mut Option<Element>) {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

/// Character data belongs to the innermost open element; outside the root only
/// whitespace is allowed.
fn append_text(open: &mut [Element], text: &str) -> Result<()> {
    match open.last_mut() {
        Some(current) => {
            if current.children.is_empty() {
                current.text.push_str(text);
            }
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(WaypointError::ContentOutsideRoot),
    }
}

/// XML end-of-line handling: `\r\n` and lone `\r` both become `\n`.
fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}
