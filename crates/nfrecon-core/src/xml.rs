//! Minimal element tree for NF-e documents.
//!
//! Only what the invoice extractor needs is kept: every element in document
//! order with its qualified name, its local name (prefix stripped) and its
//! text content, i.e. the concatenated text of all descendants.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::trace;

use crate::error::XmlError;

/// One element of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    local_name: String,
    text: String,
}

impl XmlElement {
    /// Qualified name, including any namespace prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without namespace prefix.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Text of the element and all its descendants, untrimmed.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A parsed document as a flat list of elements in document order.
#[derive(Debug, Clone, Default)]
pub struct XmlDocument {
    elements: Vec<XmlElement>,
}

impl XmlDocument {
    /// Parse a document. Fails on syntax errors and unbalanced tags.
    pub fn parse(text: &str) -> Result<Self, XmlError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut reader = Reader::from_str(text);

        let mut elements: Vec<XmlElement> = Vec::new();
        let mut open: Vec<usize> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| XmlError::Syntax {
                position: reader.error_position(),
                message: e.to_string(),
            })?;

            match event {
                Event::Start(start) => {
                    elements.push(XmlElement {
                        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
                        local_name: String::from_utf8_lossy(start.local_name().as_ref())
                            .into_owned(),
                        text: String::new(),
                    });
                    open.push(elements.len() - 1);
                }
                Event::Empty(empty) => {
                    elements.push(XmlElement {
                        name: String::from_utf8_lossy(empty.name().as_ref()).into_owned(),
                        local_name: String::from_utf8_lossy(empty.local_name().as_ref())
                            .into_owned(),
                        text: String::new(),
                    });
                }
                Event::End(end) => {
                    let found = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    match open.pop() {
                        Some(idx) if elements[idx].name == found => {}
                        Some(idx) => {
                            return Err(XmlError::MismatchedEnd {
                                expected: elements[idx].name.clone(),
                                found,
                            });
                        }
                        None => {
                            return Err(XmlError::MismatchedEnd {
                                expected: String::new(),
                                found,
                            });
                        }
                    }
                }
                Event::Text(content) => {
                    let unescaped = content.unescape().map_err(|e| XmlError::Syntax {
                        position: reader.buffer_position(),
                        message: e.to_string(),
                    })?;
                    append_text(&mut elements, &open, &unescaped);
                }
                Event::CData(data) => {
                    let raw = data.into_inner();
                    append_text(&mut elements, &open, &String::from_utf8_lossy(&raw));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(&idx) = open.last() {
            return Err(XmlError::UnclosedElement(elements[idx].name.clone()));
        }
        if elements.is_empty() {
            return Err(XmlError::Empty);
        }

        trace!("Parsed XML document with {} elements", elements.len());

        Ok(Self { elements })
    }

    /// All elements in document order.
    pub fn elements(&self) -> &[XmlElement] {
        &self.elements
    }

    /// Elements whose qualified name is exactly `name`.
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.elements.iter().filter(move |e| e.name == name)
    }

    /// Trimmed text of the first element named `tag`.
    ///
    /// Looks up the qualified name first, then falls back to a
    /// case-insensitive match on local names so prefixed documents
    /// (`<nfe:pesoL>`) still resolve. Missing tags yield an empty string.
    pub fn find_text(&self, tag: &str) -> String {
        let element = self.elements_named(tag).next().or_else(|| {
            self.elements
                .iter()
                .find(|e| e.local_name.eq_ignore_ascii_case(tag))
        });

        element.map(|e| e.text.trim().to_string()).unwrap_or_default()
    }

    /// First non-empty [`find_text`](Self::find_text) over `tags`, in order.
    pub fn find_first_text<S: AsRef<str>>(&self, tags: &[S]) -> String {
        tags.iter()
            .map(|tag| self.find_text(tag.as_ref()))
            .find(|text| !text.is_empty())
            .unwrap_or_default()
    }
}

fn append_text(elements: &mut [XmlElement], open: &[usize], text: &str) {
    for &idx in open {
        elements[idx].text.push_str(text);
    }
}
