//! Minimal owned XML element tree.
//!
//! The v2.1 responses mix attribute-only leaves with text-bearing elements
//! and use two alternate layouts under `images`, so the mapper walks a tree
//! instead of deserializing into fixed structs.

use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: Element,
}

/// An XML element with its attributes, child elements and text content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Self>,
    text: String,
}

impl XmlDocument {
    /// Parses an XML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not well-formed XML, has no root
    /// element, or contains an unknown entity reference.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader
                .read_event()
                .with_context(|| format!("malformed XML at byte {}", reader.buffer_position()))?;

            match event {
                Event::Start(start) => stack.push(Element::from_start(&start, reader.decoder())?),
                Event::Empty(start) => {
                    let element = Element::from_start(&start, reader.decoder())?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack.pop().context("unexpected closing tag")?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => append_text(&mut stack, &text.decode()?),
                Event::CData(data) => append_text(&mut stack, &data.decode()?),
                Event::GeneralRef(reference) => {
                    append_text(&mut stack, &resolve_reference(&reference)?);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            bail!("unclosed element <{}>", open.name);
        }
        let root = root.context("document has no root element")?;
        Ok(Self { root })
    }

    /// Root element.
    #[must_use]
    pub const fn root(&self) -> &Element {
        &self.root
    }

    /// All elements named `name` in document order, the root included.
    #[must_use]
    pub fn find_all(&self, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        if self.root.name == name {
            found.push(&self.root);
        }
        self.root.collect_descendants(name, &mut found);
        found
    }

    /// First element named `name` in document order.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&Element> {
        self.find_all(name).into_iter().next()
    }
}

impl Element {
    /// Builds an element (without children) from a start or empty tag.
    fn from_start(start: &BytesStart<'_>, decoder: Decoder) -> Result<Self> {
        let name = decoder.decode(start.name().as_ref())?.into_owned();
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.with_context(|| format!("bad attribute on <{name}>"))?;
            let key = decoder.decode(attribute.key.as_ref())?.into_owned();
            let value = attribute
                .decode_and_unescape_value(decoder)
                .with_context(|| format!("bad value for {name}@{key}"))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    /// Tag name as written in the document.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value, if present.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text content with surrounding whitespace removed.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Direct child elements.
    pub fn children(&self) -> impl Iterator<Item = &Self> {
        self.children.iter()
    }

    /// First direct child named `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Text of the first direct child named `name`; `None` when the child is
    /// missing or empty.
    #[must_use]
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name)
            .map(Self::text)
            .filter(|text| !text.is_empty())
    }

    /// All descendants named `name` in document order (self excluded).
    #[must_use]
    pub fn find_all(&self, name: &str) -> Vec<&Self> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a Self>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect_descendants(name, found);
        }
    }
}

/// Attaches a completed element to its parent, or makes it the root.
fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        bail!("multiple root elements (second is <{}>)", element.name);
    }
    *root = Some(element);
    Ok(())
}

/// Appends text to the innermost open element. Text outside the root is
/// ignored.
fn append_text(stack: &mut [Element], text: &str) {
    if let Some(current) = stack.last_mut() {
        current.text.push_str(text);
    }
}

/// Resolves a character (`&#39;`) or predefined (`&amp;`) entity reference.
fn resolve_reference(reference: &BytesRef<'_>) -> Result<String> {
    if let Some(ch) = reference.resolve_char_ref()? {
        return Ok(ch.to_string());
    }
    let name = reference.decode()?;
    resolve_xml_entity(&name)
        .map(String::from)
        .with_context(|| format!("unknown entity reference &{name};"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    #[test]
    fn test_parse_elements_attributes_and_text() {
        // Arrange
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<movies>
    <movie>
        <name>Fight Club</name>
        <image type="poster" size="original" url="http://example.com/p.jpg" id="1"/>
    </movie>
</movies>"#;

        // Act
        let doc = XmlDocument::parse(xml).unwrap();

        // Assert
        assert_eq!(doc.root().name(), "movies");
        let movie = doc.first("movie").unwrap();
        assert_eq!(movie.child_text("name"), Some("Fight Club"));
        let image = movie.child("image").unwrap();
        assert_eq!(image.attribute("type"), Some("poster"));
        assert_eq!(image.attribute("id"), Some("1"));
        assert_eq!(image.attribute("missing"), None);
    }

    #[test]
    fn test_parse_resolves_entities_and_cdata() {
        // Arrange
        let xml = r#"<movie><name>Tom &amp; Jerry&#39;s</name><overview><![CDATA[<b>bold</b>]]></overview><cast><person name="A &quot;B&quot;"/></cast></movie>"#;

        // Act
        let doc = XmlDocument::parse(xml).unwrap();

        // Assert
        let movie = doc.root();
        assert_eq!(movie.child_text("name"), Some("Tom & Jerry's"));
        assert_eq!(movie.child_text("overview"), Some("<b>bold</b>"));
        let person = movie.find_all("person")[0];
        assert_eq!(person.attribute("name"), Some("A \"B\""));
    }

    #[test]
    fn test_child_text_empty_is_none() {
        // Arrange
        let doc = XmlDocument::parse("<movie><trailer>  </trailer><homepage/></movie>").unwrap();

        // Act & Assert
        assert_eq!(doc.root().child_text("trailer"), None);
        assert_eq!(doc.root().child_text("homepage"), None);
        assert_eq!(doc.root().child_text("absent"), None);
    }

    #[test]
    fn test_find_all_document_order() {
        // Arrange
        let xml = "<a><b id=\"1\"><b id=\"2\"/></b><c><b id=\"3\"/></c></a>";
        let doc = XmlDocument::parse(xml).unwrap();

        // Act
        let ids: Vec<&str> = doc
            .find_all("b")
            .iter()
            .filter_map(|b| b.attribute("id"))
            .collect();

        // Assert
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(doc.find_all("a").len(), 1);
        assert_eq!(doc.root().find_all("a").len(), 0);
    }

    #[test]
    fn test_parse_rejects_mismatched_tags() {
        // Arrange & Act
        let result = XmlDocument::parse("<movies><movie></movies>");

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_unclosed_root() {
        // Arrange & Act
        let result = XmlDocument::parse("<movies><movie></movie>");

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_empty_input() {
        // Arrange & Act
        let result = XmlDocument::parse("");

        // Assert
        assert!(result.unwrap_err().to_string().contains("no root element"));
    }
}
