//! Android XML Documents
//!
//! A small DOM over Android XML files (`AndroidManifest.xml`,
//! `res/values/strings.xml`). Documents are parsed with `quick-xml` into a
//! tree of elements with ordered attributes and ordered child nodes, mutated
//! in memory, and serialized back with 4-space indentation.
//!
//! Attribute names are stored fully qualified (`android:name`), and
//! namespace declarations are kept as plain attributes of the element that
//! declares them. This keeps round-trips faithful without any namespace
//! resolution.
//!
//! Line-breaking whitespace between the children of a pure container
//! element is layout and is regenerated on output. Any element that holds
//! other text (a styled string such as `Hello <b>world</b>`) keeps its whole
//! subtree verbatim, text segments and all. Comments are kept in place.

use quick_xml::escape::partial_escape;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// Attribute holding the key of `meta-data`, `uses-library` and component
/// elements.
pub const ANDROID_NAME: &str = "android:name";

/// Class-name suffix identifying the main application element.
pub const MAIN_APPLICATION_SUFFIX: &str = ".MainApplication";

const INDENT: &str = "    ";

/// Document Errors
///
/// This is the exhaustive list of possible errors raised while reading,
/// writing or inspecting XML documents.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading the document at the specified path failed.
    #[error("cannot read {0:?}: {1}")]
    Read(std::path::PathBuf, std::io::Error),
    /// The XML parser rejected the document.
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// An attribute could not be parsed.
    #[error("malformed XML attribute: {0}")]
    Attribute(#[from] AttrError),
    /// Writing the serialized document failed.
    #[error("cannot serialize XML: {0}")]
    Write(#[from] std::io::Error),
    /// The document is well-formed XML, but structurally invalid.
    #[error("malformed XML: {0}")]
    Malformed(&'static str),
    /// No `application` element with a `.MainApplication` name exists.
    #[error("manifest has no application named '*.MainApplication'")]
    MainApplication,
}

/// XML Node
///
/// A single child of an element. Text is stored unescaped, comments are
/// stored as their raw content between `<!--` and `-->`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(v) => Some(v),
            _ => None,
        }
    }

    // Indentation between elements. A whitespace run without a line break
    // separates inline elements and counts as content.
    fn is_layout(&self) -> bool {
        matches!(self, Node::Text(v) if v.trim().is_empty() && v.contains('\n'))
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>, depth: usize, pretty: bool) -> Result<(), Error> {
        match self {
            Node::Element(v) => v.write(writer, depth, pretty),
            Node::Text(v) => {
                writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(v.as_str()))))?;
                Ok(())
            },
            Node::Comment(v) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(v.as_str())))?;
                Ok(())
            },
        }
    }
}

/// XML Element
///
/// A single element with its attributes in document order and its child
/// nodes (elements, text, comments) in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style `set_attribute()`.
    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder-style child insertion, keeping children grouped by tag.
    pub fn with_child(mut self, child: Element) -> Self {
        self.insert_child(child);
        self
    }

    /// Builder-style `set_text()`.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set attribute value
    ///
    /// Replace the value of the attribute in place if it exists, otherwise
    /// append the attribute.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();

        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Text content
    ///
    /// Return the concatenated text if the element holds nothing but text.
    /// Elements with child elements or comments, and empty elements, yield
    /// `None`.
    pub fn text(&self) -> Option<String> {
        if self.children.is_empty() {
            return None;
        }

        self.children.iter().map(|v| match v {
            Node::Text(v) => Some(v.as_str()),
            _ => None,
        }).collect()
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![Node::Text(text.into())];
    }

    /// Iterate all child elements, skipping text and comments.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Iterate all children with the given tag.
    pub fn children_by_tag<'a>(
        &'a self,
        tag: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |v| v.tag == tag)
    }

    /// Find the first child element matching `predicate`.
    pub fn find_element_mut(
        &mut self,
        mut predicate: impl FnMut(&Element) -> bool,
    ) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|v| match v {
            Node::Element(v) => if predicate(v) { Some(v) } else { None },
            _ => None,
        })
    }

    /// Remove all child elements not matching `keep`
    ///
    /// Text and comments are never removed. Returns the number of removed
    /// elements.
    pub fn retain_elements(&mut self, mut keep: impl FnMut(&Element) -> bool) -> usize {
        let len = self.children.len();
        self.children.retain(|v| v.as_element().map_or(true, &mut keep));
        len - self.children.len()
    }

    // Position of the first child with `tag` whose `android:name` is `key`.
    fn keyed_child_position(&self, tag: &str, key: &str) -> Option<usize> {
        self.children.iter().position(|v| {
            v.as_element()
                .map_or(false, |v| v.tag == tag && v.attribute(ANDROID_NAME) == Some(key))
        })
    }

    // Child element at `idx`, which callers obtained from a position lookup.
    fn element_at_mut(&mut self, idx: usize) -> &mut Element {
        match &mut self.children[idx] {
            Node::Element(v) => v,
            _ => std::unreachable!(),
        }
    }

    /// Find the first child with `tag` whose `android:name` is `key`.
    pub fn find_keyed_child(&self, tag: &str, key: &str) -> Option<&Element> {
        self.keyed_child_position(tag, key)
            .and_then(|v| self.children[v].as_element())
    }

    /// Insert child element
    ///
    /// Insert the child right after the last child element with the same
    /// tag, so elements of one kind stay together. If there is no such child,
    /// the new one is appended. Returns the index of the inserted node.
    pub fn insert_child(&mut self, child: Element) -> usize {
        let last = self.children.iter().rposition(
            |v| v.as_element().map_or(false, |v| v.tag == child.tag)
        );
        let idx = match last {
            Some(v) => v + 1,
            None => self.children.len(),
        };
        self.children.insert(idx, Node::Element(child));
        idx
    }

    /// Find or insert a keyed child
    ///
    /// Look up the first child with the given tag whose `android:name`
    /// attribute matches `key`. If there is none, a new child carrying just
    /// the key is inserted. Either way, a mutable reference to the child is
    /// returned so the caller can update its value attributes in place.
    ///
    /// Existing duplicates are left untouched, only the first match is
    /// returned.
    pub fn upsert_keyed_child(&mut self, tag: &str, key: &str) -> &mut Element {
        let idx = match self.keyed_child_position(tag, key) {
            Some(v) => v,
            None => self.insert_child(Element::new(tag).with_attribute(ANDROID_NAME, key)),
        };
        self.element_at_mut(idx)
    }

    /// Remove all children with `tag` whose `android:name` is `key`. Returns
    /// the number of removed children.
    pub fn remove_keyed_children(&mut self, tag: &str, key: &str) -> usize {
        self.retain_elements(|v| !(v.tag == tag && v.attribute(ANDROID_NAME) == Some(key)))
    }

    // Whether any child is text other than indentation.
    fn has_text(&self) -> bool {
        self.children.iter().any(|v| matches!(v, Node::Text(_)) && !v.is_layout())
    }

    // Drop indentation between children of pure containers. Subtrees with
    // text content are left verbatim, and so are elements holding nothing
    // but indentation.
    fn strip_layout(&mut self) {
        if self.has_text() {
            return;
        }

        if self.children.iter().any(|v| !matches!(v, Node::Text(_))) {
            self.children.retain(|v| !v.is_layout());
        }

        for child in self.children.iter_mut().filter_map(Node::as_element_mut) {
            child.strip_layout();
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, Error> {
        let name = start.name();
        let tag = std::str::from_utf8(name.as_ref())
            .map_err(|_| Error::Malformed("element name is not valid UTF-8"))?;
        let mut element = Element::new(tag);

        for attr in start.attributes() {
            let attr = attr?;
            let name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|_| Error::Malformed("attribute name is not valid UTF-8"))?;
            let value = attr.unescape_value()?;
            element.attributes.push((name.to_string(), value.into_owned()));
        }

        Ok(element)
    }

    fn push_text(&mut self, text: &str) {
        match self.children.last_mut() {
            Some(Node::Text(v)) => v.push_str(text),
            _ => self.children.push(Node::Text(text.to_string())),
        }
    }

    // Children are indented only if `pretty` is set and the element holds
    // no text at all. Otherwise the subtree is written as stored.
    fn write(&self, writer: &mut Writer<Vec<u8>>, depth: usize, pretty: bool) -> Result<(), Error> {
        let mut start = BytesStart::new(self.tag.as_str());
        for (k, v) in self.attributes.iter() {
            start.push_attribute((k.as_str(), v.as_str()));
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        let pretty = pretty && !self.children.iter().any(|v| matches!(v, Node::Text(_)));

        writer.write_event(Event::Start(start))?;
        for child in self.children.iter() {
            if pretty {
                write_line_break(writer, depth + 1)?;
            }
            child.write(writer, depth + 1, pretty)?;
        }
        if pretty {
            write_line_break(writer, depth)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.tag.as_str())))?;

        Ok(())
    }
}

fn write_line_break(writer: &mut Writer<Vec<u8>>, depth: usize) -> Result<(), Error> {
    let indent = format!("\n{}", INDENT.repeat(depth));
    writer.write_event(Event::Text(BytesText::from_escaped(indent)))?;
    Ok(())
}

// Attach a completed element to its parent, or make it the root.
fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), Error> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        Ok(())
    } else if root.is_none() {
        *root = Some(element);
        Ok(())
    } else {
        Err(Error::Malformed("multiple root elements"))
    }
}

/// XML Document
///
/// A parsed XML file. The root element is accessible via `root`. Whether the
/// source had an XML declaration is remembered, so it is only written back
/// if it was present. Comments preceding the root element are kept in
/// `prolog`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub declaration: bool,
    pub prolog: Vec<String>,
    pub root: Element,
}

impl Document {
    /// Parse document from string
    pub fn parse_str(content: &str) -> Result<Self, Error> {
        let mut reader = Reader::from_str(content);

        let mut buffer = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut prolog = Vec::new();
        let mut declaration = false;

        loop {
            match reader.read_event_into(&mut buffer)? {
                Event::Start(start) => {
                    stack.push(Element::from_start(&start)?);
                },
                Event::Empty(start) => {
                    let element = Element::from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                },
                Event::End(_) => {
                    let element = stack.pop()
                        .ok_or(Error::Malformed("unbalanced end tag"))?;
                    attach(&mut stack, &mut root, element)?;
                },
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        current.push_text(&text.unescape()?);
                    }
                },
                Event::CData(text) => {
                    if let Some(current) = stack.last_mut() {
                        let text = std::str::from_utf8(&text)
                            .map_err(|_| Error::Malformed("CDATA is not valid UTF-8"))?;
                        current.push_text(text);
                    }
                },
                Event::Comment(text) => {
                    let text = std::str::from_utf8(&text)
                        .map_err(|_| Error::Malformed("comment is not valid UTF-8"))?;
                    if let Some(current) = stack.last_mut() {
                        current.children.push(Node::Comment(text.to_string()));
                    } else if root.is_none() {
                        prolog.push(text.to_string());
                    }
                },
                Event::Decl(_) => {
                    declaration = true;
                },
                Event::Eof => break,
                _ => {},
            }
            buffer.clear();
        }

        if !stack.is_empty() {
            return Err(Error::Malformed("unclosed elements"));
        }

        let mut root = root.ok_or(Error::Malformed("no root element"))?;
        root.strip_layout();

        Ok(Self {
            declaration,
            prolog,
            root,
        })
    }

    /// Parse document from file-system
    ///
    /// The file is read completely into memory and closed before parsing.
    pub fn parse_path(path: &std::path::Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|v| Error::Read(path.to_path_buf(), v))?;
        Self::parse_str(&content)
    }

    /// Serialize document
    ///
    /// Render the document as indented XML text with a trailing newline.
    pub fn to_xml_string(&self) -> Result<String, Error> {
        let mut writer = Writer::new(Vec::new());

        if self.declaration {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
            write_line_break(&mut writer, 0)?;
        }
        for comment in self.prolog.iter() {
            writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?;
            write_line_break(&mut writer, 0)?;
        }
        self.root.write(&mut writer, 0, true)?;

        let mut content = String::from_utf8(writer.into_inner())
            .map_err(|_| Error::Malformed("serialized document is not valid UTF-8"))?;
        content.push('\n');

        Ok(content)
    }

    // Position of the main application among the root's children.
    fn main_application_position(&self) -> Option<usize> {
        self.root.children.iter().position(|v| {
            v.as_element().map_or(false, |v| {
                v.tag == "application"
                    && v.attribute(ANDROID_NAME)
                        .map_or(false, |v| v.ends_with(MAIN_APPLICATION_SUFFIX))
            })
        })
    }

    /// Return the main application
    ///
    /// The main application is the first `application` element whose
    /// `android:name` ends in `.MainApplication`.
    pub fn main_application(&self) -> Result<&Element, Error> {
        let idx = self.main_application_position().ok_or(Error::MainApplication)?;
        self.root.children[idx].as_element().ok_or(Error::MainApplication)
    }

    /// Mutable variant of `main_application()`.
    pub fn main_application_mut(&mut self) -> Result<&mut Element, Error> {
        let idx = self.main_application_position().ok_or(Error::MainApplication)?;
        Ok(self.root.element_at_mut(idx))
    }
}
