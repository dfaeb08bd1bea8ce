//! Declarative element descriptions returned by render functions.

use crate::component::ComponentType;
use crate::value::{AttrValue, Attributes, EventHandler, Key};

#[derive(Clone, Debug, PartialEq)]
pub enum Tag {
    Host(String),
    Text(String),
    Component(ComponentType),
    Empty,
}

impl Tag {
    /// Whether a node of tag `self` can be reused for an element of tag `other`.
    pub fn same_type(&self, other: &Tag) -> bool {
        match (self, other) {
            (Tag::Host(a), Tag::Host(b)) => a == b,
            (Tag::Text(_), Tag::Text(_)) => true,
            (Tag::Component(a), Tag::Component(b)) => a.same_declaration(b),
            (Tag::Empty, Tag::Empty) => true,
            _ => false,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Tag::Host(name) => name,
            Tag::Text(_) => "#text",
            Tag::Component(ty) => ty.name(),
            Tag::Empty => "#empty",
        }
    }

    pub fn is_component(&self) -> bool {
        matches!(self, Tag::Component(_))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub tag: Tag,
    pub key: Option<Key>,
    pub attributes: Attributes,
    pub children: Vec<Child>,
}

impl Element {
    /// Host element such as `div`.
    pub fn new(tag: impl Into<String>) -> Self {
        Self::with_tag(Tag::Host(tag.into()))
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::with_tag(Tag::Text(content.into()))
    }

    /// Renders nothing. Mounted as an empty text node so it still holds a slot.
    pub fn empty() -> Self {
        Self::with_tag(Tag::Empty)
    }

    pub fn component(ty: &ComponentType) -> Self {
        Self::with_tag(Tag::Component(ty.clone()))
    }

    fn with_tag(tag: Tag) -> Self {
        Self {
            tag,
            key: None,
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Attaches an event handler under the attribute `on<event>`.
    pub fn on(self, event: &str, handler: impl Fn() + 'static) -> Self {
        self.attr(event_attribute(event), EventHandler::new(handler))
    }

    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Child>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Text content when this is a text element.
    pub fn text_content(&self) -> Option<&str> {
        match &self.tag {
            Tag::Text(content) => Some(content),
            _ => None,
        }
    }
}

/// Attribute name an event handler is stored under.
pub fn event_attribute(event: &str) -> String {
    let mut name = String::with_capacity(event.len() + 2);
    name.push_str("on");
    let mut chars = event.chars();
    if let Some(first) = chars.next() {
        name.extend(first.to_uppercase());
        name.push_str(chars.as_str());
    }
    name
}

/// A child slot as written by a render function.
#[derive(Clone, Debug, PartialEq)]
pub enum Child {
    Element(Element),
    Text(String),
    Number(f64),
    List(Vec<Child>),
}

impl From<Element> for Child {
    fn from(value: Element) -> Self {
        Child::Element(value)
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Child::Text(value.to_owned())
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Child::Text(value)
    }
}

impl From<f64> for Child {
    fn from(value: f64) -> Self {
        Child::Number(value)
    }
}

impl From<i32> for Child {
    fn from(value: i32) -> Self {
        Child::Number(f64::from(value))
    }
}

impl From<i64> for Child {
    fn from(value: i64) -> Self {
        Child::Number(value as f64)
    }
}

impl From<Vec<Element>> for Child {
    fn from(value: Vec<Element>) -> Self {
        Child::List(value.into_iter().map(Child::Element).collect())
    }
}

impl From<Vec<Child>> for Child {
    fn from(value: Vec<Child>) -> Self {
        Child::List(value)
    }
}

/// Flattens nested lists and turns text and numbers into text elements.
pub fn flatten_children(children: &[Child]) -> Vec<Element> {
    let mut flat = Vec::with_capacity(children.len());
    flatten_into(children, &mut flat);
    flat
}

fn flatten_into(children: &[Child], out: &mut Vec<Element>) {
    for child in children {
        match child {
            Child::Element(element) => out.push(element.clone()),
            Child::Text(text) => out.push(Element::text(text.as_str())),
            Child::Number(number) => out.push(Element::text(number.to_string())),
            Child::List(nested) => flatten_into(nested, out),
        }
    }
}

#[cfg(test)]
#[path = "tests/element_tests.rs"]
mod tests;
