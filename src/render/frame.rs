//! Typed render model.
//!
//! A component's render output is a flat sequence of [`Frame`]s. Elements and
//! regions record how many frames their subtree spans (themselves included);
//! attributes directly follow the element they belong to.

use std::borrow::Cow;

use crate::core::component::{ComponentType, Parameters};
use crate::core::event::{EventCallback, EventHandlerId};
use crate::runtime::component_registry::ComponentId;

/// Value carried by an attribute frame.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Bool(bool),
    Handler(EventCallback),
}

impl AttributeValue {
    pub fn as_handler(&self) -> Option<&EventCallback> {
        match self {
            AttributeValue::Handler(callback) => Some(callback),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<EventCallback> for AttributeValue {
    fn from(value: EventCallback) -> Self {
        AttributeValue::Handler(value)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FrameKind {
    Element,
    Text,
    Attribute,
    Component,
    Region,
}

/// One node of a component's rendered output.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Element {
        tag: Cow<'static, str>,
        subtree_length: usize,
    },
    Text {
        content: String,
    },
    Attribute {
        name: Cow<'static, str>,
        value: AttributeValue,
        /// Stamped by the renderer when `value` is a handler.
        handler_id: Option<EventHandlerId>,
    },
    /// Placeholder for a child component. Its own output lives in the child's
    /// frame sequence, never inline.
    Component {
        component_type: ComponentType,
        parameters: Parameters,
        /// Assigned by the renderer when the child is attached.
        component_id: Option<ComponentId>,
    },
    Region {
        subtree_length: usize,
    },
}

impl Frame {
    pub fn text(content: impl Into<String>) -> Self {
        Frame::Text {
            content: content.into(),
        }
    }

    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Element { .. } => FrameKind::Element,
            Frame::Text { .. } => FrameKind::Text,
            Frame::Attribute { .. } => FrameKind::Attribute,
            Frame::Component { .. } => FrameKind::Component,
            Frame::Region { .. } => FrameKind::Region,
        }
    }

    /// Number of frames this frame's subtree spans, itself included.
    pub fn subtree_length(&self) -> usize {
        match self {
            Frame::Element { subtree_length, .. } | Frame::Region { subtree_length } => {
                *subtree_length
            }
            _ => 1,
        }
    }

    pub(crate) fn set_subtree_length(&mut self, length: usize) {
        if let Frame::Element { subtree_length, .. } | Frame::Region { subtree_length } = self {
            *subtree_length = length;
        }
    }

    /// Whether `other` describes the same logical node at a position, so the
    /// renderer updates it in place instead of replacing it.
    pub fn same_shape(&self, other: &Frame) -> bool {
        match (self, other) {
            (Frame::Element { tag: a, .. }, Frame::Element { tag: b, .. }) => a == b,
            (Frame::Text { .. }, Frame::Text { .. }) => true,
            (Frame::Attribute { name: a, .. }, Frame::Attribute { name: b, .. }) => a == b,
            (
                Frame::Component {
                    component_type: a, ..
                },
                Frame::Component {
                    component_type: b, ..
                },
            ) => a == b,
            (Frame::Region { .. }, Frame::Region { .. }) => true,
            _ => false,
        }
    }

    pub fn handler_id(&self) -> Option<EventHandlerId> {
        match self {
            Frame::Attribute { handler_id, .. } => *handler_id,
            _ => None,
        }
    }

    pub fn component_id(&self) -> Option<ComponentId> {
        match self {
            Frame::Component { component_id, .. } => *component_id,
            _ => None,
        }
    }

    pub fn attribute_name(&self) -> Option<&str> {
        match self {
            Frame::Attribute { name, .. } => Some(name),
            _ => None,
        }
    }
}
