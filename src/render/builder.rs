//! Frame sink handed to [`Component::render`](crate::Component::render).

use std::borrow::Cow;

use anyhow::anyhow;

use crate::core::component::{ComponentType, Parameters};
use crate::error::ComponentError;
use crate::render::frame::{AttributeValue, Frame, FrameKind};

/// Collects a component's output as a flat frame sequence.
///
/// Structural mistakes (closing something that is not open, attributes that do
/// not directly follow their element, frames left open) are reported when the
/// renderer collects the output and surface as a render failure of the
/// component.
#[derive(Debug, Default)]
pub struct RenderTreeBuilder {
    frames: Vec<Frame>,
    open: Vec<usize>,
    attributes_allowed: bool,
    error: Option<String>,
}

impl RenderTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_element(&mut self, tag: impl Into<Cow<'static, str>>) {
        self.open.push(self.frames.len());
        self.frames.push(Frame::Element {
            tag: tag.into(),
            subtree_length: 0,
        });
        self.attributes_allowed = true;
    }

    pub fn add_attribute(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        value: impl Into<AttributeValue>,
    ) {
        let name = name.into();
        if !self.attributes_allowed {
            self.fail(format!("attribute '{name}' does not directly follow an element"));
            return;
        }
        self.frames.push(Frame::Attribute {
            name,
            value: value.into(),
            handler_id: None,
        });
    }

    pub fn add_content(&mut self, content: impl Into<String>) {
        self.frames.push(Frame::text(content));
        self.attributes_allowed = false;
    }

    pub fn add_component(&mut self, component_type: ComponentType, parameters: Parameters) {
        self.frames.push(Frame::Component {
            component_type,
            parameters,
            component_id: None,
        });
        self.attributes_allowed = false;
    }

    pub fn open_region(&mut self) {
        self.open.push(self.frames.len());
        self.frames.push(Frame::Region { subtree_length: 0 });
        self.attributes_allowed = false;
    }

    pub fn close_element(&mut self) {
        self.close(FrameKind::Element);
    }

    pub fn close_region(&mut self) {
        self.close(FrameKind::Region);
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    fn close(&mut self, kind: FrameKind) {
        self.attributes_allowed = false;
        let Some(start) = self.open.pop() else {
            self.fail(format!("close of {kind:?} without a matching open"));
            return;
        };
        let length = self.frames.len() - start;
        let frame = &mut self.frames[start];
        if frame.kind() != kind {
            let found = frame.kind();
            self.fail(format!("close of {kind:?} while {found:?} is open"));
            return;
        }
        frame.set_subtree_length(length);
    }

    fn fail(&mut self, message: String) {
        if self.error.is_none() {
            self.error = Some(message);
        }
    }

    /// Take the collected frames, leaving an empty builder behind.
    pub(crate) fn finish(&mut self) -> Result<Vec<Frame>, ComponentError> {
        let frames = std::mem::take(&mut self.frames);
        let unclosed = std::mem::take(&mut self.open).len();
        self.attributes_allowed = false;
        if let Some(message) = self.error.take() {
            return Err(anyhow!("malformed render output: {message}"));
        }
        if unclosed > 0 {
            return Err(anyhow!("malformed render output: {unclosed} frame(s) left open"));
        }
        Ok(frames)
    }

    /// Reset for the next render, reusing `buffer`'s allocation.
    pub(crate) fn recycle(&mut self, mut buffer: Vec<Frame>) {
        buffer.clear();
        if buffer.capacity() > self.frames.capacity() {
            self.frames = buffer;
        }
        self.frames.clear();
        self.open.clear();
        self.attributes_allowed = false;
        self.error = None;
    }
}
