//! Event handler values carried by attribute frames and the payloads dispatched to them.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use crate::core::completion::Completion;
use crate::render::frame::AttributeValue;
use crate::runtime::component_registry::ComponentId;

/// Engine-assigned identity of one live event binding.
///
/// Identities are allocated from a monotonically increasing counter and are
/// never handed out twice by the same renderer.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EventHandlerId(u64);

impl EventHandlerId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventHandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Payload delivered with a dispatched event.
#[derive(Clone, Debug, PartialEq)]
pub struct EventArgs {
    kind: Cow<'static, str>,
    value: Option<FieldValue>,
}

impl EventArgs {
    pub fn new(kind: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind: kind.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: FieldValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn value(&self) -> Option<&FieldValue> {
        self.value.as_ref()
    }
}

/// Client-visible value of a form field at the time an event fired.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
}

impl FieldValue {
    /// Attribute that mirrors this value on the owning element.
    pub fn attribute_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "value",
            FieldValue::Bool(_) => "checked",
        }
    }

    pub(crate) fn to_attribute_value(&self) -> AttributeValue {
        match self {
            FieldValue::Text(text) => AttributeValue::Text(text.clone()),
            FieldValue::Bool(flag) => AttributeValue::Bool(*flag),
        }
    }
}

/// Out-of-band correction applied before an event is handled: the client's
/// field already shows `value`, which the last committed render may not.
#[derive(Clone, Debug, PartialEq)]
pub struct EventFieldInfo {
    pub component_id: ComponentId,
    pub value: FieldValue,
}

type CallbackFn = dyn Fn(&EventArgs) -> Completion;

/// Callback bound to an attribute frame.
///
/// The receiver names the component that should handle the event. When no
/// explicit receiver is given, the component whose render produced the
/// attribute becomes the receiver.
#[derive(Clone)]
pub struct EventCallback {
    func: Rc<CallbackFn>,
    receiver: Option<ComponentId>,
}

impl EventCallback {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&EventArgs) -> Completion + 'static,
    {
        Self {
            func: Rc::new(func),
            receiver: None,
        }
    }

    /// Synchronous callback that always completes.
    pub fn from_fn<F>(func: F) -> Self
    where
        F: Fn(&EventArgs) + 'static,
    {
        Self::new(move |args| {
            func(args);
            Completion::completed()
        })
    }

    pub fn with_receiver(mut self, receiver: ComponentId) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn receiver(&self) -> Option<ComponentId> {
        self.receiver
    }

    pub fn invoke(&self, args: &EventArgs) -> Completion {
        (self.func)(args)
    }

    /// Whether both values wrap the same callback object and receiver.
    pub fn same_callback(&self, other: &EventCallback) -> bool {
        Rc::ptr_eq(&self.func, &other.func) && self.receiver == other.receiver
    }
}

impl PartialEq for EventCallback {
    fn eq(&self, other: &Self) -> bool {
        self.same_callback(other)
    }
}

impl fmt::Debug for EventCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventCallback")
            .field("receiver", &self.receiver)
            .finish_non_exhaustive()
    }
}
