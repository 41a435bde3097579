//! Component contract and the parameter values parents hand to children.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use crate::core::completion::Completion;
use crate::core::event::{EventArgs, EventCallback};
use crate::error::ComponentError;
use crate::render::builder::RenderTreeBuilder;
use crate::runtime::handle::RenderHandle;

/// Stateful unit of UI behavior owned by a renderer.
///
/// Only `configure`, `receive_parameters` and `render` are required; the
/// remaining hooks default to no-ops.
pub trait Component {
    /// Called exactly once, when the component is attached to the tree.
    fn configure(&mut self, handle: RenderHandle);

    /// Called before the first render and again whenever the parent supplies
    /// new parameters. A component that wants to render calls
    /// [`RenderHandle::request_render`].
    fn receive_parameters(&mut self, parameters: Parameters) -> Completion;

    /// Write the current output into `builder`.
    fn render(&mut self, builder: &mut RenderTreeBuilder) -> Result<(), ComponentError>;

    /// Handle an event whose binding names this component as receiver.
    fn handle_event(&mut self, callback: &EventCallback, args: &EventArgs) -> Completion {
        callback.invoke(args)
    }

    /// Runs after the display acknowledged a batch containing this component's render.
    fn after_render(&mut self, _first_render: bool) -> Completion {
        Completion::completed()
    }

    /// Runs at most once, when the component leaves the tree.
    fn dispose(&mut self) -> Result<(), ComponentError> {
        Ok(())
    }
}

type ComponentFactory = dyn Fn() -> Box<dyn Component>;

/// Named factory used by render output to materialize child components.
///
/// Two component types are the same type when their names match.
#[derive(Clone)]
pub struct ComponentType {
    name: &'static str,
    factory: Rc<ComponentFactory>,
}

impl ComponentType {
    pub fn new<F>(name: &'static str, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Component> + 'static,
    {
        Self {
            name,
            factory: Rc::new(factory),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn instantiate(&self) -> Box<dyn Component> {
        (self.factory)()
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentType").field(&self.name).finish()
    }
}

/// A single parameter value.
#[derive(Clone)]
pub enum ParameterValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Callback(EventCallback),
    /// Arbitrary shared value. Always treated as changed between renders since
    /// the renderer cannot see through interior mutability.
    Object(Rc<dyn Any>),
}

impl ParameterValue {
    pub fn object<T: Any>(value: T) -> Self {
        ParameterValue::Object(Rc::new(value))
    }

    /// Whether the value is known not to have changed since `previous`.
    fn unchanged_from(&self, previous: &ParameterValue) -> bool {
        match (self, previous) {
            (ParameterValue::Text(a), ParameterValue::Text(b)) => a == b,
            (ParameterValue::Int(a), ParameterValue::Int(b)) => a == b,
            (ParameterValue::Float(a), ParameterValue::Float(b)) => a.to_bits() == b.to_bits(),
            (ParameterValue::Bool(a), ParameterValue::Bool(b)) => a == b,
            (ParameterValue::Callback(a), ParameterValue::Callback(b)) => a.same_callback(b),
            _ => false,
        }
    }
}

impl PartialEq for ParameterValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParameterValue::Object(a), ParameterValue::Object(b)) => Rc::ptr_eq(a, b),
            _ => self.unchanged_from(other),
        }
    }
}

impl fmt::Debug for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Text(value) => f.debug_tuple("Text").field(value).finish(),
            ParameterValue::Int(value) => f.debug_tuple("Int").field(value).finish(),
            ParameterValue::Float(value) => f.debug_tuple("Float").field(value).finish(),
            ParameterValue::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            ParameterValue::Callback(value) => f.debug_tuple("Callback").field(value).finish(),
            ParameterValue::Object(_) => f.write_str("Object(..)"),
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::Text(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::Text(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Int(value)
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Float(value)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Bool(value)
    }
}

impl From<EventCallback> for ParameterValue {
    fn from(value: EventCallback) -> Self {
        ParameterValue::Callback(value)
    }
}

/// Ordered set of named parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(Cow<'static, str>, ParameterValue)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; replaces an existing entry with the same name.
    pub fn with(
        mut self,
        name: impl Into<Cow<'static, str>>,
        value: impl Into<ParameterValue>,
    ) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<Cow<'static, str>>, value: impl Into<ParameterValue>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(ParameterValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(ParameterValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(ParameterValue::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn callback(&self, name: &str) -> Option<&EventCallback> {
        match self.get(name) {
            Some(ParameterValue::Callback(value)) => Some(value),
            _ => None,
        }
    }

    pub fn object<T: Any>(&self, name: &str) -> Option<&T> {
        match self.get(name) {
            Some(ParameterValue::Object(value)) => value.downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.entries.iter().map(|(name, value)| (name.as_ref(), value))
    }

    /// True when both sets hold the same names and every value is a primitive
    /// equal to its previous counterpart. Object values always count as changed.
    pub fn unchanged_from(&self, previous: &Parameters) -> bool {
        self.entries.len() == previous.entries.len()
            && self.entries.iter().all(|(name, value)| {
                previous
                    .get(name)
                    .is_some_and(|old| value.unchanged_from(old))
            })
    }
}
