//! Core interfaces and types.

pub mod completion;
pub mod component;
pub mod display;
pub mod event;
