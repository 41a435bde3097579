//! Exception policy hook.
//!
//! Every failure that originates in component or display code passes through
//! one [`ExceptionHandler`]. Returning `Err` makes it fatal for the caller that
//! is driving the renderer; returning `Ok` swallows it and rendering goes on.

use crate::error::RenderError;

pub trait ExceptionHandler {
    fn handle_exception(&mut self, error: RenderError) -> Result<(), RenderError>;
}

/// Default policy: hand every failure back to the caller.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rethrow;

impl ExceptionHandler for Rethrow {
    fn handle_exception(&mut self, error: RenderError) -> Result<(), RenderError> {
        Err(error)
    }
}

/// Log every failure and keep going.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogAndContinue;

impl ExceptionHandler for LogAndContinue {
    fn handle_exception(&mut self, error: RenderError) -> Result<(), RenderError> {
        tracing::error!(error = %error, "render failure suppressed");
        Ok(())
    }
}

impl<F> ExceptionHandler for F
where
    F: FnMut(RenderError) -> Result<(), RenderError>,
{
    fn handle_exception(&mut self, error: RenderError) -> Result<(), RenderError> {
        self(error)
    }
}
