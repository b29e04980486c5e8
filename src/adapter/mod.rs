use crate::Error;

/// Blocking text transport to the instrument.
///
/// Implementations own the line terminator: `write` takes a bare command, and `ask`
/// returns the response with the terminator already removed. Transport failures
/// propagate unmodified.
pub trait Adapter {
    fn write(&mut self, command: &str) -> Result<(), Error>;
    fn ask(&mut self, command: &str) -> Result<String, Error>;
}

#[cfg(feature = "serial")]
pub mod serial;
