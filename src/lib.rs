mod config;
mod data;
mod device;
mod params;

pub mod adapter;

#[derive(Debug)]
pub enum Error {
    /// The operation has no meaning in the instrument's active mode.
    UnsupportedInMode { operation: &'static str, mode: params::Mode },
    NotImplemented(&'static str),
    Parse(data::ParseError),
    /// The instrument replied with text the driver cannot interpret.
    InvalidResponse(String),
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::UnsupportedInMode { operation, mode } =>
                write!(f, "{} is not supported in {:?} mode", operation, mode),
            Self::NotImplemented(feature) =>
                write!(f, "{} is not implemented", feature),
            Self::Parse(parse_error) =>
                write!(f, "measurement parse error: {}", parse_error),
            Self::InvalidResponse(response) =>
                write!(f, "invalid instrument response: {:?}", response),
            Self::Io(io_error) =>
                write!(f, "I/O error: {}", io_error),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            &Self::Parse(ref parse_error) => Some(parse_error),
            &Self::Io(ref io_error) => Some(io_error),
            _ => None
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io(error)
    }
}

impl From<data::ParseError> for Error {
    fn from(error: data::ParseError) -> Self {
        Error::Parse(error)
    }
}

pub type Result<T> =
    core::result::Result<T, Error>;

pub use params::{
    Mode,
    DataFormat,
    ByteOrder,
    Element,
};

pub use config::FormatConfig;

pub use data::{
    LimitFlags,
    ParseError,
    MeasurementSet,
};

pub use device::Device;

pub use adapter::Adapter;

#[cfg(feature = "serial")]
pub use adapter::serial::SerialAdapter;
