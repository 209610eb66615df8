pub type Result<T> = std::result::Result<T, Error>;

/// An error talking to, or understanding, a Tympan
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An error occurred in the [TympanBaseDevice](crate::device::TympanBaseDevice)
    #[error("Device error: `{0:?}`")]
    Device(DeviceError),

    /// A reply line was recognised but its payload could not be decoded
    ///
    /// `line` holds the raw offending text, since the device's output is unversioned.
    #[error("Could not decode `{line}`: {reason}")]
    Decode { line: String, reason: String },

    /// The reply held nothing of the kind that was asked for (described by the `&str`)
    #[error("No {0} found in reply")]
    EmptyResult(&'static str),

    /// Local I/O failed, e.g. writing a received file
    #[error("IO error: `{0}`")]
    Io(std::io::Error),

    /// Another error occurred
    #[error("Other Tympan error: `{0}`")]
    Other(String),
}

impl Error {
    pub(crate) fn decode(line: &str, reason: impl Into<String>) -> Self {
        Error::Decode {
            line: line.to_owned(),
            reason: reason.into(),
        }
    }

    /// Whether the device went silent while data was still expected
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Device(DeviceError(crate::device::Error::Timeout(_)))
        )
    }
}

#[derive(Debug)]
pub struct DeviceError(crate::device::Error);

impl From<super::device::Error> for Error {
    fn from(e: super::device::Error) -> Self {
        Error::Device(DeviceError(e))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(e: std::string::FromUtf8Error) -> Self {
        Error::Other(format!(
            "invalid string received: {:?} ({})",
            String::from_utf8_lossy(e.as_bytes()),
            e.utf8_error()
        ))
    }
}
