use crate::jvm::class_file::ConstantKind;
use std::fmt::{self, Display, Formatter};
use std::io::ErrorKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Reading from the underlying input failed (for a reason other than running out of bytes)
    IoError(std::io::Error),

    /// The input does not follow the class file format (including ending too early)
    MalformedInput(String),

    /// Constant pool entry at this index starts with an undefined tag
    UnknownConstantPoolTag { tag: u8, index: u16 },

    /// Constant pool index is zero, out of range, or the unusable slot after a `long`/`double`
    InvalidIndex(u16),

    /// Constant pool entry exists, but is not of the expected kind
    TypeMismatch {
        index: u16,
        expected: &'static str,
        found: ConstantKind,
    },

    /// Stack map frame tags 128 to 246 are reserved
    ReservedFrameType(u8),

    /// Descriptor or signature could not be decoded
    BadDescriptor(String),

    /// A dynamic constant points at a bootstrap method the class doesn't have
    MissingBootstrapMethod(u16),
}

/// Running out of input in the middle of a structure means the structure is truncated
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        if err.kind() == ErrorKind::UnexpectedEof {
            Error::MalformedInput(String::from("unexpected end of input"))
        } else {
            Error::IoError(err)
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::IoError(err) => write!(f, "I/O error: {}", err),
            Error::MalformedInput(msg) => write!(f, "malformed class file: {}", msg),
            Error::UnknownConstantPoolTag { tag, index } => {
                write!(f, "unknown constant pool tag {} at index {}", tag, index)
            }
            Error::InvalidIndex(index) => write!(f, "invalid constant pool index {}", index),
            Error::TypeMismatch {
                index,
                expected,
                found,
            } => write!(
                f,
                "constant pool index {} is {}, expected {}",
                index, found, expected
            ),
            Error::ReservedFrameType(tag) => write!(f, "reserved stack map frame type {}", tag),
            Error::BadDescriptor(descriptor) => write!(f, "bad descriptor '{}'", descriptor),
            Error::MissingBootstrapMethod(index) => {
                write!(f, "no bootstrap method at index {}", index)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}
