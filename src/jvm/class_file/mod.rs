//! Decoded form of the [`class` file format of the JVM][0]
//!
//! [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html

mod annotations;
mod attribute;
mod binary_format;
mod class;
mod code;
mod constants;
mod field;
mod method;
mod module;
mod version;

pub use annotations::*;
pub use attribute::*;
pub use binary_format::*;
pub use class::*;
pub use code::*;
pub use constants::*;
pub use field::*;
pub use method::*;
pub use module::*;
pub use version::*;
