//! Read JVM classes
//!
//! ### Simple example
//!
//! Consider the following simple Java class:
//!
//! ```java,ignore,no_run
//! public class Point {
//!     public final int x;
//!     public final int y;
//! }
//! ```
//!
//! Once compiled, the class file can be decoded and inspected as follows:
//!
//! ```no_run
//! use classreader::jvm::class_file::ClassFile;
//! use classreader::jvm::*;
//!
//! # fn inspect_class() -> Result<()> {
//! let bytes = std::fs::read("Point.class").map_err(Error::IoError)?;
//! let class = ClassFile::read(&mut bytes.as_slice())?;
//!
//! assert_eq!(class.class_name()?, "Point");
//! assert_eq!(class.declaration()?, "public class Point extends java.lang.Object");
//! for field in &class.fields {
//!     println!("{}", field.declaration(&class)?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Everything that refers to something else (a superclass, the type of a field, the target of an
//! `invokevirtual`) does so through an index into the constant pool of the class, so most queries
//! take the owning [`class_file::ClassFile`] or its [`class_file::ConstantPool`] as an argument
//! and resolve names only when asked.

mod access_flags;
pub mod bytecode;
pub mod class_file;
pub mod descriptors;
mod errors;
pub mod names;
pub mod verifier;
mod visitor;

pub use access_flags::*;
pub use errors::*;
pub use visitor::*;
