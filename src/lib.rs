//! Reader for JVM class files
//!
//! A class file is decoded in a single pass into a [`jvm::class_file::ClassFile`], which owns
//! its constant pool, fields, methods, and attributes. Symbolic references between those parts
//! stay as constant pool indices and are resolved on demand against the owning pool. Consumers
//! walk the decoded model through the [`jvm::Visitor`] trait, and the [`loader`] module takes
//! care of finding class files in directories and archives.

pub mod jvm;
pub mod loader;
pub mod util;
