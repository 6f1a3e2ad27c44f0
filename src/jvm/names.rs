//! Class name helpers
//!
//! Class files store names in their internal form (`java/lang/String`), except for array
//! classes, which are stored as descriptors (`[Ljava/lang/String;`). Everything exposed by this
//! crate uses the dotted Java form instead.
//!
//! See <https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.2.1>

use crate::jvm::{descriptors, Result};

/// Special method names
pub const INIT: &str = "<init>";
pub const CLINIT: &str = "<clinit>";

/// Dotted class name from an internal name
pub fn class_name(internal_name: &str) -> Result<String> {
    if internal_name.starts_with('[') {
        descriptors::convert(internal_name)
    } else {
        Ok(internal_name.replace('/', "."))
    }
}

/// Package part of a dotted class name (empty for the default package)
pub fn package_name(class_name: &str) -> &str {
    match class_name.rfind('.') {
        Some(dot) => &class_name[..dot],
        None => "",
    }
}

/// Class name without its package
pub fn simple_name(class_name: &str) -> &str {
    match class_name.rfind('.') {
        Some(dot) => &class_name[dot + 1..],
        None => class_name,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn internal_names() {
        assert_eq!(class_name("java/lang/String").unwrap(), "java.lang.String");
        assert_eq!(class_name("Foo").unwrap(), "Foo");
        assert_eq!(class_name("[Ljava/lang/Object;").unwrap(), "java.lang.Object[]");
        assert!(class_name("[Q").is_err());
    }

    #[test]
    fn packages_and_simple_names() {
        assert_eq!(package_name("java.util.Map$Entry"), "java.util");
        assert_eq!(simple_name("java.util.Map$Entry"), "Map$Entry");
        assert_eq!(package_name("Foo"), "");
        assert_eq!(simple_name("Foo"), "Foo");
    }
}
