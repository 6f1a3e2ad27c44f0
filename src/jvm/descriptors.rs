//! Turn descriptors into readable Java types
//!
//! Descriptors are the compact type strings stored in class files, such as `Ljava/lang/String;`,
//! `[I`, or `(IJ)V`. Generic type variables (`TT;`) are accepted wherever a class type is, so
//! that the same functions can render simple signatures too.
//!
//! [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.3

use crate::jvm::{Error, Result};
use std::iter::Peekable;
use std::str::Chars;

/// Primitive value types
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    /// Parse the single character used in descriptors
    pub fn from_descriptor(c: char) -> Option<BaseType> {
        let typ = match c {
            'B' => BaseType::Byte,
            'C' => BaseType::Char,
            'D' => BaseType::Double,
            'F' => BaseType::Float,
            'I' => BaseType::Int,
            'J' => BaseType::Long,
            'S' => BaseType::Short,
            'Z' => BaseType::Boolean,
            _ => return None,
        };
        Some(typ)
    }

    /// Java keyword for the type
    pub fn java_name(self) -> &'static str {
        match self {
            BaseType::Byte => "byte",
            BaseType::Char => "char",
            BaseType::Double => "double",
            BaseType::Float => "float",
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::Short => "short",
            BaseType::Boolean => "boolean",
        }
    }
}

/// Convert a single field descriptor (or `V`) to its Java rendering
///
/// ```
/// use classreader::jvm::descriptors::convert;
///
/// assert_eq!(convert("Ljava/lang/String;").unwrap(), "java.lang.String");
/// assert_eq!(convert("[[I").unwrap(), "int[][]");
/// assert_eq!(convert("V").unwrap(), "void");
/// ```
pub fn convert(descriptor: &str) -> Result<String> {
    let mut chars = descriptor.chars().peekable();
    let typ = parse_type(&mut chars, true).ok_or_else(|| bad(descriptor))?;
    match chars.next() {
        None => Ok(typ),
        Some(_) => Err(bad(descriptor)),
    }
}

/// Parenthesized, comma-separated parameter types of a method descriptor
///
/// ```
/// use classreader::jvm::descriptors::signature;
///
/// assert_eq!(signature("(I)V").unwrap(), "(int)");
/// assert_eq!(signature("(Ljava/lang/String;[J)Z").unwrap(), "(java.lang.String, long[])");
/// ```
pub fn signature(descriptor: &str) -> Result<String> {
    let (parameters, _) = split_method(descriptor)?;
    Ok(format!("({})", parameters.join(", ")))
}

/// Individual parameter types of a method descriptor
pub fn parameter_types(descriptor: &str) -> Result<Vec<String>> {
    split_method(descriptor).map(|(parameters, _)| parameters)
}

/// Number of parameters of a method descriptor (not the number of local variable slots)
pub fn parameter_count(descriptor: &str) -> Result<usize> {
    split_method(descriptor).map(|(parameters, _)| parameters.len())
}

/// Return type of a method descriptor
pub fn return_type(descriptor: &str) -> Result<String> {
    split_method(descriptor).map(|(_, return_type)| return_type)
}

fn bad(descriptor: &str) -> Error {
    Error::BadDescriptor(descriptor.to_owned())
}

/// Split `(params)ret` into rendered parameters and the rendered return type
///
/// Parameters are variable width (`I` versus `Ljava/lang/Object;` versus `[[J`), so the
/// parameter section gets tokenized one full type at a time.
fn split_method(descriptor: &str) -> Result<(Vec<String>, String)> {
    let mut chars = descriptor.chars().peekable();
    if chars.next() != Some('(') {
        return Err(bad(descriptor));
    }

    let mut parameters = vec![];
    loop {
        match chars.peek() {
            Some(')') => {
                chars.next();
                break;
            }
            Some(_) => {
                let parameter = parse_type(&mut chars, false).ok_or_else(|| bad(descriptor))?;
                parameters.push(parameter);
            }
            None => return Err(bad(descriptor)),
        }
    }

    let return_type = parse_type(&mut chars, true).ok_or_else(|| bad(descriptor))?;
    if chars.next().is_some() {
        return Err(bad(descriptor));
    }
    Ok((parameters, return_type))
}

/// Read one complete type (array prefixes included) off the front of the input
fn parse_type(chars: &mut Peekable<Chars>, allow_void: bool) -> Option<String> {
    let mut dimensions = 0;
    while chars.next_if_eq(&'[').is_some() {
        dimensions += 1;
    }

    let mut rendered = match chars.next()? {
        'L' | 'T' => {
            let mut name = String::new();
            loop {
                match chars.next()? {
                    ';' => break,
                    '/' => name.push('.'),
                    c => name.push(c),
                }
            }
            if name.is_empty() {
                return None;
            }
            name
        }
        'V' if allow_void && dimensions == 0 => String::from("void"),
        c => String::from(BaseType::from_descriptor(c)?.java_name()),
    };

    for _ in 0..dimensions {
        rendered.push_str("[]");
    }
    Some(rendered)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn base_types() {
        for (descriptor, java) in [
            ("B", "byte"),
            ("C", "char"),
            ("D", "double"),
            ("F", "float"),
            ("I", "int"),
            ("J", "long"),
            ("S", "short"),
            ("V", "void"),
            ("Z", "boolean"),
        ] {
            assert_eq!(convert(descriptor).unwrap(), java);
        }
    }

    #[test]
    fn class_and_array_types() {
        assert_eq!(convert("Ljava/lang/String;").unwrap(), "java.lang.String");
        assert_eq!(convert("[[I").unwrap(), "int[][]");
        assert_eq!(convert("[Ljava/util/Map$Entry;").unwrap(), "java.util.Map$Entry[]");
        assert_eq!(convert("TT;").unwrap(), "T");
    }

    #[test]
    fn malformed_field_descriptors() {
        for descriptor in ["", "Q", "Ljava/lang/String", "L;", "II", "[V", "["] {
            assert!(
                matches!(convert(descriptor), Err(Error::BadDescriptor(_))),
                "'{}' should not convert",
                descriptor
            );
        }
    }

    #[test]
    fn simple_method() {
        assert_eq!(signature("(I)V").unwrap(), "(int)");
        assert_eq!(return_type("(I)V").unwrap(), "void");
        assert_eq!(parameter_count("(I)V").unwrap(), 1);
    }

    #[test]
    fn method_with_references_and_arrays() {
        let descriptor = "(Ljava/lang/String;I)Ljava/lang/Object;";
        assert_eq!(parameter_count(descriptor).unwrap(), 2);
        assert_eq!(
            parameter_types(descriptor).unwrap(),
            vec!["java.lang.String", "int"]
        );
        assert_eq!(return_type(descriptor).unwrap(), "java.lang.Object");

        let descriptor = "([[JLjava/util/List;[Ljava/lang/String;DZ)[I";
        assert_eq!(
            signature(descriptor).unwrap(),
            "(long[][], java.util.List, java.lang.String[], double, boolean)"
        );
        assert_eq!(return_type(descriptor).unwrap(), "int[]");
    }

    #[test]
    fn method_without_parameters() {
        assert_eq!(signature("()V").unwrap(), "()");
        assert_eq!(parameter_count("()Ljava/lang/String;").unwrap(), 0);
    }

    #[test]
    fn malformed_method_descriptors() {
        for descriptor in ["I", "(I", "(I)", "(V)V", "(I)VV", "(Ljava/lang/String)V"] {
            assert!(
                matches!(signature(descriptor), Err(Error::BadDescriptor(_))),
                "'{}' should not decode",
                descriptor
            );
        }
    }
}
