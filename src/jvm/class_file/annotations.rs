//! Annotations, as stored in the `Runtime*Annotations` and `AnnotationDefault` attributes
//!
//! [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.16

use crate::jvm::class_file::{
    read_sequence, ConstantIndex, ConstantPool, Deserialize, Utf8ConstantIndex,
};
use crate::jvm::{descriptors, Error, Result};
use byteorder::ReadBytesExt;

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Field descriptor of the annotation interface
    pub type_index: Utf8ConstantIndex,
    pub element_value_pairs: Vec<ElementValuePair>,
}

impl Annotation {
    /// Dotted name of the annotation interface
    pub fn type_name(&self, pool: &ConstantPool) -> Result<String> {
        descriptors::convert(pool.get_utf8(self.type_index)?)
    }
}

impl Deserialize for Annotation {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(Annotation {
            type_index: Utf8ConstantIndex::deserialize(reader)?,
            element_value_pairs: Vec::deserialize(reader)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementValuePair {
    pub element_name: Utf8ConstantIndex,
    pub value: ElementValue,
}

impl ElementValuePair {
    pub fn name<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str> {
        pool.get_utf8(self.element_name)
    }
}

impl Deserialize for ElementValuePair {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(ElementValuePair {
            element_name: Utf8ConstantIndex::deserialize(reader)?,
            value: ElementValue::deserialize(reader)?,
        })
    }
}

/// Value of an annotation element
///
/// Primitive constants point at `CONSTANT_Integer` (for `byte`, `char`, `int`, `short`, and
/// `boolean`), `CONSTANT_Long`, `CONSTANT_Float`, or `CONSTANT_Double` entries.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Byte(ConstantIndex),
    Char(ConstantIndex),
    Double(ConstantIndex),
    Float(ConstantIndex),
    Int(ConstantIndex),
    Long(ConstantIndex),
    Short(ConstantIndex),
    Boolean(ConstantIndex),
    String(Utf8ConstantIndex),
    Enum {
        type_name: Utf8ConstantIndex,
        const_name: Utf8ConstantIndex,
    },
    /// Return descriptor of the class literal (eg. `Ljava/lang/Object;` or `V`)
    Class(Utf8ConstantIndex),
    Annotation(Annotation),
    Array(Vec<ElementValue>),
}

impl ElementValue {
    pub fn tag(&self) -> char {
        match self {
            ElementValue::Byte(_) => 'B',
            ElementValue::Char(_) => 'C',
            ElementValue::Double(_) => 'D',
            ElementValue::Float(_) => 'F',
            ElementValue::Int(_) => 'I',
            ElementValue::Long(_) => 'J',
            ElementValue::Short(_) => 'S',
            ElementValue::Boolean(_) => 'Z',
            ElementValue::String(_) => 's',
            ElementValue::Enum { .. } => 'e',
            ElementValue::Class(_) => 'c',
            ElementValue::Annotation(_) => '@',
            ElementValue::Array(_) => '[',
        }
    }
}

impl Deserialize for ElementValue {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        let value = match u8::deserialize(reader)? {
            b'B' => ElementValue::Byte(ConstantIndex::deserialize(reader)?),
            b'C' => ElementValue::Char(ConstantIndex::deserialize(reader)?),
            b'D' => ElementValue::Double(ConstantIndex::deserialize(reader)?),
            b'F' => ElementValue::Float(ConstantIndex::deserialize(reader)?),
            b'I' => ElementValue::Int(ConstantIndex::deserialize(reader)?),
            b'J' => ElementValue::Long(ConstantIndex::deserialize(reader)?),
            b'S' => ElementValue::Short(ConstantIndex::deserialize(reader)?),
            b'Z' => ElementValue::Boolean(ConstantIndex::deserialize(reader)?),
            b's' => ElementValue::String(Utf8ConstantIndex::deserialize(reader)?),
            b'e' => ElementValue::Enum {
                type_name: Utf8ConstantIndex::deserialize(reader)?,
                const_name: Utf8ConstantIndex::deserialize(reader)?,
            },
            b'c' => ElementValue::Class(Utf8ConstantIndex::deserialize(reader)?),
            b'@' => ElementValue::Annotation(Annotation::deserialize(reader)?),
            b'[' => ElementValue::Array(Vec::deserialize(reader)?),
            other => {
                let msg = format!("invalid element value tag {:#04x}", other);
                return Err(Error::MalformedInput(msg));
            }
        };
        Ok(value)
    }
}

/// Annotations on one formal parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterAnnotation {
    pub annotations: Vec<Annotation>,
}

impl Deserialize for ParameterAnnotation {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(ParameterAnnotation {
            annotations: Vec::deserialize(reader)?,
        })
    }
}

/// Read the `u1`-counted table of `Runtime*ParameterAnnotations`
pub fn read_parameter_annotations<R: ReadBytesExt>(
    reader: &mut R,
) -> Result<Vec<ParameterAnnotation>> {
    let num_parameters = u8::deserialize(reader)?;
    read_sequence(reader, num_parameters as usize)
}

/// Annotation on a use of a type
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.20
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub target_type: TargetType,
    pub target_info: TargetInfo,
    pub target_path: TypePath,
    pub type_index: Utf8ConstantIndex,
    pub element_value_pairs: Vec<ElementValuePair>,
}

impl TypeAnnotation {
    pub fn type_name(&self, pool: &ConstantPool) -> Result<String> {
        descriptors::convert(pool.get_utf8(self.type_index)?)
    }
}

impl Deserialize for TypeAnnotation {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        let target_type = TargetType::deserialize(reader)?;
        let target_info = TargetInfo::read(reader, target_type)?;
        Ok(TypeAnnotation {
            target_type,
            target_info,
            target_path: TypePath::deserialize(reader)?,
            type_index: Utf8ConstantIndex::deserialize(reader)?,
            element_value_pairs: Vec::deserialize(reader)?,
        })
    }
}

/// Kind of type use being annotated
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum TargetType {
    ClassTypeParameter = 0x00,
    MethodTypeParameter = 0x01,
    ClassExtends = 0x10,
    ClassTypeParameterBound = 0x11,
    MethodTypeParameterBound = 0x12,
    Field = 0x13,
    MethodReturn = 0x14,
    MethodReceiver = 0x15,
    MethodFormalParameter = 0x16,
    Throws = 0x17,
    LocalVariable = 0x40,
    ResourceVariable = 0x41,
    ExceptionParameter = 0x42,
    InstanceOf = 0x43,
    New = 0x44,
    ConstructorReference = 0x45,
    MethodReference = 0x46,
    Cast = 0x47,
    ConstructorInvocationTypeArgument = 0x48,
    MethodInvocationTypeArgument = 0x49,
    ConstructorReferenceTypeArgument = 0x4A,
    MethodReferenceTypeArgument = 0x4B,
}

impl TargetType {
    pub fn from_tag(tag: u8) -> Option<TargetType> {
        let target_type = match tag {
            0x00 => TargetType::ClassTypeParameter,
            0x01 => TargetType::MethodTypeParameter,
            0x10 => TargetType::ClassExtends,
            0x11 => TargetType::ClassTypeParameterBound,
            0x12 => TargetType::MethodTypeParameterBound,
            0x13 => TargetType::Field,
            0x14 => TargetType::MethodReturn,
            0x15 => TargetType::MethodReceiver,
            0x16 => TargetType::MethodFormalParameter,
            0x17 => TargetType::Throws,
            0x40 => TargetType::LocalVariable,
            0x41 => TargetType::ResourceVariable,
            0x42 => TargetType::ExceptionParameter,
            0x43 => TargetType::InstanceOf,
            0x44 => TargetType::New,
            0x45 => TargetType::ConstructorReference,
            0x46 => TargetType::MethodReference,
            0x47 => TargetType::Cast,
            0x48 => TargetType::ConstructorInvocationTypeArgument,
            0x49 => TargetType::MethodInvocationTypeArgument,
            0x4A => TargetType::ConstructorReferenceTypeArgument,
            0x4B => TargetType::MethodReferenceTypeArgument,
            _ => return None,
        };
        Some(target_type)
    }

    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl Deserialize for TargetType {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        let tag = u8::deserialize(reader)?;
        TargetType::from_tag(tag).ok_or_else(|| {
            Error::MalformedInput(format!("invalid type annotation target type {:#04x}", tag))
        })
    }
}

/// Which type use is annotated, in a layout decided by the target type
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TargetInfo {
    TypeParameter {
        type_parameter_index: u8,
    },
    /// `65535` means the superclass, anything else is an index into the interfaces
    Supertype {
        supertype_index: u16,
    },
    TypeParameterBound {
        type_parameter_index: u8,
        bound_index: u8,
    },
    Empty,
    FormalParameter {
        formal_parameter_index: u8,
    },
    Throws {
        throws_type_index: u16,
    },
    LocalVar(Vec<LocalVarTarget>),
    Catch {
        exception_table_index: u16,
    },
    Offset {
        offset: u16,
    },
    TypeArgument {
        offset: u16,
        type_argument_index: u8,
    },
}

impl TargetInfo {
    pub fn read<R: ReadBytesExt>(reader: &mut R, target_type: TargetType) -> Result<TargetInfo> {
        let info = match target_type {
            TargetType::ClassTypeParameter | TargetType::MethodTypeParameter => {
                TargetInfo::TypeParameter {
                    type_parameter_index: u8::deserialize(reader)?,
                }
            }
            TargetType::ClassExtends => TargetInfo::Supertype {
                supertype_index: u16::deserialize(reader)?,
            },
            TargetType::ClassTypeParameterBound | TargetType::MethodTypeParameterBound => {
                TargetInfo::TypeParameterBound {
                    type_parameter_index: u8::deserialize(reader)?,
                    bound_index: u8::deserialize(reader)?,
                }
            }
            TargetType::Field | TargetType::MethodReturn | TargetType::MethodReceiver => {
                TargetInfo::Empty
            }
            TargetType::MethodFormalParameter => TargetInfo::FormalParameter {
                formal_parameter_index: u8::deserialize(reader)?,
            },
            TargetType::Throws => TargetInfo::Throws {
                throws_type_index: u16::deserialize(reader)?,
            },
            TargetType::LocalVariable | TargetType::ResourceVariable => {
                TargetInfo::LocalVar(Vec::deserialize(reader)?)
            }
            TargetType::ExceptionParameter => TargetInfo::Catch {
                exception_table_index: u16::deserialize(reader)?,
            },
            TargetType::InstanceOf
            | TargetType::New
            | TargetType::ConstructorReference
            | TargetType::MethodReference => TargetInfo::Offset {
                offset: u16::deserialize(reader)?,
            },
            TargetType::Cast
            | TargetType::ConstructorInvocationTypeArgument
            | TargetType::MethodInvocationTypeArgument
            | TargetType::ConstructorReferenceTypeArgument
            | TargetType::MethodReferenceTypeArgument => TargetInfo::TypeArgument {
                offset: u16::deserialize(reader)?,
                type_argument_index: u8::deserialize(reader)?,
            },
        };
        Ok(info)
    }
}

/// Range of code in which a local variable lives
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct LocalVarTarget {
    pub start_pc: u16,
    pub length: u16,
    pub index: u16,
}

impl Deserialize for LocalVarTarget {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(LocalVarTarget {
            start_pc: u16::deserialize(reader)?,
            length: u16::deserialize(reader)?,
            index: u16::deserialize(reader)?,
        })
    }
}

/// Path to the annotated part of a (possibly nested, array, or generic) type
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct TypePath {
    pub path: Vec<TypePathEntry>,
}

impl Deserialize for TypePath {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        let path_length = u8::deserialize(reader)?;
        Ok(TypePath {
            path: read_sequence(reader, path_length as usize)?,
        })
    }
}

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct TypePathEntry {
    /// `0` deeper in an array, `1` deeper in a nested type, `2` a wildcard bound, `3` a type
    /// argument
    pub type_path_kind: u8,
    pub type_argument_index: u8,
}

impl Deserialize for TypePathEntry {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(TypePathEntry {
            type_path_kind: u8::deserialize(reader)?,
            type_argument_index: u8::deserialize(reader)?,
        })
    }
}
