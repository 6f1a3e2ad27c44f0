use crate::jvm::class_file::{ClassConstantIndex, ConstantPool, Deserialize};
use crate::jvm::{Error, Result};
use crate::util::Width;
use byteorder::ReadBytesExt;

/// These types are from [this hierarchy][0]
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.10.1.2
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum VerificationType {
    Top,
    Integer,
    Float,
    Double,
    Long,
    Null,

    /// In the constructor, the `this` parameter starts with this type then turns into an object
    /// type after `<init>` is called
    UninitializedThis,

    /// Object type
    Object(ClassConstantIndex),

    /// State of an object after `new` has been called but `<init>` has not been called
    ///
    /// The offset is the position of the `new` instruction from the start of the method body.
    Uninitialized(u16),
}

impl VerificationType {
    /// Tag used for this type in the class file
    pub fn tag(&self) -> u8 {
        match self {
            VerificationType::Top => 0,
            VerificationType::Integer => 1,
            VerificationType::Float => 2,
            VerificationType::Double => 3,
            VerificationType::Long => 4,
            VerificationType::Null => 5,
            VerificationType::UninitializedThis => 6,
            VerificationType::Object(_) => 7,
            VerificationType::Uninitialized(_) => 8,
        }
    }

    /// Is this type is a reference type?
    pub fn is_reference(&self) -> bool {
        match self {
            VerificationType::Top
            | VerificationType::Integer
            | VerificationType::Float
            | VerificationType::Double
            | VerificationType::Long => false,

            VerificationType::Null
            | VerificationType::UninitializedThis
            | VerificationType::Object(_)
            | VerificationType::Uninitialized(_) => true,
        }
    }

    /// Readable rendering, resolving the class of `Object` types
    pub fn render(&self, pool: &ConstantPool) -> Result<String> {
        let rendered = match self {
            VerificationType::Top => String::from("top"),
            VerificationType::Integer => String::from("int"),
            VerificationType::Float => String::from("float"),
            VerificationType::Double => String::from("double"),
            VerificationType::Long => String::from("long"),
            VerificationType::Null => String::from("null"),
            VerificationType::UninitializedThis => String::from("uninitializedThis"),
            VerificationType::Object(class) => pool.get_class_name(*class)?,
            VerificationType::Uninitialized(offset) => format!("uninitialized({})", offset),
        };
        Ok(rendered)
    }
}

impl Deserialize for VerificationType {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        let typ = match u8::deserialize(reader)? {
            0 => VerificationType::Top,
            1 => VerificationType::Integer,
            2 => VerificationType::Float,
            3 => VerificationType::Double,
            4 => VerificationType::Long,
            5 => VerificationType::Null,
            6 => VerificationType::UninitializedThis,
            7 => VerificationType::Object(ClassConstantIndex::deserialize(reader)?),
            8 => VerificationType::Uninitialized(u16::deserialize(reader)?),
            other => {
                let msg = format!("invalid verification type tag {}", other);
                return Err(Error::MalformedInput(msg));
            }
        };
        Ok(typ)
    }
}

/// `long` and `double` take two local variable slots
impl Width for VerificationType {
    fn width(&self) -> usize {
        match self {
            VerificationType::Double | VerificationType::Long => 2,
            _ => 1,
        }
    }
}
