use crate::jvm::class_file::{read_bytes, Deserialize};
use crate::jvm::{descriptors, names, Error, Result};
use crate::util::{Offset, OffsetResult, OffsetVec, Width};
use byteorder::ReadBytesExt;
use std::fmt::{self, Display, Formatter};
use std::iter::FromIterator;

/// Decoded constant pool of one class file
///
/// Indexing starts at 1 and `CONSTANT_Long`/`CONSTANT_Double` entries make the following index
/// unusable. Entries refer to each other by index (possibly forwards), so nothing is resolved
/// while reading: the typed accessors and the `name`/`descriptor` helpers on entries follow the
/// indices at query time.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.4
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantPool {
    constants: OffsetVec<Constant>,
}

impl ConstantPool {
    /// Read `constant_pool_count` followed by the entries
    pub fn read<R: ReadBytesExt>(reader: &mut R) -> Result<ConstantPool> {
        let count = u16::deserialize(reader)? as usize;
        let mut constants = OffsetVec::new_starting_at(Offset(1));

        while constants.offset_len().0 < count {
            let index = constants.offset_len().0 as u16;
            let constant = Constant::read(reader, index)?;
            if constants.offset_len().0 + constant.width() > count {
                let msg = format!(
                    "{} constant at index {} overruns constant pool of size {}",
                    constant.kind(),
                    index,
                    count
                );
                return Err(Error::MalformedInput(msg));
            }
            log::trace!("Constant #{} = {:?}", index, constant);
            constants.push(constant);
        }

        log::debug!("Read {} constant pool entries", constants.len());
        Ok(ConstantPool { constants })
    }

    /// Number of entries (phantom slots excluded)
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    /// Value of `constant_pool_count` (one more than the largest index)
    pub fn count(&self) -> u16 {
        self.constants.offset_len().0 as u16
    }

    /// Entries, along with their index
    pub fn iter(&self) -> impl Iterator<Item = (ConstantIndex, &Constant)> + '_ {
        self.constants
            .iter()
            .map(|(offset, _, constant)| (ConstantIndex(offset.0 as u16), constant))
    }

    /// Get the raw entry at an index
    pub fn get(&self, index: impl Into<ConstantIndex>) -> Result<&Constant> {
        let ConstantIndex(index) = index.into();
        match self.constants.get_offset(Offset(index as usize)) {
            OffsetResult::Ok(_, constant) => Ok(constant),
            OffsetResult::InvalidOffset(_) | OffsetResult::TooLarge => {
                Err(Error::InvalidIndex(index))
            }
        }
    }

    /// Get the value of a `CONSTANT_Utf8`
    pub fn get_utf8(&self, index: impl Into<ConstantIndex>) -> Result<&str> {
        let index = index.into();
        match self.get(index)? {
            Constant::Utf8(string) => Ok(string),
            other => Err(mismatch(index, "Utf8", other)),
        }
    }

    /// Get the name index of a `CONSTANT_Class`
    pub fn get_class(&self, index: impl Into<ConstantIndex>) -> Result<Utf8ConstantIndex> {
        let index = index.into();
        match self.get(index)? {
            Constant::Class(name) => Ok(*name),
            other => Err(mismatch(index, "Class", other)),
        }
    }

    /// Get the dotted name of the class referred to by a `CONSTANT_Class`
    ///
    /// Array classes (whose internal name is a descriptor like `[Ljava/lang/String;`) are
    /// rendered as `java.lang.String[]`.
    pub fn get_class_name(&self, index: impl Into<ConstantIndex>) -> Result<String> {
        let name = self.get_class(index)?;
        names::class_name(self.get_utf8(name)?)
    }

    /// Get the value of a `CONSTANT_String`
    pub fn get_string(&self, index: impl Into<ConstantIndex>) -> Result<&str> {
        let index = index.into();
        match self.get(index)? {
            Constant::String(value) => self.get_utf8(*value),
            other => Err(mismatch(index, "String", other)),
        }
    }

    pub fn get_name_and_type(&self, index: impl Into<ConstantIndex>) -> Result<&NameAndType> {
        let index = index.into();
        match self.get(index)? {
            Constant::NameAndType(name_and_type) => Ok(name_and_type),
            other => Err(mismatch(index, "NameAndType", other)),
        }
    }

    /// Get a `CONSTANT_Fieldref`, `CONSTANT_Methodref`, or `CONSTANT_InterfaceMethodref`
    pub fn get_feature_ref(&self, index: impl Into<ConstantIndex>) -> Result<&FeatureRef> {
        let index = index.into();
        match self.get(index)? {
            Constant::FieldRef(feature)
            | Constant::MethodRef(feature)
            | Constant::InterfaceMethodRef(feature) => Ok(feature),
            other => Err(mismatch(
                index,
                "Fieldref, Methodref, or InterfaceMethodref",
                other,
            )),
        }
    }

    pub fn get_field_ref(&self, index: impl Into<ConstantIndex>) -> Result<&FeatureRef> {
        let index = index.into();
        match self.get(index)? {
            Constant::FieldRef(feature) => Ok(feature),
            other => Err(mismatch(index, "Fieldref", other)),
        }
    }

    /// Get a `CONSTANT_Methodref` or `CONSTANT_InterfaceMethodref`
    pub fn get_method_ref(&self, index: impl Into<ConstantIndex>) -> Result<&FeatureRef> {
        let index = index.into();
        match self.get(index)? {
            Constant::MethodRef(feature) | Constant::InterfaceMethodRef(feature) => Ok(feature),
            other => Err(mismatch(index, "Methodref or InterfaceMethodref", other)),
        }
    }

    pub fn get_method_handle(&self, index: impl Into<ConstantIndex>) -> Result<&MethodHandle> {
        let index = index.into();
        match self.get(index)? {
            Constant::MethodHandle(handle) => Ok(handle),
            other => Err(mismatch(index, "MethodHandle", other)),
        }
    }

    /// Get a `CONSTANT_Dynamic` or `CONSTANT_InvokeDynamic`
    pub fn get_dynamic(&self, index: impl Into<ConstantIndex>) -> Result<&DynamicConstant> {
        let index = index.into();
        match self.get(index)? {
            Constant::Dynamic(dynamic) | Constant::InvokeDynamic(dynamic) => Ok(dynamic),
            other => Err(mismatch(index, "Dynamic or InvokeDynamic", other)),
        }
    }

    /// Get the name of a `CONSTANT_Module`
    pub fn get_module_name(&self, index: impl Into<ConstantIndex>) -> Result<&str> {
        let index = index.into();
        match self.get(index)? {
            Constant::Module(name) => self.get_utf8(*name),
            other => Err(mismatch(index, "Module", other)),
        }
    }

    /// Get the dotted name of a `CONSTANT_Package`
    pub fn get_package_name(&self, index: impl Into<ConstantIndex>) -> Result<String> {
        let index = index.into();
        match self.get(index)? {
            Constant::Package(name) => Ok(self.get_utf8(*name)?.replace('/', ".")),
            other => Err(mismatch(index, "Package", other)),
        }
    }
}

fn mismatch(index: ConstantIndex, expected: &'static str, found: &Constant) -> Error {
    Error::TypeMismatch {
        index: index.0,
        expected,
        found: found.kind(),
    }
}

/// Build a pool directly from entries, numbered from 1
impl FromIterator<Constant> for ConstantPool {
    fn from_iter<A: IntoIterator<Item = Constant>>(elems: A) -> Self {
        let mut constants = OffsetVec::new_starting_at(Offset(1));
        for elem in elems {
            constants.push(elem);
        }
        ConstantPool { constants }
    }
}

/// Constants as in the constant pool
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.4
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// Constant UTF-8 encoded raw string value
    ///
    /// Despite the name, the encoding is not quite UTF-8 (see [`decode_modified_utf8`]).
    Utf8(String),

    /// Constant primitive of type `int`
    Integer(i32),

    /// Constant primitive of type `float`
    Float(f32),

    /// Constant primitive of type `long`
    Long(i64),

    /// Constant primitive of type `double`
    Double(f64),

    /// Class or an interface
    Class(Utf8ConstantIndex),

    /// Constant object of type `java.lang.String`
    String(Utf8ConstantIndex),

    FieldRef(FeatureRef),

    MethodRef(FeatureRef),

    InterfaceMethodRef(FeatureRef),

    /// Name and a type (eg. for a field or a method)
    NameAndType(NameAndType),

    /// Constant object of type `java.lang.invoke.MethodHandle`
    MethodHandle(MethodHandle),

    /// Method type
    MethodType(Utf8ConstantIndex),

    /// Dynamically-computed constant
    Dynamic(DynamicConstant),

    /// Dynamically-computed call site
    InvokeDynamic(DynamicConstant),

    Module(Utf8ConstantIndex),

    Package(Utf8ConstantIndex),
}

impl Constant {
    /// Read one tagged entry, `index` being the slot it will occupy
    pub fn read<R: ReadBytesExt>(reader: &mut R, index: u16) -> Result<Constant> {
        let tag = u8::deserialize(reader)?;
        let constant = match tag {
            1 => {
                let length = u16::deserialize(reader)?;
                let bytes = read_bytes(reader, length as usize)?;
                Constant::Utf8(decode_modified_utf8(&bytes)?)
            }
            3 => Constant::Integer(i32::deserialize(reader)?),
            4 => Constant::Float(f32::deserialize(reader)?),
            5 => Constant::Long(i64::deserialize(reader)?),
            6 => Constant::Double(f64::deserialize(reader)?),
            7 => Constant::Class(Utf8ConstantIndex::deserialize(reader)?),
            8 => Constant::String(Utf8ConstantIndex::deserialize(reader)?),
            9 => Constant::FieldRef(FeatureRef::deserialize(reader)?),
            10 => Constant::MethodRef(FeatureRef::deserialize(reader)?),
            11 => Constant::InterfaceMethodRef(FeatureRef::deserialize(reader)?),
            12 => Constant::NameAndType(NameAndType::deserialize(reader)?),
            15 => Constant::MethodHandle(MethodHandle::deserialize(reader)?),
            16 => Constant::MethodType(Utf8ConstantIndex::deserialize(reader)?),
            17 => Constant::Dynamic(DynamicConstant::deserialize(reader)?),
            18 => Constant::InvokeDynamic(DynamicConstant::deserialize(reader)?),
            19 => Constant::Module(Utf8ConstantIndex::deserialize(reader)?),
            20 => Constant::Package(Utf8ConstantIndex::deserialize(reader)?),
            tag => return Err(Error::UnknownConstantPoolTag { tag, index }),
        };
        Ok(constant)
    }

    pub fn kind(&self) -> ConstantKind {
        match self {
            Constant::Utf8(_) => ConstantKind::Utf8,
            Constant::Integer(_) => ConstantKind::Integer,
            Constant::Float(_) => ConstantKind::Float,
            Constant::Long(_) => ConstantKind::Long,
            Constant::Double(_) => ConstantKind::Double,
            Constant::Class(_) => ConstantKind::Class,
            Constant::String(_) => ConstantKind::String,
            Constant::FieldRef(_) => ConstantKind::FieldRef,
            Constant::MethodRef(_) => ConstantKind::MethodRef,
            Constant::InterfaceMethodRef(_) => ConstantKind::InterfaceMethodRef,
            Constant::NameAndType(_) => ConstantKind::NameAndType,
            Constant::MethodHandle(_) => ConstantKind::MethodHandle,
            Constant::MethodType(_) => ConstantKind::MethodType,
            Constant::Dynamic(_) => ConstantKind::Dynamic,
            Constant::InvokeDynamic(_) => ConstantKind::InvokeDynamic,
            Constant::Module(_) => ConstantKind::Module,
            Constant::Package(_) => ConstantKind::Package,
        }
    }

    /// Human readable rendering of the entry, resolving whatever it refers to
    ///
    ///   - classes, modules, and packages render as their dotted names
    ///   - field and method references render as `class.name` and `class.name(params)`
    ///   - strings and numbers render as their values
    pub fn render(&self, pool: &ConstantPool) -> Result<String> {
        let rendered = match self {
            Constant::Utf8(string) => string.clone(),
            Constant::Integer(value) => value.to_string(),
            Constant::Float(value) => value.to_string(),
            Constant::Long(value) => value.to_string(),
            Constant::Double(value) => value.to_string(),
            Constant::Class(name) => names::class_name(pool.get_utf8(*name)?)?,
            Constant::String(value) => pool.get_utf8(*value)?.to_owned(),
            Constant::FieldRef(feature) => feature.full_name(pool)?,
            Constant::MethodRef(feature) | Constant::InterfaceMethodRef(feature) => {
                feature.full_signature(pool)?
            }
            Constant::NameAndType(name_and_type) => format!(
                "{} {}",
                name_and_type.name(pool)?,
                name_and_type.descriptor(pool)?
            ),
            Constant::MethodHandle(handle) => {
                format!("{} {}", handle.kind, handle.reference(pool)?.render(pool)?)
            }
            Constant::MethodType(descriptor) => pool.get_utf8(*descriptor)?.to_owned(),
            Constant::Dynamic(dynamic) => dynamic.name(pool)?.to_owned(),
            Constant::InvokeDynamic(dynamic) => dynamic.signature(pool)?,
            Constant::Module(name) => pool.get_utf8(*name)?.to_owned(),
            Constant::Package(name) => pool.get_utf8(*name)?.replace('/', "."),
        };
        Ok(rendered)
    }
}

/// Almost all constants have width 1, except for `Constant::Long` and `Constant::Double`. Quoting
/// the JVM specification:
///
/// > All 8-byte constants take up two entries in the constant_pool table of the class file. If a
/// > CONSTANT_Long_info or CONSTANT_Double_info structure is the item in the constant_pool table
/// > at index n, then the next usable item in the pool is located at index n+2. The constant_pool
/// > index n+1 must be valid but is considered unusable.
impl Width for Constant {
    fn width(&self) -> usize {
        match self {
            Constant::Long(_) | Constant::Double(_) => 2,
            _ => 1,
        }
    }
}

/// Kind of a constant pool entry, with its tag
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum ConstantKind {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    FieldRef = 9,
    MethodRef = 10,
    InterfaceMethodRef = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    Dynamic = 17,
    InvokeDynamic = 18,
    Module = 19,
    Package = 20,
}

impl ConstantKind {
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl Display for ConstantKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstantKind::Utf8 => "Utf8",
            ConstantKind::Integer => "Integer",
            ConstantKind::Float => "Float",
            ConstantKind::Long => "Long",
            ConstantKind::Double => "Double",
            ConstantKind::Class => "Class",
            ConstantKind::String => "String",
            ConstantKind::FieldRef => "Fieldref",
            ConstantKind::MethodRef => "Methodref",
            ConstantKind::InterfaceMethodRef => "InterfaceMethodref",
            ConstantKind::NameAndType => "NameAndType",
            ConstantKind::MethodHandle => "MethodHandle",
            ConstantKind::MethodType => "MethodType",
            ConstantKind::Dynamic => "Dynamic",
            ConstantKind::InvokeDynamic => "InvokeDynamic",
            ConstantKind::Module => "Module",
            ConstantKind::Package => "Package",
        };
        f.write_str(name)
    }
}

/// Shared layout of `CONSTANT_Fieldref`, `CONSTANT_Methodref`, and `CONSTANT_InterfaceMethodref`
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct FeatureRef {
    pub class: ClassConstantIndex,
    pub name_and_type: NameAndTypeConstantIndex,
}

impl FeatureRef {
    /// Dotted name of the class declaring the member
    pub fn class_name(&self, pool: &ConstantPool) -> Result<String> {
        pool.get_class_name(self.class)
    }

    pub fn name<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str> {
        pool.get_name_and_type(self.name_and_type)?.name(pool)
    }

    pub fn descriptor<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str> {
        pool.get_name_and_type(self.name_and_type)?.descriptor(pool)
    }

    /// `class.name`
    pub fn full_name(&self, pool: &ConstantPool) -> Result<String> {
        Ok(format!("{}.{}", self.class_name(pool)?, self.name(pool)?))
    }

    /// `name(params)`, only meaningful for method references
    pub fn signature(&self, pool: &ConstantPool) -> Result<String> {
        pool.get_name_and_type(self.name_and_type)?.signature(pool)
    }

    /// `class.name(params)`, only meaningful for method references
    pub fn full_signature(&self, pool: &ConstantPool) -> Result<String> {
        Ok(format!("{}.{}", self.class_name(pool)?, self.signature(pool)?))
    }
}

impl Deserialize for FeatureRef {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(FeatureRef {
            class: ClassConstantIndex::deserialize(reader)?,
            name_and_type: NameAndTypeConstantIndex::deserialize(reader)?,
        })
    }
}

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct NameAndType {
    pub name: Utf8ConstantIndex,
    pub descriptor: Utf8ConstantIndex,
}

impl NameAndType {
    pub fn name<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str> {
        pool.get_utf8(self.name)
    }

    pub fn descriptor<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str> {
        pool.get_utf8(self.descriptor)
    }

    /// Readable type of a field descriptor (eg. `java.lang.String[]`)
    pub fn field_type(&self, pool: &ConstantPool) -> Result<String> {
        descriptors::convert(self.descriptor(pool)?)
    }

    /// `name(params)` for a method descriptor
    pub fn signature(&self, pool: &ConstantPool) -> Result<String> {
        let parameters = descriptors::signature(self.descriptor(pool)?)?;
        Ok(format!("{}{}", self.name(pool)?, parameters))
    }
}

impl Deserialize for NameAndType {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(NameAndType {
            name: Utf8ConstantIndex::deserialize(reader)?,
            descriptor: Utf8ConstantIndex::deserialize(reader)?,
        })
    }
}

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct MethodHandle {
    pub kind: HandleKind,

    /// Depending on the handle kind, this points to different things:
    ///
    ///   - `Fieldref` for `GetField`, `GetStatic`, `PutField`, `PutStatic`
    ///   - `Methodref` or `InterfaceMethodref` for the rest
    pub reference: ConstantIndex,
}

impl MethodHandle {
    /// Resolve the referenced entry
    pub fn reference<'p>(&self, pool: &'p ConstantPool) -> Result<&'p Constant> {
        pool.get(self.reference)
    }

    /// Resolve the referenced field or method
    pub fn feature_ref<'p>(&self, pool: &'p ConstantPool) -> Result<&'p FeatureRef> {
        pool.get_feature_ref(self.reference)
    }
}

impl Deserialize for MethodHandle {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(MethodHandle {
            kind: HandleKind::deserialize(reader)?,
            reference: ConstantIndex::deserialize(reader)?,
        })
    }
}

/// Shared layout of `CONSTANT_Dynamic` and `CONSTANT_InvokeDynamic`
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct DynamicConstant {
    /// Index into the `BootstrapMethods` attribute of the class
    pub bootstrap_method_attr_index: u16,
    pub name_and_type: NameAndTypeConstantIndex,
}

impl DynamicConstant {
    pub fn name<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str> {
        pool.get_name_and_type(self.name_and_type)?.name(pool)
    }

    pub fn descriptor<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str> {
        pool.get_name_and_type(self.name_and_type)?.descriptor(pool)
    }

    /// `name(params)`, only meaningful for `CONSTANT_InvokeDynamic`
    pub fn signature(&self, pool: &ConstantPool) -> Result<String> {
        pool.get_name_and_type(self.name_and_type)?.signature(pool)
    }
}

impl Deserialize for DynamicConstant {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(DynamicConstant {
            bootstrap_method_attr_index: u16::deserialize(reader)?,
            name_and_type: NameAndTypeConstantIndex::deserialize(reader)?,
        })
    }
}

/// Modified UTF-8 format used in class files.
///
/// See [this `DataInput` section for details][0]. Quoting from that section:
///
/// > The differences between this format and the standard UTF-8 format are the following:
/// >
/// >  * The null byte `\u0000` is encoded in 2-byte format rather than 1-byte, so that the encoded
/// >    strings never have embedded nulls.
/// >  * Only the 1-byte, 2-byte, and 3-byte formats are used.
/// >  * Supplementary characters are represented in the form of surrogate pairs.
///
/// Class files may legally contain unpaired surrogates, which a Rust `String` can't hold. Those
/// decode to `U+FFFD`.
///
/// [0]: https://docs.oracle.com/en/java/javase/17/docs/api/java.base/java/io/DataInput.html#modified-utf-8
pub fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut remaining = bytes;

    while let Some((&first, rest)) = remaining.split_first() {
        let (unit, rest) = match (first, rest) {
            (0x00..=0x7F, rest) => (first as u16, rest),
            (0xC0..=0xDF, [second, rest @ ..]) if second & 0xC0 == 0x80 => {
                let unit = (first as u16 & 0x1F) << 6 | (*second as u16 & 0x3F);
                (unit, rest)
            }
            (0xE0..=0xEF, [second, third, rest @ ..])
                if second & 0xC0 == 0x80 && third & 0xC0 == 0x80 =>
            {
                let unit = (first as u16 & 0x0F) << 12
                    | (*second as u16 & 0x3F) << 6
                    | (*third as u16 & 0x3F);
                (unit, rest)
            }
            _ => {
                let offset = bytes.len() - remaining.len();
                let msg = format!("invalid modified UTF-8 byte {:#04x} at {}", first, offset);
                return Err(Error::MalformedInput(msg));
            }
        };
        units.push(unit);
        remaining = rest;
    }

    Ok(char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}

#[cfg(test)]
mod decode_modified_utf8_tests {
    use super::*;

    #[test]
    fn containing_null_byte() {
        assert_eq!(decode_modified_utf8(&[97, 192, 128, 97]).unwrap(), "a\x00a");
    }

    #[test]
    fn simple_ascii() {
        assert_eq!(decode_modified_utf8(&[102, 111, 111]).unwrap(), "foo");
        assert_eq!(
            decode_modified_utf8(&[104, 101, 108, 49, 48, 95, 87, 111, 114, 108, 100]).unwrap(),
            "hel10_World"
        );
    }

    #[test]
    fn two_and_three_byte_encodings() {
        assert_eq!(
            decode_modified_utf8(&[
                196, 132, 199, 141, 199, 158, 199, 160, 199, 186, 200, 128, 200, 130, 200, 166,
                200, 186, 211, 144, 211, 146
            ])
            .unwrap(),
            "ĄǍǞǠǺȀȂȦȺӐӒ"
        );
        assert_eq!(
            decode_modified_utf8(&[
                224, 164, 132, 224, 164, 133, 224, 165, 178, 224, 166, 133, 224, 168, 133, 224,
                170, 133, 224, 172, 133, 224, 174, 133, 224, 176, 133, 224, 178, 133, 224, 180,
                133, 224, 184, 176, 224, 186, 176, 224, 188, 129, 224, 189, 168
            ])
            .unwrap(),
            "ऄअॲঅਅઅଅஅఅಅഅะະ༁ཨ"
        );
    }

    #[test]
    fn supplementary_characters() {
        assert_eq!(
            decode_modified_utf8(&[
                237, 160, 128, 237, 176, 128, 237, 172, 191, 237, 191, 191, 237, 175, 191, 237,
                191, 191
            ])
            .unwrap(),
            "\u{10000}\u{dffff}\u{10FFFF}"
        );
    }

    #[test]
    fn unpaired_surrogate() {
        assert_eq!(decode_modified_utf8(&[237, 160, 128, 97]).unwrap(), "\u{FFFD}a");
    }

    #[test]
    fn truncated_sequences() {
        assert!(matches!(
            decode_modified_utf8(&[97, 224, 164]),
            Err(Error::MalformedInput(_))
        ));
        assert!(matches!(
            decode_modified_utf8(&[0xF0, 0x90, 0x80, 0x80]),
            Err(Error::MalformedInput(_))
        ));
    }
}

#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct ConstantIndex(pub u16);

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct Utf8ConstantIndex(pub ConstantIndex);

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct ClassConstantIndex(pub ConstantIndex);

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct NameAndTypeConstantIndex(pub ConstantIndex);

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct ModuleConstantIndex(pub ConstantIndex);

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct PackageConstantIndex(pub ConstantIndex);

impl ConstantIndex {
    /// Index 0 is never a valid entry, and is used to mean "absent" in a few places
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Display for ConstantIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u16> for ConstantIndex {
    fn from(index: u16) -> ConstantIndex {
        ConstantIndex(index)
    }
}

impl Deserialize for ConstantIndex {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(ConstantIndex(u16::deserialize(reader)?))
    }
}

macro_rules! typed_constant_index {
    ($($typed:ident),*) => {
        $(
            impl From<$typed> for ConstantIndex {
                fn from(index: $typed) -> ConstantIndex {
                    index.0
                }
            }

            impl Deserialize for $typed {
                fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
                    Ok($typed(ConstantIndex::deserialize(reader)?))
                }
            }

            /// Index 0 stands for an absent reference
            impl Deserialize for Option<$typed> {
                fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
                    let index = ConstantIndex::deserialize(reader)?;
                    Ok(if index.is_zero() { None } else { Some($typed(index)) })
                }
            }
        )*
    };
}

typed_constant_index!(
    Utf8ConstantIndex,
    ClassConstantIndex,
    NameAndTypeConstantIndex,
    ModuleConstantIndex,
    PackageConstantIndex
);

/// Type of method handle
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-5.html#jvms-5.4.3.5-220
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum HandleKind {
    GetField,
    GetStatic,
    PutField,
    PutStatic,
    InvokeVirtual,
    InvokeStatic,
    InvokeSpecial,
    NewInvokeSpecial,
    InvokeInterface,
}

impl HandleKind {
    /// Reference kind as it is stored in the class file (1 to 9)
    pub fn reference_kind(self) -> u8 {
        match self {
            HandleKind::GetField => 1,
            HandleKind::GetStatic => 2,
            HandleKind::PutField => 3,
            HandleKind::PutStatic => 4,
            HandleKind::InvokeVirtual => 5,
            HandleKind::InvokeStatic => 6,
            HandleKind::InvokeSpecial => 7,
            HandleKind::NewInvokeSpecial => 8,
            HandleKind::InvokeInterface => 9,
        }
    }
}

impl Display for HandleKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandleKind::GetField => "getField",
            HandleKind::GetStatic => "getStatic",
            HandleKind::PutField => "putField",
            HandleKind::PutStatic => "putStatic",
            HandleKind::InvokeVirtual => "invokeVirtual",
            HandleKind::InvokeStatic => "invokeStatic",
            HandleKind::InvokeSpecial => "invokeSpecial",
            HandleKind::NewInvokeSpecial => "newInvokeSpecial",
            HandleKind::InvokeInterface => "invokeInterface",
        };
        f.write_str(name)
    }
}

impl Deserialize for HandleKind {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        let kind = match u8::deserialize(reader)? {
            1 => HandleKind::GetField,
            2 => HandleKind::GetStatic,
            3 => HandleKind::PutField,
            4 => HandleKind::PutStatic,
            5 => HandleKind::InvokeVirtual,
            6 => HandleKind::InvokeStatic,
            7 => HandleKind::InvokeSpecial,
            8 => HandleKind::NewInvokeSpecial,
            9 => HandleKind::InvokeInterface,
            other => {
                let msg = format!("invalid method handle reference kind {}", other);
                return Err(Error::MalformedInput(msg));
            }
        };
        Ok(kind)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn utf8(index: u16) -> Utf8ConstantIndex {
        Utf8ConstantIndex(ConstantIndex(index))
    }

    fn sample_pool() -> ConstantPool {
        vec![
            /* #1 */ Constant::Utf8(String::from("java/lang/String")),
            /* #2 */ Constant::Class(utf8(1)),
            /* #3 */ Constant::Long(42),
            /* #5 */ Constant::Utf8(String::from("[[I")),
            /* #6 */ Constant::Class(utf8(5)),
            /* #7 */ Constant::Double(1.5),
            /* #9 */ Constant::Utf8(String::from("length")),
            /* #10 */ Constant::Utf8(String::from("()I")),
            /* #11 */
            Constant::NameAndType(NameAndType {
                name: utf8(9),
                descriptor: utf8(10),
            }),
            /* #12 */
            Constant::MethodRef(FeatureRef {
                class: ClassConstantIndex(ConstantIndex(2)),
                name_and_type: NameAndTypeConstantIndex(ConstantIndex(11)),
            }),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn wide_entries_leave_unusable_slots() {
        let pool = sample_pool();
        assert_eq!(pool.count(), 13);
        assert_eq!(pool.len(), 10);
        assert!(matches!(pool.get(0u16), Err(Error::InvalidIndex(0))));
        assert_eq!(pool.get(3u16).unwrap(), &Constant::Long(42));
        assert!(matches!(pool.get(4u16), Err(Error::InvalidIndex(4))));
        assert!(matches!(pool.get(8u16), Err(Error::InvalidIndex(8))));
        assert!(matches!(pool.get(13u16), Err(Error::InvalidIndex(13))));
    }

    #[test]
    fn typed_accessors() {
        let pool = sample_pool();
        assert_eq!(pool.get_utf8(1u16).unwrap(), "java/lang/String");
        assert_eq!(pool.get_class_name(2u16).unwrap(), "java.lang.String");
        assert_eq!(pool.get_class_name(6u16).unwrap(), "int[][]");

        let method = pool.get_method_ref(12u16).unwrap();
        assert_eq!(method.name(&pool).unwrap(), "length");
        assert_eq!(method.signature(&pool).unwrap(), "length()");
        assert_eq!(
            method.full_signature(&pool).unwrap(),
            "java.lang.String.length()"
        );
        assert_eq!(
            pool.get(12u16).unwrap().render(&pool).unwrap(),
            "java.lang.String.length()"
        );
    }

    #[test]
    fn typed_accessor_mismatch() {
        let pool = sample_pool();
        match pool.get_class(1u16) {
            Err(Error::TypeMismatch {
                index,
                expected,
                found,
            }) => {
                assert_eq!(index, 1);
                assert_eq!(expected, "Class");
                assert_eq!(found, ConstantKind::Utf8);
            }
            other => panic!("expected a type mismatch, got {:?}", other),
        }
        assert!(matches!(pool.get_field_ref(12u16), Err(Error::TypeMismatch { .. })));
        assert!(matches!(pool.get_utf8(4u16), Err(Error::InvalidIndex(4))));
    }

    #[test]
    fn read_pool_with_forward_references() {
        #[rustfmt::skip]
        let mut input: &[u8] = &[
            0, 5,                         // count
            7, 0, 2,                      // #1 Class -> #2
            1, 0, 3, b'F', b'o', b'o',    // #2 Utf8 "Foo"
            5, 0, 0, 0, 0, 0, 0, 0, 1,    // #3 Long 1 (and unusable #4)
        ];
        let pool = ConstantPool::read(&mut input).unwrap();
        assert_eq!(pool.get_class_name(1u16).unwrap(), "Foo");
        assert_eq!(pool.get(3u16).unwrap(), &Constant::Long(1));
        assert!(pool.get(4u16).is_err());
        assert!(input.is_empty());
    }

    #[test]
    fn read_pool_errors() {
        let mut unknown_tag: &[u8] = &[0, 2, 2, 0, 0];
        assert!(matches!(
            ConstantPool::read(&mut unknown_tag),
            Err(Error::UnknownConstantPoolTag { tag: 2, index: 1 })
        ));

        let mut overrun: &[u8] = &[0, 2, 6, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(
            ConstantPool::read(&mut overrun),
            Err(Error::MalformedInput(_))
        ));

        let mut truncated: &[u8] = &[0, 2, 1, 0, 5, b'a'];
        assert!(matches!(
            ConstantPool::read(&mut truncated),
            Err(Error::MalformedInput(_))
        ));

        let mut bad_handle: &[u8] = &[0, 2, 15, 10, 0, 1];
        assert!(matches!(
            ConstantPool::read(&mut bad_handle),
            Err(Error::MalformedInput(_))
        ));
    }
}
