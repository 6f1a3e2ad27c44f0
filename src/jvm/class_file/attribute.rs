use crate::jvm::class_file::{
    read_bytes, read_parameter_annotations, read_sequence, Annotation, ClassConstantIndex, Code,
    ConstantIndex, ConstantPool, Deserialize, ElementValue, Module, NameAndTypeConstantIndex,
    PackageConstantIndex, ParameterAnnotation, TypeAnnotation, Utf8ConstantIndex,
};
use crate::jvm::verifier::StackMapFrame;
use crate::jvm::{descriptors, Error, InnerClassAccessFlags, ParameterAccessFlags, Result};
use byteorder::ReadBytesExt;
use std::fmt::{self, Display, Formatter};

/// Attributes (used in classes, fields, methods, and even on some attributes)
///
/// Every attribute is stored as a name, a length, and then exactly that many bytes. Attributes
/// whose name is known are decoded into the matching `AttributeInfo` variant, the others are kept
/// as raw bytes.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name_index: Utf8ConstantIndex,
    pub info: AttributeInfo,
}

impl Attribute {
    /// Read one attribute, dispatching on its name
    ///
    /// The body of a recognized attribute must be consumed exactly: leftover bytes or a body that
    /// needs more bytes than declared make the input malformed.
    pub fn read<R: ReadBytesExt>(reader: &mut R, pool: &ConstantPool) -> Result<Attribute> {
        let name_index = Utf8ConstantIndex::deserialize(reader)?;
        let name = pool.get_utf8(name_index)?;
        let length = u32::deserialize(reader)? as usize;
        let bytes = read_bytes(reader, length)?;

        let info = match AttributeType::from_name(name) {
            Some(attribute_type) => {
                let mut body: &[u8] = &bytes;
                let info = AttributeInfo::read(&mut body, attribute_type, pool)?;
                if !body.is_empty() {
                    let msg = format!(
                        "{} attribute declares {} bytes but only {} were read",
                        name,
                        length,
                        length - body.len()
                    );
                    return Err(Error::MalformedInput(msg));
                }
                info
            }
            None => {
                log::debug!("Keeping unrecognized attribute '{}' ({} bytes)", name, length);
                AttributeInfo::Custom(bytes)
            }
        };

        log::trace!("Read {} attribute ({} bytes)", name, length);
        Ok(Attribute { name_index, info })
    }

    pub fn name<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str> {
        pool.get_utf8(self.name_index)
    }
}

/// Read a `u16`-counted attribute table
pub fn read_attributes<R: ReadBytesExt>(
    reader: &mut R,
    pool: &ConstantPool,
) -> Result<Vec<Attribute>> {
    let count = u16::deserialize(reader)?;
    let mut attributes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        attributes.push(Attribute::read(reader, pool)?);
    }
    Ok(attributes)
}

/// Attributes with a known layout
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum AttributeType {
    ConstantValue,
    Code,
    StackMapTable,
    Exceptions,
    InnerClasses,
    EnclosingMethod,
    Synthetic,
    Signature,
    SourceFile,
    SourceDebugExtension,
    LineNumberTable,
    LocalVariableTable,
    LocalVariableTypeTable,
    Deprecated,
    RuntimeVisibleAnnotations,
    RuntimeInvisibleAnnotations,
    RuntimeVisibleParameterAnnotations,
    RuntimeInvisibleParameterAnnotations,
    RuntimeVisibleTypeAnnotations,
    RuntimeInvisibleTypeAnnotations,
    AnnotationDefault,
    BootstrapMethods,
    MethodParameters,
    Module,
    ModulePackages,
    ModuleMainClass,
    NestHost,
    NestMembers,
    Record,
    PermittedSubclasses,
}

impl AttributeType {
    pub const ALL: [AttributeType; 30] = [
        AttributeType::ConstantValue,
        AttributeType::Code,
        AttributeType::StackMapTable,
        AttributeType::Exceptions,
        AttributeType::InnerClasses,
        AttributeType::EnclosingMethod,
        AttributeType::Synthetic,
        AttributeType::Signature,
        AttributeType::SourceFile,
        AttributeType::SourceDebugExtension,
        AttributeType::LineNumberTable,
        AttributeType::LocalVariableTable,
        AttributeType::LocalVariableTypeTable,
        AttributeType::Deprecated,
        AttributeType::RuntimeVisibleAnnotations,
        AttributeType::RuntimeInvisibleAnnotations,
        AttributeType::RuntimeVisibleParameterAnnotations,
        AttributeType::RuntimeInvisibleParameterAnnotations,
        AttributeType::RuntimeVisibleTypeAnnotations,
        AttributeType::RuntimeInvisibleTypeAnnotations,
        AttributeType::AnnotationDefault,
        AttributeType::BootstrapMethods,
        AttributeType::MethodParameters,
        AttributeType::Module,
        AttributeType::ModulePackages,
        AttributeType::ModuleMainClass,
        AttributeType::NestHost,
        AttributeType::NestMembers,
        AttributeType::Record,
        AttributeType::PermittedSubclasses,
    ];

    /// Name of the attribute, as stored in the constant pool
    pub fn name(self) -> &'static str {
        match self {
            AttributeType::ConstantValue => "ConstantValue",
            AttributeType::Code => "Code",
            AttributeType::StackMapTable => "StackMapTable",
            AttributeType::Exceptions => "Exceptions",
            AttributeType::InnerClasses => "InnerClasses",
            AttributeType::EnclosingMethod => "EnclosingMethod",
            AttributeType::Synthetic => "Synthetic",
            AttributeType::Signature => "Signature",
            AttributeType::SourceFile => "SourceFile",
            AttributeType::SourceDebugExtension => "SourceDebugExtension",
            AttributeType::LineNumberTable => "LineNumberTable",
            AttributeType::LocalVariableTable => "LocalVariableTable",
            AttributeType::LocalVariableTypeTable => "LocalVariableTypeTable",
            AttributeType::Deprecated => "Deprecated",
            AttributeType::RuntimeVisibleAnnotations => "RuntimeVisibleAnnotations",
            AttributeType::RuntimeInvisibleAnnotations => "RuntimeInvisibleAnnotations",
            AttributeType::RuntimeVisibleParameterAnnotations => {
                "RuntimeVisibleParameterAnnotations"
            }
            AttributeType::RuntimeInvisibleParameterAnnotations => {
                "RuntimeInvisibleParameterAnnotations"
            }
            AttributeType::RuntimeVisibleTypeAnnotations => "RuntimeVisibleTypeAnnotations",
            AttributeType::RuntimeInvisibleTypeAnnotations => "RuntimeInvisibleTypeAnnotations",
            AttributeType::AnnotationDefault => "AnnotationDefault",
            AttributeType::BootstrapMethods => "BootstrapMethods",
            AttributeType::MethodParameters => "MethodParameters",
            AttributeType::Module => "Module",
            AttributeType::ModulePackages => "ModulePackages",
            AttributeType::ModuleMainClass => "ModuleMainClass",
            AttributeType::NestHost => "NestHost",
            AttributeType::NestMembers => "NestMembers",
            AttributeType::Record => "Record",
            AttributeType::PermittedSubclasses => "PermittedSubclasses",
        }
    }

    /// Exact (case sensitive) match against the known names
    pub fn from_name(name: &str) -> Option<AttributeType> {
        AttributeType::ALL
            .iter()
            .copied()
            .find(|attribute_type| attribute_type.name() == name)
    }
}

impl Display for AttributeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoded body of an attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeInfo {
    /// Index of an `Integer`, `Long`, `Float`, `Double`, or `String` constant
    ConstantValue(ConstantIndex),
    Code(Code),
    StackMapTable(Vec<StackMapFrame>),
    Exceptions(Vec<ClassConstantIndex>),
    InnerClasses(Vec<InnerClass>),
    EnclosingMethod(EnclosingMethod),
    Synthetic,
    Signature(Utf8ConstantIndex),
    SourceFile(Utf8ConstantIndex),
    SourceDebugExtension(Vec<u8>),
    LineNumberTable(Vec<LineNumber>),
    LocalVariableTable(Vec<LocalVariable>),
    LocalVariableTypeTable(Vec<LocalVariable>),
    Deprecated,
    RuntimeVisibleAnnotations(Vec<Annotation>),
    RuntimeInvisibleAnnotations(Vec<Annotation>),
    RuntimeVisibleParameterAnnotations(Vec<ParameterAnnotation>),
    RuntimeInvisibleParameterAnnotations(Vec<ParameterAnnotation>),
    RuntimeVisibleTypeAnnotations(Vec<TypeAnnotation>),
    RuntimeInvisibleTypeAnnotations(Vec<TypeAnnotation>),
    AnnotationDefault(ElementValue),
    BootstrapMethods(Vec<BootstrapMethod>),
    MethodParameters(Vec<MethodParameter>),
    Module(Module),
    ModulePackages(Vec<PackageConstantIndex>),
    ModuleMainClass(ClassConstantIndex),
    NestHost(ClassConstantIndex),
    NestMembers(Vec<ClassConstantIndex>),
    Record(Vec<RecordComponent>),
    PermittedSubclasses(Vec<ClassConstantIndex>),

    /// Attribute with an unrecognized name, with its bytes untouched
    Custom(Vec<u8>),
}

impl AttributeInfo {
    /// Decode the body of a known attribute
    ///
    /// The reader should only contain the body: `SourceDebugExtension` takes whatever is left.
    pub fn read<R: ReadBytesExt>(
        reader: &mut R,
        attribute_type: AttributeType,
        pool: &ConstantPool,
    ) -> Result<AttributeInfo> {
        let info = match attribute_type {
            AttributeType::ConstantValue => {
                AttributeInfo::ConstantValue(ConstantIndex::deserialize(reader)?)
            }
            AttributeType::Code => AttributeInfo::Code(Code::read(reader, pool)?),
            AttributeType::StackMapTable => AttributeInfo::StackMapTable(Vec::deserialize(reader)?),
            AttributeType::Exceptions => AttributeInfo::Exceptions(Vec::deserialize(reader)?),
            AttributeType::InnerClasses => AttributeInfo::InnerClasses(Vec::deserialize(reader)?),
            AttributeType::EnclosingMethod => {
                AttributeInfo::EnclosingMethod(EnclosingMethod::deserialize(reader)?)
            }
            AttributeType::Synthetic => AttributeInfo::Synthetic,
            AttributeType::Signature => {
                AttributeInfo::Signature(Utf8ConstantIndex::deserialize(reader)?)
            }
            AttributeType::SourceFile => {
                AttributeInfo::SourceFile(Utf8ConstantIndex::deserialize(reader)?)
            }
            AttributeType::SourceDebugExtension => {
                let mut debug_extension = vec![];
                reader.read_to_end(&mut debug_extension)?;
                AttributeInfo::SourceDebugExtension(debug_extension)
            }
            AttributeType::LineNumberTable => {
                AttributeInfo::LineNumberTable(Vec::deserialize(reader)?)
            }
            AttributeType::LocalVariableTable => {
                AttributeInfo::LocalVariableTable(Vec::deserialize(reader)?)
            }
            AttributeType::LocalVariableTypeTable => {
                AttributeInfo::LocalVariableTypeTable(Vec::deserialize(reader)?)
            }
            AttributeType::Deprecated => AttributeInfo::Deprecated,
            AttributeType::RuntimeVisibleAnnotations => {
                AttributeInfo::RuntimeVisibleAnnotations(Vec::deserialize(reader)?)
            }
            AttributeType::RuntimeInvisibleAnnotations => {
                AttributeInfo::RuntimeInvisibleAnnotations(Vec::deserialize(reader)?)
            }
            AttributeType::RuntimeVisibleParameterAnnotations => {
                AttributeInfo::RuntimeVisibleParameterAnnotations(read_parameter_annotations(
                    reader,
                )?)
            }
            AttributeType::RuntimeInvisibleParameterAnnotations => {
                AttributeInfo::RuntimeInvisibleParameterAnnotations(read_parameter_annotations(
                    reader,
                )?)
            }
            AttributeType::RuntimeVisibleTypeAnnotations => {
                AttributeInfo::RuntimeVisibleTypeAnnotations(Vec::deserialize(reader)?)
            }
            AttributeType::RuntimeInvisibleTypeAnnotations => {
                AttributeInfo::RuntimeInvisibleTypeAnnotations(Vec::deserialize(reader)?)
            }
            AttributeType::AnnotationDefault => {
                AttributeInfo::AnnotationDefault(ElementValue::deserialize(reader)?)
            }
            AttributeType::BootstrapMethods => {
                AttributeInfo::BootstrapMethods(Vec::deserialize(reader)?)
            }
            AttributeType::MethodParameters => {
                let count = u8::deserialize(reader)?;
                AttributeInfo::MethodParameters(read_sequence(reader, count as usize)?)
            }
            AttributeType::Module => AttributeInfo::Module(Module::deserialize(reader)?),
            AttributeType::ModulePackages => {
                AttributeInfo::ModulePackages(Vec::deserialize(reader)?)
            }
            AttributeType::ModuleMainClass => {
                AttributeInfo::ModuleMainClass(ClassConstantIndex::deserialize(reader)?)
            }
            AttributeType::NestHost => {
                AttributeInfo::NestHost(ClassConstantIndex::deserialize(reader)?)
            }
            AttributeType::NestMembers => AttributeInfo::NestMembers(Vec::deserialize(reader)?),
            AttributeType::Record => {
                let count = u16::deserialize(reader)?;
                let mut components = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    components.push(RecordComponent::read(reader, pool)?);
                }
                AttributeInfo::Record(components)
            }
            AttributeType::PermittedSubclasses => {
                AttributeInfo::PermittedSubclasses(Vec::deserialize(reader)?)
            }
        };
        Ok(info)
    }

    /// Known type of the attribute (`None` for custom attributes)
    pub fn attribute_type(&self) -> Option<AttributeType> {
        let attribute_type = match self {
            AttributeInfo::ConstantValue(_) => AttributeType::ConstantValue,
            AttributeInfo::Code(_) => AttributeType::Code,
            AttributeInfo::StackMapTable(_) => AttributeType::StackMapTable,
            AttributeInfo::Exceptions(_) => AttributeType::Exceptions,
            AttributeInfo::InnerClasses(_) => AttributeType::InnerClasses,
            AttributeInfo::EnclosingMethod(_) => AttributeType::EnclosingMethod,
            AttributeInfo::Synthetic => AttributeType::Synthetic,
            AttributeInfo::Signature(_) => AttributeType::Signature,
            AttributeInfo::SourceFile(_) => AttributeType::SourceFile,
            AttributeInfo::SourceDebugExtension(_) => AttributeType::SourceDebugExtension,
            AttributeInfo::LineNumberTable(_) => AttributeType::LineNumberTable,
            AttributeInfo::LocalVariableTable(_) => AttributeType::LocalVariableTable,
            AttributeInfo::LocalVariableTypeTable(_) => AttributeType::LocalVariableTypeTable,
            AttributeInfo::Deprecated => AttributeType::Deprecated,
            AttributeInfo::RuntimeVisibleAnnotations(_) => AttributeType::RuntimeVisibleAnnotations,
            AttributeInfo::RuntimeInvisibleAnnotations(_) => {
                AttributeType::RuntimeInvisibleAnnotations
            }
            AttributeInfo::RuntimeVisibleParameterAnnotations(_) => {
                AttributeType::RuntimeVisibleParameterAnnotations
            }
            AttributeInfo::RuntimeInvisibleParameterAnnotations(_) => {
                AttributeType::RuntimeInvisibleParameterAnnotations
            }
            AttributeInfo::RuntimeVisibleTypeAnnotations(_) => {
                AttributeType::RuntimeVisibleTypeAnnotations
            }
            AttributeInfo::RuntimeInvisibleTypeAnnotations(_) => {
                AttributeType::RuntimeInvisibleTypeAnnotations
            }
            AttributeInfo::AnnotationDefault(_) => AttributeType::AnnotationDefault,
            AttributeInfo::BootstrapMethods(_) => AttributeType::BootstrapMethods,
            AttributeInfo::MethodParameters(_) => AttributeType::MethodParameters,
            AttributeInfo::Module(_) => AttributeType::Module,
            AttributeInfo::ModulePackages(_) => AttributeType::ModulePackages,
            AttributeInfo::ModuleMainClass(_) => AttributeType::ModuleMainClass,
            AttributeInfo::NestHost(_) => AttributeType::NestHost,
            AttributeInfo::NestMembers(_) => AttributeType::NestMembers,
            AttributeInfo::Record(_) => AttributeType::Record,
            AttributeInfo::PermittedSubclasses(_) => AttributeType::PermittedSubclasses,
            AttributeInfo::Custom(_) => return None,
        };
        Some(attribute_type)
    }
}

/// Things that carry a table of attributes
pub trait HasAttributes {
    fn attributes(&self) -> &[Attribute];

    /// First attribute of the given type
    fn attribute(&self, attribute_type: AttributeType) -> Option<&AttributeInfo> {
        self.attributes()
            .iter()
            .map(|attribute| &attribute.info)
            .find(|info| info.attribute_type() == Some(attribute_type))
    }

    fn has_attribute(&self, attribute_type: AttributeType) -> bool {
        self.attribute(attribute_type).is_some()
    }

    /// Generic signature, from the `Signature` attribute
    fn generic_signature<'p>(&self, pool: &'p ConstantPool) -> Result<Option<&'p str>> {
        match self.attribute(AttributeType::Signature) {
            Some(AttributeInfo::Signature(signature)) => Ok(Some(pool.get_utf8(*signature)?)),
            _ => Ok(None),
        }
    }

    /// All annotations, visible at runtime or not
    fn annotations(&self) -> Vec<&Annotation> {
        self.attributes()
            .iter()
            .flat_map(|attribute| match &attribute.info {
                AttributeInfo::RuntimeVisibleAnnotations(annotations)
                | AttributeInfo::RuntimeInvisibleAnnotations(annotations) => {
                    annotations.as_slice()
                }
                _ => &[],
            })
            .collect()
    }
}

/// Entry in the `InnerClasses` attribute
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct InnerClass {
    pub inner_class: ClassConstantIndex,

    /// Absent for top-level, local, and anonymous classes
    pub outer_class: Option<ClassConstantIndex>,

    /// Absent for anonymous classes
    pub inner_name: Option<Utf8ConstantIndex>,

    pub access_flags: InnerClassAccessFlags,
}

impl InnerClass {
    pub fn inner_class_name(&self, pool: &ConstantPool) -> Result<String> {
        pool.get_class_name(self.inner_class)
    }

    pub fn outer_class_name(&self, pool: &ConstantPool) -> Result<Option<String>> {
        self.outer_class
            .map(|outer| pool.get_class_name(outer))
            .transpose()
    }

    /// Simple name as written in the source (absent for anonymous classes)
    pub fn inner_name<'p>(&self, pool: &'p ConstantPool) -> Result<Option<&'p str>> {
        self.inner_name.map(|name| pool.get_utf8(name)).transpose()
    }

    pub fn is_member_class(&self) -> bool {
        self.outer_class.is_some()
    }

    pub fn is_anonymous(&self) -> bool {
        self.inner_name.is_none()
    }
}

impl Deserialize for InnerClass {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(InnerClass {
            inner_class: ClassConstantIndex::deserialize(reader)?,
            outer_class: Option::deserialize(reader)?,
            inner_name: Option::deserialize(reader)?,
            access_flags: InnerClassAccessFlags::deserialize(reader)?,
        })
    }
}

/// Innermost class and method enclosing a local or anonymous class
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct EnclosingMethod {
    pub class: ClassConstantIndex,

    /// Absent when the class is not immediately enclosed by a method or constructor
    pub method: Option<NameAndTypeConstantIndex>,
}

impl EnclosingMethod {
    pub fn class_name(&self, pool: &ConstantPool) -> Result<String> {
        pool.get_class_name(self.class)
    }

    /// Method signature, eg. `run(int)`
    pub fn method_signature(&self, pool: &ConstantPool) -> Result<Option<String>> {
        match self.method {
            Some(method) => Ok(Some(pool.get_name_and_type(method)?.signature(pool)?)),
            None => Ok(None),
        }
    }
}

impl Deserialize for EnclosingMethod {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(EnclosingMethod {
            class: ClassConstantIndex::deserialize(reader)?,
            method: Option::deserialize(reader)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct LineNumber {
    pub start_pc: u16,
    pub line_number: u16,
}

impl Deserialize for LineNumber {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(LineNumber {
            start_pc: u16::deserialize(reader)?,
            line_number: u16::deserialize(reader)?,
        })
    }
}

/// Entry of a `LocalVariableTable` or `LocalVariableTypeTable`
///
/// In the type table, `descriptor` points at a generic signature instead of a field descriptor.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct LocalVariable {
    pub start_pc: u16,
    pub length: u16,
    pub name: Utf8ConstantIndex,
    pub descriptor: Utf8ConstantIndex,
    pub index: u16,
}

impl LocalVariable {
    /// Is the variable live at this offset? (`start_pc` inclusive, `start_pc + length` exclusive)
    pub fn covers(&self, pc: usize) -> bool {
        let start = self.start_pc as usize;
        start <= pc && pc < start + self.length as usize
    }

    pub fn name<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str> {
        pool.get_utf8(self.name)
    }

    pub fn descriptor<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str> {
        pool.get_utf8(self.descriptor)
    }

    /// Dotted type, only meaningful for entries of a `LocalVariableTable`
    pub fn type_name(&self, pool: &ConstantPool) -> Result<String> {
        descriptors::convert(self.descriptor(pool)?)
    }
}

impl Deserialize for LocalVariable {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(LocalVariable {
            start_pc: u16::deserialize(reader)?,
            length: u16::deserialize(reader)?,
            name: Utf8ConstantIndex::deserialize(reader)?,
            descriptor: Utf8ConstantIndex::deserialize(reader)?,
            index: u16::deserialize(reader)?,
        })
    }
}

/// Entry in the `BootstrapMethods` attribute
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BootstrapMethod {
    /// Index of a `CONSTANT_MethodHandle`
    pub method_ref: ConstantIndex,

    /// Indices of loadable constants
    pub arguments: Vec<ConstantIndex>,
}

impl Deserialize for BootstrapMethod {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(BootstrapMethod {
            method_ref: ConstantIndex::deserialize(reader)?,
            arguments: Vec::deserialize(reader)?,
        })
    }
}

/// Entry in the `MethodParameters` attribute
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct MethodParameter {
    /// Absent for parameters without a name
    pub name: Option<Utf8ConstantIndex>,
    pub access_flags: ParameterAccessFlags,
}

impl MethodParameter {
    pub fn name<'p>(&self, pool: &'p ConstantPool) -> Result<Option<&'p str>> {
        self.name.map(|name| pool.get_utf8(name)).transpose()
    }
}

impl Deserialize for MethodParameter {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(MethodParameter {
            name: Option::deserialize(reader)?,
            access_flags: ParameterAccessFlags::deserialize(reader)?,
        })
    }
}

/// Component of a record class
#[derive(Debug, Clone, PartialEq)]
pub struct RecordComponent {
    pub name: Utf8ConstantIndex,
    pub descriptor: Utf8ConstantIndex,
    pub attributes: Vec<Attribute>,
}

impl RecordComponent {
    pub fn read<R: ReadBytesExt>(reader: &mut R, pool: &ConstantPool) -> Result<RecordComponent> {
        Ok(RecordComponent {
            name: Utf8ConstantIndex::deserialize(reader)?,
            descriptor: Utf8ConstantIndex::deserialize(reader)?,
            attributes: read_attributes(reader, pool)?,
        })
    }

    pub fn name<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str> {
        pool.get_utf8(self.name)
    }

    pub fn type_name(&self, pool: &ConstantPool) -> Result<String> {
        descriptors::convert(pool.get_utf8(self.descriptor)?)
    }
}

impl HasAttributes for RecordComponent {
    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_file::Constant;

    fn pool(names: &[&str]) -> ConstantPool {
        names
            .iter()
            .map(|name| Constant::Utf8(String::from(*name)))
            .collect()
    }

    #[test]
    fn catalog_names_round_trip() {
        for attribute_type in AttributeType::ALL {
            assert_eq!(
                AttributeType::from_name(attribute_type.name()),
                Some(attribute_type)
            );
        }
        assert_eq!(AttributeType::from_name("sourcefile"), None);
    }

    #[test]
    fn unknown_attribute_is_kept_raw() {
        let pool = pool(&["org.example.Marker"]);
        let mut input: &[u8] = &[0, 1, 0, 0, 0, 3, 7, 8, 9, 0xFF];
        let attribute = Attribute::read(&mut input, &pool).unwrap();
        assert_eq!(attribute.info, AttributeInfo::Custom(vec![7, 8, 9]));
        assert_eq!(attribute.name(&pool).unwrap(), "org.example.Marker");
        assert_eq!(input, &[0xFF]);
    }

    #[test]
    fn body_must_match_declared_length() {
        let pool = pool(&["SourceFile"]);

        let mut short: &[u8] = &[0, 1, 0, 0, 0, 3, 0, 1, 0];
        assert!(matches!(
            Attribute::read(&mut short, &pool),
            Err(Error::MalformedInput(_))
        ));

        let mut long: &[u8] = &[0, 1, 0, 0, 0, 1, 0, 1];
        assert!(matches!(
            Attribute::read(&mut long, &pool),
            Err(Error::MalformedInput(_))
        ));

        let mut exact: &[u8] = &[0, 1, 0, 0, 0, 2, 0, 1];
        let attribute = Attribute::read(&mut exact, &pool).unwrap();
        assert_eq!(
            attribute.info,
            AttributeInfo::SourceFile(Utf8ConstantIndex(ConstantIndex(1)))
        );
    }

    #[test]
    fn marker_attributes() {
        let pool = pool(&["Deprecated", "Synthetic"]);
        let mut input: &[u8] = &[0, 2, 0, 1, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0];
        let attributes = read_attributes(&mut input, &pool).unwrap();
        assert_eq!(attributes[0].info, AttributeInfo::Deprecated);
        assert_eq!(attributes[1].info, AttributeInfo::Synthetic);
    }

    #[test]
    fn inner_classes_with_absent_indices() {
        let pool = pool(&["InnerClasses"]);
        #[rustfmt::skip]
        let mut input: &[u8] = &[
            0, 1, 0, 0, 0, 10,
            0, 1,
            0, 5, 0, 0, 0, 0, 0, 0x08,
        ];
        let attribute = Attribute::read(&mut input, &pool).unwrap();
        match attribute.info {
            AttributeInfo::InnerClasses(classes) => {
                assert!(!classes[0].is_member_class());
                assert!(classes[0].is_anonymous());
                assert_eq!(classes[0].access_flags, InnerClassAccessFlags::STATIC);
            }
            other => panic!("expected inner classes, got {:?}", other),
        }
    }

    #[test]
    fn source_debug_extension_takes_whole_body() {
        let pool = pool(&["SourceDebugExtension"]);
        let mut input: &[u8] = &[0, 1, 0, 0, 0, 4, b'S', b'M', b'A', b'P'];
        let attribute = Attribute::read(&mut input, &pool).unwrap();
        assert_eq!(
            attribute.info,
            AttributeInfo::SourceDebugExtension(b"SMAP".to_vec())
        );
    }

    #[test]
    fn local_variable_range() {
        let variable = LocalVariable {
            start_pc: 4,
            length: 6,
            name: Utf8ConstantIndex(ConstantIndex(1)),
            descriptor: Utf8ConstantIndex(ConstantIndex(2)),
            index: 1,
        };
        assert!(!variable.covers(3));
        assert!(variable.covers(4));
        assert!(variable.covers(9));
        assert!(!variable.covers(10));
    }
}
