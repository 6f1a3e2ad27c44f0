use crate::jvm::class_file::{
    read_attributes, Attribute, AttributeInfo, AttributeType, ClassConstantIndex, ClassFile, Code,
    ConstantPool, Deserialize, HasAttributes, MethodParameter, Utf8ConstantIndex,
};
use crate::jvm::{descriptors, names, MethodAccessFlags, Modifiers, Result};
use byteorder::ReadBytesExt;

/// Method declared by a class or interface
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.6
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub access_flags: MethodAccessFlags,
    pub name_index: Utf8ConstantIndex,
    pub descriptor_index: Utf8ConstantIndex,
    pub attributes: Vec<Attribute>,
}

impl Method {
    pub fn read<R: ReadBytesExt>(reader: &mut R, pool: &ConstantPool) -> Result<Method> {
        let method = Method {
            access_flags: MethodAccessFlags::deserialize(reader)?,
            name_index: Utf8ConstantIndex::deserialize(reader)?,
            descriptor_index: Utf8ConstantIndex::deserialize(reader)?,
            attributes: read_attributes(reader, pool)?,
        };
        log::trace!("Read method {:?}", method.name_index);
        Ok(method)
    }

    pub fn name<'c>(&self, class: &'c ClassFile) -> Result<&'c str> {
        class.constants.get_utf8(self.name_index)
    }

    pub fn descriptor<'c>(&self, class: &'c ClassFile) -> Result<&'c str> {
        class.constants.get_utf8(self.descriptor_index)
    }

    pub fn is_constructor(&self, class: &ClassFile) -> Result<bool> {
        Ok(self.name(class)? == names::INIT)
    }

    pub fn is_static_initializer(&self, class: &ClassFile) -> Result<bool> {
        Ok(self.name(class)? == names::CLINIT)
    }

    /// Method signature as written in the source
    ///
    ///   - constructors use the simple name of the class, eg. `Point(int, int)`
    ///   - the static initializer is `static {}`
    ///   - other methods use their name, eg. `equals(java.lang.Object)`
    pub fn signature(&self, class: &ClassFile) -> Result<String> {
        let name = self.name(class)?;
        if name == names::CLINIT {
            return Ok(String::from("static {}"));
        }
        let parameters = descriptors::signature(self.descriptor(class)?)?;
        if name == names::INIT {
            Ok(format!("{}{}", class.simple_name()?, parameters))
        } else {
            Ok(format!("{}{}", name, parameters))
        }
    }

    /// `class.name`
    pub fn full_name(&self, class: &ClassFile) -> Result<String> {
        Ok(format!("{}.{}", class.class_name()?, self.name(class)?))
    }

    /// `class.signature`
    pub fn full_signature(&self, class: &ClassFile) -> Result<String> {
        Ok(format!("{}.{}", class.class_name()?, self.signature(class)?))
    }

    pub fn return_type(&self, class: &ClassFile) -> Result<String> {
        descriptors::return_type(self.descriptor(class)?)
    }

    pub fn parameter_types(&self, class: &ClassFile) -> Result<Vec<String>> {
        descriptors::parameter_types(self.descriptor(class)?)
    }

    pub fn parameter_count(&self, class: &ClassFile) -> Result<usize> {
        descriptors::parameter_count(self.descriptor(class)?)
    }

    /// Classes from the `Exceptions` attribute
    pub fn exceptions(&self) -> &[ClassConstantIndex] {
        match self.attribute(AttributeType::Exceptions) {
            Some(AttributeInfo::Exceptions(exceptions)) => exceptions,
            _ => &[],
        }
    }

    pub fn exception_names(&self, class: &ClassFile) -> Result<Vec<String>> {
        self.exceptions()
            .iter()
            .map(|exception| class.constants.get_class_name(*exception))
            .collect()
    }

    /// Parameters from the `MethodParameters` attribute
    pub fn parameters(&self) -> &[MethodParameter] {
        match self.attribute(AttributeType::MethodParameters) {
            Some(AttributeInfo::MethodParameters(parameters)) => parameters,
            _ => &[],
        }
    }

    /// Body of the method (absent for `abstract` and `native` methods)
    pub fn code(&self) -> Option<&Code> {
        match self.attribute(AttributeType::Code) {
            Some(AttributeInfo::Code(code)) => Some(code),
            _ => None,
        }
    }

    /// Java declaration, eg. `public static void run(int) throws java.io.IOException`
    pub fn declaration(&self, class: &ClassFile) -> Result<String> {
        let is_constructor = self.is_constructor(class)?;
        let is_static_initializer = self.is_static_initializer(class)?;

        let mut declaration = String::new();
        for modifier in self.access_flags.modifiers() {
            if is_static_initializer && modifier == "static" {
                continue;
            }
            declaration.push_str(modifier);
            declaration.push(' ');
        }
        if !is_constructor && !is_static_initializer {
            declaration.push_str(&self.return_type(class)?);
            declaration.push(' ');
        }
        declaration.push_str(&self.signature(class)?);

        let exceptions = self.exception_names(class)?;
        if !exceptions.is_empty() {
            declaration.push_str(" throws ");
            declaration.push_str(&exceptions.join(", "));
        }
        Ok(declaration)
    }

    pub fn is_public(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::PUBLIC)
    }

    pub fn is_protected(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::PROTECTED)
    }

    pub fn is_private(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::PRIVATE)
    }

    /// Neither public, protected, nor private
    pub fn is_package(&self) -> bool {
        !self.access_flags.intersects(
            MethodAccessFlags::PUBLIC | MethodAccessFlags::PROTECTED | MethodAccessFlags::PRIVATE,
        )
    }

    pub fn is_static(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::STATIC)
    }

    pub fn is_final(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::FINAL)
    }

    pub fn is_synchronized(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::SYNCHRONIZED)
    }

    pub fn is_bridge(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::BRIDGE)
    }

    pub fn is_varargs(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::VARARGS)
    }

    pub fn is_native(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::NATIVE)
    }

    pub fn is_abstract(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::ABSTRACT)
    }

    pub fn is_strict(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::STRICT)
    }

    /// From the access flags or the `Synthetic` attribute
    pub fn is_synthetic(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::SYNTHETIC)
            || self.has_attribute(AttributeType::Synthetic)
    }

    pub fn is_deprecated(&self) -> bool {
        self.has_attribute(AttributeType::Deprecated)
    }

    pub fn is_generic(&self) -> bool {
        self.has_attribute(AttributeType::Signature)
    }
}

impl HasAttributes for Method {
    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}
