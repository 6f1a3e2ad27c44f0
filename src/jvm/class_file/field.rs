use crate::jvm::class_file::{
    read_attributes, Attribute, AttributeInfo, AttributeType, ClassFile, Constant, ConstantIndex,
    ConstantPool, Deserialize, HasAttributes, Utf8ConstantIndex,
};
use crate::jvm::{descriptors, FieldAccessFlags, Modifiers, Result};
use byteorder::ReadBytesExt;

/// Field declared by a class or interface
///
/// Names and types are resolved through the constant pool of the owning class, so the queries
/// take the class as an argument.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.5
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub access_flags: FieldAccessFlags,
    pub name_index: Utf8ConstantIndex,
    pub descriptor_index: Utf8ConstantIndex,
    pub attributes: Vec<Attribute>,
}

impl Field {
    pub fn read<R: ReadBytesExt>(reader: &mut R, pool: &ConstantPool) -> Result<Field> {
        let field = Field {
            access_flags: FieldAccessFlags::deserialize(reader)?,
            name_index: Utf8ConstantIndex::deserialize(reader)?,
            descriptor_index: Utf8ConstantIndex::deserialize(reader)?,
            attributes: read_attributes(reader, pool)?,
        };
        log::trace!("Read field {:?}", field.name_index);
        Ok(field)
    }

    pub fn name<'c>(&self, class: &'c ClassFile) -> Result<&'c str> {
        class.constants.get_utf8(self.name_index)
    }

    pub fn descriptor<'c>(&self, class: &'c ClassFile) -> Result<&'c str> {
        class.constants.get_utf8(self.descriptor_index)
    }

    /// Dotted type of the field, eg. `java.lang.String[]`
    pub fn type_name(&self, class: &ClassFile) -> Result<String> {
        descriptors::convert(self.descriptor(class)?)
    }

    /// `class.name`
    pub fn full_name(&self, class: &ClassFile) -> Result<String> {
        Ok(format!("{}.{}", class.class_name()?, self.name(class)?))
    }

    /// Index of the initial value from the `ConstantValue` attribute
    pub fn constant_value(&self) -> Option<ConstantIndex> {
        match self.attribute(AttributeType::ConstantValue) {
            Some(AttributeInfo::ConstantValue(value)) => Some(*value),
            _ => None,
        }
    }

    /// Initial value as a Java literal (strings are quoted)
    pub fn constant_value_literal(&self, class: &ClassFile) -> Result<Option<String>> {
        let index = match self.constant_value() {
            Some(index) => index,
            None => return Ok(None),
        };
        let pool = &class.constants;
        let literal = match pool.get(index)? {
            Constant::String(value) => quote(pool.get_utf8(*value)?),
            constant => constant.render(pool)?,
        };
        Ok(Some(literal))
    }

    /// Java declaration, eg. `private static final int MAX = 10`
    pub fn declaration(&self, class: &ClassFile) -> Result<String> {
        let mut declaration = String::new();
        for modifier in self.access_flags.modifiers() {
            declaration.push_str(modifier);
            declaration.push(' ');
        }
        declaration.push_str(&self.type_name(class)?);
        declaration.push(' ');
        declaration.push_str(self.name(class)?);
        if let Some(value) = self.constant_value_literal(class)? {
            declaration.push_str(" = ");
            declaration.push_str(&value);
        }
        Ok(declaration)
    }

    pub fn is_public(&self) -> bool {
        self.access_flags.contains(FieldAccessFlags::PUBLIC)
    }

    pub fn is_protected(&self) -> bool {
        self.access_flags.contains(FieldAccessFlags::PROTECTED)
    }

    pub fn is_private(&self) -> bool {
        self.access_flags.contains(FieldAccessFlags::PRIVATE)
    }

    /// Neither public, protected, nor private
    pub fn is_package(&self) -> bool {
        !self.access_flags.intersects(
            FieldAccessFlags::PUBLIC | FieldAccessFlags::PROTECTED | FieldAccessFlags::PRIVATE,
        )
    }

    pub fn is_static(&self) -> bool {
        self.access_flags.contains(FieldAccessFlags::STATIC)
    }

    pub fn is_final(&self) -> bool {
        self.access_flags.contains(FieldAccessFlags::FINAL)
    }

    pub fn is_volatile(&self) -> bool {
        self.access_flags.contains(FieldAccessFlags::VOLATILE)
    }

    pub fn is_transient(&self) -> bool {
        self.access_flags.contains(FieldAccessFlags::TRANSIENT)
    }

    pub fn is_enum(&self) -> bool {
        self.access_flags.contains(FieldAccessFlags::ENUM)
    }

    /// From the access flags or the `Synthetic` attribute
    pub fn is_synthetic(&self) -> bool {
        self.access_flags.contains(FieldAccessFlags::SYNTHETIC)
            || self.has_attribute(AttributeType::Synthetic)
    }

    pub fn is_deprecated(&self) -> bool {
        self.has_attribute(AttributeType::Deprecated)
    }

    pub fn is_generic(&self) -> bool {
        self.has_attribute(AttributeType::Signature)
    }
}

impl HasAttributes for Field {
    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

/// Quote a string as a Java string literal
pub(crate) fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn string_literals() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("say \"hi\"\n"), "\"say \\\"hi\\\"\\n\"");
    }
}
