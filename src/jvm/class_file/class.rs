use crate::jvm::class_file::{
    read_attributes, Attribute, AttributeInfo, AttributeType, BootstrapMethod, ClassConstantIndex,
    ConstantPool, Deserialize, EnclosingMethod, Field, HasAttributes, InnerClass, Method, Module,
    RecordComponent, Version,
};
use crate::jvm::{names, ClassAccessFlags, Error, Modifiers, Result};
use byteorder::ReadBytesExt;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::BufReader;
use std::path::Path;

/// Representation of the [`class` file format of the JVM][0]
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
    pub version: Version,
    pub constants: ConstantPool,
    pub access_flags: ClassAccessFlags,
    pub this_class: ClassConstantIndex,

    /// Absent only for `java.lang.Object` and `module-info`
    pub super_class: Option<ClassConstantIndex>,
    pub interfaces: Vec<ClassConstantIndex>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub attributes: Vec<Attribute>,
}

/// Lookup of other classes by dotted name, used to follow superclasses and interfaces
pub trait ClassFileRepository {
    fn get_classfile(&self, name: &str) -> Option<&ClassFile>;
}

impl ClassFileRepository for HashMap<String, ClassFile> {
    fn get_classfile(&self, name: &str) -> Option<&ClassFile> {
        self.get(name)
    }
}

impl ClassFile {
    /// Magic header bytes that go at the front of every class file
    pub const MAGIC: u32 = 0xCAFEBABE;

    /// Decode a class file from a stream, reading it exactly once from front to back
    pub fn read<R: ReadBytesExt>(reader: &mut R) -> Result<ClassFile> {
        let magic = u32::deserialize(reader)?;
        if magic != ClassFile::MAGIC {
            let msg = format!("bad magic number {:#010x}", magic);
            return Err(Error::MalformedInput(msg));
        }

        let version = Version::deserialize(reader)?;
        let constants = ConstantPool::read(reader)?;
        let access_flags = ClassAccessFlags::deserialize(reader)?;
        let this_class = ClassConstantIndex::deserialize(reader)?;
        let class_name = constants.get_class_name(this_class)?;
        let super_class = Option::deserialize(reader)?;
        let interfaces = Vec::deserialize(reader)?;

        let field_count = u16::deserialize(reader)?;
        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            fields.push(Field::read(reader, &constants)?);
        }

        let method_count = u16::deserialize(reader)?;
        let mut methods = Vec::with_capacity(method_count as usize);
        for _ in 0..method_count {
            methods.push(Method::read(reader, &constants)?);
        }

        let attributes = read_attributes(reader, &constants)?;

        log::debug!(
            "Read class {} (version {}, {} fields, {} methods)",
            class_name,
            version,
            fields.len(),
            methods.len()
        );
        Ok(ClassFile {
            version,
            constants,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    /// Decode the class file at a path
    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<ClassFile> {
        let file = fs::File::open(path.as_ref()).map_err(Error::IoError)?;
        ClassFile::read(&mut BufReader::new(file))
    }

    /// Dotted name of the class, eg. `java.util.Map$Entry`
    pub fn class_name(&self) -> Result<String> {
        self.constants.get_class_name(self.this_class)
    }

    /// Empty for classes in the default package
    pub fn package_name(&self) -> Result<String> {
        Ok(names::package_name(&self.class_name()?).to_owned())
    }

    pub fn simple_name(&self) -> Result<String> {
        Ok(names::simple_name(&self.class_name()?).to_owned())
    }

    pub fn has_superclass(&self) -> bool {
        self.super_class.is_some()
    }

    pub fn superclass_name(&self) -> Result<Option<String>> {
        self.super_class
            .map(|super_class| self.constants.get_class_name(super_class))
            .transpose()
    }

    pub fn interface_names(&self) -> Result<Vec<String>> {
        self.interfaces
            .iter()
            .map(|interface| self.constants.get_class_name(*interface))
            .collect()
    }

    pub fn is_public(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::PUBLIC)
    }

    pub fn is_package(&self) -> bool {
        !self.is_public()
    }

    pub fn is_final(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::FINAL)
    }

    pub fn is_super(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::SUPER)
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::INTERFACE)
    }

    pub fn is_abstract(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::ABSTRACT)
    }

    pub fn is_annotation(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::ANNOTATION)
    }

    pub fn is_enum(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::ENUM)
    }

    pub fn is_module(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::MODULE)
    }

    /// From the access flags or the `Synthetic` attribute
    pub fn is_synthetic(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::SYNTHETIC)
            || self.has_attribute(AttributeType::Synthetic)
    }

    pub fn is_deprecated(&self) -> bool {
        self.has_attribute(AttributeType::Deprecated)
    }

    pub fn is_generic(&self) -> bool {
        self.has_attribute(AttributeType::Signature)
    }

    /// Name of the source file, from the `SourceFile` attribute
    pub fn source_file(&self) -> Result<Option<&str>> {
        match self.attribute(AttributeType::SourceFile) {
            Some(AttributeInfo::SourceFile(name)) => Ok(Some(self.constants.get_utf8(*name)?)),
            _ => Ok(None),
        }
    }

    /// Java declaration, eg. `public abstract class a.B extends a.C implements a.I`
    pub fn declaration(&self) -> Result<String> {
        let mut declaration = String::new();
        for modifier in self.access_flags.modifiers() {
            declaration.push_str(modifier);
            declaration.push(' ');
        }

        let interfaces = self.interface_names()?.join(", ");
        if self.is_interface() {
            declaration.push_str("interface ");
            declaration.push_str(&self.class_name()?);
            if !interfaces.is_empty() {
                declaration.push_str(" extends ");
                declaration.push_str(&interfaces);
            }
        } else {
            declaration.push_str("class ");
            declaration.push_str(&self.class_name()?);
            if let Some(superclass) = self.superclass_name()? {
                declaration.push_str(" extends ");
                declaration.push_str(&superclass);
            }
            if !interfaces.is_empty() {
                declaration.push_str(" implements ");
                declaration.push_str(&interfaces);
            }
        }
        Ok(declaration)
    }

    /// Entries of the `InnerClasses` attribute
    pub fn inner_classes(&self) -> &[InnerClass] {
        match self.attribute(AttributeType::InnerClasses) {
            Some(AttributeInfo::InnerClasses(inner_classes)) => inner_classes,
            _ => &[],
        }
    }

    /// Entry of the `InnerClasses` attribute describing this class itself
    fn matching_inner_class(&self) -> Result<Option<&InnerClass>> {
        let class_name = self.class_name()?;
        for inner_class in self.inner_classes() {
            if inner_class.inner_class_name(&self.constants)? == class_name {
                return Ok(Some(inner_class));
            }
        }
        Ok(None)
    }

    pub fn enclosing_method(&self) -> Option<&EnclosingMethod> {
        match self.attribute(AttributeType::EnclosingMethod) {
            Some(AttributeInfo::EnclosingMethod(enclosing_method)) => Some(enclosing_method),
            _ => None,
        }
    }

    pub fn is_inner_class(&self) -> Result<bool> {
        Ok(self.matching_inner_class()?.is_some())
    }

    pub fn is_member_class(&self) -> Result<bool> {
        Ok(self
            .matching_inner_class()?
            .map_or(false, |inner_class| inner_class.is_member_class()))
    }

    /// Named class declared inside a method
    pub fn is_local_class(&self) -> Result<bool> {
        match (self.matching_inner_class()?, self.enclosing_method()) {
            (Some(inner_class), Some(_)) => Ok(!inner_class.is_anonymous()),
            _ => Ok(false),
        }
    }

    pub fn is_anonymous_class(&self) -> Result<bool> {
        Ok(self
            .matching_inner_class()?
            .map_or(false, |inner_class| inner_class.is_anonymous()))
    }

    /// Field declared in this class with the given name
    pub fn field(&self, name: &str) -> Result<Option<&Field>> {
        for field in &self.fields {
            if field.name(self)? == name {
                return Ok(Some(field));
            }
        }
        Ok(None)
    }

    /// Method declared in this class with the given signature (see [`Method::signature`])
    pub fn method(&self, signature: &str) -> Result<Option<&Method>> {
        for method in &self.methods {
            if method.signature(self)? == signature {
                return Ok(Some(method));
            }
        }
        Ok(None)
    }

    /// Find a field visible from this class, declared here or inherited
    ///
    /// The superclass chain is searched first (accepting public, protected, and same-package
    /// fields), then the interfaces (accepting public and protected fields). Classes missing from
    /// the repository are skipped.
    pub fn locate_field<'a, R: ClassFileRepository + ?Sized>(
        &'a self,
        name: &str,
        repository: &'a R,
    ) -> Result<Option<(&'a ClassFile, &'a Field)>> {
        self.locate_field_inner(name, repository, &mut Search::default())
    }

    fn locate_field_inner<'a, R: ClassFileRepository + ?Sized>(
        &'a self,
        name: &str,
        repository: &'a R,
        search: &mut Search,
    ) -> Result<Option<(&'a ClassFile, &'a Field)>> {
        if let Some(field) = self.field(name)? {
            return Ok(Some((self, field)));
        }
        let class_name = self.class_name()?;
        if search.enter(&class_name) != Step::New {
            return Ok(None);
        }
        let found = self.locate_inherited_field(name, repository, search);
        search.leave(class_name);
        found
    }

    fn locate_inherited_field<'a, R: ClassFileRepository + ?Sized>(
        &'a self,
        name: &str,
        repository: &'a R,
        search: &mut Search,
    ) -> Result<Option<(&'a ClassFile, &'a Field)>> {
        if let Some(superclass) = self.resolve_superclass(repository)? {
            if let Some((owner, field)) = superclass.locate_field_inner(name, repository, search)? {
                let same_package = owner.package_name()? == self.package_name()?;
                if field.is_public() || field.is_protected() || (field.is_package() && same_package)
                {
                    return Ok(Some((owner, field)));
                }
            }
        }

        for interface in self.resolve_interfaces(repository)? {
            if let Some((owner, field)) = interface.locate_field_inner(name, repository, search)? {
                if field.is_public() || field.is_protected() {
                    return Ok(Some((owner, field)));
                }
            }
        }

        Ok(None)
    }

    /// Find a method visible from this class, declared here or inherited (see
    /// [`ClassFile::locate_field`] for the search order)
    pub fn locate_method<'a, R: ClassFileRepository + ?Sized>(
        &'a self,
        signature: &str,
        repository: &'a R,
    ) -> Result<Option<(&'a ClassFile, &'a Method)>> {
        self.locate_method_inner(signature, repository, &mut Search::default())
    }

    fn locate_method_inner<'a, R: ClassFileRepository + ?Sized>(
        &'a self,
        signature: &str,
        repository: &'a R,
        search: &mut Search,
    ) -> Result<Option<(&'a ClassFile, &'a Method)>> {
        if let Some(method) = self.method(signature)? {
            return Ok(Some((self, method)));
        }
        let class_name = self.class_name()?;
        if search.enter(&class_name) != Step::New {
            return Ok(None);
        }
        let found = self.locate_inherited_method(signature, repository, search);
        search.leave(class_name);
        found
    }

    fn locate_inherited_method<'a, R: ClassFileRepository + ?Sized>(
        &'a self,
        signature: &str,
        repository: &'a R,
        search: &mut Search,
    ) -> Result<Option<(&'a ClassFile, &'a Method)>> {

        if let Some(superclass) = self.resolve_superclass(repository)? {
            if let Some((owner, method)) =
                superclass.locate_method_inner(signature, repository, search)?
            {
                let same_package = owner.package_name()? == self.package_name()?;
                if method.is_public()
                    || method.is_protected()
                    || (method.is_package() && same_package)
                {
                    return Ok(Some((owner, method)));
                }
            }
        }

        for interface in self.resolve_interfaces(repository)? {
            if let Some((owner, method)) =
                interface.locate_method_inner(signature, repository, search)?
            {
                if method.is_public() || method.is_protected() {
                    return Ok(Some((owner, method)));
                }
            }
        }

        Ok(None)
    }

    fn resolve_superclass<'a, R: ClassFileRepository + ?Sized>(
        &self,
        repository: &'a R,
    ) -> Result<Option<&'a ClassFile>> {
        Ok(self
            .superclass_name()?
            .and_then(|name| repository.get_classfile(&name)))
    }

    fn resolve_interfaces<'a, R: ClassFileRepository + ?Sized>(
        &self,
        repository: &'a R,
    ) -> Result<Vec<&'a ClassFile>> {
        Ok(self
            .interface_names()?
            .iter()
            .filter_map(|name| repository.get_classfile(name))
            .collect())
    }

    /// Entries of the `BootstrapMethods` attribute
    pub fn bootstrap_methods(&self) -> &[BootstrapMethod] {
        match self.attribute(AttributeType::BootstrapMethods) {
            Some(AttributeInfo::BootstrapMethods(methods)) => methods,
            _ => &[],
        }
    }

    pub fn bootstrap_method(&self, index: u16) -> Option<&BootstrapMethod> {
        self.bootstrap_methods().get(index as usize)
    }

    /// Body of the `Module` attribute, for `module-info` classes
    pub fn module(&self) -> Option<&Module> {
        match self.attribute(AttributeType::Module) {
            Some(AttributeInfo::Module(module)) => Some(module),
            _ => None,
        }
    }

    /// Components of a record class
    pub fn record_components(&self) -> &[RecordComponent] {
        match self.attribute(AttributeType::Record) {
            Some(AttributeInfo::Record(components)) => components,
            _ => &[],
        }
    }
}

impl HasAttributes for ClassFile {
    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

/// Classes met while searching a hierarchy for an inherited member
#[derive(Default)]
struct Search {
    /// Classes whose supertypes are being searched, innermost last
    path: Vec<String>,
    done: HashSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    New,
    Searched,
    Cyclic,
}

impl Search {
    /// Start searching the supertypes of a class, unless that is already done or underway
    fn enter(&mut self, class_name: &str) -> Step {
        if self.path.iter().any(|name| name == class_name) {
            log::warn!("Class hierarchy of {} is cyclic", class_name);
            Step::Cyclic
        } else if self.done.contains(class_name) {
            Step::Searched
        } else {
            self.path.push(class_name.to_owned());
            Step::New
        }
    }

    fn leave(&mut self, class_name: String) {
        self.path.pop();
        self.done.insert(class_name);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn diamond_is_not_a_cycle() {
        // `a.C` implements `a.I` and `a.J`, both of which extend `a.K`
        let mut search = Search::default();
        assert_eq!(search.enter("a.C"), Step::New);
        assert_eq!(search.enter("a.I"), Step::New);
        assert_eq!(search.enter("a.K"), Step::New);
        search.leave(String::from("a.K"));
        search.leave(String::from("a.I"));
        assert_eq!(search.enter("a.J"), Step::New);
        assert_eq!(search.enter("a.K"), Step::Searched);
        search.leave(String::from("a.J"));
        search.leave(String::from("a.C"));
    }

    #[test]
    fn cycle_is_detected_on_the_path() {
        let mut search = Search::default();
        assert_eq!(search.enter("a.First"), Step::New);
        assert_eq!(search.enter("a.Second"), Step::New);
        assert_eq!(search.enter("a.First"), Step::Cyclic);
    }
}
