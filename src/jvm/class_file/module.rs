use crate::jvm::class_file::{
    ClassConstantIndex, ConstantPool, Deserialize, ModuleConstantIndex, PackageConstantIndex,
    Utf8ConstantIndex,
};
use crate::jvm::{ExportsFlags, ModuleFlags, RequiresFlags, Result};
use byteorder::ReadBytesExt;

/// Body of the `Module` attribute of a `module-info` class
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.25
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Module {
    pub name: ModuleConstantIndex,
    pub flags: ModuleFlags,
    pub version: Option<Utf8ConstantIndex>,
    pub requires: Vec<Requires>,
    pub exports: Vec<PackageDirective>,
    pub opens: Vec<PackageDirective>,

    /// Service interfaces this module uses
    pub uses: Vec<ClassConstantIndex>,
    pub provides: Vec<Provides>,
}

impl Module {
    pub fn name<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str> {
        pool.get_module_name(self.name)
    }

    pub fn version<'p>(&self, pool: &'p ConstantPool) -> Result<Option<&'p str>> {
        self.version.map(|version| pool.get_utf8(version)).transpose()
    }

    pub fn is_open(&self) -> bool {
        self.flags.contains(ModuleFlags::OPEN)
    }
}

impl Deserialize for Module {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(Module {
            name: ModuleConstantIndex::deserialize(reader)?,
            flags: ModuleFlags::deserialize(reader)?,
            version: Option::deserialize(reader)?,
            requires: Vec::deserialize(reader)?,
            exports: Vec::deserialize(reader)?,
            opens: Vec::deserialize(reader)?,
            uses: Vec::deserialize(reader)?,
            provides: Vec::deserialize(reader)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Requires {
    pub module: ModuleConstantIndex,
    pub flags: RequiresFlags,
    pub version: Option<Utf8ConstantIndex>,
}

impl Requires {
    pub fn module_name<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str> {
        pool.get_module_name(self.module)
    }
}

impl Deserialize for Requires {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(Requires {
            module: ModuleConstantIndex::deserialize(reader)?,
            flags: RequiresFlags::deserialize(reader)?,
            version: Option::deserialize(reader)?,
        })
    }
}

/// `exports` or `opens` directive (both have the same layout)
///
/// An empty `to` list means the package is exported or opened to every module.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PackageDirective {
    pub package: PackageConstantIndex,
    pub flags: ExportsFlags,
    pub to: Vec<ModuleConstantIndex>,
}

impl PackageDirective {
    pub fn package_name(&self, pool: &ConstantPool) -> Result<String> {
        pool.get_package_name(self.package)
    }

    pub fn is_qualified(&self) -> bool {
        !self.to.is_empty()
    }
}

impl Deserialize for PackageDirective {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(PackageDirective {
            package: PackageConstantIndex::deserialize(reader)?,
            flags: ExportsFlags::deserialize(reader)?,
            to: Vec::deserialize(reader)?,
        })
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Provides {
    pub service: ClassConstantIndex,
    pub with: Vec<ClassConstantIndex>,
}

impl Provides {
    pub fn service_name(&self, pool: &ConstantPool) -> Result<String> {
        pool.get_class_name(self.service)
    }

    pub fn implementation_names(&self, pool: &ConstantPool) -> Result<Vec<String>> {
        self.with
            .iter()
            .map(|implementation| pool.get_class_name(*implementation))
            .collect()
    }
}

impl Deserialize for Provides {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(Provides {
            service: ClassConstantIndex::deserialize(reader)?,
            with: Vec::deserialize(reader)?,
        })
    }
}
