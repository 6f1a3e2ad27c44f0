use crate::jvm::class_file::Deserialize;
use crate::jvm::Result;
use bitflags::bitflags;
use byteorder::ReadBytesExt;

bitflags! {
    /// Access flags on classes
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.1-200-E.1
    pub struct ClassAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MODULE = 0x8000;
    }
}

bitflags! {
    /// Access flags on methods
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.6-200-A.1
    pub struct MethodAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
    }
}

bitflags! {
    /// Access flags on fields
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.5-200-A.1
    pub struct FieldAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const SYNTHETIC = 0x1000;
        const ENUM = 0x4000;
    }
}

bitflags! {
    /// Access flags on inner classes
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.6-300-D.1-D.1
    pub struct InnerClassAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
    }
}

bitflags! {
    /// Access flags on method parameters
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.24
    pub struct ParameterAccessFlags: u16 {
        const FINAL = 0x0010;
        const SYNTHETIC = 0x1000;
        const MANDATED = 0x8000;
    }
}

bitflags! {
    /// Flags on a module declaration
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.25
    pub struct ModuleFlags: u16 {
        const OPEN = 0x0020;
        const SYNTHETIC = 0x1000;
        const MANDATED = 0x8000;
    }
}

bitflags! {
    /// Flags on a `requires` module directive
    pub struct RequiresFlags: u16 {
        const TRANSITIVE = 0x0020;
        const STATIC_PHASE = 0x0040;
        const SYNTHETIC = 0x1000;
        const MANDATED = 0x8000;
    }
}

bitflags! {
    /// Flags on an `exports` or `opens` module directive
    pub struct ExportsFlags: u16 {
        const SYNTHETIC = 0x1000;
        const MANDATED = 0x8000;
    }
}

macro_rules! deserialize_flags {
    ($($flags:ident),*) => {
        $(
            /// Undefined bits are dropped rather than rejected
            impl Deserialize for $flags {
                fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
                    Ok($flags::from_bits_truncate(u16::deserialize(reader)?))
                }
            }
        )*
    };
}

deserialize_flags!(
    ClassAccessFlags,
    MethodAccessFlags,
    FieldAccessFlags,
    InnerClassAccessFlags,
    ParameterAccessFlags,
    ModuleFlags,
    RequiresFlags,
    ExportsFlags
);

/// Java source modifiers implied by the flags, in declaration order
pub trait Modifiers {
    fn modifiers(&self) -> Vec<&'static str>;
}

impl Modifiers for ClassAccessFlags {
    fn modifiers(&self) -> Vec<&'static str> {
        let mut modifiers = vec![];
        if self.contains(ClassAccessFlags::PUBLIC) {
            modifiers.push("public");
        }
        if self.contains(ClassAccessFlags::FINAL) {
            modifiers.push("final");
        }
        if self.contains(ClassAccessFlags::ABSTRACT) && !self.contains(ClassAccessFlags::INTERFACE)
        {
            modifiers.push("abstract");
        }
        modifiers
    }
}

impl Modifiers for InnerClassAccessFlags {
    fn modifiers(&self) -> Vec<&'static str> {
        let mut modifiers = vec![];
        if self.contains(InnerClassAccessFlags::PUBLIC) {
            modifiers.push("public");
        }
        if self.contains(InnerClassAccessFlags::PROTECTED) {
            modifiers.push("protected");
        }
        if self.contains(InnerClassAccessFlags::PRIVATE) {
            modifiers.push("private");
        }
        if self.contains(InnerClassAccessFlags::STATIC) {
            modifiers.push("static");
        }
        if self.contains(InnerClassAccessFlags::ABSTRACT)
            && !self.contains(InnerClassAccessFlags::INTERFACE)
        {
            modifiers.push("abstract");
        }
        if self.contains(InnerClassAccessFlags::FINAL) {
            modifiers.push("final");
        }
        modifiers
    }
}

impl Modifiers for FieldAccessFlags {
    fn modifiers(&self) -> Vec<&'static str> {
        let mut modifiers = vec![];
        if self.contains(FieldAccessFlags::PUBLIC) {
            modifiers.push("public");
        }
        if self.contains(FieldAccessFlags::PROTECTED) {
            modifiers.push("protected");
        }
        if self.contains(FieldAccessFlags::PRIVATE) {
            modifiers.push("private");
        }
        if self.contains(FieldAccessFlags::STATIC) {
            modifiers.push("static");
        }
        if self.contains(FieldAccessFlags::FINAL) {
            modifiers.push("final");
        }
        if self.contains(FieldAccessFlags::TRANSIENT) {
            modifiers.push("transient");
        }
        if self.contains(FieldAccessFlags::VOLATILE) {
            modifiers.push("volatile");
        }
        modifiers
    }
}

impl Modifiers for MethodAccessFlags {
    fn modifiers(&self) -> Vec<&'static str> {
        let mut modifiers = vec![];
        if self.contains(MethodAccessFlags::PUBLIC) {
            modifiers.push("public");
        }
        if self.contains(MethodAccessFlags::PROTECTED) {
            modifiers.push("protected");
        }
        if self.contains(MethodAccessFlags::PRIVATE) {
            modifiers.push("private");
        }
        if self.contains(MethodAccessFlags::STATIC) {
            modifiers.push("static");
        }
        if self.contains(MethodAccessFlags::FINAL) {
            modifiers.push("final");
        }
        if self.contains(MethodAccessFlags::SYNCHRONIZED) {
            modifiers.push("synchronized");
        }
        if self.contains(MethodAccessFlags::NATIVE) {
            modifiers.push("native");
        }
        if self.contains(MethodAccessFlags::ABSTRACT) {
            modifiers.push("abstract");
        }
        modifiers
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn undefined_bits_are_dropped() {
        let mut input: &[u8] = &[0x00, 0x03];
        assert_eq!(
            ClassAccessFlags::deserialize(&mut input).unwrap(),
            ClassAccessFlags::PUBLIC
        );
    }

    #[test]
    fn modifier_order() {
        let flags = MethodAccessFlags::PUBLIC
            | MethodAccessFlags::FINAL
            | MethodAccessFlags::STATIC
            | MethodAccessFlags::SYNCHRONIZED;
        assert_eq!(flags.modifiers(), vec!["public", "static", "final", "synchronized"]);

        let flags =
            ClassAccessFlags::PUBLIC | ClassAccessFlags::INTERFACE | ClassAccessFlags::ABSTRACT;
        assert_eq!(flags.modifiers(), vec!["public"]);
    }
}
