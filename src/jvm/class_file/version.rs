use crate::jvm::class_file::Deserialize;
use crate::jvm::Result;
use byteorder::ReadBytesExt;
use std::fmt::{self, Display, Formatter};

/// Version of the class file, which is used to verify that the JVM has the
/// necessary features to interpret the class
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Version {
    pub major_version: u16,
    pub minor_version: u16,
}

impl Version {
    /// JVM class file version corresponding to Java SE 8 (released March 2014)
    pub const JAVA8: Version = Version {
        major_version: 52,
        minor_version: 0,
    };

    /// JVM class file version corresponding to Java SE 17 (released September 2021)
    pub const JAVA17: Version = Version {
        major_version: 61,
        minor_version: 0,
    };

    /// Java SE release that introduced this class file version (`None` before Java SE 1.2)
    pub fn java_release(&self) -> Option<u16> {
        if self.major_version >= 46 {
            Some(self.major_version - 44)
        } else {
            None
        }
    }
}

/// The class file stores the minor version first
impl Deserialize for Version {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        let minor_version = u16::deserialize(reader)?;
        let major_version = u16::deserialize(reader)?;
        Ok(Version {
            major_version,
            minor_version,
        })
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major_version, self.minor_version)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn minor_comes_first() {
        let mut input: &[u8] = &[0, 3, 0, 61];
        let version = Version::deserialize(&mut input).unwrap();
        assert_eq!(version.minor_version, 3);
        assert_eq!(version.java_release(), Some(17));
        assert!(version > Version::JAVA17);
        assert!(Version::JAVA8 < Version::JAVA17);
    }
}
