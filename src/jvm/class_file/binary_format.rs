use crate::jvm::{Error, Result};
use byteorder::{BigEndian, ReadBytesExt};
use std::io::Read;

/// Utility trait for deserializing data inside class files
///
/// Java class files have some peculiarities that make it useful to define an extra trait (instead
/// of just using `serde`):
///
///   - everything is big-endian
///   - tags are always `u8`
///   - when deserializing a sequence, the length of the sequence is usually a `u16` prefix
///
/// The reader is consumed strictly sequentially, so nothing here ever seeks or peeks.
pub trait Deserialize: Sized {
    /// Deserialize a construct from a binary input stream
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self>;
}

impl Deserialize for u8 {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_u8()?)
    }
}

impl Deserialize for u16 {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_u16::<BigEndian>()?)
    }
}

impl Deserialize for u32 {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_u32::<BigEndian>()?)
    }
}

impl Deserialize for i32 {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_i32::<BigEndian>()?)
    }
}

impl Deserialize for i64 {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_i64::<BigEndian>()?)
    }
}

impl Deserialize for f32 {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_f32::<BigEndian>()?)
    }
}

impl Deserialize for f64 {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_f64::<BigEndian>()?)
    }
}

/// Size in `u16` is the first thing deserialized
impl<A: Deserialize> Deserialize for Vec<A> {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        let len = u16::deserialize(reader)?;
        read_sequence(reader, len as usize)
    }
}

/// Read exactly `len` elements (for sequences whose length is not a `u16` prefix)
pub fn read_sequence<A: Deserialize, R: ReadBytesExt>(
    reader: &mut R,
    len: usize,
) -> Result<Vec<A>> {
    let mut elems = Vec::with_capacity(len.min(1024));
    for _ in 0..len {
        elems.push(A::deserialize(reader)?);
    }
    Ok(elems)
}

/// Read exactly `len` raw bytes
///
/// The length comes from the input, so the buffer grows as bytes actually arrive instead of being
/// allocated upfront.
pub fn read_bytes<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(len.min(64 * 1024));
    reader.by_ref().take(len as u64).read_to_end(&mut buffer)?;
    if buffer.len() != len {
        let msg = format!("expected {} bytes, but input ended after {}", len, buffer.len());
        return Err(Error::MalformedInput(msg));
    }
    Ok(buffer)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn big_endian_primitives() {
        let mut input: &[u8] = &[0xCA, 0xFE, 0xBA, 0xBE, 0xFF, 0xFE, 0x01];
        assert_eq!(u32::deserialize(&mut input).unwrap(), 0xCAFEBABE);
        assert_eq!(u16::deserialize(&mut input).unwrap(), 0xFFFE);
        assert_eq!(u8::deserialize(&mut input).unwrap(), 1);
        assert!(input.is_empty());
    }

    #[test]
    fn sequences_are_length_prefixed() {
        let mut input: &[u8] = &[0, 2, 0, 7, 0, 9];
        assert_eq!(Vec::<u16>::deserialize(&mut input).unwrap(), vec![7, 9]);
    }

    #[test]
    fn truncated_input_is_malformed() {
        let mut input: &[u8] = &[0, 3, 0, 7, 0, 9];
        assert!(matches!(
            Vec::<u16>::deserialize(&mut input),
            Err(Error::MalformedInput(_))
        ));

        let mut input: &[u8] = &[1, 2, 3];
        assert!(matches!(
            read_bytes(&mut input, 4),
            Err(Error::MalformedInput(_))
        ));
    }
}
