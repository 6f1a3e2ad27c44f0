use crate::jvm::bytecode::{instruction_length, Instructions};
use crate::jvm::class_file::{
    read_attributes, read_bytes, Attribute, AttributeInfo, AttributeType, ClassConstantIndex,
    ConstantPool, Deserialize, HasAttributes, LineNumber, LocalVariable,
};
use crate::jvm::verifier::StackMapFrame;
use crate::jvm::{Error, Result};
use byteorder::ReadBytesExt;

/// Body of a method
///
/// The bytecode is kept as raw bytes: instructions are decoded on demand by [`Code::instructions`]
/// since their length depends on the opcode (and, for the switches, on their position).
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.3
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionHandler>,

    /// Usually `LineNumberTable`, `LocalVariableTable`, `LocalVariableTypeTable`, and
    /// `StackMapTable`
    pub attributes: Vec<Attribute>,
}

impl Code {
    /// Read the body of a `Code` attribute
    ///
    /// Every instruction in the code array is checked to decode to a known opcode that ends
    /// within the array.
    pub fn read<R: ReadBytesExt>(reader: &mut R, pool: &ConstantPool) -> Result<Code> {
        let max_stack = u16::deserialize(reader)?;
        let max_locals = u16::deserialize(reader)?;
        let code_length = u32::deserialize(reader)?;
        let code = read_bytes(reader, code_length as usize)?;

        let mut start = 0;
        let mut instruction_count = 0;
        while start < code.len() {
            start += instruction_length(&code, start)?;
            instruction_count += 1;
        }
        log::trace!(
            "Code has {} instructions in {} bytes",
            instruction_count,
            code.len()
        );

        Ok(Code {
            max_stack,
            max_locals,
            code,
            exception_table: Vec::deserialize(reader)?,
            attributes: read_attributes(reader, pool)?,
        })
    }

    /// Decoded instructions, in order
    pub fn instructions(&self) -> Instructions<'_> {
        Instructions::new(self)
    }

    /// Entries of all `LineNumberTable` attributes
    pub fn line_numbers(&self) -> impl Iterator<Item = &LineNumber> + '_ {
        self.attributes
            .iter()
            .flat_map(|attribute| match &attribute.info {
                AttributeInfo::LineNumberTable(lines) => lines.as_slice(),
                _ => &[],
            })
    }

    /// Source line of the instruction at this offset, if known
    pub fn line_number(&self, pc: usize) -> Option<u16> {
        self.line_numbers()
            .filter(|line| line.start_pc as usize <= pc)
            .max_by_key(|line| line.start_pc)
            .map(|line| line.line_number)
    }

    /// Entries of all `LocalVariableTable` attributes
    pub fn local_variables(&self) -> impl Iterator<Item = &LocalVariable> + '_ {
        self.attributes
            .iter()
            .flat_map(|attribute| match &attribute.info {
                AttributeInfo::LocalVariableTable(variables) => variables.as_slice(),
                _ => &[],
            })
    }

    /// Local variable declared in slot `index` and live at offset `pc`
    pub fn local_variable(&self, index: u16, pc: usize) -> Option<&LocalVariable> {
        self.local_variables()
            .find(|variable| variable.index == index && variable.covers(pc))
    }

    /// Frames of the `StackMapTable` attribute (empty when there is none)
    pub fn stack_map_frames(&self) -> &[StackMapFrame] {
        match self.attribute(AttributeType::StackMapTable) {
            Some(AttributeInfo::StackMapTable(frames)) => frames,
            _ => &[],
        }
    }

    /// Check that an offset is the start of an instruction
    pub fn check_instruction_start(&self, pc: usize) -> Result<()> {
        if self.instructions().any(|instruction| instruction.start() == pc) {
            Ok(())
        } else {
            let msg = format!("offset {} is not the start of an instruction", pc);
            Err(Error::MalformedInput(msg))
        }
    }
}

impl HasAttributes for Code {
    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

/// Entry of the exception table, in the order they are declared (which is the order in which
/// they are tried)
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ExceptionHandler {
    /// Start of exception handler range (inclusive)
    pub start_pc: u16,

    /// End of exception handler range (exclusive)
    pub end_pc: u16,

    /// Start of the exception handler
    pub handler_pc: u16,

    /// Absent for handlers catching everything (`finally` blocks)
    pub catch_type: Option<ClassConstantIndex>,
}

impl ExceptionHandler {
    pub fn catch_type_name(&self, pool: &ConstantPool) -> Result<Option<String>> {
        self.catch_type
            .map(|catch_type| pool.get_class_name(catch_type))
            .transpose()
    }

    /// Is the instruction at this offset protected by the handler?
    pub fn covers(&self, pc: usize) -> bool {
        self.start_pc as usize <= pc && pc < self.end_pc as usize
    }
}

impl Deserialize for ExceptionHandler {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        Ok(ExceptionHandler {
            start_pc: u16::deserialize(reader)?,
            end_pc: u16::deserialize(reader)?,
            handler_pc: u16::deserialize(reader)?,
            catch_type: Option::deserialize(reader)?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_file::{Constant, ConstantIndex, Utf8ConstantIndex};

    fn pool() -> ConstantPool {
        vec![
            Constant::Utf8(String::from("LineNumberTable")),
            Constant::Utf8(String::from("java/lang/Exception")),
            Constant::Class(Utf8ConstantIndex(ConstantIndex(2))),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn code_with_handlers_and_lines() {
        let pool = pool();
        #[rustfmt::skip]
        let mut input: &[u8] = &[
            0, 2, 0, 1,                 // max stack, max locals
            0, 0, 0, 5,                 // code length
            0x03, 0x3c, 0xa7, 0xff, 0xfe, // iconst_0, istore_1, goto -2
            0, 2,                       // two handlers
            0, 0, 0, 2, 0, 4, 0, 3,
            0, 0, 0, 2, 0, 4, 0, 0,
            0, 1,                       // one attribute
            0, 1, 0, 0, 0, 10, 0, 2, 0, 0, 0, 7, 0, 2, 0, 8,
        ];
        let code = Code::read(&mut input, &pool).unwrap();
        assert!(input.is_empty());
        assert_eq!(code.instructions().count(), 3);
        assert_eq!(
            code.exception_table[0].catch_type_name(&pool).unwrap(),
            Some(String::from("java.lang.Exception"))
        );
        assert_eq!(code.exception_table[1].catch_type_name(&pool).unwrap(), None);
        assert!(code.exception_table[0].covers(1));
        assert!(!code.exception_table[0].covers(2));
        assert_eq!(code.line_number(0), Some(7));
        assert_eq!(code.line_number(4), Some(8));
        assert!(code.stack_map_frames().is_empty());
        assert!(code.check_instruction_start(2).is_ok());
        assert!(code.check_instruction_start(3).is_err());
    }

    #[test]
    fn undefined_opcode_is_rejected() {
        let pool = pool();
        let mut input: &[u8] = &[0, 1, 0, 1, 0, 0, 0, 1, 0xcb, 0, 0, 0, 0];
        assert!(matches!(
            Code::read(&mut input, &pool),
            Err(Error::MalformedInput(_))
        ));
    }

    #[test]
    fn truncated_instruction_is_rejected() {
        let pool = pool();
        let mut input: &[u8] = &[0, 1, 0, 1, 0, 0, 0, 2, 0x11, 0x01, 0, 0, 0, 0];
        assert!(matches!(
            Code::read(&mut input, &pool),
            Err(Error::MalformedInput(_))
        ));
    }
}
