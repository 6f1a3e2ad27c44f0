//! Decoding of JVM bytecode
//!
//! Instructions are not decoded upfront into a list: an [`Instruction`] is a view over the code
//! array of a [`Code`] attribute, located by its start offset and length. The length of an
//! instruction is decided by its opcode except in three cases:
//!
//!   - `tableswitch` and `lookupswitch` have a jump table, which is aligned to a multiple of four
//!     bytes from the start of the code array (so the padding depends on where the instruction
//!     sits)
//!
//!   - `wide` widens the local variable index of the following instruction (and the increment,
//!     for `iinc`) to two bytes
//!
//! [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-6.html

use crate::jvm::class_file::{ClassFile, Code, Constant, ConstantPool, LocalVariable};
use crate::jvm::{Error, Result};
use byteorder::{BigEndian, ByteOrder};
use std::fmt::{self, Display, Formatter};

/// Mnemonics of the defined opcodes, from `nop` (0x00) to `breakpoint` (0xca)
#[rustfmt::skip]
const MNEMONICS: [&str; 0xcb] = [
    "nop", "aconst_null", "iconst_m1", "iconst_0", "iconst_1", "iconst_2", "iconst_3", "iconst_4",
    "iconst_5", "lconst_0", "lconst_1", "fconst_0", "fconst_1", "fconst_2", "dconst_0", "dconst_1",
    "bipush", "sipush", "ldc", "ldc_w", "ldc2_w", "iload", "lload", "fload",
    "dload", "aload", "iload_0", "iload_1", "iload_2", "iload_3", "lload_0", "lload_1",
    "lload_2", "lload_3", "fload_0", "fload_1", "fload_2", "fload_3", "dload_0", "dload_1",
    "dload_2", "dload_3", "aload_0", "aload_1", "aload_2", "aload_3", "iaload", "laload",
    "faload", "daload", "aaload", "baload", "caload", "saload", "istore", "lstore",
    "fstore", "dstore", "astore", "istore_0", "istore_1", "istore_2", "istore_3", "lstore_0",
    "lstore_1", "lstore_2", "lstore_3", "fstore_0", "fstore_1", "fstore_2", "fstore_3", "dstore_0",
    "dstore_1", "dstore_2", "dstore_3", "astore_0", "astore_1", "astore_2", "astore_3", "iastore",
    "lastore", "fastore", "dastore", "aastore", "bastore", "castore", "sastore", "pop",
    "pop2", "dup", "dup_x1", "dup_x2", "dup2", "dup2_x1", "dup2_x2", "swap",
    "iadd", "ladd", "fadd", "dadd", "isub", "lsub", "fsub", "dsub",
    "imul", "lmul", "fmul", "dmul", "idiv", "ldiv", "fdiv", "ddiv",
    "irem", "lrem", "frem", "drem", "ineg", "lneg", "fneg", "dneg",
    "ishl", "lshl", "ishr", "lshr", "iushr", "lushr", "iand", "land",
    "ior", "lor", "ixor", "lxor", "iinc", "i2l", "i2f", "i2d",
    "l2i", "l2f", "l2d", "f2i", "f2l", "f2d", "d2i", "d2l",
    "d2f", "i2b", "i2c", "i2s", "lcmp", "fcmpl", "fcmpg", "dcmpl",
    "dcmpg", "ifeq", "ifne", "iflt", "ifge", "ifgt", "ifle", "if_icmpeq",
    "if_icmpne", "if_icmplt", "if_icmpge", "if_icmpgt", "if_icmple", "if_acmpeq", "if_acmpne", "goto",
    "jsr", "ret", "tableswitch", "lookupswitch", "ireturn", "lreturn", "freturn", "dreturn",
    "areturn", "return", "getstatic", "putstatic", "getfield", "putfield", "invokevirtual", "invokespecial",
    "invokestatic", "invokeinterface", "invokedynamic", "new", "newarray", "anewarray", "arraylength", "athrow",
    "checkcast", "instanceof", "monitorenter", "monitorexit", "wide", "multianewarray", "ifnull", "ifnonnull",
    "goto_w", "jsr_w", "breakpoint",
];

pub const IINC: u8 = 0x84;
pub const RET: u8 = 0xa9;
pub const TABLESWITCH: u8 = 0xaa;
pub const LOOKUPSWITCH: u8 = 0xab;
pub const WIDE: u8 = 0xc4;

/// Mnemonic of an opcode (`None` for undefined opcodes)
pub fn mnemonic(opcode: u8) -> Option<&'static str> {
    match opcode {
        0x00..=0xca => Some(MNEMONICS[opcode as usize]),
        0xfe => Some("impdep1"),
        0xff => Some("impdep2"),
        _ => None,
    }
}

/// Number of operand bytes following an opcode of fixed length
fn operand_length(opcode: u8) -> Option<usize> {
    let length = match opcode {
        0x10 | 0x12 | 0x15..=0x19 | 0x36..=0x3a | RET | 0xbc => 1,
        0x11 | 0x13 | 0x14 | IINC | 0x99..=0xa8 | 0xb2..=0xb8 | 0xbb | 0xbd | 0xc0 | 0xc1
        | 0xc6 | 0xc7 => 2,
        0xc5 => 3,
        0xb9 | 0xba | 0xc8 | 0xc9 => 4,
        TABLESWITCH | LOOKUPSWITCH | WIDE => return None,
        opcode => {
            mnemonic(opcode)?;
            0
        }
    };
    Some(length)
}

/// Can this opcode follow a `wide` prefix?
fn is_widenable(opcode: u8) -> bool {
    matches!(opcode, 0x15..=0x19 | 0x36..=0x3a | IINC | RET)
}

/// Padding between a switch opcode at `start` and its 4-byte aligned operands
fn switch_padding(start: usize) -> usize {
    3 - start % 4
}

fn read_i32_at(code: &[u8], position: usize) -> Result<i32> {
    match code.get(position..position + 4) {
        Some(bytes) => Ok(BigEndian::read_i32(bytes)),
        None => Err(past_end(position)),
    }
}

fn past_end(position: usize) -> Error {
    let msg = format!("instruction operand at offset {} is past the end of the code", position);
    Error::MalformedInput(msg)
}

/// Length in bytes of the instruction starting at `start`, checked to end within `code`
pub fn instruction_length(code: &[u8], start: usize) -> Result<usize> {
    let opcode = match code.get(start) {
        Some(opcode) => *opcode,
        None => return Err(past_end(start)),
    };

    let length = match opcode {
        TABLESWITCH => {
            let operands = start + 1 + switch_padding(start);
            let low = read_i32_at(code, operands + 4)?;
            let high = read_i32_at(code, operands + 8)?;
            if high < low {
                let msg = format!("tableswitch at {} has low {} above high {}", start, low, high);
                return Err(Error::MalformedInput(msg));
            }
            let targets = (high as i64 - low as i64 + 1) as usize;
            1 + switch_padding(start) + 12 + 4 * targets
        }
        LOOKUPSWITCH => {
            let operands = start + 1 + switch_padding(start);
            let npairs = read_i32_at(code, operands + 4)?;
            if npairs < 0 {
                let msg = format!("lookupswitch at {} has {} pairs", start, npairs);
                return Err(Error::MalformedInput(msg));
            }
            1 + switch_padding(start) + 8 + 8 * npairs as usize
        }
        WIDE => match code.get(start + 1) {
            Some(&IINC) => 6,
            Some(widened) if is_widenable(*widened) => 4,
            Some(widened) => {
                let msg = format!("wide cannot prefix opcode {:#04x} at {}", widened, start + 1);
                return Err(Error::MalformedInput(msg));
            }
            None => return Err(past_end(start + 1)),
        },
        opcode => match operand_length(opcode) {
            Some(operands) => 1 + operands,
            None => {
                let msg = format!("undefined opcode {:#04x} at {}", opcode, start);
                return Err(Error::MalformedInput(msg));
            }
        },
    };

    if start + length > code.len() {
        return Err(past_end(start + length - 1));
    }
    Ok(length)
}

/// Iterator over the instructions of a code attribute
///
/// Code read from a class file has been checked to decode completely. Iteration stops at the
/// first undecodable instruction of code that was built by hand.
pub struct Instructions<'a> {
    code: &'a Code,
    position: usize,
}

impl<'a> Instructions<'a> {
    pub fn new(code: &'a Code) -> Instructions<'a> {
        Instructions { code, position: 0 }
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Instruction<'a>;

    fn next(&mut self) -> Option<Instruction<'a>> {
        if self.position >= self.code.code.len() {
            return None;
        }
        match instruction_length(&self.code.code, self.position) {
            Ok(length) => {
                let instruction = Instruction {
                    code: self.code,
                    start: self.position,
                    length,
                };
                self.position += length;
                Some(instruction)
            }
            Err(err) => {
                log::warn!("Stopping instruction decoding: {}", err);
                self.position = self.code.code.len();
                None
            }
        }
    }
}

/// One decoded instruction in a code attribute
#[derive(Copy, Clone, Debug)]
pub struct Instruction<'a> {
    code: &'a Code,
    start: usize,
    length: usize,
}

/// Jump table of a `tableswitch` or `lookupswitch`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SwitchTable {
    /// Branch offset when no key matches
    pub default: i32,

    /// Keys and their branch offsets (for `tableswitch`, the keys run from `low` to `high`)
    pub targets: Vec<(i32, i32)>,
}

impl<'a> Instruction<'a> {
    /// Code attribute containing the instruction
    pub fn code(&self) -> &'a Code {
        self.code
    }

    /// Offset of the instruction from the start of the code array
    pub fn start(&self) -> usize {
        self.start
    }

    /// Length in bytes, including the operands (and the `wide` prefix)
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn bytes(&self) -> &'a [u8] {
        &self.code.code[self.start..self.start + self.length]
    }

    pub fn opcode(&self) -> u8 {
        self.bytes()[0]
    }

    pub fn is_wide(&self) -> bool {
        self.opcode() == WIDE
    }

    /// Opcode that decides what the instruction does (the widened opcode for `wide`)
    pub fn effective_opcode(&self) -> u8 {
        if self.is_wide() {
            self.bytes()[1]
        } else {
            self.opcode()
        }
    }

    /// Mnemonic of the opcode (`wide` for widened instructions, see also `Display`)
    pub fn mnemonic(&self) -> &'static str {
        mnemonic(self.opcode()).unwrap_or("undefined")
    }

    fn u8_at(&self, position: usize) -> u8 {
        self.bytes()[position]
    }

    fn u16_at(&self, position: usize) -> u16 {
        BigEndian::read_u16(&self.bytes()[position..position + 2])
    }

    fn i16_at(&self, position: usize) -> i16 {
        BigEndian::read_i16(&self.bytes()[position..position + 2])
    }

    fn i32_at(&self, position: usize) -> i32 {
        BigEndian::read_i32(&self.bytes()[position..position + 4])
    }

    /// Is this a constant pool indexing instruction (`ldc`, field access, invocation, type
    /// operation)?
    pub fn refers_to_constant_pool(&self) -> bool {
        matches!(
            self.opcode(),
            0x12 | 0x13 | 0x14 | 0xb2..=0xbb | 0xbd | 0xc0 | 0xc1 | 0xc5
        )
    }

    /// Does this instruction read a local variable (including `iinc` and `ret`)?
    pub fn is_load(&self) -> bool {
        matches!(self.effective_opcode(), 0x15..=0x2d | IINC | RET)
    }

    /// Does this instruction write a local variable?
    pub fn is_store(&self) -> bool {
        matches!(self.effective_opcode(), 0x36..=0x4e)
    }

    /// Index operand: a local variable slot or a constant pool index, depending on the opcode
    ///
    /// Loads and stores like `iload_2` have their index encoded in the opcode.
    pub fn index(&self) -> Option<u16> {
        let opcode = self.opcode();
        let index = match opcode {
            WIDE => self.u16_at(2),
            0x1a..=0x2d => ((opcode - 0x1a) % 4) as u16,
            0x3b..=0x4e => ((opcode - 0x3b) % 4) as u16,
            0x12 | 0x15..=0x19 | 0x36..=0x3a | IINC | RET => self.u8_at(1) as u16,
            0x13 | 0x14 | 0xb2..=0xbb | 0xbd | 0xc0 | 0xc1 | 0xc5 => self.u16_at(1),
            _ => return None,
        };
        Some(index)
    }

    /// Branch offset, relative to the start of the instruction
    ///
    /// For the switches, this is the default offset.
    pub fn offset(&self) -> Option<i32> {
        let offset = match self.opcode() {
            0x99..=0xa8 | 0xc6 | 0xc7 => self.i16_at(1) as i32,
            0xc8 | 0xc9 => self.i32_at(1),
            TABLESWITCH | LOOKUPSWITCH => self.i32_at(1 + switch_padding(self.start)),
            _ => return None,
        };
        Some(offset)
    }

    /// Immediate value: pushed constant, `iinc` increment, `newarray` element type, or
    /// `multianewarray` dimensions
    pub fn value(&self) -> Option<i32> {
        let opcode = self.opcode();
        let value = match opcode {
            0x02..=0x08 => opcode as i32 - 3,
            0x09 | 0x0a => opcode as i32 - 0x09,
            0x0b..=0x0d => opcode as i32 - 0x0b,
            0x0e | 0x0f => opcode as i32 - 0x0e,
            0x10 => self.u8_at(1) as i8 as i32,
            0x11 => self.i16_at(1) as i32,
            IINC => self.u8_at(2) as i8 as i32,
            0xbc => self.u8_at(1) as i32,
            0xc5 => self.u8_at(3) as i32,
            WIDE if self.u8_at(1) == IINC => self.i16_at(4) as i32,
            _ => return None,
        };
        Some(value)
    }

    /// Jump table of a switch instruction
    pub fn switch_table(&self) -> Option<SwitchTable> {
        if !matches!(self.opcode(), TABLESWITCH | LOOKUPSWITCH) {
            return None;
        }
        let operands = 1 + switch_padding(self.start);
        let default = self.i32_at(operands);
        let targets = match self.opcode() {
            TABLESWITCH => {
                let low = self.i32_at(operands + 4);
                let high = self.i32_at(operands + 8);
                (low..=high)
                    .enumerate()
                    .map(|(i, key)| (key, self.i32_at(operands + 12 + 4 * i)))
                    .collect()
            }
            LOOKUPSWITCH => {
                let npairs = self.i32_at(operands + 4) as usize;
                (0..npairs)
                    .map(|i| {
                        let pair = operands + 8 + 8 * i;
                        (self.i32_at(pair), self.i32_at(pair + 4))
                    })
                    .collect()
            }
            _ => return None,
        };
        Some(SwitchTable { default, targets })
    }

    /// Constant pool entry referenced by the instruction, if it references one
    pub fn indexed_constant_pool_entry<'p>(
        &self,
        pool: &'p ConstantPool,
    ) -> Result<Option<&'p Constant>> {
        if !self.refers_to_constant_pool() {
            return Ok(None);
        }
        match self.index() {
            Some(index) => Ok(Some(pool.get(index)?)),
            None => Ok(None),
        }
    }

    /// Local variable read or written by the instruction, from the `LocalVariableTable`
    ///
    /// A variable written by a store only comes into scope after the store, so the lookup is done
    /// at the offset of the next instruction. Loads look the variable up at their own offset.
    pub fn indexed_local_variable(&self) -> Option<&'a LocalVariable> {
        let pc = if self.is_store() {
            self.start + self.length
        } else if self.is_load() {
            self.start
        } else {
            return None;
        };
        self.code.local_variable(self.index()?, pc)
    }

    /// Constants targeted by the method handles among the bootstrap arguments of the
    /// `CONSTANT_Dynamic` or `CONSTANT_InvokeDynamic` entry this instruction references
    ///
    /// Instructions not referencing a dynamic entry have none. A dynamic entry pointing past the
    /// `BootstrapMethods` attribute of the class is an error.
    pub fn dynamic_constant_pool_entries(&self, class: &'a ClassFile) -> Result<Vec<&'a Constant>> {
        let pool = &class.constants;
        let dynamic = match self.indexed_constant_pool_entry(pool)? {
            Some(Constant::Dynamic(dynamic)) | Some(Constant::InvokeDynamic(dynamic)) => dynamic,
            _ => return Ok(vec![]),
        };

        let bootstrap_index = dynamic.bootstrap_method_attr_index;
        let bootstrap_method = class
            .bootstrap_method(bootstrap_index)
            .ok_or(Error::MissingBootstrapMethod(bootstrap_index))?;

        let mut entries = vec![];
        for argument in &bootstrap_method.arguments {
            if let Constant::MethodHandle(handle) = pool.get(*argument)? {
                entries.push(pool.get(handle.reference)?);
            }
        }
        Ok(entries)
    }
}

/// Renders like `iload`, or `wide iload` for widened instructions
impl<'a> Display for Instruction<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_wide() {
            let widened = mnemonic(self.effective_opcode()).unwrap_or("undefined");
            write!(f, "wide {}", widened)
        } else {
            f.write_str(self.mnemonic())
        }
    }
}
