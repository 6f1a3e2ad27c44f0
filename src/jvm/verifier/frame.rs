use crate::jvm::class_file::{read_sequence, Deserialize};
use crate::jvm::verifier::VerificationType;
use crate::jvm::{Error, Result};
use byteorder::ReadBytesExt;

/// Layout of a stack map frame, which is decided entirely by the range its tag falls in
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum FrameType {
    /// Tags: 0-63
    Same,

    /// Tags: 64-127
    SameLocals1StackItem,

    /// Tag: 247
    SameLocals1StackItemExtended,

    /// Tags: 248-250
    Chop,

    /// Tag: 251
    SameExtended,

    /// Tags: 252-254
    Append,

    /// Tag: 255
    Full,
}

impl FrameType {
    /// Classify a frame tag, failing on the reserved range 128-246
    pub fn from_tag(tag: u8) -> Result<FrameType> {
        let frame_type = match tag {
            0..=63 => FrameType::Same,
            64..=127 => FrameType::SameLocals1StackItem,
            128..=246 => return Err(Error::ReservedFrameType(tag)),
            247 => FrameType::SameLocals1StackItemExtended,
            248..=250 => FrameType::Chop,
            251 => FrameType::SameExtended,
            252..=254 => FrameType::Append,
            255 => FrameType::Full,
        };
        Ok(frame_type)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum StackMapFrame {
    /// Frame has the same locals as the previous frame and number of stack items is zero
    ///
    /// The tag is the offset delta.
    Same { frame_type: u8 },

    /// Frame has the same locals as the previous frame and number of stack items is one
    ///
    /// The offset delta is the tag minus 64.
    SameLocals1StackItem {
        frame_type: u8,
        stack: VerificationType,
    },

    /// Like `SameLocals1StackItem`, but with an explicit offset delta
    SameLocals1StackItemExtended {
        offset_delta: u16,
        stack: VerificationType,
    },

    /// Frame is like the previous frame, but without the last `251 - frame_type` locals
    Chop { frame_type: u8, offset_delta: u16 },

    /// Like `Same`, but with an explicit offset delta
    SameExtended { offset_delta: u16 },

    /// Frame is like the previous frame, but with `frame_type - 251` extra locals
    Append {
        frame_type: u8,
        offset_delta: u16,
        locals: Vec<VerificationType>,
    },

    /// Frame has exactly the locals and stack specified
    Full {
        offset_delta: u16,
        locals: Vec<VerificationType>,
        stack: Vec<VerificationType>,
    },
}

impl StackMapFrame {
    /// Tag this frame was stored with
    pub fn frame_type(&self) -> u8 {
        match self {
            StackMapFrame::Same { frame_type }
            | StackMapFrame::SameLocals1StackItem { frame_type, .. }
            | StackMapFrame::Chop { frame_type, .. }
            | StackMapFrame::Append { frame_type, .. } => *frame_type,
            StackMapFrame::SameLocals1StackItemExtended { .. } => 247,
            StackMapFrame::SameExtended { .. } => 251,
            StackMapFrame::Full { .. } => 255,
        }
    }

    pub fn kind(&self) -> FrameType {
        match self {
            StackMapFrame::Same { .. } => FrameType::Same,
            StackMapFrame::SameLocals1StackItem { .. } => FrameType::SameLocals1StackItem,
            StackMapFrame::SameLocals1StackItemExtended { .. } => {
                FrameType::SameLocals1StackItemExtended
            }
            StackMapFrame::Chop { .. } => FrameType::Chop,
            StackMapFrame::SameExtended { .. } => FrameType::SameExtended,
            StackMapFrame::Append { .. } => FrameType::Append,
            StackMapFrame::Full { .. } => FrameType::Full,
        }
    }

    /// Distance from the previous frame (minus one, except for the first frame)
    pub fn offset_delta(&self) -> u16 {
        match self {
            StackMapFrame::Same { frame_type } => *frame_type as u16,
            StackMapFrame::SameLocals1StackItem { frame_type, .. } => *frame_type as u16 - 64,
            StackMapFrame::SameLocals1StackItemExtended { offset_delta, .. }
            | StackMapFrame::Chop { offset_delta, .. }
            | StackMapFrame::SameExtended { offset_delta }
            | StackMapFrame::Append { offset_delta, .. }
            | StackMapFrame::Full { offset_delta, .. } => *offset_delta,
        }
    }

    /// Number of locals removed by a chop frame
    pub fn chopped_locals(&self) -> usize {
        match self {
            StackMapFrame::Chop { frame_type, .. } => 251 - *frame_type as usize,
            _ => 0,
        }
    }

    /// Locals listed in the frame (only append and full frames have any)
    pub fn locals(&self) -> &[VerificationType] {
        match self {
            StackMapFrame::Append { locals, .. } | StackMapFrame::Full { locals, .. } => locals,
            _ => &[],
        }
    }

    /// Stack items listed in the frame
    pub fn stack(&self) -> &[VerificationType] {
        match self {
            StackMapFrame::SameLocals1StackItem { stack, .. }
            | StackMapFrame::SameLocals1StackItemExtended { stack, .. } => {
                std::slice::from_ref(stack)
            }
            StackMapFrame::Full { stack, .. } => stack,
            _ => &[],
        }
    }
}

impl Deserialize for StackMapFrame {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> Result<Self> {
        let frame_type = u8::deserialize(reader)?;
        let frame = match FrameType::from_tag(frame_type)? {
            FrameType::Same => StackMapFrame::Same { frame_type },
            FrameType::SameLocals1StackItem => StackMapFrame::SameLocals1StackItem {
                frame_type,
                stack: VerificationType::deserialize(reader)?,
            },
            FrameType::SameLocals1StackItemExtended => {
                StackMapFrame::SameLocals1StackItemExtended {
                    offset_delta: u16::deserialize(reader)?,
                    stack: VerificationType::deserialize(reader)?,
                }
            }
            FrameType::Chop => StackMapFrame::Chop {
                frame_type,
                offset_delta: u16::deserialize(reader)?,
            },
            FrameType::SameExtended => StackMapFrame::SameExtended {
                offset_delta: u16::deserialize(reader)?,
            },
            FrameType::Append => {
                let offset_delta = u16::deserialize(reader)?;
                let locals = read_sequence(reader, frame_type as usize - 251)?;
                StackMapFrame::Append {
                    frame_type,
                    offset_delta,
                    locals,
                }
            }
            FrameType::Full => StackMapFrame::Full {
                offset_delta: u16::deserialize(reader)?,
                locals: Vec::deserialize(reader)?,
                stack: Vec::deserialize(reader)?,
            },
        };
        log::trace!("Stack map frame {:?}", frame);
        Ok(frame)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Smallest valid encoding of a frame with the given tag
    fn encode(tag: u8) -> Vec<u8> {
        let mut bytes = vec![tag];
        match tag {
            0..=63 => (),
            64..=127 => bytes.push(1),
            247 => bytes.extend_from_slice(&[0, 9, 1]),
            248..=251 => bytes.extend_from_slice(&[0, 9]),
            252..=254 => {
                bytes.extend_from_slice(&[0, 9]);
                bytes.extend(std::iter::repeat(2).take(tag as usize - 251));
            }
            255 => bytes.extend_from_slice(&[0, 9, 0, 1, 4, 0, 1, 5]),
            _ => (),
        }
        bytes
    }

    #[test]
    fn every_tag_is_classified() {
        for tag in 0..=255u8 {
            let mut input: &[u8] = &encode(tag);
            let decoded = StackMapFrame::deserialize(&mut input);
            if (128..=246).contains(&tag) {
                assert!(matches!(decoded, Err(Error::ReservedFrameType(t)) if t == tag));
            } else {
                let frame = decoded.unwrap();
                assert_eq!(frame.frame_type(), tag);
                assert_eq!(frame.kind(), FrameType::from_tag(tag).unwrap());
                assert!(input.is_empty(), "tag {} left bytes unread", tag);
            }
        }
    }

    #[test]
    fn implicit_offsets() {
        let mut input: &[u8] = &[17];
        assert_eq!(StackMapFrame::deserialize(&mut input).unwrap().offset_delta(), 17);

        let mut input: &[u8] = &[64 + 5, 1];
        let frame = StackMapFrame::deserialize(&mut input).unwrap();
        assert_eq!(frame.offset_delta(), 5);
        assert_eq!(frame.stack(), &[VerificationType::Integer]);
    }

    #[test]
    fn chop_and_append_counts() {
        let mut input: &[u8] = &[249, 0, 3];
        let frame = StackMapFrame::deserialize(&mut input).unwrap();
        assert_eq!(frame.chopped_locals(), 2);
        assert_eq!(frame.offset_delta(), 3);

        let mut input: &[u8] = &[253, 0, 3, 1, 4];
        let frame = StackMapFrame::deserialize(&mut input).unwrap();
        assert_eq!(frame.locals(), &[VerificationType::Integer, VerificationType::Long]);
    }

    #[test]
    fn full_frame() {
        let mut input: &[u8] = &[255, 0, 12, 0, 2, 1, 3, 0, 1, 5];
        assert_eq!(
            StackMapFrame::deserialize(&mut input).unwrap(),
            StackMapFrame::Full {
                offset_delta: 12,
                locals: vec![VerificationType::Integer, VerificationType::Double],
                stack: vec![VerificationType::Null],
            }
        );
    }
}
