//! Stack map frames, as found in the `StackMapTable` attribute
//!
//! For any specific instruction inside a method body, the stack and locals should have the same
//! structure, regardless of which control flow was used to reach that instruction. This
//! information is referred to as the _stack map frame_ (represented using [`StackMapFrame`]) and
//! the set of stack map frames for all possible jump targets in a method is the _stack map
//! table_. The "types" used in frames (represented using [`VerificationType`]) are slightly
//! augmented to take into account initialization and null.
//!
//! Frames are stored compressed: each one is expressed relative to the previous one, and the
//! frame tag alone decides which of the seven layouts follows. This module only decodes that
//! layout, it does not run verification.
//!
//! [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.4

mod frame;
mod types;

pub use frame::*;
pub use types::*;
