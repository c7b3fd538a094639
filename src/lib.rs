//! A hosted 32-bit FORTH virtual machine.
//!
//! The machine owns two byte arenas: a data space holding the dictionary,
//! the system variables and the data stack, and a separate return stack.
//! Words are either primitives, dispatched through a dense opcode
//! enumeration, or compound definitions threaded through code-field
//! addresses and executed by `DOCOL`/`EXIT`. The outer interpreter reads
//! whitespace-delimited words from the host input, looks them up, and
//! executes or compiles them; everything beyond the kernel is loaded as
//! FORTH source ahead of user input.
//!
//! ```no_run
//! use forth32::{Config, VM};
//!
//! let mut vm = VM::new(Config::default());
//! vm.run().unwrap();
//! ```

pub mod core;
pub mod dict;
pub mod exception;
pub mod interp;
pub mod io;
pub mod memory;
pub mod opcode;
pub mod parser;
pub mod tools;
pub mod vm;

pub use crate::core::{Core, Result};
pub use crate::dict::Dict;
pub use crate::exception::Exception;
pub use crate::interp::Interp;
pub use crate::io::{BufferIo, Io, StdIo};
pub use crate::opcode::Op;
pub use crate::tools::{Snapshot, Tools};
pub use crate::vm::{Config, Registers, VM};

/// A FORTH cell: all stack items, dictionary fields and addresses are
/// 32-bit signed integers.
pub type Cell = i32;

/// Value pushed by the `VERSION` word.
pub const VERSION: Cell = 47;
