//! The concrete virtual machine.

use log::debug;

use crate::core::{Core, ForwardReferences, Result};
use crate::dict::Dict;
use crate::interp::Interp;
use crate::io::{Io, StdIo};
use crate::memory::{
    DataSpace, Memory, ReturnStack, ADDR_BASE, ADDR_HERE, ADDR_LATEST, ADDR_S0, ADDR_STATE, CELL,
    DICTIONARY_START,
};
use crate::tools::Tools;
use crate::Cell;

/// Construction options.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Data-space size in bytes; at most the positive range of a cell.
    pub data_size: usize,
    /// Return-stack size in bytes.
    pub return_stack_size: usize,
    /// Emit one diagnostic line per dispatched opcode and lifecycle
    /// event through the `log` facade.
    pub trace: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            data_size: 65536,
            return_stack_size: 4096,
            trace: false,
        }
    }
}

/// The machine registers. SP and RSP grow downward; all three are byte
/// indices into their arenas.
pub struct Registers {
    pub sp: usize,
    pub rsp: usize,
    pub ip: usize,
}

/// A FORTH virtual machine bound to a host I/O implementation.
pub struct VM<I: Io> {
    data_space: DataSpace,
    return_stack: ReturnStack,
    regs: Registers,
    io: I,
    references: ForwardReferences,
    tkn: Vec<u8>,
    tracing: bool,
}

impl VM<StdIo> {
    /// A machine reading stdin and writing stdout.
    pub fn new(config: Config) -> VM<StdIo> {
        VM::with_io(config, StdIo::new())
    }
}

impl<I: Io> VM<I> {
    /// A machine bound to the given host I/O.
    pub fn with_io(config: Config, io: I) -> VM<I> {
        assert!(
            config.data_size % CELL == 0
                && config.data_size >= 4096
                && config.data_size <= i32::MAX as usize,
            "Invalid data-space size"
        );
        assert!(
            config.return_stack_size % CELL == 0 && config.return_stack_size >= 64,
            "Invalid return-stack size"
        );
        let mut vm = VM {
            data_space: DataSpace::new(config.data_size),
            return_stack: ReturnStack::new(config.return_stack_size),
            regs: Registers {
                sp: config.data_size,
                rsp: config.return_stack_size,
                ip: 0,
            },
            io,
            references: ForwardReferences::new(),
            tkn: Vec::with_capacity(32),
            tracing: config.trace,
        };
        vm.init_variables()
            .and_then(|_| vm.add_core())
            .expect("dictionary bootstrap failed");
        if vm.tracing {
            debug!(
                "machine up: {} bytes data space, {} bytes return stack, HERE {}",
                config.data_size,
                config.return_stack_size,
                vm.here().expect("HERE initialized"),
            );
        }
        vm
    }

    fn init_variables(&mut self) -> Result {
        let top = self.data_space.len() as Cell;
        self.data_space.put_i32(ADDR_S0, top)?;
        self.data_space.put_i32(ADDR_STATE, 0)?;
        self.data_space.put_i32(ADDR_BASE, 10)?;
        self.data_space.put_i32(ADDR_LATEST, 0)?;
        self.data_space.put_i32(ADDR_HERE, DICTIONARY_START as Cell)
    }

    /// Run the top-level QUIT loop until the session ends. `BYE` and end
    /// of input are normal termination; everything else is an abort and
    /// comes back as the error.
    pub fn run(&mut self) -> Result {
        let quit = self.references.cfa_quit;
        match self.execute_cfa(quit) {
            Err(e) if e.is_normal_termination() => {
                if self.tracing {
                    debug!("session ended: {}", e);
                }
                Ok(())
            }
            Err(e) => Err(e),
            Ok(()) => Ok(()),
        }
    }

    /// The most recently interpreted word, for diagnostics.
    pub fn last_token_string(&self) -> String {
        String::from_utf8_lossy(&self.tkn).into_owned()
    }

    pub fn io_ref(&self) -> &I {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut I {
        &mut self.io
    }
}

impl<I: Io> Core for VM<I> {
    fn data_space(&mut self) -> &mut DataSpace {
        &mut self.data_space
    }
    fn data_space_const(&self) -> &DataSpace {
        &self.data_space
    }
    fn return_stack(&mut self) -> &mut ReturnStack {
        &mut self.return_stack
    }
    fn return_stack_const(&self) -> &ReturnStack {
        &self.return_stack
    }
    fn regs(&mut self) -> &mut Registers {
        &mut self.regs
    }
    fn regs_const(&self) -> &Registers {
        &self.regs
    }
    fn io(&mut self) -> &mut dyn Io {
        &mut self.io
    }
    fn references(&self) -> &ForwardReferences {
        &self.references
    }
    fn references_mut(&mut self) -> &mut ForwardReferences {
        &mut self.references
    }
    fn last_token(&mut self) -> &mut Vec<u8> {
        &mut self.tkn
    }
    fn tracing(&self) -> bool {
        self.tracing
    }
}

impl<I: Io> Dict for VM<I> {}
impl<I: Io> Interp for VM<I> {}
impl<I: Io> Tools for VM<I> {}
