//! Introspection helpers: a read-only snapshot of the machine state and
//! a dictionary walk, for tests and embedders.

use crate::core::Result;
use crate::dict::{Dict, F_LENMASK, FLAGS_OFFSET, NAME_OFFSET};
use crate::memory::{self, Memory, ADDR_BASE, ADDR_STATE, CELL};
use crate::Cell;

/// A copy of the observable machine state at one instant.
pub struct Snapshot {
    pub here: usize,
    pub latest: usize,
    pub state: Cell,
    pub base: Cell,
    pub ip: usize,
    pub sp: usize,
    pub rsp: usize,
    /// Data stack cells, bottom first.
    pub stack: Vec<Cell>,
    /// Return stack cells, bottom first.
    pub return_stack: Vec<Cell>,
    /// Data-space bytes from address 0 up to HERE.
    pub dictionary: Vec<u8>,
}

pub trait Tools: Dict {
    fn snapshot(&self) -> Result<Snapshot> {
        let regs = self.regs_const();
        let here = self.here()?;
        let mut stack = Vec::new();
        let mut addr = self.data_space_const().len();
        while addr > regs.sp {
            addr -= CELL;
            stack.push(self.data_space_const().get_i32(addr)?);
        }
        let mut return_stack = Vec::new();
        let mut addr = self.return_stack_const().len();
        while addr > regs.rsp {
            addr -= CELL;
            return_stack.push(self.return_stack_const().get_i32(addr)?);
        }
        Ok(Snapshot {
            here,
            latest: self.latest()?,
            state: self.data_space_const().get_i32(ADDR_STATE)?,
            base: self.data_space_const().get_i32(ADDR_BASE)?,
            ip: regs.ip,
            sp: regs.sp,
            rsp: regs.rsp,
            stack,
            return_stack,
            dictionary: self.data_space_const().slice(0, here)?.to_vec(),
        })
    }

    /// Names of every entry reachable from LATEST, newest first.
    fn words(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entry = self.latest()?;
        while entry != 0 {
            let flags = self.data_space_const().get_u8(entry + FLAGS_OFFSET)?;
            let len = (flags & F_LENMASK) as usize;
            let bytes = self.data_space_const().slice(entry + NAME_OFFSET, len)?;
            names.push(String::from_utf8_lossy(bytes).into_owned());
            entry = memory::addr(self.data_space_const().get_i32(entry)?)?;
        }
        Ok(names)
    }
}
