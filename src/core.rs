//! The machine core: registers, stack discipline and the primitives
//! that need nothing beyond memory and the two stacks.
//!
//! `Core` is implemented by the concrete [`VM`](crate::vm::VM); only the
//! accessor methods at the top are provided there, everything else is a
//! default method. The dictionary and interpreter layers build on this
//! trait ([`Dict`](crate::dict::Dict), [`Interp`](crate::interp::Interp)).

use crate::exception::Exception;
use crate::io::Io;
use crate::memory::{
    self, DataSpace, Memory, ReturnStack, ADDR_BASE, ADDR_HERE, ADDR_LATEST, ADDR_S0, ADDR_STATE,
    CELL,
};
use crate::opcode::Op;
use crate::vm::Registers;
use crate::{dict, Cell, VERSION};

pub type Result<T = ()> = std::result::Result<T, Exception>;

/// Code-field addresses resolved once at bootstrap and used on hot
/// interpreter paths afterward.
pub struct ForwardReferences {
    pub cfa_lit: Cell,
    pub cfa_quit: usize,
}

impl ForwardReferences {
    pub fn new() -> ForwardReferences {
        ForwardReferences {
            cfa_lit: 0,
            cfa_quit: 0,
        }
    }
}

impl Default for ForwardReferences {
    fn default() -> ForwardReferences {
        ForwardReferences::new()
    }
}

pub trait Core {
    // Accessors supplied by the virtual machine.

    fn data_space(&mut self) -> &mut DataSpace;
    fn data_space_const(&self) -> &DataSpace;
    fn return_stack(&mut self) -> &mut ReturnStack;
    fn return_stack_const(&self) -> &ReturnStack;
    fn regs(&mut self) -> &mut Registers;
    fn regs_const(&self) -> &Registers;
    fn io(&mut self) -> &mut dyn Io;
    fn references(&self) -> &ForwardReferences;
    fn references_mut(&mut self) -> &mut ForwardReferences;
    /// Bytes of the most recently interpreted word, kept for diagnostics.
    fn last_token(&mut self) -> &mut Vec<u8>;
    fn tracing(&self) -> bool;

    // Data stack.

    fn push(&mut self, v: Cell) -> Result {
        let sp = self.regs_const().sp;
        let new_sp = sp.checked_sub(CELL).ok_or(Exception::StackOverflow)?;
        if new_sp < self.here()? {
            return Err(Exception::StackOverflow);
        }
        self.data_space().put_i32(new_sp, v)?;
        self.regs().sp = new_sp;
        Ok(())
    }

    fn pop(&mut self) -> Result<Cell> {
        let sp = self.regs_const().sp;
        if sp + CELL > self.data_space_const().len() {
            return Err(Exception::StackUnderflow);
        }
        let v = self.data_space_const().get_i32(sp)?;
        self.regs().sp = sp + CELL;
        Ok(v)
    }

    /// Pop a cell and convert it into a byte address.
    fn pop_addr(&mut self) -> Result<usize> {
        let v = self.pop()?;
        memory::addr(v)
    }

    /// Read the cell `depth` cells below the top without mutating.
    fn pick(&self, depth: usize) -> Result<Cell> {
        let addr = self.regs_const().sp + depth * CELL;
        if addr + CELL > self.data_space_const().len() {
            return Err(Exception::StackUnderflow);
        }
        self.data_space_const().get_i32(addr)
    }

    fn drop_cells(&mut self, n: usize) -> Result {
        let sp = self.regs_const().sp + n * CELL;
        if sp > self.data_space_const().len() {
            return Err(Exception::StackUnderflow);
        }
        self.regs().sp = sp;
        Ok(())
    }

    // Return stack.

    fn rpush(&mut self, v: Cell) -> Result {
        let rsp = self.regs_const().rsp;
        let new_rsp = rsp
            .checked_sub(CELL)
            .ok_or(Exception::ReturnStackOverflow)?;
        self.return_stack().put_i32(new_rsp, v)?;
        self.regs().rsp = new_rsp;
        Ok(())
    }

    fn rpop(&mut self) -> Result<Cell> {
        let rsp = self.regs_const().rsp;
        if rsp + CELL > self.return_stack_const().len() {
            return Err(Exception::ReturnStackUnderflow);
        }
        let v = self.return_stack_const().get_i32(rsp)?;
        self.regs().rsp = rsp + CELL;
        Ok(v)
    }

    // System variables.

    fn here(&self) -> Result<usize> {
        memory::addr(self.data_space_const().get_i32(ADDR_HERE)?)
    }

    fn set_here(&mut self, addr: usize) -> Result {
        self.data_space().put_i32(ADDR_HERE, addr as Cell)
    }

    fn latest(&self) -> Result<usize> {
        memory::addr(self.data_space_const().get_i32(ADDR_LATEST)?)
    }

    fn set_latest(&mut self, addr: usize) -> Result {
        self.data_space().put_i32(ADDR_LATEST, addr as Cell)
    }

    fn state(&self) -> Result<Cell> {
        self.data_space_const().get_i32(ADDR_STATE)
    }

    fn base(&self) -> Result<Cell> {
        self.data_space_const().get_i32(ADDR_BASE)
    }

    // Compilation support.

    /// Fail unless `n` more bytes fit between HERE and the data stack.
    fn ensure_room(&self, n: usize) -> Result {
        if self.here()? + n > self.regs_const().sp {
            Err(Exception::DictionaryOverflow)
        } else {
            Ok(())
        }
    }

    /// Append one cell at HERE and advance it.
    fn compile_cell(&mut self, v: Cell) -> Result {
        self.ensure_room(CELL)?;
        let here = self.here()?;
        self.data_space().put_i32(here, v)?;
        self.set_here(here + CELL)
    }

    // Stack shuffling primitives.

    /// Run-time: ( x -- )
    fn p_drop(&mut self) -> Result {
        self.pop()?;
        Ok(())
    }

    /// Run-time: ( a b -- b a )
    fn swap(&mut self) -> Result {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push(b)?;
        self.push(a)
    }

    /// Run-time: ( x -- x x )
    fn dup(&mut self) -> Result {
        let v = self.pick(0)?;
        self.push(v)
    }

    /// Run-time: ( a b -- a b a )
    fn over(&mut self) -> Result {
        let v = self.pick(1)?;
        self.push(v)
    }

    /// Run-time: ( a b c -- b c a )
    fn rot(&mut self) -> Result {
        let c = self.pop()?;
        let b = self.pop()?;
        let a = self.pop()?;
        self.push(b)?;
        self.push(c)?;
        self.push(a)
    }

    /// Run-time: ( a b c -- c a b )
    fn minus_rot(&mut self) -> Result {
        let c = self.pop()?;
        let b = self.pop()?;
        let a = self.pop()?;
        self.push(c)?;
        self.push(a)?;
        self.push(b)
    }

    /// Run-time: ( a b -- )
    fn two_drop(&mut self) -> Result {
        self.drop_cells(2)
    }

    /// Run-time: ( a b -- a b a b )
    fn two_dup(&mut self) -> Result {
        let a = self.pick(1)?;
        let b = self.pick(0)?;
        self.push(a)?;
        self.push(b)
    }

    /// Run-time: ( a b c d -- c d a b )
    fn two_swap(&mut self) -> Result {
        let d = self.pop()?;
        let c = self.pop()?;
        let b = self.pop()?;
        let a = self.pop()?;
        self.push(c)?;
        self.push(d)?;
        self.push(a)?;
        self.push(b)
    }

    /// Run-time: ( x -- x x | 0 )
    ///
    /// Duplicate the top of stack only when it is nonzero.
    fn question_dup(&mut self) -> Result {
        let v = self.pick(0)?;
        if v != 0 {
            self.push(v)?;
        }
        Ok(())
    }

    // Arithmetic primitives. All of them wrap on overflow.

    /// Run-time: ( n -- n+1 )
    fn one_plus(&mut self) -> Result {
        let v = self.pop()?;
        self.push(v.wrapping_add(1))
    }

    /// Run-time: ( n -- n-1 )
    fn one_minus(&mut self) -> Result {
        let v = self.pop()?;
        self.push(v.wrapping_sub(1))
    }

    /// Run-time: ( n -- n+4 )
    fn four_plus(&mut self) -> Result {
        let v = self.pop()?;
        self.push(v.wrapping_add(4))
    }

    /// Run-time: ( n -- n-4 )
    fn four_minus(&mut self) -> Result {
        let v = self.pop()?;
        self.push(v.wrapping_sub(4))
    }

    /// Run-time: ( a b -- a+b )
    fn plus(&mut self) -> Result {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push(a.wrapping_add(b))
    }

    /// Run-time: ( a b -- a-b )
    fn minus(&mut self) -> Result {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push(a.wrapping_sub(b))
    }

    /// Run-time: ( a b -- a*b )
    fn star(&mut self) -> Result {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push(a.wrapping_mul(b))
    }

    /// Run-time: ( n1 n2 -- rem quot )
    ///
    /// Truncated division; the remainder takes the sign of the dividend.
    fn slash_mod(&mut self) -> Result {
        let n2 = self.pop()?;
        let n1 = self.pop()?;
        if n2 == 0 {
            return Err(Exception::DivisionByZero);
        }
        self.push(n1.wrapping_rem(n2))?;
        self.push(n1.wrapping_div(n2))
    }

    // Comparison primitives. True is 1, false is 0.

    /// Run-time: ( a b -- flag )
    fn equals(&mut self) -> Result {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push((a == b) as Cell)
    }

    /// Run-time: ( a b -- flag )
    fn not_equals(&mut self) -> Result {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push((a != b) as Cell)
    }

    /// Run-time: ( a b -- flag )
    fn less_than(&mut self) -> Result {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push((a < b) as Cell)
    }

    /// Run-time: ( a b -- flag )
    fn greater_than(&mut self) -> Result {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push((a > b) as Cell)
    }

    /// Run-time: ( a b -- flag )
    fn less_equals(&mut self) -> Result {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push((a <= b) as Cell)
    }

    /// Run-time: ( a b -- flag )
    fn greater_equals(&mut self) -> Result {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push((a >= b) as Cell)
    }

    /// Run-time: ( n -- flag )
    fn zero_equals(&mut self) -> Result {
        let v = self.pop()?;
        self.push((v == 0) as Cell)
    }

    /// Run-time: ( n -- flag )
    fn zero_not_equals(&mut self) -> Result {
        let v = self.pop()?;
        self.push((v != 0) as Cell)
    }

    /// Run-time: ( n -- flag )
    fn zero_less(&mut self) -> Result {
        let v = self.pop()?;
        self.push((v < 0) as Cell)
    }

    /// Run-time: ( n -- flag )
    fn zero_greater(&mut self) -> Result {
        let v = self.pop()?;
        self.push((v > 0) as Cell)
    }

    /// Run-time: ( n -- flag )
    fn zero_less_equals(&mut self) -> Result {
        let v = self.pop()?;
        self.push((v <= 0) as Cell)
    }

    /// Run-time: ( n -- flag )
    fn zero_greater_equals(&mut self) -> Result {
        let v = self.pop()?;
        self.push((v >= 0) as Cell)
    }

    // Bitwise primitives.

    fn and(&mut self) -> Result {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push(a & b)
    }

    fn or(&mut self) -> Result {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push(a | b)
    }

    fn xor(&mut self) -> Result {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push(a ^ b)
    }

    fn invert(&mut self) -> Result {
        let v = self.pop()?;
        self.push(!v)
    }

    // Memory primitives.

    /// Run-time: ( x a-addr -- )
    fn store(&mut self) -> Result {
        let addr = self.pop_addr()?;
        let x = self.pop()?;
        self.data_space().put_i32(addr, x)
    }

    /// Run-time: ( a-addr -- x )
    fn fetch(&mut self) -> Result {
        let addr = self.pop_addr()?;
        let x = self.data_space_const().get_i32(addr)?;
        self.push(x)
    }

    /// Run-time: ( n a-addr -- )
    fn plus_store(&mut self) -> Result {
        let addr = self.pop_addr()?;
        let n = self.pop()?;
        let v = self.data_space_const().get_i32(addr)?;
        self.data_space().put_i32(addr, v.wrapping_add(n))
    }

    /// Run-time: ( n a-addr -- )
    fn minus_store(&mut self) -> Result {
        let addr = self.pop_addr()?;
        let n = self.pop()?;
        let v = self.data_space_const().get_i32(addr)?;
        self.data_space().put_i32(addr, v.wrapping_sub(n))
    }

    /// Run-time: ( char c-addr -- )
    fn c_store(&mut self) -> Result {
        let addr = self.pop_addr()?;
        let x = self.pop()?;
        self.data_space().put_u8(addr, x as u8)
    }

    /// Run-time: ( c-addr -- char )
    fn c_fetch(&mut self) -> Result {
        let addr = self.pop_addr()?;
        let v = self.data_space_const().get_u8(addr)?;
        self.push(v as Cell)
    }

    /// Run-time: ( src dst -- src+1 dst+1 )
    ///
    /// Copy one byte and bump both addresses.
    fn c_copy(&mut self) -> Result {
        let dst = self.pop_addr()?;
        let src = self.pop_addr()?;
        let v = self.data_space_const().get_u8(src)?;
        self.data_space().put_u8(dst, v)?;
        self.push((src + 1) as Cell)?;
        self.push((dst + 1) as Cell)
    }

    /// Run-time: ( src dst u -- )
    ///
    /// Copy u bytes in strictly ascending address order; callers must
    /// not rely on any particular overlap behavior.
    fn c_move(&mut self) -> Result {
        let u = self.pop_addr()?;
        let dst = self.pop_addr()?;
        let src = self.pop_addr()?;
        for i in 0..u {
            let v = self.data_space_const().get_u8(src + i)?;
            self.data_space().put_u8(dst + i, v)?;
        }
        Ok(())
    }

    // Return stack transfer primitives.

    /// Run-time: ( x -- ) ( R: -- x )
    fn to_r(&mut self) -> Result {
        let v = self.pop()?;
        self.rpush(v)
    }

    /// Run-time: ( -- x ) ( R: x -- )
    fn r_from(&mut self) -> Result {
        let v = self.rpop()?;
        self.push(v)
    }

    /// Run-time: ( -- rsp )
    fn rsp_fetch(&mut self) -> Result {
        let rsp = self.regs_const().rsp;
        self.push(rsp as Cell)
    }

    /// Run-time: ( rsp -- )
    fn rsp_store(&mut self) -> Result {
        let v = self.pop_addr()?;
        if v > self.return_stack_const().len() || v % CELL != 0 {
            return Err(Exception::InvalidStackPointer);
        }
        self.regs().rsp = v;
        Ok(())
    }

    /// Run-time: ( R: x -- )
    fn r_drop(&mut self) -> Result {
        self.rpop()?;
        Ok(())
    }

    /// Run-time: ( -- sp )
    fn dsp_fetch(&mut self) -> Result {
        let sp = self.regs_const().sp;
        self.push(sp as Cell)
    }

    /// Run-time: ( sp -- )
    fn dsp_store(&mut self) -> Result {
        let v = self.pop_addr()?;
        if v > self.data_space_const().len() || v % CELL != 0 {
            return Err(Exception::InvalidStackPointer);
        }
        self.regs().sp = v;
        Ok(())
    }

    // Variables and constants. The variable words push the address of
    // their backing cell, not its value.

    fn p_state(&mut self) -> Result {
        self.push(ADDR_STATE as Cell)
    }

    fn p_here(&mut self) -> Result {
        self.push(ADDR_HERE as Cell)
    }

    fn p_latest(&mut self) -> Result {
        self.push(ADDR_LATEST as Cell)
    }

    fn p_s_zero(&mut self) -> Result {
        self.push(ADDR_S0 as Cell)
    }

    fn p_base(&mut self) -> Result {
        self.push(ADDR_BASE as Cell)
    }

    fn version(&mut self) -> Result {
        self.push(VERSION)
    }

    /// Run-time: ( -- addr )
    ///
    /// Top of the return stack arena, the initial RSP.
    fn r_zero(&mut self) -> Result {
        let len = self.return_stack_const().len();
        self.push(len as Cell)
    }

    /// Run-time: ( -- op )
    ///
    /// The codeword value that marks a compound definition.
    fn docol_id(&mut self) -> Result {
        self.push(Op::Docol as Cell)
    }

    fn f_immed(&mut self) -> Result {
        self.push(dict::F_IMMED as Cell)
    }

    fn f_hidden(&mut self) -> Result {
        self.push(dict::F_HIDDEN as Cell)
    }

    fn f_lenmask(&mut self) -> Result {
        self.push(dict::F_LENMASK as Cell)
    }

    /// Run-time: ( -- u )
    ///
    /// Cells still free between the dictionary frontier and the stack.
    fn p_unused(&mut self) -> Result {
        let free = (self.regs_const().sp - self.here()?) / CELL;
        self.push(free as Cell)
    }
}

#[cfg(test)]
mod tests {
    use crate::io::BufferIo;
    use crate::memory::Memory;
    use crate::vm::{Config, VM};

    use super::Core;

    fn vm() -> VM<BufferIo> {
        VM::with_io(Config::default(), BufferIo::new(""))
    }

    #[test]
    fn test_push_pop() {
        let vm = &mut vm();
        vm.push(1).unwrap();
        vm.push(2).unwrap();
        assert_eq!(vm.pop(), Ok(2));
        assert_eq!(vm.pop(), Ok(1));
    }

    #[test]
    fn test_pop_empty_underflows() {
        let vm = &mut vm();
        assert_eq!(vm.pop(), Err(crate::Exception::StackUnderflow));
    }

    #[test]
    fn test_drop() {
        let vm = &mut vm();
        vm.push(1).unwrap();
        assert!(vm.p_drop().is_ok());
        assert!(vm.pop().is_err());
    }

    #[test]
    fn test_swap() {
        let vm = &mut vm();
        vm.push(1).unwrap();
        vm.push(2).unwrap();
        assert!(vm.swap().is_ok());
        assert_eq!(vm.pop(), Ok(1));
        assert_eq!(vm.pop(), Ok(2));
    }

    #[test]
    fn test_dup() {
        let vm = &mut vm();
        vm.push(1).unwrap();
        vm.push(2).unwrap();
        assert!(vm.dup().is_ok());
        assert_eq!(vm.pop(), Ok(2));
        assert_eq!(vm.pop(), Ok(2));
        assert_eq!(vm.pop(), Ok(1));
    }

    #[test]
    fn test_over() {
        let vm = &mut vm();
        vm.push(2).unwrap();
        vm.push(1).unwrap();
        assert!(vm.over().is_ok());
        assert_eq!(vm.pop(), Ok(2));
        assert_eq!(vm.pop(), Ok(1));
        assert_eq!(vm.pop(), Ok(2));
    }

    #[test]
    fn test_rot_and_back() {
        let vm = &mut vm();
        vm.push(1).unwrap();
        vm.push(2).unwrap();
        vm.push(3).unwrap();
        assert!(vm.rot().is_ok());
        // ( 1 2 3 -- 2 3 1 )
        assert_eq!(vm.pick(0), Ok(1));
        assert_eq!(vm.pick(1), Ok(3));
        assert_eq!(vm.pick(2), Ok(2));
        assert!(vm.minus_rot().is_ok());
        // back to ( 1 2 3 )
        assert_eq!(vm.pop(), Ok(3));
        assert_eq!(vm.pop(), Ok(2));
        assert_eq!(vm.pop(), Ok(1));
    }

    #[test]
    fn test_two_swap() {
        let vm = &mut vm();
        for v in 1..=4 {
            vm.push(v).unwrap();
        }
        assert!(vm.two_swap().is_ok());
        assert_eq!(vm.pop(), Ok(2));
        assert_eq!(vm.pop(), Ok(1));
        assert_eq!(vm.pop(), Ok(4));
        assert_eq!(vm.pop(), Ok(3));
    }

    #[test]
    fn test_question_dup() {
        let vm = &mut vm();
        vm.push(0).unwrap();
        assert!(vm.question_dup().is_ok());
        assert_eq!(vm.pop(), Ok(0));
        assert!(vm.pop().is_err());
        vm.push(5).unwrap();
        assert!(vm.question_dup().is_ok());
        assert_eq!(vm.pop(), Ok(5));
        assert_eq!(vm.pop(), Ok(5));
    }

    #[test]
    fn test_plus_wraps() {
        let vm = &mut vm();
        vm.push(i32::MIN).unwrap();
        vm.push(-1).unwrap();
        assert!(vm.plus().is_ok());
        assert_eq!(vm.pick(0), Ok(i32::MAX));
        vm.push(1).unwrap();
        assert!(vm.plus().is_ok());
        assert_eq!(vm.pop(), Ok(i32::MIN));
    }

    #[test]
    fn test_minus_inverts_plus() {
        let vm = &mut vm();
        vm.push(i32::MAX).unwrap();
        vm.push(100).unwrap();
        vm.plus().unwrap();
        vm.push(100).unwrap();
        vm.minus().unwrap();
        assert_eq!(vm.pop(), Ok(i32::MAX));
    }

    #[test]
    fn test_slash_mod() {
        let vm = &mut vm();
        vm.push(30).unwrap();
        vm.push(7).unwrap();
        assert!(vm.slash_mod().is_ok());
        assert_eq!(vm.pop(), Ok(4)); // quotient
        assert_eq!(vm.pop(), Ok(2)); // remainder
    }

    #[test]
    fn test_slash_mod_truncates_toward_zero() {
        let vm = &mut vm();
        vm.push(-7).unwrap();
        vm.push(2).unwrap();
        vm.slash_mod().unwrap();
        assert_eq!(vm.pop(), Ok(-3));
        assert_eq!(vm.pop(), Ok(-1));
    }

    #[test]
    fn test_division_by_zero() {
        let vm = &mut vm();
        vm.push(1).unwrap();
        vm.push(0).unwrap();
        assert_eq!(vm.slash_mod(), Err(crate::Exception::DivisionByZero));
    }

    #[test]
    fn test_comparisons_push_one_or_zero() {
        let vm = &mut vm();
        vm.push(2).unwrap();
        vm.push(3).unwrap();
        vm.less_than().unwrap();
        assert_eq!(vm.pop(), Ok(1));
        vm.push(2).unwrap();
        vm.push(3).unwrap();
        vm.greater_equals().unwrap();
        assert_eq!(vm.pop(), Ok(0));
        vm.push(-1).unwrap();
        vm.zero_less().unwrap();
        assert_eq!(vm.pop(), Ok(1));
    }

    #[test]
    fn test_bitwise() {
        let vm = &mut vm();
        vm.push(0b1100).unwrap();
        vm.push(0b1010).unwrap();
        vm.and().unwrap();
        assert_eq!(vm.pop(), Ok(0b1000));
        vm.push(0).unwrap();
        vm.invert().unwrap();
        assert_eq!(vm.pop(), Ok(-1));
    }

    #[test]
    fn test_store_fetch_round_trip() {
        let vm = &mut vm();
        let a = vm.here().unwrap() as i32 + 64;
        vm.push(-99).unwrap();
        vm.push(a).unwrap();
        vm.store().unwrap();
        vm.push(a).unwrap();
        vm.fetch().unwrap();
        assert_eq!(vm.pop(), Ok(-99));
    }

    #[test]
    fn test_c_store_c_fetch_round_trip() {
        let vm = &mut vm();
        let a = vm.here().unwrap() as i32 + 65; // deliberately unaligned
        vm.push(0xAB).unwrap();
        vm.push(a).unwrap();
        vm.c_store().unwrap();
        vm.push(a).unwrap();
        vm.c_fetch().unwrap();
        assert_eq!(vm.pop(), Ok(0xAB));
    }

    #[test]
    fn test_plus_store_minus_store() {
        let vm = &mut vm();
        let a = vm.here().unwrap() as i32 + 72;
        vm.push(10).unwrap();
        vm.push(a).unwrap();
        vm.store().unwrap();
        vm.push(5).unwrap();
        vm.push(a).unwrap();
        vm.plus_store().unwrap();
        vm.push(3).unwrap();
        vm.push(a).unwrap();
        vm.minus_store().unwrap();
        vm.push(a).unwrap();
        vm.fetch().unwrap();
        assert_eq!(vm.pop(), Ok(12));
    }

    #[test]
    fn test_c_copy_bumps_both_addresses() {
        let vm = &mut vm();
        let src = vm.here().unwrap() as i32 + 64;
        let dst = src + 8;
        vm.push(0x5A).unwrap();
        vm.push(src).unwrap();
        vm.c_store().unwrap();
        vm.push(src).unwrap();
        vm.push(dst).unwrap();
        vm.c_copy().unwrap();
        assert_eq!(vm.pop(), Ok(dst + 1));
        assert_eq!(vm.pop(), Ok(src + 1));
        vm.push(dst).unwrap();
        vm.c_fetch().unwrap();
        assert_eq!(vm.pop(), Ok(0x5A));
    }

    #[test]
    fn test_misaligned_fetch_fails() {
        let vm = &mut vm();
        vm.push(65).unwrap();
        assert_eq!(vm.fetch(), Err(crate::Exception::AddressAlignment));
    }

    #[test]
    fn test_c_move() {
        let vm = &mut vm();
        let src = vm.here().unwrap() as i32 + 64;
        let dst = src + 16;
        for (i, b) in b"FORTH".iter().enumerate() {
            vm.push(*b as i32).unwrap();
            vm.push(src + i as i32).unwrap();
            vm.c_store().unwrap();
        }
        vm.push(src).unwrap();
        vm.push(dst).unwrap();
        vm.push(5).unwrap();
        vm.c_move().unwrap();
        vm.push(dst + 4).unwrap();
        vm.c_fetch().unwrap();
        assert_eq!(vm.pop(), Ok(b'H' as i32));
    }

    #[test]
    fn test_return_stack_transfer() {
        let vm = &mut vm();
        vm.push(7).unwrap();
        vm.to_r().unwrap();
        assert!(vm.pop().is_err());
        vm.r_from().unwrap();
        assert_eq!(vm.pop(), Ok(7));
    }

    #[test]
    fn test_rsp_store_rejects_bad_pointer() {
        let vm = &mut vm();
        vm.push(3).unwrap(); // misaligned
        assert_eq!(vm.rsp_store(), Err(crate::Exception::InvalidStackPointer));
        let too_big = vm.return_stack_const().len() as i32 + 4;
        vm.push(too_big).unwrap();
        assert_eq!(vm.rsp_store(), Err(crate::Exception::InvalidStackPointer));
    }

    #[test]
    fn test_variables_push_addresses() {
        let vm = &mut vm();
        vm.p_state().unwrap();
        assert_eq!(vm.pop(), Ok(12));
        vm.p_base().unwrap();
        vm.fetch().unwrap();
        assert_eq!(vm.pop(), Ok(10));
    }

    #[test]
    fn test_unused_shrinks_as_dictionary_grows() {
        let vm = &mut vm();
        vm.p_unused().unwrap();
        let before = vm.pop().unwrap();
        vm.compile_cell(0).unwrap();
        vm.p_unused().unwrap();
        assert_eq!(vm.pop(), Ok(before - 1));
    }
}
