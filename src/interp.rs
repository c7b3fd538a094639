//! The inner and outer interpreters.
//!
//! Execution is threaded through code-field addresses: `execute_cfa`
//! reads the codeword at a cfa and `execute_op` dispatches it. `DOCOL`
//! owns the threading loop for its own activation and detects the `EXIT`
//! that ends it, so nesting needs no tail calls. `INTERPRET` is the
//! outer step: parse one word, find it, then execute or compile.

use log::trace;

use crate::core::{Core, Result};
use crate::dict::{Dict, F_IMMED, FLAGS_OFFSET};
use crate::exception::Exception;
use crate::memory::{self, Memory, CELL, WORD_BUFFER, WORD_BUFFER_SIZE};
use crate::opcode::Op;
use crate::parser;
use crate::Cell;

pub trait Interp: Dict {
    // Inner interpreter.

    /// Execute the word whose code field is at `cfa`.
    fn execute_cfa(&mut self, cfa: usize) -> Result {
        let op = self.data_space_const().get_i32(cfa)?;
        self.execute_op(op, cfa)
    }

    /// Dispatch one codeword. `cfa` is the code field it was read from,
    /// which `DOCOL` needs to locate the parameter field.
    fn execute_op(&mut self, op: Cell, cfa: usize) -> Result {
        let op = Op::from_cell(op).ok_or(Exception::InvalidOpcode)?;
        if self.tracing() {
            trace!("{:>6}  {}", cfa, op.forth_name());
        }
        match op {
            Op::Docol => self.docol(cfa),
            Op::Exit => self.exit(),
            Op::Lit => self.lit(),
            Op::LitString => self.lit_string(),
            Op::Branch => self.branch(),
            Op::ZeroBranch => self.zero_branch(),
            Op::Drop => self.p_drop(),
            Op::Swap => self.swap(),
            Op::Dup => self.dup(),
            Op::Over => self.over(),
            Op::Rot => self.rot(),
            Op::MinusRot => self.minus_rot(),
            Op::TwoDrop => self.two_drop(),
            Op::TwoDup => self.two_dup(),
            Op::TwoSwap => self.two_swap(),
            Op::QuestionDup => self.question_dup(),
            Op::OnePlus => self.one_plus(),
            Op::OneMinus => self.one_minus(),
            Op::FourPlus => self.four_plus(),
            Op::FourMinus => self.four_minus(),
            Op::Plus => self.plus(),
            Op::Minus => self.minus(),
            Op::Star => self.star(),
            Op::SlashMod => self.slash_mod(),
            Op::Equals => self.equals(),
            Op::NotEquals => self.not_equals(),
            Op::LessThan => self.less_than(),
            Op::GreaterThan => self.greater_than(),
            Op::LessEquals => self.less_equals(),
            Op::GreaterEquals => self.greater_equals(),
            Op::ZeroEquals => self.zero_equals(),
            Op::ZeroNotEquals => self.zero_not_equals(),
            Op::ZeroLess => self.zero_less(),
            Op::ZeroGreater => self.zero_greater(),
            Op::ZeroLessEquals => self.zero_less_equals(),
            Op::ZeroGreaterEquals => self.zero_greater_equals(),
            Op::And => self.and(),
            Op::Or => self.or(),
            Op::Xor => self.xor(),
            Op::Invert => self.invert(),
            Op::Store => self.store(),
            Op::Fetch => self.fetch(),
            Op::PlusStore => self.plus_store(),
            Op::MinusStore => self.minus_store(),
            Op::CStore => self.c_store(),
            Op::CFetch => self.c_fetch(),
            Op::CCopy => self.c_copy(),
            Op::CMove => self.c_move(),
            Op::ToR => self.to_r(),
            Op::RFrom => self.r_from(),
            Op::RspFetch => self.rsp_fetch(),
            Op::RspStore => self.rsp_store(),
            Op::RDrop => self.r_drop(),
            Op::DspFetch => self.dsp_fetch(),
            Op::DspStore => self.dsp_store(),
            Op::State => self.p_state(),
            Op::Here => self.p_here(),
            Op::Latest => self.p_latest(),
            Op::SZero => self.p_s_zero(),
            Op::Base => self.p_base(),
            Op::Version => self.version(),
            Op::RZero => self.r_zero(),
            Op::DocolId => self.docol_id(),
            Op::FImmed => self.f_immed(),
            Op::FHidden => self.f_hidden(),
            Op::FLenmask => self.f_lenmask(),
            Op::Key => self.p_key(),
            Op::Emit => self.emit(),
            Op::Word => self.p_word(),
            Op::Number => self.p_number(),
            Op::Tell => self.tell(),
            Op::Find => self.p_find(),
            Op::ToCfa => self.to_cfa(),
            Op::Create => self.p_create(),
            Op::Comma => self.comma(),
            Op::LeftBracket => self.left_bracket(),
            Op::RightBracket => self.right_bracket(),
            Op::Immediate => self.p_immediate(),
            Op::Hidden => self.p_hidden(),
            Op::Tick => self.tick(),
            Op::Char => self.p_char(),
            Op::Execute => self.execute(),
            Op::Interpret => self.interpret(),
            Op::Bye => Err(Exception::Bye),
            Op::Unused => self.p_unused(),
        }
    }

    /// Enter a compound definition: save IP, point it at the parameter
    /// field, and thread cell by cell until the activation's `EXIT`.
    fn docol(&mut self, cfa: usize) -> Result {
        let ip = self.regs_const().ip;
        self.rpush(ip as Cell)?;
        self.regs().ip = cfa + CELL;
        loop {
            let ip = self.regs_const().ip;
            let target = memory::addr(self.data_space_const().get_i32(ip)?)?;
            self.regs().ip = ip + CELL;
            let op = self.data_space_const().get_i32(target)?;
            self.execute_op(op, target)?;
            if op == Op::Exit as Cell {
                break;
            }
        }
        Ok(())
    }

    /// Run-time: ( -- ) ( R: nest-sys -- )
    fn exit(&mut self) -> Result {
        let ip = self.rpop()?;
        self.regs().ip = memory::addr(ip)?;
        Ok(())
    }

    /// Run-time: ( -- x )
    ///
    /// Push the cell following in the thread and step over it.
    fn lit(&mut self) -> Result {
        let ip = self.regs_const().ip;
        let v = self.data_space_const().get_i32(ip)?;
        self.regs().ip = ip + CELL;
        self.push(v)
    }

    /// Run-time: ( -- c-addr u )
    ///
    /// Push the address and length of the string compiled inline after
    /// this cell, then step IP past its aligned end.
    fn lit_string(&mut self) -> Result {
        let ip = self.regs_const().ip;
        let len = self.data_space_const().get_i32(ip)?;
        let len = memory::addr(len)?;
        self.push((ip + CELL) as Cell)?;
        self.push(len as Cell)?;
        self.regs().ip = ip + CELL + memory::aligned(len);
        Ok(())
    }

    /// Add the signed byte offset stored at IP to IP.
    fn branch(&mut self) -> Result {
        let ip = self.regs_const().ip;
        let off = self.data_space_const().get_i32(ip)?;
        let target = ip as i64 + off as i64;
        if target < 0 {
            return Err(Exception::InvalidMemoryAddress);
        }
        self.regs().ip = target as usize;
        Ok(())
    }

    /// Run-time: ( flag -- )
    ///
    /// Branch when flag is zero, otherwise step over the offset.
    fn zero_branch(&mut self) -> Result {
        let flag = self.pop()?;
        if flag == 0 {
            self.branch()
        } else {
            let ip = self.regs_const().ip;
            self.regs().ip = ip + CELL;
            Ok(())
        }
    }

    /// Run-time: ( -- xt )
    ///
    /// Identical to LIT; only meaningful inside a compiled definition,
    /// where the cell following is the cfa of the ticked word.
    fn tick(&mut self) -> Result {
        self.lit()
    }

    /// Run-time: ( i*x xt -- j*x )
    fn execute(&mut self) -> Result {
        let cfa = self.pop_addr()?;
        self.execute_cfa(cfa)
    }

    // Host I/O.

    /// One byte of input; end of input terminates the session.
    fn key(&mut self) -> Result<u8> {
        self.io()
            .read_char()
            .ok_or(Exception::UnexpectedEndOfFile)
    }

    /// Run-time: ( -- char )
    fn p_key(&mut self) -> Result {
        let ch = self.key()?;
        self.push(ch as Cell)
    }

    /// Run-time: ( char -- )
    fn emit(&mut self) -> Result {
        let v = self.pop()?;
        self.io().write_char(v as u8)
    }

    /// Run-time: ( c-addr u -- )
    ///
    /// Write u bytes of data space to the output.
    fn tell(&mut self) -> Result {
        let len = self.pop_addr()?;
        let addr = self.pop_addr()?;
        for i in 0..len {
            let ch = self.data_space_const().get_u8(addr + i)?;
            self.io().write_char(ch)?;
        }
        Ok(())
    }

    /// Parse one whitespace-delimited word into the WORD buffer and
    /// return its length. Bytes <= 0x20 delimit; `\` starts a comment
    /// running to the next newline.
    fn parse_word(&mut self) -> Result<usize> {
        loop {
            let ch = self.key()?;
            if ch == b'\\' {
                while self.key()? != b'\n' {}
            } else if ch > 0x20 {
                self.io().unread_char(ch);
                break;
            }
        }
        let mut len = 0;
        while let Some(ch) = self.io().read_char() {
            if ch <= 0x20 {
                break;
            }
            if len >= WORD_BUFFER_SIZE {
                return Err(Exception::ParsedStringOverflow);
            }
            self.data_space().put_u8(WORD_BUFFER + len, ch)?;
            len += 1;
        }
        Ok(len)
    }

    /// Run-time: ( -- c-addr u )
    fn p_word(&mut self) -> Result {
        let len = self.parse_word()?;
        self.push(WORD_BUFFER as Cell)?;
        self.push(len as Cell)
    }

    /// Run-time: ( "<spaces>name" -- char )
    ///
    /// Parse the next word and push its first byte.
    fn p_char(&mut self) -> Result {
        self.parse_word()?;
        let ch = self.data_space_const().get_u8(WORD_BUFFER)?;
        self.push(ch as Cell)
    }

    /// Parse the `len` bytes at `addr` as a number in the current BASE.
    /// Returns the accumulated value and the count of unparsed bytes;
    /// zero unparsed means success, and empty input is `(0, 0)`.
    fn parse_number(&self, addr: usize, len: usize) -> Result<(Cell, Cell)> {
        let base = self.base()?;
        let bytes = self.data_space_const().slice(addr, len)?;
        let (rest, sign) = parser::sign(bytes);
        let (rest, magnitude) = parser::digits_in_base(rest, base);
        let unparsed = rest.len() as Cell;
        let value = if sign < 0 {
            magnitude.wrapping_neg()
        } else {
            magnitude
        };
        Ok((value, unparsed))
    }

    /// Run-time: ( c-addr u -- n unparsed )
    fn p_number(&mut self) -> Result {
        let len = self.pop_addr()?;
        let addr = self.pop_addr()?;
        let (value, unparsed) = self.parse_number(addr, len)?;
        self.push(value)?;
        self.push(unparsed)
    }

    // Outer interpreter.

    /// One interpreter step: parse a word, look it up, and execute or
    /// compile it; unknown words fall back to number parsing.
    fn interpret(&mut self) -> Result {
        let len = self.parse_word()?;
        self.remember_token(len)?;
        match self.find_in_dict(WORD_BUFFER, len)? {
            Some(entry) => {
                let flags = self.data_space_const().get_u8(entry + FLAGS_OFFSET)?;
                let cfa = self.cfa_of(entry)?;
                if flags & F_IMMED != 0 || self.state()? == 0 {
                    self.execute_cfa(cfa)
                } else {
                    self.compile_cell(cfa as Cell)
                }
            }
            None => {
                let (value, unparsed) = self.parse_number(WORD_BUFFER, len)?;
                if unparsed != 0 {
                    return Err(Exception::UndefinedWord);
                }
                if self.state()? != 0 {
                    let lit = self.references().cfa_lit;
                    self.compile_cell(lit)?;
                    self.compile_cell(value)
                } else {
                    self.push(value)
                }
            }
        }
    }

    fn remember_token(&mut self, len: usize) -> Result {
        let bytes = self.data_space_const().slice(WORD_BUFFER, len)?.to_vec();
        let token = self.last_token();
        token.clear();
        token.extend_from_slice(&bytes);
        Ok(())
    }

    // Bootstrap.

    /// Populate the dictionary: one entry per primitive opcode, then the
    /// compound words the prelude needs to exist before it can load.
    fn add_core(&mut self) -> Result {
        self.defcode("EXIT", Op::Exit, 0)?;
        self.defcode("LIT", Op::Lit, 0)?;
        self.defcode("LITSTRING", Op::LitString, 0)?;
        self.defcode("BRANCH", Op::Branch, 0)?;
        self.defcode("0BRANCH", Op::ZeroBranch, 0)?;
        self.defcode("DROP", Op::Drop, 0)?;
        self.defcode("SWAP", Op::Swap, 0)?;
        self.defcode("DUP", Op::Dup, 0)?;
        self.defcode("OVER", Op::Over, 0)?;
        self.defcode("ROT", Op::Rot, 0)?;
        self.defcode("-ROT", Op::MinusRot, 0)?;
        self.defcode("2DROP", Op::TwoDrop, 0)?;
        self.defcode("2DUP", Op::TwoDup, 0)?;
        self.defcode("2SWAP", Op::TwoSwap, 0)?;
        self.defcode("?DUP", Op::QuestionDup, 0)?;
        self.defcode("1+", Op::OnePlus, 0)?;
        self.defcode("1-", Op::OneMinus, 0)?;
        self.defcode("4+", Op::FourPlus, 0)?;
        self.defcode("4-", Op::FourMinus, 0)?;
        self.defcode("+", Op::Plus, 0)?;
        self.defcode("-", Op::Minus, 0)?;
        self.defcode("*", Op::Star, 0)?;
        self.defcode("/MOD", Op::SlashMod, 0)?;
        self.defcode("=", Op::Equals, 0)?;
        self.defcode("<>", Op::NotEquals, 0)?;
        self.defcode("<", Op::LessThan, 0)?;
        self.defcode(">", Op::GreaterThan, 0)?;
        self.defcode("<=", Op::LessEquals, 0)?;
        self.defcode(">=", Op::GreaterEquals, 0)?;
        self.defcode("0=", Op::ZeroEquals, 0)?;
        self.defcode("0<>", Op::ZeroNotEquals, 0)?;
        self.defcode("0<", Op::ZeroLess, 0)?;
        self.defcode("0>", Op::ZeroGreater, 0)?;
        self.defcode("0<=", Op::ZeroLessEquals, 0)?;
        self.defcode("0>=", Op::ZeroGreaterEquals, 0)?;
        self.defcode("AND", Op::And, 0)?;
        self.defcode("OR", Op::Or, 0)?;
        self.defcode("XOR", Op::Xor, 0)?;
        self.defcode("INVERT", Op::Invert, 0)?;
        self.defcode("!", Op::Store, 0)?;
        self.defcode("@", Op::Fetch, 0)?;
        self.defcode("+!", Op::PlusStore, 0)?;
        self.defcode("-!", Op::MinusStore, 0)?;
        self.defcode("C!", Op::CStore, 0)?;
        self.defcode("C@", Op::CFetch, 0)?;
        self.defcode("C@C!", Op::CCopy, 0)?;
        self.defcode("CMOVE", Op::CMove, 0)?;
        self.defcode(">R", Op::ToR, 0)?;
        self.defcode("R>", Op::RFrom, 0)?;
        self.defcode("RSP@", Op::RspFetch, 0)?;
        self.defcode("RSP!", Op::RspStore, 0)?;
        self.defcode("RDROP", Op::RDrop, 0)?;
        self.defcode("DSP@", Op::DspFetch, 0)?;
        self.defcode("DSP!", Op::DspStore, 0)?;
        self.defcode("STATE", Op::State, 0)?;
        self.defcode("HERE", Op::Here, 0)?;
        self.defcode("LATEST", Op::Latest, 0)?;
        self.defcode("S0", Op::SZero, 0)?;
        self.defcode("BASE", Op::Base, 0)?;
        self.defcode("VERSION", Op::Version, 0)?;
        self.defcode("R0", Op::RZero, 0)?;
        self.defcode("DOCOL", Op::DocolId, 0)?;
        self.defcode("F_IMMED", Op::FImmed, 0)?;
        self.defcode("F_HIDDEN", Op::FHidden, 0)?;
        self.defcode("F_LENMASK", Op::FLenmask, 0)?;
        self.defcode("KEY", Op::Key, 0)?;
        self.defcode("EMIT", Op::Emit, 0)?;
        self.defcode("WORD", Op::Word, 0)?;
        self.defcode("NUMBER", Op::Number, 0)?;
        self.defcode("TELL", Op::Tell, 0)?;
        self.defcode("FIND", Op::Find, 0)?;
        self.defcode(">CFA", Op::ToCfa, 0)?;
        self.defcode("CREATE", Op::Create, 0)?;
        self.defcode(",", Op::Comma, 0)?;
        self.defcode("[", Op::LeftBracket, F_IMMED)?;
        self.defcode("]", Op::RightBracket, 0)?;
        self.defcode("IMMEDIATE", Op::Immediate, F_IMMED)?;
        self.defcode("HIDDEN", Op::Hidden, 0)?;
        self.defcode("'", Op::Tick, 0)?;
        self.defcode("CHAR", Op::Char, 0)?;
        self.defcode("EXECUTE", Op::Execute, 0)?;
        self.defcode("INTERPRET", Op::Interpret, 0)?;
        self.defcode("BYE", Op::Bye, 0)?;
        self.defcode("UNUSED", Op::Unused, 0)?;

        let exit = self.cfa_named("EXIT")? as Cell;
        let lit = self.cfa_named("LIT")? as Cell;
        let branch = self.cfa_named("BRANCH")? as Cell;
        let word = self.cfa_named("WORD")? as Cell;
        let find = self.cfa_named("FIND")? as Cell;
        let to_cfa = self.cfa_named(">CFA")? as Cell;
        let create = self.cfa_named("CREATE")? as Cell;
        let comma = self.cfa_named(",")? as Cell;
        let lbrac = self.cfa_named("[")? as Cell;
        let rbrac = self.cfa_named("]")? as Cell;
        let hidden = self.cfa_named("HIDDEN")? as Cell;
        let latest = self.cfa_named("LATEST")? as Cell;
        let fetch = self.cfa_named("@")? as Cell;
        let four_plus = self.cfa_named("4+")? as Cell;
        let r_zero = self.cfa_named("R0")? as Cell;
        let rsp_store = self.cfa_named("RSP!")? as Cell;
        let interpret = self.cfa_named("INTERPRET")? as Cell;

        self.defword(
            ":",
            0,
            &[
                word,
                create,
                lit,
                Op::Docol as Cell,
                comma,
                latest,
                fetch,
                hidden,
                rbrac,
                exit,
            ],
        )?;
        self.defword(
            ";",
            F_IMMED,
            &[lit, exit, comma, latest, fetch, hidden, lbrac, exit],
        )?;
        self.defword(">DFA", 0, &[to_cfa, four_plus, exit])?;
        self.defword("HIDE", 0, &[word, find, hidden, exit])?;
        self.defword("QUIT", 0, &[r_zero, rsp_store, interpret, branch, -8])?;

        self.references_mut().cfa_lit = lit;
        self.references_mut().cfa_quit = self.cfa_named("QUIT")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::core::Core;
    use crate::dict::Dict;
    use crate::exception::Exception;
    use crate::io::BufferIo;
    use crate::memory::{Memory, ADDR_BASE, ADDR_STATE, WORD_BUFFER};
    use crate::vm::{Config, VM};

    use super::Interp;

    fn vm_with(input: &str) -> VM<BufferIo> {
        VM::with_io(Config::default(), BufferIo::new(input))
    }

    /// Run INTERPRET until the input is exhausted.
    fn feed(vm: &mut VM<BufferIo>) {
        loop {
            match vm.interpret() {
                Ok(()) => {}
                Err(Exception::UnexpectedEndOfFile) => break,
                Err(e) => panic!("{:?} at {:?}", e, vm.last_token_string()),
            }
        }
    }

    #[test]
    fn test_parse_word() {
        let vm = &mut vm_with("  DUP\n");
        let len = vm.parse_word().unwrap();
        assert_eq!(len, 3);
        assert_eq!(
            vm.data_space_const().slice(WORD_BUFFER, 3).unwrap(),
            b"DUP"
        );
    }

    #[test]
    fn test_parse_word_skips_comments() {
        let vm = &mut vm_with("\\ all of this is noise\n  42");
        let len = vm.parse_word().unwrap();
        assert_eq!(
            vm.data_space_const().slice(WORD_BUFFER, len).unwrap(),
            b"42"
        );
    }

    #[test]
    fn test_parse_word_any_low_byte_delimits() {
        let vm = &mut vm_with("A\tB\x01C D");
        assert_eq!(vm.parse_word().unwrap(), 1);
        assert_eq!(vm.parse_word().unwrap(), 1);
        assert_eq!(vm.parse_word().unwrap(), 1);
        let len = vm.parse_word().unwrap();
        assert_eq!(
            vm.data_space_const().slice(WORD_BUFFER, len).unwrap(),
            b"D"
        );
    }

    #[test]
    fn test_parse_word_overflow() {
        let long = "X".repeat(33);
        let vm = &mut vm_with(&long);
        assert_eq!(vm.parse_word(), Err(Exception::ParsedStringOverflow));
    }

    #[test]
    fn test_parse_word_eof_while_skipping() {
        let vm = &mut vm_with("   ");
        assert_eq!(vm.parse_word(), Err(Exception::UnexpectedEndOfFile));
    }

    #[test]
    fn test_number_decimal() {
        let vm = &mut vm_with("");
        for (i, b) in b"-421".iter().enumerate() {
            vm.data_space().put_u8(WORD_BUFFER + i, *b).unwrap();
        }
        assert_eq!(vm.parse_number(WORD_BUFFER, 4).unwrap(), (-421, 0));
    }

    #[test]
    fn test_number_respects_base() {
        let vm = &mut vm_with("");
        vm.data_space().put_i32(ADDR_BASE, 16).unwrap();
        for (i, b) in b"FF".iter().enumerate() {
            vm.data_space().put_u8(WORD_BUFFER + i, *b).unwrap();
        }
        assert_eq!(vm.parse_number(WORD_BUFFER, 2).unwrap(), (255, 0));
        vm.data_space().put_i32(ADDR_BASE, 10).unwrap();
        assert_eq!(vm.parse_number(WORD_BUFFER, 2).unwrap(), (0, 2));
    }

    #[test]
    fn test_number_empty_input() {
        let vm = &mut vm_with("");
        assert_eq!(vm.parse_number(WORD_BUFFER, 0).unwrap(), (0, 0));
    }

    #[test]
    fn test_execute_cfa_primitive() {
        let vm = &mut vm_with("");
        vm.push(1).unwrap();
        vm.push(2).unwrap();
        let cfa = vm.cfa_named("DROP").unwrap();
        vm.execute_cfa(cfa).unwrap();
        assert_eq!(vm.pop(), Ok(1));
    }

    #[test]
    fn test_invalid_opcode_traps() {
        let vm = &mut vm_with("");
        // A freshly compiled cell of zeroes is not a valid codeword.
        let here = vm.here().unwrap();
        vm.compile_cell(0).unwrap();
        assert_eq!(vm.execute_cfa(here), Err(Exception::InvalidOpcode));
    }

    #[test]
    fn test_docol_threads_and_exits() {
        let vm = &mut vm_with("");
        let lit = vm.cfa_named("LIT").unwrap() as i32;
        let plus = vm.cfa_named("+").unwrap() as i32;
        let exit = vm.cfa_named("EXIT").unwrap() as i32;
        vm.defword("SEVEN", 0, &[lit, 3, lit, 4, plus, exit]).unwrap();
        let cfa = vm.cfa_named("SEVEN").unwrap();
        vm.execute_cfa(cfa).unwrap();
        assert_eq!(vm.pop(), Ok(7));
        // the activation unwound its return-stack frame
        assert_eq!(vm.regs_const().rsp, vm.return_stack_const().len());
    }

    #[test]
    fn test_nested_docol() {
        let vm = &mut vm_with("");
        let lit = vm.cfa_named("LIT").unwrap() as i32;
        let plus = vm.cfa_named("+").unwrap() as i32;
        let exit = vm.cfa_named("EXIT").unwrap() as i32;
        vm.defword("THREE", 0, &[lit, 3, exit]).unwrap();
        let three = vm.cfa_named("THREE").unwrap() as i32;
        vm.defword("SIX", 0, &[three, three, plus, exit]).unwrap();
        let cfa = vm.cfa_named("SIX").unwrap();
        vm.execute_cfa(cfa).unwrap();
        assert_eq!(vm.pop(), Ok(6));
    }

    #[test]
    fn test_interpret_pushes_number() {
        let vm = &mut vm_with("42 ");
        vm.interpret().unwrap();
        assert_eq!(vm.pop(), Ok(42));
    }

    #[test]
    fn test_interpret_undefined_word() {
        let vm = &mut vm_with("21CANDLES ");
        assert_eq!(vm.interpret(), Err(Exception::UndefinedWord));
        assert_eq!(vm.last_token_string(), "21CANDLES");
    }

    #[test]
    fn test_interpret_executes_word() {
        let vm = &mut vm_with("1 2 SWAP ");
        feed(vm);
        assert_eq!(vm.pop(), Ok(1));
        assert_eq!(vm.pop(), Ok(2));
    }

    #[test]
    fn test_colon_compiles_and_runs() {
        let vm = &mut vm_with(": DOUBLE DUP + ; 21 DOUBLE ");
        feed(vm);
        assert_eq!(vm.pop(), Ok(42));
    }

    #[test]
    fn test_word_is_hidden_while_being_defined() {
        let vm = &mut vm_with(": NOTHING ");
        feed(vm);
        assert_eq!(vm.data_space_const().get_i32(ADDR_STATE).unwrap(), 1);
        assert!(vm.find_named("NOTHING").unwrap().is_none());
    }

    #[test]
    fn test_emit_writes_bytes() {
        let vm = &mut vm_with("52 EMIT 50 EMIT ");
        feed(vm);
        assert_eq!(vm.io_ref().output_string(), "42");
    }

    #[test]
    fn test_tick_and_execute() {
        let vm = &mut vm_with(": RUN-IT ' DUP EXECUTE ; 9 RUN-IT ");
        feed(vm);
        assert_eq!(vm.pop(), Ok(9));
        assert_eq!(vm.pop(), Ok(9));
    }

    #[test]
    fn test_char_pushes_first_byte() {
        let vm = &mut vm_with("CHAR Hello ");
        feed(vm);
        assert_eq!(vm.pop(), Ok(b'H' as i32));
    }
}
