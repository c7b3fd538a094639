//! The primitive opcode enumeration.
//!
//! Every code field in the dictionary holds one of these values (for a
//! compound word, `Op::Docol`). Opcode 0 is deliberately absent: zeroed
//! memory read as a code field must trap as an invalid opcode rather
//! than execute anything.

use crate::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Op {
    // Threading
    Docol = 1,
    Exit = 2,
    Lit = 3,
    LitString = 4,
    Branch = 5,
    ZeroBranch = 6,
    // Stack shuffling
    Drop = 7,
    Swap = 8,
    Dup = 9,
    Over = 10,
    Rot = 11,
    MinusRot = 12,
    TwoDrop = 13,
    TwoDup = 14,
    TwoSwap = 15,
    QuestionDup = 16,
    // Arithmetic
    OnePlus = 17,
    OneMinus = 18,
    FourPlus = 19,
    FourMinus = 20,
    Plus = 21,
    Minus = 22,
    Star = 23,
    SlashMod = 24,
    // Comparison
    Equals = 25,
    NotEquals = 26,
    LessThan = 27,
    GreaterThan = 28,
    LessEquals = 29,
    GreaterEquals = 30,
    ZeroEquals = 31,
    ZeroNotEquals = 32,
    ZeroLess = 33,
    ZeroGreater = 34,
    ZeroLessEquals = 35,
    ZeroGreaterEquals = 36,
    // Bitwise
    And = 37,
    Or = 38,
    Xor = 39,
    Invert = 40,
    // Memory
    Store = 41,
    Fetch = 42,
    PlusStore = 43,
    MinusStore = 44,
    CStore = 45,
    CFetch = 46,
    CCopy = 47,
    CMove = 48,
    // Return stack transfer
    ToR = 49,
    RFrom = 50,
    RspFetch = 51,
    RspStore = 52,
    RDrop = 53,
    DspFetch = 54,
    DspStore = 55,
    // Variables and constants
    State = 56,
    Here = 57,
    Latest = 58,
    SZero = 59,
    Base = 60,
    Version = 61,
    RZero = 62,
    DocolId = 63,
    FImmed = 64,
    FHidden = 65,
    FLenmask = 66,
    // Host I/O and parsing
    Key = 67,
    Emit = 68,
    Word = 69,
    Number = 70,
    Tell = 71,
    // Dictionary
    Find = 72,
    ToCfa = 73,
    Create = 74,
    Comma = 75,
    LeftBracket = 76,
    RightBracket = 77,
    Immediate = 78,
    Hidden = 79,
    Tick = 80,
    Char = 81,
    Execute = 82,
    Interpret = 83,
    // Process
    Bye = 84,
    Unused = 85,
}

impl Op {
    /// Decode a code-field cell. Returns `None` for 0 (the trap slot for
    /// reads from uninitialized memory) and for anything else outside
    /// the enumeration.
    pub const fn from_cell(v: Cell) -> Option<Op> {
        match v {
            1 => Some(Op::Docol),
            2 => Some(Op::Exit),
            3 => Some(Op::Lit),
            4 => Some(Op::LitString),
            5 => Some(Op::Branch),
            6 => Some(Op::ZeroBranch),
            7 => Some(Op::Drop),
            8 => Some(Op::Swap),
            9 => Some(Op::Dup),
            10 => Some(Op::Over),
            11 => Some(Op::Rot),
            12 => Some(Op::MinusRot),
            13 => Some(Op::TwoDrop),
            14 => Some(Op::TwoDup),
            15 => Some(Op::TwoSwap),
            16 => Some(Op::QuestionDup),
            17 => Some(Op::OnePlus),
            18 => Some(Op::OneMinus),
            19 => Some(Op::FourPlus),
            20 => Some(Op::FourMinus),
            21 => Some(Op::Plus),
            22 => Some(Op::Minus),
            23 => Some(Op::Star),
            24 => Some(Op::SlashMod),
            25 => Some(Op::Equals),
            26 => Some(Op::NotEquals),
            27 => Some(Op::LessThan),
            28 => Some(Op::GreaterThan),
            29 => Some(Op::LessEquals),
            30 => Some(Op::GreaterEquals),
            31 => Some(Op::ZeroEquals),
            32 => Some(Op::ZeroNotEquals),
            33 => Some(Op::ZeroLess),
            34 => Some(Op::ZeroGreater),
            35 => Some(Op::ZeroLessEquals),
            36 => Some(Op::ZeroGreaterEquals),
            37 => Some(Op::And),
            38 => Some(Op::Or),
            39 => Some(Op::Xor),
            40 => Some(Op::Invert),
            41 => Some(Op::Store),
            42 => Some(Op::Fetch),
            43 => Some(Op::PlusStore),
            44 => Some(Op::MinusStore),
            45 => Some(Op::CStore),
            46 => Some(Op::CFetch),
            47 => Some(Op::CCopy),
            48 => Some(Op::CMove),
            49 => Some(Op::ToR),
            50 => Some(Op::RFrom),
            51 => Some(Op::RspFetch),
            52 => Some(Op::RspStore),
            53 => Some(Op::RDrop),
            54 => Some(Op::DspFetch),
            55 => Some(Op::DspStore),
            56 => Some(Op::State),
            57 => Some(Op::Here),
            58 => Some(Op::Latest),
            59 => Some(Op::SZero),
            60 => Some(Op::Base),
            61 => Some(Op::Version),
            62 => Some(Op::RZero),
            63 => Some(Op::DocolId),
            64 => Some(Op::FImmed),
            65 => Some(Op::FHidden),
            66 => Some(Op::FLenmask),
            67 => Some(Op::Key),
            68 => Some(Op::Emit),
            69 => Some(Op::Word),
            70 => Some(Op::Number),
            71 => Some(Op::Tell),
            72 => Some(Op::Find),
            73 => Some(Op::ToCfa),
            74 => Some(Op::Create),
            75 => Some(Op::Comma),
            76 => Some(Op::LeftBracket),
            77 => Some(Op::RightBracket),
            78 => Some(Op::Immediate),
            79 => Some(Op::Hidden),
            80 => Some(Op::Tick),
            81 => Some(Op::Char),
            82 => Some(Op::Execute),
            83 => Some(Op::Interpret),
            84 => Some(Op::Bye),
            85 => Some(Op::Unused),
            _ => None,
        }
    }

    /// Dictionary spelling of the primitive.
    pub const fn forth_name(self) -> &'static str {
        match self {
            Op::Docol => "(DOCOL)",
            Op::Exit => "EXIT",
            Op::Lit => "LIT",
            Op::LitString => "LITSTRING",
            Op::Branch => "BRANCH",
            Op::ZeroBranch => "0BRANCH",
            Op::Drop => "DROP",
            Op::Swap => "SWAP",
            Op::Dup => "DUP",
            Op::Over => "OVER",
            Op::Rot => "ROT",
            Op::MinusRot => "-ROT",
            Op::TwoDrop => "2DROP",
            Op::TwoDup => "2DUP",
            Op::TwoSwap => "2SWAP",
            Op::QuestionDup => "?DUP",
            Op::OnePlus => "1+",
            Op::OneMinus => "1-",
            Op::FourPlus => "4+",
            Op::FourMinus => "4-",
            Op::Plus => "+",
            Op::Minus => "-",
            Op::Star => "*",
            Op::SlashMod => "/MOD",
            Op::Equals => "=",
            Op::NotEquals => "<>",
            Op::LessThan => "<",
            Op::GreaterThan => ">",
            Op::LessEquals => "<=",
            Op::GreaterEquals => ">=",
            Op::ZeroEquals => "0=",
            Op::ZeroNotEquals => "0<>",
            Op::ZeroLess => "0<",
            Op::ZeroGreater => "0>",
            Op::ZeroLessEquals => "0<=",
            Op::ZeroGreaterEquals => "0>=",
            Op::And => "AND",
            Op::Or => "OR",
            Op::Xor => "XOR",
            Op::Invert => "INVERT",
            Op::Store => "!",
            Op::Fetch => "@",
            Op::PlusStore => "+!",
            Op::MinusStore => "-!",
            Op::CStore => "C!",
            Op::CFetch => "C@",
            Op::CCopy => "C@C!",
            Op::CMove => "CMOVE",
            Op::ToR => ">R",
            Op::RFrom => "R>",
            Op::RspFetch => "RSP@",
            Op::RspStore => "RSP!",
            Op::RDrop => "RDROP",
            Op::DspFetch => "DSP@",
            Op::DspStore => "DSP!",
            Op::State => "STATE",
            Op::Here => "HERE",
            Op::Latest => "LATEST",
            Op::SZero => "S0",
            Op::Base => "BASE",
            Op::Version => "VERSION",
            Op::RZero => "R0",
            Op::DocolId => "DOCOL",
            Op::FImmed => "F_IMMED",
            Op::FHidden => "F_HIDDEN",
            Op::FLenmask => "F_LENMASK",
            Op::Key => "KEY",
            Op::Emit => "EMIT",
            Op::Word => "WORD",
            Op::Number => "NUMBER",
            Op::Tell => "TELL",
            Op::Find => "FIND",
            Op::ToCfa => ">CFA",
            Op::Create => "CREATE",
            Op::Comma => ",",
            Op::LeftBracket => "[",
            Op::RightBracket => "]",
            Op::Immediate => "IMMEDIATE",
            Op::Hidden => "HIDDEN",
            Op::Tick => "'",
            Op::Char => "CHAR",
            Op::Execute => "EXECUTE",
            Op::Interpret => "INTERPRET",
            Op::Bye => "BYE",
            Op::Unused => "UNUSED",
        }
    }
}
