use std::process;

use clap::Parser;
use forth32::{Config, Exception, VM};

/// A hosted 32-bit FORTH virtual machine. Reads words from stdin and
/// writes to stdout; load the prelude by concatenation:
/// `cat system.forth - | forth32`
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Data-space size in bytes
    #[arg(long, default_value_t = 65536)]
    data_size: usize,

    /// Return-stack size in bytes
    #[arg(long, default_value_t = 4096)]
    return_stack_size: usize,

    /// Log one line per dispatched opcode (at trace level)
    #[arg(long)]
    trace: bool,
}

fn main() {
    let args = Args::parse();
    let mut builder = env_logger::Builder::from_default_env();
    if args.trace {
        builder.filter_level(log::LevelFilter::Trace);
    }
    builder.init();

    let mut vm = VM::new(Config {
        data_size: args.data_size,
        return_stack_size: args.return_stack_size,
        trace: args.trace,
    });
    if let Err(e) = vm.run() {
        let token = vm.last_token_string();
        if e == Exception::UndefinedWord && !token.is_empty() {
            eprintln!("forth32: {}: {}", e, token);
        } else {
            eprintln!("forth32: {}", e);
        }
        process::exit(1);
    }
}
