//! Run a DSMAL program from a file or literal and print the resulting
//! variable bank, modeled on the teacher's `examples/execute.rs`.

use std::collections::HashMap;
use std::process::ExitCode;
use std::sync::Arc;
use std::{env, fs};

use dsm::{Machine, Program, VarInput};

fn usage() -> ! {
    eprintln!(
        "usage: dsmrun [--limit N] [name=value ...] (--source DSMAL | FILE)"
    );
    std::process::exit(2);
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let mut args = env::args().skip(1).peekable();
    let mut limit: Option<usize> = None;
    let mut source: Option<String> = None;
    let mut file: Option<String> = None;
    let mut baseline = HashMap::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--limit" => {
                let value = args.next().unwrap_or_else(|| usage());
                limit = Some(value.parse().unwrap_or_else(|_| usage()));
            }
            "--source" => {
                source = Some(args.next().unwrap_or_else(|| usage()));
            }
            _ if arg.contains('=') => {
                let (name, value) = arg.split_once('=').expect("contains '=' was just checked");
                baseline.insert(name.to_string(), VarInput::Str(value.to_string()));
            }
            _ => file = Some(arg),
        }
    }

    let text = match (source, file) {
        (Some(text), _) => text,
        (None, Some(path)) => match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                eprintln!("dsmrun: failed to read {path:?}: {err}");
                return ExitCode::FAILURE;
            }
        },
        (None, None) => usage(),
    };

    let program = match Program::parse(text.trim_end()) {
        Ok(program) => Arc::new(program),
        Err(err) => {
            eprintln!("dsmrun: failed to parse program: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut machine = match Machine::new(Arc::clone(&program), &baseline) {
        Ok(machine) => machine,
        Err(err) => {
            eprintln!("dsmrun: failed to initialize machine: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(limit) = limit {
        machine.set_instruction_limit(limit);
    }

    match machine.run() {
        Ok(executed) => {
            println!("executed {executed} instructions");
            for name in program.variables() {
                let value = machine.get(name).expect("name came from this program");
                println!("{name} = {value}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("dsmrun: {err}");
            ExitCode::FAILURE
        }
    }
}
