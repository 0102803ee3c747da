//! Interactive single-stepping debugger for DSMAL programs, modeled on
//! the teacher's `src/bin/reustmann` debugger.

#[macro_use]
extern crate colorify;

mod command;
mod display;

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use dsm::{Machine, Program, VarInput};

use command::Command;

struct Session {
    program: Arc<Program>,
    machine: Machine,
}

impl Session {
    fn load(path: &str) -> Result<Session, String> {
        let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
        let program = Arc::new(Program::parse(text.trim_end()).map_err(|e| e.to_string())?);
        let machine =
            Machine::new(Arc::clone(&program), &HashMap::new()).map_err(|e| e.to_string())?;
        Ok(Session { program, machine })
    }

    fn reset(&mut self) {
        self.machine.reset(&HashMap::new()).expect("reset never references unknown names");
        self.machine.begin_run();
    }

    fn step(&mut self, count: usize) {
        for _ in 0..count {
            display::display_instruction(&self.program, self.machine.pc());
            match self.machine.step() {
                Ok(outcome) => {
                    display::display_step_outcome(outcome);
                    if outcome == dsm::StepOutcome::Halted {
                        break;
                    }
                }
                Err(err) => {
                    printlnc!(red: "{}", err);
                    break;
                }
            }
        }
        display::display_stack(&self.machine);
    }

    fn run(&mut self) {
        self.machine.begin_run();
        match self.machine.run() {
            Ok(executed) => printlnc!(green: "ran to completion in {} instructions", executed),
            Err(err) => printlnc!(red: "{}", err),
        }
        display::display_vars(&self.program, &self.machine);
    }
}

fn main() {
    let mut rustyline = DefaultEditor::new().expect("failed to initialize line editor");
    if rustyline.load_history("history.txt").is_err() {
        printlnc!(yellow: "No previous history.");
    }

    let mut session: Option<Session> = std::env::args()
        .nth(1)
        .map(|path| Session::load(&path))
        .transpose()
        .unwrap_or_else(|e| {
            printlnc!(red: "{}", e);
            None
        });

    let mut last_command = None;

    loop {
        let prompt = format!(colorify!(dark_grey: "({}) "), "dsmdbg");
        let readline = rustyline.readline(&prompt);
        match readline {
            Ok(line) => {
                let _ = rustyline.add_history_entry(line.as_str());

                let command = match (line.parse(), last_command.clone()) {
                    (Ok(Command::Repeat), Some(c)) => Ok(c),
                    (Ok(Command::Repeat), None) => Err("No last command.".into()),
                    (Ok(c), _) => Ok(c),
                    (Err(e), _) => Err(e),
                };

                match &command {
                    Ok(Command::Exit) => break,
                    Ok(Command::Repeat) => unreachable!(),
                    Ok(Command::Load(path)) => match Session::load(path) {
                        Ok(loaded) => session = Some(loaded),
                        Err(e) => printlnc!(red: "{}", e),
                    },
                    Ok(other) => match session.as_mut() {
                        Some(session) => run_command(session, other),
                        None => printlnc!(red: "no program loaded; use 'load <file>'"),
                    },
                    Err(e) => printlnc!(red: "{}", e),
                }
                last_command = command.ok();
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {err:?}");
                break;
            }
        }
    }
    let _ = rustyline.save_history("history.txt");
}

fn run_command(session: &mut Session, command: &Command) {
    match command {
        Command::Reset => session.reset(),
        Command::Step(count) => session.step(*count),
        Command::Run => session.run(),
        Command::Stack => display::display_stack(&session.machine),
        Command::Vars => display::display_vars(&session.program, &session.machine),
        Command::Load(_) | Command::Repeat | Command::Exit => unreachable!(),
    }
}
