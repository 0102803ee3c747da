use dsm::{Machine, Program, StepOutcome};

pub fn display_instruction(program: &Program, pc: usize) {
    match program.instructions().get(pc) {
        Some(instr) => {
            let mem_addr = format!(colorify!(blue: "{:>#06x}"), pc);
            let name = format!(colorify!(green: "{}"), instr);
            println!("{} {}: {}", colorify!(red: "pc"), mem_addr, name);
        }
        None => println!("{} {:#06x}: <out of bounds>", colorify!(red: "pc"), pc),
    }
}

pub fn display_step_outcome(outcome: StepOutcome) {
    match outcome {
        StepOutcome::Continue => {}
        StepOutcome::Halted => println!("{}", colorify!(yellow: "machine halted")),
    }
}

pub fn display_stack(machine: &Machine) {
    let values = machine.stack_strings();
    if values.is_empty() {
        println!("stack: {}", colorify!(dark_grey: "(empty)"));
    } else {
        println!("stack: [{}]", values.join(", "));
    }
}

pub fn display_vars(program: &Program, machine: &Machine) {
    for name in program.variables() {
        let value = machine.get(name).expect("name came from this program");
        println!("  {} = {}", format!(colorify!(green: "{}"), name), value);
    }
}
