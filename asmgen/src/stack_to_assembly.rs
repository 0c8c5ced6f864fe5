use tiercc_asm::{Instruction, Operand, Register};
use tiercc_stack::{self as stack, Line};

/// Rewrites one line of stack code. Blank lines vanish, lines that are not
/// stack code are copied through.
pub fn cg_line(line: &str) -> Vec<Instruction> {
    match line.parse::<Line>() {
        Ok(Line::Blank) => vec![],
        Ok(Line::FuncStart(name)) => prologue(name),
        Ok(Line::FuncEnd) => epilogue(),
        Ok(Line::Instruction(instruction)) => cg_instruction(instruction),
        Err(_) => vec![Instruction::Raw(line.trim().to_owned())],
    }
}

fn prologue(name: String) -> Vec<Instruction> {
    vec![
        Instruction::Label(name),
        Instruction::Push(Register::FP),
        Instruction::Mov {
            dst: Register::FP,
            src: Operand::Register(Register::SP),
        },
    ]
}

fn epilogue() -> Vec<Instruction> {
    vec![
        Instruction::Mov {
            dst: Register::SP,
            src: Operand::Register(Register::FP),
        },
        Instruction::Pop(Register::FP),
        Instruction::Ret,
    ]
}

pub fn cg_instruction(instruction: stack::Instruction) -> Vec<Instruction> {
    match instruction {
        stack::Instruction::Push(value) => vec![
            Instruction::Mov {
                dst: Register::R1,
                src: Operand::Imm(value),
            },
            Instruction::Push(Register::R1),
        ],
        stack::Instruction::Load(address) => vec![
            Instruction::Load {
                dst: Register::R1,
                address,
            },
            Instruction::Push(Register::R1),
        ],
        stack::Instruction::Store(address) => vec![
            Instruction::Pop(Register::R1),
            Instruction::Store {
                address,
                src: Register::R1,
            },
        ],
        // rhs is on top of the stack
        stack::Instruction::Binary(op) => vec![
            Instruction::Pop(Register::R3),
            Instruction::Pop(Register::R2),
            Instruction::Binary {
                op: op.into(),
                dst: Register::R1,
                lhs: Register::R2,
                rhs: Register::R3,
            },
            Instruction::Push(Register::R1),
        ],
        stack::Instruction::Unary(op) => vec![
            Instruction::Pop(Register::R2),
            Instruction::Unary {
                op: op.into(),
                dst: Register::R1,
                src: Register::R2,
            },
            Instruction::Push(Register::R1),
        ],
        stack::Instruction::Call(name) => {
            vec![Instruction::Call(name), Instruction::Push(Register::R1)]
        }
        stack::Instruction::Pop => vec![Instruction::Pop(Register::R1)],
        stack::Instruction::Ret => {
            let mut instructions = vec![Instruction::Pop(Register::R1)];
            instructions.append(&mut epilogue());
            instructions
        }
        stack::Instruction::Ret0 => epilogue(),
        stack::Instruction::Jz(label) => vec![
            Instruction::Pop(Register::R1),
            Instruction::Cmp(Register::R1, Operand::Imm("0".to_owned())),
            Instruction::Je(label),
        ],
        stack::Instruction::Jmp(label) => vec![Instruction::Jmp(label)],
        stack::Instruction::Label(label) => vec![Instruction::Label(label)],
    }
}
