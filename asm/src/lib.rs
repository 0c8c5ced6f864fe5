#[cfg(feature = "stack")]
pub mod stack;

use std::fmt::Display;

/// Listing of pseudo-assembly, functions are delimited by their labels.
#[derive(Debug, PartialEq, Eq, Default)]
pub struct Program(pub Vec<Instruction>);

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Instruction {
    Label(String),
    Mov {
        dst: Register,
        src: Operand,
    },
    Push(Register),
    Pop(Register),
    /// `LOAD dst, [address]`
    Load {
        dst: Register,
        address: String,
    },
    /// `STORE [address], src`
    Store {
        address: String,
        src: Register,
    },
    Binary {
        op: BinaryOperator,
        dst: Register,
        lhs: Register,
        rhs: Register,
    },
    Unary {
        op: UnaryOperator,
        dst: Register,
        src: Register,
    },
    Cmp(Register, Operand),
    Je(String),
    Jmp(String),
    Call(String),
    Ret,
    /// A line that was not understood, copied through as is.
    Raw(String),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Register {
    R1,
    R2,
    R3,
    FP,
    SP,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Operand {
    Register(Register),
    Imm(String),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOperator {
    Neg,
    Not,
}

impl Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Register::R1 => "R1",
            Register::R2 => "R2",
            Register::R3 => "R3",
            Register::FP => "FP",
            Register::SP => "SP",
        };
        write!(f, "{name}")
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Register(reg) => write!(f, "{reg}"),
            Operand::Imm(value) => write!(f, "{value}"),
        }
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mnemonic = match self {
            BinaryOperator::Add => "ADD",
            BinaryOperator::Sub => "SUB",
            BinaryOperator::Mul => "MUL",
            BinaryOperator::Div => "DIV",
            BinaryOperator::Mod => "MOD",
            BinaryOperator::Eq => "EQ",
            BinaryOperator::Neq => "NEQ",
            BinaryOperator::Lt => "LT",
            BinaryOperator::Lte => "LTE",
            BinaryOperator::Gt => "GT",
            BinaryOperator::Gte => "GTE",
        };
        write!(f, "{mnemonic}")
    }
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOperator::Neg => write!(f, "NEG"),
            UnaryOperator::Not => write!(f, "NOT"),
        }
    }
}

const INDENT: &str = "    ";

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Instruction::Label(label) = self {
            return write!(f, "{label}:");
        }

        f.write_str(INDENT)?;
        match self {
            Instruction::Label(_) => Ok(()),
            Instruction::Mov { dst, src } => write!(f, "MOV {dst}, {src}"),
            Instruction::Push(reg) => write!(f, "PUSH {reg}"),
            Instruction::Pop(reg) => write!(f, "POP {reg}"),
            Instruction::Load { dst, address } => write!(f, "LOAD {dst}, [{address}]"),
            Instruction::Store { address, src } => write!(f, "STORE [{address}], {src}"),
            Instruction::Binary { op, dst, lhs, rhs } => write!(f, "{op} {dst}, {lhs}, {rhs}"),
            Instruction::Unary { op, dst, src } => write!(f, "{op} {dst}, {src}"),
            Instruction::Cmp(reg, operand) => write!(f, "CMP {reg}, {operand}"),
            Instruction::Je(label) => write!(f, "JE {label}"),
            Instruction::Jmp(label) => write!(f, "JMP {label}"),
            Instruction::Call(name) => write!(f, "CALL {name}"),
            Instruction::Ret => write!(f, "RET"),
            Instruction::Raw(line) => write!(f, "{line}"),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0
            .iter()
            .try_for_each(|instruction| writeln!(f, "{instruction}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_text() {
        let cases = [
            (Instruction::Label("main".into()), "main:"),
            (
                Instruction::Mov {
                    dst: Register::FP,
                    src: Operand::Register(Register::SP),
                },
                "    MOV FP, SP",
            ),
            (
                Instruction::Load {
                    dst: Register::R1,
                    address: "x".into(),
                },
                "    LOAD R1, [x]",
            ),
            (
                Instruction::Store {
                    address: "x".into(),
                    src: Register::R1,
                },
                "    STORE [x], R1",
            ),
            (
                Instruction::Binary {
                    op: BinaryOperator::Lte,
                    dst: Register::R1,
                    lhs: Register::R2,
                    rhs: Register::R3,
                },
                "    LTE R1, R2, R3",
            ),
            (
                Instruction::Unary {
                    op: UnaryOperator::Not,
                    dst: Register::R1,
                    src: Register::R2,
                },
                "    NOT R1, R2",
            ),
            (
                Instruction::Cmp(Register::R1, Operand::Imm("0".into())),
                "    CMP R1, 0",
            ),
            (Instruction::Raw("NOP".into()), "    NOP"),
        ];

        for (instruction, expected) in cases {
            assert_eq!(instruction.to_string(), expected);
        }
    }

    #[test]
    fn test_program_text() {
        let program = Program(vec![
            Instruction::Label("f".into()),
            Instruction::Push(Register::FP),
            Instruction::Ret,
        ]);

        assert_eq!(program.to_string(), "f:\n    PUSH FP\n    RET\n");
    }
}
