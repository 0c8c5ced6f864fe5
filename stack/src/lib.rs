#[cfg(feature = "ast")]
pub mod ast;

use std::{fmt::Display, str::FromStr};

use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Default)]
pub struct Program(pub Vec<FunctionDefinition>);

#[derive(Debug, PartialEq, Eq)]
pub struct FunctionDefinition {
    pub identifier: String,
    pub body: Vec<Instruction>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Instruction {
    /// Literal text, string literals keep their quotes.
    Push(String),
    Load(String),
    Store(String),
    /// Pops rhs then lhs, pushes the result.
    Binary(BinaryOperator),
    Unary(UnaryOperator),
    Call(String),
    /// Drops the top of the stack.
    Pop,
    /// Returns the top of the stack.
    Ret,
    /// Returns without a value.
    Ret0,
    /// Pops the condition and jumps if it is zero.
    Jz(String),
    Jmp(String),
    Label(String),
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

impl BinaryOperator {
    pub const ALL: [BinaryOperator; 11] = [
        BinaryOperator::Add,
        BinaryOperator::Sub,
        BinaryOperator::Mul,
        BinaryOperator::Div,
        BinaryOperator::Mod,
        BinaryOperator::Eq,
        BinaryOperator::Neq,
        BinaryOperator::Lt,
        BinaryOperator::Lte,
        BinaryOperator::Gt,
        BinaryOperator::Gte,
    ];

    pub fn mnemonic(&self) -> &'static str {
        match self {
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
        }
    }

    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.mnemonic() == mnemonic)
    }
}

impl UnaryOperator {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            UnaryOperator::Neg => "NEG",
            UnaryOperator::Not => "NOT",
        }
    }

    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        match mnemonic {
            "NEG" => Some(UnaryOperator::Neg),
            "NOT" => Some(UnaryOperator::Not),
            _ => None,
        }
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Push(value) => write!(f, "PUSH {value}"),
            Instruction::Load(name) => write!(f, "LOAD {name}"),
            Instruction::Store(name) => write!(f, "STORE {name}"),
            Instruction::Binary(op) => write!(f, "{}", op.mnemonic()),
            Instruction::Unary(op) => write!(f, "{}", op.mnemonic()),
            Instruction::Call(name) => write!(f, "CALL {name}"),
            Instruction::Pop => write!(f, "POP"),
            Instruction::Ret => write!(f, "RET"),
            Instruction::Ret0 => write!(f, "RET0"),
            Instruction::Jz(label) => write!(f, "JZ {label}"),
            Instruction::Jmp(label) => write!(f, "JMP {label}"),
            Instruction::Label(label) => write!(f, "{label}:"),
        }
    }
}

impl Display for FunctionDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "FUNC {}", self.identifier)?;
        for instruction in &self.body {
            writeln!(f, "{instruction}")?;
        }
        writeln!(f, "END_FUNC")?;
        writeln!(f)
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.iter().try_for_each(|function| write!(f, "{function}"))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown stack instruction \"{0}\"")]
pub struct UnknownInstruction(pub String);

impl FromStr for Instruction {
    type Err = UnknownInstruction;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (mnemonic, operand) = match line.split_once(' ') {
            Some((mnemonic, rest)) => (mnemonic, Some(rest.trim()).filter(|s| !s.is_empty())),
            None => (line, None),
        };

        let instruction = match (mnemonic, operand) {
            ("PUSH", Some(value)) => Instruction::Push(value.to_owned()),
            ("LOAD", Some(name)) => Instruction::Load(name.to_owned()),
            ("STORE", Some(name)) => Instruction::Store(name.to_owned()),
            ("CALL", Some(name)) => Instruction::Call(name.to_owned()),
            ("JZ", Some(label)) => Instruction::Jz(label.to_owned()),
            ("JMP", Some(label)) => Instruction::Jmp(label.to_owned()),
            ("POP", None) => Instruction::Pop,
            ("RET", None) => Instruction::Ret,
            ("RET0", None) => Instruction::Ret0,
            (mnemonic, None) => {
                if let Some(op) = BinaryOperator::from_mnemonic(mnemonic) {
                    Instruction::Binary(op)
                } else if let Some(op) = UnaryOperator::from_mnemonic(mnemonic) {
                    Instruction::Unary(op)
                } else if let Some(label) = mnemonic.strip_suffix(':').filter(|l| !l.is_empty()) {
                    Instruction::Label(label.to_owned())
                } else {
                    return Err(UnknownInstruction(line.to_owned()));
                }
            }
            _ => return Err(UnknownInstruction(line.to_owned())),
        };

        Ok(instruction)
    }
}

/// One line of the textual stack program.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Line {
    FuncStart(String),
    FuncEnd,
    Instruction(Instruction),
    Blank,
}

impl FromStr for Line {
    type Err = UnknownInstruction;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            return Ok(Line::Blank);
        }
        if trimmed == "END_FUNC" {
            return Ok(Line::FuncEnd);
        }
        if let Some(name) = trimmed.strip_prefix("FUNC ") {
            return Ok(Line::FuncStart(name.trim().to_owned()));
        }

        trimmed.parse().map(Line::Instruction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_text() {
        let program = Program(vec![FunctionDefinition {
            identifier: "main".into(),
            body: vec![
                Instruction::Push("10".into()),
                Instruction::Store("x".into()),
                Instruction::Load("x".into()),
                Instruction::Unary(UnaryOperator::Neg),
                Instruction::Ret,
            ],
        }]);

        assert_eq!(
            program.to_string(),
            "FUNC main\nPUSH 10\nSTORE x\nLOAD x\nNEG\nRET\nEND_FUNC\n\n"
        );
    }

    #[test]
    fn test_parse_lines() {
        let cases = [
            ("FUNC main", Line::FuncStart("main".into())),
            ("END_FUNC", Line::FuncEnd),
            ("", Line::Blank),
            ("PUSH \"a b\"", Line::Instruction(Instruction::Push("\"a b\"".into()))),
            ("  STORE x", Line::Instruction(Instruction::Store("x".into()))),
            ("GTE", Line::Instruction(Instruction::Binary(BinaryOperator::Gte))),
            ("NOT", Line::Instruction(Instruction::Unary(UnaryOperator::Not))),
            ("RET0", Line::Instruction(Instruction::Ret0)),
            ("L3:", Line::Instruction(Instruction::Label("L3".into()))),
        ];

        for (text, expected) in cases {
            assert_eq!(text.parse::<Line>(), Ok(expected), "{text}");
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        for text in ["NOP", "PUSH", "POP R1", ":"] {
            assert_eq!(
                text.parse::<Instruction>(),
                Err(UnknownInstruction(text.to_owned()))
            );
        }
    }

    #[test]
    fn test_display_parses_back() {
        let instructions = [
            Instruction::Call("f".into()),
            Instruction::Jz("L0".into()),
            Instruction::Jmp("L1".into()),
            Instruction::Binary(BinaryOperator::Mod),
            Instruction::Pop,
        ];

        for instruction in instructions {
            assert_eq!(
                instruction.to_string().parse::<Instruction>(),
                Ok(instruction.clone())
            );
        }
    }
}
