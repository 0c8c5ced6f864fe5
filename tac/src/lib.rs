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
pub struct Var(pub String);

#[derive(Debug, PartialEq, Eq)]
pub enum Instruction {
    /// src, dst
    Copy(Value, Var),
    Unary {
        op: UnaryOperator,
        src: Value,
        dst: Var,
    },
    Binary {
        op: BinaryOperator,
        lhs: Value,
        rhs: Value,
        dst: Var,
    },
    /// Passes the next argument of a following call.
    Param(Value),
    Call {
        fun_name: String,
        argc: usize,
        dst: Var,
    },
    Return(Option<Value>),
    /// Expression, Label
    JumpIfZero(Value, String),
    /// Label to jump to.
    Jump(String),
    Label(String),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Value {
    /// Numeric literal, as written.
    Constant(String),
    /// String literal without its quotes.
    Str(String),
    /// A named variable of the source program.
    Var(Var),
    /// A compiler generated temporary.
    Temp(Var),
}

impl Value {
    pub fn is_temp(&self) -> bool {
        matches!(self, Value::Temp(_))
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Equal,
    NotEqual,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOperator {
    Negate,
    Not,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown operator \"{0}\"")]
pub struct UnknownOperator(pub String);

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessOrEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterOrEqual => ">=",
        }
    }
}

impl FromStr for BinaryOperator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Subtract,
            "*" => BinaryOperator::Multiply,
            "/" => BinaryOperator::Divide,
            "%" => BinaryOperator::Remainder,
            "==" => BinaryOperator::Equal,
            "!=" => BinaryOperator::NotEqual,
            "<" => BinaryOperator::LessThan,
            "<=" => BinaryOperator::LessOrEqual,
            ">" => BinaryOperator::GreaterThan,
            ">=" => BinaryOperator::GreaterOrEqual,
            _ => return Err(UnknownOperator(s.to_owned())),
        })
    }
}

impl UnaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOperator::Negate => "-",
            UnaryOperator::Not => "!",
        }
    }
}

impl FromStr for UnaryOperator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "-" => Ok(UnaryOperator::Negate),
            "!" => Ok(UnaryOperator::Not),
            _ => Err(UnknownOperator(s.to_owned())),
        }
    }
}

impl Display for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Constant(value) => write!(f, "{value}"),
            Value::Str(value) => write!(f, "\"{value}\""),
            Value::Var(var) | Value::Temp(var) => write!(f, "{var}"),
        }
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Copy(src, dst) => write!(f, "{dst} = {src}"),
            Instruction::Unary { op, src, dst } => write!(f, "{dst} = {} {src}", op.symbol()),
            Instruction::Binary { op, lhs, rhs, dst } => {
                write!(f, "{dst} = {lhs} {} {rhs}", op.symbol())
            }
            Instruction::Param(value) => write!(f, "param {value}"),
            Instruction::Call {
                fun_name,
                argc,
                dst,
            } => write!(f, "{dst} = call {fun_name}, {argc}"),
            Instruction::Return(Some(value)) => write!(f, "return {value}"),
            Instruction::Return(None) => write!(f, "return"),
            Instruction::JumpIfZero(value, label) => write!(f, "if {value} == 0 goto {label}"),
            Instruction::Jump(label) => write!(f, "goto {label}"),
            Instruction::Label(label) => write!(f, "{label}:"),
        }
    }
}

impl Display for FunctionDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "function {}:", self.identifier)?;
        for instruction in &self.body {
            writeln!(f, "{instruction}")?;
        }
        writeln!(f, "end function")?;
        writeln!(f)
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.iter().try_for_each(|function| write!(f, "{function}"))
    }
}
