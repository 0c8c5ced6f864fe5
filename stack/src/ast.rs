use thiserror::Error;
use tiercc_parser::ast::{AstNode, NodeKind};

use crate::{BinaryOperator, Instruction, UnaryOperator};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidOperator {
    #[error("{} nodes are not operators", .0.name())]
    NotAnOperator(NodeKind),
    #[error("Unknown operator \"{0}\"")]
    Unknown(String),
}

impl TryFrom<&AstNode> for BinaryOperator {
    type Error = InvalidOperator;

    fn try_from(node: &AstNode) -> Result<Self, Self::Error> {
        if !node.is(NodeKind::BinaryOp) {
            return Err(InvalidOperator::NotAnOperator(node.kind()));
        }

        Ok(match node.value().unwrap_or_default() {
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Sub,
            "*" => BinaryOperator::Mul,
            "/" => BinaryOperator::Div,
            "%" => BinaryOperator::Mod,
            "==" => BinaryOperator::Eq,
            "!=" => BinaryOperator::Neq,
            "<" => BinaryOperator::Lt,
            "<=" => BinaryOperator::Lte,
            ">" => BinaryOperator::Gt,
            ">=" => BinaryOperator::Gte,
            other => return Err(InvalidOperator::Unknown(other.to_owned())),
        })
    }
}

impl TryFrom<&AstNode> for UnaryOperator {
    type Error = InvalidOperator;

    fn try_from(node: &AstNode) -> Result<Self, Self::Error> {
        if !node.is(NodeKind::UnaryOp) {
            return Err(InvalidOperator::NotAnOperator(node.kind()));
        }

        match node.value().unwrap_or_default() {
            "-" => Ok(UnaryOperator::Neg),
            "!" => Ok(UnaryOperator::Not),
            other => Err(InvalidOperator::Unknown(other.to_owned())),
        }
    }
}

/// The instruction that puts a leaf on the stack, `None` for inner nodes.
pub fn leaf_instruction(node: &AstNode) -> Option<Instruction> {
    let value = node.value()?;
    match node.kind() {
        NodeKind::Number => Some(Instruction::Push(value.to_owned())),
        NodeKind::String => Some(Instruction::Push(format!("\"{value}\""))),
        NodeKind::Identifier => Some(Instruction::Load(value.to_owned())),
        _ => None,
    }
}
