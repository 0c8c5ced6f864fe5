use tiercc_stack as stack;

use crate::{BinaryOperator, UnaryOperator};

impl From<stack::BinaryOperator> for BinaryOperator {
    fn from(value: stack::BinaryOperator) -> Self {
        match value {
            stack::BinaryOperator::Add => BinaryOperator::Add,
            stack::BinaryOperator::Sub => BinaryOperator::Sub,
            stack::BinaryOperator::Mul => BinaryOperator::Mul,
            stack::BinaryOperator::Div => BinaryOperator::Div,
            stack::BinaryOperator::Mod => BinaryOperator::Mod,
            stack::BinaryOperator::Eq => BinaryOperator::Eq,
            stack::BinaryOperator::Neq => BinaryOperator::Neq,
            stack::BinaryOperator::Lt => BinaryOperator::Lt,
            stack::BinaryOperator::Lte => BinaryOperator::Lte,
            stack::BinaryOperator::Gt => BinaryOperator::Gt,
            stack::BinaryOperator::Gte => BinaryOperator::Gte,
        }
    }
}

impl From<stack::UnaryOperator> for UnaryOperator {
    fn from(value: stack::UnaryOperator) -> Self {
        match value {
            stack::UnaryOperator::Neg => UnaryOperator::Neg,
            stack::UnaryOperator::Not => UnaryOperator::Not,
        }
    }
}
