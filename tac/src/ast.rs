use thiserror::Error;
use tiercc_parser::ast::{AstNode, NodeKind};

use crate::{BinaryOperator, UnaryOperator, UnknownOperator, Value, Var};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidNode {
    #[error("{} nodes cannot be used here", .0.name())]
    UnexpectedKind(NodeKind),
    #[error("{} node without a value", .0.name())]
    MissingValue(NodeKind),
    #[error(transparent)]
    UnknownOperator(#[from] UnknownOperator),
}

fn value_of(node: &AstNode) -> Result<&str, InvalidNode> {
    node.value().ok_or(InvalidNode::MissingValue(node.kind()))
}

impl TryFrom<&AstNode> for BinaryOperator {
    type Error = InvalidNode;

    fn try_from(node: &AstNode) -> Result<Self, Self::Error> {
        if !node.is(NodeKind::BinaryOp) {
            return Err(InvalidNode::UnexpectedKind(node.kind()));
        }
        Ok(value_of(node)?.parse()?)
    }
}

impl TryFrom<&AstNode> for UnaryOperator {
    type Error = InvalidNode;

    fn try_from(node: &AstNode) -> Result<Self, Self::Error> {
        if !node.is(NodeKind::UnaryOp) {
            return Err(InvalidNode::UnexpectedKind(node.kind()));
        }
        Ok(value_of(node)?.parse()?)
    }
}

/// Leaves are their own operands and need no instructions.
impl TryFrom<&AstNode> for Value {
    type Error = InvalidNode;

    fn try_from(node: &AstNode) -> Result<Self, Self::Error> {
        let value = value_of(node)?.to_owned();
        Ok(match node.kind() {
            NodeKind::Number => Value::Constant(value),
            NodeKind::String => Value::Str(value),
            NodeKind::Identifier => Value::Var(Var(value)),
            kind => return Err(InvalidNode::UnexpectedKind(kind)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_values() {
        assert_eq!(
            Value::try_from(&AstNode::number("3.5")),
            Ok(Value::Constant("3.5".into()))
        );
        assert_eq!(
            Value::try_from(&AstNode::string("hi")),
            Ok(Value::Str("hi".into()))
        );
        assert_eq!(
            Value::try_from(&AstNode::identifier("x")),
            Ok(Value::Var(Var("x".into())))
        );
        assert_eq!(
            Value::try_from(&AstNode::block()),
            Err(InvalidNode::UnexpectedKind(NodeKind::Block))
        );
    }

    #[test]
    fn test_operators_from_nodes() {
        let add = AstNode::binary_op("+", AstNode::number("1"), AstNode::number("2"));
        assert_eq!(BinaryOperator::try_from(&add), Ok(BinaryOperator::Add));

        let neg = AstNode::unary_op("-", AstNode::number("1"));
        assert_eq!(UnaryOperator::try_from(&neg), Ok(UnaryOperator::Negate));
        assert_eq!(
            BinaryOperator::try_from(&neg),
            Err(InvalidNode::UnexpectedKind(NodeKind::UnaryOp))
        );

        let and = AstNode::binary_op("&&", AstNode::number("1"), AstNode::number("2"));
        assert_eq!(
            BinaryOperator::try_from(&and),
            Err(InvalidNode::UnknownOperator(UnknownOperator("&&".into())))
        );
    }
}
