use tiercc_parser::ast::{AstNode, NodeKind};
use tiercc_stack::{
    ast::leaf_instruction, BinaryOperator, FunctionDefinition, Instruction, Program,
    UnaryOperator,
};
use tiercc_utils::unique_id::NameGenerator;

fn push_zero() -> Instruction {
    Instruction::Push("0".to_owned())
}

/// Lowers an expression so that it leaves exactly one value on the stack.
pub fn emit_stack_expression(expr: &AstNode) -> Vec<Instruction> {
    if let Some(leaf) = leaf_instruction(expr) {
        return vec![leaf];
    }

    match expr.kind() {
        NodeKind::BinaryOp => {
            let mut instructions = emit_operand(expr.child(0));
            instructions.append(&mut emit_operand(expr.child(1)));
            instructions.push(match BinaryOperator::try_from(expr) {
                Ok(op) => Instruction::Binary(op),
                // Unknown operator, keep the left operand.
                Err(_) => Instruction::Pop,
            });
            instructions
        }
        NodeKind::UnaryOp => {
            let mut instructions = emit_operand(expr.child(0));
            if let Ok(op) = UnaryOperator::try_from(expr) {
                instructions.push(Instruction::Unary(op));
            }
            instructions
        }
        NodeKind::Assignment => {
            let name = expr.value().unwrap_or_default();
            let mut instructions = emit_operand(expr.child(0));
            instructions.push(Instruction::Store(name.to_owned()));
            instructions.push(Instruction::Load(name.to_owned()));
            instructions
        }
        NodeKind::Call => {
            // Arguments go on the stack last to first.
            let mut instructions: Vec<_> = expr
                .call_args()
                .iter()
                .rev()
                .flat_map(emit_stack_expression)
                .collect();
            instructions.push(Instruction::Call(
                expr.value().unwrap_or_default().to_owned(),
            ));
            instructions
        }
        _ => vec![push_zero()],
    }
}

fn emit_operand(operand: Option<&AstNode>) -> Vec<Instruction> {
    operand.map_or_else(|| vec![push_zero()], emit_stack_expression)
}

/// Stores into `name` without leaving anything on the stack.
fn emit_store(value: Option<&AstNode>, name: &str) -> Vec<Instruction> {
    let Some(value) = value else {
        return vec![];
    };

    let mut instructions = emit_stack_expression(value);
    instructions.push(Instruction::Store(name.to_owned()));
    instructions
}

pub fn emit_stack_statement(stmt: &AstNode, names: &mut NameGenerator) -> Vec<Instruction> {
    match stmt.kind() {
        NodeKind::Block => stmt
            .children()
            .iter()
            .flat_map(|stmt| emit_stack_statement(stmt, names))
            .collect(),
        NodeKind::VariableDecl => emit_store(stmt.child(0), stmt.declared_name().unwrap_or_default()),
        NodeKind::Assignment => emit_store(stmt.child(0), stmt.value().unwrap_or_default()),
        NodeKind::If => emit_stack_if(stmt, names),
        NodeKind::While => emit_stack_while(stmt, names),
        NodeKind::For => emit_stack_for(stmt, names),
        NodeKind::Return => match stmt.child(0) {
            Some(expr) => {
                let mut instructions = emit_stack_expression(expr);
                instructions.push(Instruction::Ret);
                instructions
            }
            None => vec![Instruction::Ret0],
        },
        NodeKind::Program | NodeKind::FunctionDecl => vec![],
        _ => {
            let mut instructions = emit_stack_expression(stmt);
            instructions.push(Instruction::Pop);
            instructions
        }
    }
}

fn emit_stack_if(stmt: &AstNode, names: &mut NameGenerator) -> Vec<Instruction> {
    let else_label = names.temp_label_name();
    let end_label = names.temp_label_name();

    let mut instructions = emit_operand(stmt.child(0));
    instructions.push(Instruction::Jz(else_label.clone()));
    if let Some(then) = stmt.child(1) {
        instructions.append(&mut emit_stack_statement(then, names));
    }
    instructions.push(Instruction::Jmp(end_label.clone()));
    instructions.push(Instruction::Label(else_label));
    if let Some(r#else) = stmt.child(2) {
        instructions.append(&mut emit_stack_statement(r#else, names));
    }
    instructions.push(Instruction::Label(end_label));

    instructions
}

fn emit_stack_while(stmt: &AstNode, names: &mut NameGenerator) -> Vec<Instruction> {
    let start_label = names.temp_label_name();
    let end_label = names.temp_label_name();

    let mut instructions = vec![Instruction::Label(start_label.clone())];
    instructions.append(&mut emit_operand(stmt.child(0)));
    instructions.push(Instruction::Jz(end_label.clone()));
    if let Some(body) = stmt.child(1) {
        instructions.append(&mut emit_stack_statement(body, names));
    }
    instructions.push(Instruction::Jmp(start_label));
    instructions.push(Instruction::Label(end_label));

    instructions
}

fn emit_stack_for(stmt: &AstNode, names: &mut NameGenerator) -> Vec<Instruction> {
    let start_label = names.temp_label_name();
    let end_label = names.temp_label_name();
    let update_label = names.temp_label_name();
    let clauses = stmt.for_clauses();

    let mut instructions = clauses
        .init
        .map(|init| emit_stack_statement(init, names))
        .unwrap_or_default();

    instructions.push(Instruction::Label(start_label.clone()));
    if let Some(condition) = clauses.condition {
        instructions.append(&mut emit_stack_expression(condition));
        instructions.push(Instruction::Jz(end_label.clone()));
    }
    if let Some(body) = clauses.body {
        instructions.append(&mut emit_stack_statement(body, names));
    }
    instructions.push(Instruction::Label(update_label));
    if let Some(update) = clauses.update {
        instructions.append(&mut emit_stack_statement(update, names));
    }
    instructions.push(Instruction::Jmp(start_label));
    instructions.push(Instruction::Label(end_label));

    instructions
}

pub fn emit_stack_function(function: &AstNode, names: &mut NameGenerator) -> FunctionDefinition {
    let body = function
        .child(1)
        .map(|body| emit_stack_statement(body, names))
        .unwrap_or_default();

    FunctionDefinition {
        identifier: function.value().unwrap_or_default().to_owned(),
        body,
    }
}

pub fn emit_stack_program(program: &AstNode, names: &mut NameGenerator) -> Program {
    Program(
        program
            .children()
            .iter()
            .filter(|node| node.is(NodeKind::FunctionDecl))
            .map(|function| emit_stack_function(function, names))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tiercc_parser::{lexer::Lexer, Parser};

    use super::*;

    fn lower(input: &str) -> Program {
        let tokens = Lexer::new(input.to_owned()).tokenize();
        let mut parser = Parser::new(tokens);
        let program = parser
            .parse_program()
            .expect("the program should be parsed successfully");

        emit_stack_program(&program, &mut NameGenerator::new())
    }

    fn lines(input: &str) -> Vec<String> {
        lower(input)
            .to_string()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn test_declaration_and_return() {
        assert_eq!(
            lines("int main() { int x = 10; return x; }"),
            vec!["FUNC main", "PUSH 10", "STORE x", "LOAD x", "RET", "END_FUNC", ""]
        );
    }

    #[test]
    fn test_precedence_order() {
        assert_eq!(
            lines("int main() { return a + b * -c; }"),
            vec![
                "FUNC main",
                "LOAD a",
                "LOAD b",
                "LOAD c",
                "NEG",
                "MUL",
                "ADD",
                "RET",
                "END_FUNC",
                "",
            ]
        );
    }

    #[test]
    fn test_call_pushes_arguments_in_reverse() {
        assert_eq!(
            lines("void main() { f(1, x, \"s\"); return; }"),
            vec![
                "FUNC main",
                "PUSH \"s\"",
                "LOAD x",
                "PUSH 1",
                "CALL f",
                "POP",
                "RET0",
                "END_FUNC",
                "",
            ]
        );
    }

    #[test]
    fn test_assignments() {
        assert_eq!(
            lines("int main() { a = b = 1; a + 1; }"),
            vec![
                "FUNC main",
                "PUSH 1",
                "STORE b",
                "LOAD b",
                "STORE a",
                "LOAD a",
                "PUSH 1",
                "ADD",
                "POP",
                "END_FUNC",
                "",
            ]
        );
    }

    #[test]
    fn test_if_without_else() {
        assert_eq!(
            lines("int main() { if (a != 0) a = 0; }"),
            vec![
                "FUNC main",
                "LOAD a",
                "PUSH 0",
                "NEQ",
                "JZ L0",
                "PUSH 0",
                "STORE a",
                "JMP L1",
                "L0:",
                "L1:",
                "END_FUNC",
                "",
            ]
        );
    }

    #[test]
    fn test_while() {
        assert_eq!(
            lines("int main() { while (i < 3) i = i + 1; }"),
            vec![
                "FUNC main",
                "L0:",
                "LOAD i",
                "PUSH 3",
                "LT",
                "JZ L1",
                "LOAD i",
                "PUSH 1",
                "ADD",
                "STORE i",
                "JMP L0",
                "L1:",
                "END_FUNC",
                "",
            ]
        );
    }

    #[test]
    fn test_for() {
        assert_eq!(
            lines("int main() { for (i = 0; i < 2; g()) {} }"),
            vec![
                "FUNC main",
                "PUSH 0",
                "STORE i",
                "L0:",
                "LOAD i",
                "PUSH 2",
                "LT",
                "JZ L1",
                "L2:",
                "CALL g",
                "POP",
                "JMP L0",
                "L1:",
                "END_FUNC",
                "",
            ]
        );
    }

    #[test]
    fn test_call_arguments_come_from_args_block() {
        let call = AstNode::call("f", vec![AstNode::number("1"), AstNode::identifier("x")]);
        assert_eq!(
            emit_stack_expression(&call),
            vec![
                Instruction::Load("x".to_owned()),
                Instruction::Push("1".to_owned()),
                Instruction::Call("f".to_owned()),
            ]
        );

        let bare = AstNode::new(NodeKind::Call, Some("g"));
        assert_eq!(
            emit_stack_expression(&bare),
            vec![Instruction::Call("g".to_owned())]
        );
    }

    #[test]
    fn test_every_label_has_one_jump_except_for_update() {
        let program = lower(
            "int main() { if (a) { while (b) b = b - 1; } else { c = 1; } for (;c;) c = 0; }",
        );

        let mut references = BTreeMap::new();
        for instruction in &program.0[0].body {
            if let Instruction::Label(label) = instruction {
                assert!(!references.contains_key(label.as_str()), "{label} defined twice");
                references.insert(label.as_str(), 0);
            }
        }
        for instruction in &program.0[0].body {
            if let Instruction::Jmp(label) | Instruction::Jz(label) = instruction {
                *references.entry(label.as_str()).or_default() += 1;
            }
        }

        // L0/L1 if, L2/L3 while, L4 start, L5 end and L6 update of the for.
        assert_eq!(
            references,
            BTreeMap::from([
                ("L0", 1),
                ("L1", 1),
                ("L2", 1),
                ("L3", 1),
                ("L4", 1),
                ("L5", 1),
                ("L6", 0),
            ])
        );
    }
}
