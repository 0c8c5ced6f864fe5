use tiercc_parser::ast::{AstNode, NodeKind};
use tiercc_tac::{
    BinaryOperator, FunctionDefinition, Instruction, Program, UnaryOperator, Value, Var,
};
use tiercc_utils::unique_id::NameGenerator;

fn new_temp(names: &mut NameGenerator) -> Var {
    Var(names.temp_variable_name())
}

/// Makes sure the value lives in a temporary, copying it into a fresh one if
/// it is a literal or a named variable.
fn materialize(
    instructions: &mut Vec<Instruction>,
    value: Value,
    names: &mut NameGenerator,
) -> Value {
    if value.is_temp() {
        return value;
    }

    let dst = new_temp(names);
    instructions.push(Instruction::Copy(value, dst.clone()));
    Value::Temp(dst)
}

fn emit_materialized(expr: &AstNode, names: &mut NameGenerator) -> (Vec<Instruction>, Value) {
    let (mut instructions, value) = emit_tac_expression(expr, names);
    let value = materialize(&mut instructions, value, names);
    (instructions, value)
}

/// Lowers an expression, returning its instructions and the operand holding
/// the result.
///
/// Operators the IR does not know are dropped and their first operand
/// stands in for the result. Nodes that are not expressions evaluate to `0`.
pub fn emit_tac_expression(expr: &AstNode, names: &mut NameGenerator) -> (Vec<Instruction>, Value) {
    match expr.kind() {
        NodeKind::Number | NodeKind::String | NodeKind::Identifier => match Value::try_from(expr) {
            Ok(value) => (vec![], value),
            Err(_) => (vec![], Value::Constant("0".to_owned())),
        },
        NodeKind::BinaryOp => {
            let (mut instructions, lhs) = expr
                .child(0)
                .map(|lhs| emit_tac_expression(lhs, names))
                .unwrap_or_else(|| (vec![], Value::Constant("0".to_owned())));
            let (mut rhs_ins, rhs) = expr
                .child(1)
                .map(|rhs| emit_tac_expression(rhs, names))
                .unwrap_or_else(|| (vec![], Value::Constant("0".to_owned())));
            instructions.append(&mut rhs_ins);

            let Ok(op) = BinaryOperator::try_from(expr) else {
                return (instructions, lhs);
            };

            let dst = new_temp(names);
            instructions.push(Instruction::Binary {
                op,
                lhs,
                rhs,
                dst: dst.clone(),
            });
            (instructions, Value::Temp(dst))
        }
        NodeKind::UnaryOp => {
            let (mut instructions, src) = expr
                .child(0)
                .map(|operand| emit_tac_expression(operand, names))
                .unwrap_or_else(|| (vec![], Value::Constant("0".to_owned())));

            let Ok(op) = UnaryOperator::try_from(expr) else {
                return (instructions, src);
            };

            let dst = new_temp(names);
            instructions.push(Instruction::Unary {
                op,
                src,
                dst: dst.clone(),
            });
            (instructions, Value::Temp(dst))
        }
        NodeKind::Assignment => {
            let target = Var(expr.value().unwrap_or_default().to_owned());
            let instructions = emit_store(expr.child(0), target.clone(), names);
            (instructions, Value::Var(target))
        }
        NodeKind::Call => {
            let mut instructions = vec![];
            let mut args = Vec::with_capacity(expr.call_args().len());
            for arg in expr.call_args() {
                let (mut arg_ins, value) = emit_materialized(arg, names);
                instructions.append(&mut arg_ins);
                args.push(value);
            }

            let argc = args.len();
            instructions.extend(args.into_iter().map(Instruction::Param));

            let dst = new_temp(names);
            instructions.push(Instruction::Call {
                fun_name: expr.value().unwrap_or_default().to_owned(),
                argc,
                dst: dst.clone(),
            });
            (instructions, Value::Temp(dst))
        }
        _ => (vec![], Value::Constant("0".to_owned())),
    }
}

/// `tN = <value>` followed by `target = tN`.
fn emit_store(value: Option<&AstNode>, target: Var, names: &mut NameGenerator) -> Vec<Instruction> {
    let Some(value) = value else {
        return vec![];
    };

    let (mut instructions, value) = emit_materialized(value, names);
    instructions.push(Instruction::Copy(value, target));
    instructions
}

pub fn emit_tac_statement(stmt: &AstNode, names: &mut NameGenerator) -> Vec<Instruction> {
    match stmt.kind() {
        NodeKind::Block => stmt
            .children()
            .iter()
            .flat_map(|stmt| emit_tac_statement(stmt, names))
            .collect(),
        NodeKind::VariableDecl => {
            let name = stmt.declared_name().unwrap_or_default().to_owned();
            emit_store(stmt.child(0), Var(name), names)
        }
        NodeKind::If => emit_tac_if(stmt, names),
        NodeKind::While => emit_tac_while(stmt, names),
        NodeKind::For => emit_tac_for(stmt, names),
        NodeKind::Return => match stmt.child(0) {
            Some(expr) => {
                let (mut instructions, value) = emit_tac_expression(expr, names);
                instructions.push(Instruction::Return(Some(value)));
                instructions
            }
            None => vec![Instruction::Return(None)],
        },
        NodeKind::Program | NodeKind::FunctionDecl => vec![],
        // Expression statement, only the side effects are kept.
        _ => emit_tac_expression(stmt, names).0,
    }
}

/// `if c == 0 goto ELSE`, then, `goto END`, `ELSE:`, else, `END:`
fn emit_tac_if(stmt: &AstNode, names: &mut NameGenerator) -> Vec<Instruction> {
    let mut instructions = vec![];

    let condition = emit_condition(stmt.child(0), &mut instructions, names);
    let else_label = names.temp_label_name();
    let end_label = names.temp_label_name();

    instructions.push(Instruction::JumpIfZero(condition, else_label.clone()));
    if let Some(then) = stmt.child(1) {
        instructions.append(&mut emit_tac_statement(then, names));
    }
    instructions.push(Instruction::Jump(end_label.clone()));
    instructions.push(Instruction::Label(else_label));
    if let Some(r#else) = stmt.child(2) {
        instructions.append(&mut emit_tac_statement(r#else, names));
    }
    instructions.push(Instruction::Label(end_label));

    instructions
}

/// `START:`, `if c == 0 goto END`, body, `goto START`, `END:`
fn emit_tac_while(stmt: &AstNode, names: &mut NameGenerator) -> Vec<Instruction> {
    let start_label = names.temp_label_name();
    let end_label = names.temp_label_name();

    let mut instructions = vec![Instruction::Label(start_label.clone())];
    let condition = emit_condition(stmt.child(0), &mut instructions, names);
    instructions.push(Instruction::JumpIfZero(condition, end_label.clone()));
    if let Some(body) = stmt.child(1) {
        instructions.append(&mut emit_tac_statement(body, names));
    }
    instructions.push(Instruction::Jump(start_label));
    instructions.push(Instruction::Label(end_label));

    instructions
}

/// init, `START:`, `if c == 0 goto END`, body, `UPDATE:`, update,
/// `goto START`, `END:`
fn emit_tac_for(stmt: &AstNode, names: &mut NameGenerator) -> Vec<Instruction> {
    let start_label = names.temp_label_name();
    let end_label = names.temp_label_name();
    let update_label = names.temp_label_name();
    let clauses = stmt.for_clauses();

    let mut instructions = clauses
        .init
        .map(|init| emit_tac_statement(init, names))
        .unwrap_or_default();

    instructions.push(Instruction::Label(start_label.clone()));
    if let Some(condition) = clauses.condition {
        let condition = emit_condition(Some(condition), &mut instructions, names);
        instructions.push(Instruction::JumpIfZero(condition, end_label.clone()));
    }
    if let Some(body) = clauses.body {
        instructions.append(&mut emit_tac_statement(body, names));
    }
    instructions.push(Instruction::Label(update_label));
    if let Some(update) = clauses.update {
        instructions.append(&mut emit_tac_statement(update, names));
    }
    // The loop restarts at START, not at UPDATE.
    instructions.push(Instruction::Jump(start_label));
    instructions.push(Instruction::Label(end_label));

    instructions
}

fn emit_condition(
    condition: Option<&AstNode>,
    instructions: &mut Vec<Instruction>,
    names: &mut NameGenerator,
) -> Value {
    let value = match condition {
        Some(condition) => {
            let (mut cond_ins, value) = emit_tac_expression(condition, names);
            instructions.append(&mut cond_ins);
            value
        }
        None => Value::Constant("0".to_owned()),
    };
    materialize(instructions, value, names)
}

pub fn emit_tac_function(function: &AstNode, names: &mut NameGenerator) -> FunctionDefinition {
    let body = function
        .child(1)
        .map(|body| emit_tac_statement(body, names))
        .unwrap_or_default();

    FunctionDefinition {
        identifier: function.value().unwrap_or_default().to_owned(),
        body,
    }
}

pub fn emit_tac_program(program: &AstNode, names: &mut NameGenerator) -> Program {
    Program(
        program
            .children()
            .iter()
            .filter(|node| node.is(NodeKind::FunctionDecl))
            .map(|function| emit_tac_function(function, names))
            .collect(),
    )
}
