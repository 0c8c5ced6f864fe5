use tiercc_parser::ast::AstNode;
use tiercc_utils::unique_id::NameGenerator;

/// The three renderings of one program.
#[derive(Debug)]
pub struct GeneratedCode {
    pub tac: tiercc_tac::Program,
    pub stack: tiercc_stack::Program,
    pub target: tiercc_asm::Program,
}

/// Runs all backends over the tree. Temporaries and labels are numbered by a
/// single generator, so stack code picks up label numbers where the three
/// address code left off.
pub fn code_generation(program: &AstNode) -> GeneratedCode {
    let mut names = NameGenerator::new();

    let tac = tiercc_tacgen::emit_tac_program(program, &mut names);
    let stack = tiercc_stackgen::emit_stack_program(program, &mut names);
    let target = tiercc_asmgen::code_generation(&stack.to_string());

    GeneratedCode { tac, stack, target }
}
