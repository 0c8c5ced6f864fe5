pub mod stack_to_assembly;

/// Turns textual stack code into pseudo-assembly, one line at a time.
pub fn code_generation(stack_code: &str) -> tiercc_asm::Program {
    tiercc_asm::Program(
        stack_code
            .lines()
            .flat_map(stack_to_assembly::cg_line)
            .collect(),
    )
}
