/// Hands out fresh temporary and label names.
///
/// Counters start at zero for every generator and are never reset, so one
/// generator shared across all functions of a program keeps every name
/// unique within that program.
#[derive(Debug, Default)]
pub struct NameGenerator {
    temps: u64,
    labels: u64,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `t0`, `t1`, ...
    pub fn temp_variable_name(&mut self) -> String {
        let name = format!("t{}", self.temps);
        self.temps += 1;
        name
    }

    /// `L0`, `L1`, ...
    pub fn temp_label_name(&mut self) -> String {
        let name = format!("L{}", self.labels);
        self.labels += 1;
        name
    }
}
