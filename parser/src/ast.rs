#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum NodeKind {
    Program,
    FunctionDecl,
    Block,
    VariableDecl,
    Assignment,
    BinaryOp,
    UnaryOp,
    If,
    While,
    For,
    Return,
    Call,
    Identifier,
    Number,
    String,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Program => "PROGRAM",
            NodeKind::FunctionDecl => "FUNCTION_DECL",
            NodeKind::Block => "BLOCK",
            NodeKind::VariableDecl => "VARIABLE_DECL",
            NodeKind::Assignment => "ASSIGNMENT",
            NodeKind::BinaryOp => "BINARY_OP",
            NodeKind::UnaryOp => "UNARY_OP",
            NodeKind::If => "IF",
            NodeKind::While => "WHILE",
            NodeKind::For => "FOR",
            NodeKind::Return => "RETURN",
            NodeKind::Call => "CALL",
            NodeKind::Identifier => "IDENTIFIER",
            NodeKind::Number => "NUMBER",
            NodeKind::String => "STRING",
        }
    }
}

pub const FOR_INIT: &str = "init";
pub const FOR_CONDITION: &str = "cond";
pub const FOR_UPDATE: &str = "update";
pub const CALL_ARGS: &str = "args";

/// A node of the syntax tree. Every node owns its children, a child is moved
/// into its parent by [`AstNode::add_child`] and can only be reached through
/// it afterwards.
#[derive(Debug, Eq, PartialEq)]
pub struct AstNode {
    kind: NodeKind,
    value: Option<String>,
    children: Vec<AstNode>,
}

/// Borrowed view of the clauses of a `For` node. Missing clauses are `None`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForClauses<'a> {
    pub init: Option<&'a AstNode>,
    pub condition: Option<&'a AstNode>,
    pub update: Option<&'a AstNode>,
    pub body: Option<&'a AstNode>,
}

impl AstNode {
    pub fn new(kind: NodeKind, value: Option<&str>) -> Self {
        Self {
            kind,
            value: value.map(str::to_owned),
            children: Vec::new(),
        }
    }

    pub fn add_child(&mut self, child: AstNode) {
        self.children.push(child);
    }

    fn with_children(mut self, children: impl IntoIterator<Item = AstNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn children(&self) -> &[AstNode] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&AstNode> {
        self.children.get(index)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind == kind
    }

    // Constructors, one per node kind.

    pub fn program() -> Self {
        Self::new(NodeKind::Program, None)
    }

    pub fn function(name: &str, params: AstNode, body: AstNode) -> Self {
        Self::new(NodeKind::FunctionDecl, Some(name)).with_children([params, body])
    }

    pub fn block() -> Self {
        Self::new(NodeKind::Block, None)
    }

    /// The placeholder block holding the parameter declarations of a function.
    pub fn params() -> Self {
        Self::new(NodeKind::Block, Some("params"))
    }

    pub fn var_decl(ty: &str, name: &str, init: Option<AstNode>) -> Self {
        Self::new(NodeKind::VariableDecl, Some(&format!("{ty} {name}"))).with_children(init)
    }

    pub fn assignment(name: &str, expr: AstNode) -> Self {
        Self::new(NodeKind::Assignment, Some(name)).with_children([expr])
    }

    pub fn binary_op(op: &str, lhs: AstNode, rhs: AstNode) -> Self {
        Self::new(NodeKind::BinaryOp, Some(op)).with_children([lhs, rhs])
    }

    pub fn unary_op(op: &str, expr: AstNode) -> Self {
        Self::new(NodeKind::UnaryOp, Some(op)).with_children([expr])
    }

    pub fn if_statement(condition: AstNode, then: AstNode, r#else: Option<AstNode>) -> Self {
        Self::new(NodeKind::If, None)
            .with_children([condition, then])
            .with_children(r#else)
    }

    pub fn while_statement(condition: AstNode, body: AstNode) -> Self {
        Self::new(NodeKind::While, None).with_children([condition, body])
    }

    /// Absent clauses are left out of the children. The value lists the
    /// clauses that are present so consumers can tell `for (;c;)` apart from
    /// `for (i;;)`.
    pub fn for_statement(
        init: Option<AstNode>,
        condition: Option<AstNode>,
        update: Option<AstNode>,
        body: AstNode,
    ) -> Self {
        let present: Vec<&str> = [
            (init.is_some(), FOR_INIT),
            (condition.is_some(), FOR_CONDITION),
            (update.is_some(), FOR_UPDATE),
        ]
        .into_iter()
        .filter_map(|(present, name)| present.then_some(name))
        .collect();

        let value = (!present.is_empty()).then(|| present.join(","));

        Self::new(NodeKind::For, value.as_deref())
            .with_children(init)
            .with_children(condition)
            .with_children(update)
            .with_children([body])
    }

    pub fn return_statement(expr: Option<AstNode>) -> Self {
        Self::new(NodeKind::Return, None).with_children(expr)
    }

    /// The arguments sit in a single `Block("args")` child.
    pub fn call(name: &str, args: Vec<AstNode>) -> Self {
        let args = Self::new(NodeKind::Block, Some(CALL_ARGS)).with_children(args);
        Self::new(NodeKind::Call, Some(name)).with_children([args])
    }

    pub fn identifier(name: &str) -> Self {
        Self::new(NodeKind::Identifier, Some(name))
    }

    pub fn number(value: &str) -> Self {
        Self::new(NodeKind::Number, Some(value))
    }

    pub fn string(value: &str) -> Self {
        Self::new(NodeKind::String, Some(value))
    }

    /// The variable name of a `VariableDecl`, i.e. the last word of `"int x"`.
    pub fn declared_name(&self) -> Option<&str> {
        self.value()
            .and_then(|value| value.split_whitespace().last())
    }

    /// Argument expressions of a `Call` node, empty when the args block is
    /// missing.
    pub fn call_args(&self) -> &[AstNode] {
        match self.child(0) {
            Some(args) if args.is(NodeKind::Block) => args.children(),
            _ => &[],
        }
    }

    /// Splits the children of a `For` node into its clauses. Without a clause
    /// list in the value the last child is the body and the ones before it
    /// are init, condition and update in that order.
    pub fn for_clauses(&self) -> ForClauses<'_> {
        let mut children = self.children.iter();

        match &self.value {
            Some(value) => {
                let has = |name: &str| value.split(',').any(|part| part == name);
                let init = if has(FOR_INIT) { children.next() } else { None };
                let condition = if has(FOR_CONDITION) {
                    children.next()
                } else {
                    None
                };
                let update = if has(FOR_UPDATE) {
                    children.next()
                } else {
                    None
                };
                ForClauses {
                    init,
                    condition,
                    update,
                    body: children.next(),
                }
            }
            None => match self.children.split_last() {
                Some((body, clauses)) => ForClauses {
                    init: clauses.first(),
                    condition: clauses.get(1),
                    update: clauses.get(2),
                    body: Some(body),
                },
                None => ForClauses::default(),
            },
        }
    }
}
