// AST (Abstract Syntax Tree) definitions for the AtomC front end

use crate::semantic::symbols::ScopeId;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A compile-time value carried by constant expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
}

/// A struct type reference; `members` is filled in once the name resolves.
#[derive(Debug, Clone, PartialEq)]
pub struct StructRef {
    pub name: String,
    pub members: Option<ScopeId>,
}

/// The class of a type descriptor
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Void,
    Int,
    Float,
    Char,
    Struct(StructRef),
}

/// Type descriptor: a base class plus optional array-ness.
///
/// `array_size` is the (unevaluated) bound expression; it is folded during
/// validation and must then be a positive integer constant.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub kind: TypeKind,
    pub is_array: bool,
    pub array_size: Option<Box<Expr>>,
}

impl Type {
    pub fn new(kind: TypeKind) -> Self {
        Type {
            kind,
            is_array: false,
            array_size: None,
        }
    }

    pub fn void() -> Self {
        Type::new(TypeKind::Void)
    }

    pub fn int() -> Self {
        Type::new(TypeKind::Int)
    }

    pub fn float() -> Self {
        Type::new(TypeKind::Float)
    }

    pub fn char() -> Self {
        Type::new(TypeKind::Char)
    }

    pub fn structure(name: impl Into<String>) -> Self {
        Type::new(TypeKind::Struct(StructRef {
            name: name.into(),
            members: None,
        }))
    }

    pub fn with_array(mut self, size: Option<Expr>) -> Self {
        self.is_array = true;
        self.array_size = size.map(Box::new);
        self
    }

    /// The element type of an array type (or a copy of a scalar type).
    pub fn element(&self) -> Self {
        Type::new(self.kind.clone())
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind, TypeKind::Void)
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Assign,
    // Logical
    Or,
    And,
    // Equality
    Eq,
    Ne,
    // Relational
    Lt,
    Le,
    Gt,
    Ge,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Assign => "=",
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg, // -x
    Not, // !x
}

/// Expression node variants
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Variable(String),
    Constant(Value),
    Cast {
        target_type: Type,
        expr: Box<Expr>,
    },
    FunctionCall {
        name: String,
        args: Vec<Expr>,
    },
    UnaryOp {
        op: UnOp,
        operand: Box<Expr>,
    },
    ArrayAccess {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    MemberAccess {
        object: Box<Expr>,
        member: String,
    },
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// An expression together with its position and, after validation, its type.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub location: SourceLocation,
    pub ty: Option<Type>,
}

impl Expr {
    pub fn new(kind: ExprKind, location: SourceLocation) -> Self {
        Expr {
            kind,
            location,
            ty: None,
        }
    }

    pub fn constant(value: Value, location: SourceLocation) -> Self {
        Expr::new(ExprKind::Constant(value), location)
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr, location: SourceLocation) -> Self {
        Expr::new(
            ExprKind::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            location,
        )
    }

    /// Variable references and index/member accesses may be assigned to.
    pub fn is_lvalue(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Variable(_) | ExprKind::ArrayAccess { .. } | ExprKind::MemberAccess { .. }
        )
    }
}

/// Variable declaration (also used for struct members and function parameters)
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub var_type: Type,
    pub location: SourceLocation,
}

/// Struct declaration
#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: String,
    pub members: Vec<VarDecl>,
    pub location: SourceLocation,
}

/// Function declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<VarDecl>,
    pub body: Block,
    pub location: SourceLocation,
}

/// Top-level declarations
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Struct(StructDecl),
    Function(FunctionDecl),
    Variable(VarDecl),
}

impl Declaration {
    pub fn location(&self) -> SourceLocation {
        match self {
            Declaration::Struct(decl) => decl.location,
            Declaration::Function(decl) => decl.location,
            Declaration::Variable(decl) => decl.location,
        }
    }
}

/// Compound statement: `{ ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub items: Vec<BlockItem>,
    pub location: SourceLocation,
}

/// An entry of a compound statement
#[derive(Debug, Clone, PartialEq)]
pub enum BlockItem {
    Declaration(VarDecl),
    Statement(Stmt),
}

/// Statement node variants
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Block(Block),
    Expression {
        expr: Option<Expr>,
        location: SourceLocation,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        location: SourceLocation,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
        location: SourceLocation,
    },
    For {
        init: Option<Expr>,
        condition: Option<Expr>,
        increment: Option<Expr>,
        body: Box<Stmt>,
        location: SourceLocation,
    },
    Break {
        location: SourceLocation,
    },
    Return {
        expr: Option<Expr>,
        location: SourceLocation,
    },
}

impl Stmt {
    /// Get the source location of this statement
    pub fn location(&self) -> SourceLocation {
        match self {
            Stmt::Block(block) => block.location,
            Stmt::Expression { location, .. } => *location,
            Stmt::If { location, .. } => *location,
            Stmt::While { location, .. } => *location,
            Stmt::For { location, .. } => *location,
            Stmt::Break { location } => *location,
            Stmt::Return { location, .. } => *location,
        }
    }
}

/// A complete translation unit
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub declarations: Vec<Declaration>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }
}
