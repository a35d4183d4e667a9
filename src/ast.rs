use crate::error::Span;
use std::fmt;

/// The node kinds a consumer of the tree (the interpreter, or an external
/// code generator) can encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Program,
    FunctionDeclaration,
    VariableDeclaration,
    Parameters,
    Parameter,
    Block,
    ExpressionStatement,
    IfStatement,
    WhileStatement,
    ReturnStatement,
    BinaryExpression,
    UnaryExpression,
    LogicalExpression,
    AssignmentExpression,
    FunctionCall,
    Arguments,
    Identifier,
    NumericLiteral,
    StringLiteral,
    Type,
    ReturnType,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub type_annotation: Option<TypeAnnotation>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeAnnotation>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Function(FunctionDeclaration),
    Variable {
        name: String,
        constant: bool,
        type_annotation: Option<TypeAnnotation>,
        initializer: Option<Expr>,
        span: Span,
    },
    Expression {
        expr: Expr,
        span: Span,
    },
    If {
        condition: Expr,
        then_branch: Block,
        /// `else if` chains are nested as a block holding a single `If`.
        else_branch: Option<Block>,
        span: Span,
    },
    While {
        condition: Expr,
        body: Block,
        span: Span,
    },
    Return {
        value: Option<Expr>,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> &Span {
        match self {
            Stmt::Function(declaration) => &declaration.span,
            Stmt::Variable { span, .. } => span,
            Stmt::Expression { span, .. } => span,
            Stmt::If { span, .. } => span,
            Stmt::While { span, .. } => span,
            Stmt::Return { span, .. } => span,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Stmt::Function(_) => NodeKind::FunctionDeclaration,
            Stmt::Variable { .. } => NodeKind::VariableDeclaration,
            Stmt::Expression { .. } => NodeKind::ExpressionStatement,
            Stmt::If { .. } => NodeKind::IfStatement,
            Stmt::While { .. } => NodeKind::WhileStatement,
            Stmt::Return { .. } => NodeKind::ReturnStatement,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    NumericLiteral {
        value: f64,
        span: Span,
    },
    StringLiteral {
        value: String,
        span: Span,
    },
    Identifier {
        name: String,
        span: Span,
    },
    Assignment {
        name: String,
        value: Box<Expr>,
        span: Span,
    },
    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
        span: Span,
    },
    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Logical {
        left: Box<Expr>,
        operator: LogicalOp,
        right: Box<Expr>,
        span: Span,
    },
    Call {
        callee: String,
        arguments: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::NumericLiteral { span, .. } => span,
            Expr::StringLiteral { span, .. } => span,
            Expr::Identifier { span, .. } => span,
            Expr::Assignment { span, .. } => span,
            Expr::Binary { span, .. } => span,
            Expr::Unary { span, .. } => span,
            Expr::Logical { span, .. } => span,
            Expr::Call { span, .. } => span,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Expr::NumericLiteral { .. } => NodeKind::NumericLiteral,
            Expr::StringLiteral { .. } => NodeKind::StringLiteral,
            Expr::Identifier { .. } => NodeKind::Identifier,
            Expr::Assignment { .. } => NodeKind::AssignmentExpression,
            Expr::Binary { .. } => NodeKind::BinaryExpression,
            Expr::Unary { .. } => NodeKind::UnaryExpression,
            Expr::Logical { .. } => NodeKind::LogicalExpression,
            Expr::Call { .. } => NodeKind::FunctionCall,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl BinaryOp {
    pub fn from_symbol(symbol: &str) -> Option<BinaryOp> {
        Some(match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Subtract,
            "*" => BinaryOp::Multiply,
            "/" => BinaryOp::Divide,
            "%" => BinaryOp::Remainder,
            "==" => BinaryOp::Equal,
            "!=" => BinaryOp::NotEqual,
            "<" => BinaryOp::Less,
            "<=" => BinaryOp::LessEqual,
            ">" => BinaryOp::Greater,
            ">=" => BinaryOp::GreaterEqual,
            _ => return None,
        })
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Remainder => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Negate,
    Not,
}

impl UnaryOp {
    pub fn from_symbol(symbol: &str) -> Option<UnaryOp> {
        Some(match symbol {
            "+" => UnaryOp::Plus,
            "-" => UnaryOp::Negate,
            "!" => UnaryOp::Not,
            _ => return None,
        })
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        }
    }
}

// Indented tree dump, one node per line: `Kind payload`.

fn line(f: &mut fmt::Formatter, depth: usize, kind: NodeKind, payload: &str) -> fmt::Result {
    let indent = "  ".repeat(depth);
    if payload.is_empty() {
        writeln!(f, "{}{}", indent, kind)
    } else {
        writeln!(f, "{}{} {}", indent, kind, payload)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        line(f, 0, NodeKind::Program, "")?;
        for statement in &self.statements {
            statement.write_tree(f, 1)?;
        }
        Ok(())
    }
}

impl Block {
    fn write_tree(&self, f: &mut fmt::Formatter, depth: usize) -> fmt::Result {
        line(f, depth, NodeKind::Block, "")?;
        for statement in &self.statements {
            statement.write_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

impl TypeAnnotation {
    fn write_tree(&self, f: &mut fmt::Formatter, depth: usize, kind: NodeKind) -> fmt::Result {
        line(f, depth, kind, &self.name)
    }
}

impl Stmt {
    fn write_tree(&self, f: &mut fmt::Formatter, depth: usize) -> fmt::Result {
        match self {
            Stmt::Function(declaration) => {
                line(f, depth, self.kind(), &declaration.name)?;
                line(f, depth + 1, NodeKind::Parameters, "")?;
                for parameter in &declaration.parameters {
                    line(f, depth + 2, NodeKind::Parameter, &parameter.name)?;
                    if let Some(annotation) = &parameter.type_annotation {
                        annotation.write_tree(f, depth + 3, NodeKind::Type)?;
                    }
                }
                if let Some(return_type) = &declaration.return_type {
                    return_type.write_tree(f, depth + 1, NodeKind::ReturnType)?;
                }
                declaration.body.write_tree(f, depth + 1)
            }
            Stmt::Variable {
                name,
                constant,
                type_annotation,
                initializer,
                ..
            } => {
                let payload = if *constant {
                    format!("const {}", name)
                } else {
                    name.clone()
                };
                line(f, depth, self.kind(), &payload)?;
                if let Some(annotation) = type_annotation {
                    annotation.write_tree(f, depth + 1, NodeKind::Type)?;
                }
                if let Some(initializer) = initializer {
                    initializer.write_tree(f, depth + 1)?;
                }
                Ok(())
            }
            Stmt::Expression { expr, .. } => {
                line(f, depth, self.kind(), "")?;
                expr.write_tree(f, depth + 1)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                line(f, depth, self.kind(), "")?;
                condition.write_tree(f, depth + 1)?;
                then_branch.write_tree(f, depth + 1)?;
                if let Some(else_branch) = else_branch {
                    else_branch.write_tree(f, depth + 1)?;
                }
                Ok(())
            }
            Stmt::While {
                condition, body, ..
            } => {
                line(f, depth, self.kind(), "")?;
                condition.write_tree(f, depth + 1)?;
                body.write_tree(f, depth + 1)
            }
            Stmt::Return { value, .. } => {
                line(f, depth, self.kind(), "")?;
                if let Some(value) = value {
                    value.write_tree(f, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl Expr {
    fn write_tree(&self, f: &mut fmt::Formatter, depth: usize) -> fmt::Result {
        match self {
            Expr::NumericLiteral { value, .. } => line(f, depth, self.kind(), &value.to_string()),
            Expr::StringLiteral { value, .. } => {
                line(f, depth, self.kind(), &format!("{:?}", value))
            }
            Expr::Identifier { name, .. } => line(f, depth, self.kind(), name),
            Expr::Assignment { name, value, .. } => {
                line(f, depth, self.kind(), name)?;
                value.write_tree(f, depth + 1)
            }
            Expr::Binary {
                left,
                operator,
                right,
                ..
            } => {
                line(f, depth, self.kind(), operator.symbol())?;
                left.write_tree(f, depth + 1)?;
                right.write_tree(f, depth + 1)
            }
            Expr::Unary {
                operator, operand, ..
            } => {
                line(f, depth, self.kind(), operator.symbol())?;
                operand.write_tree(f, depth + 1)
            }
            Expr::Logical {
                left,
                operator,
                right,
                ..
            } => {
                line(f, depth, self.kind(), operator.symbol())?;
                left.write_tree(f, depth + 1)?;
                right.write_tree(f, depth + 1)
            }
            Expr::Call {
                callee, arguments, ..
            } => {
                line(f, depth, self.kind(), callee)?;
                line(f, depth + 1, NodeKind::Arguments, "")?;
                for argument in arguments {
                    argument.write_tree(f, depth + 2)?;
                }
                Ok(())
            }
        }
    }
}
