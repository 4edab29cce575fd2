//! The abstract syntax tree produced by the [parser](crate::parser).
//!
//! Tagged-variant nodes, matched over in [crate::eval] by structural
//! recursion — no visitor trait, since the variant set is closed.

/// An entire parsed program: an ordered sequence of [Statement]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

/// A brace-delimited, ordered sequence of statements. Also acts as an
/// expression: its value is the value of its last statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let { name: String, value: Expression },
    Return { value: Expression },
    While { condition: Expression, body: Block },
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(String),
    IntegerLit(i64),
    FloatLit(f64),
    BooleanLit(bool),
    StringLit(String),
    ArrayLit(Vec<Expression>),
    HashLit(Vec<(Expression, Expression)>),
    Prefix {
        op: String,
        right: Box<Expression>,
    },
    Infix {
        op: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        then_branch: Block,
        else_branch: Option<Block>,
    },
    FunctionLit {
        params: Vec<String>,
        body: Block,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
    },
    Index {
        collection: Box<Expression>,
        index: Box<Expression>,
    },
    Assign {
        name: String,
        value: Box<Expression>,
    },
}
