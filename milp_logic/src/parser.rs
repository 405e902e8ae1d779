extern crate nom;
use std::collections::{btree_map, BTreeMap};

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{alpha1, digit1, multispace0, multispace1},
    combinator::{eof, map, map_res, opt, recognize},
    multi::separated_list0,
    sequence::{delimited, pair, terminated},
    Finish, IResult,
};
use thiserror::Error;

use crate::arithmetic::CmpOp;
use crate::model::{Constraint, LinearExpr, Var};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("syntax error near `{0}`")]
    Syntax(String),
    #[error("unknown operator `{0}`")]
    UnknownOperator(String),
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),
    #[error("`{0}` is declared twice")]
    DuplicateVariable(String),
    #[error("`{0}` is not a binary variable")]
    NotBinary(String),
    #[error("{0} expected")]
    Expected(&'static str),
    #[error("wrong number of arguments for `{0}`")]
    WrongArgCount(String),
    #[error("big-M must be positive, got {0}")]
    NonPositiveBigM(i64),
}

type Result<T> = std::result::Result<T, ParseError>;

#[derive(PartialEq, Eq, Debug)]
enum SyntaxTree<'a> {
    Ident(&'a str),
    Int(i64),
    Node(Vec<SyntaxTree<'a>>),
}

impl<'a> SyntaxTree<'a> {
    fn as_ident(&self) -> Result<&'a str> {
        match self {
            &SyntaxTree::Ident(s) => Ok(s),
            _ => Err(ParseError::Expected("identifier")),
        }
    }

    fn as_int(&self) -> Result<i64> {
        match self {
            &SyntaxTree::Int(n) => Ok(n),
            _ => Err(ParseError::Expected("integer")),
        }
    }

    fn as_node(&self) -> Result<&[SyntaxTree<'a>]> {
        match self {
            SyntaxTree::Node(ch) => Ok(ch),
            _ => Err(ParseError::Expected("list")),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '[' || c == ']' || c == '_' || c == '.'
}

fn parse_to_tree(input: &str) -> std::result::Result<SyntaxTree, nom::error::Error<&str>> {
    fn rec_parser(input: &str) -> IResult<&str, SyntaxTree> {
        let ident = recognize(pair(alpha1, take_while(is_ident_char)));
        let int = map_res(recognize(pair(opt(tag("-")), digit1)), |s: &str| {
            s.parse::<i64>()
        });
        let op = alt((tag("<="), tag(">="), tag("="), tag("+"), tag("-"), tag("*")));
        alt((
            delimited(
                pair(tag("("), multispace0),
                map(separated_list0(multispace1, rec_parser), SyntaxTree::Node),
                pair(multispace0, tag(")")),
            ),
            map(tag("xor-truncated-wordwise"), SyntaxTree::Ident),
            map(tag("xor-truncated"), SyntaxTree::Ident),
            map(ident, SyntaxTree::Ident),
            map(int, SyntaxTree::Int),
            map(op, SyntaxTree::Ident),
        ))(input)
    }

    terminated(delimited(multispace0, rec_parser, multispace0), eof)(input)
        .finish()
        .map(|(_, o)| o)
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Declared {
    Binary(Var),
    Integer(Var),
}

impl Declared {
    pub fn var(self) -> Var {
        match self {
            Declared::Binary(v) | Declared::Integer(v) => v,
        }
    }
}

/// Comparison producing an indicator variable.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Relation {
    Less,
    Leq,
    Greater,
    Geq,
    Eq,
    Neq,
}

#[derive(PartialEq, Eq, Debug)]
pub enum Stmt {
    Relation(Relation, LinearExpr, LinearExpr, Option<i64>),
    And(Vec<Var>),
    Or(Vec<Var>),
    Xor(Vec<Var>, Var),
    XorTruncated(Vec<Var>),
    XorTruncatedWordwise(Vec<Var>),
    Linear(Constraint),
    IfThen(Var, Vec<Constraint>, Option<i64>),
    IfThenElse(Var, Vec<Constraint>, Vec<Constraint>, Option<i64>),
    IfElifElse(Vec<Var>, Vec<Vec<Constraint>>, Vec<Constraint>, Option<i64>),
}

#[derive(Debug)]
pub enum ParseResult<'a> {
    BinVarDecl(&'a str),
    IntVarDecl(&'a str, i64, i64),
    Stmt(Stmt),
}

pub struct VarMap(BTreeMap<String, Declared>);

impl VarMap {
    pub fn new() -> VarMap {
        VarMap(BTreeMap::new())
    }

    pub fn add_binary_var(&mut self, name: &str, var: Var) -> Result<()> {
        self.add(name, Declared::Binary(var))
    }

    pub fn add_integer_var(&mut self, name: &str, var: Var) -> Result<()> {
        self.add(name, Declared::Integer(var))
    }

    fn add(&mut self, name: &str, var: Declared) -> Result<()> {
        if self.0.contains_key(name) {
            return Err(ParseError::DuplicateVariable(String::from(name)));
        }
        self.0.insert(String::from(name), var);
        Ok(())
    }

    pub fn get_var(&self, name: &str) -> Option<Declared> {
        self.0.get(name).copied()
    }

    pub fn iter<'a>(&'a self) -> btree_map::Iter<'a, String, Declared> {
        self.0.iter()
    }

    fn lookup(&self, name: &str) -> Result<Declared> {
        self.get_var(name)
            .ok_or_else(|| ParseError::UndefinedVariable(String::from(name)))
    }

    fn binary(&self, tree: &SyntaxTree) -> Result<Var> {
        let name = tree.as_ident()?;
        match self.lookup(name)? {
            Declared::Binary(v) => Ok(v),
            Declared::Integer(_) => Err(ParseError::NotBinary(String::from(name))),
        }
    }

    fn binaries(&self, trees: &[SyntaxTree]) -> Result<Vec<Var>> {
        trees.iter().map(|t| self.binary(t)).collect()
    }
}

fn optional_big_m(child: &[SyntaxTree], idx: usize, op_name: &str) -> Result<Option<i64>> {
    match child.len() - idx {
        0 => Ok(None),
        1 => {
            let m = child[idx].as_int()?;
            if m <= 0 {
                return Err(ParseError::NonPositiveBigM(m));
            }
            Ok(Some(m))
        }
        _ => Err(ParseError::WrongArgCount(String::from(op_name))),
    }
}

fn expect_len(child: &[SyntaxTree], low: usize, high: usize, op_name: &str) -> Result<()> {
    if low <= child.len() && child.len() <= high {
        Ok(())
    } else {
        Err(ParseError::WrongArgCount(String::from(op_name)))
    }
}

/// Parses one statement line. Declarations are returned to the caller, which registers the
/// created variables in `var_map` before the next line is parsed.
pub fn parse<'a>(var_map: &VarMap, input: &'a str) -> Result<ParseResult<'a>> {
    let tree = parse_to_tree(input).map_err(|e| ParseError::Syntax(String::from(e.input)))?;
    let child = tree.as_node()?;
    if child.is_empty() {
        return Err(ParseError::Expected("statement"));
    }
    let op_name = child[0].as_ident()?;

    let stmt = match op_name {
        "bin" => {
            expect_len(child, 2, 2, op_name)?;
            return Ok(ParseResult::BinVarDecl(child[1].as_ident()?));
        }
        "int" => {
            expect_len(child, 4, 4, op_name)?;
            return Ok(ParseResult::IntVarDecl(
                child[1].as_ident()?,
                child[2].as_int()?,
                child[3].as_int()?,
            ));
        }
        "less" | "leq" | "greater" | "geq" | "eq" | "neq" => {
            expect_len(child, 3, 4, op_name)?;
            let relation = match op_name {
                "less" => Relation::Less,
                "leq" => Relation::Leq,
                "greater" => Relation::Greater,
                "geq" => Relation::Geq,
                "eq" => Relation::Eq,
                _ => Relation::Neq,
            };
            Stmt::Relation(
                relation,
                parse_expr(var_map, &child[1])?,
                parse_expr(var_map, &child[2])?,
                optional_big_m(child, 3, op_name)?,
            )
        }
        "and" => Stmt::And(var_map.binaries(&child[1..])?),
        "or" => Stmt::Or(var_map.binaries(&child[1..])?),
        "xor" => {
            if child.len() < 3 {
                return Err(ParseError::WrongArgCount(String::from(op_name)));
            }
            let mut vars = var_map.binaries(&child[1..])?;
            let output = vars.pop().ok_or(ParseError::Expected("output"))?;
            Stmt::Xor(vars, output)
        }
        "xor-truncated" => Stmt::XorTruncated(var_map.binaries(&child[1..])?),
        "xor-truncated-wordwise" => Stmt::XorTruncatedWordwise(var_map.binaries(&child[1..])?),
        "<=" | ">=" | "=" => Stmt::Linear(parse_constraint(var_map, &tree)?),
        "if" => {
            expect_len(child, 3, 4, op_name)?;
            Stmt::IfThen(
                var_map.binary(&child[1])?,
                parse_constraints(var_map, &child[2])?,
                optional_big_m(child, 3, op_name)?,
            )
        }
        "ite" => {
            expect_len(child, 4, 5, op_name)?;
            Stmt::IfThenElse(
                var_map.binary(&child[1])?,
                parse_constraints(var_map, &child[2])?,
                parse_constraints(var_map, &child[3])?,
                optional_big_m(child, 4, op_name)?,
            )
        }
        "cond" => {
            expect_len(child, 3, 4, op_name)?;
            let mut conds = vec![];
            let mut then_lists = vec![];
            for branch in child[1].as_node()? {
                let branch = branch.as_node()?;
                if branch.is_empty() {
                    return Err(ParseError::Expected("branch condition"));
                }
                conds.push(var_map.binary(&branch[0])?);
                then_lists.push(
                    branch[1..]
                        .iter()
                        .map(|t| parse_constraint(var_map, t))
                        .collect::<Result<Vec<_>>>()?,
                );
            }
            Stmt::IfElifElse(
                conds,
                then_lists,
                parse_constraints(var_map, &child[2])?,
                optional_big_m(child, 3, op_name)?,
            )
        }
        _ => return Err(ParseError::UnknownOperator(String::from(op_name))),
    };
    Ok(ParseResult::Stmt(stmt))
}

fn parse_constraints(var_map: &VarMap, tree: &SyntaxTree) -> Result<Vec<Constraint>> {
    tree.as_node()?
        .iter()
        .map(|t| parse_constraint(var_map, t))
        .collect()
}

fn parse_constraint(var_map: &VarMap, tree: &SyntaxTree) -> Result<Constraint> {
    let child = tree.as_node()?;
    if child.len() != 3 {
        return Err(ParseError::Expected("linear constraint"));
    }
    let op = match child[0].as_ident()? {
        "<=" => CmpOp::Le,
        ">=" => CmpOp::Ge,
        "=" => CmpOp::Eq,
        op_name => return Err(ParseError::UnknownOperator(String::from(op_name))),
    };
    Ok(Constraint::new(
        parse_expr(var_map, &child[1])?,
        op,
        parse_expr(var_map, &child[2])?,
    ))
}

fn parse_expr(var_map: &VarMap, tree: &SyntaxTree) -> Result<LinearExpr> {
    match tree {
        &SyntaxTree::Ident(id) => Ok(var_map.lookup(id)?.var().expr()),
        &SyntaxTree::Int(n) => Ok(LinearExpr::constant(n)),
        SyntaxTree::Node(child) => {
            if child.is_empty() {
                return Err(ParseError::Expected("expression"));
            }
            let op_name = child[0].as_ident()?;
            match op_name {
                "+" => {
                    let mut ret = LinearExpr::new();
                    for t in &child[1..] {
                        ret += parse_expr(var_map, t)?;
                    }
                    Ok(ret)
                }
                "-" => match child.len() {
                    2 => Ok(-parse_expr(var_map, &child[1])?),
                    3 => Ok(parse_expr(var_map, &child[1])? - parse_expr(var_map, &child[2])?),
                    _ => Err(ParseError::WrongArgCount(String::from(op_name))),
                },
                "*" => {
                    expect_len(child, 3, 3, op_name)?;
                    match (&child[1], &child[2]) {
                        (&SyntaxTree::Int(c), t) | (t, &SyntaxTree::Int(c)) => {
                            Ok(parse_expr(var_map, t)? * c)
                        }
                        _ => Err(ParseError::Expected("constant factor")),
                    }
                }
                _ => Err(ParseError::UnknownOperator(String::from(op_name))),
            }
        }
    }
}
