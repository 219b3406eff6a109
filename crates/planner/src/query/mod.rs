use crate::query::ast::expr::{Expr, Ident};
use model::core::value::Value;

pub mod ast;
pub mod builder;
pub mod conflict;
pub mod dialect;
pub mod renderer;
pub mod translate;

pub fn ident(name: &str) -> Expr {
    Expr::Identifier(Ident {
        qualifier: None,
        name: name.to_string(),
    })
}

pub fn qualified(qualifier: &str, name: &str) -> Expr {
    Expr::Identifier(Ident {
        qualifier: Some(qualifier.to_string()),
        name: name.to_string(),
    })
}

pub fn excluded(name: &str) -> Expr {
    Expr::Excluded(name.to_string())
}

pub fn value(val: Value) -> Expr {
    Expr::Value(val)
}
