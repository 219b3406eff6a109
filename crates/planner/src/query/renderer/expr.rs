use crate::query::{
    ast::expr::{BinaryOp, BinaryOperator, Expr, Ident},
    renderer::{Render, Renderer},
};

impl Render for Expr {
    fn render(&self, r: &mut Renderer) {
        match self {
            Expr::Identifier(ident) => ident.render(r),
            Expr::Excluded(column) => {
                r.sql.push_str(r.dialect.proposed_row());
                r.sql.push('.');
                r.push_identifier(column);
            }
            Expr::Value(val) => r.add_param(val.clone()),
            Expr::Literal(sql) => r.sql.push_str(sql),
            Expr::KeyAccess { column, key } => {
                r.sql.push('(');
                column.render(r);
                r.sql.push_str("->");
                let key = r.dialect.quote_literal(key);
                r.sql.push_str(&key);
                r.sql.push(')');
            }
            Expr::BinaryOp(op) => op.render(r),
            Expr::Not(inner) => {
                r.sql.push_str("(NOT ");
                inner.render(r);
                r.sql.push(')');
            }
            Expr::IsNull { expr, negated } => {
                r.sql.push('(');
                expr.render(r);
                r.sql
                    .push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
                r.sql.push(')');
            }
            Expr::Alias { expr, alias } => {
                expr.render(r);
                r.sql.push_str(" AS ");
                r.push_identifier(alias);
            }
        }
    }
}

impl Render for Ident {
    fn render(&self, r: &mut Renderer) {
        if let Some(qualifier) = &self.qualifier {
            r.push_identifier(qualifier);
            r.sql.push('.');
        }
        r.push_identifier(&self.name);
    }
}

impl Render for BinaryOp {
    fn render(&self, r: &mut Renderer) {
        r.sql.push('(');
        self.left.render(r);

        let op_str = match self.op {
            BinaryOperator::Eq => " = ",
            BinaryOperator::NotEq => " <> ",
            BinaryOperator::Lt => " < ",
            BinaryOperator::LtEq => " <= ",
            BinaryOperator::Gt => " > ",
            BinaryOperator::GtEq => " >= ",
            BinaryOperator::IsDistinctFrom => " IS DISTINCT FROM ",
            BinaryOperator::IsNotDistinctFrom => " IS NOT DISTINCT FROM ",
            BinaryOperator::And => " AND ",
            BinaryOperator::Or => " OR ",
        };
        r.sql.push_str(op_str);

        self.right.render(r);
        r.sql.push(')');
    }
}
