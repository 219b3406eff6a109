use crate::query::{
    ast::insert::{Arbiter, ConflictClause, Insert, OnConflict},
    renderer::{Render, Renderer},
};

impl Render for Insert {
    fn render(&self, r: &mut Renderer) {
        // 1. INSERT INTO table (...)
        r.sql.push_str("INSERT INTO ");
        r.render_table_ref(&self.table);
        r.sql.push_str(" (");
        let quoted_columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| r.dialect.quote_identifier(c))
            .collect();
        r.sql.push_str(&quoted_columns.join(", "));
        r.sql.push(')');

        // 2. VALUES (...), (...)
        render_values(self, r);

        // 3. ON CONFLICT ...
        if let Some(on_conflict) = &self.on_conflict {
            render_on_conflict(on_conflict, r);
        }

        // 4. RETURNING ...
        if !self.returning.is_empty() {
            r.sql.push_str(" RETURNING ");
            r.render_list(&self.returning);
        }
        r.sql.push(';');
    }
}

fn render_values(insert: &Insert, r: &mut Renderer) {
    r.sql.push_str(" VALUES ");
    for (i, row) in insert.values.iter().enumerate() {
        if i > 0 {
            r.sql.push_str(", ");
        }
        r.sql.push('(');
        r.render_list(row);
        r.sql.push(')');
    }
}

fn render_on_conflict(on_conflict: &OnConflict, r: &mut Renderer) {
    r.sql.push_str(" ON CONFLICT");

    match &on_conflict.arbiter {
        Some(Arbiter::Targets { targets, predicate }) => {
            r.sql.push_str(" (");
            r.render_list(targets);
            r.sql.push(')');
            if let Some(predicate) = predicate {
                r.sql.push_str(" WHERE ");
                predicate.render(r);
            }
        }
        Some(Arbiter::Constraint(name)) => {
            r.sql.push_str(" ON CONSTRAINT ");
            r.push_identifier(name);
        }
        None => {}
    }

    match &on_conflict.action {
        ConflictClause::DoNothing => r.sql.push_str(" DO NOTHING"),
        ConflictClause::DoUpdate {
            assignments,
            condition,
        } => {
            r.sql.push_str(" DO UPDATE SET ");
            for (i, assignment) in assignments.iter().enumerate() {
                if i > 0 {
                    r.sql.push_str(", ");
                }
                r.push_identifier(&assignment.column);
                r.sql.push_str(" = ");
                assignment.value.render(r);
            }
            if let Some(condition) = condition {
                r.sql.push_str(" WHERE ");
                condition.render(r);
            }
        }
    }
}
