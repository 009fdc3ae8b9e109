use super::{
    error::RollError,
    pool::{self, Pool},
    record::RollRecords,
    RResult,
};
use crate::parse::{
    ast::{self, Expression},
    visit::{Accept, AstVisitor},
};
use nu_ansi_term::Color;

const INDENT: &str = "    ";

/// What a traced value came from, so stringifiers can style them apart.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ValueKind {
    Constant,
    Rolled,
    Computed,
}

/// Renders the lines of a roll trace. Override the `paint_*` hooks to style them.
pub trait Stringify {
    fn paint_label(&self, label: String) -> String {
        label
    }

    fn paint_values(&self, _kind: ValueKind, values: String) -> String {
        values
    }

    fn paint_total(&self, total: String) -> String {
        total
    }

    /// `label : v1, v2 = total`, omitting the total for single values.
    fn str_line(&self, label: String, kind: ValueKind, pool: &Pool) -> RResult<String> {
        let mut ret = format!(
            "{} : {}",
            self.paint_label(label),
            self.paint_values(kind, pool.to_string())
        );
        if pool.len() > 1 {
            let total = pool.total().ok_or_else(|| RollError::internal("traced pool overflowed"))?;
            ret.push_str(" = ");
            ret.push_str(&self.paint_total(total.to_string()));
        }
        Ok(ret)
    }

    fn str_expression(&self, expr: &Expression, records: &RollRecords) -> RResult<String> {
        let traced = expr.accept(&mut Tracer { records, style: self })?;
        let total = pool::total(&traced.pool, expr)?;

        let mut ret = format!("{} = {}", expr, self.paint_total(total.to_string()));
        for line in traced.lines {
            ret.push('\n');
            ret.push_str(INDENT);
            ret.push_str(&line);
        }
        Ok(ret)
    }
}

/// Unstyled trace text.
#[derive(Debug, Default, Copy, Clone)]
pub struct PlainStringifier;

impl Stringify for PlainStringifier {}

/// Trace text coloured for a terminal.
#[derive(Debug, Default, Copy, Clone)]
pub struct AnsiStringifier;

impl Stringify for AnsiStringifier {
    fn paint_label(&self, label: String) -> String {
        Color::LightYellow.paint(label).to_string()
    }

    fn paint_values(&self, kind: ValueKind, values: String) -> String {
        let color = match kind {
            ValueKind::Constant => Color::LightPurple,
            ValueKind::Rolled => Color::LightCyan,
            ValueKind::Computed => Color::LightGreen,
        };
        color.paint(values).to_string()
    }

    fn paint_total(&self, total: String) -> String {
        Color::LightGreen.bold().paint(total).to_string()
    }
}

struct Traced {
    pool: Pool,
    lines: Vec<String>,
}

impl Traced {
    fn new(pool: Pool, line: String, children: Vec<Traced>) -> Self {
        let mut lines = vec![line];
        for child in children {
            lines.extend(child.lines.into_iter().map(|l| format!("{}{}", INDENT, l)));
        }
        Self { pool, lines }
    }
}

/// Replays an evaluation from its records; never touches a roller.
struct Tracer<'r, S: ?Sized> {
    records: &'r RollRecords,
    style: &'r S,
}

impl<S: Stringify + ?Sized> Tracer<'_, S> {
    fn line(&self, label: String, kind: ValueKind, pool: Pool, children: Vec<Traced>) -> RResult<Traced> {
        let line = self.style.str_line(label, kind, &pool)?;
        Ok(Traced::new(pool, line, children))
    }
}

impl<S: Stringify + ?Sized> AstVisitor for Tracer<'_, S> {
    type Output = RResult<Traced>;

    fn visit_literal(&mut self, x: &ast::Literal) -> Self::Output {
        self.line("const".into(), ValueKind::Constant, Pool::single(x.value), vec![])
    }

    fn visit_dice(&mut self, dice: &ast::DiceRoll) -> Self::Output {
        let record = self
            .records
            .get(dice.id)
            .ok_or_else(|| RollError::internal(format!("no roll recorded for {} (node {})", dice, dice.id)))?;

        if record.count != dice.count || record.sides != dice.sides || record.results.len() != dice.count.get() as usize {
            return Err(RollError::internal(format!(
                "roll recorded for node {} does not match {}",
                dice.id, dice
            )));
        }

        self.line(dice.to_string(), ValueKind::Rolled, Pool::from(record), vec![])
    }

    fn visit_binary(&mut self, bin: &ast::BinaryOp) -> Self::Output {
        let left = self.visit(&*bin.left)?;
        let right = self.visit(&*bin.right)?;
        let pool = pool::binary(bin, &left.pool, &right.pool).map_err(replay_error)?;
        self.line(bin.op.name().into(), ValueKind::Computed, pool, vec![left, right])
    }

    fn visit_call(&mut self, call: &ast::FunctionCall) -> Self::Output {
        let args = call
            .args
            .iter()
            .map(|node| self.visit(node))
            .collect::<RResult<Vec<_>>>()?;
        let pools = args.iter().map(|arg| arg.pool.clone()).collect();
        let pool = pool::call(call, pools).map_err(replay_error)?;
        self.line(call.function.to_string(), ValueKind::Computed, pool, args)
    }
}

// Records from a successful evaluation always replay cleanly.
fn replay_error(err: RollError) -> RollError {
    match err {
        RollError::Internal(_) => err,
        other => RollError::internal(format!("recorded rolls do not replay: {}", other)),
    }
}

/// Renders a plain-text trace of an evaluated expression.
///
/// # Errors
/// Returns [`RollError::Internal`] if `records` does not hold a matching
/// record for every dice node in `expr`.
pub fn format_trace(expr: &Expression, records: &RollRecords) -> RResult<String> {
    PlainStringifier.str_expression(expr, records)
}
