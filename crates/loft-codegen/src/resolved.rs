//! The resolved (compiled) form of one expression.

use loft_types::TypeTag;
use serde::Serialize;

/// A statically typed, side-effect-annotated compiled expression.
///
/// The preamble is an ordered list of statements (temporary declarations,
/// reference-count adjustments) that must run before the value fragment is
/// evaluated. The rendering back end turns both into generated source text;
/// this core never executes them.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedExpr {
    pub(crate) ty: TypeTag,
    pub(crate) pre: Vec<String>,
    pub(crate) expr: String,
    pub(crate) result_var: Option<String>,
}

impl ResolvedExpr {
    /// A fragment with no preamble and no result variable.
    pub(crate) fn literal(ty: TypeTag, expr: impl Into<String>) -> Self {
        Self {
            ty,
            pre: Vec::new(),
            expr: expr.into(),
            result_var: None,
        }
    }

    /// The static type of the value fragment.
    pub fn ty(&self) -> &TypeTag {
        &self.ty
    }

    /// The preamble statements, in execution order.
    pub fn preamble(&self) -> &[String] {
        &self.pre
    }

    /// The fresh local holding an intermediate value, if one was allocated.
    pub fn result_var(&self) -> Option<&str> {
        self.result_var.as_deref()
    }

    /// Render the preamble as newline-separated statements.
    pub fn render_pre(&self) -> String {
        self.pre.join("\n")
    }

    /// The value fragment.
    pub fn render_expr(&self) -> &str {
        &self.expr
    }
}
