//! Abstract environment expressions and their compilation.
//!
//! An [`AbstractExpr`] tree is built once by the property-definition front
//! end, then compiled by [`construct`]: children before parents, every
//! operand checked against the type its position requires, and one
//! [`ResolvedExpr`] emitted per node. The emitted fragments name the
//! runtime environment operations (`envs.get`, `envs.orphan`, ...); nothing
//! here executes them.

use std::rc::Rc;

use loft_types::TypeTag;

use crate::context::ConstructCtx;
use crate::error::{ConstructError, ConstructResult};
use crate::resolved::ResolvedExpr;

// ══════════════════════════════════════════════════════════════════════════════
// AbstractExpr
// ══════════════════════════════════════════════════════════════════════════════

/// One not-yet-compiled environment operation.
///
/// Nodes are immutable once built and may be shared read-only between
/// several trees (children are held by [`Rc`]); the construction API cannot
/// produce a cycle.
#[derive(Debug)]
pub enum AbstractExpr {
    /// The environment currently in effect, resolved at construct time
    /// through the context's binding stack.
    CurrentEnv,
    /// The distinguished empty environment.
    EmptyEnv,
    /// An operand compiled by the host's own expression compiler: a
    /// variable with a known static type.
    Var {
        /// Generated-code name of the variable.
        name: String,
        /// Its static type.
        ty: TypeTag,
    },
    /// Environment lookup, either all elements or just the first one.
    Get {
        env: Rc<AbstractExpr>,
        key: Rc<AbstractExpr>,
        /// Take the first element instead of the whole result sequence.
        /// No disambiguation is applied; the first match wins.
        resolve_unique: bool,
    },
    /// Evaluate `inner` with the current-environment placeholder bound to
    /// the value of `env`.
    EvalInEnv {
        env: Rc<AbstractExpr>,
        inner: Rc<AbstractExpr>,
    },
    /// A copy of `env` with its parent link severed.
    Orphan { env: Rc<AbstractExpr> },
    /// A composite environment over a fixed list of operands.
    Group { envs: Vec<Rc<AbstractExpr>> },
    /// A composite environment over a runtime sequence of environments.
    GroupArray { envs: Rc<AbstractExpr> },
    /// Whether `referenced`'s owning unit is visible from `base`'s.
    IsVisibleFrom {
        referenced: Rc<AbstractExpr>,
        base: Rc<AbstractExpr>,
    },
    /// The AST node owning an environment.
    NodeOf { env: Rc<AbstractExpr> },
}

thread_local! {
    // The two placeholder leaves are singletons: every tree shares the same
    // node, mirroring their singleton meaning.
    static CURRENT_ENV: Rc<AbstractExpr> = Rc::new(AbstractExpr::CurrentEnv);
    static EMPTY_ENV: Rc<AbstractExpr> = Rc::new(AbstractExpr::EmptyEnv);
}

impl AbstractExpr {
    /// The current-environment placeholder.
    pub fn current_env() -> Rc<Self> {
        CURRENT_ENV.with(Rc::clone)
    }

    /// The empty-environment placeholder.
    pub fn empty_env() -> Rc<Self> {
        EMPTY_ENV.with(Rc::clone)
    }

    /// An operand supplied by the host's expression compiler.
    pub fn var(name: impl Into<String>, ty: TypeTag) -> Rc<Self> {
        Rc::new(Self::Var {
            name: name.into(),
            ty,
        })
    }

    /// Look up `key` in `env`, yielding the whole element sequence.
    pub fn get(env: Rc<Self>, key: Rc<Self>) -> Rc<Self> {
        Rc::new(Self::Get {
            env,
            key,
            resolve_unique: false,
        })
    }

    /// Look up `key` in `env`, yielding the first element only.
    pub fn resolve_unique(env: Rc<Self>, key: Rc<Self>) -> Rc<Self> {
        Rc::new(Self::Get {
            env,
            key,
            resolve_unique: true,
        })
    }

    /// Evaluate `inner` with the current-environment placeholder bound to
    /// the value of `env`.
    pub fn eval_in_env(env: Rc<Self>, inner: Rc<Self>) -> Rc<Self> {
        Rc::new(Self::EvalInEnv { env, inner })
    }

    /// A copy of `env` without its parent.
    pub fn orphan(env: Rc<Self>) -> Rc<Self> {
        Rc::new(Self::Orphan { env })
    }

    /// Overlay a fixed list of environments, first operand first.
    pub fn group(envs: Vec<Rc<Self>>) -> Rc<Self> {
        Rc::new(Self::Group { envs })
    }

    /// Overlay a runtime sequence of environments.
    pub fn group_array(envs: Rc<Self>) -> Rc<Self> {
        Rc::new(Self::GroupArray { envs })
    }

    /// Whether `referenced`'s owning unit is visible from `base`'s.
    pub fn is_visible_from(referenced: Rc<Self>, base: Rc<Self>) -> Rc<Self> {
        Rc::new(Self::IsVisibleFrom { referenced, base })
    }

    /// The AST node owning `env`.
    pub fn node_of(env: Rc<Self>) -> Rc<Self> {
        Rc::new(Self::NodeOf { env })
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// construct
// ══════════════════════════════════════════════════════════════════════════════

/// Compile an abstract expression tree into a resolved expression.
///
/// When `expected` is given, the result's static type must match it exactly;
/// a mismatch is a [`ConstructError::TypeMismatch`], never a coercion.
pub fn construct(
    node: &AbstractExpr,
    expected: Option<&TypeTag>,
    ctx: &mut ConstructCtx,
) -> ConstructResult<ResolvedExpr> {
    let resolved = construct_node(node, ctx)?;
    if let Some(expected) = expected {
        if resolved.ty() != expected {
            return Err(ConstructError::TypeMismatch {
                position: "constructed expression".to_owned(),
                expected: expected.clone(),
                actual: resolved.ty().clone(),
            });
        }
    }
    Ok(resolved)
}

/// Construct one operand and check it against the type its position
/// requires.
fn operand(
    node: &AbstractExpr,
    expected: TypeTag,
    position: &str,
    ctx: &mut ConstructCtx,
) -> ConstructResult<ResolvedExpr> {
    let resolved = construct_node(node, ctx)?;
    if *resolved.ty() != expected {
        return Err(ConstructError::TypeMismatch {
            position: position.to_owned(),
            expected,
            actual: resolved.ty().clone(),
        });
    }
    Ok(resolved)
}

fn construct_node(node: &AbstractExpr, ctx: &mut ConstructCtx) -> ConstructResult<ResolvedExpr> {
    match node {
        AbstractExpr::CurrentEnv => match ctx.current_env() {
            Some(var) => Ok(ResolvedExpr::literal(TypeTag::LexicalEnv, var)),
            None => Err(ConstructError::UnboundCurrentEnv),
        },
        AbstractExpr::EmptyEnv => Ok(ResolvedExpr::literal(
            TypeTag::LexicalEnv,
            "envs.empty_env",
        )),
        AbstractExpr::Var { name, ty } => Ok(ResolvedExpr::literal(ty.clone(), name)),
        AbstractExpr::Get {
            env,
            key,
            resolve_unique,
        } => construct_get(env, key, *resolve_unique, ctx),
        AbstractExpr::EvalInEnv { env, inner } => construct_eval_in_env(env, inner, ctx),
        AbstractExpr::Orphan { env } => construct_orphan(env, ctx),
        AbstractExpr::Group { envs } => construct_group(envs, ctx),
        AbstractExpr::GroupArray { envs } => construct_group_array(envs, ctx),
        AbstractExpr::IsVisibleFrom { referenced, base } => {
            construct_is_visible_from(referenced, base, ctx)
        }
        AbstractExpr::NodeOf { env } => construct_node_of(env, ctx),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Per-variant emission
// ══════════════════════════════════════════════════════════════════════════════

fn construct_get(
    env: &AbstractExpr,
    key: &AbstractExpr,
    resolve_unique: bool,
    ctx: &mut ConstructCtx,
) -> ConstructResult<ResolvedExpr> {
    let env = operand(env, TypeTag::LexicalEnv, "environment operand of get", ctx)?;
    let key = operand(key, TypeTag::Symbol, "key operand of get", ctx)?;

    let call = format!("envs.get({}, {})", env.render_expr(), key.render_expr());
    let (ty, value) = if resolve_unique {
        (TypeTag::Element, format!("get_at({call}, 0)"))
    } else {
        // The full-result form hands the back end an element array, so the
        // array type must exist in the generated runtime.
        ctx.register_array_type(TypeTag::Element);
        (
            TypeTag::array_of(TypeTag::Element),
            format!("create_array({call})"),
        )
    };

    let var = ctx.fresh_var("env_get_result");
    Ok(bound_expr(ty, vec![env, key], value, var))
}

fn construct_eval_in_env(
    env: &AbstractExpr,
    inner: &AbstractExpr,
    ctx: &mut ConstructCtx,
) -> ConstructResult<ResolvedExpr> {
    let env = operand(
        env,
        TypeTag::LexicalEnv,
        "environment operand of eval_in_env",
        ctx,
    )?;

    // Store the bound environment in a fresh local and keep it alive for
    // the whole nested evaluation: the inc_ref is paired with a deferred
    // release that runs on every exit path of the enclosing scope.
    let env_var = ctx.fresh_var("new_env");
    let ResolvedExpr {
        pre: mut preamble,
        expr: env_value,
        ..
    } = env;
    preamble.push(format!("{env_var} = {env_value};"));
    preamble.push(format!("inc_ref({env_var});"));
    preamble.push(format!("defer dec_ref({env_var});"));

    // The inner expression is compiled under the binding; its own expected
    // type, if any, is the caller's concern.
    let inner = ctx.bind_env(&env_var, |ctx| construct_node(inner, ctx))?;

    let ResolvedExpr {
        ty,
        pre: inner_pre,
        expr,
        ..
    } = inner;
    preamble.extend(inner_pre);

    Ok(ResolvedExpr {
        ty,
        pre: preamble,
        expr,
        result_var: Some(env_var),
    })
}

fn construct_orphan(env: &AbstractExpr, ctx: &mut ConstructCtx) -> ConstructResult<ResolvedExpr> {
    let env = operand(env, TypeTag::LexicalEnv, "environment operand of orphan", ctx)?;
    let value = format!("envs.orphan({})", env.render_expr());
    let var = ctx.fresh_var("orphan_env");
    Ok(bound_expr(TypeTag::LexicalEnv, vec![env], value, var))
}

fn construct_group(
    envs: &[Rc<AbstractExpr>],
    ctx: &mut ConstructCtx,
) -> ConstructResult<ResolvedExpr> {
    let mut operands = Vec::with_capacity(envs.len());
    for (position, env) in envs.iter().enumerate() {
        operands.push(operand(
            env,
            TypeTag::LexicalEnv,
            &format!("group operand {position}"),
            ctx,
        )?);
    }

    // Fixed arity: the member list is known here, so it can be emitted as
    // a literal sequence.
    let members = operands
        .iter()
        .map(ResolvedExpr::render_expr)
        .collect::<Vec<_>>()
        .join(", ");
    let value = format!("envs.group([{members}])");
    let var = ctx.fresh_var("group_env");
    Ok(bound_expr(TypeTag::LexicalEnv, operands, value, var))
}

fn construct_group_array(
    envs: &AbstractExpr,
    ctx: &mut ConstructCtx,
) -> ConstructResult<ResolvedExpr> {
    // Dynamic arity: the member sequence only exists at the generated
    // artifact's runtime, so it is passed through as-is.
    let envs = operand(
        envs,
        TypeTag::array_of(TypeTag::LexicalEnv),
        "environment-array operand of group",
        ctx,
    )?;
    let value = format!("envs.group({})", envs.render_expr());
    let var = ctx.fresh_var("group_env");
    Ok(bound_expr(TypeTag::LexicalEnv, vec![envs], value, var))
}

fn construct_is_visible_from(
    referenced: &AbstractExpr,
    base: &AbstractExpr,
    ctx: &mut ConstructCtx,
) -> ConstructResult<ResolvedExpr> {
    let base = operand(
        base,
        TypeTag::LexicalEnv,
        "base-environment operand of is_visible_from",
        ctx,
    )?;
    let referenced = operand(
        referenced,
        TypeTag::LexicalEnv,
        "referenced-environment operand of is_visible_from",
        ctx,
    )?;

    // Call-site operand order is (base, referenced).
    let value = format!(
        "envs.is_visible_from({}, {})",
        base.render_expr(),
        referenced.render_expr()
    );
    Ok(call_expr(TypeTag::Bool, vec![base, referenced], value))
}

fn construct_node_of(env: &AbstractExpr, ctx: &mut ConstructCtx) -> ConstructResult<ResolvedExpr> {
    let env = operand(
        env,
        TypeTag::LexicalEnv,
        "environment operand of node_of",
        ctx,
    )?;
    let value = format!("{}.node", env.render_expr());
    Ok(call_expr(TypeTag::Node, vec![env], value))
}

// ══════════════════════════════════════════════════════════════════════════════
// Emission helpers
// ══════════════════════════════════════════════════════════════════════════════

/// Concatenate the operands' preambles and yield `value` directly.
fn call_expr(ty: TypeTag, operands: Vec<ResolvedExpr>, value: String) -> ResolvedExpr {
    ResolvedExpr {
        ty,
        pre: collect_preambles(operands),
        expr: value,
        result_var: None,
    }
}

/// Concatenate the operands' preambles, assign `value` into `var`, and
/// yield the variable.
fn bound_expr(ty: TypeTag, operands: Vec<ResolvedExpr>, value: String, var: String) -> ResolvedExpr {
    let mut pre = collect_preambles(operands);
    pre.push(format!("{var} = {value};"));
    ResolvedExpr {
        ty,
        pre,
        expr: var.clone(),
        result_var: Some(var),
    }
}

fn collect_preambles(operands: Vec<ResolvedExpr>) -> Vec<String> {
    operands
        .into_iter()
        .flat_map(|resolved| resolved.pre)
        .collect()
}
