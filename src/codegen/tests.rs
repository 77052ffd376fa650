//! Unit tests for code generation.
//!
//! Since this crate has no parser (`CompilerIR` is handed in already
//! built), fixtures are hand-assembled `CompilerIR`/`Proc`/`Prog`
//! values rather than parsed from source text.

use std::collections::{BTreeMap, BTreeSet};

use inkwell::context::Context;

use crate::ir::{BinaryOp, CompilerIR, DefId, Expr, ExprKind, NodeId, Proc, Prog, Scope, ScopeId, Type, UnaryOp, Variant};

use super::*;

fn int_type_table(entries: &[(u32, Type)]) -> BTreeMap<NodeId, Type> {
    entries.iter().map(|(n, t)| (NodeId(*n), t.clone())).collect()
}

fn leaf_proc(body: Expr) -> Proc {
    Proc {
        scope: Scope {
            id: None,
            body,
            free: vec![],
            bound: BTreeSet::new(),
            persist: vec![],
            children: vec![],
        },
        params: vec![],
    }
}

fn empty_ir(main_body: Expr, type_table: BTreeMap<NodeId, Type>) -> CompilerIR {
    CompilerIR {
        procs: BTreeMap::new(),
        progs: BTreeMap::new(),
        main: leaf_proc(main_body),
        type_table,
        defuse: BTreeMap::new(),
        externs: BTreeMap::new(),
    }
}

fn root(node: u32, inner: Expr) -> Expr {
    Expr::new(NodeId(node), ExprKind::Root(Box::new(inner)))
}

#[test]
fn compile_emits_main_and_the_runtime_prelude() {
    let context = Context::create();
    let ir = empty_ir(
        root(1, Expr::new(NodeId(2), ExprKind::IntLiteral(42))),
        int_type_table(&[(1, Type::Int), (2, Type::Int)]),
    );
    let emitter = Emitter::new(&context, "test", &ir, None);
    let module = emitter.compile().expect("a bare int literal main should compile");

    assert!(module.get_function("main").is_some());
    for sig in prelude::RUNTIME_EXTERNS {
        assert!(module.get_function(sig.name).is_some(), "missing extern {}", sig.name);
        assert!(
            module.get_function(&format!("{}_wrapper", sig.name)).is_some(),
            "missing wrapper for {}",
            sig.name
        );
    }
}

#[test]
fn let_then_lookup_round_trips_through_a_bound_local() {
    let context = Context::create();
    let def = DefId(100);
    let let_expr = Expr::new(
        NodeId(2),
        ExprKind::Let {
            def,
            value: Box::new(Expr::new(NodeId(3), ExprKind::IntLiteral(7))),
        },
    );
    let lookup = Expr::new(NodeId(4), ExprKind::Lookup(def));
    let seq = Expr::new(NodeId(5), ExprKind::Sequence(Box::new(let_expr), Box::new(lookup)));
    let body = root(1, seq);

    let mut type_table = int_type_table(&[(1, Type::Int), (3, Type::Int), (4, Type::Int), (5, Type::Int)]);
    type_table.insert(NodeId(def.0), Type::Int);

    let mut ir = empty_ir(body, type_table);
    ir.main.scope.bound.insert(def);

    let emitter = Emitter::new(&context, "test", &ir, None);
    emitter.compile().expect("let/lookup of a bound local should compile");
}

#[test]
fn binary_add_on_two_ints_lowers_to_an_integer_op() {
    let context = Context::create();
    let lhs = Expr::new(NodeId(2), ExprKind::IntLiteral(1));
    let rhs = Expr::new(NodeId(3), ExprKind::IntLiteral(2));
    let bin = Expr::new(
        NodeId(4),
        ExprKind::Binary { op: BinaryOp::Add, lhs: Box::new(lhs), rhs: Box::new(rhs) },
    );
    let ir = empty_ir(
        root(1, bin),
        int_type_table(&[(1, Type::Int), (2, Type::Int), (3, Type::Int), (4, Type::Int)]),
    );
    let emitter = Emitter::new(&context, "test", &ir, None);
    emitter.compile().expect("int + int should compile");
}

#[test]
fn binary_add_promotes_int_operand_to_float() {
    let context = Context::create();
    let lhs = Expr::new(NodeId(2), ExprKind::IntLiteral(1));
    let rhs = Expr::new(NodeId(3), ExprKind::FloatLiteral(2.5));
    let bin = Expr::new(
        NodeId(4),
        ExprKind::Binary { op: BinaryOp::Add, lhs: Box::new(lhs), rhs: Box::new(rhs) },
    );
    let ir = empty_ir(
        root(1, bin),
        int_type_table(&[(1, Type::Float), (2, Type::Int), (3, Type::Float), (4, Type::Float)]),
    );
    let emitter = Emitter::new(&context, "test", &ir, None);
    emitter.compile().expect("int + float should promote and compile");
}

#[test]
fn binary_op_between_incompatible_types_fails() {
    let context = Context::create();
    let lhs = Expr::new(NodeId(2), ExprKind::IntLiteral(1));
    let rhs = Expr::new(NodeId(3), ExprKind::StringLiteral("x".to_string()));
    let bin = Expr::new(
        NodeId(4),
        ExprKind::Binary { op: BinaryOp::Add, lhs: Box::new(lhs), rhs: Box::new(rhs) },
    );
    let ir = empty_ir(
        root(1, bin),
        int_type_table(&[(1, Type::Int), (2, Type::Int), (3, Type::Any), (4, Type::Int)]),
    );
    let emitter = Emitter::new(&context, "test", &ir, None);
    let err = emitter.compile().expect_err("int + Any should be rejected");
    assert_eq!(err.kind, CodegenErrorKind::IncompatibleOperand);
}

#[test]
fn unary_neg_on_float_compiles() {
    let context = Context::create();
    let operand = Expr::new(NodeId(2), ExprKind::FloatLiteral(3.0));
    let neg = Expr::new(NodeId(3), ExprKind::Unary { op: UnaryOp::Neg, operand: Box::new(operand) });
    let ir = empty_ir(root(1, neg), int_type_table(&[(1, Type::Float), (2, Type::Float), (3, Type::Float)]));
    let emitter = Emitter::new(&context, "test", &ir, None);
    emitter.compile().expect("float negation should compile");
}

#[test]
fn lookup_of_an_unbound_def_fails_with_unknown_variable() {
    let context = Context::create();
    let body = root(1, Expr::new(NodeId(2), ExprKind::Lookup(DefId(999))));
    let ir = empty_ir(body, int_type_table(&[(1, Type::Int)]));
    let emitter = Emitter::new(&context, "test", &ir, None);
    let err = emitter.compile().expect_err("lookup of an undeclared def should fail");
    assert_eq!(err.kind, CodegenErrorKind::UnknownVariable);
}

#[test]
fn quote_referencing_an_unknown_scope_fails() {
    let context = Context::create();
    let body = root(1, Expr::new(NodeId(2), ExprKind::Quote(ScopeId(777))));
    let ir = empty_ir(body, int_type_table(&[(1, Type::Code { inner: Box::new(Type::Int) })]));
    let emitter = Emitter::new(&context, "test", &ir, None);
    let err = emitter.compile().expect_err("quoting a missing scope should fail");
    assert_eq!(err.kind, CodegenErrorKind::UnknownScope);
}

#[test]
fn not_yet_implemented_nodes_fail_with_not_implemented() {
    let context = Context::create();
    let body = root(
        1,
        Expr::new(NodeId(2), ExprKind::If {
            cond: Box::new(Expr::new(NodeId(3), ExprKind::IntLiteral(1))),
            then_branch: Box::new(Expr::new(NodeId(4), ExprKind::IntLiteral(2))),
            else_branch: Box::new(Expr::new(NodeId(5), ExprKind::IntLiteral(3))),
        }),
    );
    let ir = empty_ir(body, int_type_table(&[(1, Type::Int)]));
    let emitter = Emitter::new(&context, "test", &ir, None);
    let err = emitter.compile().expect_err("if is recognized but not implemented");
    assert_eq!(err.kind, CodegenErrorKind::NotImplemented);
}

#[test]
fn fun_and_call_emit_and_invoke_a_proc() {
    let context = Context::create();

    let callee_body = Expr::new(NodeId(10), ExprKind::IntLiteral(7));
    let proc = leaf_proc(callee_body);

    let fun_node = Expr::new(NodeId(20), ExprKind::Fun(ScopeId(1)));
    let call_node = Expr::new(NodeId(21), ExprKind::Call { callee: Box::new(fun_node), args: vec![] });
    let body = root(22, call_node);

    let mut type_table = int_type_table(&[(10, Type::Int), (21, Type::Int), (22, Type::Int)]);
    type_table.insert(NodeId(20), Type::Fun { params: vec![], ret: Box::new(Type::Int) });

    let mut ir = empty_ir(body, type_table);
    ir.procs.insert(ScopeId(1), proc);
    ir.main.scope.children.push(ScopeId(1));

    let emitter = Emitter::new(&context, "test", &ir, None);
    let module = emitter.compile().expect("fun/call of a zero-arg proc should compile");
    assert!(module.get_function("proc1").is_some());
    assert!(module.get_function("main").is_some());
}

#[test]
fn quote_and_run_emit_and_invoke_a_prog() {
    let context = Context::create();

    let quoted_body = Expr::new(NodeId(10), ExprKind::IntLiteral(9));
    let prog = Prog {
        scope: Scope {
            id: None,
            body: quoted_body,
            free: vec![],
            bound: BTreeSet::new(),
            persist: vec![],
            children: vec![],
        },
        owned_persist: vec![],
    };

    let quote_node = Expr::new(NodeId(20), ExprKind::Quote(ScopeId(1)));
    let run_node = Expr::new(NodeId(21), ExprKind::Run(Box::new(quote_node)));
    let body = root(22, run_node);

    let mut type_table = int_type_table(&[(10, Type::Int), (21, Type::Int), (22, Type::Int)]);
    type_table.insert(NodeId(20), Type::Code { inner: Box::new(Type::Int) });

    let mut ir = empty_ir(body, type_table);
    ir.progs.insert(ScopeId(1), prog);
    ir.main.scope.children.push(ScopeId(1));

    let emitter = Emitter::new(&context, "test", &ir, None);
    let module = emitter.compile().expect("quote/run of a zero-capture prog should compile");
    assert!(module.get_function("prog1").is_some());
}

#[test]
fn extern_call_to_a_void_extern_compiles_and_uses_the_wrapper() {
    let context = Context::create();
    let def = DefId(1);
    let call = Expr::new(NodeId(2), ExprKind::ExternCall { def, args: vec![] });
    let body = root(1, call);

    let mut ir = empty_ir(body, int_type_table(&[(1, Type::Void)]));
    ir.externs.insert(def, "detect_error".to_string());

    let emitter = Emitter::new(&context, "test", &ir, None);
    let module = emitter.compile().expect("calling a void extern should compile");
    let main_fn = module.get_function("main").expect("main should exist");
    assert_eq!(main_fn.get_type().get_return_type(), None, "void-bodied main should return void");
}

#[test]
fn lookup_of_an_extern_is_rejected() {
    let context = Context::create();
    let def = DefId(1);
    let body = root(1, Expr::new(NodeId(2), ExprKind::Lookup(def)));
    let mut ir = empty_ir(body, int_type_table(&[(1, Type::Int)]));
    ir.externs.insert(def, "detect_error".to_string());

    let emitter = Emitter::new(&context, "test", &ir, None);
    let err = emitter.compile().expect_err("looking up an extern by value should be rejected");
    assert_eq!(err.kind, CodegenErrorKind::NotImplemented);
}

#[test]
fn persist_on_a_scope_fails_with_not_implemented() {
    let context = Context::create();
    let mut ir = empty_ir(root(1, Expr::new(NodeId(2), ExprKind::IntLiteral(1))), int_type_table(&[(1, Type::Int)]));
    ir.main.scope.persist.push(DefId(5));

    let emitter = Emitter::new(&context, "test", &ir, None);
    let err = emitter.compile().expect_err("a non-empty persist list is not implemented");
    assert_eq!(err.kind, CodegenErrorKind::NotImplemented);
}

#[test]
fn variant_overlay_replaces_the_base_proc_for_a_shared_scope_id() {
    let context = Context::create();

    let base_proc = leaf_proc(Expr::new(NodeId(10), ExprKind::IntLiteral(111)));
    let overlay_proc = leaf_proc(Expr::new(NodeId(11), ExprKind::IntLiteral(222)));

    let fun_node = Expr::new(NodeId(20), ExprKind::Fun(ScopeId(1)));
    let call_node = Expr::new(NodeId(21), ExprKind::Call { callee: Box::new(fun_node), args: vec![] });
    let body = root(22, call_node);

    let mut type_table = int_type_table(&[(10, Type::Int), (11, Type::Int), (21, Type::Int), (22, Type::Int)]);
    type_table.insert(NodeId(20), Type::Fun { params: vec![], ret: Box::new(Type::Int) });

    let mut ir = empty_ir(body, type_table);
    ir.procs.insert(ScopeId(1), base_proc);

    let mut variant = Variant::default();
    variant.procs.insert(ScopeId(1), overlay_proc);

    let emitter = Emitter::new(&context, "test", &ir, Some(&variant));
    let module = emitter.compile().expect("overlaid proc should compile in place of the base one");
    let ir_text = module.print_to_string().to_string();
    assert!(ir_text.contains("222"), "expected the overlay's literal in emitted IR:\n{ir_text}");
    assert!(!ir_text.contains("111"), "base proc's literal should not have been emitted:\n{ir_text}");
}

#[test]
fn nested_procs_each_get_their_own_named_values_scope() {
    // A proc capturing a free variable from main's scope; regression
    // coverage for `ScopeGuard` correctly restoring `named_values` after
    // the inner scope is done being emitted, so main's own locals are
    // still reachable afterward.
    let context = Context::create();
    let captured = DefId(50);

    let inner_lookup = Expr::new(NodeId(10), ExprKind::Lookup(captured));
    let inner_scope = Scope {
        id: Some(ScopeId(1)),
        body: inner_lookup,
        free: vec![captured],
        bound: BTreeSet::new(),
        persist: vec![],
        children: vec![],
    };
    let proc = Proc { scope: inner_scope, params: vec![] };

    let fun_node = Expr::new(NodeId(20), ExprKind::Fun(ScopeId(1)));
    let call_node = Expr::new(NodeId(21), ExprKind::Call { callee: Box::new(fun_node), args: vec![] });
    let outer_lookup = Expr::new(NodeId(23), ExprKind::Lookup(captured));
    let seq = Expr::new(NodeId(24), ExprKind::Sequence(Box::new(call_node), Box::new(outer_lookup)));
    let body = root(22, seq);

    let mut type_table = int_type_table(&[
        (10, Type::Int),
        (21, Type::Int),
        (22, Type::Int),
        (23, Type::Int),
        (24, Type::Int),
        (50, Type::Int),
    ]);
    type_table.insert(NodeId(20), Type::Fun { params: vec![], ret: Box::new(Type::Int) });

    let mut ir = empty_ir(body, type_table);
    ir.main.scope.bound.insert(captured);
    ir.main.scope.children.push(ScopeId(1));
    ir.procs.insert(ScopeId(1), proc);

    let emitter = Emitter::new(&context, "test", &ir, None);
    emitter
        .compile()
        .expect("main's captured local should still resolve after the inner proc is emitted");
}
