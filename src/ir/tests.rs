//! Unit tests for the IR types.

use std::collections::BTreeMap;

use super::*;

fn int_expr(node: u32) -> Expr {
    Expr::new(NodeId(node), ExprKind::IntLiteral(0))
}

#[test]
fn type_display_matches_source_syntax() {
    assert_eq!(Type::Int.to_string(), "Int");
    assert_eq!(Type::Float.to_string(), "Float");
    assert_eq!(Type::Void.to_string(), "Void");
    assert_eq!(
        Type::Fun {
            params: vec![Type::Int, Type::Float],
            ret: Box::new(Type::Int),
        }
        .to_string(),
        "(Int, Float) -> Int"
    );
    assert_eq!(Type::Code { inner: Box::new(Type::Int) }.to_string(), "Code<Int>");
}

#[test]
fn only_int_float_fun_code_are_lowerable() {
    assert!(Type::Int.is_lowerable());
    assert!(Type::Float.is_lowerable());
    assert!(Type::Fun { params: vec![], ret: Box::new(Type::Int) }.is_lowerable());
    assert!(Type::Code { inner: Box::new(Type::Int) }.is_lowerable());
    assert!(!Type::Any.is_lowerable());
    assert!(!Type::Void.is_lowerable());
    assert!(!Type::Parameterized("a".to_string()).is_lowerable());
    assert!(!Type::Instance { cons: "List".to_string(), arg: Box::new(Type::Int) }.is_lowerable());
}

#[test]
fn only_fun_and_code_are_closures() {
    assert!(Type::Fun { params: vec![], ret: Box::new(Type::Int) }.is_closure());
    assert!(Type::Code { inner: Box::new(Type::Int) }.is_closure());
    assert!(!Type::Int.is_closure());
    assert!(!Type::Any.is_closure());
}

fn sample_ir() -> CompilerIR {
    let mut type_table = BTreeMap::new();
    type_table.insert(NodeId(1), Type::Int);

    let mut defuse = BTreeMap::new();
    defuse.insert(DefId(2), DefId(1));

    let mut externs = BTreeMap::new();
    externs.insert(DefId(1), "detect_error".to_string());

    CompilerIR {
        procs: BTreeMap::new(),
        progs: BTreeMap::new(),
        main: Proc {
            scope: Scope {
                id: None,
                body: int_expr(1),
                free: vec![],
                bound: Default::default(),
                persist: vec![],
                children: vec![],
            },
            params: vec![],
        },
        type_table,
        defuse,
        externs,
    }
}

#[test]
fn is_extern_follows_defuse_to_the_definition() {
    let ir = sample_ir();
    assert!(ir.is_extern(DefId(1)));
    assert!(ir.is_extern(DefId(2)));
    assert!(!ir.is_extern(DefId(3)));
}

#[test]
fn type_of_looks_up_the_node_table() {
    let ir = sample_ir();
    assert_eq!(ir.type_of(NodeId(1)), Some(&Type::Int));
    assert_eq!(ir.type_of(NodeId(99)), None);
}

#[test]
fn type_of_def_shares_the_node_id_numbering() {
    let ir = sample_ir();
    assert_eq!(ir.type_of_def(DefId(1)), Some(&Type::Int));
    assert_eq!(ir.type_of_def(DefId(99)), None);
}

#[test]
fn variant_overlay_and_base_ir_key_the_same_scope_id_independently() {
    let base_proc = Proc {
        scope: Scope {
            id: Some(ScopeId(1)),
            body: int_expr(10),
            free: vec![],
            bound: Default::default(),
            persist: vec![],
            children: vec![],
        },
        params: vec![],
    };
    let mut procs = BTreeMap::new();
    procs.insert(ScopeId(1), base_proc);
    let ir = CompilerIR {
        procs,
        progs: BTreeMap::new(),
        main: sample_ir().main,
        type_table: BTreeMap::new(),
        defuse: BTreeMap::new(),
        externs: BTreeMap::new(),
    };

    let overlay_proc = Proc {
        scope: Scope {
            id: Some(ScopeId(1)),
            body: int_expr(20),
            free: vec![],
            bound: Default::default(),
            persist: vec![],
            children: vec![],
        },
        params: vec![],
    };
    let mut variant = Variant::default();
    variant.procs.insert(ScopeId(1), overlay_proc);

    assert_eq!(ir.procs.get(&ScopeId(1)).unwrap().scope.body.node, NodeId(10));
    assert_eq!(variant.procs.get(&ScopeId(1)).unwrap().scope.body.node, NodeId(20));
}
