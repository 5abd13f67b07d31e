// SPDX-License-Identifier: MIT OR Apache-2.0
//! Saving and restoring whole graphs.

use vecspace_graph::catalog::{kinds, UnaryOperator};
use vecspace_graph::snapshot::SNAPSHOT_VERSION;
use vecspace_graph::{
    ConnectionRecord, Context, ContextSnapshot, DisplayMode, GraphError, NodeData, NodeId, PortId,
    Value,
};

struct Demo {
    ctx: Context,
    constant: NodeId,
    square: NodeId,
    vector: NodeId,
    norm: NodeId,
}

fn demo() -> Demo {
    let mut ctx = Context::new();
    let constant = ctx.create_node_with_data(kinds::CONSTANT, NodeData::at(10.0, 20.0)).unwrap();
    let square = ctx.create_node(kinds::UNARY_OPERATOR).unwrap();
    let vector = ctx.create_node(kinds::VECTOR).unwrap();
    let norm = ctx.create_node(kinds::NORM).unwrap();

    ctx.set_input_value(constant, "x", 3.0).unwrap();
    ctx.set_input_value(square, "operator", UnaryOperator::Square).unwrap();
    ctx.set_input_value(vector, "z", 4.0).unwrap();
    for (from, output, to, input) in [
        (constant, "result", square, "x"),
        (square, "result", vector, "y"),
        (vector, "result", norm, "vector"),
    ] {
        let from_port = ctx.output(from, output).unwrap();
        let to_port = ctx.input(to, input).unwrap();
        ctx.create_connection(from_port, to_port).unwrap();
    }

    let mut data = NodeData::at(300.0, 0.0);
    data.display = DisplayMode::Collapsed;
    data.label = Some("length".to_string());
    ctx.set_node_data(norm, data).unwrap();

    Demo {
        ctx,
        constant,
        square,
        vector,
        norm,
    }
}

fn assert_equivalent(original: &Context, restored: &Context) {
    assert_eq!(original.id(), restored.id());
    assert_eq!(original.node_count(), restored.node_count());
    for node in original.nodes() {
        let twin = restored.node(node.id()).unwrap();
        assert_eq!(node.kind(), twin.kind());
        assert_eq!(node.data, twin.data);
        for (port, copy) in node.ports().zip(twin.ports()) {
            assert_eq!(port.id(), copy.id());
            assert_eq!(port.name(), copy.name());
            assert!(port.value().same_as(copy.value()), "{} differs", port.name());
            assert!(port.default_value().same_as(copy.default_value()));
        }
    }
    let links = |ctx: &Context| {
        ctx.connections()
            .map(|c| (c.id, c.from_port, c.to_port))
            .collect::<Vec<_>>()
    };
    assert_eq!(links(original), links(restored));
}

#[test]
fn test_ron_round_trip() {
    let demo = demo();
    let text = demo.ctx.to_ron().unwrap();
    let restored = Context::from_ron(&text).unwrap();
    assert_equivalent(&demo.ctx, &restored);
    assert_eq!(restored.output_value(demo.norm, "result"), Some(&Value::Number(97.0_f64.sqrt())));
}

#[test]
fn test_json_round_trip() {
    let demo = demo();
    let text = demo.ctx.to_json().unwrap();
    assert!(text.contains("\"inputPorts\""));
    assert!(text.contains("\"defaultValue\""));
    let restored = Context::from_json(&text).unwrap();
    assert_equivalent(&demo.ctx, &restored);
}

#[test]
fn test_serialize_defaults_to_ron() {
    let demo = demo();
    let text = demo.ctx.serialize().unwrap();
    assert_eq!(text, demo.ctx.to_ron().unwrap());
    assert!(Context::from_ron(&text).is_ok());
}

#[test]
fn test_restored_graph_is_live() {
    let demo = demo();
    let mut restored = Context::from_ron(&demo.ctx.to_ron().unwrap()).unwrap();

    restored.set_input_value(demo.constant, "x", 2.0).unwrap();
    assert_eq!(restored.output_value(demo.square, "result"), Some(&Value::Number(4.0)));
    assert_eq!(
        restored.output_value(demo.vector, "result"),
        Some(&Value::Vector3([0.0, 4.0, 4.0]))
    );
    assert_eq!(restored.output_value(demo.norm, "result"), Some(&Value::Number(32.0_f64.sqrt())));

    // Restored inputs are still guarded by their connections
    assert!(matches!(
        restored.set_input_value(demo.square, "x", 1.0),
        Err(GraphError::PortConnected(_))
    ));
}

#[test]
fn test_non_finite_values_survive_json() {
    let mut ctx = Context::new();
    let root = ctx.create_node(kinds::UNARY_OPERATOR).unwrap();
    ctx.set_input_value(root, "operator", UnaryOperator::Sqrt).unwrap();
    ctx.set_input_value(root, "x", -4.0).unwrap();
    let constant = ctx.create_node(kinds::CONSTANT).unwrap();
    ctx.set_input_value(constant, "x", f64::INFINITY).unwrap();

    let restored = Context::from_json(&ctx.to_json().unwrap()).unwrap();
    assert!(restored
        .output_value(root, "result")
        .and_then(Value::as_number)
        .is_some_and(f64::is_nan));
    assert_eq!(restored.input_value(constant, "x"), Some(&Value::Number(f64::INFINITY)));
}

#[test]
fn test_empty_context() {
    let ctx = Context::new();
    let restored = Context::from_ron(&ctx.to_ron().unwrap()).unwrap();
    assert_eq!(restored.id(), ctx.id());
    assert_eq!(restored.node_count(), 0);
    assert_eq!(restored.connection_count(), 0);
}

fn rejected(snapshot: ContextSnapshot) -> String {
    match Context::load(snapshot) {
        Err(GraphError::MalformedSnapshot(message)) => message,
        other => panic!("expected a malformed snapshot, got {other:?}"),
    }
}

#[test]
fn test_unknown_kind_is_malformed() {
    let mut snapshot = demo().ctx.snapshot();
    snapshot.nodes[0].kind = "TeapotNode".to_string();
    assert!(rejected(snapshot).contains("TeapotNode"));
}

#[test]
fn test_unknown_port_id_is_malformed() {
    let mut snapshot = demo().ctx.snapshot();
    snapshot.connections.push(ConnectionRecord {
        id: vecspace_graph::ConnectionId::new(),
        from_port_id: PortId::new(),
        to_port_id: snapshot.nodes[0].input_ports["x"].id,
    });
    rejected(snapshot);
}

#[test]
fn test_duplicate_node_id_is_malformed() {
    let mut snapshot = demo().ctx.snapshot();
    let copy = snapshot.nodes[0].clone();
    snapshot.nodes.push(copy);
    assert!(rejected(snapshot).contains("duplicate node id"));
}

#[test]
fn test_duplicate_port_id_is_malformed() {
    let mut snapshot = demo().ctx.snapshot();
    let reused = snapshot.nodes[0].input_ports["x"].id;
    snapshot.nodes[1].input_ports["x"].id = reused;
    assert!(rejected(snapshot).contains("duplicate port id"));
}

#[test]
fn test_newer_version_is_malformed() {
    let mut snapshot = demo().ctx.snapshot();
    snapshot.version = SNAPSHOT_VERSION + 1;
    assert!(rejected(snapshot).contains("newer"));
}

#[test]
fn test_mistyped_value_is_malformed() {
    let mut snapshot = demo().ctx.snapshot();
    snapshot.nodes[0].input_ports["x"].value = Value::Vector3([1.0, 2.0, 3.0]);
    rejected(snapshot);
}

#[test]
fn test_opaque_value_in_typed_port_is_malformed() {
    let demo = demo();
    let mut snapshot = demo.ctx.snapshot();
    let record = snapshot.nodes.iter_mut().find(|n| n.id == demo.constant).unwrap();
    record.input_ports["x"].value = Value::from("junk");
    assert!(rejected(snapshot).contains("opaque"));
}

#[test]
fn test_slider_out_of_range_is_malformed() {
    let mut ctx = Context::new();
    let slider = ctx.create_node(kinds::SLIDER).unwrap();
    ctx.set_input_value(slider, "t", 0.5).unwrap();

    let mut snapshot = ctx.snapshot();
    snapshot.nodes[0].input_ports["t"].value = Value::Number(5.0);
    assert!(rejected(snapshot.clone()).contains("SliderNode.t"));

    snapshot.nodes[0].input_ports["t"].value = Value::Number(0.5);
    snapshot.nodes[0].input_ports["t"].default_value = Value::Number(-1.0);
    rejected(snapshot);
}

#[test]
fn test_unknown_operator_name_is_malformed() {
    let demo = demo();
    let mut snapshot = demo.ctx.snapshot();
    let record = snapshot.nodes.iter_mut().find(|n| n.id == demo.square).unwrap();
    record.input_ports["operator"].value = Value::from("teapot");
    assert!(rejected(snapshot).contains("operator"));
}

#[test]
fn test_unknown_port_name_is_malformed() {
    let mut snapshot = demo().ctx.snapshot();
    let port = snapshot.nodes[0].input_ports["x"].clone();
    snapshot.nodes[0].input_ports.insert("w".to_string(), port);
    snapshot.nodes[0].input_ports.shift_remove("x");
    assert!(rejected(snapshot).contains("\"w\""));
}

#[test]
fn test_cyclic_connections_are_malformed() {
    let demo = demo();
    let mut snapshot = demo.ctx.snapshot();
    let square = snapshot.nodes.iter().find(|n| n.id == demo.square).unwrap();
    let constant = snapshot.nodes.iter().find(|n| n.id == demo.constant).unwrap();
    // constant -> square already exists; square -> constant closes the loop
    snapshot.connections.push(ConnectionRecord {
        id: vecspace_graph::ConnectionId::new(),
        from_port_id: square.output_ports["result"].id,
        to_port_id: constant.input_ports["x"].id,
    });
    rejected(snapshot);
}

#[test]
fn test_occupied_input_is_malformed() {
    let demo = demo();
    let mut snapshot = demo.ctx.snapshot();
    let mut twin = snapshot.connections[0].clone();
    twin.id = vecspace_graph::ConnectionId::new();
    snapshot.connections.push(twin);
    rejected(snapshot);
}

#[test]
fn test_missing_ports_keep_defaults() {
    let demo = demo();
    let mut snapshot = demo.ctx.snapshot();
    let record = snapshot.nodes.iter_mut().find(|n| n.id == demo.vector).unwrap();
    record.input_ports.shift_remove("origin");

    let restored = Context::load(snapshot).unwrap();
    assert_eq!(restored.input_value(demo.vector, "origin"), Some(&Value::Vector3([0.0; 3])));
}

#[test]
fn test_text_errors_are_reported() {
    assert!(matches!(Context::from_ron("not a graph"), Err(GraphError::RonDecode(_))));
    assert!(matches!(Context::from_json("{"), Err(GraphError::Json(_))));
}
