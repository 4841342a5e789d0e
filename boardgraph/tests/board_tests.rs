//! End-to-end board scenarios

use boardgraph::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

fn bind(board: &mut BoardGraph, component: InstanceId, pin: usize, net: NetId) {
    let pin = board.pin_ref(component, pin).unwrap();
    board.connect_pin_to_net(net, &pin).unwrap();
}

fn place(board: &mut BoardGraph, definition: &str, x: i32, y: i32) -> InstanceId {
    let catalog = ComponentCatalog::builtin();
    board
        .place_definition(catalog.get(definition).unwrap(), GridPosition::new(x, y), 0, None, false)
        .unwrap()
        .instance_id
}

#[test]
fn test_voltage_divider_wiring() {
    let mut board = BoardGraph::default();
    let vin = board.create_net("VIN").net_id;
    let gnd = board.create_net("GND").net_id;
    let vout = board.create_net("VOUT").net_id;

    let source = place(&mut board, "voltage_source", 0, 0);
    bind(&mut board, source, 0, vin);
    bind(&mut board, source, 1, gnd);

    let r1 = place(&mut board, "resistor", 3, 0);
    bind(&mut board, r1, 0, vin);
    bind(&mut board, r1, 1, vout);

    let r2 = place(&mut board, "resistor", 6, 0);
    bind(&mut board, r2, 0, vout);
    bind(&mut board, r2, 1, gnd);

    assert_eq!(board.component_count(), 3);
    assert_eq!(board.net_count(), 3);
    for net in [vin, gnd, vout] {
        assert_eq!(board.net(net).unwrap().pin_count(), 2);
    }

    let stats = board.stats();
    assert_eq!(stats.connected_pin_count, 6);
    assert_eq!(stats.unconnected_pin_count, 0);

    let result = BoardCheck::check_board(&board, "divider", &CheckOptions::default());
    assert!(result.passed(), "unexpected issues: {:?}", result.issues);
}

#[test]
fn test_removing_component_drops_its_trace_and_net() {
    let mut board = BoardGraph::default();
    let sig = board.create_net("SIG").net_id;

    let a = place(&mut board, "resistor", 0, 0);
    let b = place(&mut board, "resistor", 4, 0);
    bind(&mut board, a, 1, sig);
    bind(&mut board, b, 0, sig);

    let a_pin = board.pin_ref(a, 1).unwrap().world_position;
    let b_pin = board.pin_ref(b, 0).unwrap().world_position;
    board.add_trace(sig, a_pin, b_pin).unwrap();
    assert_eq!(board.trace_count(), 1);

    assert!(board.remove_component(a));

    assert_eq!(board.trace_count(), 0);
    assert!(board.net(sig).is_none());
    assert!(board.component(b).unwrap().pins.iter().all(|p| !p.is_connected()));
    assert!(!board.is_position_occupied(GridPosition::ORIGIN));
}

#[test]
fn test_content_bounds_cover_far_pin() {
    let mut board = BoardGraph::with_bounds(Bounds::from_size(4, 4));
    assert_eq!(board.compute_content_bounds(), Bounds::from_size(4, 4));

    // resistor at (6,5) puts its right pin on (7,5)
    place(&mut board, "resistor", 6, 5);

    let bounds = board.compute_content_bounds();
    assert!(bounds.max_x >= 8);
    assert!(bounds.max_y >= 6);
    assert!(bounds.contains(GridPosition::new(7, 5)));
}

#[test]
fn test_listener_sees_every_change() {
    let seen: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
    let mut board = BoardGraph::default();
    let sink = Rc::clone(&seen);
    board.subscribe(move |_, event| sink.borrow_mut().push(event.kind()));

    let net = board.create_net("N").net_id;
    let r = place(&mut board, "resistor", 0, 0);
    bind(&mut board, r, 0, net);
    board.add_trace(net, GridPosition::new(-1, 0), GridPosition::new(-1, 3)).unwrap();
    assert!(board.remove_component(r));

    assert_eq!(
        *seen.borrow(),
        vec![
            "net_created",
            "component_placed",
            "trace_added",
            "trace_removed",
            "net_removed",
            "component_removed",
        ]
    );
}

#[test]
fn test_snapshot_serializes() {
    let mut board = BoardGraph::default();
    let net = board.create_net("GND").net_id;
    let r = place(&mut board, "resistor", 2, 2);
    bind(&mut board, r, 0, net);

    let json = serde_json::to_value(board.snapshot()).unwrap();
    assert_eq!(json["components"][0]["definition_id"], "resistor");
    assert_eq!(json["nets"][0]["name"], "GND");
}
