//! Build a voltage divider by hand, log every board event and print the
//! resulting SPICE deck.
//!
//! Run with `cargo run -p boardgraph --example voltage_divider`.

use boardgraph::export_netlist;
use boardgraph::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = ComponentCatalog::builtin();
    let mut board = BoardGraph::default();
    board.subscribe(|_, event| println!("event: {}", event.kind()));

    let vin = board.create_net("VIN").net_id;
    let gnd = board.create_net("GND").net_id;
    let vout = board.create_net("VOUT").net_id;

    let parts = [
        ("voltage_source", 0, Some(9.0), [vin, gnd]),
        ("resistor", 3, Some(1_000.0), [vin, vout]),
        ("resistor", 6, Some(2_200.0), [vout, gnd]),
    ];
    for (definition, x, value, nets) in parts {
        let definition = catalog
            .get(definition)
            .ok_or_else(|| format!("missing definition {}", definition))?;
        let id = board
            .place_definition(definition, GridPosition::new(x, 0), 0, value, false)?
            .instance_id;
        for (pin_index, net) in nets.into_iter().enumerate() {
            if let Some(pin) = board.pin_ref(id, pin_index) {
                board.connect_pin_to_net(net, &pin)?;
            }
        }
    }

    let netlist = export_netlist(&board, &catalog)?;
    print!("{}", netlist.to_spice("voltage divider"));
    Ok(())
}
