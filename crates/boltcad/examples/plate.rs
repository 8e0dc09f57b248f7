//! Mounting plate with bolt passages and a nut trap: basic boltcad usage.

use boltcad::{
    complete, passage, Catalog, Fit, HeadStyle, Orientation, Overrides, Part, PrintSettings,
};

fn main() -> boltcad::Result<()> {
    let catalog = Catalog::iso_metric();
    let settings = PrintSettings::default();
    let size = |name: &str| {
        let index = catalog
            .find(name)
            .ok_or_else(|| boltcad::FastenerError::UnknownSize(name.into()))?;
        complete(&catalog, index, &Overrides::default(), &settings)
    };
    let m4 = size("M4")?;
    let m3 = size("M3")?;

    // Rectangular plate, top face on z = 0
    let thickness = 6.0;
    let plate = Part::cube("plate", 120.0, 80.0, thickness).translate(-60.0, -40.0, -thickness);

    // Four corner holes with the heads sunk into the top face
    let hole = passage(&m4, HeadStyle::Allen, Fit::Loose, thickness, Orientation::Nut, &settings)?
        .translate(0.0, 0.0, -m4.head_passage_length());
    let corners = hole
        .translate(-50.0, -30.0, 0.0)
        .union(&hole.translate(50.0, -30.0, 0.0))
        .union(&hole.translate(-50.0, 30.0, 0.0))
        .union(&hole.translate(50.0, 30.0, 0.0));

    // Center hole traps a hex nut on the top face
    let trap = passage(&m3, HeadStyle::Hex, Fit::Tight, thickness, Orientation::Nut, &settings)?
        .translate(0.0, 0.0, -m3.hex_head_length());

    let part = plate.difference(&corners).difference(&trap).named("plate");

    let json = part.to_document().to_json().expect("document serializes");
    std::fs::write("plate.json", json)?;
    println!("wrote plate.json");
    Ok(())
}
