use rigbake_nbt::{Nbt, NbtCompound, NbtList};

fn display_entity_payload() -> NbtCompound {
    NbtCompound::new()
        .with("Tags", NbtList::strings(["rig.node", "rig.node.head"]))
        .with(
            "transformation",
            NbtList::floats([1.0, 0.0, 0.0, 0.5, 0.0, 1.0, 0.0, 1.25, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0]),
        )
        .with("interpolation_duration", 1)
        .with(
            "item",
            NbtCompound::new()
                .with("id", "minecraft:white_dye")
                .with("count", 1i8),
        )
}

/// it should render compounds in insertion order with type suffixes
#[test]
fn compact_rendering_is_ordered_and_suffixed() {
    let text = display_entity_payload().to_string();
    assert_eq!(
        text,
        "{Tags:[\"rig.node\",\"rig.node.head\"],\
transformation:[1f,0f,0f,0.5f,0f,1f,0f,1.25f,0f,0f,1f,0f,0f,0f,0f,1f],\
interpolation_duration:1,\
item:{id:\"minecraft:white_dye\",count:1b}}"
    );
}

/// it should render every numeric subtype with its suffix
#[test]
fn numeric_suffixes() {
    let c = NbtCompound::new()
        .with("b", Nbt::Byte(-3))
        .with("s", Nbt::Short(300))
        .with("i", Nbt::Int(7))
        .with("l", Nbt::Long(9_000_000_000))
        .with("f", Nbt::Float(0.25))
        .with("d", Nbt::Double(1.5))
        .with("flag", true)
        .with("ba", Nbt::ByteArray(vec![1, 2]))
        .with("ia", Nbt::IntArray(vec![-1, 4]));
    assert_eq!(
        c.to_string(),
        "{b:-3b,s:300s,i:7,l:9000000000L,f:0.25f,d:1.5d,flag:1b,ba:[B;1b,2b],ia:[I;-1,4]}"
    );
}

/// it should render the same tree identically every time
#[test]
fn rendering_is_deterministic() {
    let a = display_entity_payload();
    let b = display_entity_payload();
    assert_eq!(a.to_string(), b.to_string());
    assert_eq!(format!("{a:#}"), format!("{b:#}"));
}

/// it should indent nested containers in the alternate form and keep scalar lists inline
#[test]
fn pretty_rendering() {
    let c = NbtCompound::new()
        .with("id", "minecraft:item_display")
        .with(
            "Passengers",
            NbtList::new().with(NbtCompound::new().with("id", "minecraft:text_display")),
        )
        .with("pos", NbtList::doubles([0.0, 1.0, 0.0]));
    let pretty = format!("{c:#}");
    assert_eq!(
        pretty,
        "{\n  id: \"minecraft:item_display\",\n  Passengers: [\n    {\n      id: \"minecraft:text_display\"\n    }\n  ],\n  pos: [0d,1d,0d]\n}"
    );
}

/// it should round-trip through serde without losing key order
#[test]
fn serde_keeps_key_order() {
    let original = display_entity_payload();
    let json = serde_json::to_string(&original).unwrap();
    let back: NbtCompound = serde_json::from_str(&json).unwrap();
    assert_eq!(back.to_string(), original.to_string());
}
