use rigbake_core::{
    compile, compile_blueprint, AnimationSource, BakeConfig, BakeError, Blueprint, CommandKey,
    CompileOutput, InterpolationMarker, NodeKind, Rig, RigNode,
};
use uuid::Uuid;

fn compile_fixture(name: &str) -> CompileOutput {
    let json = rigbake_test_fixtures::blueprints::json(name).expect("load blueprint fixture");
    let blueprint = Blueprint::from_json(&json).expect("parse blueprint");
    compile_blueprint(blueprint).expect("compile blueprint")
}

fn contents(out: &CompileOutput, path: &str) -> String {
    out.datapack
        .contents(path)
        .unwrap_or_else(|| panic!("missing {path}"))
}

const HEAD: Uuid = Uuid::from_u128(2);

/// it should produce byte-identical files and identical trees when compiled twice
#[test]
fn compile_is_deterministic() {
    let a = compile_fixture("wolf");
    let b = compile_fixture("wolf");
    assert_eq!(a.datapack, b.datapack);
    let a_paths: Vec<_> = a.datapack.paths().collect();
    let b_paths: Vec<_> = b.datapack.paths().collect();
    assert_eq!(a_paths, b_paths);
    for path in a_paths {
        assert_eq!(a.datapack.contents(path), b.datapack.contents(path), "{path}");
    }
    for (x, y) in a.animations.iter().zip(&b.animations) {
        assert_eq!(x.tree, y.tree);
    }
}

/// it should never emit a no-op frame or repeat a node's previous transform
#[test]
fn frames_are_sparse() {
    let out = compile_fixture("wolf");
    for anim in &out.animations {
        let mut last: std::collections::HashMap<Uuid, [f64; 16]> = Default::default();
        for frame in &anim.descriptor.frames {
            assert!(!frame.is_empty(), "{} tick {}", anim.descriptor.name, frame.tick);
            for (uuid, entry) in &frame.nodes {
                if entry.effect.is_none() {
                    assert_ne!(
                        last.get(uuid),
                        Some(&entry.transform.matrix),
                        "{} re-emitted node {uuid} at tick {}",
                        anim.descriptor.name,
                        frame.tick
                    );
                }
                last.insert(*uuid, entry.transform.matrix);
            }
        }
    }
}

/// it should mark step arrivals and stacked keys as instant and write duration 0
#[test]
fn instant_transitions_skip_interpolation() {
    let out = compile_fixture("wolf");
    let bark = &out.animation("Bark").unwrap().descriptor;

    let step = bark.frame_at(5).unwrap();
    assert_eq!(step.nodes[&HEAD].transform.marker, InterpolationMarker::Step);
    let stacked = bark.frame_at(10).unwrap();
    assert_eq!(stacked.nodes[&HEAD].transform.marker, InterpolationMarker::PrePost);
    // The head's children inherit the instant marker.
    let tag = Uuid::from_u128(7);
    assert_eq!(stacked.nodes[&tag].transform.marker, InterpolationMarker::PrePost);

    let text = contents(&out, "data/wolf/function/animations/bark/frames/10.mcfunction");
    assert!(text.contains("tag=wolf.node.head] run data merge entity @s {transformation:["));
    assert!(text.contains("start_interpolation:-1,interpolation_duration:0}"));

    // The next regular emission restores the default duration.
    let next = bark
        .frames
        .iter()
        .find(|f| f.tick > 10 && f.nodes.contains_key(&HEAD))
        .unwrap();
    let text = contents(
        &out,
        &format!("data/wolf/function/animations/bark/frames/{}.mcfunction", next.tick),
    );
    assert!(text.contains("interpolation_duration:2}"), "{text}");
}

/// it should route side effects through a suppressible effects function
#[test]
fn side_effects_are_guarded() {
    let out = compile_fixture("wolf");
    let leaf = contents(&out, "data/wolf/function/animations/bark/frames/5.mcfunction");
    assert!(leaf.contains(
        "execute unless entity @s[tag=wolf.suppress_effects] run function wolf:animations/bark/frames/5_effects"
    ));

    let effects = contents(
        &out,
        "data/wolf/function/animations/bark/frames/5_effects.mcfunction",
    );
    assert!(effects.contains(
        "execute on passengers if entity @s[tag=wolf.node.mouth] at @s run particle minecraft:poof ~ ~ ~"
    ));
    assert!(effects.contains("run playsound minecraft:entity.wolf.ambient neutral @a ~ ~ ~"));
    assert!(!effects.contains("run /playsound"));
    assert!(effects.contains("positioned ^0.3 ^0 ^0.3 rotated ~0 ~0 run particle minecraft:crit ~ ~ ~"));

    let first = contents(
        &out,
        "data/wolf/function/animations/bark/frames/0_effects.mcfunction",
    );
    assert!(first.contains("execute if entity @p[distance=..16] run say woof"));

    let variant = contents(
        &out,
        "data/wolf/function/animations/bark/frames/10_effects.mcfunction",
    );
    assert!(variant.contains("function wolf:variants/red/apply"));
}

/// it should inline a lone unconditioned command and keep conditioned ones in an effects file
#[test]
fn single_effects_are_inlined_unless_conditioned() {
    let rig = Rig::new(
        "Crate",
        vec![RigNode::new(Uuid::from_u128(1), "lid", NodeKind::Bone { item: None })],
        Vec::new(),
    )
    .unwrap();
    let mut pulse = AnimationSource::new("Pulse", 1.0);
    pulse.command_keys = vec![
        CommandKey {
            time: 0.25,
            commands: vec!["say hello".into()],
            execute_condition: Some("if entity @p".into()),
        },
        CommandKey {
            time: 0.5,
            commands: vec!["/say hi".into()],
            execute_condition: None,
        },
    ];
    let out = compile(&rig, &[pulse], &BakeConfig::default()).unwrap();

    let inlined = contents(&out, "data/crate/function/animations/pulse/frames/10.mcfunction");
    assert_eq!(
        inlined,
        "execute unless entity @s[tag=crate.suppress_effects] run say hi\n"
    );
    assert!(out
        .datapack
        .get("data/crate/function/animations/pulse/frames/10_effects.mcfunction")
        .is_none());

    let guarded = contents(&out, "data/crate/function/animations/pulse/frames/5.mcfunction");
    assert_eq!(
        guarded,
        "execute unless entity @s[tag=crate.suppress_effects] run function crate:animations/pulse/frames/5_effects\n"
    );
    let effects = contents(
        &out,
        "data/crate/function/animations/pulse/frames/5_effects.mcfunction",
    );
    assert_eq!(effects, "execute if entity @p run say hello\n");
}

/// it should leave nodes an animation never moves out of its frames
#[test]
fn untouched_nodes_are_not_reset() {
    let out = compile_fixture("wolf");
    for anim in &out.animations {
        let desc = &anim.descriptor;
        for frame in &desc.frames {
            for uuid in frame.nodes.keys() {
                assert!(desc.modified_nodes.contains(uuid), "{} tick {}", desc.name, frame.tick);
            }
        }
    }
    // Bark only moves the head and what hangs off it.
    let bark = &out.animation("Bark").unwrap().descriptor;
    assert!(!bark.modified_nodes.contains(&Uuid::from_u128(1)));
    let first = contents(&out, "data/wolf/function/animations/bark/frames/0.mcfunction");
    assert!(!first.contains("tag=wolf.node.body]"), "{first}");
    assert!(!first.contains("tag=wolf.node.cam]"), "{first}");
    assert!(first.contains("tag=wolf.node.head]"), "{first}");
}

/// it should repeat locator commands at the key's frequency until a clearing key
#[test]
fn locator_repeat_stops_at_clearing_key() {
    let out = compile_fixture("wolf");
    let bark = &out.animation("Bark").unwrap().descriptor;
    let paw = Uuid::from_u128(5);
    let fired: Vec<u32> = bark
        .frames
        .iter()
        .filter(|f| f.nodes.get(&paw).is_some_and(|n| n.effect.is_some()))
        .map(|f| f.tick)
        .collect();
    assert_eq!(fired, vec![0, 5, 10]);
}

/// it should warn about keys past the end without failing the compile
#[test]
fn late_keys_warn() {
    let out = compile_fixture("wolf");
    let messages: Vec<&str> = out
        .diagnostics
        .warnings()
        .map(|d| d.message.as_str())
        .collect();
    assert!(
        messages.iter().any(|m| m.contains("variant keyframe at 1.5s")),
        "{messages:?}"
    );
}

/// it should guard the dispatch root with the exact range of the first and last frame
#[test]
fn dispatch_roots_are_guarded() {
    let out = compile_fixture("wolf");
    let walk = out.animation("Walk").unwrap();
    let (lo, hi) = walk.tree.node(walk.tree.root().unwrap()).range();
    let text = contents(&out, "data/wolf/function/animations/walk/dispatch.mcfunction");
    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with(&format!("execute if score @s wolf.frame matches {lo}..{hi} run function wolf:animations/walk/")));

    let seek = contents(&out, "data/wolf/function/animations/walk/seek.mcfunction");
    assert!(seek.starts_with(&format!("execute if score @s wolf.frame matches {lo}..39 run function")));
}

/// it should compile an animation without frames to a no-op dispatch root
#[test]
fn empty_animation_is_a_noop() {
    let out = compile_fixture("static-crate");
    assert_eq!(out.namespace, "static_crate");
    let nothing = out.animation("Nothing").unwrap();
    assert!(nothing.tree.is_empty());
    let text = contents(
        &out,
        "data/static_crate/function/animations/nothing/dispatch.mcfunction",
    );
    assert!(text.lines().all(|l| l.starts_with('#')));
    // Control functions are still generated.
    assert!(out
        .datapack
        .get("data/static_crate/function/animations/nothing/play.mcfunction")
        .is_some());

    // A pose that never leaves the bind pose writes nothing.
    let idle = out.animation("Idle").unwrap();
    assert!(idle.descriptor.frames.is_empty());
    assert!(idle.descriptor.modified_nodes.is_empty());
}

/// it should reject node kinds outside the closed set, naming the node
#[test]
fn unknown_node_kind_is_fatal() {
    let json = rigbake_test_fixtures::blueprints::json("unknown-kind").unwrap();
    let err = Blueprint::from_json(&json).unwrap_err();
    assert_eq!(
        err,
        BakeError::UnknownNodeKind {
            node: "bulb".into(),
            kind: "point_light".into()
        }
    );
    assert_eq!(err.category(), "rig");
}

/// it should write the spawn payload with every entity-backed node as a passenger
#[test]
fn summon_payload_lists_passengers() {
    let out = compile_fixture("wolf");
    let payload = contents(&out, "data/wolf/rigbake/summon.snbt");
    for tag in ["wolf.node.body", "wolf.node.head", "wolf.node.mouth", "wolf.node.cam"] {
        assert!(payload.contains(tag), "{tag} missing from payload");
    }
    // Untracked locators have no entity.
    assert!(!payload.contains("wolf.node.paw"));
    assert!(payload.contains("minecraft:white_wool"));
}
