//! Rig-level functions: objectives, the global tick hook, summoning and variants.

use rigbake_nbt::{Nbt, NbtCompound, NbtList};
use serde_json::json;

use super::nodes::transformation;
use super::Codegen;
use crate::command::{Command, ExecuteClause, ScoreHolder, ScoreRange, Selector};
use crate::datapack::Datapack;
use crate::error::Result;
use crate::frame::AnimationDescriptor;
use crate::rig::{NodeKind, Variant, DEFAULT_BONE_ITEM};

fn item(id: &str) -> NbtCompound {
    NbtCompound::new().with("id", id).with("count", Nbt::Int(1))
}

impl Codegen<'_> {
    fn roots(&self) -> Selector {
        Selector::entities()
            .with_type(self.config.root_entity.clone())
            .tagged(self.vars.root_tag())
    }

    fn default_variant(&self) -> Option<&Variant> {
        self.rig.variants().iter().find(|v| v.is_default)
    }

    /// Item shown by the bone at `idx` while `variant` is active.
    fn bone_item(&self, idx: usize, variant: Option<&Variant>) -> Option<String> {
        let node = &self.rig.nodes()[idx];
        let NodeKind::Bone { item } = &node.kind else {
            return None;
        };
        let model = variant
            .and_then(|v| v.models.get(&node.uuid))
            .or(item.as_ref())
            .map(String::as_str)
            .unwrap_or(DEFAULT_BONE_ITEM);
        Some(model.to_string())
    }

    /// Summon payload of one node entity, in its bind pose.
    fn passenger(&self, idx: usize) -> Option<NbtCompound> {
        let node = &self.rig.nodes()[idx];
        if !node.kind.has_entity() {
            return None;
        }
        let mut data = NbtCompound::new()
            .with("id", node.kind.entity_type())
            .with(
                "Tags",
                NbtList::strings([
                    self.vars.node_tag(self.rig.storage_name(idx)),
                    self.vars.any_node_tag(),
                ]),
            );
        match &node.kind {
            NodeKind::Bone { .. } => {
                let model = self.bone_item(idx, self.default_variant())?;
                data.insert("item", item(&model));
            }
            NodeKind::ItemDisplay { item: id } => {
                data.insert("item", item(id));
            }
            NodeKind::BlockDisplay { block } => {
                data.insert("block_state", NbtCompound::new().with("Name", block.as_str()));
            }
            NodeKind::TextDisplay { text } => {
                // Text components are stored as JSON.
                data.insert("text", Nbt::String(json!(text).to_string()));
            }
            NodeKind::Locator { .. } | NodeKind::Camera => {}
        }
        data.insert("transformation", transformation(&self.rest[idx].matrix));
        data.insert(
            "interpolation_duration",
            Nbt::Int(self.config.interpolation_duration as i32),
        );
        Some(data)
    }

    /// Root entity payload with every node entity as a passenger.
    pub fn summon_payload(&self) -> NbtCompound {
        let mut passengers = NbtList::new();
        for idx in 0..self.rig.len() {
            if let Some(p) = self.passenger(idx) {
                passengers.push(p);
            }
        }
        NbtCompound::new()
            .with(
                "Tags",
                NbtList::strings([self.vars.root_tag(), self.vars.new_tag()]),
            )
            .with("Passengers", passengers)
    }
}

pub(crate) fn emit_rig(cg: &Codegen<'_>, animations: &[AnimationDescriptor]) -> Result<Datapack> {
    let v = &cg.vars;
    let ns = cg.namespace();
    let mut pack = Datapack::new();
    let this = ScoreHolder::this;
    let default_interp = cg.config.interpolation_duration as i32;

    // load: every objective, documented inline.
    let mut load = vec![Command::Comment(format!("runtime state of rig '{}'", cg.rig.name()))];
    let mut objectives = v.instance_objectives();
    for anim in animations {
        objectives.extend(v.animation_objectives(&anim.storage_name));
    }
    for (name, about) in objectives {
        load.push(Command::Comment(format!("{name}: {about}")));
        load.push(Command::ObjectiveAdd { name });
    }
    load.push(Command::Comment(format!("tag {}: rig root", v.root_tag())));
    load.push(Command::Comment(format!(
        "tag {}: frame side effects are skipped while present",
        v.suppress_tag()
    )));
    for anim in animations {
        load.push(Command::Comment(format!(
            "tag {}: '{}' is advancing",
            v.playing_tag(&anim.storage_name),
            anim.name
        )));
    }
    pack.add_function(cg.function("load"), load)?;

    pack.add_function(
        cg.function("tick"),
        vec![Command::execute(
            vec![ExecuteClause::As(cg.roots())],
            Command::function(cg.function("on_tick")),
        )],
    )?;

    let mut on_tick = vec![Command::add(this(), v.lifetime(), 1)];
    for anim in animations {
        on_tick.push(Command::execute(
            vec![ExecuteClause::if_entity(
                Selector::this().tagged(v.playing_tag(&anim.storage_name)),
            )],
            Command::function(cg.paths(anim).control("tick")),
        ));
    }
    // After the animations, so the tick that finishes a tween does not also advance.
    on_tick.push(Command::execute(
        vec![ExecuteClause::if_score(this(), v.tween(), ScoreRange::at_least(1))],
        Command::function(cg.function("tween_step")),
    ));
    pack.add_function(cg.function("on_tick"), on_tick)?;

    pack.add_function(
        cg.function("tween_step"),
        vec![
            Command::ScoreRemove {
                holder: this(),
                objective: v.tween(),
                value: 1,
            },
            Command::copy_score(this(), v.interp(), this(), v.tween()),
            Command::execute(
                vec![ExecuteClause::if_score(
                    this(),
                    v.tween(),
                    ScoreRange {
                        min: None,
                        max: Some(0),
                    },
                )],
                Command::set(this(), v.interp(), default_interp),
            ),
            Command::function(cg.function("sync_interpolation")),
        ],
    )?;

    let payload = cg.summon_payload();
    pack.add_text(format!("data/{ns}/rigbake/summon.snbt"), format!("{payload:#}\n"))?;
    pack.add_function(
        cg.function("summon"),
        vec![
            Command::Summon {
                entity: cg.config.root_entity.clone(),
                data: payload,
            },
            Command::execute(
                vec![ExecuteClause::As(
                    Selector::entities()
                        .with_type(cg.config.root_entity.clone())
                        .tagged(v.new_tag()),
                )],
                Command::function(cg.function("init_instance")),
            ),
        ],
    )?;

    let mut init = vec![
        Command::set(this(), v.lifetime(), 0),
        Command::set(this(), v.frame(), 0),
        Command::set(this(), v.tween(), 0),
        Command::set(this(), v.interp(), default_interp),
    ];
    for anim in animations {
        init.push(Command::set(this(), v.local_time(&anim.storage_name), 0));
        init.push(Command::set(
            this(),
            v.loop_mode(&anim.storage_name),
            anim.loop_mode.score(),
        ));
    }
    init.push(Command::tag_remove(Selector::this(), v.new_tag()));
    pack.add_function(cg.function("init_instance"), init)?;

    pack.add_function(
        cg.function("remove"),
        vec![
            Command::execute(vec![ExecuteClause::OnPassengers], Command::Kill(Selector::this())),
            Command::Kill(Selector::this()),
        ],
    )?;

    let pause_all = animations
        .iter()
        .map(|a| Command::tag_remove(Selector::this(), v.playing_tag(&a.storage_name)))
        .collect();
    pack.add_function(cg.function("pause_all"), pause_all)?;

    let interp_holder = v.interp_holder();
    pack.add_function(
        cg.function("sync_interpolation"),
        vec![
            Command::copy_score(interp_holder.clone(), v.interp(), this(), v.interp()),
            Command::execute(
                vec![
                    ExecuteClause::OnPassengers,
                    ExecuteClause::StoreResultEntity {
                        path: "interpolation_duration".into(),
                    },
                ],
                Command::ScoreGet {
                    holder: interp_holder,
                    objective: v.interp(),
                },
            ),
        ],
    )?;

    for (vidx, variant) in cg.rig.variants().iter().enumerate() {
        let mut apply = Vec::new();
        for idx in 0..cg.rig.len() {
            let Some(model) = cg.bone_item(idx, Some(variant)) else {
                continue;
            };
            apply.push(Command::execute(
                cg.on_node(idx),
                Command::DataMerge {
                    target: Selector::this(),
                    data: NbtCompound::new().with("item", item(&model)),
                },
            ));
        }
        if apply.is_empty() {
            apply.push(Command::Comment(format!("variant '{}' has no bones", variant.name)));
        }
        pack.add_function(cg.variant_apply(vidx), apply)?;
    }

    pack.add_json(
        "data/minecraft/tags/function/tick.json",
        &json!({ "values": [cg.function("tick").to_string()] }),
    )?;
    pack.add_json(
        "data/minecraft/tags/function/load.json",
        &json!({ "values": [cg.function("load").to_string()] }),
    )?;
    pack.add_json(
        "pack.mcmeta",
        &json!({
            "pack": {
                "pack_format": cg.config.pack_format,
                "description": cg.config.description,
            }
        }),
    )?;
    Ok(pack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BakeConfig;
    use crate::data::LoopMode;
    use crate::rig::{Rig, RigNode};
    use crate::transform::NodeTransform;
    use indexmap::{IndexMap, IndexSet};
    use uuid::Uuid;

    fn rig() -> Rig {
        let body = Uuid::from_u128(1);
        let red = Variant {
            uuid: Uuid::from_u128(10),
            name: "Red".into(),
            is_default: false,
            models: IndexMap::from([(body, "minecraft:red_dye".to_string())]),
        };
        Rig::new(
            "wolf",
            vec![
                RigNode::new(body, "body", NodeKind::Bone { item: None }),
                RigNode::new(
                    Uuid::from_u128(2),
                    "hand",
                    NodeKind::Locator { tracked: false },
                )
                .with_parent(body),
            ],
            vec![red],
        )
        .unwrap()
    }

    fn anim() -> AnimationDescriptor {
        AnimationDescriptor {
            name: "Walk".into(),
            path_name: "walk".into(),
            storage_name: "walk".into(),
            duration: 20,
            loop_mode: LoopMode::Loop,
            loop_delay: 0,
            modified_nodes: IndexSet::new(),
            frames: Vec::new(),
        }
    }

    fn emit(rig: &Rig) -> Datapack {
        let config = BakeConfig::default();
        let rest = vec![NodeTransform::default(); rig.len()];
        let cg = Codegen::new(rig, &config, "wolf", rest);
        emit_rig(&cg, &[anim()]).unwrap()
    }

    #[test]
    fn untracked_locators_are_not_summoned() {
        let rig = rig();
        let config = BakeConfig::default();
        let cg = Codegen::new(&rig, &config, "wolf", vec![NodeTransform::default(); 2]);
        let payload = cg.summon_payload();
        let passengers = payload.get("Passengers").and_then(Nbt::as_list).unwrap();
        assert_eq!(passengers.len(), 1);
    }

    #[test]
    fn variant_apply_swaps_bone_items() {
        let pack = emit(&rig());
        let text = pack
            .contents("data/wolf/function/variants/red/apply.mcfunction")
            .unwrap();
        assert!(text.contains("tag=wolf.node.body"));
        assert!(text.contains(r#"id:"minecraft:red_dye""#));
    }

    #[test]
    fn load_creates_per_animation_objectives() {
        let pack = emit(&rig());
        let text = pack.contents("data/wolf/function/load.mcfunction").unwrap();
        assert!(text.contains("scoreboard objectives add wolf.walk.local_time dummy"));
        assert!(text.contains("scoreboard objectives add wolf.frame dummy"));
        let init = pack
            .contents("data/wolf/function/init_instance.mcfunction")
            .unwrap();
        assert!(init.contains("scoreboard players set @s wolf.walk.loop_mode 0"));
    }

    #[test]
    fn tween_counts_down_once_per_instance() {
        let pack = emit(&rig());
        let on_tick = pack.contents("data/wolf/function/on_tick.mcfunction").unwrap();
        let lines: Vec<&str> = on_tick.lines().collect();
        assert_eq!(
            lines.last().copied(),
            Some("execute if score @s wolf.tween matches 1.. run function wolf:tween_step")
        );
        assert_eq!(on_tick.matches("tween_step").count(), 1);
        let step = pack.contents("data/wolf/function/tween_step.mcfunction").unwrap();
        assert!(step.starts_with("scoreboard players remove @s wolf.tween 1"), "{step}");
    }

    #[test]
    fn registers_tick_and_load_tags() {
        let pack = emit(&rig());
        let tick = pack.contents("data/minecraft/tags/function/tick.json").unwrap();
        assert!(tick.contains("\"wolf:tick\""));
        assert!(pack.get("pack.mcmeta").is_some());
    }
}
