//! Leaf functions: per-node transform updates and frame side effects.

use rigbake_nbt::{Nbt, NbtCompound, NbtList};

use super::{AnimationPaths, Codegen};
use crate::command::{Command, ExecuteClause, Selector};
use crate::datapack::Datapack;
use crate::dispatch::DispatchTree;
use crate::error::Result;
use crate::frame::{Frame, NodeFrame};
use crate::rig::{NodeKind, Orientation};

/// One side-effect command and whether it carries a user condition.
struct Effect {
    command: Command,
    conditioned: bool,
}

fn raw_line(line: &str) -> Command {
    Command::Raw(line.trim_start_matches('/').to_string())
}

fn conditioned(mut clauses: Vec<ExecuteClause>, condition: Option<&String>, run: Command) -> Command {
    if let Some(cond) = condition {
        clauses.push(ExecuteClause::Raw(cond.clone()));
    }
    if clauses.is_empty() {
        run
    } else {
        Command::execute(clauses, run)
    }
}

/// `transformation` payload written for matrix nodes.
pub(crate) fn transformation(matrix: &[f64; 16]) -> NbtList {
    NbtList::floats(matrix.iter().map(|v| *v as f32))
}

impl Codegen<'_> {
    fn unless_suppressed(&self) -> ExecuteClause {
        ExecuteClause::unless_entity(Selector::this().tagged(self.vars.suppress_tag()))
    }

    /// Transform update for one node, run as the root.
    fn node_update(&self, idx: usize, entry: &NodeFrame, restore_default: bool) -> Option<Command> {
        let node = &self.rig.nodes()[idx];
        let t = &entry.transform;
        match node.kind.orientation() {
            Orientation::Matrix => {
                let mut data = NbtCompound::new()
                    .with("transformation", transformation(&t.matrix))
                    .with("start_interpolation", Nbt::Int(-1));
                if t.marker.is_instant() {
                    data.insert("interpolation_duration", Nbt::Int(0));
                } else if restore_default {
                    data.insert(
                        "interpolation_duration",
                        Nbt::Int(self.config.interpolation_duration as i32),
                    );
                }
                Some(Command::execute(
                    self.on_node(idx),
                    Command::DataMerge {
                        target: Selector::this(),
                        data,
                    },
                ))
            }
            Orientation::HeadRotation if node.kind.has_entity() => {
                let mut clauses = vec![ExecuteClause::At(Selector::this())];
                clauses.extend(self.on_node(idx));
                Some(Command::execute(
                    clauses,
                    Command::Teleport {
                        target: Selector::this(),
                        local: t.translation,
                        rotation: [t.head_rotation[1], t.head_rotation[0]],
                    },
                ))
            }
            Orientation::HeadRotation => None,
        }
    }

    /// Side effects of a frame in application order: variants, root commands, locators.
    fn effects(&self, frame: &Frame) -> Vec<Effect> {
        let mut out = Vec::new();
        if let Some(variant) = &frame.variant {
            for uuid in &variant.variants {
                if let Some((idx, _)) = self.rig.variant(uuid) {
                    out.push(Effect {
                        command: conditioned(
                            Vec::new(),
                            variant.execute_condition.as_ref(),
                            Command::function(self.variant_apply(idx)),
                        ),
                        conditioned: variant.execute_condition.is_some(),
                    });
                }
            }
        }
        if let Some(commands) = &frame.commands {
            for line in &commands.commands {
                out.push(Effect {
                    command: conditioned(
                        Vec::new(),
                        commands.execute_condition.as_ref(),
                        raw_line(line),
                    ),
                    conditioned: commands.execute_condition.is_some(),
                });
            }
        }
        for (idx, node) in self.rig.nodes().iter().enumerate() {
            let Some(entry) = frame.nodes.get(&node.uuid) else {
                continue;
            };
            let Some(effect) = &entry.effect else {
                continue;
            };
            let base = match node.kind {
                NodeKind::Locator { tracked: true } => {
                    let mut clauses = self.on_node(idx);
                    clauses.push(ExecuteClause::At(Selector::this()));
                    clauses
                }
                _ => {
                    let t = &entry.transform;
                    vec![
                        ExecuteClause::At(Selector::this()),
                        ExecuteClause::PositionedLocal(t.translation),
                        ExecuteClause::RotatedRelative([t.head_rotation[1], t.head_rotation[0]]),
                    ]
                }
            };
            for line in &effect.commands {
                out.push(Effect {
                    command: conditioned(
                        base.clone(),
                        effect.execute_condition.as_ref(),
                        raw_line(line),
                    ),
                    conditioned: effect.execute_condition.is_some(),
                });
            }
        }
        out
    }
}

pub(crate) fn emit_leaves(
    cg: &Codegen<'_>,
    paths: &AnimationPaths,
    tree: &DispatchTree,
    pack: &mut Datapack,
) -> Result<()> {
    let mut after_instant = vec![false; cg.rig.len()];
    for leaf in tree.leaves() {
        let Some(frame) = tree.frame(leaf) else {
            continue;
        };
        let mut body = Vec::new();
        for (idx, node) in cg.rig.nodes().iter().enumerate() {
            let Some(entry) = frame.nodes.get(&node.uuid) else {
                continue;
            };
            if let Some(cmd) = cg.node_update(idx, entry, after_instant[idx]) {
                body.push(cmd);
            }
            if node.kind.orientation() == Orientation::Matrix {
                after_instant[idx] = entry.transform.marker.is_instant();
            }
        }

        let mut effects = cg.effects(frame);
        match effects.len() {
            0 => {}
            1 if !effects[0].conditioned => {
                // Inline the lone command behind the suppression guard.
                let effect = effects.remove(0);
                body.push(match effect.command {
                    Command::Execute { mut clauses, run } => {
                        clauses.insert(0, cg.unless_suppressed());
                        Command::Execute { clauses, run }
                    }
                    other => Command::execute(vec![cg.unless_suppressed()], other),
                });
            }
            _ => {
                let path = paths.effects(frame.tick);
                body.push(Command::execute(
                    vec![cg.unless_suppressed()],
                    Command::function(path.clone()),
                ));
                pack.add_function(path, effects.into_iter().map(|e| e.command).collect())?;
            }
        }
        pack.add_function(paths.frame(frame.tick), body)?;
    }
    Ok(())
}
