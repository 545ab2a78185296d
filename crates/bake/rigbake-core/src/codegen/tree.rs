//! Branch functions of the exact and seek dispatch trees.

use super::{AnimationPaths, Codegen};
use crate::command::{Command, ExecuteClause, FunctionPath, ScoreHolder, ScoreRange};
use crate::datapack::Datapack;
use crate::dispatch::{DispatchNode, DispatchTree, NodeId};
use crate::error::Result;

fn target(paths: &AnimationPaths, tree: &DispatchTree, id: NodeId, seek: bool) -> FunctionPath {
    match tree.node(id) {
        DispatchNode::Leaf { tick_index, .. } => paths.frame(*tick_index),
        DispatchNode::Branch {
            min_index,
            max_index,
            ..
        } if seek => paths.seek_branch(*min_index, *max_index),
        DispatchNode::Branch {
            min_index,
            max_index,
            ..
        } => paths.branch(*min_index, *max_index),
    }
}

fn guarded_call(cg: &Codegen<'_>, range: ScoreRange, function: FunctionPath) -> Command {
    Command::execute(
        vec![ExecuteClause::if_score(
            ScoreHolder::this(),
            cg.vars.frame(),
            range,
        )],
        Command::function(function),
    )
}

/// Guard covering exactly the ticks of `id`.
fn exact_range(tree: &DispatchTree, id: NodeId) -> ScoreRange {
    let (lo, hi) = tree.node(id).range();
    ScoreRange::between(lo as i32, hi as i32)
}

pub(crate) fn emit_trees(
    cg: &Codegen<'_>,
    paths: &AnimationPaths,
    tree: &DispatchTree,
    pack: &mut Datapack,
) -> Result<()> {
    let Some(root) = tree.root() else {
        pack.add_function(paths.dispatch(), vec![Command::Comment("no frames".into())])?;
        pack.add_function(paths.seek(), vec![Command::Comment("no frames".into())])?;
        return Ok(());
    };

    pack.add_function(
        paths.dispatch(),
        vec![guarded_call(cg, exact_range(tree, root), target(paths, tree, root, false))],
    )?;
    emit_exact(cg, paths, tree, root, pack)?;

    // The seek root serves every tick from the first frame to the end of the animation.
    let upper = tree.duration().saturating_sub(1);
    let (first, _) = tree.node(root).range();
    pack.add_function(
        paths.seek(),
        vec![guarded_call(
            cg,
            ScoreRange::between(first as i32, upper as i32),
            target(paths, tree, root, true),
        )],
    )?;
    emit_seek(cg, paths, tree, root, upper, pack)
}

fn emit_exact(
    cg: &Codegen<'_>,
    paths: &AnimationPaths,
    tree: &DispatchTree,
    id: NodeId,
    pack: &mut Datapack,
) -> Result<()> {
    let DispatchNode::Branch {
        min_index,
        max_index,
        children,
    } = tree.node(id)
    else {
        return Ok(());
    };
    let body = children
        .iter()
        .map(|c| guarded_call(cg, exact_range(tree, *c), target(paths, tree, *c, false)))
        .collect();
    pack.add_function(paths.branch(*min_index, *max_index), body)?;
    for child in children {
        emit_exact(cg, paths, tree, *child, pack)?;
    }
    Ok(())
}

fn emit_seek(
    cg: &Codegen<'_>,
    paths: &AnimationPaths,
    tree: &DispatchTree,
    id: NodeId,
    upper: u32,
    pack: &mut Datapack,
) -> Result<()> {
    let DispatchNode::Branch {
        min_index,
        max_index,
        ..
    } = tree.node(id)
    else {
        return Ok(());
    };
    let ranges = tree.floor_ranges(id, upper);
    let body = ranges
        .iter()
        .map(|(child, lo, hi)| {
            guarded_call(
                cg,
                ScoreRange::between(*lo as i32, *hi as i32),
                target(paths, tree, *child, true),
            )
        })
        .collect();
    pack.add_function(paths.seek_branch(*min_index, *max_index), body)?;
    for (child, _, hi) in ranges {
        emit_seek(cg, paths, tree, child, hi, pack)?;
    }
    Ok(())
}
