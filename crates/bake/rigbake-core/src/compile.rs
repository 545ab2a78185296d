//! Compile pass: rig + animation sources → in-memory datapack.
//!
//! Nothing touches the filesystem here; see [`crate::emit`] for writing the result.

use crate::blueprint::Blueprint;
use crate::codegen::Codegen;
use crate::config::BakeConfig;
use crate::data::AnimationSource;
use crate::datapack::Datapack;
use crate::diagnostics::Diagnostics;
use crate::dispatch::DispatchTree;
use crate::error::Result;
use crate::frame::AnimationDescriptor;
use crate::names::{path_safe, storage_safe, NameAllocator};
use crate::rig::Rig;
use crate::sampling::{rest_pose, sample_animation, AnimationNames};

/// One sampled animation and the tree built over its frames.
#[derive(Clone, Debug)]
pub struct CompiledAnimation {
    pub descriptor: AnimationDescriptor,
    pub tree: DispatchTree,
}

#[derive(Clone, Debug)]
pub struct CompileOutput {
    pub namespace: String,
    pub datapack: Datapack,
    /// In source order.
    pub animations: Vec<CompiledAnimation>,
    pub diagnostics: Diagnostics,
}

impl CompileOutput {
    pub fn animation(&self, name: &str) -> Option<&CompiledAnimation> {
        self.animations.iter().find(|a| a.descriptor.name == name)
    }
}

/// Unique path/storage names per animation, in source order.
fn allocate_names(sources: &[AnimationSource], diagnostics: &mut Diagnostics) -> Vec<AnimationNames> {
    let mut paths = NameAllocator::new();
    let mut storage = NameAllocator::new();
    sources
        .iter()
        .map(|source| {
            let (path, renamed_path) = paths.allocate(path_safe(&source.name));
            let (storage, renamed_storage) = storage.allocate(storage_safe(&source.name));
            if renamed_path || renamed_storage {
                diagnostics.warn(
                    Some(&source.name),
                    None,
                    format!("name collides with another animation; compiled as '{storage}'"),
                );
            }
            AnimationNames { path, storage }
        })
        .collect()
}

fn compile_one(
    cg: &Codegen<'_>,
    source: &AnimationSource,
    names: AnimationNames,
) -> Result<(CompiledAnimation, Datapack, Diagnostics)> {
    let mut diagnostics = Diagnostics::new();
    let descriptor = sample_animation(cg.rig, source, cg.config, names, &mut diagnostics)?;
    let tree = DispatchTree::build(descriptor.frames.clone(), descriptor.duration);
    let pack = cg.animation(&descriptor, &tree)?;
    Ok((CompiledAnimation { descriptor, tree }, pack, diagnostics))
}

#[cfg(feature = "parallel")]
fn compile_all(
    cg: &Codegen<'_>,
    sources: &[AnimationSource],
    names: Vec<AnimationNames>,
) -> Result<Vec<(CompiledAnimation, Datapack, Diagnostics)>> {
    use rayon::prelude::*;
    sources
        .par_iter()
        .zip(names.into_par_iter())
        .map(|(source, names)| compile_one(cg, source, names))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn compile_all(
    cg: &Codegen<'_>,
    sources: &[AnimationSource],
    names: Vec<AnimationNames>,
) -> Result<Vec<(CompiledAnimation, Datapack, Diagnostics)>> {
    sources
        .iter()
        .zip(names)
        .map(|(source, names)| compile_one(cg, source, names))
        .collect()
}

/// Compile every animation of `rig` into one datapack.
pub fn compile(rig: &Rig, sources: &[AnimationSource], config: &BakeConfig) -> Result<CompileOutput> {
    config.validate()?;
    let namespace = config
        .namespace
        .clone()
        .unwrap_or_else(|| storage_safe(rig.name()));

    let mut diagnostics = Diagnostics::new();
    let names = allocate_names(sources, &mut diagnostics);
    let cg = Codegen::new(rig, config, namespace.clone(), rest_pose(rig, config)?);

    let mut datapack = Datapack::new();
    let mut animations = Vec::with_capacity(sources.len());
    for (compiled, pack, diags) in compile_all(&cg, sources, names)? {
        datapack.extend(pack)?;
        diagnostics.extend(diags);
        animations.push(compiled);
    }

    let descriptors: Vec<AnimationDescriptor> =
        animations.iter().map(|a| a.descriptor.clone()).collect();
    datapack.extend(cg.rig_files(&descriptors)?)?;

    log::info!(
        "compiled rig '{}' as '{namespace}': {} animation(s), {} file(s), {} warning(s)",
        rig.name(),
        animations.len(),
        datapack.len(),
        diagnostics.warnings().count()
    );
    Ok(CompileOutput {
        namespace,
        datapack,
        animations,
        diagnostics,
    })
}

/// Compile a parsed blueprint with its own settings.
pub fn compile_blueprint(blueprint: Blueprint) -> Result<CompileOutput> {
    let (rig, sources, config) = blueprint.into_parts()?;
    compile(&rig, &sources, &config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{NodeAnimator, TransformKey};
    use crate::rig::{NodeKind, RigNode};
    use uuid::Uuid;

    fn rig() -> Rig {
        Rig::new(
            "Wolf",
            vec![RigNode::new(Uuid::from_u128(1), "body", NodeKind::Bone { item: None })],
            Vec::new(),
        )
        .unwrap()
    }

    fn wave(name: &str) -> AnimationSource {
        AnimationSource::new(name, 1.0).with_animator(NodeAnimator {
            node: Uuid::from_u128(1),
            position: vec![
                TransformKey::new(0.0, [0.0; 3]),
                TransformKey::new(1.0, [0.0, 1.0, 0.0]),
            ],
            rotation: Vec::new(),
            scale: Vec::new(),
            commands: Vec::new(),
        })
    }

    #[test]
    fn namespace_falls_back_to_rig_name() {
        let out = compile(&rig(), &[wave("walk")], &BakeConfig::default()).unwrap();
        assert_eq!(out.namespace, "wolf");
        assert!(out
            .datapack
            .get("data/wolf/function/animations/walk/play.mcfunction")
            .is_some());
    }

    #[test]
    fn colliding_names_are_suffixed_with_a_warning() {
        let out = compile(&rig(), &[wave("Walk"), wave("walk")], &BakeConfig::default()).unwrap();
        let storage: Vec<_> = out
            .animations
            .iter()
            .map(|a| a.descriptor.storage_name.as_str())
            .collect();
        assert_eq!(storage, ["walk", "walk_2"]);
        assert!(out.diagnostics.has_warnings());
    }

    #[test]
    fn invalid_config_aborts() {
        let config = BakeConfig {
            matrix_precision: 0,
            ..Default::default()
        };
        assert!(compile(&rig(), &[], &config).is_err());
    }
}
