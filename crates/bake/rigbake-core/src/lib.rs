//! rigbake core: compiles keyframe rig animations into tick-driven command functions.
//!
//! Pipeline: [`blueprint`] → [`rig::Rig`] + [`data::AnimationSource`] → [`sampling`] (sparse
//! frames) → [`dispatch`] (balanced lookup tree) → [`codegen`] (command IR) → [`datapack`] →
//! [`emit`] (files + manifest). [`compile::compile`] runs everything up to the in-memory pack.

pub mod blueprint;
pub mod codegen;
pub mod command;
pub mod compile;
pub mod config;
pub mod data;
pub mod datapack;
pub mod diagnostics;
pub mod dispatch;
pub mod emit;
pub mod error;
pub mod frame;
pub mod interp;
pub mod names;
pub mod rig;
pub mod runtime_vars;
pub mod sampling;
pub mod transform;

// Re-exports for consumers
pub use blueprint::Blueprint;
pub use codegen::{AnimationPaths, Codegen};
pub use command::{Command, ExecuteClause, FunctionPath, ScoreHolder, ScoreRange, Selector};
pub use compile::{compile, compile_blueprint, CompileOutput, CompiledAnimation};
pub use config::{BakeConfig, TICKS_PER_SECOND};
pub use data::{
    AnimationSource, CommandKey, Interpolation, LocatorCommandKey, LoopMode, NodeAnimator,
    TransformKey, VariantKey,
};
pub use datapack::{Datapack, PackFile};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use dispatch::{DispatchNode, DispatchTree, NodeId, Route};
pub use emit::{emit, read_manifest, AtomicProgress, Manifest, NoProgress, ProgressSink};
pub use error::{BakeError, Result};
pub use frame::{AnimationDescriptor, Frame, NodeFrame};
pub use rig::{NodeKind, Rig, RigNode, Variant};
pub use runtime_vars::RuntimeVariables;
pub use sampling::{rest_pose, sample_animation, AnimationNames};
pub use transform::{InterpolationMarker, NodeTransform};
pub use rigbake_nbt as nbt;
