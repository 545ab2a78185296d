//! Typed command IR for the target runtime.
//!
//! Codegen builds [`Command`] values and renders them with `Display`, one command per line.
//! Keeping the structure around (instead of formatting strings directly) lets the reference
//! interpreter in `rigbake-sim` execute exactly what gets written.

use std::fmt;

use rigbake_nbt::NbtCompound;
use serde::{Deserialize, Serialize};

/// `namespace:path/to/function`
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FunctionPath {
    pub namespace: String,
    pub path: String,
}

impl FunctionPath {
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            path: path.into(),
        }
    }

    /// Child path `self/segment`.
    pub fn join(&self, segment: &str) -> Self {
        Self {
            namespace: self.namespace.clone(),
            path: format!("{}/{}", self.path, segment),
        }
    }

    /// Location of the function file inside the datapack.
    pub fn file_path(&self) -> String {
        format!("data/{}/function/{}.mcfunction", self.namespace, self.path)
    }
}

impl fmt::Display for FunctionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectorBase {
    /// `@s`
    This,
    /// `@e`
    Entities,
}

/// Entity selector with tag filters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector {
    pub base: SelectorBase,
    #[serde(default)]
    pub entity_type: Option<String>,
    /// `(tag, negated)`
    #[serde(default)]
    pub tags: Vec<(String, bool)>,
}

impl Selector {
    /// `@s`
    pub fn this() -> Self {
        Self {
            base: SelectorBase::This,
            entity_type: None,
            tags: Vec::new(),
        }
    }

    /// `@e`
    pub fn entities() -> Self {
        Self {
            base: SelectorBase::Entities,
            ..Self::this()
        }
    }

    pub fn with_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tags.push((tag.into(), false));
        self
    }

    pub fn not_tagged(mut self, tag: impl Into<String>) -> Self {
        self.tags.push((tag.into(), true));
        self
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self.base {
            SelectorBase::This => "@s",
            SelectorBase::Entities => "@e",
        })?;
        if self.entity_type.is_none() && self.tags.is_empty() {
            return Ok(());
        }
        let mut filters: Vec<String> = Vec::with_capacity(self.tags.len() + 1);
        if let Some(ty) = &self.entity_type {
            filters.push(format!("type={ty}"));
        }
        for (tag, negated) in &self.tags {
            filters.push(format!("tag={}{tag}", if *negated { "!" } else { "" }));
        }
        write!(f, "[{}]", filters.join(","))
    }
}

/// Owner of a score: an entity or a fake player such as `#interp`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreHolder {
    Entity(Selector),
    Fake(String),
}

impl ScoreHolder {
    /// The executing entity.
    pub fn this() -> Self {
        Self::Entity(Selector::this())
    }
}

impl fmt::Display for ScoreHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity(sel) => sel.fmt(f),
            Self::Fake(name) => f.write_str(name),
        }
    }
}

/// Inclusive score range; `None` bounds are open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl ScoreRange {
    pub fn exact(v: i32) -> Self {
        Self {
            min: Some(v),
            max: Some(v),
        }
    }

    pub fn between(min: i32, max: i32) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn at_least(min: i32) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    #[inline]
    pub fn contains(&self, v: i32) -> bool {
        self.min.map_or(true, |m| v >= m) && self.max.map_or(true, |m| v <= m)
    }
}

impl fmt::Display for ScoreRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(a), Some(b)) if a == b => write!(f, "{a}"),
            (Some(a), Some(b)) => write!(f, "{a}..{b}"),
            (Some(a), None) => write!(f, "{a}.."),
            (None, Some(b)) => write!(f, "..{b}"),
            (None, None) => f.write_str(".."),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreOp {
    Assign,
    Add,
    Sub,
    Min,
    Max,
}

impl ScoreOp {
    fn symbol(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::Add => "+=",
            Self::Sub => "-=",
            Self::Min => "<",
            Self::Max => ">",
        }
    }
}

/// One sub-command of `execute`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ExecuteClause {
    /// `if|unless score <holder> <objective> matches <range>`
    Score {
        negate: bool,
        holder: ScoreHolder,
        objective: String,
        range: ScoreRange,
    },
    /// `if|unless entity <selector>`
    Entity { negate: bool, selector: Selector },
    /// `as <selector>`
    As(Selector),
    /// `at <selector>`
    At(Selector),
    /// `on passengers`
    OnPassengers,
    /// `positioned ^x ^y ^z`
    PositionedLocal([f64; 3]),
    /// `rotated ~yaw ~pitch`
    RotatedRelative([f64; 2]),
    /// `store result entity @s <path> int 1`
    StoreResultEntity { path: String },
    /// `store result score <holder> <objective>`
    StoreResultScore { holder: ScoreHolder, objective: String },
    /// Verbatim clause, e.g. a user-authored condition.
    Raw(String),
}

impl ExecuteClause {
    pub fn if_score(holder: ScoreHolder, objective: impl Into<String>, range: ScoreRange) -> Self {
        Self::Score {
            negate: false,
            holder,
            objective: objective.into(),
            range,
        }
    }

    pub fn unless_score(holder: ScoreHolder, objective: impl Into<String>, range: ScoreRange) -> Self {
        Self::Score {
            negate: true,
            holder,
            objective: objective.into(),
            range,
        }
    }

    pub fn if_entity(selector: Selector) -> Self {
        Self::Entity {
            negate: false,
            selector,
        }
    }

    pub fn unless_entity(selector: Selector) -> Self {
        Self::Entity {
            negate: true,
            selector,
        }
    }
}

fn if_unless(negate: bool) -> &'static str {
    if negate {
        "unless"
    } else {
        "if"
    }
}

/// Coordinate as the target expects it: no trailing `.0`, no `-0`.
fn coord(v: f64) -> String {
    let v = if v == 0.0 { 0.0 } else { v };
    format!("{v}")
}

impl fmt::Display for ExecuteClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Score {
                negate,
                holder,
                objective,
                range,
            } => write!(
                f,
                "{} score {holder} {objective} matches {range}",
                if_unless(*negate)
            ),
            Self::Entity { negate, selector } => {
                write!(f, "{} entity {selector}", if_unless(*negate))
            }
            Self::As(sel) => write!(f, "as {sel}"),
            Self::At(sel) => write!(f, "at {sel}"),
            Self::OnPassengers => f.write_str("on passengers"),
            Self::PositionedLocal([x, y, z]) => {
                write!(f, "positioned ^{} ^{} ^{}", coord(*x), coord(*y), coord(*z))
            }
            Self::RotatedRelative([yaw, pitch]) => {
                write!(f, "rotated ~{} ~{}", coord(*yaw), coord(*pitch))
            }
            Self::StoreResultEntity { path } => {
                write!(f, "store result entity @s {path} int 1")
            }
            Self::StoreResultScore { holder, objective } => {
                write!(f, "store result score {holder} {objective}")
            }
            Self::Raw(text) => f.write_str(text),
        }
    }
}

/// One line of a function file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    ObjectiveAdd { name: String },
    ScoreSet { holder: ScoreHolder, objective: String, value: i32 },
    ScoreAdd { holder: ScoreHolder, objective: String, value: i32 },
    ScoreRemove { holder: ScoreHolder, objective: String, value: i32 },
    ScoreOperation {
        target: ScoreHolder,
        target_objective: String,
        op: ScoreOp,
        source: ScoreHolder,
        source_objective: String,
    },
    ScoreGet { holder: ScoreHolder, objective: String },
    ScoreReset { holder: ScoreHolder, objective: Option<String> },
    TagAdd { target: Selector, tag: String },
    TagRemove { target: Selector, tag: String },
    Function(FunctionPath),
    Execute {
        clauses: Vec<ExecuteClause>,
        run: Box<Command>,
    },
    /// `data merge entity <target> <nbt>`
    DataMerge { target: Selector, data: NbtCompound },
    /// `tp <target> ^x ^y ^z ~yaw ~pitch`
    Teleport {
        target: Selector,
        local: [f64; 3],
        rotation: [f64; 2],
    },
    /// `summon <entity> ~ ~ ~ <nbt>`
    Summon { entity: String, data: NbtCompound },
    Kill(Selector),
    /// Verbatim command (user-authored).
    Raw(String),
    Comment(String),
}

impl Command {
    pub fn function(path: FunctionPath) -> Self {
        Self::Function(path)
    }

    pub fn execute(clauses: Vec<ExecuteClause>, run: Command) -> Self {
        Self::Execute {
            clauses,
            run: Box::new(run),
        }
    }

    pub fn set(holder: ScoreHolder, objective: impl Into<String>, value: i32) -> Self {
        Self::ScoreSet {
            holder,
            objective: objective.into(),
            value,
        }
    }

    pub fn add(holder: ScoreHolder, objective: impl Into<String>, value: i32) -> Self {
        Self::ScoreAdd {
            holder,
            objective: objective.into(),
            value,
        }
    }

    pub fn copy_score(
        target: ScoreHolder,
        target_objective: impl Into<String>,
        source: ScoreHolder,
        source_objective: impl Into<String>,
    ) -> Self {
        Self::ScoreOperation {
            target,
            target_objective: target_objective.into(),
            op: ScoreOp::Assign,
            source,
            source_objective: source_objective.into(),
        }
    }

    pub fn tag_add(target: Selector, tag: impl Into<String>) -> Self {
        Self::TagAdd {
            target,
            tag: tag.into(),
        }
    }

    pub fn tag_remove(target: Selector, tag: impl Into<String>) -> Self {
        Self::TagRemove {
            target,
            tag: tag.into(),
        }
    }

    #[inline]
    pub fn is_comment(&self) -> bool {
        matches!(self, Self::Comment(_))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ObjectiveAdd { name } => write!(f, "scoreboard objectives add {name} dummy"),
            Self::ScoreSet {
                holder,
                objective,
                value,
            } => write!(f, "scoreboard players set {holder} {objective} {value}"),
            Self::ScoreAdd {
                holder,
                objective,
                value,
            } => write!(f, "scoreboard players add {holder} {objective} {value}"),
            Self::ScoreRemove {
                holder,
                objective,
                value,
            } => write!(f, "scoreboard players remove {holder} {objective} {value}"),
            Self::ScoreOperation {
                target,
                target_objective,
                op,
                source,
                source_objective,
            } => write!(
                f,
                "scoreboard players operation {target} {target_objective} {} {source} {source_objective}",
                op.symbol()
            ),
            Self::ScoreGet { holder, objective } => {
                write!(f, "scoreboard players get {holder} {objective}")
            }
            Self::ScoreReset { holder, objective } => match objective {
                Some(obj) => write!(f, "scoreboard players reset {holder} {obj}"),
                None => write!(f, "scoreboard players reset {holder}"),
            },
            Self::TagAdd { target, tag } => write!(f, "tag {target} add {tag}"),
            Self::TagRemove { target, tag } => write!(f, "tag {target} remove {tag}"),
            Self::Function(path) => write!(f, "function {path}"),
            Self::Execute { clauses, run } => {
                f.write_str("execute")?;
                for clause in clauses {
                    write!(f, " {clause}")?;
                }
                write!(f, " run {run}")
            }
            Self::DataMerge { target, data } => write!(f, "data merge entity {target} {data}"),
            Self::Teleport {
                target,
                local: [x, y, z],
                rotation: [yaw, pitch],
            } => write!(
                f,
                "tp {target} ^{} ^{} ^{} ~{} ~{}",
                coord(*x),
                coord(*y),
                coord(*z),
                coord(*yaw),
                coord(*pitch)
            ),
            Self::Summon { entity, data } => write!(f, "summon {entity} ~ ~ ~ {data}"),
            Self::Kill(sel) => write!(f, "kill {sel}"),
            Self::Raw(text) => f.write_str(text),
            Self::Comment(text) => write!(f, "# {text}"),
        }
    }
}
