//! The simulated world: functions, entities and the scoreboard.

use hashbrown::{HashMap, HashSet};
use rigbake_core::command::{ScoreOp, SelectorBase};
use rigbake_core::{Command, Datapack, ExecuteClause, FunctionPath, ScoreHolder, Selector};
use rigbake_nbt::{Nbt, NbtCompound};
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId};
use crate::error::{Result, SimError};

/// Nesting limit for function calls, mirroring the target's own guard against runaway recursion.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// A verbatim command that reached the world. Raw commands are user content the simulator does
/// not interpret, so they are recorded instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOutput {
    pub executor: Option<EntityId>,
    pub command: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum HolderKey {
    Entity(EntityId),
    Fake(String),
}

#[derive(Deserialize)]
struct FunctionTag {
    values: Vec<String>,
}

/// Execution context of one command: who `@s` is.
#[derive(Clone, Copy, Debug)]
struct Context {
    executor: Option<EntityId>,
}

/// Outcome of one command: `None` when it failed, otherwise its result value.
type Outcome = Option<i32>;

pub struct World {
    functions: HashMap<FunctionPath, Vec<Command>>,
    tick_functions: Vec<FunctionPath>,
    load_functions: Vec<FunctionPath>,
    entities: Vec<Entity>,
    objectives: HashSet<String>,
    scores: HashMap<(HolderKey, String), i32>,
    conditions: HashMap<String, bool>,
    output: Vec<RawOutput>,
    max_depth: usize,
    game_time: u64,
}

fn parse_function_id(tag: &str, id: &str) -> Result<FunctionPath> {
    match id.split_once(':') {
        Some((ns, path)) if !ns.is_empty() && !path.is_empty() => Ok(FunctionPath::new(ns, path)),
        _ => Err(SimError::InvalidTag {
            path: tag.to_string(),
            reason: format!("'{id}' is not a namespaced function id"),
        }),
    }
}

fn read_tag(pack: &Datapack, name: &str) -> Result<Vec<FunctionPath>> {
    let path = format!("data/minecraft/tags/function/{name}.json");
    let Some(text) = pack.contents(&path) else {
        return Ok(Vec::new());
    };
    let tag: FunctionTag = serde_json::from_str(&text).map_err(|e| SimError::InvalidTag {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    tag.values
        .iter()
        .map(|id| parse_function_id(&path, id))
        .collect()
}

impl World {
    /// Load every function and the `tick`/`load` tags of a pack. Nothing runs yet.
    pub fn new(pack: &Datapack) -> Result<Self> {
        let functions: HashMap<FunctionPath, Vec<Command>> = pack
            .functions()
            .map(|(path, commands)| (path.clone(), commands.to_vec()))
            .collect();
        let world = Self {
            tick_functions: read_tag(pack, "tick")?,
            load_functions: read_tag(pack, "load")?,
            functions,
            entities: Vec::new(),
            objectives: HashSet::new(),
            scores: HashMap::new(),
            conditions: HashMap::new(),
            output: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            game_time: 0,
        };
        log::debug!(
            "sim world: {} function(s), {} tick hook(s), {} load hook(s)",
            world.functions.len(),
            world.tick_functions.len(),
            world.load_functions.len()
        );
        Ok(world)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Run the `load` tag.
    pub fn load(&mut self) -> Result<()> {
        for path in self.load_functions.clone() {
            self.call(&path, Context { executor: None }, 0)?;
        }
        Ok(())
    }

    /// Advance one game tick: run the `tick` tag.
    pub fn tick(&mut self) -> Result<()> {
        self.game_time += 1;
        for path in self.tick_functions.clone() {
            self.call(&path, Context { executor: None }, 0)?;
        }
        Ok(())
    }

    pub fn tick_n(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.tick()?;
        }
        Ok(())
    }

    #[inline]
    pub fn game_time(&self) -> u64 {
        self.game_time
    }

    /// Run `path` with `executor` as `@s` (or from the server when `None`).
    pub fn run(&mut self, path: &FunctionPath, executor: Option<EntityId>) -> Result<()> {
        self.call(path, Context { executor }, 0).map(|_| ())
    }

    /// Run `<namespace>:<path>` as `entity`.
    pub fn call_as(&mut self, entity: EntityId, namespace: &str, path: &str) -> Result<()> {
        self.run(&FunctionPath::new(namespace, path), Some(entity))
    }

    /// Run `<namespace>:summon` and return the root it created.
    pub fn summon(&mut self, namespace: &str) -> Result<EntityId> {
        let before = self.entities.len();
        let path = FunctionPath::new(namespace, "summon");
        self.run(&path, None)?;
        let root = self.entities[before..]
            .iter()
            .find(|e| e.vehicle.is_none())
            .map(|e| e.id)
            .ok_or(SimError::NothingSummoned { path })?;
        log::debug!(
            "summoned {namespace} root {:?} with {} passenger(s)",
            root,
            self.entities[root.index()].passengers.len()
        );
        Ok(root)
    }

    // --- inspection -----------------------------------------------------------------------

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index())
    }

    /// Living entities in summon order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.alive)
    }

    pub fn passengers(&self, id: EntityId) -> impl Iterator<Item = &Entity> {
        self.entity(id)
            .map(|e| e.passengers.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(move |p| self.entity(*p))
            .filter(|p| p.alive)
    }

    pub fn find_passenger(&self, root: EntityId, tag: &str) -> Option<&Entity> {
        self.passengers(root).find(|p| p.has_tag(tag))
    }

    pub fn has_tag(&self, id: EntityId, tag: &str) -> bool {
        self.entity(id).is_some_and(|e| e.has_tag(tag))
    }

    pub fn has_objective(&self, objective: &str) -> bool {
        self.objectives.contains(objective)
    }

    pub fn score(&self, id: EntityId, objective: &str) -> Option<i32> {
        self.scores
            .get(&(HolderKey::Entity(id), objective.to_string()))
            .copied()
    }

    pub fn fake_score(&self, holder: &str, objective: &str) -> Option<i32> {
        self.scores
            .get(&(HolderKey::Fake(holder.to_string()), objective.to_string()))
            .copied()
    }

    /// Set a score directly, as a caller outside the generated functions would.
    pub fn set_score(&mut self, id: EntityId, objective: &str, value: i32) -> Result<()> {
        self.require_objective(objective)?;
        self.scores
            .insert((HolderKey::Entity(id), objective.to_string()), value);
        Ok(())
    }

    /// Outcome of a verbatim `execute` condition. Unknown conditions pass.
    pub fn set_condition(&mut self, condition: impl Into<String>, passes: bool) {
        self.conditions.insert(condition.into(), passes);
    }

    pub fn output(&self) -> &[RawOutput] {
        &self.output
    }

    pub fn take_output(&mut self) -> Vec<RawOutput> {
        std::mem::take(&mut self.output)
    }

    // --- evaluation -----------------------------------------------------------------------

    fn require_objective(&self, objective: &str) -> Result<()> {
        if self.objectives.contains(objective) {
            Ok(())
        } else {
            Err(SimError::UnknownObjective {
                objective: objective.to_string(),
            })
        }
    }

    fn call(&mut self, path: &FunctionPath, ctx: Context, depth: usize) -> Result<Outcome> {
        if depth >= self.max_depth {
            return Err(SimError::RecursionLimit {
                path: path.clone(),
                limit: self.max_depth,
            });
        }
        let Some(commands) = self.functions.get(path).cloned() else {
            return Err(SimError::UnknownFunction { path: path.clone() });
        };
        log::trace!("enter {path} as {:?}", ctx.executor);
        for command in &commands {
            self.run_command(command, ctx, depth + 1)?;
        }
        Ok(Some(commands.len() as i32))
    }

    fn select(&self, selector: &Selector, ctx: Context) -> Vec<EntityId> {
        match selector.base {
            SelectorBase::This => ctx
                .executor
                .and_then(|id| self.entity(id))
                .filter(|e| e.matches(selector))
                .map(|e| vec![e.id])
                .unwrap_or_default(),
            SelectorBase::Entities => self
                .entities
                .iter()
                .filter(|e| e.matches(selector))
                .map(|e| e.id)
                .collect(),
        }
    }

    fn holders(&self, holder: &ScoreHolder, ctx: Context) -> Vec<HolderKey> {
        match holder {
            ScoreHolder::Fake(name) => vec![HolderKey::Fake(name.clone())],
            ScoreHolder::Entity(sel) => self
                .select(sel, ctx)
                .into_iter()
                .map(HolderKey::Entity)
                .collect(),
        }
    }

    fn update_scores(
        &mut self,
        holder: &ScoreHolder,
        objective: &str,
        ctx: Context,
        f: impl Fn(Option<i32>) -> i32,
    ) -> Result<Outcome> {
        self.require_objective(objective)?;
        let targets = self.holders(holder, ctx);
        let mut last = None;
        for key in targets {
            let slot = (key, objective.to_string());
            let value = f(self.scores.get(&slot).copied());
            self.scores.insert(slot, value);
            last = Some(value);
        }
        Ok(last)
    }

    fn run_command(&mut self, command: &Command, ctx: Context, depth: usize) -> Result<Outcome> {
        match command {
            Command::Comment(_) => Ok(Some(0)),
            Command::ObjectiveAdd { name } => {
                Ok(self.objectives.insert(name.clone()).then_some(1))
            }
            Command::ScoreSet {
                holder,
                objective,
                value,
            } => self.update_scores(holder, objective, ctx, |_| *value),
            Command::ScoreAdd {
                holder,
                objective,
                value,
            } => self.update_scores(holder, objective, ctx, |old| {
                old.unwrap_or(0).wrapping_add(*value)
            }),
            Command::ScoreRemove {
                holder,
                objective,
                value,
            } => self.update_scores(holder, objective, ctx, |old| {
                old.unwrap_or(0).wrapping_sub(*value)
            }),
            Command::ScoreOperation {
                target,
                target_objective,
                op,
                source,
                source_objective,
            } => {
                self.require_objective(target_objective)?;
                self.require_objective(source_objective)?;
                let sources = self.holders(source, ctx);
                let targets = self.holders(target, ctx);
                let mut last = None;
                for t in &targets {
                    for s in &sources {
                        let src = self
                            .scores
                            .get(&(s.clone(), source_objective.clone()))
                            .copied()
                            .unwrap_or(0);
                        let slot = (t.clone(), target_objective.clone());
                        let old = self.scores.get(&slot).copied().unwrap_or(0);
                        let value = match op {
                            ScoreOp::Assign => src,
                            ScoreOp::Add => old.wrapping_add(src),
                            ScoreOp::Sub => old.wrapping_sub(src),
                            ScoreOp::Min => old.min(src),
                            ScoreOp::Max => old.max(src),
                        };
                        self.scores.insert(slot, value);
                        last = Some(value);
                    }
                }
                Ok(last)
            }
            Command::ScoreGet { holder, objective } => {
                self.require_objective(objective)?;
                let value = self
                    .holders(holder, ctx)
                    .first()
                    .and_then(|key| self.scores.get(&(key.clone(), objective.clone())))
                    .copied();
                Ok(value)
            }
            Command::ScoreReset { holder, objective } => {
                let keys = self.holders(holder, ctx);
                self.scores.retain(|(key, obj), _| {
                    !(keys.contains(key) && objective.as_ref().map_or(true, |o| o == obj))
                });
                Ok(Some(keys.len() as i32))
            }
            Command::TagAdd { target, tag } => {
                let mut added = 0;
                for id in self.select(target, ctx) {
                    if self.entities[id.index()].tags.insert(tag.clone()) {
                        added += 1;
                    }
                }
                Ok((added > 0).then_some(added))
            }
            Command::TagRemove { target, tag } => {
                let mut removed = 0;
                for id in self.select(target, ctx) {
                    if self.entities[id.index()].tags.remove(tag) {
                        removed += 1;
                    }
                }
                Ok((removed > 0).then_some(removed))
            }
            Command::Function(path) => self.call(path, ctx, depth),
            Command::Execute { clauses, run } => self.execute(clauses, run, ctx, depth),
            Command::DataMerge { target, data } => {
                let targets = self.select(target, ctx);
                for id in &targets {
                    self.entities[id.index()].data.merge(data);
                }
                Ok((!targets.is_empty()).then_some(targets.len() as i32))
            }
            Command::Teleport {
                target,
                local,
                rotation,
            } => {
                let targets = self.select(target, ctx);
                for id in &targets {
                    self.entities[id.index()].teleport = Some((*local, *rotation));
                }
                Ok((!targets.is_empty()).then_some(targets.len() as i32))
            }
            Command::Summon { entity, data } => {
                self.spawn(entity, data, None);
                Ok(Some(1))
            }
            Command::Kill(selector) => {
                let targets = self.select(selector, ctx);
                for id in &targets {
                    self.kill(*id);
                }
                Ok((!targets.is_empty()).then_some(targets.len() as i32))
            }
            Command::Raw(text) => {
                self.output.push(RawOutput {
                    executor: ctx.executor,
                    command: text.clone(),
                });
                Ok(Some(1))
            }
        }
    }

    /// Evaluate `clauses` left to right, forking on `as` and `on passengers`.
    fn execute(
        &mut self,
        clauses: &[ExecuteClause],
        run: &Command,
        ctx: Context,
        depth: usize,
    ) -> Result<Outcome> {
        let Some((clause, rest)) = clauses.split_first() else {
            return self.run_command(run, ctx, depth);
        };
        match clause {
            ExecuteClause::Score {
                negate,
                holder,
                objective,
                range,
            } => {
                self.require_objective(objective)?;
                let matched = self
                    .holders(holder, ctx)
                    .first()
                    .and_then(|key| self.scores.get(&(key.clone(), objective.clone())))
                    .is_some_and(|v| range.contains(*v));
                self.continue_if(matched != *negate, rest, run, ctx, depth)
            }
            ExecuteClause::Entity { negate, selector } => {
                let found = !self.select(selector, ctx).is_empty();
                self.continue_if(found != *negate, rest, run, ctx, depth)
            }
            ExecuteClause::As(selector) => {
                let targets = self.select(selector, ctx);
                self.fork(targets, rest, run, depth)
            }
            ExecuteClause::OnPassengers => {
                let targets: Vec<EntityId> = ctx
                    .executor
                    .map(|id| self.passengers(id).map(|p| p.id).collect())
                    .unwrap_or_default();
                self.fork(targets, rest, run, depth)
            }
            // Positions are not simulated.
            ExecuteClause::At(_)
            | ExecuteClause::PositionedLocal(_)
            | ExecuteClause::RotatedRelative(_) => self.execute(rest, run, ctx, depth),
            ExecuteClause::StoreResultEntity { path } => {
                let outcome = self.execute(rest, run, ctx, depth)?;
                if let Some(id) = ctx.executor {
                    let data = &mut self.entities[id.index()].data;
                    data.insert(path.as_str(), Nbt::Int(outcome.unwrap_or(0)));
                }
                Ok(outcome)
            }
            ExecuteClause::StoreResultScore { holder, objective } => {
                let outcome = self.execute(rest, run, ctx, depth)?;
                let stored = outcome.unwrap_or(0);
                self.update_scores(holder, objective, ctx, |_| stored)?;
                Ok(outcome)
            }
            ExecuteClause::Raw(condition) => {
                let passes = self.conditions.get(condition).copied().unwrap_or(true);
                self.continue_if(passes, rest, run, ctx, depth)
            }
        }
    }

    fn continue_if(
        &mut self,
        passes: bool,
        rest: &[ExecuteClause],
        run: &Command,
        ctx: Context,
        depth: usize,
    ) -> Result<Outcome> {
        if passes {
            self.execute(rest, run, ctx, depth)
        } else {
            Ok(None)
        }
    }

    fn fork(
        &mut self,
        targets: Vec<EntityId>,
        rest: &[ExecuteClause],
        run: &Command,
        depth: usize,
    ) -> Result<Outcome> {
        let mut succeeded = 0;
        for id in targets {
            let ctx = Context { executor: Some(id) };
            if self.execute(rest, run, ctx, depth)?.is_some() {
                succeeded += 1;
            }
        }
        Ok((succeeded > 0).then_some(succeeded))
    }

    /// Create an entity from a summon payload. `Tags` and `Passengers` are split out, the rest
    /// becomes the entity's data.
    fn spawn(&mut self, entity_type: &str, payload: &NbtCompound, vehicle: Option<EntityId>) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        let mut entity = Entity::new(id, entity_type);
        entity.vehicle = vehicle;
        let mut data = payload.clone();
        if let Some(Nbt::List(tags)) = data.remove("Tags") {
            entity
                .tags
                .extend(tags.iter().filter_map(Nbt::as_str).map(str::to_string));
        }
        let passengers = data.remove("Passengers");
        data.remove("id");
        entity.data = data;
        self.entities.push(entity);

        if let Some(Nbt::List(list)) = passengers {
            for passenger in list.iter().filter_map(Nbt::as_compound) {
                let Some(ty) = passenger.get("id").and_then(Nbt::as_str) else {
                    log::warn!("passenger without an id under {entity_type}; skipped");
                    continue;
                };
                let child = self.spawn(ty, passenger, Some(id));
                self.entities[id.index()].passengers.push(child);
            }
        }
        id
    }

    fn kill(&mut self, id: EntityId) {
        let entity = &mut self.entities[id.index()];
        if !entity.alive {
            return;
        }
        entity.alive = false;
        let vehicle = entity.vehicle.take();
        let passengers = std::mem::take(&mut entity.passengers);
        if let Some(v) = vehicle {
            self.entities[v.index()].passengers.retain(|p| *p != id);
        }
        for p in passengers {
            self.entities[p.index()].vehicle = None;
        }
        self.scores
            .retain(|(key, _), _| *key != HolderKey::Entity(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigbake_core::{ScoreRange, Selector};
    use rigbake_nbt::NbtList;

    fn ns(path: &str) -> FunctionPath {
        FunctionPath::new("t", path)
    }

    fn pack(functions: Vec<(&str, Vec<Command>)>) -> Datapack {
        let mut pack = Datapack::new();
        for (path, commands) in functions {
            pack.add_function(ns(path), commands).unwrap();
        }
        pack.add_text(
            "data/minecraft/tags/function/load.json",
            r#"{"values":["t:load"]}"#,
        )
        .unwrap();
        pack.add_text(
            "data/minecraft/tags/function/tick.json",
            r#"{"values":["t:tick"]}"#,
        )
        .unwrap();
        pack
    }

    fn summon_payload() -> NbtCompound {
        let passenger = NbtCompound::new()
            .with("id", "minecraft:item_display")
            .with("Tags", NbtList::strings(["t.node.a"]))
            .with("interpolation_duration", Nbt::Int(3));
        NbtCompound::new()
            .with("Tags", NbtList::strings(["t.root"]))
            .with("Passengers", NbtList::new().with(passenger))
    }

    fn base_world(extra: Vec<(&str, Vec<Command>)>) -> World {
        let mut functions = vec![
            ("load", vec![Command::ObjectiveAdd { name: "t.n".into() }]),
            (
                "tick",
                vec![Command::execute(
                    vec![ExecuteClause::As(Selector::entities().tagged("t.root"))],
                    Command::add(ScoreHolder::this(), "t.n", 1),
                )],
            ),
            (
                "summon",
                vec![Command::Summon {
                    entity: "minecraft:item_display".into(),
                    data: summon_payload(),
                }],
            ),
        ];
        functions.extend(extra);
        let mut world = World::new(&pack(functions)).unwrap();
        world.load().unwrap();
        world
    }

    #[test]
    fn summon_splits_tags_and_passengers() {
        let mut world = base_world(Vec::new());
        let root = world.summon("t").unwrap();
        assert!(world.has_tag(root, "t.root"));
        let a = world.find_passenger(root, "t.node.a").unwrap();
        assert_eq!(a.int("interpolation_duration"), Some(3));
        assert!(a.data.get("id").is_none());
        assert_eq!(a.vehicle, Some(root));
    }

    #[test]
    fn tick_hooks_run_as_roots() {
        let mut world = base_world(Vec::new());
        let root = world.summon("t").unwrap();
        world.tick_n(3).unwrap();
        assert_eq!(world.score(root, "t.n"), Some(3));
        assert_eq!(world.game_time(), 3);
    }

    #[test]
    fn unset_scores_fail_if_and_pass_unless() {
        let mut world = base_world(vec![(
            "check",
            vec![
                Command::execute(
                    vec![ExecuteClause::if_score(ScoreHolder::this(), "t.n", ScoreRange::at_least(0))],
                    Command::Raw("say if".into()),
                ),
                Command::execute(
                    vec![ExecuteClause::unless_score(ScoreHolder::this(), "t.n", ScoreRange::at_least(0))],
                    Command::Raw("say unless".into()),
                ),
            ],
        )]);
        let root = world.summon("t").unwrap();
        world.call_as(root, "t", "check").unwrap();
        let said: Vec<_> = world.take_output().into_iter().map(|o| o.command).collect();
        assert_eq!(said, vec!["say unless".to_string()]);
    }

    #[test]
    fn store_result_writes_each_passenger() {
        let mut world = base_world(vec![(
            "sync",
            vec![
                Command::set(ScoreHolder::Fake("#v".into()), "t.n", 9),
                Command::execute(
                    vec![
                        ExecuteClause::OnPassengers,
                        ExecuteClause::StoreResultEntity {
                            path: "interpolation_duration".into(),
                        },
                    ],
                    Command::ScoreGet {
                        holder: ScoreHolder::Fake("#v".into()),
                        objective: "t.n".into(),
                    },
                ),
            ],
        )]);
        let root = world.summon("t").unwrap();
        world.call_as(root, "t", "sync").unwrap();
        let a = world.find_passenger(root, "t.node.a").unwrap();
        assert_eq!(a.int("interpolation_duration"), Some(9));
        assert_eq!(world.fake_score("#v", "t.n"), Some(9));
    }

    #[test]
    fn raw_conditions_follow_the_configured_outcome() {
        let cond = "if entity @p[distance=..4]";
        let mut world = base_world(vec![(
            "say",
            vec![Command::execute(
                vec![ExecuteClause::Raw(cond.into())],
                Command::Raw("say hi".into()),
            )],
        )]);
        let root = world.summon("t").unwrap();
        world.call_as(root, "t", "say").unwrap();
        assert_eq!(world.take_output().len(), 1);
        world.set_condition(cond, false);
        world.call_as(root, "t", "say").unwrap();
        assert!(world.output().is_empty());
    }

    #[test]
    fn kill_detaches_passengers() {
        let mut world = base_world(vec![(
            "remove",
            vec![
                Command::execute(vec![ExecuteClause::OnPassengers], Command::Kill(Selector::this())),
                Command::Kill(Selector::this()),
            ],
        )]);
        let root = world.summon("t").unwrap();
        world.set_score(root, "t.n", 4).unwrap();
        world.call_as(root, "t", "remove").unwrap();
        assert_eq!(world.entities().count(), 0);
        assert_eq!(world.score(root, "t.n"), None);
    }

    #[test]
    fn errors_surface() {
        let mut world = base_world(vec![
            ("loop", vec![Command::function(ns("loop"))]),
            (
                "bad",
                vec![Command::set(ScoreHolder::Fake("#x".into()), "t.missing", 1)],
            ),
        ]);
        world.max_depth = 16;
        assert!(matches!(
            world.run(&ns("loop"), None),
            Err(SimError::RecursionLimit { .. })
        ));
        assert_eq!(
            world.run(&ns("bad"), None),
            Err(SimError::UnknownObjective {
                objective: "t.missing".into()
            })
        );
        assert_eq!(
            world.run(&ns("absent"), None),
            Err(SimError::UnknownFunction { path: ns("absent") })
        );
    }

    #[test]
    fn malformed_tag_is_rejected() {
        let mut pack = Datapack::new();
        pack.add_text(
            "data/minecraft/tags/function/tick.json",
            r#"{"values":["no_namespace"]}"#,
        )
        .unwrap();
        assert!(matches!(World::new(&pack), Err(SimError::InvalidTag { .. })));
    }
}
