//! Playback state machine, expressed as control functions run by the rig root.
//!
//! State lives entirely in scores and tags (see [`crate::runtime_vars`]):
//! - Stopped: no playing tag, local time 0
//! - Playing: playing tag, tween 0
//! - Tweening: playing tag, tween > 0 (local time frozen)
//! - Held: no playing tag, local time at the last frame

use super::{AnimationPaths, Codegen};
use crate::command::{Command, ExecuteClause, ScoreHolder, ScoreRange, Selector};
use crate::datapack::Datapack;
use crate::error::Result;
use crate::frame::AnimationDescriptor;

fn set(objective: String, value: i32) -> Command {
    Command::set(ScoreHolder::this(), objective, value)
}

fn copy(target: String, source: String) -> Command {
    Command::copy_score(ScoreHolder::this(), target, ScoreHolder::this(), source)
}

fn if_score(objective: String, range: ScoreRange) -> ExecuteClause {
    ExecuteClause::if_score(ScoreHolder::this(), objective, range)
}

pub(crate) fn emit_controls(
    cg: &Codegen<'_>,
    paths: &AnimationPaths,
    anim: &AnimationDescriptor,
    pack: &mut Datapack,
) -> Result<()> {
    let v = &cg.vars;
    let name = anim.storage_name.as_str();
    let local = v.local_time(name);
    let playing = v.playing_tag(name);
    let loop_mode = v.loop_mode(name);
    let sync = Command::function(cg.function("sync_interpolation"));
    let default_interp = cg.config.interpolation_duration as i32;
    let default_tween = cg.config.tween_duration as i32;
    let duration = anim.duration as i32;

    let start_playing = Command::tag_add(Selector::this(), playing.clone());
    let apply_first = vec![set(v.frame(), 0), Command::function(paths.dispatch())];
    let tween_setup = vec![
        set(v.tween(), default_tween),
        Command::execute(
            vec![if_score(v.tween_request(), ScoreRange::at_least(1))],
            copy(v.tween(), v.tween_request()),
        ),
        Command::ScoreReset {
            holder: ScoreHolder::this(),
            objective: Some(v.tween_request()),
        },
        copy(v.interp(), v.tween()),
        sync.clone(),
    ];

    let mut play = vec![
        set(local.clone(), 0),
        set(v.tween(), 0),
        set(v.interp(), 0),
        sync.clone(),
    ];
    play.extend(apply_first.clone());
    play.extend([set(v.interp(), default_interp), sync.clone(), start_playing.clone()]);
    pack.add_function(paths.control("play"), play)?;

    pack.add_function(
        paths.control("resume"),
        vec![start_playing.clone(), set(v.interp(), default_interp), sync.clone()],
    )?;

    pack.add_function(
        paths.control("pause"),
        vec![Command::tag_remove(Selector::this(), playing.clone())],
    )?;

    let mut stop = vec![set(local.clone(), 0), set(v.tween(), 0)];
    stop.extend(cg.suppressed(apply_first.clone()));
    stop.push(Command::tag_remove(Selector::this(), playing.clone()));
    pack.add_function(paths.control("stop"), stop)?;

    let mut tween_play = vec![set(local.clone(), 0)];
    tween_play.extend(tween_setup.clone());
    tween_play.extend(cg.suppressed(apply_first));
    tween_play.push(start_playing.clone());
    pack.add_function(paths.control("tween_play"), tween_play)?;

    let seek_current = vec![copy(v.frame(), local.clone()), Command::function(paths.seek())];
    let mut tween_resume = tween_setup;
    tween_resume.extend(cg.suppressed(seek_current.clone()));
    tween_resume.push(start_playing);
    pack.add_function(paths.control("tween_resume"), tween_resume)?;

    // Tweening freezes local time; the rig's `on_tick` counts the tween down once per instance
    // after every animation has ticked.
    pack.add_function(
        paths.control("tick"),
        vec![Command::execute(
            vec![ExecuteClause::unless_score(
                ScoreHolder::this(),
                v.tween(),
                ScoreRange::at_least(1),
            )],
            Command::function(paths.control("advance")),
        )],
    )?;

    let is_playing = || ExecuteClause::if_entity(Selector::this().tagged(playing.clone()));
    pack.add_function(
        paths.control("advance"),
        vec![
            Command::add(ScoreHolder::this(), local.clone(), 1),
            Command::execute(
                vec![if_score(local.clone(), ScoreRange::at_least(duration))],
                Command::function(paths.control("end")),
            ),
            Command::execute(vec![is_playing()], copy(v.frame(), local.clone())),
            Command::execute(vec![is_playing()], Command::function(paths.dispatch())),
        ],
    )?;

    let restart_at = duration + anim.loop_delay as i32;
    let last_tick = duration.max(1) - 1;
    let mode = |score: i32| if_score(loop_mode.clone(), ScoreRange::exact(score));
    pack.add_function(
        paths.control("end"),
        vec![
            Command::execute(
                vec![mode(0), if_score(local.clone(), ScoreRange::at_least(restart_at))],
                set(local.clone(), 0),
            ),
            Command::execute(
                vec![mode(0), if_score(local.clone(), ScoreRange::exact(0))],
                sync.clone(),
            ),
            Command::execute(vec![mode(1)], Command::function(paths.control("stop"))),
            Command::execute(vec![mode(2)], set(local.clone(), last_tick)),
            Command::execute(vec![mode(2)], Command::function(paths.control("pause"))),
        ],
    )?;

    pack.add_function(
        paths.control("apply_frame"),
        vec![copy(v.frame(), local.clone()), Command::function(paths.dispatch())],
    )?;

    pack.add_function(paths.control("set_frame"), cg.suppressed(seek_current))?;
    Ok(())
}
