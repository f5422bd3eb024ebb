//! Fixed tick simulation
//!
//! One call to [`tick`] advances an episode by one frame: poll pilots, move
//! birds, resolve collisions, scroll and recycle pipes, score, prune.
//! Removals are marked during the scans and applied in a single compaction
//! pass at the end, so no bird or controller is skipped mid-iteration.

use rand::Rng;

use super::collision::{collides_with_footprint, out_of_bounds};
use super::sprite::SpriteSet;
use super::state::{Episode, EpisodePhase, Pipe, TickEvent};
use crate::consts::*;
use crate::controller::Observation;

/// Index of the pipe every bird looks at this tick.
///
/// Chosen from the first bird's lane only: the first pipe whose trailing edge
/// has not yet gone past it.
pub fn lookahead_index(pipes: &[Pipe], lane_x: f32) -> usize {
    pipes
        .iter()
        .position(|p| lane_x <= p.trailing_edge())
        .unwrap_or(pipes.len().saturating_sub(1))
}

/// Observation vector for a bird at height `y` facing `pipe`
pub fn observe(y: f32, pipe: &Pipe) -> Observation {
    [y, (y - pipe.height).abs(), (y - pipe.bottom).abs()]
}

/// Advance the episode by one tick
pub fn tick<R: Rng>(episode: &mut Episode<'_, R>) -> Vec<TickEvent> {
    let mut events = Vec::new();
    if episode.phase == EpisodePhase::Terminal {
        return events;
    }
    episode.ticks += 1;
    let sprites = SpriteSet::shared();

    // 1. Shared lookahead pipe
    let Some(first) = episode.contenders.first() else {
        episode.phase = EpisodePhase::Terminal;
        events.push(TickEvent::EpisodeOver);
        return events;
    };
    let pipe_ind = lookahead_index(&episode.pipes, first.agent.x);

    // 2. Decide and move
    for contender in &mut episode.contenders {
        let observation = match episode.pipes.get(pipe_ind) {
            Some(pipe) => observe(contender.agent.y, pipe),
            None => [contender.agent.y, 0.0, 0.0],
        };
        let output = contender.controller.decide(&observation);
        contender.pending += SURVIVAL_REWARD;
        if output > JUMP_THRESHOLD {
            contender.agent.jump();
        }
        contender.agent.advance();
    }

    // 3. Collisions and passes
    let footprints: Vec<_> = episode
        .contenders
        .iter()
        .map(|c| sprites.bird_footprint(&c.agent))
        .collect();
    let mut passed_pipe = None;
    for pipe in &mut episode.pipes {
        for (contender, (mask, origin)) in episode.contenders.iter_mut().zip(&footprints) {
            if contender.crashed {
                continue;
            }
            if collides_with_footprint(mask, *origin, pipe, sprites) {
                contender.crashed = true;
                contender.pending = 0.0;
                contender.reward(COLLISION_PENALTY);
                log::debug!("bird {} hit pipe {}", contender.agent.id, pipe.id);
                events.push(TickEvent::Collided {
                    agent: contender.agent.id,
                    pipe: pipe.id,
                });
            }

            if !pipe.passed && pipe.x < contender.agent.x {
                pipe.passed = true;
                passed_pipe = Some(pipe.id);
            }
        }
    }
    for contender in &mut episode.contenders {
        if contender.pending != 0.0 {
            let credit = std::mem::take(&mut contender.pending);
            contender.reward(credit);
        }
    }

    // 4. Scroll and collect pipes that left the screen
    let mut retired = Vec::new();
    for pipe in &mut episode.pipes {
        pipe.scroll();
        if pipe.is_off_screen() {
            retired.push(pipe.id);
        }
    }

    // 5. Score the pass
    if let Some(pipe) = passed_pipe {
        episode.score += 1;
        events.push(TickEvent::Passed {
            pipe,
            score: episode.score,
        });
        for contender in episode.contenders.iter_mut().filter(|c| !c.crashed) {
            contender.reward(PASS_REWARD);
        }
        let id = episode.spawn_pipe(PIPE_SPAWN_X);
        log::debug!("score {} - spawned pipe {}", episode.score, id);
        events.push(TickEvent::PipeSpawned { pipe: id });
    }

    // 6. Drop retired pipes
    if !retired.is_empty() {
        episode.pipes.retain(|p| !retired.contains(&p.id));
        events.extend(retired.into_iter().map(|pipe| TickEvent::PipeRetired { pipe }));
    }

    // 7. Ground and ceiling
    for contender in &mut episode.contenders {
        if !contender.crashed && out_of_bounds(&contender.agent) {
            contender.escaped = true;
            log::debug!("bird {} left the playfield", contender.agent.id);
            events.push(TickEvent::OutOfBounds {
                agent: contender.agent.id,
            });
        }
    }

    // 8. Remove birds together with their controllers
    for contender in &mut episode.contenders {
        if contender.is_marked() {
            contender.agent.alive = false;
        }
    }
    episode.contenders.retain(|c| c.agent.alive);

    // 9. Ground scroll
    episode.ground.scroll();

    // 10. End of episode
    if episode.contenders.is_empty() {
        episode.phase = EpisodePhase::Terminal;
        events.push(TickEvent::EpisodeOver);
    }
    log::trace!(
        "tick {}: alive={} pipes={} score={}",
        episode.ticks,
        episode.contenders.len(),
        episode.pipes.len(),
        episode.score
    );

    events
}
