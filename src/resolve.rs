//! Position correction of one body against a set of walls.

use std::collections::BTreeSet;

use glam::Vec2;
use log::trace;

use crate::api::{Collidable, EffectSink};
use crate::geometry::{Intersection, Segment, approx_eq};
use crate::types::{Resolution, ResolveMode, WallId};
use crate::walls::Walls;

/// Resolve `obj` against the walls in `gathered`.
///
/// Walls the body ignores are dropped from its ignore set once they no longer
/// touch it. If any gathered wall is conditional (one-way or ladder top) the pass
/// is irregular: blocking walls are collected first, collinear pieces re-joined
/// and T-junction bases pruned, and only then shunted.
pub fn resolve_against(
    obj: &mut dyn Collidable,
    walls: &Walls,
    gathered: &BTreeSet<WallId>,
    effects: &mut dyn EffectSink,
) -> Resolution {
    {
        let body = obj.body_mut();
        let circle = body.circle();
        body.ignore.retain(|id| walls.get(*id).is_some_and(|w| w.segment.intersects_circle(&circle)));
    }

    let mode = if gathered.iter().filter_map(|id| walls.get(*id)).any(|w| w.kind.is_conditional()) {
        ResolveMode::Irregular
    } else {
        ResolveMode::Regular
    };

    let mut shunts = 0;
    let mut collide: Vec<Segment> = Vec::new();

    for &id in gathered {
        let Some(wall) = walls.get(id) else { continue };
        obj.pre_process_wall(id, wall, effects);

        if obj.body().ignore.contains(&id) {
            continue;
        }
        if mode == ResolveMode::Regular && !wall.segment.intersects_circle(&obj.body().circle()) {
            continue;
        }
        if obj.process_wall(id, wall, effects) {
            match mode {
                ResolveMode::Irregular => collide.push(wall.segment),
                ResolveMode::Regular => {
                    if obj.body_mut().collide_wall(&wall.segment) {
                        shunts += 1;
                    }
                }
            }
        }
    }

    if mode == ResolveMode::Irregular {
        merge_collinear(&mut collide);
        prune_t_bones(&mut collide, obj.body().pos);
        for s in &collide {
            if s.intersects_circle(&obj.body().circle()) && obj.body_mut().collide_wall(s) {
                shunts += 1;
            }
        }
    }

    trace!("resolve {:?}: {} walls, {} shunts", mode, gathered.len(), shunts);
    Resolution { mode, gathered: gathered.len(), shunts }
}

/// Replace pairs of collinear, same-facing segments meeting end to end by their union.
pub(crate) fn merge_collinear(collide: &mut Vec<Segment>) {
    let mut k = 0;
    while k < collide.len() {
        let s = collide[k];
        let mut joined = None;
        for (l, t) in collide.iter().enumerate().skip(k + 1) {
            let Intersection::CollinearPoint(p) = s.intersect(t) else { continue };
            if !approx_eq(s.normal, t.normal) {
                continue;
            }
            let union = if approx_eq(p, t.p0) { Segment::new(s.p0, t.p1) } else { Segment::new(t.p0, s.p1) };
            joined = Some((l, union));
            break;
        }
        match joined {
            Some((l, union)) => {
                collide.push(union);
                collide.remove(l);
                collide.remove(k);
            }
            None => k += 1,
        }
    }
}

/// Drop the base of a "T" when the top faces away from it and toward the body.
/// Joined segments sit at the end of the list, so the top is always the later one.
pub(crate) fn prune_t_bones(collide: &mut Vec<Segment>, pos: Vec2) {
    let mut k = 0;
    while k < collide.len() {
        let s = collide[k];
        let is_base = collide[k + 1..].iter().any(|t| {
            let Intersection::Point(p) = s.intersect(t) else { return false };
            if approx_eq(p, t.p0) || approx_eq(p, t.p1) {
                return false;
            }
            let far = if approx_eq(p, s.p0) {
                s.p1
            } else if approx_eq(p, s.p1) {
                s.p0
            } else {
                return false;
            };
            !t.faces(far) && t.faces(pos)
        });
        if is_base {
            collide.remove(k);
        } else {
            k += 1;
        }
    }
}
