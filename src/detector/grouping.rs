//! Assemble finder patterns into symbol candidates.
//!
//! Every triple of finders is scored on how close it is to an isosceles right
//! triangle with matching module sizes. Triples are then accepted greedily,
//! best score first, so that each finder belongs to at most one symbol.

use super::finder::FinderPattern;
use crate::models::Point;

/// Upper bound on finders considered, strongest first
const MAX_FINDERS: usize = 24;
/// |cos| of the corner angle above which a triple is rejected
const MAX_CORNER_COS: f32 = 0.2;
/// Largest ratio between the two arm lengths
const MAX_ARM_RATIO: f32 = 1.4;
/// Largest ratio between module sizes within one triple
const MAX_MODULE_RATIO: f32 = 1.6;

/// Three finders forming one symbol, in reading orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderTriple {
    /// Corner finder
    pub top_left: FinderPattern,
    /// Finder along the first row
    pub top_right: FinderPattern,
    /// Finder along the first column
    pub bottom_left: FinderPattern,
    /// Estimated grid size in modules (17 + 4 * version)
    pub size: usize,
    /// Mean module size in pixels
    pub module_size: f32,
}

impl FinderTriple {
    /// Position of the fourth, implied, finder
    pub fn bottom_right(&self) -> Point {
        let tl = self.top_left.center;
        let tr = self.top_right.center;
        let bl = self.bottom_left.center;
        Point::new(tr.x + bl.x - tl.x, tr.y + bl.y - tl.y)
    }
}

/// Group finders into non-overlapping triples ordered top-to-bottom, left-to-right
pub fn group(finders: &[FinderPattern]) -> Vec<FinderTriple> {
    let mut pool: Vec<FinderPattern> = finders.to_vec();
    pool.sort_by(|a, b| b.hits.cmp(&a.hits));
    pool.truncate(MAX_FINDERS);

    let mut scored: Vec<(f32, [usize; 3], FinderTriple)> = Vec::new();
    for i in 0..pool.len() {
        for j in (i + 1)..pool.len() {
            for k in (j + 1)..pool.len() {
                if let Some((score, triple)) = orient([pool[i], pool[j], pool[k]]) {
                    scored.push((score, [i, j, k], triple));
                }
            }
        }
    }
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut used = vec![false; pool.len()];
    let mut accepted = Vec::new();
    for (_, members, triple) in scored {
        if members.iter().any(|&m| used[m]) {
            continue;
        }
        for m in members {
            used[m] = true;
        }
        accepted.push(triple);
    }

    accepted.sort_by(|a, b| {
        let (pa, pb) = (a.top_left.center, b.top_left.center);
        pa.y.total_cmp(&pb.y).then(pa.x.total_cmp(&pb.x))
    });
    accepted
}

/// Orient three finders and score them; lower is better
fn orient(points: [FinderPattern; 3]) -> Option<(f32, FinderTriple)> {
    let corner_cos = |v: usize| {
        let p = points[v].center;
        let a = p.to(&points[(v + 1) % 3].center);
        let b = p.to(&points[(v + 2) % 3].center);
        let norm = (a.x * a.x + a.y * a.y).sqrt() * (b.x * b.x + b.y * b.y).sqrt();
        if norm <= f32::EPSILON {
            f32::INFINITY
        } else {
            ((a.x * b.x + a.y * b.y) / norm).abs()
        }
    };

    let (corner, cos) = (0..3)
        .map(|v| (v, corner_cos(v)))
        .min_by(|a, b| a.1.total_cmp(&b.1))?;
    if cos > MAX_CORNER_COS {
        return None;
    }

    let tl = points[corner];
    let p1 = points[(corner + 1) % 3];
    let p2 = points[(corner + 2) % 3];
    let v1 = tl.center.to(&p1.center);
    let v2 = tl.center.to(&p2.center);
    // image y grows downward, so a positive cross product puts p1 on the right
    let (tr, bl) = if v1.x * v2.y - v1.y * v2.x > 0.0 {
        (p1, p2)
    } else {
        (p2, p1)
    };

    let sizes = [tl.module_size, tr.module_size, bl.module_size];
    let min_module = sizes.iter().copied().fold(f32::INFINITY, f32::min);
    let max_module = sizes.iter().copied().fold(0.0, f32::max);
    if min_module <= 0.0 || max_module / min_module > MAX_MODULE_RATIO {
        return None;
    }

    let d_top = tl.center.distance(&tr.center);
    let d_left = tl.center.distance(&bl.center);
    let arm_ratio = d_top.max(d_left) / d_top.min(d_left);
    if !arm_ratio.is_finite() || arm_ratio > MAX_ARM_RATIO {
        return None;
    }

    let module_size = sizes.iter().sum::<f32>() / 3.0;
    let estimated = (d_top + d_left) / 2.0 / module_size + 7.0;
    let version = ((estimated - 17.0) / 4.0).round();
    if !(1.0..=40.0).contains(&version) {
        return None;
    }
    let size = 17 + 4 * version as usize;

    let score = cos + (arm_ratio - 1.0) + (max_module / min_module - 1.0);
    Some((
        score,
        FinderTriple {
            top_left: tl,
            top_right: tr,
            bottom_left: bl,
            size,
            module_size,
        },
    ))
}
