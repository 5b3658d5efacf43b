//! Forward and inverse projection between weights and triangle points
//!
//! Forward projection places a point as the convex combination of the three
//! vertices weighted by each dosha's share of the total. Inverse projection
//! solves for the barycentric coordinates of a pointer position, clamps them
//! back into the triangle, and turns them into whole percentages that sum
//! to exactly 100.
//!
//! Both directions resolve vertices through [`Triangle::vertex`], so
//! Left/Vata, Top/Pitta and Right/Kapha stay paired in one place.

use tracing::warn;

use crate::domain::core::{Triangle, TrianglePoint};
use crate::domain::weights::{Barycentric, Dosha, DoshaWeights};

/// Remainders closer than this are treated as equal when distributing
/// the rounding residual
const TIE_EPSILON: f64 = 1e-9;

/// Order in which ties receive (or give up) the rounding residual
const TIE_PREFERENCE: [Dosha; 3] = [Dosha::Kapha, Dosha::Pitta, Dosha::Vata];

/// Furthest a pointer is taken from the centroid, in side lengths, before
/// solving. Clamping only depends on direction that far out.
const MAX_REACH: f64 = 1e6;

/// Projects weights onto the triangle
///
/// # Arguments
/// * `triangle` - Triangle whose vertices receive the weights
/// * `weights` - Dosha weights; they need not sum to 100
///
/// # Returns
/// The weighted average of the vertices. Weights that cannot be normalized
/// (zero or non-finite total, or fractions that overflow) give the centroid.
pub fn forward(triangle: &Triangle, weights: &DoshaWeights) -> TrianglePoint {
    let point = weights
        .normalized()
        .map(|bary| from_barycentric(triangle, &bary))
        .filter(TrianglePoint::is_finite);
    match point {
        Some(point) => point,
        None => {
            warn!(
                vata = weights.vata,
                pitta = weights.pitta,
                kapha = weights.kapha,
                "degenerate dosha weights, using equal thirds"
            );
            from_barycentric(triangle, &Barycentric::EQUAL_THIRDS)
        }
    }
}

/// Convex combination of the vertices
pub fn from_barycentric(triangle: &Triangle, bary: &Barycentric) -> TrianglePoint {
    Dosha::ALL
        .iter()
        .fold(TrianglePoint::new(0.0, 0.0), |acc, dosha| {
            let vertex = triangle.vertex(*dosha);
            let share = bary.get(*dosha);
            TrianglePoint::new(acc.x + vertex.x * share, acc.y + vertex.y * share)
        })
}

/// Raw barycentric coordinates of a point, unclamped
///
/// Components may be negative or exceed 1 when the point is outside the
/// triangle. Returns `None` for a degenerate triangle, a non-finite point,
/// or a point so far away that the solve overflows.
pub fn barycentric(triangle: &Triangle, point: &TrianglePoint) -> Option<Barycentric> {
    if !point.is_finite() {
        return None;
    }

    let l = triangle.vertex(Dosha::Vata);
    let r = triangle.vertex(Dosha::Kapha);
    let t = triangle.vertex(Dosha::Pitta);

    let denom = (r.y - t.y) * (l.x - t.x) + (t.x - r.x) * (l.y - t.y);
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }

    let vata = ((r.y - t.y) * (point.x - t.x) + (t.x - r.x) * (point.y - t.y)) / denom;
    let kapha = ((t.y - l.y) * (point.x - t.x) + (l.x - t.x) * (point.y - t.y)) / denom;
    if !vata.is_finite() || !kapha.is_finite() {
        return None;
    }

    Some(Barycentric {
        vata,
        pitta: 1.0 - vata - kapha,
        kapha,
    })
}

/// Pulls raw coordinates back into the closed triangle
///
/// Vata and Kapha are clamped to `[0, 1]` independently, Pitta is re-derived
/// from them and clamped, and the result is renormalized to sum to 1.
pub fn clamp_to_triangle(raw: &Barycentric) -> Barycentric {
    let vata = raw.vata.clamp(0.0, 1.0);
    let kapha = raw.kapha.clamp(0.0, 1.0);
    let pitta = (1.0 - vata - kapha).clamp(0.0, 1.0);

    // vata == kapha == 0 forces pitta == 1, so the sum is never zero
    let sum = vata + pitta + kapha;
    Barycentric {
        vata: vata / sum,
        pitta: pitta / sum,
        kapha: kapha / sum,
    }
}

/// Whole percentages summing to exactly 100
///
/// Each share is rounded half away from zero. The leftover (at most one
/// point either way for normalized input) goes to the component rounding
/// shortchanged most, or comes from the one it over-credited most.
pub fn to_percentages(bary: &Barycentric) -> DoshaWeights {
    let exact = Dosha::ALL.map(|d| bary.get(d) * 100.0);
    let mut rounded = exact.map(f64::round);

    for _ in 0..Dosha::ALL.len() {
        let residual = 100.0 - rounded.iter().sum::<f64>();
        if residual == 0.0 {
            break;
        }
        let step = residual.signum();

        let mut pick: Option<(usize, f64)> = None;
        for dosha in TIE_PREFERENCE {
            let idx = index_of(dosha);
            let candidate = rounded[idx] + step;
            if !(0.0..=100.0).contains(&candidate) {
                continue;
            }
            let gap = step * (exact[idx] - rounded[idx]);
            match pick {
                Some((_, best)) if gap <= best + TIE_EPSILON => {}
                _ => pick = Some((idx, gap)),
            }
        }

        match pick {
            Some((idx, _)) => rounded[idx] += step,
            None => break,
        }
    }

    DoshaWeights::new(rounded[0], rounded[1], rounded[2])
}

/// Weights for a pointer position
///
/// # Arguments
/// * `triangle` - Triangle the pointer moves over
/// * `point` - Pointer position in triangle units
///
/// # Returns
/// Whole percentages in `[0, 100]` summing to exactly 100. Positions outside
/// the triangle are clamped onto it; a degenerate triangle or non-finite
/// position yields the centroid split.
pub fn inverse(triangle: &Triangle, point: &TrianglePoint) -> DoshaWeights {
    let solved = barycentric(triangle, point)
        .or_else(|| barycentric(triangle, &pull_within_reach(triangle, point)));
    let bary = match solved {
        Some(raw) => clamp_to_triangle(&raw),
        None => {
            warn!(x = point.x, y = point.y, side = triangle.side(), "cannot solve pointer position, using equal thirds");
            Barycentric::EQUAL_THIRDS
        }
    };
    to_percentages(&bary)
}

/// Moves a distant point toward the centroid along the same ray
fn pull_within_reach(triangle: &Triangle, point: &TrianglePoint) -> TrianglePoint {
    let centroid = triangle.centroid();
    let dx = point.x - centroid.x;
    let dy = point.y - centroid.y;
    let extent = dx.abs().max(dy.abs());
    let reach = MAX_REACH * triangle.side();
    if extent <= reach || !extent.is_finite() {
        return *point;
    }
    let scale = reach / extent;
    TrianglePoint::new(centroid.x + dx * scale, centroid.y + dy * scale)
}

fn index_of(dosha: Dosha) -> usize {
    match dosha {
        Dosha::Vata => 0,
        Dosha::Pitta => 1,
        Dosha::Kapha => 2,
    }
}
