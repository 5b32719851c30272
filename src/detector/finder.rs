/// Finder pattern detection using 1:1:3:1:1 run scanning with a vertical cross-check
use crate::models::{BitMatrix, Point};

/// A confirmed finder pattern centre in pixel-edge coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderPattern {
    /// Centre of the 3x3 core
    pub center: Point,
    /// Estimated module size in pixels
    pub module_size: f32,
    /// Number of scan rows that confirmed this pattern
    pub hits: usize,
}

impl FinderPattern {
    /// Create a pattern confirmed by a single row
    pub fn new(x: f32, y: f32, module_size: f32) -> Self {
        Self {
            center: Point::new(x, y),
            module_size,
            hits: 1,
        }
    }
}

/// Rows needed before a cluster counts as a finder
const MIN_HITS: usize = 2;

/// Scan every row of `binary` and return merged finder candidates
pub fn find_patterns(binary: &BitMatrix) -> Vec<FinderPattern> {
    let mut raw = Vec::new();
    let mut runs = Vec::new();
    for y in 0..binary.height() {
        scan_row(binary, y, &mut runs, &mut raw);
    }
    merge_candidates(raw)
}

fn scan_row(binary: &BitMatrix, y: usize, runs: &mut Vec<usize>, out: &mut Vec<FinderPattern>) {
    let width = binary.width();
    if width == 0 {
        return;
    }

    runs.clear();
    let first_dark = binary.get(0, y);
    let mut run_start = 0usize;
    let mut color = first_dark;
    for x in 1..width {
        let c = binary.get(x, y);
        if c != color {
            runs.push(x - run_start);
            run_start = x;
            color = c;
        }
    }
    // the final run ends at the row edge
    runs.push(width - run_start);

    // runs alternate colour; run `i` is dark when its parity matches the first run
    let mut offset = 0usize;
    for i in 0..runs.len() {
        let dark = (i % 2 == 0) == first_dark;
        if dark && i + 5 <= runs.len() {
            let window = [runs[i], runs[i + 1], runs[i + 2], runs[i + 3], runs[i + 4]];
            if ratio_ok(&window) {
                let center_x = (offset + window[0] + window[1]) as f32 + window[2] as f32 / 2.0;
                let h_total: usize = window.iter().sum();
                if let Some((center_y, v_total)) =
                    cross_check_vertical(binary, center_x as usize, y, h_total)
                {
                    let module = (h_total + v_total) as f32 / 14.0;
                    out.push(FinderPattern::new(center_x, center_y, module));
                }
            }
        }
        offset += runs[i];
    }
}

/// Whether five runs approximate 1:1:3:1:1
pub(crate) fn ratio_ok(runs: &[usize; 5]) -> bool {
    let total: usize = runs.iter().sum();
    if total < 7 {
        return false;
    }
    let module = total as f32 / 7.0;
    let max_variance = module / 2.0;

    (module - runs[0] as f32).abs() < max_variance
        && (module - runs[1] as f32).abs() < max_variance
        && (3.0 * module - runs[2] as f32).abs() < 3.0 * max_variance
        && (module - runs[3] as f32).abs() < max_variance
        && (module - runs[4] as f32).abs() < max_variance
}

/// Confirm the pattern along column `x` and return the vertical centre and run total
fn cross_check_vertical(
    binary: &BitMatrix,
    x: usize,
    y: usize,
    expected_total: usize,
) -> Option<(f32, usize)> {
    let height = binary.height();
    let dark = |row: usize| binary.get(x, row);
    if !dark(y) {
        return None;
    }

    let mut top = y;
    while top > 0 && dark(top - 1) {
        top -= 1;
    }
    let mut bottom = y + 1;
    while bottom < height && dark(bottom) {
        bottom += 1;
    }

    let mut i = top;
    let mut light_above = 0;
    while i > 0 && !dark(i - 1) {
        i -= 1;
        light_above += 1;
    }
    let mut dark_above = 0;
    while i > 0 && dark(i - 1) {
        i -= 1;
        dark_above += 1;
    }

    let mut j = bottom;
    let mut light_below = 0;
    while j < height && !dark(j) {
        j += 1;
        light_below += 1;
    }
    let mut dark_below = 0;
    while j < height && dark(j) {
        j += 1;
        dark_below += 1;
    }

    let runs = [dark_above, light_above, bottom - top, light_below, dark_below];
    if !ratio_ok(&runs) {
        return None;
    }
    let total: usize = runs.iter().sum();
    if 5 * total.abs_diff(expected_total) >= 2 * expected_total {
        return None;
    }

    Some(((top + bottom) as f32 / 2.0, total))
}

fn merge_candidates(candidates: Vec<FinderPattern>) -> Vec<FinderPattern> {
    let mut merged: Vec<FinderPattern> = Vec::new();

    for candidate in candidates {
        let existing = merged.iter_mut().find(|existing| {
            existing.center.distance(&candidate.center) < existing.module_size * 2.0
        });
        match existing {
            Some(existing) => {
                let n = existing.hits as f32;
                existing.center = Point::new(
                    (existing.center.x * n + candidate.center.x) / (n + 1.0),
                    (existing.center.y * n + candidate.center.y) / (n + 1.0),
                );
                existing.module_size = (existing.module_size * n + candidate.module_size) / (n + 1.0);
                existing.hits += 1;
            }
            None => merged.push(candidate),
        }
    }

    merged.retain(|p| p.hits >= MIN_HITS);
    merged
}
