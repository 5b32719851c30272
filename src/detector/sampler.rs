/// Sample the module grid of a located symbol
use super::grouping::FinderTriple;
use crate::models::{BitMatrix, Point};
use crate::utils::geometry::PerspectiveTransform;

/// A sampled symbol: image-space outline plus the dark/light state of each module
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Top-left, top-right, bottom-right, bottom-left in image coordinates
    pub corners: [Point; 4],
    /// Modules per side
    pub size: usize,
    /// `size` x `size` cells, dark = set
    pub cells: BitMatrix,
}

/// Map the finder triple onto a `size` x `size` grid and read each module centre.
///
/// Grid coordinates are module edges, so the finder centres sit at 3.5 and
/// `size - 3.5`. Returns `None` when the transform is degenerate.
pub fn sample(binary: &BitMatrix, triple: &FinderTriple) -> Option<Grid> {
    let size = triple.size;
    let near = 3.5f32;
    let far = size as f32 - 3.5;

    let grid_points = [
        Point::new(near, near),
        Point::new(far, near),
        Point::new(far, far),
        Point::new(near, far),
    ];
    let image_points = [
        triple.top_left.center,
        triple.top_right.center,
        triple.bottom_right(),
        triple.bottom_left.center,
    ];
    let transform = PerspectiveTransform::from_points(&grid_points, &image_points)?;

    let edge = size as f32;
    let corners = [
        transform.transform(&Point::new(0.0, 0.0))?,
        transform.transform(&Point::new(edge, 0.0))?,
        transform.transform(&Point::new(edge, edge))?,
        transform.transform(&Point::new(0.0, edge))?,
    ];

    let mut cells = BitMatrix::new(size, size);
    for y in 0..size {
        for x in 0..size {
            let Some(p) = transform.transform(&Point::new(x as f32 + 0.5, y as f32 + 0.5)) else {
                continue;
            };
            if p.x < 0.0 || p.y < 0.0 {
                continue;
            }
            cells.set(x, y, binary.get(p.x as usize, p.y as usize));
        }
    }

    Some(Grid {
        corners,
        size,
        cells,
    })
}
