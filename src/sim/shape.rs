//! Overlap tests between collision shapes
//!
//! Everything in the playfield collides as either a circle or an axis-aligned
//! box. Visual rotation never takes part in collision.

use glam::Vec2;

/// A collision shape in playfield coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { center: Vec2, radius: f32 },
    /// Axis-aligned box given by its center and half extents
    Box { center: Vec2, half: Vec2 },
}

impl Shape {
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Shape::Circle { center, radius }
    }

    pub fn rect(center: Vec2, half: Vec2) -> Self {
        Shape::Box { center, half }
    }

    /// Same shape with its extents multiplied by `factor`
    pub fn scaled(self, factor: f32) -> Self {
        match self {
            Shape::Circle { center, radius } => Shape::Circle {
                center,
                radius: radius * factor,
            },
            Shape::Box { center, half } => Shape::Box {
                center,
                half: half * factor,
            },
        }
    }
}

/// Whether two shapes overlap. Touching edges count as overlap.
pub fn overlaps(a: &Shape, b: &Shape) -> bool {
    match (*a, *b) {
        (
            Shape::Circle { center: ca, radius: ra },
            Shape::Circle { center: cb, radius: rb },
        ) => ca.distance_squared(cb) <= (ra + rb) * (ra + rb),
        (Shape::Circle { center, radius }, Shape::Box { center: bc, half })
        | (Shape::Box { center: bc, half }, Shape::Circle { center, radius }) => {
            circle_box(center, radius, bc, half)
        }
        (Shape::Box { center: ca, half: ha }, Shape::Box { center: cb, half: hb }) => {
            (ca.x - cb.x).abs() <= ha.x + hb.x && (ca.y - cb.y).abs() <= ha.y + hb.y
        }
    }
}

/// Closest-point test: clamp the circle center into the box and compare the
/// remaining distance with the radius.
fn circle_box(center: Vec2, radius: f32, box_center: Vec2, half: Vec2) -> bool {
    let closest = center.clamp(box_center - half, box_center + half);
    center.distance_squared(closest) <= radius * radius
}
