//! Geometry primitives: vectors, affine matrices, bounding boxes, the path
//! verb stream, and cubic subdivision math.

mod aabb;
mod cubic;
mod mat2d;
mod raw_path;
mod vec2;

pub use aabb::Aabb;
pub use cubic::{
    compute_hull, cubic_at, cubic_point_at, cubic_tangent_at, quad_at, quad_point_at,
    quad_tangent_at, should_split_cubic, split_quad, UNIT_CIRCLE_CONTROL_FACTOR,
};
pub use mat2d::Mat2D;
pub use raw_path::{PathDirection, PathIter, PathVerb, RawPath};
pub use vec2::Vec2;
