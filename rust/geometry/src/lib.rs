// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Joinery Geometry
//!
//! The narrow geometry kernel the joint engine builds on: oriented planes and
//! plane arithmetic, centreline curves with curve–curve intersection, closed
//! polyhedral solids stitched from planar faces, and triangle meshes for
//! visualization. nalgebra provides the linear algebra, earcutr the
//! triangulation.

pub mod curve;
pub mod error;
pub mod fillet;
pub mod mesh;
pub mod plane;
pub mod solid;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Rotation3, Unit, Vector2, Vector3};

pub use curve::{intersect_curves, Curve, CurveHit, LineCurve, Overlap, Polyline};
pub use error::{Error, Result};
pub use fillet::fillet_polygon;
pub use mesh::Mesh;
pub use plane::{
    closest_points_between_lines, interpolate, intersect_line_plane, intersect_plane_plane,
    intersect_three_planes, Frame, Line, Plane,
};
pub use solid::{Face, Solid, WELD_TOLERANCE};
pub use triangulation::{polygon_normal, triangulate_face, triangulate_polygon, triangulate_polygon_with_holes};
