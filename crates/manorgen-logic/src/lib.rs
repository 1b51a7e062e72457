//! Pure building-generation logic for ManorGen.
//!
//! This crate turns a grid of room assignments into everything a scene needs
//! to present a walkable building: door flags, per-room floor/ceiling/wall
//! meshes with doorway openings, one trigger per doorway and the player's
//! spawn pose. It has no engine dependency; functions take plain data and
//! return plain data, so the whole pipeline is unit-testable.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`compiler`] | Per-room floor, ceiling and wall panels with doorway openings |
//! | [`connectivity`] | Door flags between adjacent occupied cells |
//! | [`constants`] | Build dimensions (cell size, wall and door sizes) and their checks |
//! | [`csg`] | Box subtraction used to carve doorways out of wall panels |
//! | [`diagnostics`] | Recoverable problems recorded during generation |
//! | [`direction`] | Cardinal directions: grid offset, normal, yaw |
//! | [`doors`] | One inert trigger per doorway |
//! | [`grid`] | Fixed-size grid of room assignments |
//! | [`layout`] | JSON layouts, the built-in manor, seeded random layouts |
//! | [`mesh`] | `Vec3` and indexed triangle meshes |
//! | [`spawn`] | Player spawn pose from start zone, start cell or default |
//! | [`validation`] | Door symmetry, doorway count and reachability checks |

pub mod compiler;
pub mod connectivity;
pub mod constants;
pub mod csg;
pub mod diagnostics;
pub mod direction;
pub mod doors;
pub mod grid;
pub mod layout;
pub mod mesh;
pub mod spawn;
pub mod validation;
