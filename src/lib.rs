//! Metro Simulation Library
//!
//! The simulation core of a Mini-Metro-style transit game. Drivers, renderers
//! and agents sit outside this crate and talk to it through `SimWorld`.

pub mod simulation;
