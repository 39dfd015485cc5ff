//! Command line front end for inspecting and toggling Avogadro plugins.

mod report;

pub use report::*;
