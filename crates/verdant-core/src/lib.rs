pub mod bands;
pub mod composite;
pub mod consts;
pub mod diff;
pub mod error;
pub mod grid;
pub mod index;
pub mod io;
pub mod mask;
pub mod merge;
pub mod pipeline;
pub mod series;
pub mod synthetic;
