pub mod cli;
pub mod controller;
pub mod io;
pub mod logging;
pub mod model;
pub mod ops;
pub mod store;
