pub mod errors;
pub mod flow;
pub mod graph;
pub mod instance;
pub mod io;
pub mod kernelization;
pub mod log;
pub mod matching;
pub mod reduction;

pub mod prelude {
    pub use super::errors::*;
    pub use super::graph::*;
    pub use super::instance::*;
    pub use super::io::*;
    pub use super::kernelization::*;
}

#[cfg(test)]
mod testing;
