//! Transformaciones puras de saneamiento, una por familia de formato.

mod constants;

pub mod audio;
pub mod container;
pub mod image;
pub mod office;
pub mod pdf;

#[cfg(test)]
mod tests;
