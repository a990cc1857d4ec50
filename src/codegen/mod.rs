pub mod block;
pub mod names;

pub use block::{Block, render};
pub use names::{Mangle, TempNames};

/// Banner placed at the top of every generated file.
pub const GENERATED_MESSAGE: &str = "THIS FILE WAS AUTOMATICALLY GENERATED. DO NOT EDIT BY HAND.";
