#![allow(clippy::collapsible_if)]

pub mod c;
pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod fortran;
pub mod output;
pub mod prototype;
pub mod template;

