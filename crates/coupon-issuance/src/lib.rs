#![doc = include_str!("../README.md")]

mod campaign;
mod code;
mod coordinator;
mod error;
mod id;
mod pool;
mod registry;
mod time;

pub use crate::campaign::*;
pub use crate::code::*;
pub use crate::coordinator::*;
pub use crate::error::*;
pub use crate::id::*;
pub use crate::pool::*;
pub use crate::registry::*;
pub use crate::time::*;
