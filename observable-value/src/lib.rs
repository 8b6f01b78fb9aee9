#![doc = include_str!("../README.md")]

pub mod render;
pub mod signal;
pub mod slot;
pub mod value;

pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub use render::{Render, RenderFn};
pub use signal::{Notifier, Ticker};
pub use slot::AtomicSlot;
pub use value::{ErrorValue, Fallible, Value};
