pub mod award;
pub mod common;
pub mod event;
pub mod pagination;
pub mod player;
pub mod preference;
pub mod prize;
pub mod result;

pub use award::*;
pub use common::*;
pub use event::*;
pub use pagination::*;
pub use player::*;
pub use preference::*;
pub use prize::*;
pub use result::*;
