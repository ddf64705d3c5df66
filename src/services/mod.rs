pub mod allocation_service;
pub mod award_service;
pub mod event_service;
pub mod player_service;
pub mod preference_service;
pub mod prize_service;
pub mod result_service;

pub use allocation_service::*;
pub use award_service::*;
pub use event_service::*;
pub use player_service::*;
pub use preference_service::*;
pub use prize_service::*;
pub use result_service::*;

#[cfg(test)]
pub(crate) mod test_support;
