pub mod award;
pub mod event;
pub mod player;
pub mod prize;
pub mod result;

pub use award::award_config;
pub use event::event_config;
pub use player::player_config;
pub use prize::prize_config;
pub use result::result_config;
