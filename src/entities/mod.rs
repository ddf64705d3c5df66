pub mod award_preferences;
pub mod awards;
pub mod events;
pub mod players;
pub mod prizes;
pub mod results;

pub use award_preferences as award_preference_entity;
pub use awards as award_entity;
pub use events as event_entity;
pub use players as player_entity;
pub use prizes as prize_entity;
pub use results as result_entity;

pub use results::{AllocationKind, AllocationState, ResultAward, ResultAwardList, Winner, WinnerList};
