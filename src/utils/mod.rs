pub mod data;
pub mod dedupe;
pub mod grouping;
pub mod ids;
pub mod names;
pub mod odds;
pub mod payload;
pub mod store;
pub mod tournament;

pub use dedupe::dedupe;
pub use grouping::{even_split, group_betting_lines, split_divisions, ContaminationFilter};
pub use ids::{IdError, SequentialIdAssigner};
pub use names::{clean_name, normalize_name, Domain, Roster};
pub use odds::transform_odds;
