pub mod building;
pub mod building_type;

pub use building::*;
pub use building_type::*;
