pub mod building;
pub mod catalog;
pub mod commands;
pub mod economy;
pub mod events;
pub mod grid;
pub mod save_load;

pub use building::*;
pub use catalog::*;
pub use commands::*;
pub use economy::*;
pub use events::*;
pub use grid::*;
pub use save_load::*;
