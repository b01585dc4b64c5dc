pub mod cities;
pub mod encode;
pub mod error;
pub mod orbit;
pub mod output;
pub mod parser;
pub mod scene;
pub mod timeline;
pub mod util_index;
