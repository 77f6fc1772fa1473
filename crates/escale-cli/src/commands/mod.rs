pub mod add;
pub mod nodes;
pub mod remove;
pub mod version;
