pub mod configure;
pub mod index;
pub mod process;
pub mod settings;
