pub mod menu;

pub use menu::MenuHandler;
