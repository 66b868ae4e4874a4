pub mod footer_component;
pub mod keybindings_component;
pub mod kill_process_component;
pub mod process_search_component;
pub mod process_table_component;
pub mod theme;
