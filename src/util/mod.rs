mod layout;
mod width;

pub use layout::popup_area;
pub use width::{keybindings_constraint_len_calculator, pid_column_width};
