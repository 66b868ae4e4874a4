use pid_sweep::ProcessRecord;
use unicode_width::UnicodeWidthStr;

use crate::ui::keybindings_component::Keybinding;

pub fn keybindings_constraint_len_calculator(items: &[Keybinding]) -> (u16, u16) {
    let combo = items
        .iter()
        .map(Keybinding::combo)
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0);

    let description = items
        .iter()
        .map(Keybinding::description)
        .flat_map(str::lines)
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0);

    #[allow(clippy::cast_possible_truncation)]
    (combo as u16, description as u16)
}

/// Width of the PID column: the widest PID or the header, plus one space.
pub fn pid_column_width(items: &[ProcessRecord]) -> u16 {
    let widest = items
        .iter()
        .map(|p| p.pid.to_string().width())
        .max()
        .unwrap_or(0)
        .max("PID".width());

    #[allow(clippy::cast_possible_truncation)]
    let width = widest as u16;
    width + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_column_fits_widest_pid() {
        assert_eq!(pid_column_width(&[]), 4);
        let items = [ProcessRecord::new(7, "a"), ProcessRecord::new(4194304, "b")];
        assert_eq!(pid_column_width(&items), 8);
    }
}
