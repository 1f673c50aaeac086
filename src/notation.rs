//! Plain move lists for display: numbered lines, each move written as piece
//! letter plus destination (`Nf3`, `e4`). No capture marks, disambiguation or
//! check suffixes.

use crate::color::Color;
use crate::r#move::MoveRecord;

pub fn move_list(records: &[MoveRecord]) -> String {
    move_list_from(records, 1, Color::White)
}

/// Render `records` whose first move is move `first_number`, played by
/// `first_side`. A list opening with a Black move starts with `N...`.
pub fn move_list_from(records: &[MoveRecord], first_number: u32, first_side: Color) -> String {
    let mut lines = Vec::new();
    let mut number = first_number;
    let mut rest = records;

    if first_side == Color::Black {
        if let Some((first, tail)) = rest.split_first() {
            lines.push(format!("{}... {}", number, first.label()));
            number += 1;
            rest = tail;
        }
    }

    for pair in rest.chunks(2) {
        let line = match pair {
            [white, black] => format!("{}. {} {}", number, white.label(), black.label()),
            [white] => format!("{}. {}", number, white.label()),
            _ => unreachable!("chunks(2) yields one or two records"),
        };
        lines.push(line);
        number += 1;
    }

    lines.join("\n")
}
