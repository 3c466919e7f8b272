//! Treeviz formatter for token trees
//!
//! One line per cell, with nesting drawn as box connectors:
//!
//! ```text
//! ⧉ 3 cells
//! ├─ ◦ integer: 1
//! ├─ ⊂ paren: 2 cells
//! │ ├─ ◦ integer: 2
//! │ └─ ◦ integer: 3
//! └─ ◦ integer: 4
//! ```
//!
//! Icons: `⧉` the whole chain, `⊂` a cell holding a nested chain, `◦` any other cell.
//! Values are truncated to 30 characters.

use super::registry::{FormatError, Formatter};
use crate::treelex::cell::Cell;
use crate::treelex::types::Value;

const MAX_LABEL: usize = 30;

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

fn count_label(count: usize) -> String {
    if count == 1 {
        "1 cell".to_string()
    } else {
        format!("{} cells", count)
    }
}

fn format_cell(cell: &Cell, prefix: &str, is_last: bool, output: &mut String) {
    let connector = if is_last { "└─" } else { "├─" };
    let car_type = cell.car_type();
    match cell.car() {
        Value::Cell(nested) => {
            output.push_str(&format!(
                "{}{} ⊂ {}: {}\n",
                prefix,
                connector,
                car_type.name(),
                count_label(nested.len())
            ));
            let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
            format_chain(&nested, &child_prefix, output);
        }
        car => {
            let mut label = car_type.value_to_string(&car);
            match cell.cdr() {
                Value::Cell(_) | Value::Empty => {}
                cdr => {
                    label.push_str(" . ");
                    label.push_str(&cell.cdr_type().value_to_string(&cdr));
                }
            }
            output.push_str(&format!(
                "{}{} ◦ {}: {}\n",
                prefix,
                connector,
                car_type.name(),
                truncate(&label, MAX_LABEL)
            ));
        }
    }
}

fn format_chain(chain: &Cell, prefix: &str, output: &mut String) {
    let mut cells = chain.iter().peekable();
    while let Some(cell) = cells.next() {
        format_cell(&cell, prefix, cells.peek().is_none(), output);
    }
}

pub fn to_treeviz_str(chain: &Cell) -> String {
    let mut output = format!("⧉ {}\n", count_label(chain.len()));
    format_chain(chain, "", &mut output);
    output
}

pub struct TreevizFormatter;

impl Formatter for TreevizFormatter {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn serialize(&self, chain: &Cell) -> Result<String, FormatError> {
        Ok(to_treeviz_str(chain))
    }

    fn description(&self) -> &str {
        "Visual tree with one line per cell"
    }
}
