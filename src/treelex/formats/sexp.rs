//! S-expression formatter
//!
//! `1 (2 x)` lexed with integer, word and paren entries prints as
//! `((integer 1) (paren ((integer 2) (word "x"))))`. Text values are quoted, a terminal
//! cdr is written after a dot.

use super::registry::{FormatError, Formatter};
use crate::treelex::cell::Cell;
use crate::treelex::types::{Type, Value};

fn atom(value: &Value, value_type: &Type) -> String {
    match value {
        Value::Text(text) => format!("{:?}", text),
        Value::Cell(chain) => to_sexp_str(chain),
        other => value_type.value_to_string(other),
    }
}

pub fn to_sexp_str(chain: &Cell) -> String {
    let items: Vec<String> = chain
        .iter()
        .map(|cell| {
            let car_type = cell.car_type();
            let mut item = format!("({}", car_type.name());
            let car = cell.car();
            if !car.is_empty() {
                item.push(' ');
                item.push_str(&atom(&car, &car_type));
            }
            match cell.cdr() {
                Value::Cell(_) | Value::Empty => {}
                cdr => {
                    item.push_str(" . ");
                    item.push_str(&atom(&cdr, &cell.cdr_type()));
                }
            }
            item.push(')');
            item
        })
        .collect();
    format!("({})", items.join(" "))
}

pub struct SexpFormatter;

impl Formatter for SexpFormatter {
    fn name(&self) -> &str {
        "sexp"
    }

    fn serialize(&self, chain: &Cell) -> Result<String, FormatError> {
        Ok(to_sexp_str(chain))
    }

    fn description(&self) -> &str {
        "Parenthesised (type value) lists"
    }
}
