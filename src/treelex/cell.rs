//! Token cells
//!
//!     A [Cell] is one node of the output produced by lexing: a car/cdr pair, each slot
//!     tagged with a [Type]. When the cdr holds another cell (cdr type [TOKEN]) the chain
//!     continues; otherwise the cell is the last one of its chain and the cdr is either empty
//!     or a terminal value. A car may itself hold a chain, which is how nesting is expressed:
//!
//!         (1 (2 3) 4)
//!
//!         paren ─ car ─▶ 1 ─▶ paren ─▶ 4
//!                               │
//!                               car ─▶ 2 ─▶ 3
//!
//! Ownership
//!
//!     A [Cell] value is a handle. Cloning the handle aliases the node; use
//!     [Cell::deep_clone] for an independent copy. Forward links (cdr, nested car) own the
//!     next node, the back-reference to the previous cell is weak and never keeps a node
//!     alive, so chains never form reference cycles.
//!
//! Null cells
//!
//!     A cell whose car and cdr are both [EMPTY] is null. Appending to a null cell overwrites
//!     it in place, which lets a caller pre-allocate an empty head and keep that handle while
//!     the chain is built behind it.

use crate::treelex::types::{Type, Value, EMPTY, TOKEN};
use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::{Rc, Weak};

struct Node {
    car: Value,
    car_type: Type,
    cdr: Value,
    cdr_type: Type,
    previous: Weak<RefCell<Node>>,
}

impl Node {
    fn null() -> Self {
        Node {
            car: Value::Empty,
            car_type: EMPTY.clone(),
            cdr: Value::Empty,
            cdr_type: EMPTY.clone(),
            previous: Weak::new(),
        }
    }
}

impl Drop for Node {
    // Unlink the tail iteratively so long chains don't recurse once per element.
    fn drop(&mut self) {
        let mut next = mem::replace(&mut self.cdr, Value::Empty);
        while let Value::Cell(cell) = next {
            match Rc::try_unwrap(cell.node) {
                Ok(node) => {
                    let mut node = node.into_inner();
                    next = mem::replace(&mut node.cdr, Value::Empty);
                }
                Err(_) => break,
            }
        }
    }
}

/// One element of a token chain
#[derive(Clone)]
pub struct Cell {
    node: Rc<RefCell<Node>>,
}

impl Cell {
    /// A null cell
    pub fn new() -> Self {
        Cell {
            node: Rc::new(RefCell::new(Node::null())),
        }
    }

    /// A single cell with no continuation
    pub fn leaf(car: impl Into<Value>, car_type: Type) -> Self {
        let cell = Cell::new();
        {
            let mut node = cell.node.borrow_mut();
            node.car = car.into();
            node.car_type = car_type;
        }
        cell
    }

    /// A cell holding `chain` in its car
    pub fn nested(chain: Cell, car_type: Type) -> Self {
        Cell::leaf(Value::Cell(chain), car_type)
    }

    /// A cell with both slots set; see [Cell::set_cdr] for how the cdr is stored
    pub fn pair(
        car: impl Into<Value>,
        car_type: Type,
        cdr: impl Into<Value>,
        cdr_type: Type,
    ) -> Self {
        let cell = Cell::leaf(car, car_type);
        cell.set_cdr(cdr.into(), cdr_type);
        cell
    }

    /// Link `cells` into one chain, returning its head (null when `cells` is empty)
    pub fn chain(cells: impl IntoIterator<Item = Cell>) -> Self {
        let head = Cell::new();
        let mut last = head.clone();
        for cell in cells {
            last = last.append(cell);
        }
        head
    }

    pub fn car(&self) -> Value {
        self.node.borrow().car.clone()
    }

    pub fn car_type(&self) -> Type {
        self.node.borrow().car_type.clone()
    }

    pub fn cdr(&self) -> Value {
        self.node.borrow().cdr.clone()
    }

    pub fn cdr_type(&self) -> Type {
        self.node.borrow().cdr_type.clone()
    }

    /// Both car and cdr are empty
    pub fn is_null(&self) -> bool {
        let node = self.node.borrow();
        node.car_type.is_empty_type() && node.cdr_type.is_empty_type()
    }

    /// The two handles refer to the same node
    pub fn ptr_eq(&self, other: &Cell) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    /// The following cell of this chain
    pub fn next(&self) -> Option<Cell> {
        match &self.node.borrow().cdr {
            Value::Cell(cell) => Some(cell.clone()),
            _ => None,
        }
    }

    /// The preceding cell of this chain, if it is still alive
    pub fn previous(&self) -> Option<Cell> {
        self.node
            .borrow()
            .previous
            .upgrade()
            .map(|node| Cell { node })
    }

    /// The last cell reachable from this one
    pub fn last(&self) -> Cell {
        let mut current = self.clone();
        while let Some(next) = current.next() {
            current = next;
        }
        current
    }

    /// Number of cells from this one to the end of the chain; a null cell has none
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.is_null() && self.next().is_none()
    }

    pub fn nth(&self, index: usize) -> Option<Cell> {
        self.iter().nth(index)
    }

    /// Iterate this cell and its successors (one chain level, nested chains not entered)
    pub fn iter(&self) -> Iter {
        Iter {
            next: if self.is_empty() {
                None
            } else {
                Some(self.clone())
            },
        }
    }

    /// Append a cell or chain after the end of this chain
    ///
    /// When this cell is null it takes over the head of `other` in place and this handle
    /// becomes the first element. Appending a null cell is a no-op. A terminal cdr value on
    /// the current last cell is replaced by the link. Returns the new last cell.
    pub fn append(&self, other: Cell) -> Cell {
        if other.is_null() && other.next().is_none() {
            return self.last();
        }
        if self.is_null() {
            let (car, car_type, cdr, cdr_type) = {
                let source = other.node.borrow();
                (
                    source.car.clone(),
                    source.car_type.clone(),
                    source.cdr.clone(),
                    source.cdr_type.clone(),
                )
            };
            if let Value::Cell(next) = &cdr {
                next.node.borrow_mut().previous = Rc::downgrade(&self.node);
            }
            {
                let mut node = self.node.borrow_mut();
                node.car = car;
                node.car_type = car_type;
                node.cdr = cdr;
                node.cdr_type = cdr_type;
            }
            return self.last();
        }

        let last = self.last();
        other.node.borrow_mut().previous = Rc::downgrade(&last.node);
        {
            let mut node = last.node.borrow_mut();
            node.cdr = Value::Cell(other.clone());
            node.cdr_type = TOKEN.clone();
        }
        other.last()
    }

    /// Detach this cell from its chain and return the cell that followed it
    ///
    /// The previous cell inherits this cell's continuation. The removed cell keeps its
    /// car but loses both links.
    pub fn remove(&self) -> Option<Cell> {
        let previous = self.previous();
        let next = self.next();
        let (cdr, cdr_type) = {
            let mut node = self.node.borrow_mut();
            node.previous = Weak::new();
            (
                mem::replace(&mut node.cdr, Value::Empty),
                mem::replace(&mut node.cdr_type, EMPTY.clone()),
            )
        };

        if let Some(next) = &next {
            next.node.borrow_mut().previous = match &previous {
                Some(previous) => Rc::downgrade(&previous.node),
                None => Weak::new(),
            };
        }
        if let Some(previous) = &previous {
            let mut node = previous.node.borrow_mut();
            node.cdr = cdr;
            node.cdr_type = cdr_type;
        }
        next
    }

    /// Swap the car for a new value, returning the old one
    pub fn replace_car(&self, car: impl Into<Value>, car_type: Type) -> Value {
        let mut node = self.node.borrow_mut();
        node.car_type = car_type;
        mem::replace(&mut node.car, car.into())
    }

    /// Set the cdr
    ///
    /// A cell value continues the chain and is always tagged [TOKEN], whatever `cdr_type`
    /// says; any other value ends the chain here.
    pub fn set_cdr(&self, cdr: Value, cdr_type: Type) {
        let old = {
            let mut node = self.node.borrow_mut();
            node.cdr_type = match &cdr {
                Value::Cell(_) => TOKEN.clone(),
                _ => cdr_type,
            };
            mem::replace(&mut node.cdr, cdr)
        };
        if let Value::Cell(old) = old {
            old.node.borrow_mut().previous = Weak::new();
        }
        if let Some(next) = self.next() {
            next.node.borrow_mut().previous = Rc::downgrade(&self.node);
        }
    }

    /// Copy this chain from this cell onward
    ///
    /// Each car goes through its type's clone hook, so nested chains are copied too
    /// unless a type chooses otherwise. The copy starts with no previous cell.
    pub fn deep_clone(&self) -> Cell {
        let mut head: Option<Cell> = None;
        let mut last: Option<Cell> = None;
        for cell in self.iter() {
            let copy = {
                let node = cell.node.borrow();
                let copy = Cell::leaf(
                    node.car_type.clone_value(&node.car),
                    node.car_type.clone(),
                );
                if !matches!(node.cdr, Value::Cell(_) | Value::Empty) {
                    copy.set_cdr(
                        node.cdr_type.clone_value(&node.cdr),
                        node.cdr_type.clone(),
                    );
                }
                copy
            };
            // append skips null cells, so emptied cells are linked by hand
            match &last {
                Some(previous) => previous.set_cdr(Value::Cell(copy.clone()), TOKEN.clone()),
                None => head = Some(copy.clone()),
            }
            last = Some(copy);
        }
        head.unwrap_or_default()
    }

    fn terminal(&self) -> Option<(Value, Type)> {
        let node = self.node.borrow();
        match &node.cdr {
            Value::Cell(_) | Value::Empty => None,
            value => Some((value.clone(), node.cdr_type.clone())),
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::new()
    }
}

/// Forward iterator over one chain level
pub struct Iter {
    next: Option<Cell>,
}

impl Iterator for Iter {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        let current = self.next.take()?;
        self.next = current.next();
        Some(current)
    }
}

impl IntoIterator for &Cell {
    type Item = Cell;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        self.iter()
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let mut left = self.iter();
        let mut right = other.iter();
        loop {
            match (left.next(), right.next()) {
                (None, None) => return true,
                (Some(a), Some(b)) => {
                    let same = {
                        let (a, b) = (a.node.borrow(), b.node.borrow());
                        a.car_type == b.car_type && a.car == b.car
                    };
                    if !same || a.terminal() != b.terminal() {
                        return false;
                    }
                }
                _ => return false,
            }
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for cell in self.iter() {
            if !first {
                write!(f, " ")?;
            }
            first = false;
            let node = cell.node.borrow();
            write!(f, "{}", node.car_type.value_to_string(&node.car))?;
            drop(node);
            if let Some((value, cdr_type)) = cell.terminal() {
                write!(f, " . {}", cdr_type.value_to_string(&value))?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for cell in self.iter() {
            let node = cell.node.borrow();
            list.entry(&format_args!("{}: {:?}", node.car_type.name(), node.car));
        }
        list.finish()
    }
}
