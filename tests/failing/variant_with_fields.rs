#![allow(warnings)]

use rowbind::*;

#[derive(DbEnum)]
pub enum Figure {
    Circle,
    Square(u32),
}

fn main() {}
