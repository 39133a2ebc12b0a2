#![allow(warnings)]

use rowbind::*;

#[derive(Record, Default)]
#[record(property(name = "Label", ty = "String"))]
pub struct Tagged {
    pub id: i64,
}

fn main() {}
