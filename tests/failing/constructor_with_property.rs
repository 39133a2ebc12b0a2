#![allow(warnings)]

use rowbind::*;

#[derive(Record)]
#[record(constructor)]
#[record(property(name = "Label", ty = "String", get = "label"))]
pub struct Summary {
    pub total: i64,
}

fn main() {}
