#![allow(warnings)]

use rowbind::*;

#[derive(Record)]
pub struct Pair(pub i32, pub String);

fn main() {}
