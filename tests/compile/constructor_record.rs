#![allow(warnings)]

use rowbind::*;

#[derive(Record, Debug)]
#[record(constructor)]
pub struct Summary {
    pub total: i64,
    pub label: Option<String>,
    #[record(skip)]
    pub note: String,
}

fn main() {
    let _ = Mapper::<Summary>::from_schema(&Schema::default().column("Total", ValueKind::I64));
}
