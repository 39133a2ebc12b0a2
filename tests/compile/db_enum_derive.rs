#![allow(warnings)]

use rowbind::*;

#[derive(DbEnum, Debug, Clone, Copy, PartialEq, Default)]
#[repr(u8)]
pub enum Priority {
    #[default]
    Low = 1,
    Medium,
    High = 10,
}

#[derive(DbEnum, Debug, PartialEq)]
pub enum Balance {
    Debit = -1,
    Even,
    Credit,
}

fn main() {
    assert_eq!(Priority::type_info().kind, ValueKind::U8);
    assert_eq!(Priority::Medium.to_value(), Value::U8(2));
    assert_eq!(Balance::from_value(Value::I32(1)).unwrap(), Balance::Credit);
}
