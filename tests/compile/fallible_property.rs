#![allow(warnings)]

use rowbind::*;

#[derive(Debug)]
pub struct Rejected(String);

impl std::fmt::Display for Rejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rejected {}", self.0)
    }
}

impl std::error::Error for Rejected {}

#[derive(Record, Default)]
#[record(property(name = "Code", ty = "String", try_set = "set_code"))]
pub struct Coupon {
    pub id: i64,
    code: String,
}

impl Coupon {
    pub fn set_code(&mut self, code: String) -> Result<(), Rejected> {
        if code.is_empty() {
            return Err(Rejected(code));
        }
        self.code = code;
        Ok(())
    }
}

fn main() {
    let members = Coupon::members();
    assert_eq!(members.len(), 2);
    assert!(members[1].is_writable());
    assert!(!members[1].is_readable());
}
