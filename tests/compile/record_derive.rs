#![allow(warnings)]

use rowbind::*;

#[derive(Record, Default, Debug)]
#[record(property(name = "DisplayName", ty = "String", get = "display_name", set = "set_display_name"))]
pub struct Customer {
    pub id: i64,
    #[record(rename = "CustomerName")]
    pub name: String,
    pub email: Option<String>,
    #[record(skip)]
    pub cached: Vec<u8>,
    internal: u32,
}

impl Customer {
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email.clone().unwrap_or_default())
    }

    pub fn set_display_name(&mut self, value: String) {
        self.name = value;
    }
}

fn main() {
    let members = Customer::members();
    assert_eq!(members.len(), 4);
    let _ = Customer::construct();
}
