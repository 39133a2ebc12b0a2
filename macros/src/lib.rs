extern crate proc_macro;
mod db_enum;
mod field_parser;
mod macro_utils;
mod record;

use proc_macro::TokenStream;
use proc_macro_error::proc_macro_error;
use syn::{parse_macro_input, DeriveInput};

/// Generates `rowbind::Record` and `rowbind::Mappable` for a struct with named fields.
///
/// Public fields become members in declaration order; `#[record(rename = "..")]`
/// changes the member name and `#[record(skip)]` hides a field. Struct level
/// `#[record(property(name = "..", ty = "..", get = "..", set = ".."))]` adds a
/// member backed by accessor methods, `#[record(constructor)]` binds rows to
/// all fields positionally instead.
#[proc_macro_derive(Record, attributes(record))]
#[proc_macro_error]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let struct_ident = &ast.ident;

    let stream = match field_parser::parse_record(&ast) {
        Ok(record) => record::expand(&ast, &record),
        Err(e) => return e.to_compile_error().into(),
    };
    macro_utils::submit_struct_to_stream(stream, "record", struct_ident, "_derive.rs")
}

/// Generates the database conversions of a field-less enum stored as its
/// discriminant, `#[repr(..)]` picks the integral type (default `i32`).
#[proc_macro_derive(DbEnum)]
#[proc_macro_error]
pub fn derive_db_enum(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let enum_ident = &ast.ident;

    let stream = match field_parser::parse_enum(&ast) {
        Ok(def) => db_enum::expand(&ast, &def),
        Err(e) => return e.to_compile_error().into(),
    };
    macro_utils::submit_struct_to_stream(stream, "db_enum", enum_ident, "_derive.rs")
}
