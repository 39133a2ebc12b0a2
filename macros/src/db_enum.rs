use crate::field_parser::EnumDef;
use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use syn::DeriveInput;

fn value_kind(repr: &Ident) -> Ident {
    let kind = repr.to_string().to_uppercase();
    Ident::new(&kind, Span::call_site())
}

pub fn expand(ast: &DeriveInput, def: &EnumDef) -> TokenStream {
    let enum_ident = &ast.ident;
    let enum_name = enum_ident.to_string();
    let kind = value_kind(&def.repr);
    let names = def.variants.iter().map(|v| v.ident.to_string());
    let discriminants: Vec<i64> = def.variants.iter().map(|v| v.discriminant).collect();
    let idents: Vec<&Ident> = def.variants.iter().map(|v| &v.ident).collect();

    quote! {
        impl #enum_ident {
            #[doc(hidden)]
            pub const ROWBIND_ENUM_INFO: ::rowbind::EnumInfo = ::rowbind::EnumInfo {
                name: #enum_name,
                underlying: ::rowbind::ValueKind::#kind,
                variants: &[#((#names, #discriminants)),*],
            };
        }

        impl ::rowbind::DbTyped for #enum_ident {
            fn type_info() -> ::rowbind::TypeInfo {
                ::rowbind::TypeInfo::enumeration(Self::ROWBIND_ENUM_INFO)
            }
        }

        impl ::rowbind::FromValue for #enum_ident {
            fn from_value(value: ::rowbind::Value) -> ::core::result::Result<Self, ::rowbind::ConvertError> {
                match Self::ROWBIND_ENUM_INFO.discriminant(value)? {
                    #(#discriminants => ::core::result::Result::Ok(#enum_ident::#idents),)*
                    other => ::core::result::Result::Err(::rowbind::ConvertError::undefined_variant(#enum_name, other)),
                }
            }
        }

        impl ::rowbind::ToValue for #enum_ident {
            fn to_value(&self) -> ::rowbind::Value {
                let discriminant: i64 = match self {
                    #(#enum_ident::#idents => #discriminants,)*
                };
                ::rowbind::Value::integral(::rowbind::ValueKind::#kind, discriminant).unwrap_or(::rowbind::Value::I64(discriminant))
            }
        }

        impl ::rowbind::Mappable for #enum_ident {
            fn shape() -> ::rowbind::Shape<Self> {
                ::rowbind::Shape::Enum(::rowbind::mapper::EnumShape {
                    info: Self::ROWBIND_ENUM_INFO,
                    from_value: <Self as ::rowbind::FromValue>::from_value,
                })
            }
        }
    }
}
