use crate::field_parser::{FieldDef, PropertyDef, RecordDef};
use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

fn field_member(field: &FieldDef) -> TokenStream {
    let ident = &field.ident;
    let tpe = &field.tpe;
    let name = &field.name;
    quote! {
        ::rowbind::MemberInfo::field(
            #name,
            <#tpe as ::rowbind::DbTyped>::type_info(),
            {
                let getter: ::rowbind::Getter<Self> = |instance| ::rowbind::ToValue::to_value(&instance.#ident);
                getter
            },
            {
                let setter: ::rowbind::Setter<Self> = |instance, value| {
                    instance.#ident = ::rowbind::FromValue::from_value(value)?;
                    ::core::result::Result::Ok(())
                };
                setter
            },
        )
    }
}

fn property_member(property: &PropertyDef) -> TokenStream {
    let tpe = &property.tpe;
    let name = &property.name;
    let getter = match &property.getter {
        Some(method) => quote! {
            ::core::option::Option::Some({
                let getter: ::rowbind::Getter<Self> = |instance| ::rowbind::ToValue::to_value(&instance.#method());
                getter
            })
        },
        None => quote! { ::core::option::Option::None },
    };
    let setter = match &property.setter {
        Some(method) if property.fallible => quote! {
            ::core::option::Option::Some({
                let setter: ::rowbind::Setter<Self> = |instance, value| {
                    let value: #tpe = ::rowbind::FromValue::from_value(value)?;
                    instance.#method(value).map_err(|e| ::rowbind::SetError::User(::core::convert::Into::into(e)))
                };
                setter
            })
        },
        Some(method) => quote! {
            ::core::option::Option::Some({
                let setter: ::rowbind::Setter<Self> = |instance, value| {
                    let value: #tpe = ::rowbind::FromValue::from_value(value)?;
                    instance.#method(value);
                    ::core::result::Result::Ok(())
                };
                setter
            })
        },
        None => quote! { ::core::option::Option::None },
    };
    quote! {
        ::rowbind::MemberInfo::property(#name, <#tpe as ::rowbind::DbTyped>::type_info(), #getter, #setter)
    }
}

fn object_impls(ast: &DeriveInput, record: &RecordDef) -> TokenStream {
    let struct_ident = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let defaults = record.fields.iter().map(|f| {
        let ident = &f.ident;
        quote! { #ident: ::core::default::Default::default() }
    });
    let members = record
        .fields
        .iter()
        .filter(|f| f.public && !f.skip)
        .map(field_member)
        .chain(record.properties.iter().map(property_member));

    quote! {
        impl #impl_generics ::rowbind::Record for #struct_ident #ty_generics #where_clause {
            fn construct() -> Self {
                Self { #(#defaults),* }
            }

            fn members() -> ::std::vec::Vec<::rowbind::MemberInfo<Self>> {
                ::std::vec![#(#members),*]
            }
        }

        impl #impl_generics ::rowbind::Mappable for #struct_ident #ty_generics #where_clause {
            fn shape() -> ::rowbind::Shape<Self> {
                ::rowbind::Shape::Object(::rowbind::mapper::ObjectShape::of())
            }
        }
    }
}

fn constructor_impls(ast: &DeriveInput, record: &RecordDef) -> TokenStream {
    let struct_ident = &ast.ident;
    let type_name = struct_ident.to_string();
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let args = record.fields.iter().filter(|f| !f.skip).map(|f| {
        let name = &f.name;
        let tpe = &f.tpe;
        quote! { ::rowbind::ArgInfo { name: #name, type_info: <#tpe as ::rowbind::DbTyped>::type_info() } }
    });
    let inits = record.fields.iter().map(|f| {
        let ident = &f.ident;
        let name = &f.name;
        if f.skip {
            quote! { #ident: ::core::default::Default::default() }
        } else {
            quote! { #ident: ::rowbind::accessor::take_arg(&mut args, #name)? }
        }
    });

    quote! {
        impl #impl_generics ::rowbind::Mappable for #struct_ident #ty_generics #where_clause {
            fn shape() -> ::rowbind::Shape<Self> {
                ::rowbind::Shape::Positional(::rowbind::mapper::PositionalShape {
                    type_name: #type_name,
                    args: ::std::vec![#(#args),*],
                    construct: |args| {
                        let mut args = args.into_iter();
                        ::core::result::Result::Ok(Self { #(#inits),* })
                    },
                })
            }
        }
    }
}

pub fn expand(ast: &DeriveInput, record: &RecordDef) -> TokenStream {
    if record.constructor {
        constructor_impls(ast, record)
    } else {
        object_impls(ast, record)
    }
}
