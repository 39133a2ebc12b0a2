use proc_macro2::Ident;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Expr, ExprLit, ExprUnary, Fields, Lit, LitStr, Type, UnOp, Visibility};

#[derive(Clone)]
pub struct FieldDef {
    pub ident: Ident,
    pub tpe: Type,
    /// Member name seen by column matching and parameter derivation.
    pub name: String,
    pub public: bool,
    pub skip: bool,
}

#[derive(Clone)]
pub struct PropertyDef {
    pub name: String,
    pub tpe: Type,
    pub getter: Option<Ident>,
    pub setter: Option<Ident>,
    /// Setter returns a `Result` whose error is handed to the caller as is.
    pub fallible: bool,
}

pub struct RecordDef {
    pub fields: Vec<FieldDef>,
    pub properties: Vec<PropertyDef>,
    pub constructor: bool,
}

#[derive(Clone)]
pub struct VariantDef {
    pub ident: Ident,
    pub discriminant: i64,
}

pub struct EnumDef {
    pub repr: Ident,
    pub variants: Vec<VariantDef>,
}

fn parse_ident(lit: &LitStr) -> syn::Result<Ident> {
    lit.parse::<Ident>().map_err(|_| syn::Error::new(lit.span(), "Expected a method name"))
}

fn parse_property(meta: syn::meta::ParseNestedMeta) -> syn::Result<PropertyDef> {
    let mut name = None;
    let mut tpe = None;
    let mut getter = None;
    let mut setter = None;
    let mut fallible = false;
    let span = meta.path.span();
    meta.parse_nested_meta(|nested| {
        let value: LitStr = nested.value()?.parse()?;
        if nested.path.is_ident("name") {
            name = Some(value.value());
        } else if nested.path.is_ident("ty") {
            tpe = Some(value.parse::<Type>()?);
        } else if nested.path.is_ident("get") {
            getter = Some(parse_ident(&value)?);
        } else if nested.path.is_ident("set") || nested.path.is_ident("try_set") {
            if setter.is_some() {
                return Err(nested.error("Property takes one of `set` or `try_set`"));
            }
            setter = Some(parse_ident(&value)?);
            fallible = nested.path.is_ident("try_set");
        } else {
            return Err(nested.error("Expected one of `name`, `ty`, `get`, `set`, `try_set`"));
        }
        Ok(())
    })?;
    let name = name.ok_or_else(|| syn::Error::new(span, "Property requires `name = \"...\"`"))?;
    let tpe = tpe.ok_or_else(|| syn::Error::new(span, "Property requires `ty = \"...\"`"))?;
    if getter.is_none() && setter.is_none() {
        return Err(syn::Error::new(span, "Property requires `get` and/or `set`"));
    }
    Ok(PropertyDef { name, tpe, getter, setter, fallible })
}

fn parse_field(field: &syn::Field) -> syn::Result<FieldDef> {
    let ident = field.ident.clone().ok_or_else(|| syn::Error::new(field.span(), "Unnamed fields not supported"))?;
    let mut name = ident.to_string().trim_start_matches("r#").to_string();
    let mut skip = false;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("record")) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else if nested.path.is_ident("rename") {
                let value: LitStr = nested.value()?.parse()?;
                name = value.value();
                Ok(())
            } else {
                Err(nested.error("Expected `skip` or `rename = \"...\"`"))
            }
        })?;
    }
    let public = matches!(field.vis, Visibility::Public(_));
    Ok(FieldDef { ident, tpe: field.ty.clone(), name, public, skip })
}

pub fn parse_record(ast: &DeriveInput) -> syn::Result<RecordDef> {
    let named = match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => return Err(syn::Error::new(ast.ident.span(), "`#[derive(Record)]` only supports structs with named fields.")),
        },
        _ => return Err(syn::Error::new(ast.ident.span(), "`#[derive(Record)]` only supports structs.")),
    };

    let mut properties = Vec::new();
    let mut constructor = false;
    for attr in ast.attrs.iter().filter(|a| a.path().is_ident("record")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("constructor") {
                constructor = true;
                Ok(())
            } else if meta.path.is_ident("property") {
                properties.push(parse_property(meta)?);
                Ok(())
            } else {
                Err(meta.error("Expected `constructor` or `property(...)`"))
            }
        })?;
    }
    if constructor && !properties.is_empty() {
        return Err(syn::Error::new(ast.ident.span(), "Constructor records cannot declare properties"));
    }

    let fields = named.iter().map(parse_field).collect::<syn::Result<Vec<_>>>()?;
    Ok(RecordDef { fields, properties, constructor })
}

fn literal_discriminant(expr: &Expr) -> syn::Result<i64> {
    match expr {
        Expr::Lit(ExprLit { lit: Lit::Int(int), .. }) => int.base10_parse::<i64>(),
        Expr::Unary(ExprUnary { op: UnOp::Neg(_), expr, .. }) => literal_discriminant(expr).map(|d| -d),
        Expr::Group(group) => literal_discriminant(&group.expr),
        _ => Err(syn::Error::new(expr.span(), "Discriminant must be an integer literal")),
    }
}

const REPRS: [&str; 8] = ["i8", "i16", "i32", "i64", "u8", "u16", "u32", "u64"];

pub fn parse_enum(ast: &DeriveInput) -> syn::Result<EnumDef> {
    let data = match &ast.data {
        Data::Enum(data) => data,
        _ => return Err(syn::Error::new(ast.ident.span(), "`#[derive(DbEnum)]` only supports enums.")),
    };
    if data.variants.is_empty() {
        return Err(syn::Error::new(ast.ident.span(), "`#[derive(DbEnum)]` needs at least one variant"));
    }

    let mut repr = Ident::new("i32", ast.ident.span());
    for attr in ast.attrs.iter().filter(|a| a.path().is_ident("repr")) {
        attr.parse_nested_meta(|meta| {
            if let Some(ident) = meta.path.get_ident() {
                if REPRS.contains(&ident.to_string().as_str()) {
                    repr = ident.clone();
                }
            }
            Ok(())
        })?;
    }

    let mut variants = Vec::with_capacity(data.variants.len());
    let mut next = 0i64;
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(variant.ident.span(), "`#[derive(DbEnum)]` only supports field-less variants"));
        }
        let discriminant = match &variant.discriminant {
            Some((_, expr)) => literal_discriminant(expr)?,
            None => next,
        };
        next = discriminant.wrapping_add(1);
        variants.push(VariantDef { ident: variant.ident.clone(), discriminant });
    }
    Ok(EnumDef { repr, variants })
}
