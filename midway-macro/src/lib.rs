//! Procedural macros for the midway middleware registry.
//!
//! This crate provides the `#[middleware_fn]` attribute, which turns an async
//! function into a middleware type ready to be defined in a registry.
//!
//! # Example
//!
//! ```ignore
//! use midway::prelude::*;
//!
//! #[middleware_fn(name = "poweredBy", description = "Adds an X-Powered-By header")]
//! async fn powered_by(req: Request, res: Response, next: Next) -> Result<Response, MiddlewareError> {
//!     let res = next.run(req, res).await?;
//!     Ok(res.header("X-Powered-By", "midway"))
//! }
//!
//! // Generates `PoweredByMiddleware` with `manifest()` and `constructor()`.
//! registry.define_manifest(DEFAULT_NAMESPACE, PoweredByMiddleware::manifest(), PoweredByMiddleware::constructor());
//! ```

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, punctuated::Punctuated, Expr, ExprLit, FnArg, ItemFn, Lit, Meta, Token,
};

/// Attributes for the `#[middleware_fn]` macro.
#[derive(Default, Debug)]
struct MiddlewareAttrs {
    /// Short logical name used with `resolve`.
    name: Option<String>,
    /// Optional description.
    description: Option<String>,
}

impl MiddlewareAttrs {
    fn parse_meta_list(metas: Punctuated<Meta, Token![,]>) -> syn::Result<Self> {
        let mut attrs = MiddlewareAttrs::default();

        for meta in metas {
            let Meta::NameValue(nv) = meta else {
                return Err(syn::Error::new_spanned(meta, "expected name = value"));
            };
            let ident = nv
                .path
                .get_ident()
                .ok_or_else(|| syn::Error::new_spanned(&nv.path, "expected identifier"))?
                .to_string();

            let value = match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(lit_str),
                    ..
                }) => lit_str.value(),
                _ => return Err(syn::Error::new_spanned(&nv.value, "expected string literal")),
            };

            match ident.as_str() {
                "name" => attrs.name = Some(value),
                "description" => attrs.description = Some(value),
                _ => {
                    return Err(syn::Error::new_spanned(
                        nv.path,
                        format!("unknown attribute: {}", ident),
                    ));
                }
            }
        }

        Ok(attrs)
    }
}

/// Turn an async `(Request, Response, Next)` function into a middleware type.
///
/// # Attributes
///
/// - `name` (optional): short logical name; defaults to the function name in
///   lowerCamelCase
/// - `description` (optional): free-form description kept in the manifest
///
/// The generated `{FnName}Middleware` unit struct implements `Middleware`,
/// exposes `manifest()` and `constructor()` (a nullary `Constructor`), and the
/// original function is kept as written.
#[proc_macro_attribute]
pub fn middleware_fn(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(args with Punctuated::<Meta, Token![,]>::parse_terminated);
    let input_fn = parse_macro_input!(input as ItemFn);

    match generate_middleware(args, input_fn) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_middleware(
    args: Punctuated<Meta, Token![,]>,
    input_fn: ItemFn,
) -> syn::Result<proc_macro2::TokenStream> {
    let attrs = MiddlewareAttrs::parse_meta_list(args)?;

    if input_fn.sig.asyncness.is_none() {
        return Err(syn::Error::new_spanned(
            &input_fn.sig,
            "middleware_fn must be async",
        ));
    }
    let typed_args = input_fn
        .sig
        .inputs
        .iter()
        .filter(|arg| matches!(arg, FnArg::Typed(_)))
        .count();
    if typed_args != 3 || input_fn.sig.inputs.len() != 3 {
        return Err(syn::Error::new_spanned(
            &input_fn.sig.inputs,
            "middleware_fn expects (request, response, next) arguments",
        ));
    }

    let fn_name = &input_fn.sig.ident;
    let name = attrs
        .name
        .unwrap_or_else(|| to_camel_case(&fn_name.to_string()));
    validate_name(&name).map_err(|reason| {
        syn::Error::new(proc_macro2::Span::call_site(), format!("invalid name '{}': {}", name, reason))
    })?;
    let type_name = capitalize(&name);
    let description = attrs.description.unwrap_or_default();

    let struct_name = format_ident!("{}Middleware", to_pascal_case(&fn_name.to_string()));
    let manifest_name = format_ident!("{}_MANIFEST", fn_name.to_string().to_uppercase());
    let fn_vis = &input_fn.vis;

    let expanded = quote! {
        /// Generated middleware manifest.
        #[allow(dead_code)]
        #fn_vis static #manifest_name: ::midway::middleware::MiddlewareManifest =
            ::midway::middleware::MiddlewareManifest::new(#name, #type_name)
                .with_description(#description);

        /// Generated middleware type.
        #[derive(Debug, Default, Clone, Copy)]
        #fn_vis struct #struct_name;

        impl #struct_name {
            /// Create a new instance of the middleware.
            pub fn new() -> Self {
                Self
            }

            /// Get the middleware manifest.
            pub fn manifest() -> &'static ::midway::middleware::MiddlewareManifest {
                &#manifest_name
            }

            /// Nullary constructor for registering this type.
            pub fn constructor() -> ::midway::registry::Constructor {
                ::midway::registry::Constructor::nullary(|| {
                    ::std::result::Result::Ok(::std::sync::Arc::new(#struct_name)
                        as ::midway::middleware::SharedMiddleware)
                })
            }
        }

        #[::midway::prelude::async_trait]
        impl ::midway::middleware::Middleware for #struct_name {
            async fn handle(
                &self,
                request: ::midway::http::Request,
                response: ::midway::http::Response,
                next: ::midway::middleware::Next,
            ) -> ::std::result::Result<::midway::http::Response, ::midway::error::MiddlewareError> {
                #fn_name(request, response, next).await
            }

            fn name(&self) -> &str {
                #name
            }

            fn manifest(&self) -> ::std::option::Option<&'static ::midway::middleware::MiddlewareManifest> {
                ::std::option::Option::Some(&#manifest_name)
            }
        }

        #input_fn
    };

    Ok(expanded)
}

fn validate_name(name: &str) -> Result<(), &'static str> {
    let mut chars = name.chars();
    match chars.next() {
        None => Err("name is empty"),
        Some(first) if !first.is_ascii_alphabetic() => Err("name must start with an ASCII letter"),
        Some(_) if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') => {
            Err("name may only contain ASCII letters, digits and '_'")
        }
        Some(_) => Ok(()),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Convert a snake_case string to PascalCase.
fn to_pascal_case(s: &str) -> String {
    s.split('_').map(capitalize).collect()
}

/// Convert a snake_case string to lowerCamelCase.
fn to_camel_case(s: &str) -> String {
    let mut words = s.split('_').filter(|w| !w.is_empty());
    let head = words.next().unwrap_or_default().to_string();
    words.fold(head, |mut acc, word| {
        acc.push_str(&capitalize(word));
        acc
    })
}
