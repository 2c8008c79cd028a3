//! Derive macros for the shared store
//!
//! This crate provides procedural macros that remove the boilerplate of
//! declaring state patches and action names.
//!
//! # Available Macros
//!
//! - `#[derive(State)]` - Generates a `<Name>Patch` partial-state struct and
//!   implements `shared_store_core::state::State`
//! - `#[derive(Action)]` - Implements `shared_store_core::action::Action`
//!   with the variant name
//!
//! # Example
//!
//! ```ignore
//! use shared_store_macros::{Action, State};
//!
//! #[derive(State, Clone, Debug, Default)]
//! struct AppState {
//!     counter: i64,
//!     theme: Theme,
//! }
//!
//! #[derive(Action, Clone, Debug)]
//! enum AppAction {
//!     Increment,
//!     SetTheme(Theme),
//! }
//!
//! // Generated:
//! let patch = AppStatePatch::default().with_counter(3);
//! assert_eq!(AppAction::Increment.name(), "Increment");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields};

/// Derive macro for State structs
///
/// For a struct `Name` with named fields this generates:
/// - `NamePatch`, with the same visibility, holding `Option<T>` for every
///   field `T` (deriving `Clone`, `Debug`, `Default`, `PartialEq`)
/// - `NamePatch::with_<field>(value)` builder setters
/// - `NamePatch::is_empty()`, true when no field is set
/// - `impl State for Name`, whose `merge` overwrites the fields that are set
///
/// # Panics
///
/// This macro will produce a compile error (not a runtime panic) if applied
/// to an enum, a union, or a struct without named fields.
///
/// # Example
///
/// ```ignore
/// #[derive(State, Clone, Debug, Default)]
/// pub struct AppState {
///     pub counter: i64,
///     pub todos: Vec<TodoItem>,
/// }
///
/// let mut state = AppState::default();
/// state.merge(AppStatePatch::default().with_counter(2));
/// ```
#[proc_macro_derive(State)]
pub fn derive_state(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_state(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_state(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let vis = &input.vis;
    let patch_name = format_ident!("{}Patch", name);

    let Data::Struct(data_struct) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "#[derive(State)] can only be used on structs",
        ));
    };

    let Fields::Named(fields) = &data_struct.fields else {
        return Err(syn::Error::new_spanned(
            input,
            "#[derive(State)] requires a struct with named fields",
        ));
    };

    let idents: Vec<_> = fields.named.iter().filter_map(|f| f.ident.as_ref()).collect();
    let types: Vec<_> = fields.named.iter().map(|f| &f.ty).collect();
    let setters: Vec<_> = idents.iter().map(|ident| format_ident!("with_{}", ident)).collect();

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let generics = &input.generics;

    let patch_doc = format!("Partial form of [`{name}`]; `None` fields are left untouched on merge");
    let setter_docs = idents
        .iter()
        .map(|ident| format!("Set `{ident}` in this patch"));

    Ok(quote! {
        #[doc = #patch_doc]
        #[derive(Clone, Debug, Default, PartialEq)]
        #vis struct #patch_name #generics #where_clause {
            #(
                #[allow(missing_docs)]
                pub #idents: ::core::option::Option<#types>,
            )*
        }

        impl #impl_generics #patch_name #ty_generics #where_clause {
            #(
                #[doc = #setter_docs]
                #[must_use]
                pub fn #setters(mut self, value: #types) -> Self {
                    self.#idents = ::core::option::Option::Some(value);
                    self
                }
            )*

            /// Returns true if no field is set
            #[must_use]
            pub const fn is_empty(&self) -> bool {
                true #( && self.#idents.is_none() )*
            }
        }

        impl #impl_generics ::shared_store_core::state::State for #name #ty_generics #where_clause {
            type Patch = #patch_name #ty_generics;

            fn merge(&mut self, patch: Self::Patch) {
                #(
                    if let ::core::option::Option::Some(value) = patch.#idents {
                        self.#idents = value;
                    }
                )*
            }
        }
    })
}

/// Derive macro for Action enums
///
/// Implements `shared_store_core::action::Action`, returning the variant name
/// from `name()`. Unit, tuple and struct variants are all supported.
///
/// # Panics
///
/// This macro will produce a compile error (not a runtime panic) if applied
/// to a non-enum type.
///
/// # Example
///
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// enum AppAction {
///     Increment,
///     AddTodo { text: String },
///     SetTheme(Theme),
/// }
///
/// assert_eq!(AppAction::Increment.name(), "Increment");
/// ```
#[proc_macro_derive(Action)]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_action(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_action(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "#[derive(Action)] can only be used on enums",
        ));
    };

    let arms = data_enum.variants.iter().map(|variant| {
        let variant_name = &variant.ident;
        let label = variant_name.to_string();
        match &variant.fields {
            Fields::Named(_) => quote! { Self::#variant_name { .. } => #label, },
            Fields::Unnamed(_) => quote! { Self::#variant_name(..) => #label, },
            Fields::Unit => quote! { Self::#variant_name => #label, },
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    // An empty enum has no values, so the match below is exhaustive with no arms.
    Ok(quote! {
        impl #impl_generics ::shared_store_core::action::Action for #name #ty_generics #where_clause {
            fn name(&self) -> &'static str {
                match *self {
                    #(#arms)*
                }
            }
        }
    })
}
