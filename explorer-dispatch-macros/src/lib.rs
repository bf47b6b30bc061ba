//! Procedural macros for explorer-dispatch

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use proc_macro2::Ident;
use quote::{format_ident, quote};
use std::collections::BTreeMap;
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    data: darling::ast::Data<ActionVariant, ()>,

    /// Enable automatic category inference from variant name prefixes
    #[darling(default)]
    infer_categories: bool,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,

    /// Explicit category override
    #[darling(default)]
    category: Option<String>,

    /// Exclude from category inference
    #[darling(default)]
    skip_category: bool,
}

// Verbs that END an action name. Nouns ("Colors", "Mode", "Page") must not be here.
const ACTION_VERBS: &[&str] = &[
    "Submit", "Open", "Close", "Cancel", "Next", "Prev", "Add", "Remove", "Clear", "Set", "Get",
    "Load", "Save", "Delete", "Toggle", "Select", "Reset", "Refetch", "Fetch", "Focus", "Blur",
    "Reconnect", "Disconnect", "Edit",
];

/// Marker that separates the category prefix from an async result verb
const RESULT_MARKER: &str = "Did";

fn split_pascal_case(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();

    for ch in s.chars() {
        if ch.is_uppercase() && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect()
}

/// Infer a category from a variant name.
///
/// The category is everything before the first verb or `Did` marker:
/// - `SearchSubmit` -> `search`
/// - `SearchDidLoad` -> `search`
/// - `ThemeCustomColorSet` -> `theme_custom_color`
/// - `DidFinish` -> `async_result`
///
/// Names that start with a verb (`ToggleAll`) or contain none (`Quit`) are
/// uncategorized.
fn infer_category(name: &str) -> Option<String> {
    let parts = split_pascal_case(name);
    let first = parts.first()?;

    if first == RESULT_MARKER {
        return Some("async_result".to_string());
    }
    if parts.len() < 2 || ACTION_VERBS.contains(&first.as_str()) {
        return None;
    }

    let boundary = parts
        .iter()
        .skip(1)
        .position(|p| p == RESULT_MARKER || ACTION_VERBS.contains(&p.as_str()))?
        + 1;

    Some(to_snake_case(&parts[..boundary].concat()))
}

/// Derive macro for the Action trait
///
/// Generates a `name()` method that returns the variant name as a static string.
///
/// With `#[action(infer_categories)]`, also generates:
/// - `category() -> Option<&'static str>`
/// - `category_enum() -> {Name}Category`
/// - `is_{category}()` predicates
/// - the `{Name}Category` enum and an `ActionCategory` impl
///
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// #[action(infer_categories)]
/// enum Action {
///     SearchSubmit(SearchParams),
///     SearchDidLoad { params: SearchParams, response: EventsResponse },
///     FavoritesClear,
///     #[action(category = "lifecycle")]
///     AppDidFocus,
/// }
///
/// assert_eq!(Action::FavoritesClear.name(), "FavoritesClear");
/// assert_eq!(Action::FavoritesClear.category(), Some("favorites"));
/// assert!(Action::AppDidFocus.is_lifecycle());
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };
    let darling::ast::Data::Enum(variants) = &opts.data else {
        return syn::Error::new_spanned(&input, "Action can only be derived for enums")
            .to_compile_error()
            .into();
    };

    let name_impl = name_impl(&opts.ident, variants);
    let category_impl = if opts.infer_categories {
        category_impl(&opts.ident, variants)
    } else {
        quote! {}
    };

    quote! {
        #name_impl
        #category_impl
    }
    .into()
}

fn name_impl(ty: &Ident, variants: &[ActionVariant]) -> proc_macro2::TokenStream {
    let arms = variants.iter().map(|v| {
        let ident = &v.ident;
        let label = ident.to_string();
        quote! { #ty::#ident { .. } => #label }
    });
    quote! {
        impl ::explorer_dispatch::Action for #ty {
            fn name(&self) -> &'static str {
                match self {
                    #(#arms,)*
                }
            }
        }
    }
}

fn variant_category(v: &ActionVariant) -> Option<String> {
    if v.skip_category {
        None
    } else {
        v.category
            .clone()
            .or_else(|| infer_category(&v.ident.to_string()))
    }
}

fn category_impl(ty: &Ident, variants: &[ActionVariant]) -> proc_macro2::TokenStream {
    let assigned: Vec<(&Ident, Option<String>)> =
        variants.iter().map(|v| (&v.ident, variant_category(v))).collect();

    let mut members: BTreeMap<&str, Vec<&Ident>> = BTreeMap::new();
    for (ident, category) in &assigned {
        if let Some(category) = category {
            members.entry(category.as_str()).or_default().push(*ident);
        }
    }

    let enum_ty = format_ident!("{}Category", ty);
    let labels: Vec<&str> = members.keys().copied().collect();
    let kinds: Vec<Ident> = labels
        .iter()
        .map(|c| format_ident!("{}", to_pascal_case(c)))
        .collect();

    let label_arms = assigned.iter().map(|(ident, category)| match category {
        Some(c) => quote! { #ty::#ident { .. } => ::core::option::Option::Some(#c) },
        None => quote! { #ty::#ident { .. } => ::core::option::Option::None },
    });
    let kind_arms = assigned.iter().map(|(ident, category)| {
        let kind = match category {
            Some(c) => format_ident!("{}", to_pascal_case(c)),
            None => format_ident!("Uncategorized"),
        };
        quote! { #ty::#ident { .. } => #enum_ty::#kind }
    });
    let predicates = members.iter().map(|(category, idents)| {
        let predicate = format_ident!("is_{}", category);
        let doc = format!("Whether this action is in the `{category}` category");
        quote! {
            #[doc = #doc]
            pub fn #predicate(&self) -> bool {
                matches!(self, #(#ty::#idents { .. })|*)
            }
        }
    });
    let enum_doc = format!("Categories of [`{ty}`] actions");

    quote! {
        #[doc = #enum_doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum #enum_ty {
            #(#kinds,)*
            Uncategorized,
        }

        impl #enum_ty {
            /// Every category, `Uncategorized` last
            pub fn all() -> &'static [Self] {
                &[#(Self::#kinds,)* Self::Uncategorized]
            }

            pub fn name(&self) -> &'static str {
                match self {
                    #(Self::#kinds => #labels,)*
                    Self::Uncategorized => "uncategorized",
                }
            }
        }

        impl #ty {
            pub fn category(&self) -> ::core::option::Option<&'static str> {
                match self {
                    #(#label_arms,)*
                }
            }

            pub fn category_enum(&self) -> #enum_ty {
                match self {
                    #(#kind_arms,)*
                }
            }

            #(#predicates)*
        }

        impl ::explorer_dispatch::ActionCategory for #ty {
            type Category = #enum_ty;

            fn category(&self) -> ::core::option::Option<&'static str> {
                #ty::category(self)
            }

            fn category_enum(&self) -> Self::Category {
                #ty::category_enum(self)
            }
        }
    }
}
