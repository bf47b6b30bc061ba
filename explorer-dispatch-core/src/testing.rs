//! Assertions over recorded actions
//!
//! Each macro takes anything with `.iter()` over actions, usually a `Vec`
//! filled by a recording middleware.
//!
//! ```ignore
//! assert_emitted!(actions, Action::SearchDidLoad { response, .. } if response.has_more());
//! assert_eq!(count_emitted!(actions, Action::SearchDidLoad { .. }), 2);
//! assert_category_emitted!(actions, "search");
//! ```

#[macro_export]
macro_rules! assert_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "no action matched `{}` in {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

#[macro_export]
macro_rules! assert_not_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "unexpected action matching `{}` in {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

#[macro_export]
macro_rules! count_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().filter(|a| matches!(a, $pattern $(if $guard)?)).count()
    };
}

/// Requires the action type to implement [`ActionCategory`](crate::ActionCategory)
#[macro_export]
macro_rules! assert_category_emitted {
    ($actions:expr, $category:expr) => {
        assert!(
            $actions.iter().any(|a| {
                use $crate::ActionCategory;
                a.category() == Some($category)
            }),
            "no action in category `{}` in {:?}",
            $category,
            $actions
        );
    };
}
