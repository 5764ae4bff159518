//! Expansion of `#[e2e::test]`.
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, spanned::Spanned, FnArg, ItemFn, Pat, PatIdent,
    ReturnType, Type,
};

/// Shorthand for returning a [`syn::Error`].
macro_rules! error {
    ($tokens:expr, $($msg:expr),+ $(,)?) => {{
        return Err(syn::Error::new($tokens.span(), format!($($msg),+)));
    }};
}

pub(crate) fn test(attr: TokenStream, input: TokenStream) -> TokenStream {
    let item_fn = parse_macro_input!(input as ItemFn);
    expand(attr.into(), &item_fn)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(attr: TokenStream2, item_fn: &ItemFn) -> syn::Result<TokenStream2> {
    if !attr.is_empty() {
        error!(attr, "`#[e2e::test]` takes no arguments");
    }

    let attrs = &item_fn.attrs;
    let vis = &item_fn.vis;
    let sig = &item_fn.sig;
    let fn_name = &sig.ident;
    let fn_output = &sig.output;
    let fn_block = &item_fn.block;

    if sig.asyncness.is_none() {
        error!(sig.fn_token, "`#[e2e::test]` functions must be `async`");
    }
    if let ReturnType::Default = fn_output {
        error!(sig, "e2e tests must return `eyre::Result<()>`");
    }

    let mut accounts: Vec<&PatIdent> = Vec::new();
    for arg in &sig.inputs {
        let FnArg::Typed(arg) = arg else {
            error!(arg, "unexpected `self` in an e2e test");
        };
        let Pat::Ident(pat) = arg.pat.as_ref() else {
            error!(arg.pat, "expected an identifier, e.g. `alice: Account`");
        };
        if pat.by_ref.is_some() || pat.subpat.is_some() {
            error!(pat, "expected an identifier, e.g. `alice: Account`");
        }
        if !is_account(&arg.ty) {
            error!(arg.ty, "e2e test arguments must be of type `Account`");
        }
        accounts.push(pat);
    }
    let count = accounts.len();

    Ok(quote! {
        #(#attrs)*
        #[::tokio::test]
        #vis async fn #fn_name() #fn_output {
            ::e2e::with_anon_context(
                |[#(#accounts),*]: [::e2e::Account; #count]| async move #fn_block
            )
            .await
        }
    })
}

/// Whether `ty` names `Account`, possibly through a path like
/// `e2e::Account`.
fn is_account(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    path.path.segments.last().is_some_and(|segment| segment.ident == "Account")
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    fn expand_err(item_fn: &ItemFn) -> String {
        expand(TokenStream2::new(), item_fn).unwrap_err().to_string()
    }

    #[test]
    fn injects_accounts_into_a_tokio_test() {
        let item_fn: ItemFn = parse_quote! {
            async fn approves(alice: Account, bob: e2e::Account) -> Result<()> {
                Ok(())
            }
        };

        let expanded = expand(TokenStream2::new(), &item_fn)
            .expect("should expand")
            .to_string();

        assert!(expanded.contains(":: tokio :: test"), "{expanded}");
        assert!(expanded.contains("async fn approves ()"), "{expanded}");
        assert!(
            expanded.contains("[alice , bob] : [:: e2e :: Account ; 2usize]"),
            "{expanded}"
        );
    }

    #[test]
    fn keeps_mutable_bindings() {
        let item_fn: ItemFn = parse_quote! {
            async fn reconfigures(mut alice: Account) -> Result<()> {
                Ok(())
            }
        };

        let expanded = expand(TokenStream2::new(), &item_fn)
            .expect("should expand")
            .to_string();

        assert!(expanded.contains("[mut alice]"), "{expanded}");
    }

    #[test]
    fn rejects_malformed_tests() {
        let item_fn: ItemFn = parse_quote! {
            fn blocking(alice: Account) -> Result<()> { Ok(()) }
        };
        assert!(expand_err(&item_fn).contains("must be `async`"));

        let item_fn: ItemFn = parse_quote! {
            async fn no_result(alice: Account) {}
        };
        assert!(expand_err(&item_fn).contains("must return `eyre::Result<()>`"));

        let item_fn: ItemFn = parse_quote! {
            async fn by_ref(ref alice: Account) -> Result<()> { Ok(()) }
        };
        assert!(expand_err(&item_fn).contains("expected an identifier"));

        let item_fn: ItemFn = parse_quote! {
            async fn wrong_type(alice: u64) -> Result<()> { Ok(()) }
        };
        assert!(expand_err(&item_fn).contains("must be of type `Account`"));
    }

    #[test]
    fn rejects_arguments() {
        let item_fn: ItemFn = parse_quote! {
            async fn approves(alice: Account) -> Result<()> { Ok(()) }
        };
        let err = expand(quote!(flaky), &item_fn).unwrap_err();
        assert!(err.to_string().contains("takes no arguments"));
    }
}
