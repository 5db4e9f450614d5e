use kiln_core::{attribute::parse_instance_args, declaration::is_marker, parameter::parse_classifier};
use proc_macro2::TokenStream;
use quote::ToTokens;
use syn::{spanned::Spanned, Error, FnArg, Item, ItemFn, Result};

const CLASSIFIER: &str = "classifier";

/// Checks parameter classifiers and removes them; rustc does not know the attribute.
fn strip_classifiers(function: &mut ItemFn) -> Result<()> {
    for input in function.sig.inputs.iter_mut() {
        if let FnArg::Typed(pat_type) = input {
            parse_classifier(&pat_type.attrs, CLASSIFIER)?;
            pat_type.attrs.retain(|attr| !is_marker(attr, CLASSIFIER));
        }
    }
    Ok(())
}

pub(crate) fn instance(args: TokenStream, input: TokenStream) -> Result<TokenStream> {
    parse_instance_args(args)?;

    match syn::parse2::<Item>(input)? {
        Item::Struct(item) => Ok(item.into_token_stream()),
        Item::Fn(mut item) => {
            strip_classifiers(&mut item)?;
            Ok(item.into_token_stream())
        }
        other => Err(Error::new(
            other.span(),
            "#[instance] applies to structs and functions",
        )),
    }
}

pub(crate) fn inject(args: TokenStream, input: TokenStream) -> Result<TokenStream> {
    if !args.is_empty() {
        return Err(Error::new(args.span(), "#[inject] takes no arguments"));
    }
    let mut item: ItemFn = syn::parse2(input)?;
    strip_classifiers(&mut item)?;
    Ok(item.into_token_stream())
}
