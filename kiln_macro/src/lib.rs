use proc_macro::TokenStream;

mod item;

/// Declares an instance. Factories are generated by `kiln_scan` from the build
/// script; the attribute itself only checks its arguments.
///
/// ```ignore
/// #[instance(type = dyn Page, scoping = unscoped, classifier = "home")]
/// pub struct HomePage { .. }
/// ```
#[proc_macro_attribute]
pub fn instance(args: TokenStream, input: TokenStream) -> TokenStream {
    item::instance(args.into(), input.into())
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// Selects the constructor of an instance type and allows `#[classifier("..")]`
/// on its parameters.
#[proc_macro_attribute]
pub fn inject(args: TokenStream, input: TokenStream) -> TokenStream {
    item::inject(args.into(), input.into())
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
