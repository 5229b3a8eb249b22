use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, quote_spanned, ToTokens};
use syn::{
    parse::{Parse, ParseStream},
    Attribute,
    Expr,
    Fields,
    Ident,
    ItemStruct,
    Result,
};

/// The tags of the `error` attribute.
#[derive(Debug, Default)]
struct ErrorArgs {
    message: Option<Expr>,
    labels: Option<Expr>,
    help: Option<Expr>,
}

impl ErrorArgs {
    /// Collects the tags of the first `error` attribute in the list.
    fn from_attributes(attributes: &[Attribute]) -> Result<Self> {
        let mut args = Self::default();
        let Some(attr) = attributes.iter().find(|attr| attr.path().is_ident("error")) else {
            return Ok(args);
        };

        attr.parse_nested_meta(|meta| {
            let slot = if meta.path.is_ident("message") {
                &mut args.message
            } else if meta.path.is_ident("labels") {
                &mut args.labels
            } else if meta.path.is_ident("help") {
                &mut args.help
            } else {
                return Err(meta.error("unknown tag, expected `message`, `labels` or `help`"));
            };
            *slot = Some(meta.value()?.parse()?);
            Ok(())
        })?;
        Ok(args)
    }
}

/// A struct deriving [`ErrorKind`].
#[derive(Debug)]
pub struct ErrorKindTarget {
    pub name: Ident,
    fields: Fields,
    message: Expr,
    labels: Option<Expr>,
    help: Option<Expr>,
}

impl Parse for ErrorKindTarget {
    fn parse(input: ParseStream) -> Result<Self> {
        let ItemStruct { attrs, ident, fields, .. } = input.parse()?;
        let ErrorArgs { message, labels, help } = ErrorArgs::from_attributes(&attrs)?;
        let Some(message) = message else {
            return Err(syn::Error::new_spanned(ident, "missing `#[error(message = ...)]` attribute"));
        };

        Ok(Self { name: ident, fields, message, labels, help })
    }
}

impl ErrorKindTarget {
    /// Brings the named fields of the struct into scope for the tag expressions.
    fn bind_fields(&self) -> TokenStream2 {
        let name = &self.name;
        match &self.fields {
            Fields::Named(named) => {
                let idents = named.named.iter().filter_map(|field| field.ident.as_ref());
                quote! {
                    #[allow(unused_variables)]
                    let #name { #(#idents),* } = self;
                }
            },
            Fields::Unnamed(_) => quote_spanned! { name.span() =>
                compile_error!("`ErrorKind` cannot be derived for tuple structs");
            },
            Fields::Unit => TokenStream2::new(),
        }
    }

    /// Pairs each label text with a span. Extra labels or spans are dropped.
    fn labels(&self) -> TokenStream2 {
        let texts = match &self.labels {
            Some(labels) => quote! { #labels },
            None => quote! { [""; 0] },
        };
        quote! {
            #texts
                .into_iter()
                .zip(spans.iter())
                .map(|(text, span)| {
                    let label = ariadne::Label::new((src_id, span.clone()))
                        .with_color(cas_error::EXPR);
                    if text.is_empty() {
                        label
                    } else {
                        label.with_message(text)
                    }
                })
                .collect::<Vec<_>>()
        }
    }
}

impl ToTokens for ErrorKindTarget {
    fn to_tokens(&self, tokens: &mut TokenStream2) {
        let bindings = self.bind_fields();
        let message = &self.message;
        let labels = self.labels();
        let help = self.help.as_ref().map(|help| quote! { builder.set_help(#help); });

        tokens.extend(quote! {
            fn build_report<'a>(
                &self,
                src_id: &'a str,
                spans: &[std::ops::Range<usize>],
            ) -> ariadne::Report<(&'a str, std::ops::Range<usize>)> {
                #bindings

                let offset = spans.first().map_or(0, |span| span.start);
                let mut builder = ariadne::Report::build(ariadne::ReportKind::Error, src_id, offset)
                    .with_message(#message)
                    .with_labels(#labels);
                #help
                builder.finish()
            }
        });
    }
}
