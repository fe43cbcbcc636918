use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    Generics, Ident, Item, LitStr, Result, Token, Type, parse::Parse, parse::ParseStream,
    punctuated::Punctuated, spanned::Spanned,
};

#[derive(Clone, Copy)]
pub(crate) enum MessageShape {
    Request,
    Command,
    Event,
}

impl MessageShape {
    fn attr_name(self) -> &'static str {
        match self {
            MessageShape::Request => "request",
            MessageShape::Command => "command",
            MessageShape::Event => "event",
        }
    }
}

pub(crate) fn expand(shape: MessageShape, cfg: MessageAttrConfig, input: Item) -> Result<TokenStream2> {
    let (ident, generics) = match &input {
        Item::Struct(s) => (s.ident.clone(), s.generics.clone()),
        Item::Enum(e) => (e.ident.clone(), e.generics.clone()),
        other => {
            return Err(syn::Error::new(
                other.span(),
                format!("#[{}] only on struct or enum", shape.attr_name()),
            ));
        }
    };

    let name = cfg
        .name
        .unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));

    let body = match shape {
        MessageShape::Request => {
            let response = cfg.response.ok_or_else(|| {
                syn::Error::new(
                    Span::call_site(),
                    "missing key 'response'; expected #[request(response = Type)]",
                )
            })?;
            impl_message(&ident, &generics, quote!(Request), quote! {
                const NAME: &'static str = #name;
                type Response = #response;
            })
        }
        MessageShape::Command | MessageShape::Event => {
            if let Some(response) = &cfg.response {
                return Err(syn::Error::new(
                    response.span(),
                    format!("'response' is only valid on #[request], not #[{}]", shape.attr_name()),
                ));
            }
            let contract = match shape {
                MessageShape::Command => quote!(Command),
                _ => quote!(Event),
            };
            impl_message(&ident, &generics, contract, quote! {
                const NAME: &'static str = #name;
            })
        }
    };

    Ok(quote! {
        #input
        #body
    })
}

fn impl_message(
    ident: &Ident,
    generics: &Generics,
    contract: TokenStream2,
    items: TokenStream2,
) -> TokenStream2 {
    // 消息需满足 Send + Sync + 'static：为每个泛型参数补齐约束
    let mut generics = generics.clone();
    let type_params: Vec<Ident> = generics.type_params().map(|p| p.ident.clone()).collect();
    let lifetimes: Vec<syn::Lifetime> = generics.lifetimes().map(|l| l.lifetime.clone()).collect();
    let where_clause = generics.make_where_clause();
    for ident in type_params {
        where_clause
            .predicates
            .push(syn::parse_quote! { #ident: ::core::marker::Send + ::core::marker::Sync + 'static });
    }
    for lifetime in lifetimes {
        where_clause.predicates.push(syn::parse_quote! { #lifetime: 'static });
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    quote! {
        impl #impl_generics ::praetor::message::#contract for #ident #ty_generics #where_clause {
            #items
        }
    }
}

// -------- parsing --------

pub(crate) struct MessageAttrConfig {
    response: Option<Type>,
    name: Option<LitStr>,
}

impl Parse for MessageAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut response: Option<Type> = None;
        let mut name: Option<LitStr> = None;

        if input.is_empty() {
            return Ok(Self { response, name });
        }

        let elems: Punctuated<MessageAttrElem, Token![,]> =
            Punctuated::<MessageAttrElem, Token![,]>::parse_terminated(input)?;

        for elem in elems.into_iter() {
            match elem {
                MessageAttrElem::Response(ty) => {
                    if response.is_some() {
                        return Err(syn::Error::new(
                            ty.span(),
                            "duplicate key 'response' in attribute",
                        ));
                    }
                    response = Some(*ty);
                }
                MessageAttrElem::Name(lit) => {
                    if name.is_some() {
                        return Err(syn::Error::new(
                            lit.span(),
                            "duplicate key 'name' in attribute",
                        ));
                    }
                    if lit.value().trim().is_empty() {
                        return Err(syn::Error::new(lit.span(), "'name' must not be empty"));
                    }
                    name = Some(lit);
                }
            }
        }

        Ok(Self { response, name })
    }
}

enum MessageAttrElem {
    Response(Box<Type>),
    Name(LitStr),
}

impl Parse for MessageAttrElem {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: Ident = input.parse()?;
        let _eq: Token![=] = input.parse()?;
        if key == "response" {
            let ty: Type = input.parse()?;
            Ok(MessageAttrElem::Response(Box::new(ty)))
        } else if key == "name" {
            let lit: LitStr = input.parse()?;
            Ok(MessageAttrElem::Name(lit))
        } else {
            Err(syn::Error::new(
                key.span(),
                "unknown key in attribute; expected 'response' or 'name'",
            ))
        }
    }
}
