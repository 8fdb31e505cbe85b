//! The registration entry point binding every constructor.

use proc_macro2::TokenStream;
use quote::quote;

use super::Emitter;
use crate::error::BindgenError;
use crate::model::TypeDescriptor;

impl Emitter<'_> {
    /// Emits `register_symbols`, binding each of `types` as
    /// `<package>.<snake_type>`.
    pub(super) fn registration(&self, types: &[&TypeDescriptor]) -> Result<TokenStream, BindgenError> {
        let plugin = &self.plugin;
        let bindings = types
            .iter()
            .map(|t| {
                let name = self.naming.registered_name(&self.package.name, &t.name);
                let constructor = self.constructor_ident(&t.name)?;
                Ok(quote! { env.add_builtin(#name, Self::#constructor)?; })
            })
            .collect::<Result<Vec<_>, BindgenError>>()?;
        let doc = format!(
            " Binds every generated `{}` constructor into `env`.",
            self.package.name
        );
        let env = if bindings.is_empty() {
            quote!(_env)
        } else {
            quote!(env)
        };
        Ok(quote! {
            impl #plugin {
                #[doc = #doc]
                pub fn register_symbols(#env: &mut Environment<Self>) -> Result<(), Error> {
                    #( #bindings )*
                    Ok(())
                }
            }
        })
    }
}
