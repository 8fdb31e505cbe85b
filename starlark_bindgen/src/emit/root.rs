//! Root constructors: one plugin method per root type.

use proc_macro2::TokenStream;
use quote::quote;

use super::{Emitter, assignment};
use crate::error::BindgenError;
use crate::model::TypeDescriptor;
use crate::naming::ident;

impl Emitter<'_> {
    /// Emits the constructor for `root`.
    ///
    /// The constructor takes a required `name`, optional `labels` and
    /// `annotations`, then one optional parameter per exposed spec member (or
    /// `data` for data roots), builds the object and hands it to the plugin's
    /// `register` hook.
    pub(super) fn root_constructor(&self, root: &TypeDescriptor) -> Result<TokenStream, BindgenError> {
        let plan = self.planner.plan_root(root)?;
        let plugin = &self.plugin;
        let fn_ident = self.constructor_ident(&root.name)?;
        let model = self.model_type(root)?;
        let meta = ident("metadata member", &self.config.conventions.metadata_member)?;
        let thread = quote!(thread);
        let obj = quote!(obj);

        let mut decls = Vec::new();
        let mut params = Vec::new();
        let mut assigns = Vec::new();
        for field in &plan.fields {
            let key = &field.key;
            let target = Self::field_access(&obj, field)?;
            match &field.wrapper {
                None => params.push(quote! { Param::optional(#key, &mut #target) }),
                Some(wrapper) => {
                    let var = ident("variable", &field.var_name)?;
                    decls.push(Self::wrapper_decl(wrapper, &var, &thread, true)?);
                    params.push(quote! { Param::optional(#key, &mut #var) });
                    assigns.push(assignment(field.assignment, &var, &target));
                }
            }
        }

        let doc = format!(
            " Creates a `{}` from script arguments and registers it.",
            self.naming.registered_name(&self.package.name, &root.name)
        );
        Ok(quote! {
            impl #plugin {
                #[doc = #doc]
                #[allow(non_snake_case)]
                pub fn #fn_ident(
                    &self,
                    thread: &Thread,
                    fn_name: &str,
                    args: &Arguments,
                ) -> Result<Value, Error> {
                    let mut obj = #model::default();
                    let mut labels = StringStringMap::default();
                    let mut annotations = StringStringMap::default();
                    #( #decls )*
                    unpack_args(
                        fn_name,
                        args,
                        &mut [
                            Param::required("name", &mut obj.#meta.name),
                            Param::optional("labels", &mut labels),
                            Param::optional("annotations", &mut annotations),
                            #( #params, )*
                        ],
                    )?;
                    obj.#meta.labels = labels.value.into_iter().collect();
                    obj.#meta.annotations = annotations.value.into_iter().collect();
                    #( #assigns )*
                    self.register(thread, obj)
                }
            }
        })
    }
}
