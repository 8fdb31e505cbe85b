//! Wrapper, constructor and unpacker for nested struct types.

use proc_macro2::TokenStream;
use quote::quote;

use super::{Emitter, assignment};
use crate::error::BindgenError;
use crate::model::TypeDescriptor;
use crate::naming::ident;
use crate::plan::ConversionPlan;

impl Emitter<'_> {
    /// Emits the wrapper type for `t`, its plugin constructor and its
    /// `Unpack` implementation.
    pub(super) fn struct_binding(&self, t: &TypeDescriptor) -> Result<TokenStream, BindgenError> {
        let plans = self.planner.plan_members(t, &[])?;
        let mut tokens = self.struct_wrapper(t)?;
        tokens.extend(self.struct_constructor(t, &plans)?);
        tokens.extend(self.struct_unpacker(t, &plans)?);
        Ok(tokens)
    }

    fn struct_wrapper(&self, t: &TypeDescriptor) -> Result<TokenStream, BindgenError> {
        let wrapper = ident("wrapper", &t.name)?;
        let model = self.model_type(t)?;
        let registered = self.naming.registered_name(&self.package.name, &t.name);
        let doc = format!(" Host value wrapping a `{}`.", t.name);
        Ok(quote! {
            #[doc = #doc]
            #[derive(Clone, Debug, Default)]
            pub struct #wrapper {
                dict: Option<Dict>,
                #[doc = " Decoded value."]
                pub value: #model,
                is_unpacked: bool,
                thread: Thread,
            }

            impl #wrapper {
                #[doc = " Creates an empty wrapper bound to `thread`."]
                #[must_use]
                pub fn new(thread: &Thread) -> Self {
                    Self {
                        dict: None,
                        value: Default::default(),
                        is_unpacked: false,
                        thread: thread.clone(),
                    }
                }

                #[doc = " Whether a value has been decoded into this wrapper."]
                #[must_use]
                pub fn is_unpacked(&self) -> bool {
                    self.is_unpacked
                }

                #[doc = " The frozen dict the value was decoded from."]
                #[must_use]
                pub fn dict(&self) -> Option<&Dict> {
                    self.dict.as_ref()
                }
            }

            impl Object for #wrapper {
                fn type_name(&self) -> &'static str {
                    #registered
                }

                fn as_any(&self) -> &dyn ::std::any::Any {
                    self
                }
            }
        })
    }

    fn struct_constructor(
        &self,
        t: &TypeDescriptor,
        plans: &[ConversionPlan],
    ) -> Result<TokenStream, BindgenError> {
        let plugin = &self.plugin;
        let wrapper = ident("wrapper", &t.name)?;
        let fn_ident = self.constructor_ident(&t.name)?;
        let keys: Vec<&str> = plans.iter().map(|plan| plan.key.as_str()).collect();
        let vars = plans
            .iter()
            .map(|plan| ident("variable", &plan.var_name))
            .collect::<Result<Vec<_>, _>>()?;
        let capacity = plans.len();
        let doc = format!(
            " Creates a `{}` from script arguments.",
            self.naming.registered_name(&self.package.name, &t.name)
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
                    #( let mut #vars: Option<Value> = None; )*
                    unpack_args(
                        fn_name,
                        args,
                        &mut [ #( Param::optional(#keys, &mut #vars), )* ],
                    )?;
                    let dict = Dict::with_capacity(#capacity);
                    #(
                        if let Some(value) = #vars {
                            dict.insert(#keys, value)?;
                        }
                    )*
                    let mut obj = #wrapper::new(thread);
                    obj.unpack(&Value::Dict(dict))?;
                    Ok(Value::object(obj))
                }
            }
        })
    }

    fn struct_unpacker(
        &self,
        t: &TypeDescriptor,
        plans: &[ConversionPlan],
    ) -> Result<TokenStream, BindgenError> {
        let wrapper = ident("wrapper", &t.name)?;
        let model = self.model_type(t)?;
        let obj = quote!(obj);
        let thread = quote!(&self.thread);
        let arms = plans
            .iter()
            .map(|plan| {
                let key = &plan.key;
                let target = Self::field_access(&obj, plan)?;
                let Some(field_wrapper) = &plan.wrapper else {
                    return Ok(quote! {
                        #key => {
                            #target.unpack(&item).map_err(|err| err.in_attribute(key))?;
                        }
                    });
                };
                let var = ident("variable", "v")?;
                let decl = Self::wrapper_decl(field_wrapper, &var, &thread, false)?;
                let assign = assignment(plan.assignment, &var, &target);
                Ok(quote! {
                    #key => {
                        #decl
                        #var.unpack(&item).map_err(|err| err.in_attribute(key))?;
                        #assign
                    }
                })
            })
            .collect::<Result<Vec<_>, BindgenError>>()?;
        let (binding, item) = if plans.is_empty() {
            (quote!(let obj), quote!(_))
        } else {
            (quote!(let mut obj), quote!(item))
        };

        Ok(quote! {
            impl Unpack for #wrapper {
                fn unpack(&mut self, value: &Value) -> Result<(), Error> {
                    if let Some(existing) = value.downcast_ref::<Self>() {
                        *self = existing.clone();
                        return Ok(());
                    }
                    let Value::Dict(map_obj) = value else {
                        return Err(Error::unexpected_type("dict", value));
                    };
                    #binding = #model::default();
                    for (key_value, #item) in map_obj.items() {
                        let Some(key) = key_value.as_str() else {
                            return Err(Error::NonStringKey(key_value.type_name()));
                        };
                        match key {
                            #( #arms )*
                            _ => return Err(Error::UnexpectedAttribute(key.to_owned())),
                        }
                    }
                    map_obj.freeze();
                    self.dict = Some(map_obj.clone());
                    self.value = obj;
                    self.is_unpacked = true;
                    Ok(())
                }
            }
        })
    }
}
