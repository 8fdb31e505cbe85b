//! List wrappers for nested struct types.

use proc_macro2::TokenStream;
use quote::quote;

use super::{Emitter, list_wrapper_name};
use crate::error::BindgenError;
use crate::model::TypeDescriptor;
use crate::naming::ident;

impl Emitter<'_> {
    /// Emits `<T>List`, which unpacks a host list element by element through
    /// the wrapper for `t`.
    pub(super) fn list_binding(&self, t: &TypeDescriptor) -> Result<TokenStream, BindgenError> {
        let element = ident("wrapper", &t.name)?;
        let list = ident("wrapper", &list_wrapper_name(&t.name))?;
        let model = self.model_type(t)?;
        let doc = format!(" Host list of `{}` values.", t.name);
        Ok(quote! {
            #[doc = #doc]
            #[derive(Clone, Debug, Default)]
            pub struct #list {
                list: Option<List>,
                #[doc = " Decoded elements, in list order."]
                pub value: Vec<#model>,
                thread: Thread,
            }

            impl #list {
                #[doc = " Creates an empty list wrapper bound to `thread`."]
                #[must_use]
                pub fn new(thread: &Thread) -> Self {
                    Self {
                        list: None,
                        value: Vec::new(),
                        thread: thread.clone(),
                    }
                }

                #[doc = " The frozen list the elements were decoded from."]
                #[must_use]
                pub fn list(&self) -> Option<&List> {
                    self.list.as_ref()
                }
            }

            impl Unpack for #list {
                fn unpack(&mut self, value: &Value) -> Result<(), Error> {
                    let Value::List(list_obj) = value else {
                        return Err(Error::unexpected_type("list", value));
                    };
                    let mut items = Vec::with_capacity(list_obj.len());
                    for (index, item) in list_obj.items().iter().enumerate() {
                        let mut element = #element::new(&self.thread);
                        element.unpack(item).map_err(|err| err.at_index(index))?;
                        items.push(element.value);
                    }
                    list_obj.freeze();
                    self.list = Some(list_obj.clone());
                    self.value = items;
                    Ok(())
                }
            }
        })
    }
}
