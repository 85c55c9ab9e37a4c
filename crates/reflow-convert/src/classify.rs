//! Type classification.
//!
//! Every type is classified into exactly one shape. Classification is
//! structural below the top level: `List<Refed>` is a homogeneous container
//! over a convertible domain type no matter where the list came from.

use reflow_decl::{CallbackKind, DomainInfo};
use reflow_types::{NamedType, TypeRef};

use crate::{ClassifyError, Converter};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerKind {
    List,
    Set,
    Map,
}

/// A convertible domain type reference, possibly raw (unparameterized
/// reference to a parametric declaration).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainClass {
    pub ty: NamedType,
    pub info: DomainInfo,
}

impl DomainClass {
    /// Whether the reference omits type arguments the declaration carries;
    /// witnesses then fall back to name-based reuse or identity.
    pub fn is_raw(&self) -> bool {
        self.ty.args.is_empty() && self.info.type_param_count() > 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerClass {
    pub kind: ContainerKind,
    pub ty: NamedType,
    /// Map key type, passed through unconverted.
    pub key: Option<TypeRef>,
    pub item_ty: TypeRef,
    pub item: Box<Classification>,
}

/// A handler/consumer/function-shaped type in a value position; converted
/// by adapting through an inline lambda with the element direction
/// inverted (contravariant position).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackClass {
    pub kind: CallbackKind,
    pub ty: NamedType,
    pub arg_ty: TypeRef,
    pub arg: Box<Classification>,
    /// Function result, absent for handler/consumer.
    pub ret_ty: Option<TypeRef>,
    pub ret: Option<Box<Classification>>,
}

/// Contained value of an asynchronous carrier (deferred result, push
/// stream, or back-pressured sink).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsyncClass {
    pub item_ty: TypeRef,
    pub item: Box<Classification>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    /// Passed through unchanged.
    Opaque(TypeRef),
    /// Erased generic type parameter; conversion goes through a runtime
    /// witness.
    Var(String),
    Domain(DomainClass),
    Container(ContainerClass),
    Callback(CallbackClass),
    /// Deferred single result.
    Async(AsyncClass),
    /// Push-based multi-value producer.
    Stream(AsyncClass),
    /// Back-pressured consumer.
    Sink(AsyncClass),
}

impl Classification {
    /// Whether converting this shape is a no-op.
    pub fn is_passthrough(&self) -> bool {
        match self {
            Classification::Opaque(_) => true,
            Classification::Var(_) => false,
            Classification::Domain(_) => false,
            Classification::Container(c) => c.item.is_passthrough(),
            Classification::Callback(c) => {
                c.arg.is_passthrough()
                    && c.ret.as_ref().map(|r| r.is_passthrough()).unwrap_or(true)
            }
            // The carrier itself changes even when the item passes through.
            Classification::Async(_) | Classification::Stream(_) | Classification::Sink(_) => {
                false
            }
        }
    }
}

impl Converter<'_> {
    /// Classify a type into exactly one shape.
    pub fn classify(&self, ty: &TypeRef) -> Result<Classification, ClassifyError> {
        let wk = &self.config().well_known;
        let named = match ty {
            TypeRef::Unresolved(text) => return Err(ClassifyError::Unresolved(text.clone())),
            TypeRef::Var(name) => return Ok(Classification::Var(name.clone())),
            TypeRef::Void | TypeRef::Primitive(_) => {
                return Ok(Classification::Opaque(ty.clone()))
            }
            TypeRef::Named(named) => named,
        };

        let name = named.name.as_str();
        if name == wk.future {
            return Ok(Classification::Async(self.item_class(named, 0)?));
        }
        if name == wk.list || name == wk.set {
            let kind = if name == wk.list {
                ContainerKind::List
            } else {
                ContainerKind::Set
            };
            let item_ty = arg_or_object(named, 0);
            return Ok(Classification::Container(ContainerClass {
                kind,
                ty: named.clone(),
                key: None,
                item: Box::new(self.classify(&item_ty)?),
                item_ty,
            }));
        }
        if name == wk.map {
            let item_ty = arg_or_object(named, 1);
            return Ok(Classification::Container(ContainerClass {
                kind: ContainerKind::Map,
                ty: named.clone(),
                key: Some(arg_or_object(named, 0)),
                item: Box::new(self.classify(&item_ty)?),
                item_ty,
            }));
        }
        if name == wk.handler || name == wk.consumer {
            let kind = if name == wk.handler {
                CallbackKind::Handler
            } else {
                CallbackKind::Consumer
            };
            let arg_ty = arg_or_object(named, 0);
            return Ok(Classification::Callback(CallbackClass {
                kind,
                ty: named.clone(),
                arg: Box::new(self.classify(&arg_ty)?),
                arg_ty,
                ret_ty: None,
                ret: None,
            }));
        }
        if name == wk.function {
            let arg_ty = arg_or_object(named, 0);
            let ret_ty = arg_or_object(named, 1);
            return Ok(Classification::Callback(CallbackClass {
                kind: CallbackKind::Function,
                ty: named.clone(),
                arg: Box::new(self.classify(&arg_ty)?),
                arg_ty,
                ret: Some(Box::new(self.classify(&ret_ty)?)),
                ret_ty: Some(ret_ty),
            }));
        }

        // Domain lookup comes before the raw stream carriers so that a
        // stream type that is itself part of the domain converts to its
        // shim rather than to the bare lazy-sequence bridge.
        if let Some(info) = self.registry().domain_info(&named.name) {
            return Ok(Classification::Domain(DomainClass {
                ty: named.clone(),
                info,
            }));
        }

        if name == wk.read_stream {
            return Ok(Classification::Stream(self.item_class(named, 0)?));
        }
        if name == wk.write_stream {
            return Ok(Classification::Sink(self.item_class(named, 0)?));
        }

        Ok(Classification::Opaque(ty.clone()))
    }

    fn item_class(&self, named: &NamedType, index: usize) -> Result<AsyncClass, ClassifyError> {
        let item_ty = arg_or_object(named, index);
        Ok(AsyncClass {
            item: Box::new(self.classify(&item_ty)?),
            item_ty,
        })
    }

    /// The wrapped form of `ty`, as it appears in generated signatures.
    /// Purely structural and side-effect free.
    pub fn converted_type(&self, ty: &TypeRef) -> Result<TypeRef, ClassifyError> {
        let class = self.classify(ty)?;
        Ok(self.converted(&class))
    }

    /// The wrapped signature type of an already-classified shape.
    pub fn converted(&self, class: &Classification) -> TypeRef {
        let target = &self.config().target;
        match class {
            Classification::Opaque(ty) => ty.clone(),
            Classification::Var(name) => TypeRef::var(name.clone()),
            Classification::Domain(d) => {
                let args = d
                    .ty
                    .args
                    .iter()
                    .map(|a| self.converted_or_same(a).boxed())
                    .collect();
                TypeRef::named(d.info.shim_name.clone(), args)
            }
            Classification::Container(c) => {
                let mut args = Vec::new();
                if let Some(key) = &c.key {
                    args.push(key.clone());
                }
                args.push(self.converted(&c.item).boxed());
                TypeRef::named(c.ty.name.clone(), args)
            }
            Classification::Callback(c) => {
                let mut args = vec![self.converted(&c.arg).boxed()];
                if let Some(ret) = &c.ret {
                    args.push(self.converted(ret).boxed());
                }
                TypeRef::named(c.ty.name.clone(), args)
            }
            Classification::Async(a) => {
                TypeRef::named(target.pending.as_str(), vec![self.converted(&a.item).boxed()])
            }
            Classification::Stream(s) => TypeRef::named(
                target.lazy_seq.as_str(),
                vec![self.converted(&s.item).boxed()],
            ),
            Classification::Sink(s) => TypeRef::named(
                target.subscriber.as_str(),
                vec![self.converted(&s.item).boxed()],
            ),
        }
    }

    /// `converted_type`, falling back to the input when classification
    /// fails (used for positions where a diagnostic has already been
    /// recorded).
    pub(crate) fn converted_or_same(&self, ty: &TypeRef) -> TypeRef {
        self.converted_type(ty).unwrap_or_else(|_| ty.clone())
    }
}

fn arg_or_object(named: &NamedType, index: usize) -> TypeRef {
    named
        .args
        .get(index)
        .cloned()
        .unwrap_or_else(|| TypeRef::class("java.lang.Object"))
}
