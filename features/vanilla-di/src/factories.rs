use std::{any::type_name, fmt::Debug, marker::PhantomData, sync::Arc};

use crate::{
    errors::{ConstructorIssue, RequireError},
    types::{DynError, Injectable, Instance, TypeDescriptor, TypeInfo},
};

/// A function building a component from its resolved dependencies
///
/// Implemented for every `Fn(Arc<A>, Arc<B>, ..) -> Output` with up to 10 parameters.
/// `Args` is the tuple of dependency types, `(A, B, ..)`.
pub trait Constructor<Args>: Send + Sync + 'static {
    type Output;

    /// The dependency types, in parameter order
    fn parameters() -> Vec<TypeInfo>;

    /// Calls the function with `args` downcast to the parameter types
    fn construct(&self, args: &[Instance]) -> Result<Self::Output, DynError>;
}

fn next_argument<'a, T: Injectable>(
    args: &mut impl Iterator<Item = &'a Instance>,
) -> Result<Arc<T>, DynError> {
    let instance = args
        .next()
        .ok_or(RequireError::TypeMissing(type_name::<T>()))?;

    let downcasted = instance
        .downcast::<T>()
        .map_err(|actual_type| RequireError::DowncastFailed {
            required_type: type_name::<T>(),
            actual_type,
        })?;

    Ok(downcasted)
}

macro_rules! constructor_tuple ({ $($param:ident)* } => {
    impl<Func, Out, $($param,)*> Constructor<($($param,)*)> for Func
    where
        Func: Fn($(Arc<$param>),*) -> Out + Send + Sync + 'static,
        $($param: Injectable,)*
    {
        type Output = Out;

        fn parameters() -> Vec<TypeInfo> {
            vec![$(TypeInfo::of::<$param>(),)*]
        }

        #[inline]
        #[allow(non_snake_case, unused_mut, unused_variables)]
        fn construct(&self, args: &[Instance]) -> Result<Out, DynError> {
            let mut args = args.iter();
            $(let $param = next_argument::<$param>(&mut args)?;)*
            Ok((self)($($param,)*))
        }
    }
});

constructor_tuple! {}
constructor_tuple! { A }
constructor_tuple! { A B }
constructor_tuple! { A B C }
constructor_tuple! { A B C D }
constructor_tuple! { A B C D E }
constructor_tuple! { A B C D E F }
constructor_tuple! { A B C D E F G }
constructor_tuple! { A B C D E F G H }
constructor_tuple! { A B C D E F G H I }
constructor_tuple! { A B C D E F G H I J }

/// Wrapper Trait for constructors, providing instances of Any
pub trait DynConstructor: Send + Sync {
    /// The dependency types, in parameter order
    fn parameters(&self) -> &[TypeInfo];

    /// Builds the instance from resolved dependencies in parameter order
    fn construct(&self, args: &[Instance]) -> Result<Instance, DynError>;
}

struct TypedConstructor<F, Args, T>
where
    F: Constructor<Args>,
{
    constructor: F,
    parameters: Vec<TypeInfo>,
    finish: fn(F::Output) -> Result<T, DynError>,
    _args: PhantomData<fn(Args)>,
}

// Impl DynConstructor for any typed constructor
impl<F, Args, T> DynConstructor for TypedConstructor<F, Args, T>
where
    F: Constructor<Args>,
    Args: 'static,
    T: Injectable,
{
    fn parameters(&self) -> &[TypeInfo] {
        &self.parameters
    }

    fn construct(&self, args: &[Instance]) -> Result<Instance, DynError> {
        let output = self.constructor.construct(args)?;
        (self.finish)(output).map(Instance::new)
    }
}

/// A component type paired with the constructors able to build it
pub struct Component {
    descriptor: TypeDescriptor,
    constructors: Vec<Box<dyn DynConstructor>>,
}

impl Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("descriptor", &self.descriptor)
            .field("constructors", &self.constructors.len())
            .finish()
    }
}

impl Component {
    /// Starts the definition of a component of type `T`
    pub fn of<T: Injectable>() -> ComponentBuilder<T> {
        ComponentBuilder {
            declared: None,
            constructors: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn info(&self) -> TypeInfo {
        self.descriptor.info
    }

    pub fn constructor_count(&self) -> usize {
        self.constructors.len()
    }

    /// The single constructor whose parameters are the declared dependencies
    pub fn select_constructor(&self) -> Result<&dyn DynConstructor, ConstructorIssue> {
        let constructor = match self.constructors.as_slice() {
            [] => return Err(ConstructorIssue::Missing),
            [constructor] => constructor,
            constructors => return Err(ConstructorIssue::Ambiguous(constructors.len())),
        };

        if constructor.parameters() != self.descriptor.dependencies.as_slice() {
            return Err(ConstructorIssue::SignatureMismatch {
                declared: self.descriptor.dependencies.clone(),
                parameters: constructor.parameters().to_vec(),
            });
        }

        Ok(constructor.as_ref())
    }
}

/// Collects the definition of a component of type `T`
///
/// The declared dependencies are the ones given to [ComponentBuilder::depends_on],
/// or else the parameters of the only constructor. Without exactly one
/// constructor nothing is declared, so the type adds no graph edges.
pub struct ComponentBuilder<T> {
    declared: Option<Vec<TypeInfo>>,
    constructors: Vec<Box<dyn DynConstructor>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Injectable> ComponentBuilder<T> {
    /// Adds a constructor for `T`
    pub fn constructor<F, Args>(self, constructor: F) -> Self
    where
        F: Constructor<Args, Output = T>,
        Args: 'static,
    {
        self.push(constructor, Ok)
    }

    /// Adds a constructor for `T` which may fail
    pub fn try_constructor<F, Args, E>(self, constructor: F) -> Self
    where
        F: Constructor<Args, Output = Result<T, E>>,
        Args: 'static,
        E: Into<DynError> + 'static,
    {
        self.push(constructor, |result| result.map_err(Into::into))
    }

    /// Declares the dependencies explicitly instead of taking them from the constructor
    pub fn depends_on(mut self, dependencies: Vec<TypeInfo>) -> Self {
        self.declared = Some(dependencies);
        self
    }

    pub fn build(self) -> Component {
        let dependencies = match self.declared {
            Some(declared) => declared,
            None => match self.constructors.as_slice() {
                [constructor] => constructor.parameters().to_vec(),
                _ => Vec::new(),
            },
        };

        Component {
            descriptor: TypeDescriptor::of::<T>(dependencies),
            constructors: self.constructors,
        }
    }

    fn push<F, Args>(mut self, constructor: F, finish: fn(F::Output) -> Result<T, DynError>) -> Self
    where
        F: Constructor<Args>,
        Args: 'static,
    {
        self.constructors.push(Box::new(TypedConstructor {
            constructor,
            parameters: F::parameters(),
            finish,
            _args: PhantomData,
        }));
        self
    }
}

impl<T: Injectable> From<ComponentBuilder<T>> for Component {
    fn from(builder: ComponentBuilder<T>) -> Self {
        builder.build()
    }
}

/// A type declaring its own component definition
///
/// Registering such types by name is the explicit stand-in for scanning
/// a code base for marked components.
pub trait Discoverable: Injectable + Sized {
    fn component() -> ComponentBuilder<Self>;
}
