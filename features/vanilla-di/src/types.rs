use std::{
    any::{Any, TypeId},
    sync::Arc,
};

/// Boxed error produced by fallible constructors
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Components are shared through `Arc` once constructed,
/// so anything injectable needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// A constructed component instance
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    pub instance: Arc<dyn Any + Send + Sync + 'static>,
}

impl Instance {
    pub fn new<ExistingInstance: Injectable>(instance: ExistingInstance) -> Self {
        Self::from_arc(Arc::new(instance))
    }

    pub fn from_arc<ExistingInstance: Injectable>(instance: Arc<ExistingInstance>) -> Self {
        Instance {
            info: TypeInfo::of::<ExistingInstance>(),
            instance,
        }
    }

    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.instance.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.info.type_name),
        }
    }

    /// Whether both handles point at the same allocation
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.instance, &other.instance)
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Instance").field(&self.info.type_name).finish()
    }
}

/// Type Name and Type Id
///
/// Identifies a component type. Two infos are equal iff they denote the same type.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

/// A component type together with its constructor dependencies
///
/// The order of `dependencies` is the declared constructor-parameter order
/// and decides the argument order at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub info: TypeInfo,
    pub dependencies: Vec<TypeInfo>,
}

impl TypeDescriptor {
    pub fn new(info: TypeInfo, dependencies: Vec<TypeInfo>) -> Self {
        Self { info, dependencies }
    }

    /// Descriptor of `T` with the given dependencies
    pub fn of<T: 'static + ?Sized>(dependencies: Vec<TypeInfo>) -> Self {
        Self::new(TypeInfo::of::<T>(), dependencies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bulb;
    struct Switch;

    #[test]
    fn type_info_identity() {
        assert_eq!(TypeInfo::of::<Bulb>(), TypeInfo::of::<Bulb>());
        assert_ne!(TypeInfo::of::<Bulb>(), TypeInfo::of::<Switch>());
        assert!(TypeInfo::of::<Bulb>().to_string().ends_with("Bulb"));
    }

    #[test]
    fn instance_downcast() {
        let instance = Instance::new(42_u32);
        assert_eq!(*instance.downcast::<u32>().unwrap(), 42);

        let err = instance.downcast::<String>().unwrap_err();
        assert_eq!(err, std::any::type_name::<u32>());
    }

    #[test]
    fn instance_clones_share_allocation() {
        let instance = Instance::new(String::from("shared"));
        let clone = instance.clone();
        assert!(instance.ptr_eq(&clone));
        assert!(!instance.ptr_eq(&Instance::new(String::from("shared"))));
    }
}
