//! 组件定义
//!
//! 组件定义是交给容器的显式描述: 名称、作用域、是否为工厂、构造函数参数、
//! 注入字段、绑定扩展和工厂方法。容器只通过定义认识组件, 不做任何运行时反射。

use crate::errors::{ContainerError, ContainerResult};
use crate::lifecycle::{ContainerExtension, Scope};
use crate::metadata::{ComponentDescriptor, ComponentOptions, TypeInfo};
use parking_lot::RwLock;
use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// 组件实例
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 构造函数: 按参数顺序接收已解析的依赖
pub type ConstructorFn = Arc<dyn Fn(ResolvedArgs) -> ContainerResult<Instance> + Send + Sync>;

/// 字段赋值函数: (目标实例, 依赖实例)
pub type FieldSetterFn = Arc<dyn Fn(&Instance, Instance) -> ContainerResult<()> + Send + Sync>;

/// 工厂方法: 在工厂实例上调用, 产出另一个组件
pub type ProducerFn = Arc<dyn Fn(&Instance) -> ContainerResult<Instance> + Send + Sync>;

/// 将实例向下转换为具体类型
pub fn downcast_instance<T: Any + Send + Sync>(instance: Instance) -> ContainerResult<Arc<T>> {
    instance
        .downcast::<T>()
        .map_err(|_| ContainerError::interface_not_implemented(type_name::<T>()))
}

/// 组件定义引用
///
/// 引用在需要时才求值, 因此相互引用的定义也可以表达。
#[derive(Clone)]
pub struct DefinitionRef(Arc<dyn Fn() -> Arc<ComponentDefinition> + Send + Sync>);

impl DefinitionRef {
    /// 引用一个已经构建好的定义
    pub fn eager(definition: Arc<ComponentDefinition>) -> Self {
        Self(Arc::new(move || definition.clone()))
    }

    /// 通过函数延迟获取定义
    pub fn lazy(provider: fn() -> Arc<ComponentDefinition>) -> Self {
        Self(Arc::new(provider))
    }

    /// 获取定义
    pub fn get(&self) -> Arc<ComponentDefinition> {
        (self.0)()
    }
}

impl From<Arc<ComponentDefinition>> for DefinitionRef {
    fn from(definition: Arc<ComponentDefinition>) -> Self {
        Self::eager(definition)
    }
}

impl From<&Arc<ComponentDefinition>> for DefinitionRef {
    fn from(definition: &Arc<ComponentDefinition>) -> Self {
        Self::eager(definition.clone())
    }
}

impl fmt::Debug for DefinitionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DefinitionRef(<definition>)")
    }
}

/// 显式依赖绑定
#[derive(Debug, Clone)]
pub enum Binding {
    /// 按组件定义绑定
    Component(DefinitionRef),
    /// 按组件名称绑定
    Name(String),
}

/// 依赖请求
///
/// 对应一个构造函数参数或注入字段。显式绑定优先, 没有显式绑定时使用推断类型。
#[derive(Debug, Clone, Default)]
pub struct Dependency {
    binding: Option<Binding>,
    inferred: Option<DefinitionRef>,
}

impl Dependency {
    /// 按组件定义绑定
    pub fn component(definition: impl Into<DefinitionRef>) -> Self {
        Self {
            binding: Some(Binding::Component(definition.into())),
            inferred: None,
        }
    }

    /// 按名称绑定
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            binding: Some(Binding::Name(name.into())),
            inferred: None,
        }
    }

    /// 只有推断类型, 没有显式绑定
    pub fn inferred(definition: impl Into<DefinitionRef>) -> Self {
        Self {
            binding: None,
            inferred: Some(definition.into()),
        }
    }

    /// 既没有绑定也没有推断类型, 解析时总是失败
    pub fn unbound() -> Self {
        Self::default()
    }

    /// 附加推断类型
    pub fn or_inferred(mut self, definition: impl Into<DefinitionRef>) -> Self {
        self.inferred = Some(definition.into());
        self
    }

    /// 显式绑定
    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    /// 推断类型
    pub fn inferred_type(&self) -> Option<&DefinitionRef> {
        self.inferred.as_ref()
    }
}

/// 字段注入声明
#[derive(Clone)]
pub struct FieldInjection {
    name: String,
    dependency: Dependency,
    setter: FieldSetterFn,
}

impl FieldInjection {
    /// 字段名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 字段的依赖请求
    pub fn dependency(&self) -> &Dependency {
        &self.dependency
    }

    /// 将依赖实例赋值到目标实例的字段上
    pub fn assign(&self, target: &Instance, value: Instance) -> ContainerResult<()> {
        (self.setter)(target, value)
    }
}

/// 工厂方法声明
#[derive(Clone)]
pub struct ProducerMethod {
    method: String,
    output: DefinitionRef,
    produce: ProducerFn,
}

impl ProducerMethod {
    /// 方法名称
    pub fn method(&self) -> &str {
        &self.method
    }

    /// 产出组件的定义
    pub fn output(&self) -> Arc<ComponentDefinition> {
        self.output.get()
    }

    /// 在工厂实例上调用方法
    pub fn invoke(&self, factory: &Instance) -> ContainerResult<Instance> {
        (self.produce)(factory)
    }
}

/// 组件定义
pub struct ComponentDefinition {
    name: Option<String>,
    type_info: TypeInfo,
    scope: Scope,
    is_factory: bool,
    extensions: Vec<Arc<dyn ContainerExtension>>,
    constructor: Option<ConstructorFn>,
    parameters: Vec<Dependency>,
    fields: Vec<FieldInjection>,
    producers: Vec<ProducerMethod>,
}

impl ComponentDefinition {
    /// 开始构建类型 `T` 的组件定义
    pub fn builder<T: Any + Send + Sync>() -> DefinitionBuilder<T> {
        DefinitionBuilder::new()
    }

    /// 组件名称, 未标记为组件时为 `None`
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// 组件名称, 未标记为组件时返回 `NotAComponent`
    pub fn require_name(&self) -> ContainerResult<&str> {
        self.name
            .as_deref()
            .ok_or_else(|| ContainerError::not_a_component(self.type_name()))
    }

    /// 是否已标记为组件
    pub fn is_component(&self) -> bool {
        self.name.is_some()
    }

    /// 简短类型名称
    pub fn type_name(&self) -> &str {
        self.type_info.short_name()
    }

    /// 类型信息
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 作用域
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// 是否为工厂组件
    pub fn is_factory(&self) -> bool {
        self.is_factory
    }

    /// 绑定扩展
    pub fn extensions(&self) -> &[Arc<dyn ContainerExtension>] {
        &self.extensions
    }

    /// 构造函数参数
    pub fn parameters(&self) -> &[Dependency] {
        &self.parameters
    }

    /// 注入字段
    pub fn fields(&self) -> &[FieldInjection] {
        &self.fields
    }

    /// 工厂方法
    pub fn producers(&self) -> &[ProducerMethod] {
        &self.producers
    }

    /// 是否声明了构造函数
    pub fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    /// 使用已解析的参数创建实例
    pub fn construct(&self, args: ResolvedArgs) -> ContainerResult<Instance> {
        match &self.constructor {
            Some(constructor) => constructor(args),
            None => Err(ContainerError::creation_failed(
                self.name().unwrap_or_else(|| self.type_name()),
                "组件没有构造函数",
            )),
        }
    }

    /// 生成可序列化的描述符, 未标记为组件时返回 `None`
    pub fn descriptor(&self) -> Option<ComponentDescriptor> {
        let name = self.name.clone()?;
        Some(ComponentDescriptor {
            name,
            type_name: self.type_info.module_path.clone(),
            scope: self.scope,
            is_factory: self.is_factory,
            parameters: self.parameters.len(),
            fields: self.fields.iter().map(|f| f.name.clone()).collect(),
            extensions: self.extensions.len(),
            producers: self.producers.iter().map(|p| p.method.clone()).collect(),
        })
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("name", &self.name)
            .field("type_name", &self.type_info.module_path)
            .field("scope", &self.scope)
            .field("is_factory", &self.is_factory)
            .field("parameters", &self.parameters.len())
            .field("fields", &self.fields.len())
            .field("extensions", &self.extensions.len())
            .field("constructor", &self.constructor.as_ref().map(|_| "<function>"))
            .finish()
    }
}

/// 组件定义构建器
pub struct DefinitionBuilder<T> {
    definition: ComponentDefinition,
    error: Option<ContainerError>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> DefinitionBuilder<T> {
    fn new() -> Self {
        Self {
            definition: ComponentDefinition {
                name: None,
                type_info: TypeInfo::of::<T>(),
                scope: Scope::default(),
                is_factory: false,
                extensions: Vec::new(),
                constructor: None,
                parameters: Vec::new(),
                fields: Vec::new(),
                producers: Vec::new(),
            },
            error: None,
            _marker: PhantomData,
        }
    }

    /// 标记为组件
    pub fn component(self, options: ComponentOptions) -> Self {
        self.mark(options, false)
    }

    /// 标记为工厂组件
    pub fn factory(self, options: ComponentOptions) -> Self {
        self.mark(options, true)
    }

    fn mark(mut self, options: ComponentOptions, is_factory: bool) -> Self {
        if let Some(name) = &self.definition.name {
            if self.error.is_none() {
                self.error = Some(ContainerError::already_registered(name.clone()));
            }
            return self;
        }
        self.definition.name = Some(
            options
                .name
                .unwrap_or_else(|| self.definition.type_info.name.clone()),
        );
        self.definition.scope = options.scope.unwrap_or_default();
        self.definition.is_factory = is_factory;
        self
    }

    /// 设置构造函数
    pub fn constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(ResolvedArgs) -> ContainerResult<T> + Send + Sync + 'static,
    {
        self.definition.constructor =
            Some(Arc::new(move |args| constructor(args).map(|value| Arc::new(value) as Instance)));
        self
    }

    /// 使用 `Default` 作为构造函数
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor(|_| Ok(T::default()))
    }

    /// 追加一个构造函数参数
    pub fn inject(mut self, dependency: Dependency) -> Self {
        self.definition.parameters.push(dependency);
        self
    }

    /// 声明一个注入字段
    pub fn field<D, F>(mut self, name: impl Into<String>, dependency: Dependency, assign: F) -> Self
    where
        D: Any + Send + Sync,
        F: Fn(&T, Arc<D>) + Send + Sync + 'static,
    {
        let name = name.into();
        let field_name = name.clone();
        let setter: FieldSetterFn = Arc::new(move |target: &Instance, value: Instance| {
            let target = (**target).downcast_ref::<T>().ok_or_else(|| {
                ContainerError::interface_not_implemented(type_name::<T>())
            })?;
            let value = downcast_instance::<D>(value).map_err(|_| {
                ContainerError::creation_failed(
                    field_name.clone(),
                    format!("字段类型应为 {}", type_name::<D>()),
                )
            })?;
            assign(target, value);
            Ok(())
        });
        self.definition.fields.push(FieldInjection {
            name,
            dependency,
            setter,
        });
        self
    }

    /// 绑定扩展
    pub fn extension(mut self, extension: Arc<dyn ContainerExtension>) -> Self {
        self.definition.extensions.push(extension);
        self
    }

    /// 声明一个工厂方法
    pub fn produces<P, F>(
        mut self,
        method: impl Into<String>,
        output: impl Into<DefinitionRef>,
        method_fn: F,
    ) -> Self
    where
        P: Any + Send + Sync,
        F: Fn(&T) -> ContainerResult<P> + Send + Sync + 'static,
    {
        let produce: ProducerFn = Arc::new(move |factory: &Instance| {
            let factory = (**factory).downcast_ref::<T>().ok_or_else(|| {
                ContainerError::interface_not_implemented(type_name::<T>())
            })?;
            method_fn(factory).map(|value| Arc::new(value) as Instance)
        });
        self.definition.producers.push(ProducerMethod {
            method: method.into(),
            output: output.into(),
            produce,
        });
        self
    }

    /// 完成构建
    pub fn build(self) -> ContainerResult<Arc<ComponentDefinition>> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(Arc::new(self.definition)),
        }
    }
}

/// 已解析的构造函数参数
pub struct ResolvedArgs {
    component: String,
    args: Vec<Instance>,
}

impl ResolvedArgs {
    /// 创建参数列表
    pub fn new(component: impl Into<String>, args: Vec<Instance>) -> Self {
        Self {
            component: component.into(),
            args,
        }
    }

    /// 参数数量
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// 是否没有参数
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// 原始实例
    pub fn raw(&self, index: usize) -> Option<&Instance> {
        self.args.get(index)
    }

    /// 按位置取出具体类型的参数
    pub fn get<D: Any + Send + Sync>(&self, index: usize) -> ContainerResult<Arc<D>> {
        let instance = self.args.get(index).cloned().ok_or_else(|| {
            ContainerError::dependency_not_found(format!("#{index}"), Some(self.component.as_str()))
        })?;
        downcast_instance(instance)
    }
}

/// 注入字段单元
///
/// 字段注入发生在实例构造之后, 实例此时已经被共享, 所以字段需要内部可变性。
pub struct Injected<T: ?Sized> {
    slot: RwLock<Option<Arc<T>>>,
}

impl<T: ?Sized> Injected<T> {
    /// 创建空字段
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// 设置字段值, 覆盖旧值
    pub fn set(&self, value: Arc<T>) {
        *self.slot.write() = Some(value);
    }

    /// 获取字段值
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.read().clone()
    }

    /// 是否已注入
    pub fn is_set(&self) -> bool {
        self.slot.read().is_some()
    }
}

impl<T: ?Sized> Default for Injected<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Injected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injected")
            .field("is_set", &self.is_set())
            .finish()
    }
}
