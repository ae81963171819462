//! 依赖解析
//!
//! 解析顺序: 单例缓存 -> 工厂函数表 -> 新建实例。
//! 新建实例时先执行 preCreate 钩子, 再并发解析全部构造函数参数 (结果保持参数顺序),
//! 构造后注入字段并执行 postCreate 钩子。同一单例的并发构造只执行一次,
//! 其余请求等待该次构造完成。

use crate::container::DiContainerImpl;
use di_abstractions::ResolveContext;
use futures::future::{try_join_all, BoxFuture};
use infrastructure_common::{
    Binding, ComponentDefinition, ContainerError, ContainerResult, DefinitionRef, Dependency,
    FieldInjection, Instance, ResolvedArgs,
};
use std::sync::Arc;
use tracing::debug;

/// 已存在实例的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Cache,
    Factory,
}

impl DiContainerImpl {
    /// 在给定解析上下文中解析组件
    pub(crate) fn resolve_in(
        &self,
        definition: Arc<ComponentDefinition>,
        context: ResolveContext,
    ) -> BoxFuture<'_, ContainerResult<Instance>> {
        Box::pin(async move {
            let name = definition.require_name()?.to_string();

            let registered = self.state.read().contains(&name);
            if !registered {
                self.register_in(&definition, &context).await?;
            }
            // 始终使用注册表中的定义, 同名时先注册者生效
            let stored = self.state.read().definition(&name);
            let definition = stored.unwrap_or(definition);
            let context = context.enter(&name)?;

            let cached = self.state.read().instance(&name);
            if let Some(instance) = cached {
                debug!("从单例缓存获取组件: {}", name);
                return self
                    .complete_existing(&definition, &name, instance, Source::Cache, &context)
                    .await;
            }

            let binding = self.state.read().factory(&name);
            if let Some(binding) = binding {
                debug!(
                    "通过工厂方法 {}::{} 产出组件: {}",
                    binding.factory_name(),
                    binding.method_name(),
                    name
                );
                let instance = binding.produce()?;
                return self
                    .complete_existing(&definition, &name, instance, Source::Factory, &context)
                    .await;
            }

            if !definition.scope().is_singleton() || context.is_reentrant() {
                return self.create_new_instance(&definition, &name, &context).await;
            }
            self.construct_singleton(&definition, &name, &context).await
        })
    }

    /// 构造单例; 构造进行中时等待其完成, 然后按缓存实例处理
    async fn construct_singleton(
        &self,
        definition: &ComponentDefinition,
        name: &str,
        context: &ResolveContext,
    ) -> ContainerResult<Instance> {
        let cell = self.state.write().construction(name);
        let mut constructed = false;
        let instance = cell
            .get_or_try_init(|| {
                constructed = true;
                self.create_new_instance(definition, name, context)
            })
            .await?
            .clone();
        if constructed {
            return Ok(instance);
        }

        debug!("等待单例构造完成: {}", name);
        self.complete_existing(definition, name, instance, Source::Cache, context)
            .await
    }

    /// 缓存或工厂产出的实例: 注入字段, 执行 postCreate, 按作用域缓存
    async fn complete_existing(
        &self,
        definition: &ComponentDefinition,
        name: &str,
        instance: Instance,
        source: Source,
        context: &ResolveContext,
    ) -> ContainerResult<Instance> {
        self.inject_fields(definition, name, &instance, context).await?;
        self.pipeline.post_create(definition, &instance).await?;

        if source == Source::Factory && !self.config.cache_factory_singletons {
            return Ok(instance);
        }
        Ok(self.store_if_singleton(definition, name, instance))
    }

    async fn create_new_instance(
        &self,
        definition: &ComponentDefinition,
        name: &str,
        context: &ResolveContext,
    ) -> ContainerResult<Instance> {
        debug!("创建新实例: {} ({})", name, definition.scope());
        self.pipeline.pre_create(definition).await?;
        self.register_factory_dependencies(definition, context).await?;

        let args = try_join_all(
            definition
                .parameters()
                .iter()
                .map(|dependency| self.resolve_dependency(dependency, name, context)),
        )
        .await?;
        let instance = definition.construct(ResolvedArgs::new(name, args))?;

        self.inject_fields(definition, name, &instance, context).await?;
        self.pipeline.post_create(definition, &instance).await?;

        Ok(self.store_if_singleton(definition, name, instance))
    }

    fn store_if_singleton(
        &self,
        definition: &ComponentDefinition,
        name: &str,
        instance: Instance,
    ) -> Instance {
        if definition.scope().is_singleton() {
            self.state.write().cache_instance(name, instance)
        } else {
            instance
        }
    }

    /// 先注册依赖中的工厂组件, 工厂产出组件因此在解析前已经绑定产出函数
    async fn register_factory_dependencies(
        &self,
        definition: &ComponentDefinition,
        context: &ResolveContext,
    ) -> ContainerResult<()> {
        let dependencies = definition
            .parameters()
            .iter()
            .chain(definition.fields().iter().map(FieldInjection::dependency));
        for dependency in dependencies {
            let target = component_target(dependency);
            if let Some(target) = target.filter(|target| target.is_factory()) {
                self.register_in(&target, context).await?;
            }
        }
        Ok(())
    }

    /// 字段注入, 每次解析都会重新解析字段依赖
    async fn inject_fields(
        &self,
        definition: &ComponentDefinition,
        name: &str,
        instance: &Instance,
        context: &ResolveContext,
    ) -> ContainerResult<()> {
        for field in definition.fields() {
            let value = self.resolve_dependency(field.dependency(), name, context).await?;
            field.assign(instance, value)?;
            debug!("注入字段: {}.{}", name, field.name());
        }
        Ok(())
    }

    /// 解析单个依赖项
    ///
    /// 显式组件绑定 > 显式名称绑定 > 推断类型。按组件解析时未注册的组件会被自动注册。
    async fn resolve_dependency(
        &self,
        dependency: &Dependency,
        requester: &str,
        context: &ResolveContext,
    ) -> ContainerResult<Instance> {
        match dependency.binding() {
            Some(Binding::Component(target)) => {
                self.resolve_by_component(target.get(), context).await
            }
            Some(Binding::Name(target)) => {
                let definition = self.state.read().definition(target);
                match definition {
                    Some(definition) => self.resolve_in(definition, context.clone()).await,
                    None => Err(ContainerError::dependency_not_found(
                        target.as_str(),
                        Some(requester),
                    )),
                }
            }
            None => match dependency.inferred_type() {
                Some(target) => self.resolve_by_component(target.get(), context).await,
                None => Err(ContainerError::dependency_not_found("<unknown>", Some(requester))),
            },
        }
    }

    async fn resolve_by_component(
        &self,
        definition: Arc<ComponentDefinition>,
        context: &ResolveContext,
    ) -> ContainerResult<Instance> {
        self.register_in(&definition, context).await?;
        self.resolve_in(definition, context.clone()).await
    }
}

/// 按组件解析时的目标定义
fn component_target(dependency: &Dependency) -> Option<Arc<ComponentDefinition>> {
    match dependency.binding() {
        Some(Binding::Component(target)) => Some(target.get()),
        Some(Binding::Name(_)) => None,
        None => dependency.inferred_type().map(DefinitionRef::get),
    }
}
