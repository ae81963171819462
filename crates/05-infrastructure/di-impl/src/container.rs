//! 依赖注入容器实现

use crate::pipeline::ExtensionPipeline;
use crate::registry::ContainerState;
use async_trait::async_trait;
use di_abstractions::{
    ContainerConfig, ContainerStats, DiContainer, ResolveContext, ResolveOptions,
};
use infrastructure_common::{
    ComponentDefinition, ComponentDescriptor, ContainerExtension, ContainerResult, Instance,
};
use parking_lot::RwLock;
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 具体的依赖注入容器实现
///
/// 每个容器都是独立的值, 测试之间互不影响。注册表、实例缓存和工厂函数表
/// 位于同一把读写锁之后, 锁从不跨越 `.await` 持有。
pub struct DiContainerImpl {
    pub(crate) config: ContainerConfig,
    pub(crate) state: RwLock<ContainerState>,
    pub(crate) pipeline: ExtensionPipeline,
    resolved: AtomicUsize,
    errors: AtomicUsize,
}

impl DiContainerImpl {
    /// 创建新的容器
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// 使用指定配置创建容器
    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            config,
            state: RwLock::new(ContainerState::default()),
            pipeline: ExtensionPipeline::default(),
            resolved: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
        }
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    fn root_context(&self) -> ResolveContext {
        ResolveContext::new(ResolveOptions::from(&self.config))
    }

    /// 注册组件; 名称已存在时直接返回
    pub(crate) async fn register_in(
        &self,
        definition: &Arc<ComponentDefinition>,
        context: &ResolveContext,
    ) -> ContainerResult<()> {
        let name = definition.require_name()?.to_string();

        let inserted = self.state.write().insert_definition(&name, definition.clone());
        if !inserted {
            return Ok(());
        }
        info!(
            "注册组件: {} ({}, {})",
            name,
            definition.type_info().module_path,
            definition.scope()
        );

        // 如果是工厂类, 处理其中的工厂方法
        if definition.is_factory() {
            self.process_factory(definition, &name, context).await?;
        }
        Ok(())
    }

    /// 注册并解析一个实现了 [`ContainerExtension`] 的组件, 然后将其添加为全局扩展
    ///
    /// 扩展自身也可以声明构造函数参数和注入字段。
    pub async fn install_extension<E>(
        &self,
        definition: &Arc<ComponentDefinition>,
    ) -> ContainerResult<Arc<E>>
    where
        E: ContainerExtension + Any + Send + Sync,
    {
        self.register(definition).await?;
        let extension = self.resolve_as::<E>(definition).await?;
        self.add_extension(extension.clone());
        Ok(extension)
    }

    /// 获取所有已注册组件的描述符, 按注册顺序排列
    pub fn registered_components(&self) -> Vec<ComponentDescriptor> {
        self.state.read().descriptors()
    }

    /// 容器统计信息
    pub fn stats(&self) -> ContainerStats {
        let state = self.state.read();
        ContainerStats {
            registered_components: state.registered_count(),
            active_singletons: state.singleton_count(),
            factory_producers: state.factory_count(),
            global_extensions: self.pipeline.len(),
            resolved_components: self.resolved.load(Ordering::Relaxed),
            resolution_errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

impl Default for DiContainerImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DiContainer for DiContainerImpl {
    async fn register(&self, definition: &Arc<ComponentDefinition>) -> ContainerResult<()> {
        self.register_in(definition, &self.root_context()).await
    }

    async fn resolve(&self, definition: &Arc<ComponentDefinition>) -> ContainerResult<Instance> {
        self.resolved.fetch_add(1, Ordering::Relaxed);
        let result = self.resolve_in(definition.clone(), self.root_context()).await;
        if let Err(error) = &result {
            self.errors.fetch_add(1, Ordering::Relaxed);
            debug!("解析组件 {} 失败: {}", definition.type_name(), error);
        }
        result
    }

    fn has(&self, definition: &ComponentDefinition) -> bool {
        match definition.name() {
            Some(name) => self.state.read().contains(name),
            None => false,
        }
    }

    fn register_size(&self) -> usize {
        self.state.read().registered_count()
    }

    fn add_extension(&self, extension: Arc<dyn ContainerExtension>) {
        self.pipeline.add(extension);
    }

    async fn destroy(&self) -> ContainerResult<()> {
        let instances = self.state.read().snapshot_instances();
        info!("销毁容器, 存活单例 {} 个", instances.len());

        for (name, instance) in instances {
            let definition = self.state.read().definition(&name);
            if definition.is_none() {
                warn!("组件 {} 的定义已不存在, 仅执行全局扩展钩子", name);
            }

            // 执行 preDestroy 扩展钩子
            self.pipeline
                .pre_destroy(definition.as_deref(), &instance)
                .await?;

            self.state.write().remove(&name);

            // 执行 postDestroy 扩展钩子
            self.pipeline.post_destroy(definition.as_deref()).await?;
            debug!("已销毁组件: {}", name);
        }

        // 清空容器
        self.state.write().clear();
        self.pipeline.clear();
        info!("容器已销毁");
        Ok(())
    }
}
