//! 依赖注入容器抽象接口
//!
//! 提供依赖注入容器的核心抽象

use async_trait::async_trait;
use infrastructure_common::{
    downcast_instance, ComponentDefinition, ContainerExtension, ContainerResult, Instance,
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;

/// 依赖注入容器 trait
///
/// 提供注册、解析、查询、销毁和扩展管理
#[async_trait]
pub trait DiContainer: Send + Sync {
    /// 注册组件
    ///
    /// 同名组件重复注册是空操作; 工厂组件会在注册时处理其工厂方法。
    async fn register(&self, definition: &Arc<ComponentDefinition>) -> ContainerResult<()>;

    /// 解析组件
    async fn resolve(&self, definition: &Arc<ComponentDefinition>) -> ContainerResult<Instance>;

    /// 解析组件并转换为具体类型
    async fn resolve_as<T>(&self, definition: &Arc<ComponentDefinition>) -> ContainerResult<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let instance = self.resolve(definition).await?;
        downcast_instance(instance)
    }

    /// 检查是否已注册组件
    fn has(&self, definition: &ComponentDefinition) -> bool;

    /// 已注册的组件数量
    fn register_size(&self) -> usize;

    /// 添加全局扩展
    fn add_extension(&self, extension: Arc<dyn ContainerExtension>);

    /// 销毁容器
    ///
    /// 对每个存活的单例执行销毁钩子, 然后清空全部状态。
    async fn destroy(&self) -> ContainerResult<()>;
}

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 是否启用循环依赖检测
    pub enable_circular_dependency_detection: bool,
    /// 最大解析深度
    pub max_resolution_depth: usize,
    /// 是否缓存工厂产出的单例组件
    pub cache_factory_singletons: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            enable_circular_dependency_detection: true,
            max_resolution_depth: 100,
            cache_factory_singletons: true,
        }
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContainerStats {
    /// 已注册组件数量
    pub registered_components: usize,
    /// 活跃单例数量
    pub active_singletons: usize,
    /// 工厂产出函数数量
    pub factory_producers: usize,
    /// 全局扩展数量
    pub global_extensions: usize,
    /// 解析调用次数
    pub resolved_components: usize,
    /// 解析错误数量
    pub resolution_errors: usize,
}
