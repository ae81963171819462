//! 容器状态表
//!
//! 组件注册表、单例实例缓存和工厂函数表共同组成容器的全部可变状态。

use di_abstractions::FactoryBinding;
use indexmap::IndexMap;
use infrastructure_common::{ComponentDefinition, ComponentDescriptor, Instance};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// 容器状态
///
/// 注册表和实例缓存保持插入顺序, 销毁时按单例首次缓存的顺序处理。
#[derive(Default)]
pub(crate) struct ContainerState {
    /// 组件注册映射
    registry: IndexMap<String, Arc<ComponentDefinition>>,
    /// 组件实例映射
    instances: IndexMap<String, Instance>,
    /// 工厂函数映射
    factories: HashMap<String, FactoryBinding>,
    /// 单例构造单元, 同一名称的并发构造共享同一个单元
    constructions: HashMap<String, Arc<OnceCell<Instance>>>,
}

impl ContainerState {
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    pub(crate) fn definition(&self, name: &str) -> Option<Arc<ComponentDefinition>> {
        self.registry.get(name).cloned()
    }

    /// 注册定义; 名称已存在时不覆盖并返回 `false`
    pub(crate) fn insert_definition(
        &mut self,
        name: &str,
        definition: Arc<ComponentDefinition>,
    ) -> bool {
        if self.registry.contains_key(name) {
            return false;
        }
        self.registry.insert(name.to_string(), definition);
        true
    }

    pub(crate) fn instance(&self, name: &str) -> Option<Instance> {
        self.instances.get(name).cloned()
    }

    /// 缓存单例实例, 返回缓存中最终保留的实例
    ///
    /// 已有实例时保留已有的那个, 同一名称永远只对应一个单例。
    pub(crate) fn cache_instance(&mut self, name: &str, instance: Instance) -> Instance {
        self.instances
            .entry(name.to_string())
            .or_insert(instance)
            .clone()
    }

    /// 获取单例的构造单元, 不存在时创建
    pub(crate) fn construction(&mut self, name: &str) -> Arc<OnceCell<Instance>> {
        self.constructions
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    pub(crate) fn factory(&self, name: &str) -> Option<FactoryBinding> {
        self.factories.get(name).cloned()
    }

    pub(crate) fn install_factory(&mut self, name: &str, binding: FactoryBinding) {
        self.factories.insert(name.to_string(), binding);
    }

    /// 移除组件的注册和实例
    pub(crate) fn remove(&mut self, name: &str) {
        self.registry.shift_remove(name);
        self.instances.shift_remove(name);
        self.constructions.remove(name);
    }

    pub(crate) fn snapshot_instances(&self) -> Vec<(String, Instance)> {
        self.instances
            .iter()
            .map(|(name, instance)| (name.clone(), instance.clone()))
            .collect()
    }

    pub(crate) fn descriptors(&self) -> Vec<ComponentDescriptor> {
        self.registry
            .values()
            .filter_map(|definition| definition.descriptor())
            .collect()
    }

    pub(crate) fn registered_count(&self) -> usize {
        self.registry.len()
    }

    pub(crate) fn singleton_count(&self) -> usize {
        self.instances.len()
    }

    pub(crate) fn factory_count(&self) -> usize {
        self.factories.len()
    }

    pub(crate) fn clear(&mut self) {
        self.instances.clear();
        self.registry.clear();
        self.factories.clear();
        self.constructions.clear();
    }
}
