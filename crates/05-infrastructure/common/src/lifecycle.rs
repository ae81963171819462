//! 组件生命周期管理

use crate::component::{ComponentDefinition, Instance};
use crate::errors::HookResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 组件作用域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// 单例模式 - 容器内只保留一个实例
    #[default]
    Singleton,
    /// 原型模式 - 每次解析都创建新实例
    Prototype,
}

impl Scope {
    /// 是否为单例
    pub fn is_singleton(self) -> bool {
        matches!(self, Self::Singleton)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Singleton => f.write_str("singleton"),
            Self::Prototype => f.write_str("prototype"),
        }
    }
}

/// 扩展钩子点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    /// 组件创建前
    PreCreate,
    /// 组件创建后
    PostCreate,
    /// 组件销毁前
    PreDestroy,
    /// 组件销毁后
    PostDestroy,
}

impl HookPoint {
    /// 钩子名称
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreCreate => "preCreate",
            Self::PostCreate => "postCreate",
            Self::PreDestroy => "preDestroy",
            Self::PostDestroy => "postDestroy",
        }
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 容器扩展 trait
///
/// 在组件创建与销毁前后接收通知。每个钩子都是可选的, 默认实现什么也不做。
/// 扩展可以全局注册, 也可以绑定到单个组件定义上; 绑定扩展总是先于全局扩展执行。
#[async_trait]
pub trait ContainerExtension: Send + Sync {
    /// 扩展名称, 用于日志和错误信息
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// 钩子: 当组件创建前
    async fn pre_create(&self, _definition: &ComponentDefinition) -> HookResult {
        Ok(())
    }

    /// 钩子: 当组件创建后
    async fn post_create(&self, _instance: &Instance) -> HookResult {
        Ok(())
    }

    /// 钩子: 当组件销毁前
    async fn pre_destroy(&self, _instance: &Instance) -> HookResult {
        Ok(())
    }

    /// 钩子: 当组件销毁后
    async fn post_destroy(&self) -> HookResult {
        Ok(())
    }
}
