//! 错误类型定义

use chrono::{DateTime, Utc};
use thiserror::Error;

/// 依赖注入容器错误种类
#[derive(Error, Debug)]
pub enum ContainerErrorKind {
    #[error("类型 {type_name} 不是一个组件")]
    NotAComponent { type_name: String },

    #[error("组件 {name} 已被标记, 请勿重复标记")]
    ComponentAlreadyRegistered { name: String },

    #[error("{}", dependency_not_found_message(.dependency, .component))]
    DependencyNotFound {
        dependency: String,
        component: Option<String>,
    },

    #[error("检测到循环依赖: {chain}")]
    CyclicDependency { chain: String },

    #[error("解析深度超过上限 {depth}: {chain}")]
    ResolutionDepthExceeded { depth: usize, chain: String },

    #[error("组件创建失败: {name}, 原因: {message}")]
    ComponentCreationFailed { name: String, message: String },

    #[error("扩展 {extension} 的 {hook} 钩子执行失败: {source}")]
    ExtensionFailed {
        extension: String,
        hook: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("未实现 \"{interface}\" 接口")]
    InterfaceNotImplemented { interface: String },

    #[error("进入不可达代码")]
    UnreachableCode,
}

fn dependency_not_found_message(dependency: &str, component: &Option<String>) -> String {
    match component {
        Some(component) => format!("组件 \"{component}\" 依赖 \"{dependency}\" 未找到"),
        None => format!("依赖 \"{dependency}\" 未找到"),
    }
}

/// 依赖注入容器错误
///
/// 所有容器操作失败时都返回此类型, 错误本身不会被容器重试。
/// `timestamp` 记录错误创建的时刻, 方便调用方记录日志。
#[derive(Error, Debug)]
#[error("{kind}")]
pub struct ContainerError {
    kind: ContainerErrorKind,
    timestamp: DateTime<Utc>,
}

impl ContainerError {
    /// 创建新的错误
    pub fn new(kind: ContainerErrorKind) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
        }
    }

    /// 错误种类
    pub fn kind(&self) -> &ContainerErrorKind {
        &self.kind
    }

    /// 错误创建时间
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// 创建"不是组件"错误
    pub fn not_a_component(type_name: impl Into<String>) -> Self {
        Self::new(ContainerErrorKind::NotAComponent {
            type_name: type_name.into(),
        })
    }

    /// 创建"重复标记"错误
    pub fn already_registered(name: impl Into<String>) -> Self {
        Self::new(ContainerErrorKind::ComponentAlreadyRegistered { name: name.into() })
    }

    /// 创建"依赖未找到"错误
    pub fn dependency_not_found(dependency: impl Into<String>, component: Option<&str>) -> Self {
        Self::new(ContainerErrorKind::DependencyNotFound {
            dependency: dependency.into(),
            component: component.map(str::to_string),
        })
    }

    /// 创建循环依赖错误
    pub fn cyclic_dependency(chain: impl Into<String>) -> Self {
        Self::new(ContainerErrorKind::CyclicDependency {
            chain: chain.into(),
        })
    }

    /// 创建解析深度超限错误
    pub fn depth_exceeded(depth: usize, chain: impl Into<String>) -> Self {
        Self::new(ContainerErrorKind::ResolutionDepthExceeded {
            depth,
            chain: chain.into(),
        })
    }

    /// 创建组件创建失败错误
    pub fn creation_failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ContainerErrorKind::ComponentCreationFailed {
            name: name.into(),
            message: message.into(),
        })
    }

    /// 创建扩展钩子失败错误
    pub fn extension_failed(
        extension: impl Into<String>,
        hook: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::new(ContainerErrorKind::ExtensionFailed {
            extension: extension.into(),
            hook: hook.into(),
            source,
        })
    }

    /// 创建"接口未实现"错误
    pub fn interface_not_implemented(interface: impl Into<String>) -> Self {
        Self::new(ContainerErrorKind::InterfaceNotImplemented {
            interface: interface.into(),
        })
    }

    /// 是否为"不是组件"错误
    pub fn is_not_a_component(&self) -> bool {
        matches!(self.kind, ContainerErrorKind::NotAComponent { .. })
    }

    /// 是否为"依赖未找到"错误
    pub fn is_dependency_not_found(&self) -> bool {
        matches!(self.kind, ContainerErrorKind::DependencyNotFound { .. })
    }

    /// 是否为循环依赖错误
    pub fn is_cyclic_dependency(&self) -> bool {
        matches!(self.kind, ContainerErrorKind::CyclicDependency { .. })
    }
}

impl From<ContainerErrorKind> for ContainerError {
    fn from(kind: ContainerErrorKind) -> Self {
        Self::new(kind)
    }
}

/// 结果类型别名
pub type ContainerResult<T> = Result<T, ContainerError>;

/// 扩展钩子返回值
pub type HookResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
