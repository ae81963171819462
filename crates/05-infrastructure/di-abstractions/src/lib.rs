//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义容器门面和解析过程的核心接口。
//!
//! ## 核心接口
//!
//! - [`DiContainer`] - 容器门面: 注册、解析、查询、销毁、扩展
//! - [`ResolveContext`] - 解析链, 循环依赖与深度检测
//! - [`FactoryBinding`] - 工厂方法与工厂实例的绑定
//! - [`ContainerConfig`] - 容器配置

pub mod container;
pub mod factory;
pub mod resolver;

pub use container::*;
pub use factory::*;
pub use resolver::*;
