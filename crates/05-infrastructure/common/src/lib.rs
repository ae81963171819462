//! # Infrastructure Common
//!
//! 这个 crate 提供了 IoC 容器的公共数据模型。
//!
//! ## 核心类型
//!
//! - [`ComponentDefinition`] - 组件定义及其构建器
//! - [`Dependency`] - 构造函数参数或字段的依赖请求
//! - [`ContainerExtension`] - 创建/销毁钩子
//! - [`Scope`] - 组件作用域
//! - [`ContainerError`] - 容器错误
//!
//! ## 设计原则
//!
//! - 组件定义是显式的值, 不依赖运行时反射
//! - 异步优先的钩子设计
//! - 约定优于配置: 名称默认取类型名, 作用域默认为单例

pub mod component;
pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use component::*;
pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
