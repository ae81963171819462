//! # 依赖注入具体实现
//!
//! 提供具体的依赖注入容器: 组件注册表、单例缓存、工厂函数表、依赖解析器和扩展钩子管线。
//!
//! ```rust,ignore
//! use di_abstractions::DiContainer;
//! use di_impl::DiContainerImpl;
//!
//! let container = DiContainerImpl::new();
//! container.register(&service_a).await?;
//! let service: Arc<ServiceA> = container.resolve_as(&service_a).await?;
//! container.destroy().await?;
//! ```

mod container;
mod factory;
mod pipeline;
mod registry;
mod resolver;

pub use container::DiContainerImpl;
