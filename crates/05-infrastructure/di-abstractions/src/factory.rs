//! 组件工厂抽象
//!
//! 工厂组件的每个工厂方法在工厂注册时被绑定到已解析的工厂实例上,
//! 之后解析产出组件时只需调用这个零参数的产出函数。

use infrastructure_common::{ContainerResult, Instance, ProducerMethod};
use std::fmt;

/// 工厂绑定: 产出组件名称 -> (工厂实例, 工厂方法)
#[derive(Clone)]
pub struct FactoryBinding {
    factory_name: String,
    factory: Instance,
    method: ProducerMethod,
}

impl FactoryBinding {
    /// 创建工厂绑定
    pub fn new(factory_name: impl Into<String>, factory: Instance, method: ProducerMethod) -> Self {
        Self {
            factory_name: factory_name.into(),
            factory,
            method,
        }
    }

    /// 所属工厂组件名称
    pub fn factory_name(&self) -> &str {
        &self.factory_name
    }

    /// 工厂方法名称
    pub fn method_name(&self) -> &str {
        self.method.method()
    }

    /// 调用工厂方法产出组件
    pub fn produce(&self) -> ContainerResult<Instance> {
        self.method.invoke(&self.factory)
    }
}

impl fmt::Debug for FactoryBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryBinding")
            .field("factory_name", &self.factory_name)
            .field("method", &self.method.method())
            .finish()
    }
}
