//! 元数据定义
//!
//! 提供组件和类型的元数据信息

use crate::lifecycle::Scope;
use serde::{Deserialize, Serialize};
use std::any::TypeId;

/// 类型信息
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 类型名称
    pub name: String,
    /// 类型ID
    pub id: TypeId,
    /// 完整类型路径
    pub module_path: String,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: ?Sized + 'static>() -> Self {
        let full_name = std::any::type_name::<T>();
        Self {
            name: short_type_name(full_name).to_string(),
            id: TypeId::of::<T>(),
            module_path: full_name.to_string(),
        }
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &str {
        &self.name
    }
}

/// 去掉模块路径, 保留泛型参数之前的最后一段
fn short_type_name(full_name: &str) -> &str {
    let base = full_name.split('<').next().unwrap_or(full_name);
    base.rsplit("::").next().unwrap_or(base)
}

/// 组件选项
///
/// 对应组件标记时提供的名称和作用域覆盖。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentOptions {
    /// 组件名称, 默认为类型名
    pub name: Option<String>,
    /// 组件作用域, 默认为单例
    pub scope: Option<Scope>,
}

impl ComponentOptions {
    /// 创建默认选项
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 设置作用域
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// 原型作用域的快捷方式
    pub fn prototype() -> Self {
        Self::new().with_scope(Scope::Prototype)
    }
}

/// 组件描述符
///
/// 已注册组件的可序列化快照, 不包含构造函数等运行时信息。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    /// 组件名称
    pub name: String,
    /// 类型名称
    pub type_name: String,
    /// 作用域
    pub scope: Scope,
    /// 是否为工厂组件
    pub is_factory: bool,
    /// 构造函数参数数量
    pub parameters: usize,
    /// 注入字段名称
    pub fields: Vec<String>,
    /// 绑定扩展数量
    pub extensions: usize,
    /// 工厂方法名称
    pub producers: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    #[allow(dead_code)]
    struct Wrapper<T>(T);

    #[test]
    fn test_type_info_short_name() {
        let info = TypeInfo::of::<Plain>();
        assert_eq!(info.short_name(), "Plain");
        assert!(info.module_path.ends_with("::Plain"));

        let generic = TypeInfo::of::<Wrapper<Plain>>();
        assert_eq!(generic.short_name(), "Wrapper");
    }

    #[test]
    fn test_component_options_builders() {
        let options = ComponentOptions::prototype().with_name("Custom");
        assert_eq!(options.name.as_deref(), Some("Custom"));
        assert_eq!(options.scope, Some(Scope::Prototype));
        assert_eq!(ComponentOptions::new(), ComponentOptions::default());
    }
}
