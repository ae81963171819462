//! 组件解析上下文
//!
//! 记录一次顶层解析调用中的解析链, 用于检测循环依赖和限制递归深度

use crate::container::ContainerConfig;
use infrastructure_common::{ContainerError, ContainerResult};

/// 解析上下文
///
/// 构造函数依赖是并发解析的, 每个分支持有自己的解析链副本,
/// 因此进入组件时返回新的上下文而不是原地修改。
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    /// 当前解析链，用于检测循环依赖
    resolution_chain: Vec<String>,
    /// 解析选项
    options: ResolveOptions,
}

impl ResolveContext {
    /// 创建新的解析上下文
    pub fn new(options: ResolveOptions) -> Self {
        Self {
            resolution_chain: Vec::new(),
            options,
        }
    }

    /// 进入组件, 返回包含该组件的新上下文
    pub fn enter(&self, name: &str) -> ContainerResult<Self> {
        if self.options.detect_cycles && self.resolution_chain.iter().any(|n| n == name) {
            return Err(ContainerError::cyclic_dependency(self.render_chain(name)));
        }
        if self.resolution_chain.len() >= self.options.max_depth {
            return Err(ContainerError::depth_exceeded(
                self.options.max_depth,
                self.render_chain(name),
            ));
        }

        let mut resolution_chain = self.resolution_chain.clone();
        resolution_chain.push(name.to_string());
        Ok(Self {
            resolution_chain,
            options: self.options.clone(),
        })
    }

    /// 当前解析链
    pub fn chain(&self) -> &[String] {
        &self.resolution_chain
    }

    /// 当前解析深度
    pub fn depth(&self) -> usize {
        self.resolution_chain.len()
    }

    /// 正在解析的组件 (链尾)
    pub fn current(&self) -> Option<&str> {
        self.resolution_chain.last().map(String::as_str)
    }

    /// 当前组件是否已经出现在链的更早位置 (仅在关闭循环检测时可能发生)
    pub fn is_reentrant(&self) -> bool {
        match self.resolution_chain.split_last() {
            Some((current, ancestors)) => ancestors.contains(current),
            None => false,
        }
    }

    fn render_chain(&self, next: &str) -> String {
        self.resolution_chain
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(next))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// 解析选项
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// 是否检测循环依赖
    pub detect_cycles: bool,
    /// 最大递归深度
    pub max_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self::from(&ContainerConfig::default())
    }
}

impl From<&ContainerConfig> for ResolveOptions {
    fn from(config: &ContainerConfig) -> Self {
        Self {
            detect_cycles: config.enable_circular_dependency_detection,
            max_depth: config.max_resolution_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infrastructure_common::ContainerErrorKind;

    #[test]
    fn test_enter_detects_cycle() {
        let context = ResolveContext::default();
        let context = context.enter("A").unwrap().enter("B").unwrap();
        assert_eq!(context.current(), Some("B"));

        let error = context.enter("A").unwrap_err();
        match error.kind() {
            ContainerErrorKind::CyclicDependency { chain } => assert_eq!(chain, "A -> B -> A"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_branches_do_not_share_chain() {
        let root = ResolveContext::default().enter("Root").unwrap();
        let left = root.enter("Shared").unwrap();
        let right = root.enter("Shared").unwrap();
        assert_eq!(left.chain(), right.chain());
        assert_eq!(root.depth(), 1);
    }

    #[test]
    fn test_depth_limit_applies_without_cycle_detection() {
        let options = ResolveOptions {
            detect_cycles: false,
            max_depth: 2,
        };
        let context = ResolveContext::new(options).enter("A").unwrap();
        assert!(!context.is_reentrant());
        let context = context.enter("A").unwrap();
        assert!(context.is_reentrant());
        let error = context.enter("A").unwrap_err();
        assert!(matches!(
            error.kind(),
            ContainerErrorKind::ResolutionDepthExceeded { depth: 2, .. }
        ));
    }
}
