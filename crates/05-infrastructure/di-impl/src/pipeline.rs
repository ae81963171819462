//! 扩展钩子管线
//!
//! 每个钩子点先执行组件绑定的扩展, 再执行全局扩展, 各自按注册顺序逐个等待。

use infrastructure_common::{
    ComponentDefinition, ContainerError, ContainerExtension, ContainerResult, HookPoint, Instance,
};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
pub(crate) struct ExtensionPipeline {
    /// 容器扩展列表
    global: RwLock<Vec<Arc<dyn ContainerExtension>>>,
}

impl ExtensionPipeline {
    pub(crate) fn add(&self, extension: Arc<dyn ContainerExtension>) {
        debug!("添加全局扩展: {}", extension.name());
        self.global.write().push(extension);
    }

    pub(crate) fn len(&self) -> usize {
        self.global.read().len()
    }

    pub(crate) fn clear(&self) {
        self.global.write().clear();
    }

    /// 绑定扩展在前, 全局扩展在后; 全局列表在阶段开始时取快照
    fn chain(&self, definition: Option<&ComponentDefinition>) -> Vec<Arc<dyn ContainerExtension>> {
        let mut chain: Vec<Arc<dyn ContainerExtension>> = definition
            .map(|definition| definition.extensions().to_vec())
            .unwrap_or_default();
        chain.extend(self.global.read().iter().cloned());
        chain
    }

    pub(crate) async fn pre_create(&self, definition: &ComponentDefinition) -> ContainerResult<()> {
        for extension in self.chain(Some(definition)) {
            trace_hook(&*extension, HookPoint::PreCreate);
            extension
                .pre_create(definition)
                .await
                .map_err(|e| wrap(&*extension, HookPoint::PreCreate, e))?;
        }
        Ok(())
    }

    pub(crate) async fn post_create(
        &self,
        definition: &ComponentDefinition,
        instance: &Instance,
    ) -> ContainerResult<()> {
        for extension in self.chain(Some(definition)) {
            trace_hook(&*extension, HookPoint::PostCreate);
            extension
                .post_create(instance)
                .await
                .map_err(|e| wrap(&*extension, HookPoint::PostCreate, e))?;
        }
        Ok(())
    }

    pub(crate) async fn pre_destroy(
        &self,
        definition: Option<&ComponentDefinition>,
        instance: &Instance,
    ) -> ContainerResult<()> {
        for extension in self.chain(definition) {
            trace_hook(&*extension, HookPoint::PreDestroy);
            extension
                .pre_destroy(instance)
                .await
                .map_err(|e| wrap(&*extension, HookPoint::PreDestroy, e))?;
        }
        Ok(())
    }

    pub(crate) async fn post_destroy(
        &self,
        definition: Option<&ComponentDefinition>,
    ) -> ContainerResult<()> {
        for extension in self.chain(definition) {
            trace_hook(&*extension, HookPoint::PostDestroy);
            extension
                .post_destroy()
                .await
                .map_err(|e| wrap(&*extension, HookPoint::PostDestroy, e))?;
        }
        Ok(())
    }
}

fn trace_hook(extension: &dyn ContainerExtension, hook: HookPoint) {
    debug!("执行扩展钩子: {} {}", extension.name(), hook);
}

fn wrap(
    extension: &dyn ContainerExtension,
    hook: HookPoint,
    source: Box<dyn std::error::Error + Send + Sync>,
) -> ContainerError {
    ContainerError::extension_failed(extension.name(), hook.as_str(), source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use infrastructure_common::{ComponentOptions, HookResult};
    use parking_lot::Mutex;

    struct Recorder {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ContainerExtension for Recorder {
        async fn pre_create(&self, _definition: &ComponentDefinition) -> HookResult {
            self.log.lock().push(format!("{}:pre", self.label));
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl ContainerExtension for Failing {
        fn name(&self) -> &str {
            "Failing"
        }

        async fn post_destroy(&self) -> HookResult {
            Err("boom".into())
        }
    }

    #[derive(Debug, Default)]
    struct Gadget;

    #[tokio::test]
    async fn test_bound_extensions_run_before_global() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = ExtensionPipeline::default();
        pipeline.add(Arc::new(Recorder {
            label: "global",
            log: log.clone(),
        }));

        let definition = ComponentDefinition::builder::<Gadget>()
            .component(ComponentOptions::default())
            .extension(Arc::new(Recorder {
                label: "bound",
                log: log.clone(),
            }))
            .build()
            .unwrap();

        pipeline.pre_create(&definition).await.unwrap();
        assert_eq!(*log.lock(), vec!["bound:pre", "global:pre"]);
    }

    #[tokio::test]
    async fn test_hook_failure_is_wrapped() {
        let pipeline = ExtensionPipeline::default();
        pipeline.add(Arc::new(Failing));

        let error = pipeline.post_destroy(None).await.unwrap_err();
        assert_eq!(error.to_string(), "扩展 Failing 的 postDestroy 钩子执行失败: boom");

        pipeline.clear();
        assert_eq!(pipeline.len(), 0);
        assert!(pipeline.post_destroy(None).await.is_ok());
    }
}
