//! 工厂组件处理
//!
//! 工厂方法只在工厂组件注册时扫描一次: 先解析工厂实例, 再为每个工厂方法
//! 注册产出组件并安装产出函数。

use crate::container::DiContainerImpl;
use crate::registry::ContainerState;
use di_abstractions::{FactoryBinding, ResolveContext};
use infrastructure_common::{ComponentDefinition, ContainerResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

impl DiContainerImpl {
    /// 处理工厂类, 注册其中的工厂方法
    pub(crate) async fn process_factory(
        &self,
        definition: &Arc<ComponentDefinition>,
        factory_name: &str,
        context: &ResolveContext,
    ) -> ContainerResult<()> {
        info!("处理工厂组件: {}", factory_name);

        // 获取工厂类实例
        let factory = self.resolve_in(definition.clone(), context.clone()).await?;

        for producer in definition.producers() {
            let output = producer.output();
            let output_name = output.require_name()?.to_string();

            let mut state = self.state.write();
            if state.contains(&output_name) {
                // 产出组件先于工厂被解析时, 已按无构造函数的普通组件注册, 由工厂接管
                if !awaits_producer(&state, &output_name, &output) {
                    warn!(
                        "组件 {} 已注册, 跳过工厂方法 {}::{}",
                        output_name,
                        factory_name,
                        producer.method()
                    );
                    continue;
                }
                debug!(
                    "工厂方法 {}::{} 接管已注册组件: {}",
                    factory_name,
                    producer.method(),
                    output_name
                );
            } else {
                state.insert_definition(&output_name, output.clone());
            }

            state.install_factory(
                &output_name,
                FactoryBinding::new(factory_name, factory.clone(), producer.clone()),
            );
            debug!(
                "注册工厂产出组件: {} <- {}::{}",
                output_name,
                factory_name,
                producer.method()
            );
        }

        Ok(())
    }
}

/// 已注册的正是这个产出定义, 且它既不能自行构造也尚无实例和产出函数
fn awaits_producer(
    state: &ContainerState,
    name: &str,
    output: &Arc<ComponentDefinition>,
) -> bool {
    let registered = state.definition(name);
    registered.is_some_and(|registered| Arc::ptr_eq(&registered, output))
        && !output.has_constructor()
        && state.instance(name).is_none()
        && state.factory(name).is_none()
}
