//! # 容器示例应用程序
//!
//! 演示组件注册、构造函数与字段注入、工厂组件、扩展钩子和容器销毁

use async_trait::async_trait;
use clap::Parser;
use di_abstractions::{ContainerConfig, DiContainer};
use di_impl::DiContainerImpl;
use infrastructure_common::{
    ComponentDefinition, ComponentOptions, ContainerExtension, ContainerResult, Dependency,
    HookResult, Injected, Instance,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "container-demo")]
#[command(about = "Lorn IoC 容器示例")]
struct Args {
    /// 容器配置文件路径 (JSON)
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// 时钟组件
#[derive(Debug, Default)]
struct Clock {
    ticks: AtomicU64,
}

impl Clock {
    fn now(&self) -> u64 {
        self.ticks.fetch_add(1, Ordering::SeqCst)
    }
}

/// 数据源配置, 由工厂组件创建
#[derive(Debug)]
struct DataSource {
    url: String,
}

/// 数据源工厂
#[derive(Debug)]
struct DataSourceFactory {
    host: String,
}

impl DataSourceFactory {
    fn create_data_source(&self) -> ContainerResult<DataSource> {
        Ok(DataSource {
            url: format!("mysql://{}/orders", self.host),
        })
    }
}

/// 订单服务: 构造函数注入数据源, 字段注入时钟
#[derive(Debug)]
struct OrderService {
    data_source: Arc<DataSource>,
    clock: Injected<Clock>,
}

impl OrderService {
    fn place_order(&self, item: &str) -> String {
        let tick = self.clock.get().map(|clock| clock.now()).unwrap_or_default();
        format!("#{tick} {item} -> {}", self.data_source.url)
    }
}

/// 打印生命周期事件的扩展
struct LifecycleLogger;

#[async_trait]
impl ContainerExtension for LifecycleLogger {
    fn name(&self) -> &str {
        "LifecycleLogger"
    }

    async fn pre_create(&self, definition: &ComponentDefinition) -> HookResult {
        info!("即将创建组件: {}", definition.name().unwrap_or_default());
        Ok(())
    }

    async fn post_create(&self, _instance: &Instance) -> HookResult {
        info!("组件已就绪");
        Ok(())
    }

    async fn pre_destroy(&self, _instance: &Instance) -> HookResult {
        info!("即将销毁组件");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    info!("启动 Lorn IoC 容器示例");

    let config = load_config(args.config.as_deref())?;
    let container = DiContainerImpl::with_config(config);
    container.add_extension(Arc::new(LifecycleLogger));

    let clock = ComponentDefinition::builder::<Clock>()
        .component(ComponentOptions::default())
        .default_constructor()
        .build()?;
    let data_source = ComponentDefinition::builder::<DataSource>()
        .component(ComponentOptions::new().with_name("dataSource"))
        .build()?;
    let factory = ComponentDefinition::builder::<DataSourceFactory>()
        .factory(ComponentOptions::default())
        .constructor(|_| {
            Ok(DataSourceFactory {
                host: "localhost:3306".to_string(),
            })
        })
        .produces("create_data_source", &data_source, DataSourceFactory::create_data_source)
        .build()?;
    let order_service = ComponentDefinition::builder::<OrderService>()
        .component(ComponentOptions::default())
        .inject(Dependency::name("dataSource"))
        .constructor(|args| {
            Ok(OrderService {
                data_source: args.get(0)?,
                clock: Injected::new(),
            })
        })
        .field(
            "clock",
            Dependency::component(&clock),
            |service: &OrderService, clock: Arc<Clock>| service.clock.set(clock),
        )
        .build()?;

    container.register(&factory).await?;

    let service = container.resolve_as::<OrderService>(&order_service).await?;
    info!("{}", service.place_order("keyboard"));
    info!("{}", service.place_order("mouse"));

    info!(
        "已注册组件: {}",
        serde_json::to_string_pretty(&container.registered_components())?
    );
    info!("容器统计: {}", serde_json::to_string(&container.stats())?);

    container.destroy().await?;
    info!("剩余组件数量: {}", container.register_size());
    Ok(())
}

/// 加载容器配置, 未指定文件时使用默认值
fn load_config(path: Option<&str>) -> Result<ContainerConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            info!("加载容器配置: {}", path);
            let content = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
        None => Ok(ContainerConfig::default()),
    }
}
