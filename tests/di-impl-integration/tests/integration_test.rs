//! 容器端到端集成测试
use async_trait::async_trait;
use di_abstractions::DiContainer;
use di_impl::DiContainerImpl;
use infrastructure_common::{
    ComponentDefinition, ComponentOptions, ContainerExtension, Dependency, HookResult, Scope,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use tokio_test::assert_ok;

static INIT_LOGGER: Once = Once::new();

fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

#[derive(Debug, Default)]
struct ServiceA;

#[derive(Debug, Default)]
struct ServiceB;

#[derive(Debug)]
struct ServiceC {
    a: Arc<ServiceA>,
    b: Arc<ServiceB>,
}

impl ServiceA {
    fn value(&self) -> &'static str {
        "A"
    }
}

impl ServiceB {
    fn value(&self) -> &'static str {
        "B"
    }
}

impl ServiceC {
    fn value(&self) -> String {
        format!("{}{}", self.a.value(), self.b.value())
    }
}

struct Definitions {
    a: Arc<ComponentDefinition>,
    b: Arc<ComponentDefinition>,
    c: Arc<ComponentDefinition>,
}

fn service_definitions() -> Definitions {
    let a = ComponentDefinition::builder::<ServiceA>()
        .component(ComponentOptions::default())
        .default_constructor()
        .build()
        .unwrap();
    let b = ComponentDefinition::builder::<ServiceB>()
        .component(ComponentOptions::default())
        .default_constructor()
        .build()
        .unwrap();
    let c = ComponentDefinition::builder::<ServiceC>()
        .component(ComponentOptions::default())
        .inject(Dependency::component(&a))
        .inject(Dependency::component(&b))
        .constructor(|args| {
            Ok(ServiceC {
                a: args.get(0)?,
                b: args.get(1)?,
            })
        })
        .build()
        .unwrap();
    Definitions { a, b, c }
}

/// 审计记录, 作为普通组件注入到审计扩展中
#[derive(Debug, Default)]
struct AuditTrail {
    created: Mutex<Vec<String>>,
    destroyed: AtomicUsize,
}

struct Auditor {
    trail: Arc<AuditTrail>,
}

#[async_trait]
impl ContainerExtension for Auditor {
    fn name(&self) -> &str {
        "Auditor"
    }

    async fn pre_create(&self, definition: &ComponentDefinition) -> HookResult {
        let name = definition.name().unwrap_or_default().to_string();
        self.trail.created.lock().push(name);
        Ok(())
    }

    async fn post_destroy(&self) -> HookResult {
        self.trail.destroyed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn auditor_definitions() -> (Arc<ComponentDefinition>, Arc<ComponentDefinition>) {
    let trail = ComponentDefinition::builder::<AuditTrail>()
        .component(ComponentOptions::default())
        .default_constructor()
        .build()
        .unwrap();
    let auditor = ComponentDefinition::builder::<Auditor>()
        .component(ComponentOptions::default())
        .inject(Dependency::component(&trail))
        .constructor(|args| Ok(Auditor { trail: args.get(0)? }))
        .build()
        .unwrap();
    (trail, auditor)
}

#[tokio::test]
async fn test_end_to_end_constructor_injection() {
    init_test_logger();
    let container = DiContainerImpl::new();
    let definitions = service_definitions();

    let c = assert_ok!(container.resolve_as::<ServiceC>(&definitions.c).await);
    assert_eq!(c.value(), "AB");

    let a = assert_ok!(container.resolve_as::<ServiceA>(&definitions.a).await);
    let b = assert_ok!(container.resolve_as::<ServiceB>(&definitions.b).await);
    assert!(Arc::ptr_eq(&a, &c.a));
    assert!(Arc::ptr_eq(&b, &c.b));
    assert_eq!(container.register_size(), 3);
}

#[tokio::test]
async fn test_installed_extension_observes_container() {
    init_test_logger();
    let container = DiContainerImpl::new();
    let (trail, auditor) = auditor_definitions();

    let installed = assert_ok!(container.install_extension::<Auditor>(&auditor).await);
    let stored_trail = assert_ok!(container.resolve_as::<AuditTrail>(&trail).await);
    assert!(Arc::ptr_eq(&installed.trail, &stored_trail));
    assert_eq!(container.stats().global_extensions, 1);

    let definitions = service_definitions();
    assert_ok!(container.resolve(&definitions.c).await);

    let mut created = stored_trail.created.lock().clone();
    // 外层组件的 preCreate 先于其依赖执行
    assert_eq!(created.first().map(String::as_str), Some("ServiceC"));
    created.sort();
    assert_eq!(created, vec!["ServiceA", "ServiceB", "ServiceC"]);

    // 已缓存的单例不会再次触发 preCreate
    assert_ok!(container.resolve(&definitions.c).await);
    assert_eq!(stored_trail.created.lock().len(), 3);

    // 存活单例: AuditTrail, Auditor, ServiceA, ServiceB, ServiceC
    assert_ok!(container.destroy().await);
    assert_eq!(stored_trail.destroyed.load(Ordering::SeqCst), 5);
    assert_eq!(container.register_size(), 0);
    assert_eq!(container.stats().global_extensions, 0);
}

#[tokio::test]
async fn test_registered_components_serialize_to_json() {
    let container = DiContainerImpl::new();
    let definitions = service_definitions();
    let prototype = ComponentDefinition::builder::<ServiceB>()
        .component(ComponentOptions::new().with_name("FreshB").with_scope(Scope::Prototype))
        .default_constructor()
        .build()
        .unwrap();

    assert_ok!(container.register(&definitions.c).await);
    assert_ok!(container.register(&prototype).await);

    let json = serde_json::to_value(container.registered_components()).unwrap();
    assert_eq!(json[0]["name"], "ServiceC");
    assert_eq!(json[0]["scope"], "singleton");
    assert_eq!(json[0]["parameters"], 2);
    assert_eq!(json[1]["name"], "FreshB");
    assert_eq!(json[1]["scope"], "prototype");
    assert_eq!(json[1]["is_factory"], false);

    let stats = serde_json::to_value(container.stats()).unwrap();
    assert_eq!(stats["registered_components"], 2);
    assert_eq!(stats["active_singletons"], 0);
}

#[derive(Debug)]
struct Connection {
    id: usize,
}

#[derive(Debug)]
struct ConnectionPool {
    opened: AtomicUsize,
}

#[tokio::test]
async fn test_factory_and_components_together() {
    init_test_logger();
    let container = DiContainerImpl::new();
    let connection = ComponentDefinition::builder::<Connection>()
        .component(ComponentOptions::prototype())
        .build()
        .unwrap();
    let pool = ComponentDefinition::builder::<ConnectionPool>()
        .factory(ComponentOptions::new().with_name("pool"))
        .constructor(|_| {
            Ok(ConnectionPool {
                opened: AtomicUsize::new(0),
            })
        })
        .produces("open", &connection, |pool: &ConnectionPool| {
            Ok(Connection {
                id: pool.opened.fetch_add(1, Ordering::SeqCst) + 1,
            })
        })
        .build()
        .unwrap();

    assert_ok!(container.register(&pool).await);
    let descriptors = container.registered_components();
    let pool_descriptor = descriptors.iter().find(|d| d.name == "pool").unwrap();
    assert!(pool_descriptor.is_factory);
    assert_eq!(pool_descriptor.producers, vec!["open"]);

    let first = assert_ok!(container.resolve_as::<Connection>(&connection).await);
    let second = assert_ok!(container.resolve_as::<Connection>(&connection).await);
    assert_eq!((first.id, second.id), (1, 2));

    let stats = container.stats();
    assert_eq!(stats.registered_components, 2);
    assert_eq!(stats.factory_producers, 1);
    assert_eq!(stats.active_singletons, 1);
    assert_eq!(stats.resolved_components, 2);
    assert_eq!(stats.resolution_errors, 0);
}

#[derive(Debug)]
struct Shared {
    serial: usize,
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_resolution_yields_single_instance() {
    let container = Arc::new(DiContainerImpl::new());
    let serial = Arc::new(AtomicUsize::new(0));
    let counter = serial.clone();
    let shared = ComponentDefinition::builder::<Shared>()
        .component(ComponentOptions::default())
        .constructor(move |_| {
            Ok(Shared {
                serial: counter.fetch_add(1, Ordering::SeqCst),
            })
        })
        .build()
        .unwrap();

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let container = container.clone();
            let shared = shared.clone();
            tokio::spawn(async move { container.resolve_as::<Shared>(&shared).await })
        })
        .collect();

    let mut instances = Vec::with_capacity(handles.len());
    for handle in handles {
        instances.push(handle.await.unwrap().unwrap());
    }

    let first = &instances[0];
    assert!(instances.iter().all(|instance| Arc::ptr_eq(instance, first)));
    assert!(first.serial < serial.load(Ordering::SeqCst));

    let later = assert_ok!(container.resolve_as::<Shared>(&shared).await);
    assert!(Arc::ptr_eq(&later, first));
    assert_eq!(container.stats().active_singletons, 1);
}

#[derive(Debug, Default)]
struct Base;

#[derive(Debug)]
struct Branch {
    base: Arc<Base>,
}

#[derive(Debug)]
struct Top {
    left: Arc<Branch>,
    right: Arc<Branch>,
}

#[tokio::test]
async fn test_shared_dependency_is_not_a_cycle() {
    let container = DiContainerImpl::new();
    let base = ComponentDefinition::builder::<Base>()
        .component(ComponentOptions::default())
        .default_constructor()
        .build()
        .unwrap();
    let branch = |name: &str| {
        ComponentDefinition::builder::<Branch>()
            .component(ComponentOptions::prototype().with_name(name))
            .inject(Dependency::component(&base))
            .constructor(|args| Ok(Branch { base: args.get(0)? }))
            .build()
            .unwrap()
    };
    let left = branch("LeftBranch");
    let right = branch("RightBranch");
    let top = ComponentDefinition::builder::<Top>()
        .component(ComponentOptions::default())
        .inject(Dependency::component(&left))
        .inject(Dependency::component(&right))
        .constructor(|args| {
            Ok(Top {
                left: args.get(0)?,
                right: args.get(1)?,
            })
        })
        .build()
        .unwrap();

    let top = assert_ok!(container.resolve_as::<Top>(&top).await);
    assert!(!Arc::ptr_eq(&top.left, &top.right));
    assert!(Arc::ptr_eq(&top.left.base, &top.right.base));
}
