//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::env;

use azurerm_provider::{ArmProvider, ProviderConfig, ResourceConfig};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).map_or(true, |v| v.is_empty()) {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Option` 为 `Some`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// 生成唯一的测试后缀（8 位）
pub fn random_suffix() -> String {
    let uuid = uuid::Uuid::new_v4();
    uuid.simple().to_string()[..8].to_string()
}

/// 从 JSON 字面量构造资源配置
pub fn resource_config(value: serde_json::Value) -> ResourceConfig {
    match value {
        serde_json::Value::Object(map) => map,
        _ => ResourceConfig::new(),
    }
}

/// 测试上下文 - 封装 Provider 和订阅信息
pub struct TestContext {
    pub provider: ArmProvider,
    pub subscription_id: String,
}

impl TestContext {
    /// 从 `ARM_*` 环境变量创建测试上下文
    pub fn from_env() -> Option<Self> {
        let config = ProviderConfig::from_env().ok()?;
        let subscription_id = config.subscription_id.clone();
        let provider = ArmProvider::new(config).ok()?;
        Some(Self {
            provider,
            subscription_id,
        })
    }

    /// DNS 测试使用的资源组（`TEST_RESOURCE_GROUP`）
    pub fn resource_group() -> Option<String> {
        env::var("TEST_RESOURCE_GROUP").ok().filter(|v| !v.is_empty())
    }
}
