//! `azurerm_subscription_tags` 集成测试
//!
//! 运行方式:
//! ```bash
//! ARM_SUBSCRIPTION_ID=xxx ARM_TENANT_ID=xxx ARM_CLIENT_ID=xxx ARM_CLIENT_SECRET=xxx \
//!     cargo test -p azurerm-provider --test subscription_tags_test -- --ignored --nocapture --test-threads=1
//! ```

mod common;

use azurerm_provider::ProviderError;
use common::{TestContext, resource_config};
use serde_json::json;

const TYPE_NAME: &str = "azurerm_subscription_tags";

#[tokio::test]
#[ignore = "integration test: requires ARM_SUBSCRIPTION_ID and ARM credentials"]
async fn test_subscription_tags_basic() {
    skip_if_no_credentials!("ARM_SUBSCRIPTION_ID");

    let ctx = require_some!(TestContext::from_env(), "创建测试上下文失败");
    let resource = require_some!(ctx.provider.resource(TYPE_NAME).ok(), "未注册的资源类型");
    let config = resource_config(json!({
        "subscription_id": ctx.subscription_id,
        "tags": { "environment": "Production", "cost_center": "MSFT" }
    }));

    let state = require_ok!(resource.create(&config).await, "create 调用失败");
    assert_eq!(state.get("tags.%"), Some("2"));
    assert_eq!(state.get("tags.cost_center"), Some("MSFT"));
    assert_eq!(state.get("tags.environment"), Some("Production"));
    assert!(require_ok!(resource.exists(&state.id).await));

    // import 应得到相同的属性
    let imported = require_ok!(resource.import(&state.id).await, "import 调用失败");
    assert_eq!(imported.get_map("tags"), state.get_map("tags"));

    require_ok!(resource.delete(&state.id).await, "delete 调用失败");
    assert!(!require_ok!(resource.exists(&state.id).await));

    println!("✓ subscription_tags basic 测试通过");
}

#[tokio::test]
#[ignore = "integration test: requires ARM_SUBSCRIPTION_ID and ARM credentials"]
async fn test_subscription_tags_requires_import() {
    skip_if_no_credentials!("ARM_SUBSCRIPTION_ID");

    let ctx = require_some!(TestContext::from_env(), "创建测试上下文失败");
    let resource = require_some!(ctx.provider.resource(TYPE_NAME).ok(), "未注册的资源类型");
    let config = resource_config(json!({
        "subscription_id": ctx.subscription_id,
        "tags": { "environment": "Production", "cost_center": "MSFT" }
    }));

    let state = require_ok!(resource.create(&config).await, "create 调用失败");
    let second = resource.create(&config).await;
    let _ = resource.delete(&state.id).await;

    assert!(
        matches!(second, Err(ProviderError::ResourceExists { .. })),
        "重复创建应要求 import: {second:?}"
    );

    println!("✓ subscription_tags requires import 测试通过");
}

#[tokio::test]
#[ignore = "integration test: requires ARM_SUBSCRIPTION_ID and ARM credentials"]
async fn test_subscription_tags_update() {
    skip_if_no_credentials!("ARM_SUBSCRIPTION_ID");

    let ctx = require_some!(TestContext::from_env(), "创建测试上下文失败");
    let resource = require_some!(ctx.provider.resource(TYPE_NAME).ok(), "未注册的资源类型");
    let config = resource_config(json!({
        "subscription_id": ctx.subscription_id,
        "tags": { "environment": "Production", "cost_center": "MSFT" }
    }));
    let state = require_ok!(resource.create(&config).await, "create 调用失败");

    let updated = resource_config(json!({
        "subscription_id": ctx.subscription_id,
        "tags": { "environment": "staging" }
    }));
    let result = resource.update(&state.id, &updated).await;
    let read = resource.read(&state.id).await;
    let _ = resource.delete(&state.id).await;

    let result = require_ok!(result, "update 调用失败");
    assert_eq!(result.get("tags.%"), Some("1"));
    assert_eq!(result.get("tags.environment"), Some("staging"));

    let read = require_some!(require_ok!(read), "更新后应能读取");
    assert_eq!(read.get("tags.%"), Some("1"));

    println!("✓ subscription_tags update 测试通过");
}
