//! The manager-facing storage surface: reads, writes, synthetic keys,
//! commit semantics, and per-account restrictions.

mod common;

use account_bridge_core::{
    AccountStorage, StorageRestrictions, ATTR_DISPLAY_NAME, ATTR_ENABLED, ATTR_ICON, ATTR_SERVICE,
    STORAGE_NAME, STORAGE_PRIORITY, STORAGE_PROVIDER,
};
use account_bridge_provider::{
    AccountId, AccountService, ProviderAccount, ProviderDirectory, ProviderInfo, SettingValue,
};

use common::{Fixture, FIXTURE_NAME};

/// Fixture with the standard account bound and the `google` provider
/// registered.
async fn bound_fixture() -> Fixture {
    let fx = Fixture::new();
    fx.directory.add_provider(ProviderInfo {
        name: "google".to_string(),
        display_name: "Google".to_string(),
        icon_name: "icon-google".to_string(),
    });
    fx.boot().await;
    fx.seeded_account_with_param(true);
    fx.bridge.account_created(AccountId(1)).await;
    fx
}

#[tokio::test]
async fn descriptor_is_static() {
    let fx = Fixture::new();
    let descriptor = fx.bridge.descriptor();
    assert_eq!(descriptor.name, STORAGE_NAME);
    assert_eq!(descriptor.provider, STORAGE_PROVIDER);
    assert_eq!(descriptor.priority, STORAGE_PRIORITY);
    assert!(!descriptor.description.is_empty());
}

#[tokio::test]
async fn unknown_names_are_refused() {
    let fx = bound_fixture().await;
    let stranger = "gabble/jabber/nobody_0";

    assert!(!fx.bridge.get(fx.manager.as_ref(), stranger, None).await);
    assert!(!fx.bridge.set(stranger, ATTR_ENABLED, "true").await);
    assert!(fx.bridge.identifier(stranger).await.is_none());
    assert!(fx.bridge.additional_info(stranger).await.is_none());
    assert_eq!(
        fx.bridge.restrictions(stranger).await,
        StorageRestrictions::all()
    );
}

#[tokio::test]
async fn get_without_key_reports_settings_and_synthetics() {
    let fx = bound_fixture().await;
    let service = fx.directory.all_services().remove(0);
    service.set_value(
        "messaging/param-server",
        Some(SettingValue::Str("talk.google.com".to_string())),
    );
    service.set_value("messaging/param-require-encryption", Some(SettingValue::Bool(true)));

    assert!(fx.bridge.get(fx.manager.as_ref(), FIXTURE_NAME, None).await);

    let value = |key: &str| fx.manager.value(FIXTURE_NAME, key).flatten();
    assert_eq!(value("param-account"), Some("alice@example.com".to_string()));
    assert_eq!(value("param-server"), Some("talk.google.com".to_string()));
    assert_eq!(value("param-require-encryption"), Some("true".to_string()));
    assert_eq!(value(ATTR_ENABLED), Some("true".to_string()));
    assert_eq!(value(ATTR_DISPLAY_NAME), Some("alice@example.com".to_string()));
    // Provider machine name remapped to the public identifier.
    assert_eq!(value(ATTR_SERVICE), Some("google-talk".to_string()));
    assert_eq!(value(ATTR_ICON), Some("im-google".to_string()));
}

#[tokio::test]
async fn icon_falls_back_to_provider_metadata() {
    let fx = Fixture::new();
    fx.directory.add_provider(ProviderInfo {
        name: "google".to_string(),
        display_name: "Google".to_string(),
        icon_name: "icon-google".to_string(),
    });
    fx.boot().await;

    let account = fx.directory.create_account("google", "alice@example.com");
    account.set_enabled(true);
    let service = fx.directory.add_service(&account, "google-im", "");
    service.set_value(
        "messaging/manager",
        Some(SettingValue::Str("gabble".to_string())),
    );
    service.set_value(
        "messaging/protocol",
        Some(SettingValue::Str("jabber".to_string())),
    );
    service.set_value(
        "messaging/param-account",
        Some(SettingValue::Str("alice@example.com".to_string())),
    );
    fx.bridge.account_created(AccountId(1)).await;

    assert!(
        fx.bridge
            .get(fx.manager.as_ref(), FIXTURE_NAME, Some(ATTR_ICON))
            .await
    );
    assert_eq!(
        fx.manager.value(FIXTURE_NAME, ATTR_ICON).flatten(),
        Some("icon-google".to_string())
    );
}

#[tokio::test]
async fn enabled_reflects_live_provider_state() {
    let fx = bound_fixture().await;
    let account = fx.directory.account(AccountId(1)).unwrap();

    assert!(
        fx.bridge
            .get(fx.manager.as_ref(), FIXTURE_NAME, Some(ATTR_ENABLED))
            .await
    );
    assert_eq!(
        fx.manager.value(FIXTURE_NAME, ATTR_ENABLED).flatten(),
        Some("true".to_string())
    );

    account.set_enabled(false);
    let _ = fx
        .bridge
        .get(fx.manager.as_ref(), FIXTURE_NAME, Some(ATTR_ENABLED))
        .await;
    assert_eq!(
        fx.manager.value(FIXTURE_NAME, ATTR_ENABLED).flatten(),
        Some("false".to_string())
    );
}

#[tokio::test]
async fn set_enabled_flips_the_account_global_flag() {
    let fx = bound_fixture().await;
    let account = fx.directory.account(AccountId(1)).unwrap();

    assert!(fx.bridge.set(FIXTURE_NAME, ATTR_ENABLED, "false").await);
    assert!(!account.enabled());

    assert!(fx.bridge.set(FIXTURE_NAME, ATTR_ENABLED, "true").await);
    assert!(account.enabled());
}

#[tokio::test]
async fn set_display_name_writes_through() {
    let fx = bound_fixture().await;
    let account = fx.directory.account(AccountId(1)).unwrap();

    assert!(
        fx.bridge
            .set(FIXTURE_NAME, ATTR_DISPLAY_NAME, "Alice (work)")
            .await
    );
    assert_eq!(account.display_name(), "Alice (work)");
}

#[tokio::test]
async fn plain_keys_write_through_the_codec() {
    let fx = bound_fixture().await;
    let service = fx.directory.all_services().remove(0);

    assert!(fx.bridge.set(FIXTURE_NAME, "param-server", "example.org").await);
    assert_eq!(
        service.value("messaging/param-server"),
        Some(SettingValue::Str("example.org".to_string()))
    );
}

#[tokio::test]
async fn unsupported_typed_settings_are_reported_unset() {
    let fx = bound_fixture().await;
    let service = fx.directory.all_services().remove(0);
    service.set_value("messaging/param-port", Some(SettingValue::Int(5223)));

    // Omitted entirely from the full report.
    assert!(fx.bridge.get(fx.manager.as_ref(), FIXTURE_NAME, None).await);
    assert!(fx.manager.value(FIXTURE_NAME, "param-port").is_none());

    // A direct read reports the key as unset.
    assert!(
        fx.bridge
            .get(fx.manager.as_ref(), FIXTURE_NAME, Some("param-port"))
            .await
    );
    assert_eq!(fx.manager.value(FIXTURE_NAME, "param-port"), Some(None));
}

#[tokio::test]
async fn create_and_delete_are_refused() {
    let fx = bound_fixture().await;

    let parameters = std::collections::HashMap::new();
    assert!(fx.bridge.create("gabble", "jabber", &parameters).await.is_none());
    assert!(!fx.bridge.delete(FIXTURE_NAME, None).await);
    // The refused delete must leave the binding untouched.
    assert_eq!(fx.bridge.list().await, vec![FIXTURE_NAME.to_string()]);
}

#[tokio::test]
async fn commit_stores_each_account_once() {
    let fx = Fixture::new();
    fx.boot().await;
    let account = fx.directory.create_account("google", "alice@example.com");
    account.set_enabled(true);
    for service_name in ["google-im", "google-mail"] {
        let service = fx.directory.add_service(&account, service_name, "");
        service.set_value(
            "messaging/manager",
            Some(SettingValue::Str("gabble".to_string())),
        );
        service.set_value(
            "messaging/protocol",
            Some(SettingValue::Str("jabber".to_string())),
        );
        service.set_value(
            "messaging/param-account",
            Some(SettingValue::Str("alice@example.com".to_string())),
        );
    }
    fx.bridge.account_created(AccountId(1)).await;
    assert_eq!(fx.bridge.list().await.len(), 2);

    let before = account.store_count();
    assert!(fx.bridge.commit().await);
    assert_eq!(account.store_count(), before + 1);
}

#[tokio::test]
async fn commit_tolerates_store_failures() {
    let fx = bound_fixture().await;
    let account = fx.directory.create_account("google", "bob@example.com");
    account.set_enabled(true);
    let service = fx.directory.add_service(&account, "google-im", "");
    service.set_value(
        "messaging/manager",
        Some(SettingValue::Str("gabble".to_string())),
    );
    service.set_value(
        "messaging/protocol",
        Some(SettingValue::Str("jabber".to_string())),
    );
    service.set_value(
        "messaging/param-account",
        Some(SettingValue::Str("bob@example.com".to_string())),
    );
    fx.bridge.account_created(AccountId(2)).await;

    account.set_store_error(Some("registry write failed".to_string()));
    // One account failing to persist must not fail the whole commit.
    assert!(fx.bridge.commit().await);
}

#[tokio::test]
async fn identifier_and_additional_info_describe_the_binding() {
    let fx = bound_fixture().await;

    assert_eq!(fx.bridge.identifier(FIXTURE_NAME).await, Some(AccountId(1)));

    let info = fx.bridge.additional_info(FIXTURE_NAME).await.unwrap();
    assert_eq!(info.provider_display_name, "Google");
    assert_eq!(info.account_display_name, "alice@example.com");
}

#[tokio::test]
async fn additional_info_falls_back_to_the_machine_name() {
    let fx = Fixture::new();
    fx.boot().await;
    fx.seeded_account_with_param(true);
    fx.bridge.account_created(AccountId(1)).await;

    let info = fx.bridge.additional_info(FIXTURE_NAME).await.unwrap();
    assert_eq!(info.provider_display_name, "google");
}

#[tokio::test]
async fn restrictions_reflect_the_readonly_marker() {
    let fx = bound_fixture().await;
    let service = fx.directory.all_services().remove(0);

    let restrictions = fx.bridge.restrictions(FIXTURE_NAME).await;
    assert!(restrictions.cannot_set_service);
    assert!(!restrictions.cannot_set_parameters);
    assert!(!restrictions.cannot_set_enabled);
    assert!(!restrictions.cannot_set_presence);

    service.set_value("messaging/readonly-params", Some(SettingValue::Bool(true)));
    assert!(fx.bridge.restrictions(FIXTURE_NAME).await.cannot_set_parameters);

    service.set_value("messaging/readonly-params", Some(SettingValue::Bool(false)));
    assert!(!fx.bridge.restrictions(FIXTURE_NAME).await.cannot_set_parameters);
}
