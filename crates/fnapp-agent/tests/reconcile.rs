//! End-to-end reconcile runs against an in-memory management API.

use async_trait::async_trait;
use fnapp_agent::{Action, Agent, AgentConfig, SqliteStore};
use fnapp_arm::models::{
    ConnectionStringDictionary, ResourceNameAvailability, Site, SiteConfigResource,
    StringDictionary,
};
use fnapp_arm::{ClientError, WebAppsApi};
use fnapp_core::FunctionAppConfig;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const ADDRESS: &str = "function_app.orders";

#[derive(Default)]
struct Sites {
    sites: BTreeMap<String, Site>,
    settings: BTreeMap<String, StringDictionary>,
    creates: usize,
    deletes: usize,
    fail_create: bool,
}

#[derive(Clone, Default)]
struct InMemoryWebApps {
    inner: Arc<Mutex<Sites>>,
}

fn not_found(name: &str) -> ClientError {
    ClientError::ApiError {
        status: 404,
        code: Some("ResourceNotFound".to_string()),
        message: format!("site {name} not found"),
    }
}

impl InMemoryWebApps {
    fn site(&self, name: &str) -> Result<Site, ClientError> {
        self.inner
            .lock()
            .unwrap()
            .sites
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(name))
    }
}

#[async_trait]
impl WebAppsApi for InMemoryWebApps {
    async fn check_name_availability(
        &self,
        name: &str,
    ) -> Result<ResourceNameAvailability, ClientError> {
        let taken = self.inner.lock().unwrap().sites.contains_key(name);
        Ok(ResourceNameAvailability {
            name_available: !taken,
            ..ResourceNameAvailability::default()
        })
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        site: &Site,
    ) -> Result<Site, ClientError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_create {
            return Err(ClientError::OperationFailed("quota exceeded".to_string()));
        }
        let mut stored = site.clone();
        stored.id = Some(format!(
            "/subscriptions/sub/resourceGroups/{resource_group}/providers/Microsoft.Web/sites/{name}"
        ));
        inner.creates += 1;
        inner.sites.insert(name.to_string(), stored.clone());
        Ok(stored)
    }

    async fn get(&self, _resource_group: &str, name: &str) -> Result<Site, ClientError> {
        self.site(name)
    }

    async fn delete(
        &self,
        _resource_group: &str,
        name: &str,
        _delete_metrics: bool,
        _delete_empty_server_farm: bool,
    ) -> Result<(), ClientError> {
        let mut inner = self.inner.lock().unwrap();
        inner.deletes += 1;
        inner.settings.remove(name);
        inner.sites.remove(name).map(|_| ()).ok_or_else(|| not_found(name))
    }

    async fn list_application_settings(
        &self,
        _resource_group: &str,
        name: &str,
    ) -> Result<StringDictionary, ClientError> {
        self.site(name)?;
        Ok(self
            .inner
            .lock()
            .unwrap()
            .settings
            .get(name)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_application_settings(
        &self,
        _resource_group: &str,
        name: &str,
        settings: &StringDictionary,
    ) -> Result<StringDictionary, ClientError> {
        self.site(name)?;
        self.inner
            .lock()
            .unwrap()
            .settings
            .insert(name.to_string(), settings.clone());
        Ok(settings.clone())
    }

    async fn list_connection_strings(
        &self,
        _resource_group: &str,
        name: &str,
    ) -> Result<ConnectionStringDictionary, ClientError> {
        self.site(name)?;
        Ok(ConnectionStringDictionary::default())
    }

    async fn update_connection_strings(
        &self,
        _resource_group: &str,
        name: &str,
        connection_strings: &ConnectionStringDictionary,
    ) -> Result<ConnectionStringDictionary, ClientError> {
        self.site(name)?;
        Ok(connection_strings.clone())
    }

    async fn get_configuration(
        &self,
        _resource_group: &str,
        name: &str,
    ) -> Result<SiteConfigResource, ClientError> {
        self.site(name)?;
        Ok(SiteConfigResource::default())
    }

    async fn update_configuration(
        &self,
        _resource_group: &str,
        name: &str,
        config: &SiteConfigResource,
    ) -> Result<SiteConfigResource, ClientError> {
        self.site(name)?;
        Ok(config.clone())
    }
}

fn write_desired(path: &Path, plan_id: &str, flag: &str) {
    let desired = json!({
        "name": "orders-fn",
        "resource_group_name": "rg-orders",
        "location": "West Europe",
        "app_service_plan_id": plan_id,
        "storage_connection_string": "DefaultEndpointsProtocol=https;AccountName=orders",
        "app_settings": {"FEATURE_FLAG": flag}
    });
    std::fs::write(path, serde_json::to_vec_pretty(&desired).unwrap()).unwrap();
}

fn agent_config(dir: &TempDir) -> AgentConfig {
    AgentConfig {
        desired_path: dir.path().join("function-app.json"),
        address: ADDRESS.to_string(),
        ..AgentConfig::default()
    }
}

fn agent(config: AgentConfig, api: &InMemoryWebApps) -> Agent<InMemoryWebApps> {
    Agent::with_store(config, api.clone(), SqliteStore::in_memory().unwrap())
}

fn stored_config(agent: &Agent<InMemoryWebApps>) -> Option<FunctionAppConfig> {
    agent
        .store()
        .load_resource(ADDRESS)
        .unwrap()
        .map(|data| data.config)
}

#[tokio::test]
async fn full_lifecycle() {
    let dir = TempDir::new().unwrap();
    let api = InMemoryWebApps::default();
    let config = agent_config(&dir);
    write_desired(&config.desired_path, "plan-a", "on");
    let agent = agent(config.clone(), &api);

    assert_eq!(agent.reconcile().await.unwrap(), Action::Create);
    let stored = agent.store().load_resource(ADDRESS).unwrap().unwrap();
    assert!(stored.exists());
    assert_eq!(stored.config.app_settings["FEATURE_FLAG"], "on");

    assert_eq!(agent.reconcile().await.unwrap(), Action::Update);

    write_desired(&config.desired_path, "plan-a", "off");
    assert_eq!(agent.reconcile().await.unwrap(), Action::Update);
    assert_eq!(stored_config(&agent).unwrap().app_settings["FEATURE_FLAG"], "off");
    assert_eq!(
        api.inner.lock().unwrap().settings["orders-fn"].properties["FEATURE_FLAG"],
        "off"
    );

    std::fs::remove_file(&config.desired_path).unwrap();
    assert_eq!(agent.reconcile().await.unwrap(), Action::Delete);
    assert!(stored_config(&agent).is_none());
    assert!(api.inner.lock().unwrap().sites.is_empty());

    assert_eq!(agent.reconcile().await.unwrap(), Action::Noop);

    let runs = agent.store().recent_runs(ADDRESS, 10).unwrap();
    let actions: Vec<_> = runs.iter().map(|run| run.action.as_str()).collect();
    assert_eq!(actions, ["noop", "delete", "update", "update", "create"]);
    assert!(runs.iter().all(|run| run.succeeded));
}

#[tokio::test]
async fn destroy_flag_overrides_desired_file() {
    let dir = TempDir::new().unwrap();
    let api = InMemoryWebApps::default();
    let config = agent_config(&dir);
    write_desired(&config.desired_path, "plan-a", "on");

    let store_path = dir.path().join("state.db");
    let creating = Agent::with_store(
        config.clone(),
        api.clone(),
        SqliteStore::open(&store_path).unwrap(),
    );
    creating.reconcile().await.unwrap();
    drop(creating);

    let destroying = Agent::with_store(
        AgentConfig {
            destroy: true,
            ..config
        },
        api.clone(),
        SqliteStore::open(&store_path).unwrap(),
    );
    assert_eq!(destroying.reconcile().await.unwrap(), Action::Delete);
    assert!(api.inner.lock().unwrap().sites.is_empty());
}

#[tokio::test]
async fn vanished_resource_is_recreated() {
    let dir = TempDir::new().unwrap();
    let api = InMemoryWebApps::default();
    let config = agent_config(&dir);
    write_desired(&config.desired_path, "plan-a", "on");
    let agent = agent(config, &api);

    agent.reconcile().await.unwrap();
    api.inner.lock().unwrap().sites.clear();

    assert_eq!(agent.reconcile().await.unwrap(), Action::Create);
    assert_eq!(api.inner.lock().unwrap().creates, 2);
}

#[tokio::test]
async fn plan_change_replaces_resource() {
    let dir = TempDir::new().unwrap();
    let api = InMemoryWebApps::default();
    let config = agent_config(&dir);
    write_desired(&config.desired_path, "plan-a", "on");
    let agent = agent(config.clone(), &api);

    agent.reconcile().await.unwrap();
    write_desired(&config.desired_path, "plan-b", "on");

    assert_eq!(agent.reconcile().await.unwrap(), Action::Replace);

    let inner = api.inner.lock().unwrap();
    assert_eq!(inner.deletes, 1);
    assert_eq!(inner.creates, 2);
    drop(inner);
    assert_eq!(
        stored_config(&agent).unwrap().app_service_plan_id,
        "plan-b"
    );
}

#[tokio::test]
async fn failed_run_is_recorded() {
    let dir = TempDir::new().unwrap();
    let api = InMemoryWebApps::default();
    api.inner.lock().unwrap().fail_create = true;
    let config = agent_config(&dir);
    write_desired(&config.desired_path, "plan-a", "on");
    let agent = agent(config, &api);

    let err = agent.reconcile().await.unwrap_err();
    assert!(format!("{err:#}").contains("quota exceeded"));
    assert!(stored_config(&agent).is_none());

    let runs = agent.store().recent_runs(ADDRESS, 1).unwrap();
    assert_eq!(runs[0].action, "create");
    assert!(!runs[0].succeeded);
    assert!(runs[0]
        .error
        .as_deref()
        .is_some_and(|e| e.contains("quota exceeded")));
}

#[tokio::test]
async fn invalid_desired_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let api = InMemoryWebApps::default();
    let config = agent_config(&dir);
    std::fs::write(&config.desired_path, b"{\"name\": 42}").unwrap();
    let agent = agent(config, &api);

    assert!(agent.reconcile().await.is_err());
    assert_eq!(api.inner.lock().unwrap().creates, 0);
}

#[test]
fn sqlite_store_is_created_on_disk() {
    let dir = TempDir::new().unwrap();
    let db_path: PathBuf = dir.path().join("nested.db");
    let mut config = agent_config(&dir);
    config.persistence.db_path = db_path.clone();

    let _agent = Agent::new(config, InMemoryWebApps::default()).unwrap();
    assert!(db_path.exists());
}
