//! The report run: owners → tasks → rows → file.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use thiserror::Error;

use crate::api::{FetchError, GClickClient, OwnedTask, TaskCategory, TaskSource};
use crate::config::Config;
use crate::report::{build_rows_at, ExportError, ExportOutcome, Exporter};

/// Fatal errors of a report run.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to write report: {0}")]
    Export(#[from] ExportError),
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Owners returned by the API.
    pub owners: usize,
    /// Owners skipped through the exclusion list.
    pub excluded: usize,
    /// Tasks fetched across all remaining owners.
    pub tasks: usize,
    pub outcome: ExportOutcome,
    pub raw_dump: Option<PathBuf>,
}

/// Fetches every owner's tasks and exports them.
pub struct ReportPipeline<S> {
    source: S,
    excluded_user_ids: BTreeSet<i64>,
    exporter: Exporter,
    dump_raw: bool,
}

impl ReportPipeline<GClickClient> {
    /// Pipeline backed by the G-Click API.
    pub fn from_config(config: &Config) -> Result<Self, ReportError> {
        let client = GClickClient::new(config)?;
        Ok(Self::new(client, config))
    }
}

impl<S: TaskSource> ReportPipeline<S> {
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source,
            excluded_user_ids: config.excluded_user_ids.clone(),
            exporter: Exporter::new(config.format, config.language, &config.output_dir),
            dump_raw: config.dump_raw,
        }
    }

    /// Fetch obligations and requests for every owner not on the exclusion
    /// list. Returns the owner count, excluded count and the tasks.
    pub async fn collect_tasks(&self) -> Result<(usize, usize, Vec<OwnedTask>), FetchError> {
        let owners = self.source.list_owners().await?;
        tracing::info!("Found {} users", owners.len());

        let mut excluded = 0;
        let mut all_tasks = Vec::new();

        for owner in &owners {
            if self.excluded_user_ids.contains(&owner.id) {
                tracing::info!("Skipping user: {} (ID: {})", owner.name, owner.id);
                excluded += 1;
                continue;
            }

            tracing::info!("Fetching tasks for: {} (ID: {})", owner.name, owner.id);

            for category in TaskCategory::ALL {
                let tasks = self.source.list_tasks(owner.id, category).await?;
                tracing::info!("{}: {}", category, tasks.len());

                all_tasks.extend(tasks.into_iter().map(|task| OwnedTask {
                    task,
                    owner: owner.clone(),
                    category,
                }));
            }
        }

        tracing::info!("Total tasks found: {}", all_tasks.len());
        Ok((owners.len(), excluded, all_tasks))
    }

    /// Run the whole report, classifying against today's local date.
    pub async fn run(&self) -> Result<RunSummary, ReportError> {
        self.run_at(Local::now().date_naive()).await
    }

    /// Run the whole report, classifying against `today`.
    pub async fn run_at(&self, today: NaiveDate) -> Result<RunSummary, ReportError> {
        let (owners, excluded, tasks) = self.collect_tasks().await?;

        let raw_dump = if self.dump_raw {
            self.exporter.write_raw_dump(&tasks)?
        } else {
            None
        };

        let rows = build_rows_at(&tasks, today);
        let outcome = self.exporter.export(&rows)?;
        if outcome == ExportOutcome::NoTasks {
            tracing::info!("No tasks found, no report written");
        }

        Ok(RunSummary {
            owners,
            excluded,
            tasks: tasks.len(),
            outcome,
            raw_dump,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Task, TokenPolicy, User};
    use crate::config::Credentials;
    use crate::report::{ReportFormat, TaskStatus, CSV_FILE_NAME, RAW_DUMP_FILE_NAME};
    use async_trait::async_trait;
    use chrono::Duration;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::tempdir;
    use url::Url;

    #[derive(Default)]
    struct FakeSource {
        owners: Vec<User>,
        tasks: HashMap<(i64, TaskCategory), Vec<Task>>,
        calls: Mutex<Vec<(i64, TaskCategory)>>,
    }

    #[async_trait]
    impl TaskSource for FakeSource {
        async fn list_owners(&self) -> Result<Vec<User>, FetchError> {
            Ok(self.owners.clone())
        }

        async fn list_tasks(
            &self,
            owner_id: i64,
            category: TaskCategory,
        ) -> Result<Vec<Task>, FetchError> {
            self.calls.lock().unwrap().push((owner_id, category));
            Ok(self
                .tasks
                .get(&(owner_id, category))
                .cloned()
                .unwrap_or_default())
        }
    }

    fn config(dir: &std::path::Path) -> Config {
        let mut config = Config::new(
            Url::parse("http://localhost").unwrap(),
            Credentials {
                client_id: "id".into(),
                client_secret: "secret".into(),
            },
        );
        config.output_dir = dir.to_path_buf();
        config.format = ReportFormat::Csv;
        config
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    /// Ana (1) has a completed obligation and an overdue request; Bruno (2)
    /// has tasks too but is excluded.
    fn ana_and_bruno() -> FakeSource {
        let yesterday = (today() - Duration::days(1)).format("%Y-%m-%dT09:00:00").to_string();
        let mut tasks = HashMap::new();
        tasks.insert(
            (1, TaskCategory::Obligation),
            vec![Task {
                id: json!(100),
                completion_date: Some("2024-06-01T10:00:00".into()),
                ..Task::default()
            }],
        );
        tasks.insert(
            (1, TaskCategory::Request),
            vec![Task {
                id: json!(200),
                action_date: Some(yesterday),
                completion_date: Some(String::new()),
                ..Task::default()
            }],
        );
        tasks.insert(
            (2, TaskCategory::Obligation),
            vec![Task {
                id: json!(300),
                ..Task::default()
            }],
        );

        FakeSource {
            owners: vec![User::new(1, "Ana"), User::new(2, "Bruno")],
            tasks,
            ..FakeSource::default()
        }
    }

    #[tokio::test]
    async fn test_excluded_owner_contributes_nothing() {
        let temp = tempdir().unwrap();
        let mut config = config(temp.path());
        config.excluded_user_ids.insert(2);

        let pipeline = ReportPipeline::new(ana_and_bruno(), &config);
        let (owners, excluded, tasks) = pipeline.collect_tasks().await.unwrap();

        assert_eq!(owners, 2);
        assert_eq!(excluded, 1);
        assert!(tasks.iter().all(|t| t.owner.id != 2));

        let calls = pipeline.source.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![(1, TaskCategory::Obligation), (1, TaskCategory::Request)]
        );

        let rows = build_rows_at(&tasks, today());
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.owner_name == "Ana" && r.owner_id == 1));
        assert_eq!(rows[0].status, TaskStatus::Completed);
        assert_eq!(rows[1].status, TaskStatus::Overdue);
    }

    #[tokio::test]
    async fn test_run_writes_csv_and_raw_dump() {
        let temp = tempdir().unwrap();
        let mut config = config(temp.path());
        config.excluded_user_ids.insert(2);
        config.dump_raw = true;

        let pipeline = ReportPipeline::new(ana_and_bruno(), &config);
        let summary = pipeline.run_at(today()).await.unwrap();

        let report = temp.path().join(CSV_FILE_NAME);
        assert_eq!(summary.outcome, ExportOutcome::Written(report.clone()));
        assert_eq!(summary.tasks, 2);
        assert_eq!(summary.raw_dump, Some(temp.path().join(RAW_DUMP_FILE_NAME)));

        let content = std::fs::read_to_string(report).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], ",01/06/2024,,Ana,Obligation,100");
        assert_eq!(lines[2], "14/06/2024,,,Ana,Request,200");
    }

    #[tokio::test]
    async fn test_all_owners_excluded_writes_nothing() {
        let temp = tempdir().unwrap();
        let mut config = config(temp.path());
        config.excluded_user_ids.extend([1, 2]);
        config.dump_raw = true;

        let pipeline = ReportPipeline::new(ana_and_bruno(), &config);
        let summary = pipeline.run_at(today()).await.unwrap();

        assert_eq!(summary.outcome, ExportOutcome::NoTasks);
        assert_eq!(summary.raw_dump, None);
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_no_owners_writes_nothing() {
        let temp = tempdir().unwrap();
        let pipeline = ReportPipeline::new(FakeSource::default(), &config(temp.path()));

        let summary = pipeline.run_at(today()).await.unwrap();
        assert_eq!(summary.owners, 0);
        assert_eq!(summary.outcome, ExportOutcome::NoTasks);
        assert!(!temp.path().join(CSV_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_end_to_end_against_http_api() {
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tarefas/responsaveis"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"usuario": 1, "nome": "Ana"},
                {"usuario": 2, "nome": "Bruno"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tarefas"))
            .and(query_param("responsaveisIds", "1"))
            .and(query_param("categoria", "Obrigacao"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"id": 100, "dataConclusao": "2024-06-01T10:00:00"}],
                "last": true
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tarefas"))
            .and(query_param("responsaveisIds", "1"))
            .and(query_param("categoria", "Solicitacao"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"id": 200, "dataAcao": "2024-06-14T09:00:00", "dataConclusao": null}],
                "last": true
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tarefas"))
            .and(query_param("responsaveisIds", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": [], "last": true})))
            .expect(0)
            .mount(&server)
            .await;

        let temp = tempdir().unwrap();
        let mut config = config(temp.path());
        config.api_url = Url::parse(&server.uri()).unwrap();
        config.excluded_user_ids.insert(2);
        config.token_policy = TokenPolicy::PerRun;

        let pipeline = ReportPipeline::from_config(&config).unwrap();
        let (_, _, tasks) = pipeline.collect_tasks().await.unwrap();
        let rows = build_rows_at(&tasks, today());

        let statuses: Vec<_> = rows.iter().map(|r| (r.owner_name.as_str(), r.status)).collect();
        assert_eq!(
            statuses,
            vec![("Ana", TaskStatus::Completed), ("Ana", TaskStatus::Overdue)]
        );
    }
}
